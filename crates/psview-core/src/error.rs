// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for psview.

use thiserror::Error;

/// Top-level error type for all psview operations.
///
/// Every fallible operation returns this type directly; there are no shared
/// error out-parameters. None of these failures is retried: a document the
/// backend cannot interpret will not become readable on a second attempt.
#[derive(Debug, Error)]
pub enum RenderError {
    // -- Caller errors --
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("invalid raster input: {0}")]
    InvalidInput(String),

    // -- Resource errors --
    #[error("out of memory: could not allocate {bytes} bytes")]
    OutOfMemory { bytes: usize },

    // -- Backend errors --
    #[error("rendering backend failed: {detail}")]
    BackendFailure { cause: BackendCause, detail: String },

    #[error("unknown error: {0}")]
    Unknown(String),

    // -- Output --
    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RenderError {
    /// A backend failure with no more specific cause.
    pub fn backend(detail: impl Into<String>) -> Self {
        Self::backend_with(BackendCause::Other, detail)
    }

    pub fn backend_with(cause: BackendCause, detail: impl Into<String>) -> Self {
        Self::BackendFailure {
            cause,
            detail: detail.into(),
        }
    }

    /// Cause of a backend failure, `None` for every other variant.
    pub fn backend_cause(&self) -> Option<BackendCause> {
        match self {
            Self::BackendFailure { cause, .. } => Some(*cause),
            _ => None,
        }
    }
}

/// What made a backend fail, as far as the backend can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendCause {
    /// The interpreter process could not be started.
    InterpreterUnavailable,
    /// The file is not PostScript.
    NotPostScript,
    /// The interpreter ran and failed, or produced nothing usable.
    Other,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RenderError>;
