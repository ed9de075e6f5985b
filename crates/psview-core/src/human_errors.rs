// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable descriptions of render failures.
//
// The host shows a placeholder page whenever rendering fails. These
// descriptions give it a short headline and a suggestion to display there.

use crate::error::{BackendCause, RenderError};

/// Who can fix a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The caller passed something unusable (bad path, bad scale, bad buffer).
    Caller,
    /// The machine ran out of a resource.
    Resource,
    /// The document or the interpreter is at fault.
    Document,
    /// Nothing more specific is known.
    Unknown,
}

/// A human-readable failure with a plain summary and a suggestion.
#[derive(Debug, Clone)]
pub struct RenderFailure {
    /// Short summary shown on the placeholder page.
    pub message: String,
    /// What the user can try.
    pub suggestion: String,
    /// Always false: render failures are not transient.
    pub retriable: bool,
    pub kind: FailureKind,
}

/// Describe a `RenderError` for the "page failed to render" placeholder.
pub fn describe_failure(err: &RenderError) -> RenderFailure {
    let (message, suggestion, kind) = match err {
        RenderError::InvalidArguments(detail) => (
            "The page could not be requested.".to_string(),
            format!("Check the file path and zoom level. ({detail})"),
            FailureKind::Caller,
        ),
        RenderError::InvalidInput(detail) => (
            "The page image has an unexpected layout.".to_string(),
            format!("Try a different zoom level. ({detail})"),
            FailureKind::Caller,
        ),
        RenderError::OutOfMemory { bytes } => (
            "Not enough memory to show this page.".to_string(),
            format!("Zoom out and try again. ({bytes} bytes requested)"),
            FailureKind::Resource,
        ),
        RenderError::BackendFailure { cause, detail } => describe_backend_failure(*cause, detail),
        RenderError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => (
                "The document could not be found.".to_string(),
                "It may have been moved or deleted.".to_string(),
                FailureKind::Caller,
            ),
            std::io::ErrorKind::PermissionDenied => (
                "The document could not be opened.".to_string(),
                "You may not have permission to read it.".to_string(),
                FailureKind::Caller,
            ),
            _ => (
                "The document could not be read.".to_string(),
                io_err.to_string(),
                FailureKind::Unknown,
            ),
        },
        RenderError::Encode(detail) => (
            "The page image could not be saved.".to_string(),
            detail.clone(),
            FailureKind::Unknown,
        ),
        RenderError::Serialization(detail) => (
            "The viewer settings could not be read.".to_string(),
            format!("Fix or remove the config file. ({detail})"),
            FailureKind::Caller,
        ),
        RenderError::Unknown(detail) => (
            "This page failed to render.".to_string(),
            detail.clone(),
            FailureKind::Unknown,
        ),
    };

    RenderFailure {
        message,
        suggestion,
        retriable: false,
        kind,
    }
}

fn describe_backend_failure(cause: BackendCause, detail: &str) -> (String, String, FailureKind) {
    match cause {
        BackendCause::InterpreterUnavailable => (
            "The PostScript interpreter is not available.".to_string(),
            format!("Install Ghostscript or set its path in the viewer config. ({detail})"),
            FailureKind::Resource,
        ),
        BackendCause::NotPostScript => (
            "This file is not a PostScript document.".to_string(),
            "Open it with a viewer for its actual format.".to_string(),
            FailureKind::Document,
        ),
        BackendCause::Other => (
            "This page failed to render.".to_string(),
            format!("The document may be damaged. ({detail})"),
            FailureKind::Document,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failures_are_never_retriable() {
        let errors = [
            RenderError::backend("gs exited with status 1"),
            RenderError::OutOfMemory { bytes: 1 << 40 },
            RenderError::InvalidInput("empty source".into()),
            RenderError::Unknown("no data".into()),
        ];
        for err in &errors {
            assert!(!describe_failure(err).retriable, "{err}");
        }
    }

    #[test]
    fn missing_interpreter_is_a_resource_problem() {
        let err = RenderError::backend_with(
            BackendCause::InterpreterUnavailable,
            "interpreter gs could not start: No such file or directory",
        );
        assert_eq!(describe_failure(&err).kind, FailureKind::Resource);
    }

    #[test]
    fn interpreter_stderr_does_not_decide_the_kind() {
        let err = RenderError::backend(
            "gs exited with exit status: 1: Font Helvetica-Narrow not found, aborting",
        );
        let failure = describe_failure(&err);
        assert_eq!(failure.kind, FailureKind::Document);
        assert!(!failure.suggestion.contains("Install Ghostscript"));
    }

    #[test]
    fn foreign_file_is_a_document_problem() {
        let err = RenderError::backend_with(BackendCause::NotPostScript, "not a PostScript document");
        assert_eq!(describe_failure(&err).kind, FailureKind::Document);
    }

    #[test]
    fn broken_document_is_a_document_problem() {
        let err = RenderError::backend("gs exited with status 1");
        assert_eq!(describe_failure(&err).kind, FailureKind::Document);
    }

    #[test]
    fn missing_file_is_a_caller_problem() {
        let err = RenderError::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(describe_failure(&err).kind, FailureKind::Caller);
    }
}
