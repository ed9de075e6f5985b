// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trait definitions for the document rendering backend.
//
// The adapter never talks to an interpreter directly. It is handed a
// `RenderBackend` and works through the document and page handles that
// backend returns. Handles are owned values: dropping one releases whatever
// the backend holds for it.

use std::path::Path;

use psview_core::error::Result;
use psview_core::{DocumentMetadata, PageSize, Rotation, SaveFormat, ScaleFactors, SourceRaster};

/// Entry point of a rendering backend.
pub trait RenderBackend: Send + Sync {
    /// Short backend name for logs (e.g. "ghostscript").
    fn name(&self) -> &str;

    /// Load the document at `path`.
    ///
    /// Fails with `BackendFailure` when the backend cannot interpret the file.
    fn open(&self, path: &Path) -> Result<Box<dyn BackendDocument>>;
}

/// An open document owned by the caller.
pub trait BackendDocument: Send {
    /// Number of pages the backend found.
    fn page_count(&self) -> usize;

    /// Acquire a handle for the page at zero-based `index`.
    fn page(&self, index: usize) -> Result<Box<dyn BackendPage>>;

    /// Write the document to `path`, converting when `format` asks for it.
    fn save(&self, path: &Path, format: SaveFormat) -> Result<()>;

    /// Document information; any field may be absent.
    fn metadata(&self) -> DocumentMetadata;
}

/// A page handle owned by the caller.
pub trait BackendPage: Send {
    /// Natural page size in points.
    fn size(&self) -> PageSize;

    /// Rasterise the page directly at the requested scale.
    ///
    /// The returned raster is RGBA and may carry padded rows. Its dimensions
    /// are the scaled page size, with width and height swapped for quarter
    /// turns.
    fn render(&self, scale: ScaleFactors, rotation: Rotation) -> Result<SourceRaster>;
}
