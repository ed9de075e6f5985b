// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// psview-backend — Rendering backend abstraction.
//
// Defines the traits the adapter uses to open documents, acquire pages and
// rasterise them, plus two implementations: a Ghostscript subprocess backend
// for real documents and an in-memory backend that serves synthetic pages.

pub mod ghostscript;
pub mod memory;
pub mod traits;

pub use ghostscript::GhostscriptBackend;
pub use memory::{MemoryBackend, MemoryDocumentSpec, MemoryPageSpec};
pub use traits::{BackendDocument, BackendPage, RenderBackend};

use psview_core::GhostscriptConfig;

/// Build the backend used for documents on disk.
///
/// Returns a boxed trait object so callers stay independent of the concrete
/// interpreter.
pub fn default_backend(config: &GhostscriptConfig) -> Box<dyn RenderBackend> {
    Box::new(GhostscriptBackend::new(config.clone()))
}
