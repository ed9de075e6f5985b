// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory backend serving synthetic documents.
//
// Documents are registered under a path and render as solid fills at the
// requested scale. Rows are padded with a sentinel byte so consumers that
// ignore the row stride show up immediately. Saves are recorded instead of
// written, and live handles are counted so callers can verify release.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use psview_core::error::{RenderError, Result};
use psview_core::{
    DocumentMetadata, PageSize, Rotation, SaveFormat, ScaleFactors, SourceRaster,
};
use tracing::{debug, warn};

use crate::traits::{BackendDocument, BackendPage, RenderBackend};

/// Padding appended to every rendered row.
pub const ROW_PADDING: usize = 8;

/// Value written into row padding.
pub const PADDING_BYTE: u8 = 0xEE;

/// One synthetic page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryPageSpec {
    pub size: PageSize,
    /// RGBA colour of every rendered pixel.
    pub fill: [u8; 4],
    /// Make `render` report a backend failure.
    pub fail_render: bool,
}

impl MemoryPageSpec {
    pub fn new(size: PageSize, fill: [u8; 4]) -> Self {
        Self {
            size,
            fill,
            fail_render: false,
        }
    }

    pub fn failing(size: PageSize) -> Self {
        Self {
            size,
            fill: [0; 4],
            fail_render: true,
        }
    }
}

/// One synthetic document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDocumentSpec {
    pub pages: Vec<MemoryPageSpec>,
    pub metadata: DocumentMetadata,
    /// Make `save` report a backend failure.
    pub fail_save: bool,
}

/// A save the backend was asked to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDocument {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub format: SaveFormat,
}

#[derive(Default)]
struct Registry {
    documents: HashMap<PathBuf, MemoryDocumentSpec>,
    saves: Vec<SavedDocument>,
}

/// Backend serving documents from an in-process registry.
///
/// Cheap to clone; clones share the registry, save log and handle count.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    registry: Arc<Mutex<Registry>>,
    live_handles: Arc<AtomicUsize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the document served at `path`.
    pub fn insert(&self, path: impl Into<PathBuf>, spec: MemoryDocumentSpec) {
        self.lock().documents.insert(path.into(), spec);
    }

    /// Saves performed so far, oldest first.
    pub fn saves(&self) -> Vec<SavedDocument> {
        self.lock().saves.clone()
    }

    /// Document and page handles that have not been dropped yet.
    pub fn live_handles(&self) -> usize {
        self.live_handles.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire(&self) -> HandleGuard {
        self.live_handles.fetch_add(1, Ordering::SeqCst);
        HandleGuard {
            counter: Arc::clone(&self.live_handles),
        }
    }
}

impl RenderBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn open(&self, path: &Path) -> Result<Box<dyn BackendDocument>> {
        let spec = self.lock().documents.get(path).cloned().ok_or_else(|| {
            RenderError::backend(format!("no document registered at {}", path.display()))
        })?;
        debug!(path = %path.display(), pages = spec.pages.len(), "memory document opened");
        Ok(Box::new(MemoryDocument {
            path: path.to_path_buf(),
            spec,
            backend: self.clone(),
            _handle: self.acquire(),
        }))
    }
}

/// Decrements the live handle count when dropped.
struct HandleGuard {
    counter: Arc<AtomicUsize>,
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

struct MemoryDocument {
    path: PathBuf,
    spec: MemoryDocumentSpec,
    backend: MemoryBackend,
    _handle: HandleGuard,
}

impl BackendDocument for MemoryDocument {
    fn page_count(&self) -> usize {
        self.spec.pages.len()
    }

    fn page(&self, index: usize) -> Result<Box<dyn BackendPage>> {
        let spec = self.spec.pages.get(index).cloned().ok_or_else(|| {
            RenderError::backend(format!(
                "page {index} does not exist (document has {} pages)",
                self.spec.pages.len()
            ))
        })?;
        Ok(Box::new(MemoryPage {
            spec,
            _handle: self.backend.acquire(),
        }))
    }

    fn save(&self, path: &Path, format: SaveFormat) -> Result<()> {
        if self.spec.fail_save {
            warn!(path = %path.display(), "memory document refused to save");
            return Err(RenderError::backend(format!(
                "cannot save {} to {}",
                self.path.display(),
                path.display()
            )));
        }
        self.backend.lock().saves.push(SavedDocument {
            source: self.path.clone(),
            destination: path.to_path_buf(),
            format,
        });
        Ok(())
    }

    fn metadata(&self) -> DocumentMetadata {
        self.spec.metadata.clone()
    }
}

struct MemoryPage {
    spec: MemoryPageSpec,
    _handle: HandleGuard,
}

impl BackendPage for MemoryPage {
    fn size(&self) -> PageSize {
        self.spec.size
    }

    fn render(&self, scale: ScaleFactors, rotation: Rotation) -> Result<SourceRaster> {
        if self.spec.fail_render {
            return Err(RenderError::backend(
                "synthetic page configured to fail".to_string(),
            ));
        }

        let (mut width, mut height) = self.spec.size.scaled(scale);
        if rotation.swaps_axes() {
            std::mem::swap(&mut width, &mut height);
        }

        let row_bytes = width as usize * 4;
        let stride = row_bytes + ROW_PADDING;
        let mut data = Vec::with_capacity(stride * height as usize);
        for _ in 0..height {
            for _ in 0..width {
                data.extend_from_slice(&self.spec.fill);
            }
            data.extend(std::iter::repeat_n(PADDING_BYTE, ROW_PADDING));
        }

        SourceRaster::new(width, height, stride, data)
    }
}
