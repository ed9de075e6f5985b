// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document and page handles as seen by the host.
//
// A `PsDocument` owns the backend document handle and a `PsPage` owns the
// backend page handle. Both release their backend resources when dropped,
// whichever path the caller leaves by.

use std::path::{Path, PathBuf};

use psview_backend::{BackendDocument, BackendPage, RenderBackend};
use psview_core::error::{RenderError, Result};
use psview_core::{
    DocumentMetadata, InformationEntry, InformationField, PageSize, Rotation, SaveFormat,
    ScaleFactors, SourceRaster,
};
use tracing::{debug, info, instrument};

/// An open PostScript document.
pub struct PsDocument {
    path: PathBuf,
    page_count: usize,
    inner: Box<dyn BackendDocument>,
}

impl PsDocument {
    /// Open `path` through `backend`.
    #[instrument(skip_all, fields(backend = backend.name(), path = %path.display()))]
    pub fn open(backend: &dyn RenderBackend, path: &Path) -> Result<Self> {
        if path.as_os_str().is_empty() {
            return Err(RenderError::InvalidArguments(
                "document path is empty".to_string(),
            ));
        }

        let inner = backend.open(path)?;
        let page_count = inner.page_count();
        info!(page_count, "document loaded");

        Ok(Self {
            path: path.to_path_buf(),
            page_count,
            inner,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Page count recorded when the document was opened.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Acquire the page at zero-based `index`.
    pub fn page(&self, index: usize) -> Result<PsPage> {
        if index >= self.page_count {
            return Err(RenderError::InvalidArguments(format!(
                "page index {index} out of range, document has {} pages",
                self.page_count
            )));
        }
        let inner = self.inner.page(index)?;
        let size = inner.size();
        debug!(index, %size, "page acquired");
        Ok(PsPage { index, size, inner })
    }

    /// Save a copy to `path`. A `.pdf` suffix converts to PDF, anything else
    /// keeps the native format.
    #[instrument(skip_all, fields(source = %self.path.display(), dest = %path.display()))]
    pub fn save_as(&self, path: &Path) -> Result<()> {
        if path.as_os_str().is_empty() {
            return Err(RenderError::InvalidArguments(
                "destination path is empty".to_string(),
            ));
        }
        let format = SaveFormat::from_path(path);
        self.inner.save(path, format)?;
        info!(?format, "document saved");
        Ok(())
    }

    /// Raw metadata as reported by the backend.
    pub fn metadata(&self) -> DocumentMetadata {
        self.inner.metadata()
    }

    /// Information entries shown by the host: creator, title, author and
    /// creation date, skipping whatever the document does not declare.
    pub fn information(&self) -> Vec<InformationEntry> {
        self.metadata().entries()
    }

    /// A single information value. `Author` falls back to the creator when
    /// the document names no author.
    pub fn metadata_value(&self, field: InformationField) -> Option<String> {
        self.metadata().get(field).map(str::to_owned)
    }
}

impl Drop for PsDocument {
    fn drop(&mut self) {
        debug!(path = %self.path.display(), "document released");
    }
}

/// A page of an open document.
pub struct PsPage {
    index: usize,
    size: PageSize,
    inner: Box<dyn BackendPage>,
}

impl PsPage {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Natural size in points.
    pub fn size(&self) -> PageSize {
        self.size
    }

    pub(crate) fn rasterise(&self, scale: ScaleFactors, rotation: Rotation) -> Result<SourceRaster> {
        self.inner.render(scale, rotation)
    }
}

impl std::fmt::Debug for PsPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PsPage")
            .field("index", &self.index)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for PsDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PsDocument")
            .field("path", &self.path)
            .field("page_count", &self.page_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psview_backend::{MemoryBackend, MemoryDocumentSpec, MemoryPageSpec};

    fn backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.insert(
            "/docs/report.ps",
            MemoryDocumentSpec {
                pages: vec![
                    MemoryPageSpec::new(PageSize::new(612, 792), [255; 4]),
                    MemoryPageSpec::new(PageSize::new(792, 612), [0, 0, 0, 255]),
                ],
                metadata: DocumentMetadata {
                    creator: Some("dvips".to_string()),
                    title: Some("Quarterly report".to_string()),
                    author: None,
                    creation_date: Some("2026-01-05".to_string()),
                },
                fail_save: false,
            },
        );
        backend
    }

    #[test]
    fn open_records_page_count() {
        let backend = backend();
        let doc = PsDocument::open(&backend, Path::new("/docs/report.ps")).expect("open");
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page(1).expect("page").size(), PageSize::new(792, 612));
    }

    #[test]
    fn empty_path_is_rejected_before_the_backend() {
        let err = PsDocument::open(&backend(), Path::new("")).expect_err("empty path");
        assert!(matches!(err, RenderError::InvalidArguments(_)));
    }

    #[test]
    fn backend_open_failure_is_propagated() {
        let err = PsDocument::open(&backend(), Path::new("/docs/missing.ps")).expect_err("missing");
        assert!(matches!(err, RenderError::BackendFailure { .. }));
    }

    #[test]
    fn page_index_past_the_end_is_invalid() {
        let doc = PsDocument::open(&backend(), Path::new("/docs/report.ps")).expect("open");
        let err = doc.page(2).expect_err("out of range");
        assert!(matches!(err, RenderError::InvalidArguments(_)));
    }

    #[test]
    fn handles_released_when_document_and_page_drop() {
        let backend = backend();
        {
            let doc = PsDocument::open(&backend, Path::new("/docs/report.ps")).expect("open");
            let _first = doc.page(0).expect("page");
            let _second = doc.page(1).expect("page");
            assert_eq!(backend.live_handles(), 3);
        }
        assert_eq!(backend.live_handles(), 0);
    }

    #[test]
    fn save_routes_on_exact_pdf_suffix() {
        let backend = backend();
        let doc = PsDocument::open(&backend, Path::new("/docs/report.ps")).expect("open");
        doc.save_as(Path::new("/out/report.pdf")).expect("pdf");
        doc.save_as(Path::new("/out/report.PDF")).expect("native");
        doc.save_as(Path::new("/out/report.ps")).expect("native");

        let formats: Vec<SaveFormat> = backend.saves().into_iter().map(|s| s.format).collect();
        assert_eq!(
            formats,
            vec![SaveFormat::Pdf, SaveFormat::Native, SaveFormat::Native]
        );
    }

    #[test]
    fn save_failure_is_reported() {
        let backend = MemoryBackend::new();
        backend.insert(
            "/docs/locked.ps",
            MemoryDocumentSpec {
                pages: vec![MemoryPageSpec::new(PageSize::LETTER, [0; 4])],
                fail_save: true,
                ..Default::default()
            },
        );
        let doc = PsDocument::open(&backend, Path::new("/docs/locked.ps")).expect("open");
        let err = doc.save_as(Path::new("/out/locked.pdf")).expect_err("refused");
        assert!(matches!(err, RenderError::BackendFailure { .. }));
        assert!(backend.saves().is_empty());
    }

    #[test]
    fn author_falls_back_to_creator() {
        let doc = PsDocument::open(&backend(), Path::new("/docs/report.ps")).expect("open");
        assert_eq!(
            doc.metadata_value(InformationField::Author).as_deref(),
            Some("dvips")
        );
        assert_eq!(
            doc.metadata_value(InformationField::Title).as_deref(),
            Some("Quarterly report")
        );
    }

    #[test]
    fn information_lists_declared_fields_in_order() {
        let doc = PsDocument::open(&backend(), Path::new("/docs/report.ps")).expect("open");
        let fields: Vec<InformationField> = doc.information().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                InformationField::Creator,
                InformationField::Title,
                InformationField::CreationDate,
            ]
        );
    }
}
