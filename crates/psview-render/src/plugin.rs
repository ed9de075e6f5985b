// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plugin descriptor and the host-facing entry object.

use std::path::Path;

use psview_backend::RenderBackend;
use psview_core::error::Result;
use psview_core::{POSTSCRIPT_MIME_TYPES, ViewerConfig};
use tracing::info;

use crate::document::PsDocument;

/// Static description a host uses to decide which files to route here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginDescriptor {
    pub name: &'static str,
    pub version: &'static str,
    pub mime_types: &'static [&'static str],
}

impl PluginDescriptor {
    /// Whether `mime_type` is one this plugin handles. Matching is exact.
    pub fn supports_mime_type(&self, mime_type: &str) -> bool {
        self.mime_types.contains(&mime_type)
    }
}

/// Descriptor for the PostScript plugin.
pub const DESCRIPTOR: PluginDescriptor = PluginDescriptor {
    name: "ps",
    version: env!("CARGO_PKG_VERSION"),
    mime_types: POSTSCRIPT_MIME_TYPES,
};

/// A backend paired with viewer settings.
pub struct PsPlugin {
    backend: Box<dyn RenderBackend>,
    config: ViewerConfig,
}

impl PsPlugin {
    pub fn new(backend: Box<dyn RenderBackend>, config: ViewerConfig) -> Self {
        info!(
            plugin = DESCRIPTOR.name,
            version = DESCRIPTOR.version,
            backend = backend.name(),
            "plugin ready"
        );
        Self { backend, config }
    }

    pub fn descriptor(&self) -> &'static PluginDescriptor {
        &DESCRIPTOR
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    /// Open a document through the configured backend.
    pub fn open(&self, path: &Path) -> Result<PsDocument> {
        PsDocument::open(self.backend.as_ref(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psview_backend::{MemoryBackend, MemoryDocumentSpec, MemoryPageSpec};
    use psview_core::PageSize;

    #[test]
    fn descriptor_lists_postscript_types() {
        assert_eq!(DESCRIPTOR.name, "ps");
        assert_eq!(DESCRIPTOR.mime_types.len(), 5);
        assert!(DESCRIPTOR.supports_mime_type("application/postscript"));
        assert!(DESCRIPTOR.supports_mime_type("image/x-eps"));
    }

    #[test]
    fn mime_matching_is_exact() {
        assert!(!DESCRIPTOR.supports_mime_type("application/pdf"));
        assert!(!DESCRIPTOR.supports_mime_type("Application/PostScript"));
        assert!(!DESCRIPTOR.supports_mime_type("application/postscript; charset=binary"));
    }

    #[test]
    fn plugin_opens_through_injected_backend() {
        let backend = MemoryBackend::new();
        backend.insert(
            "/docs/a.ps",
            MemoryDocumentSpec {
                pages: vec![MemoryPageSpec::new(PageSize::LETTER, [0; 4])],
                ..Default::default()
            },
        );
        let plugin = PsPlugin::new(Box::new(backend.clone()), ViewerConfig::default());

        assert_eq!(plugin.backend().name(), "memory");
        let doc = plugin.open(Path::new("/docs/a.ps")).expect("open");
        assert_eq!(doc.page_count(), 1);
        drop(doc);
        assert_eq!(backend.live_handles(), 0);
    }
}
