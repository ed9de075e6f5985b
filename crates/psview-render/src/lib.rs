// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// psview-render — Page rendering for the psview PostScript adapter.
//
// Provides the raster compositor, owned document and page handles over an
// injected backend, the host render entry points (standalone RGB image or
// host surface), and the plugin descriptor.

pub mod compositor;
pub mod document;
pub mod plugin;
pub mod render;

// Re-export the primary items so callers can use `psview_render::PsDocument` etc.
pub use compositor::composite;
pub use document::{PsDocument, PsPage};
pub use plugin::{DESCRIPTOR, PluginDescriptor, PsPlugin};
pub use render::{encode_png, render_image, render_surface};
