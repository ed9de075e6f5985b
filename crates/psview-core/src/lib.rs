// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// psview — Core raster types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod raster;
pub mod types;

pub use config::{GhostscriptConfig, ViewerConfig};
pub use error::{BackendCause, RenderError};
pub use raster::{ChannelLayout, SourceRaster, TargetSurface};
pub use types::*;
