// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster compositor — copies a rendered RGBA page into a host surface.
//
// The copy is a straight per-pixel channel transfer. Scaling happens upstream
// (the backend renders at the requested resolution), so both rasters are
// walked in lockstep. Source rows are addressed through their own stride and
// never assumed to be tightly packed.

use psview_core::error::{RenderError, Result};
use psview_core::raster::SOURCE_CHANNELS;
use psview_core::{ChannelLayout, SourceRaster, TargetSurface};
use tracing::debug;

/// Copy `source` into `target`, dropping alpha for RGB targets.
///
/// The copied region is the overlap of the two rasters; target pixels outside
/// it are left as they were. The source is consumed and released when the
/// call returns.
pub fn composite(source: SourceRaster, target: &mut TargetSurface<'_>) -> Result<()> {
    if source.is_empty() {
        return Err(RenderError::InvalidInput(
            "source raster has no pixel data".to_string(),
        ));
    }
    if target.width() == 0 || target.height() == 0 {
        return Ok(());
    }
    if target.is_empty() {
        return Err(RenderError::InvalidInput(
            "target surface has no pixel data".to_string(),
        ));
    }

    let columns = target.width().min(source.width()) as usize;
    let rows = target.height().min(source.height()) as usize;
    if columns < target.width() as usize || rows < target.height() as usize {
        debug!(
            source_width = source.width(),
            source_height = source.height(),
            target_width = target.width(),
            target_height = target.height(),
            "target larger than source, copying the overlap"
        );
    }

    match target.layout() {
        ChannelLayout::Rgba => {
            for y in 0..rows {
                target
                    .row_mut(y, columns)
                    .copy_from_slice(source.row(y, columns));
            }
        }
        ChannelLayout::Rgb => {
            for y in 0..rows {
                let src = source.row(y, columns);
                let dst = target.row_mut(y, columns);
                for (out, pixel) in dst.chunks_exact_mut(3).zip(src.chunks_exact(SOURCE_CHANNELS)) {
                    out.copy_from_slice(&pixel[..3]);
                }
            }
        }
    }

    Ok(())
}
