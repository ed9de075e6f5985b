// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host render entry points.
//
// `render_image` produces a standalone RGB image at a uniform scale;
// `render_surface` fills a host-provided surface, deriving the scale from the
// surface size. Both ask the backend for a raster at the final resolution and
// hand it to the compositor.

use std::io::Cursor;

use image::{ImageFormat, RgbImage};
use psview_core::error::{RenderError, Result};
use psview_core::{ChannelLayout, Rotation, ScaleFactors, TargetSurface};
use tracing::{debug, instrument};

use crate::compositor::composite;
use crate::document::PsPage;

const RGB_CHANNELS: usize = 3;

/// Render `page` into a new tightly packed RGB image scaled by `scale`.
#[instrument(skip(page), fields(page = page.index()))]
pub fn render_image(page: &PsPage, scale: f64) -> Result<RgbImage> {
    let factors = ScaleFactors::uniform(scale)?;
    let (width, height) = page.size().scaled(factors);
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidArguments(format!(
            "scale {scale} reduces a {} page to {width}x{height} pixels",
            page.size()
        )));
    }

    let bytes = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(RGB_CHANNELS))
        .ok_or(RenderError::OutOfMemory { bytes: usize::MAX })?;
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(bytes)
        .map_err(|_| RenderError::OutOfMemory { bytes })?;
    buffer.resize(bytes, 0);

    let source = page.rasterise(factors, Rotation::None)?;
    {
        let mut target = TargetSurface::packed(width, height, ChannelLayout::Rgb, &mut buffer)?;
        composite(source, &mut target)?;
    }
    debug!(width, height, "page rendered to image");

    RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        RenderError::Unknown(format!("RGB buffer does not fit {width}x{height}"))
    })
}

/// Render `page` into a host surface, scaled to fill it.
///
/// `printing` is accepted for hosts that distinguish print output; pages are
/// rendered the same way either way.
#[instrument(skip(page, surface), fields(page = page.index(), width = surface.width(), height = surface.height()))]
pub fn render_surface(page: &PsPage, surface: &mut TargetSurface<'_>, printing: bool) -> Result<()> {
    let factors = ScaleFactors::from_target(surface.width(), surface.height(), page.size())?;
    let source = page.rasterise(factors, Rotation::None)?;
    composite(source, surface)?;
    debug!(layout = ?surface.layout(), "page rendered to surface");
    Ok(())
}

/// Encode an RGB image as PNG.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(|err| RenderError::Encode(format!("PNG encoding failed: {err}")))?;
    Ok(bytes.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PsDocument;
    use psview_backend::{MemoryBackend, MemoryDocumentSpec, MemoryPageSpec};
    use psview_core::PageSize;
    use std::path::Path;

    fn open(pages: Vec<MemoryPageSpec>) -> (MemoryBackend, PsDocument) {
        let backend = MemoryBackend::new();
        backend.insert(
            "/docs/page.eps",
            MemoryDocumentSpec {
                pages,
                ..Default::default()
            },
        );
        let doc = PsDocument::open(&backend, Path::new("/docs/page.eps")).expect("open");
        (backend, doc)
    }

    #[test]
    fn render_image_scales_and_drops_alpha() {
        let (_backend, doc) = open(vec![MemoryPageSpec::new(
            PageSize::new(40, 20),
            [200, 100, 50, 7],
        )]);
        let page = doc.page(0).expect("page");

        let image = render_image(&page, 0.5).expect("render");
        assert_eq!(image.dimensions(), (20, 10));
        assert_eq!(image.as_raw().len(), 20 * 10 * 3);
        assert!(image.pixels().all(|px| px.0 == [200, 100, 50]));
    }

    #[test]
    fn render_image_truncates_fractional_pixels() {
        let (_backend, doc) = open(vec![MemoryPageSpec::new(PageSize::new(10, 10), [1; 4])]);
        let page = doc.page(0).expect("page");
        assert_eq!(render_image(&page, 1.25).expect("render").dimensions(), (12, 12));
    }

    #[test]
    fn render_image_rejects_bad_scale() {
        let (_backend, doc) = open(vec![MemoryPageSpec::new(PageSize::new(10, 10), [1; 4])]);
        let page = doc.page(0).expect("page");
        for scale in [0.0, -1.0, f64::NAN, f64::INFINITY, 0.01] {
            let err = render_image(&page, scale).expect_err("bad scale");
            assert!(matches!(err, RenderError::InvalidArguments(_)), "scale {scale}");
        }
    }

    #[test]
    fn backend_failure_leaves_document_usable() {
        let (backend, doc) = open(vec![
            MemoryPageSpec::failing(PageSize::new(10, 10)),
            MemoryPageSpec::new(PageSize::new(10, 10), [9; 4]),
        ]);

        {
            let broken = doc.page(0).expect("page");
            let err = render_image(&broken, 1.0).expect_err("failing page");
            assert!(matches!(err, RenderError::BackendFailure { .. }));
        }
        assert_eq!(backend.live_handles(), 1);

        let page = doc.page(1).expect("page");
        assert!(render_image(&page, 1.0).is_ok());
    }

    #[test]
    fn render_surface_fills_an_rgba_surface_with_padding() {
        let (_backend, doc) = open(vec![MemoryPageSpec::new(
            PageSize::new(100, 50),
            [10, 20, 30, 40],
        )]);
        let page = doc.page(0).expect("page");

        let stride = 4 * 4 + 4;
        let mut buffer = vec![0u8; stride * 2];
        let mut surface =
            TargetSurface::new(4, 2, stride, ChannelLayout::Rgba, &mut buffer).unwrap();
        render_surface(&page, &mut surface, false).expect("render");

        assert_eq!(&buffer[..4], &[10, 20, 30, 40]);
        assert_eq!(&buffer[16..20], &[0, 0, 0, 0]);
        assert_eq!(&buffer[20..24], &[10, 20, 30, 40]);
    }

    #[test]
    fn render_surface_with_zero_size_is_invalid_scale() {
        let (_backend, doc) = open(vec![MemoryPageSpec::new(PageSize::new(10, 10), [1; 4])]);
        let page = doc.page(0).expect("page");
        let mut empty: [u8; 0] = [];
        let mut surface = TargetSurface::packed(0, 0, ChannelLayout::Rgb, &mut empty).unwrap();
        let err = render_surface(&page, &mut surface, true).expect_err("zero scale");
        assert!(matches!(err, RenderError::InvalidArguments(_)));
    }

    #[test]
    fn png_encoding_round_trips_dimensions() {
        let image = RgbImage::from_pixel(3, 2, image::Rgb([1, 2, 3]));
        let png = encode_png(&image).expect("encode");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).expect("decode").to_rgb8();
        assert_eq!(decoded, image);
    }
}
