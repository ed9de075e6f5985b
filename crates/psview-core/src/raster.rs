// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixel rasters exchanged between the rendering backend and the host.
//
// A `SourceRaster` is what the backend hands back from a render call: RGBA,
// four bytes per pixel, rows possibly padded. A `TargetSurface` is a host
// buffer the compositor writes into: RGB or RGBA with its own row stride.
// Both constructors validate that the buffer covers the declared geometry,
// so row slicing on a constructed raster cannot go out of bounds.

use crate::error::{RenderError, Result};

/// Bytes per pixel in every source raster (R, G, B, A).
pub const SOURCE_CHANNELS: usize = 4;

/// Channel layout of a target surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    /// Three bytes per pixel; alpha is dropped.
    Rgb,
    /// Four bytes per pixel; alpha is copied.
    Rgba,
}

impl ChannelLayout {
    pub fn channel_count(&self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// A decoded page image produced by the rendering backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRaster {
    width: u32,
    height: u32,
    row_stride: usize,
    data: Vec<u8>,
}

impl SourceRaster {
    /// Wrap a backend buffer.
    ///
    /// `row_stride` must be at least `width * 4`, and `data` must hold every
    /// row up to the last pixel of the last row.
    pub fn new(width: u32, height: u32, row_stride: usize, data: Vec<u8>) -> Result<Self> {
        check_geometry("source", width, height, row_stride, SOURCE_CHANNELS, data.len())?;
        Ok(Self {
            width,
            height,
            row_stride,
            data,
        })
    }

    /// Build a tightly packed raster (`row_stride == width * 4`).
    pub fn packed(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, width as usize * SOURCE_CHANNELS, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn pixel_data(&self) -> &[u8] {
        &self.data
    }

    /// Whether the backend produced no pixel bytes at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The first `pixels` pixels of row `y`, without row padding.
    ///
    /// Callers must keep `y < height` and `pixels <= width`.
    pub fn row(&self, y: usize, pixels: usize) -> &[u8] {
        let start = y * self.row_stride;
        &self.data[start..start + pixels * SOURCE_CHANNELS]
    }
}

/// A caller-owned pixel buffer the compositor writes into.
#[derive(Debug)]
pub struct TargetSurface<'a> {
    width: u32,
    height: u32,
    row_stride: usize,
    layout: ChannelLayout,
    data: &'a mut [u8],
}

impl<'a> TargetSurface<'a> {
    /// Borrow a host buffer as a target surface.
    pub fn new(
        width: u32,
        height: u32,
        row_stride: usize,
        layout: ChannelLayout,
        data: &'a mut [u8],
    ) -> Result<Self> {
        check_geometry(
            "target",
            width,
            height,
            row_stride,
            layout.channel_count(),
            data.len(),
        )?;
        Ok(Self {
            width,
            height,
            row_stride,
            layout,
            data,
        })
    }

    /// Borrow a tightly packed host buffer.
    pub fn packed(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        data: &'a mut [u8],
    ) -> Result<Self> {
        Self::new(
            width,
            height,
            width as usize * layout.channel_count(),
            layout,
            data,
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn channel_count(&self) -> usize {
        self.layout.channel_count()
    }

    pub fn pixel_data(&self) -> &[u8] {
        &self.data[..]
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Mutable view of the first `pixels` pixels of row `y`.
    ///
    /// Callers must keep `y < height` and `pixels <= width`.
    pub fn row_mut(&mut self, y: usize, pixels: usize) -> &mut [u8] {
        let start = y * self.row_stride;
        let len = pixels * self.layout.channel_count();
        &mut self.data[start..start + len]
    }
}

/// Bytes needed to hold `height` rows of `width` pixels at `row_stride`.
/// The last row does not need its padding.
fn required_len(width: u32, height: u32, row_stride: usize, channels: usize) -> Option<usize> {
    if width == 0 || height == 0 {
        return Some(0);
    }
    let row_bytes = (width as usize).checked_mul(channels)?;
    row_stride
        .checked_mul(height as usize - 1)?
        .checked_add(row_bytes)
}

fn check_geometry(
    label: &str,
    width: u32,
    height: u32,
    row_stride: usize,
    channels: usize,
    len: usize,
) -> Result<()> {
    let row_bytes = (width as usize).checked_mul(channels).ok_or_else(|| {
        RenderError::InvalidInput(format!("{label} width {width} overflows a row"))
    })?;
    if row_stride < row_bytes {
        return Err(RenderError::InvalidInput(format!(
            "{label} row stride {row_stride} is smaller than {width} pixels x {channels} channels"
        )));
    }
    let needed = required_len(width, height, row_stride, channels).ok_or_else(|| {
        RenderError::InvalidInput(format!("{label} geometry {width}x{height} overflows"))
    })?;
    if len < needed {
        return Err(RenderError::InvalidInput(format!(
            "{label} buffer holds {len} bytes, {width}x{height} at stride {row_stride} needs {needed}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_accepts_padded_rows() {
        let raster = SourceRaster::new(2, 2, 12, vec![0u8; 24]).expect("valid");
        assert_eq!(raster.row(1, 2).len(), 8);
    }

    #[test]
    fn source_last_row_may_omit_padding() {
        // 12 bytes for row 0, 8 bytes for row 1.
        assert!(SourceRaster::new(2, 2, 12, vec![0u8; 20]).is_ok());
        assert!(SourceRaster::new(2, 2, 12, vec![0u8; 19]).is_err());
    }

    #[test]
    fn source_stride_below_row_width_is_rejected() {
        let err = SourceRaster::new(4, 1, 15, vec![0u8; 16]).unwrap_err();
        assert!(matches!(err, RenderError::InvalidInput(_)));
    }

    #[test]
    fn target_checks_its_own_channel_count() {
        let mut rgb = vec![0u8; 6];
        assert!(TargetSurface::packed(2, 1, ChannelLayout::Rgb, &mut rgb).is_ok());

        let mut short = vec![0u8; 6];
        assert!(TargetSurface::packed(2, 1, ChannelLayout::Rgba, &mut short).is_err());
    }

    #[test]
    fn zero_sized_rasters_need_no_bytes() {
        assert!(SourceRaster::new(0, 5, 0, Vec::new()).is_ok());
        let mut empty: Vec<u8> = Vec::new();
        assert!(TargetSurface::new(3, 0, 12, ChannelLayout::Rgba, &mut empty).is_ok());
    }
}
