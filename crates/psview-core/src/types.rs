// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for psview: page geometry, scale, rotation, save format
// selection, and document metadata.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// MIME types handled by the PostScript plugin.
pub const POSTSCRIPT_MIME_TYPES: &[&str] = &[
    "application/postscript",
    "application/eps",
    "application/x-eps",
    "image/eps",
    "image/x-eps",
];

/// Natural (unscaled) page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

impl PageSize {
    /// US Letter, used when a document declares no bounding box.
    pub const LETTER: PageSize = PageSize {
        width: 612,
        height: 792,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel dimensions of this page rendered at `scale`.
    ///
    /// Fractional pixels are truncated.
    pub fn scaled(&self, scale: ScaleFactors) -> (u32, u32) {
        (
            (scale.x() * f64::from(self.width)) as u32,
            (scale.y() * f64::from(self.height)) as u32,
        )
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} pt", self.width, self.height)
    }
}

/// Ratio of rendered pixel dimensions to natural page dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    x: f64,
    y: f64,
}

impl ScaleFactors {
    /// Build scale factors, rejecting non-positive or non-finite ratios.
    pub fn new(x: f64, y: f64) -> Result<Self> {
        if !(x.is_finite() && x > 0.0 && y.is_finite() && y > 0.0) {
            return Err(RenderError::InvalidArguments(format!(
                "scale factors must be positive and finite, got ({x}, {y})"
            )));
        }
        Ok(Self { x, y })
    }

    /// Same factor on both axes.
    pub fn uniform(scale: f64) -> Result<Self> {
        Self::new(scale, scale)
    }

    /// Derive the factors that map a page of `page` size onto a
    /// `target_width` x `target_height` pixel surface.
    pub fn from_target(target_width: u32, target_height: u32, page: PageSize) -> Result<Self> {
        if page.width == 0 || page.height == 0 {
            return Err(RenderError::InvalidArguments(format!(
                "page has zero natural size ({page})"
            )));
        }
        Self::new(
            f64::from(target_width) / f64::from(page.width),
            f64::from(target_height) / f64::from(page.height),
        )
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

/// Clockwise page rotation applied by the backend while rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Map a degree value to a rotation. Only multiples of 90 are accepted.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        match degrees.rem_euclid(360) {
            0 => Ok(Self::None),
            90 => Ok(Self::Cw90),
            180 => Ok(Self::Cw180),
            270 => Ok(Self::Cw270),
            _ => Err(RenderError::InvalidArguments(format!(
                "rotation must be a multiple of 90, got {degrees}"
            ))),
        }
    }

    pub fn degrees(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Cw90 => 90,
            Self::Cw180 => 180,
            Self::Cw270 => 270,
        }
    }

    /// Whether the rotation swaps the width and height of the output.
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Self::Cw90 | Self::Cw270)
    }
}

/// Output format for saving a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveFormat {
    /// Copy in the document's own format (PostScript/EPS).
    Native,
    /// Convert to PDF.
    Pdf,
}

impl SaveFormat {
    /// Pick the save format from the destination path.
    ///
    /// Only an exact, case-sensitive `.pdf` suffix selects PDF export;
    /// `report.PDF` is saved natively.
    pub fn from_path(path: &Path) -> Self {
        if path.as_os_str().as_encoded_bytes().ends_with(b".pdf") {
            Self::Pdf
        } else {
            Self::Native
        }
    }
}

/// Document information fields exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InformationField {
    Creator,
    Title,
    Author,
    CreationDate,
}

impl InformationField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Creator => "Creator",
            Self::Title => "Title",
            Self::Author => "Author",
            Self::CreationDate => "Creation date",
        }
    }
}

/// One populated document information entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationEntry {
    pub field: InformationField,
    pub value: String,
}

/// Metadata reported by the backend. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub creator: Option<String>,
    pub title: Option<String>,
    /// The dedicated author value (`%%For:` in DSC documents).
    pub author: Option<String>,
    pub creation_date: Option<String>,
}

impl DocumentMetadata {
    /// Look up a single field. Empty strings count as absent.
    ///
    /// `Author` falls back to the creator when no author is recorded. Many
    /// PostScript producers only emit `%%Creator:`, but the two fields are
    /// distinct and the fallback may conflate them.
    pub fn get(&self, field: InformationField) -> Option<&str> {
        match field {
            InformationField::Creator => non_empty(&self.creator),
            InformationField::Title => non_empty(&self.title),
            InformationField::Author => {
                non_empty(&self.author).or_else(|| non_empty(&self.creator))
            }
            InformationField::CreationDate => non_empty(&self.creation_date),
        }
    }

    /// All populated fields in host order: creator, title, author, creation
    /// date. The author entry here is the dedicated value only.
    pub fn entries(&self) -> Vec<InformationEntry> {
        [
            (InformationField::Creator, &self.creator),
            (InformationField::Title, &self.title),
            (InformationField::Author, &self.author),
            (InformationField::CreationDate, &self.creation_date),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            non_empty(value).map(|v| InformationEntry {
                field,
                value: v.to_string(),
            })
        })
        .collect()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
