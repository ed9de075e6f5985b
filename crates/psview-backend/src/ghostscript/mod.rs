// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ghostscript backend — delegates PostScript interpretation to an external
// `gs` process.
//
// Document structure and metadata come from the DSC comments (see `dsc`).
// Rendering writes a single-page program to a temporary directory, runs the
// interpreter with the `pngalpha` device at the requested resolution, and
// decodes the result into an RGBA raster. The temporary directory is removed
// when the render call returns, on success and failure alike.

pub mod dsc;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use image::RgbaImage;
use psview_core::error::{RenderError, Result};
use psview_core::{
    BackendCause, DocumentMetadata, GhostscriptConfig, PageSize, Rotation, SaveFormat, ScaleFactors,
    SourceRaster,
};
use tracing::{debug, info, instrument, warn};

use crate::traits::{BackendDocument, BackendPage, RenderBackend};
use dsc::{BoundingBox, DscDocument};

/// PostScript points per inch; the interpreter's default resolution.
const POINTS_PER_INCH: f64 = 72.0;

/// Backend running the Ghostscript interpreter as a subprocess.
pub struct GhostscriptBackend {
    config: GhostscriptConfig,
}

impl GhostscriptBackend {
    pub fn new(config: GhostscriptConfig) -> Self {
        Self { config }
    }
}

/// A loaded program shared by a document and its pages.
struct Program {
    path: PathBuf,
    source: Vec<u8>,
    structure: DscDocument,
    config: GhostscriptConfig,
}

impl RenderBackend for GhostscriptBackend {
    fn name(&self) -> &str {
        "ghostscript"
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    fn open(&self, path: &Path) -> Result<Box<dyn BackendDocument>> {
        let data = std::fs::read(path)?;
        let source = dsc::extract_postscript(&data)?.to_vec();
        let structure = dsc::parse(&source);

        info!(
            pages = structure.page_count(),
            declared_pages = ?structure.declared_pages,
            "PostScript document opened"
        );
        if let Some(declared) = structure.declared_pages
            && declared as usize != structure.pages.len()
            && !structure.pages.is_empty()
        {
            warn!(
                declared,
                found = structure.pages.len(),
                "%%Pages disagrees with page sections, using sections"
            );
        }

        Ok(Box::new(GhostscriptDocument {
            program: Arc::new(Program {
                path: path.to_path_buf(),
                source,
                structure,
                config: self.config.clone(),
            }),
        }))
    }
}

struct GhostscriptDocument {
    program: Arc<Program>,
}

impl BackendDocument for GhostscriptDocument {
    fn page_count(&self) -> usize {
        self.program.structure.page_count()
    }

    fn page(&self, index: usize) -> Result<Box<dyn BackendPage>> {
        if index >= self.page_count() {
            return Err(RenderError::backend(format!(
                "page {index} does not exist (document has {} pages)",
                self.page_count()
            )));
        }
        Ok(Box::new(GhostscriptPage {
            program: Arc::clone(&self.program),
            index,
            size: self.program.structure.page_size(index),
        }))
    }

    #[instrument(skip_all, fields(path = %path.display()))]
    fn save(&self, path: &Path, format: SaveFormat) -> Result<()> {
        match format {
            SaveFormat::Native => {
                std::fs::copy(&self.program.path, path)?;
                info!("document copied");
            }
            SaveFormat::Pdf => {
                let args = pdf_export_args(&self.program.path, path);
                run_interpreter(&self.program.config, &args)?;
                if !path.is_file() {
                    return Err(RenderError::backend(format!(
                        "interpreter wrote no PDF to {}",
                        path.display()
                    )));
                }
                info!("document converted to PDF");
            }
        }
        Ok(())
    }

    fn metadata(&self) -> DocumentMetadata {
        self.program.structure.metadata.clone()
    }
}

struct GhostscriptPage {
    program: Arc<Program>,
    index: usize,
    size: PageSize,
}

impl BackendPage for GhostscriptPage {
    fn size(&self) -> PageSize {
        self.size
    }

    #[instrument(skip(self), fields(page = self.index, scale_x = scale.x(), scale_y = scale.y()))]
    fn render(&self, scale: ScaleFactors, rotation: Rotation) -> Result<SourceRaster> {
        let (width, height) = self.size.scaled(scale);
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidArguments(format!(
                "page {} renders to an empty {width}x{height} image at this scale",
                self.index
            )));
        }

        let job = self
            .program
            .structure
            .page_program(&self.program.source, self.index)
            .ok_or_else(|| RenderError::backend(format!("page {} has no program", self.index)))?;

        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join("page.ps");
        let output = workdir.path().join("page.png");
        std::fs::write(&input, &job)?;

        let origin = self.program.structure.page_box(self.index);
        let args = render_args(
            &self.program.config,
            scale,
            origin,
            (width, height),
            &input,
            &output,
        );
        run_interpreter(&self.program.config, &args)?;

        let decoded = image::open(&output).map_err(|err| {
            RenderError::backend(format!("interpreter produced no readable page image: {err}"))
        })?;
        let rotated = rotate(decoded.to_rgba8(), rotation);
        let (out_w, out_h) = rotated.dimensions();
        debug!(width = out_w, height = out_h, "page rasterised");

        SourceRaster::packed(out_w, out_h, rotated.into_raw())
    }
}

fn rotate(image: RgbaImage, rotation: Rotation) -> RgbaImage {
    match rotation {
        Rotation::None => image,
        Rotation::Cw90 => image::imageops::rotate90(&image),
        Rotation::Cw180 => image::imageops::rotate180(&image),
        Rotation::Cw270 => image::imageops::rotate270(&image),
    }
}

/// Anti-aliasing bit counts the interpreter accepts are 1, 2 and 4.
fn alpha_bits(bits: u8) -> u8 {
    match bits {
        0 | 1 => 1,
        2 | 3 => 2,
        _ => 4,
    }
}

/// Interpreter arguments for rasterising one page.
fn render_args(
    config: &GhostscriptConfig,
    scale: ScaleFactors,
    origin: Option<BoundingBox>,
    (width, height): (u32, u32),
    input: &Path,
    output: &Path,
) -> Vec<OsString> {
    let (llx, lly) = origin.map_or((0, 0), |bbox| (bbox.llx, bbox.lly));
    let mut output_arg = OsString::from("-sOutputFile=");
    output_arg.push(output);

    vec![
        "-q".into(),
        "-dSAFER".into(),
        "-dBATCH".into(),
        "-dNOPAUSE".into(),
        "-dFIXEDMEDIA".into(),
        "-sDEVICE=pngalpha".into(),
        format!("-dTextAlphaBits={}", alpha_bits(config.text_alpha_bits)).into(),
        format!("-dGraphicsAlphaBits={}", alpha_bits(config.graphics_alpha_bits)).into(),
        format!(
            "-r{:.3}x{:.3}",
            POINTS_PER_INCH * scale.x(),
            POINTS_PER_INCH * scale.y()
        )
        .into(),
        format!("-g{width}x{height}").into(),
        output_arg,
        "-c".into(),
        format!("<< /PageOffset [{} {}] >> setpagedevice", -llx, -lly).into(),
        "-f".into(),
        input.as_os_str().to_os_string(),
    ]
}

/// Interpreter arguments for converting a whole document to PDF.
fn pdf_export_args(input: &Path, output: &Path) -> Vec<OsString> {
    let mut output_arg = OsString::from("-sOutputFile=");
    output_arg.push(output);
    vec![
        "-q".into(),
        "-dSAFER".into(),
        "-dBATCH".into(),
        "-dNOPAUSE".into(),
        "-sDEVICE=pdfwrite".into(),
        output_arg,
        "-f".into(),
        input.as_os_str().to_os_string(),
    ]
}

/// Run the interpreter to completion, mapping every failure to
/// `BackendFailure`.
fn run_interpreter(config: &GhostscriptConfig, args: &[OsString]) -> Result<()> {
    let executable = &config.executable;
    debug!(executable = %executable.display(), ?args, "running interpreter");

    let output = Command::new(executable).args(args).output().map_err(|err| {
        RenderError::backend_with(
            BackendCause::InterpreterUnavailable,
            format!(
                "interpreter {} could not start: {err}",
                executable.display()
            ),
        )
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(status = %output.status, stderr = %stderr.trim(), "interpreter failed");
        return Err(RenderError::backend(format!(
            "{} exited with {}: {}",
            executable.display(),
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}
