// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// psview — command-line viewer for PostScript and EPS documents.
//
// Entry point. Initialises logging, loads the viewer configuration, builds
// the Ghostscript backend, and dispatches the requested subcommand.

mod config_dir;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use psview_core::human_errors::describe_failure;
use psview_core::{ChannelLayout, InformationField, RenderError, TargetSurface, ViewerConfig};
use psview_render::{PsDocument, PsPlugin, encode_png, render_image, render_surface};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "psview", version, about = "Inspect, render and convert PostScript documents")]
struct Cli {
    /// Configuration file (defaults to ~/.config/psview/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print page count, page sizes and document information.
    Info(InfoArgs),
    /// Render one page to a PNG.
    Render(RenderArgs),
    /// Save a copy; a `.pdf` destination converts to PDF.
    Save(SaveArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// PostScript or EPS file.
    file: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// PostScript or EPS file.
    file: PathBuf,

    /// Page number (1-based).
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Scale factor; defaults to the configured scale.
    #[arg(long, conflicts_with_all = ["width", "height"])]
    scale: Option<f64>,

    /// Output width in pixels; renders through an RGBA surface.
    #[arg(long, requires = "height")]
    width: Option<u32>,

    /// Output height in pixels.
    #[arg(long, requires = "width")]
    height: Option<u32>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SaveArgs {
    /// PostScript or EPS file.
    file: PathBuf,

    /// Destination path.
    dest: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let backend = psview_backend::default_backend(&config.ghostscript);
    let plugin = PsPlugin::new(backend, config);

    match cli.cmd {
        Command::Info(args) => cmd_info(&plugin, args),
        Command::Render(args) => cmd_render(&plugin, args),
        Command::Save(args) => cmd_save(&plugin, args),
    }
}

fn load_config(explicit: Option<&Path>) -> anyhow::Result<ViewerConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_dir::default_config_path() {
            Some(path) => path,
            None => {
                warn!("no home directory found, using default configuration");
                return Ok(ViewerConfig::default());
            }
        },
    };
    ViewerConfig::load(&path).with_context(|| format!("load config '{}'", path.display()))
}

fn open(plugin: &PsPlugin, path: &Path) -> anyhow::Result<PsDocument> {
    plugin
        .open(path)
        .map_err(explain)
        .with_context(|| format!("open document '{}'", path.display()))
}

/// Attach the user-facing suggestion to a render error.
fn explain(err: RenderError) -> anyhow::Error {
    let failure = describe_failure(&err);
    anyhow::Error::new(err).context(format!("{} ({})", failure.message, failure.suggestion))
}

fn cmd_info(plugin: &PsPlugin, args: InfoArgs) -> anyhow::Result<()> {
    let doc = open(plugin, &args.file)?;

    println!("File:   {}", doc.path().display());
    println!("Pages:  {}", doc.page_count());
    for index in 0..doc.page_count() {
        let page = doc.page(index).map_err(explain)?;
        println!("  page {:>3}: {}", index + 1, page.size());
    }
    let information = doc.information();
    for entry in &information {
        println!("{:<14} {}", format!("{}:", entry.field.label()), entry.value);
    }
    if !information
        .iter()
        .any(|entry| entry.field == InformationField::Author)
        && let Some(author) = doc.metadata_value(InformationField::Author)
    {
        println!("{:<14} {} (from creator)", "Author:", author);
    }
    Ok(())
}

fn cmd_render(plugin: &PsPlugin, args: RenderArgs) -> anyhow::Result<()> {
    let index = args
        .page
        .checked_sub(1)
        .context("page numbers start at 1")?;
    let doc = open(plugin, &args.file)?;
    let page = doc.page(index).map_err(explain)?;

    ensure_parent(&args.out)?;

    match (args.width, args.height) {
        (Some(width), Some(height)) => {
            let mut buffer = rgba_buffer(width, height).map_err(explain)?;
            {
                let mut surface =
                    TargetSurface::packed(width, height, ChannelLayout::Rgba, &mut buffer)
                        .map_err(explain)?;
                render_surface(&page, &mut surface, false).map_err(explain)?;
            }
            image::save_buffer_with_format(
                &args.out,
                &buffer,
                width,
                height,
                image::ExtendedColorType::Rgba8,
                image::ImageFormat::Png,
            )
            .with_context(|| format!("write PNG '{}'", args.out.display()))?;
            info!(width, height, out = %args.out.display(), "page written");
        }
        _ => {
            let scale = args.scale.unwrap_or(plugin.config().scale);
            let image = render_image(&page, scale).map_err(explain)?;
            let png = encode_png(&image).map_err(explain)?;
            std::fs::write(&args.out, png)
                .with_context(|| format!("write PNG '{}'", args.out.display()))?;
            info!(
                width = image.width(),
                height = image.height(),
                out = %args.out.display(),
                "page written"
            );
        }
    }
    Ok(())
}

/// Zeroed buffer for a packed `width` x `height` RGBA surface.
fn rgba_buffer(width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
    let bytes = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(RenderError::OutOfMemory { bytes: usize::MAX })?;
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(bytes)
        .map_err(|_| RenderError::OutOfMemory { bytes })?;
    buffer.resize(bytes, 0);
    Ok(buffer)
}

fn cmd_save(plugin: &PsPlugin, args: SaveArgs) -> anyhow::Result<()> {
    let doc = open(plugin, &args.file)?;
    ensure_parent(&args.dest)?;
    doc.save_as(&args.dest).map_err(explain)?;
    println!("Saved {}", args.dest.display());
    Ok(())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_defaults_to_first_page() {
        let cli = Cli::try_parse_from(["psview", "render", "doc.ps", "--out", "p.png"]).unwrap();
        match cli.cmd {
            Command::Render(args) => {
                assert_eq!(args.page, 1);
                assert_eq!(args.scale, None);
                assert_eq!(args.out, PathBuf::from("p.png"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn width_requires_height() {
        let result = Cli::try_parse_from([
            "psview", "render", "doc.ps", "--width", "100", "--out", "p.png",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn scale_conflicts_with_surface_size() {
        let result = Cli::try_parse_from([
            "psview", "render", "doc.ps", "--scale", "2", "--width", "100", "--height", "50",
            "--out", "p.png",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from([
            "psview", "save", "doc.ps", "doc.pdf", "--config", "/etc/psview.json",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/psview.json")));
        assert!(matches!(cli.cmd, Command::Save(_)));
    }

    #[test]
    fn surface_buffer_matches_geometry() {
        assert_eq!(rgba_buffer(3, 2).expect("small surface").len(), 24);
    }

    #[test]
    fn oversized_surface_is_out_of_memory() {
        for (width, height) in [(u32::MAX, u32::MAX), (u32::MAX, 1 << 20)] {
            let err = rgba_buffer(width, height).expect_err("too large");
            assert!(matches!(err, RenderError::OutOfMemory { .. }), "{width}x{height}");
        }
    }

    #[test]
    fn explained_errors_keep_the_cause() {
        let err = explain(RenderError::InvalidArguments("page index 9".to_string()));
        let rendered = format!("{err:#}");
        assert!(rendered.contains("page index 9"));
    }
}
