mod error;
mod fonts;
mod layout;
mod names_reader;
mod renderer;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use env_logger::Env;
use image::Rgba;
use log::{debug, error, info};
use std::path::PathBuf;

use crate::fonts::{parse_color, FontSet, TrueTypeFace};
use crate::layout::LayoutConfig;
use crate::names_reader::read_names;
use crate::renderer::{CertificateRenderer, Template};

pub const ANCHOR_RATIO: f32 = 0.5;
pub const LINE_SPACING: f32 = 52.0;
pub const DATE_SPACING_FACTOR: f32 = 1.7;
pub const MULTILINE_SPACING: f32 = 4.0;
pub const REGULAR_FONT_SIZE: f32 = 40.0;
pub const BOLD_FONT_SIZE: f32 = 42.0;
pub const FONT_COLOR: &str = "#5E113D";

#[derive(Parser, Debug)]
#[command(name = "certgen", version, about = "Batch-render certificates from an image template")]
struct Cli {
    #[arg(long = "names", value_name = "FILE", default_value = "names.txt")]
    #[arg(help = "Newline-separated recipient names")]
    names_path: PathBuf,

    #[arg(long = "template", value_name = "IMAGE", default_value = "template.png")]
    template_path: PathBuf,

    #[arg(short = 'o', long = "output-dir", value_name = "DIR", default_value = "out")]
    output_dir: PathBuf,

    #[arg(long = "regular-font", value_name = "TTF", default_value = "./font/Arial.ttf")]
    regular_font: PathBuf,

    #[arg(long = "bold-font", value_name = "TTF", default_value = "./font/Arial_Bold.ttf")]
    bold_font: PathBuf,

    #[arg(long = "regular-size", default_value_t = REGULAR_FONT_SIZE)]
    regular_size: f32,

    #[arg(long = "bold-size", default_value_t = BOLD_FONT_SIZE)]
    bold_size: f32,

    #[arg(long = "color", value_name = "HEX", default_value = FONT_COLOR)]
    #[arg(value_parser = parse_color_arg)]
    color: Rgba<u8>,

    #[arg(long = "layout", value_name = "JSON")]
    #[arg(help = "Certificate wording and spacing; defaults to the built-in layout")]
    layout: Option<PathBuf>,

    #[arg(long = "print-layout", help = "Print the built-in layout as JSON and exit")]
    print_layout: bool,

    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbosity: u8,
}

fn parse_color_arg(s: &str) -> std::result::Result<Rgba<u8>, String> {
    parse_color(s).map_err(|e| e.to_string())
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbosity);

    if let Err(e) = run(cli) {
        error!("An error occurred: {:#}", e);
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.print_layout {
        println!("{}", serde_json::to_string_pretty(&LayoutConfig::default())?);
        return Ok(());
    }

    let names = read_names(&cli.names_path)?;
    if names.is_empty() {
        info!("No names found in the text file.");
        return Ok(());
    }

    let template = Template::open(&cli.template_path)?;
    let layout = match &cli.layout {
        Some(path) => LayoutConfig::from_json_file(path)?,
        None => LayoutConfig::default(),
    };
    let fonts = FontSet::new(
        TrueTypeFace::load(&cli.regular_font, cli.regular_size)
            .context("Failed to load regular font")?,
        TrueTypeFace::load(&cli.bold_font, cli.bold_size).context("Failed to load bold font")?,
    );
    let renderer = CertificateRenderer::new(template, fonts, cli.color, layout, &cli.output_dir)
        .with_context(|| format!("Failed to initialize renderer for {}", cli.output_dir.display()))?;

    debug!("Rendering {} certificates", names.len());
    renderer.render_batch(&names);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn defaults_match_builtin_constants() {
        let cli = Cli::try_parse_from(["certgen"]).unwrap();
        assert_eq!(cli.names_path, PathBuf::from("names.txt"));
        assert_eq!(cli.template_path, PathBuf::from("template.png"));
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert_eq!(cli.regular_font, PathBuf::from("./font/Arial.ttf"));
        assert_eq!(cli.bold_font, PathBuf::from("./font/Arial_Bold.ttf"));
        assert_eq!(cli.regular_size, 40.0);
        assert_eq!(cli.bold_size, 42.0);
        assert_eq!(cli.color, Rgba([0x5e, 0x11, 0x3d, 255]));
        assert!(cli.layout.is_none());
    }

    #[test]
    fn bad_color_is_a_usage_error() {
        assert!(Cli::try_parse_from(["certgen", "--color", "purple"]).is_err());
    }

    #[test]
    fn empty_names_file_is_a_clean_noop() {
        let dir = tempfile::tempdir().unwrap();
        let names = dir.path().join("names.txt");
        std::fs::write(&names, "\n  \n").unwrap();
        let out = dir.path().join("out");
        let cli = Cli::try_parse_from([
            OsString::from("certgen"),
            OsString::from("--names"),
            names.into_os_string(),
            OsString::from("--output-dir"),
            out.clone().into_os_string(),
        ])
        .unwrap();

        run(cli).unwrap();
        assert!(!out.exists());
    }

    #[test]
    fn missing_template_fails_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let names = dir.path().join("names.txt");
        std::fs::write(&names, "Alice\n").unwrap();
        let out = dir.path().join("out");
        let cli = Cli::try_parse_from([
            OsString::from("certgen"),
            OsString::from("--names"),
            names.into_os_string(),
            OsString::from("--template"),
            dir.path().join("missing.png").into_os_string(),
            OsString::from("--output-dir"),
            out.clone().into_os_string(),
        ])
        .unwrap();

        let err = run(cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<error::CertificateError>(),
            Some(error::CertificateError::TemplateNotFound(_))
        ));
        assert!(!out.exists());
    }

    #[test]
    fn missing_template_is_reported_before_a_bad_layout() {
        let dir = tempfile::tempdir().unwrap();
        let names = dir.path().join("names.txt");
        std::fs::write(&names, "Alice\n").unwrap();
        let layout = dir.path().join("layout.json");
        std::fs::write(&layout, "{ not json").unwrap();
        let cli = Cli::try_parse_from([
            OsString::from("certgen"),
            OsString::from("--names"),
            names.into_os_string(),
            OsString::from("--template"),
            dir.path().join("missing.png").into_os_string(),
            OsString::from("--layout"),
            layout.into_os_string(),
            OsString::from("--output-dir"),
            dir.path().join("out").into_os_string(),
        ])
        .unwrap();

        let err = run(cli).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<error::CertificateError>(),
            Some(error::CertificateError::TemplateNotFound(_))
        ));
    }
}
