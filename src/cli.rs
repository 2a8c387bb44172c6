use crate::config::load_config;
use crate::engine::LayoutEngine;
use crate::layout::Viewport;
use crate::render::{render_error_svg, render_svg, write_output_png, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "bbm", version, about = "Indented outlines to bubble diagrams")]
pub struct Args {
    /// Input outline file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png/json). Defaults to stdout for svg and json.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width
    #[arg(short = 'w', long = "width", default_value_t = 1200.0)]
    pub width: f32,

    /// Viewport height
    #[arg(short = 'H', long = "height", default_value_t = 800.0)]
    pub height: f32,

    /// Disable collision relaxation (overlaps are then allowed)
    #[arg(long = "no-relax")]
    pub no_relax: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    /// The raw scene contract as pretty JSON.
    Json,
}

pub fn run() -> Result<()> {
    let _ = env_logger::try_init();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;
    if args.no_relax {
        config.layout.relaxation = false;
    }

    let input = read_input(args.input.as_deref())?;
    let mut engine = LayoutEngine::new(config.theme.clone(), config.layout.clone());
    let viewport = Viewport::new(config.render.width, config.render.height);

    let scene = match engine.relayout(&input, viewport) {
        Ok(scene) => scene,
        Err(err) => {
            // The document itself can never fail; this is a bad config.
            // Show the diagnostic in place of the diagram, like the
            // interactive surface would.
            log::error!("layout pass failed: {err}");
            let svg = render_error_svg(&err.to_string(), &config.theme);
            return match args.output_format {
                OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref()),
                OutputFormat::Png => {
                    let output = require_output(&args.output, "png")?;
                    write_output_png(&svg, &output, &config.render, &config.theme)
                }
                OutputFormat::Json => Err(err.into()),
            };
        }
    };

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&render_svg(&scene, &config.theme), args.output.as_deref())?;
        }
        OutputFormat::Png => {
            let output = require_output(&args.output, "png")?;
            write_output_png(&render_svg(&scene, &config.theme), &output, &config.render, &config.theme)?;
        }
        OutputFormat::Json => {
            let json = scene.to_json()?;
            match args.output.as_deref() {
                Some(path) => std::fs::write(path, json)?,
                None => println!("{json}"),
            }
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn require_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    output
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Output path required for {} output", ext))
}
