use crate::config::{Config, load_config};
use crate::details::person_details;
use crate::layout::compute_layout;
use crate::layout_dump::layout_dump_json;
use crate::model::FamilyTree;
use crate::parser::parse_family_tree;
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::store::PersonStore;
use crate::viewport::{ViewTransform, ViewportController};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "famtree", version, about = "Family tree layout and SVG renderer")]
pub struct Args {
    /// Input tree file (.json / .json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, themeVariables, layout, viewport)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width the generation rows are centered on
    #[arg(short = 'w', long = "width", default_value_t = 1920.0)]
    pub width: f32,

    /// Viewport height
    #[arg(short = 'H', long = "height", default_value_t = 1080.0)]
    pub height: f32,

    /// Zoom level, clamped to the configured range
    #[arg(long = "scale", default_value_t = 1.0)]
    pub scale: f32,

    #[arg(long = "pan-x", default_value_t = 0.0, allow_hyphen_values = true)]
    pub pan_x: f32,

    #[arg(long = "pan-y", default_value_t = 0.0, allow_hyphen_values = true)]
    pub pan_y: f32,

    /// Print the detail panel data for one member as JSON instead of rendering
    #[arg(long = "details", value_name = "ID")]
    pub details: Option<String>,

    /// Log layout decisions to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    config.render.width = args.width;
    config.render.height = args.height;

    let input = read_input(args.input.as_deref())?;
    let tree = PersonStore::from_tree(parse_family_tree(&input)?).snapshot();

    if let Some(id) = args.details.as_deref() {
        let person = tree
            .get(id)
            .with_context(|| format!("no member with id {id:?}"))?;
        let json = serde_json::to_string_pretty(&person_details(person))?;
        return write_text(&json, args.output.as_deref());
    }

    let transform = view_transform(&args, &config);
    render_tree(&tree, &config, transform, args.output_format, args.output.as_deref())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}

fn view_transform(args: &Args, config: &Config) -> ViewTransform {
    let mut viewport = ViewportController::new(config.viewport.clone());
    viewport.set_scale(args.scale);
    viewport.set_pan(args.pan_x, args.pan_y);
    viewport.transform()
}

fn render_tree(
    tree: &FamilyTree,
    config: &Config,
    transform: ViewTransform,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let layout = compute_layout(tree, &config.layout, config.render.width);
    match format {
        OutputFormat::Svg => {
            let svg = render_svg(&layout, tree, &config.theme, &config.layout, transform);
            write_output_svg(&svg, output)
        }
        OutputFormat::Png => {
            let output = ensure_output(output, "png")?;
            let svg = render_svg(&layout, tree, &config.theme, &config.layout, transform);
            write_output_png(&svg, output, &config.render)
        }
        OutputFormat::Json => {
            let json = layout_dump_json(&layout, tree, transform)?;
            write_text(&json, output)
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn write_text(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)?,
        None => println!("{text}"),
    }
    Ok(())
}

fn ensure_output<'a>(output: Option<&'a Path>, ext: &str) -> Result<&'a Path> {
    output.ok_or_else(|| anyhow::anyhow!("Output path required for {} output", ext))
}
