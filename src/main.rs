// this_file: src/main.rs

//! mailglyph CLI: render text to SVG or PNG image tags, inspect the font catalog.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use mailglyph::{MailGlyph, RenderConfig};

/// Render text in any installed font as email-safe images
#[derive(Parser)]
#[command(name = "mailglyph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Raw SVG markup
    Svg,
    /// `<img>` with the SVG inlined
    Img,
    /// `<img>` with a PNG
    Png,
    /// PNG rendered at twice the pixel density
    Png2x,
    /// PNG rendered at three times the pixel density
    Png3x,
}

#[derive(Subcommand)]
enum Commands {
    /// Render text and print the markup to stdout
    Render {
        #[arg(long, value_enum, default_value = "svg")]
        format: Format,

        /// Text to render
        #[arg(long)]
        text: String,

        /// Font name or path to a font file
        #[arg(long)]
        font: Option<String>,

        /// Font size, e.g. 24 or 24px
        #[arg(long)]
        size: Option<String>,

        /// Glyph colour
        #[arg(long)]
        color: Option<String>,

        /// Background colour
        #[arg(long)]
        background: Option<String>,

        /// Keep the surrounding background (raster formats trim it by default)
        #[arg(long)]
        no_trim: bool,

        /// Trim tolerance percentage
        #[arg(long)]
        tolerance: Option<f64>,

        /// Keep the rendered raster height instead of resizing to the font size
        #[arg(long)]
        no_resize: bool,

        /// Omit title/alt/style fallback attributes
        #[arg(long)]
        no_fallback: bool,

        /// Extra output attribute, repeatable
        #[arg(long = "attr", value_name = "KEY=VALUE")]
        attrs: Vec<String>,
    },

    /// List fonts found in the font catalog
    Fonts {
        /// Print names instead of paths
        #[arg(long)]
        names: bool,
    },

    /// Show which font file a name or path resolves to
    Resolve {
        /// Font name or path
        name_or_path: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let glyph = MailGlyph::new();
    match cli.command {
        Commands::Render {
            format,
            text,
            font,
            size,
            color,
            background,
            no_trim,
            tolerance,
            no_resize,
            no_fallback,
            attrs,
        } => {
            let mut config = RenderConfig::new().text(text);
            if no_trim {
                config = config.trim(false);
            }
            if no_resize {
                config = config.resize_to_font_size(false);
            }
            if no_fallback {
                config = config.supports_fallback(false);
            }
            if let Some(font) = font {
                config = config.font_name_or_path(font);
            }
            if let Some(size) = size {
                config = config.font_size_css(size);
            }
            if let Some(color) = color {
                config = config.font_color(color);
            }
            if let Some(background) = background {
                config = config.background_color(background);
            }
            if let Some(tolerance) = tolerance {
                config = config.trim_tolerance(tolerance);
            }
            for attr in &attrs {
                let (key, value) = attr
                    .split_once('=')
                    .with_context(|| format!("attribute {attr:?} is not KEY=VALUE"))?;
                config = config.attr(key, value);
            }

            let output = match format {
                Format::Svg => glyph.render_vector(&config).await,
                Format::Img => glyph.render_image_tag(&config).await,
                Format::Png => glyph.render_raster(&config, 1.0).await,
                Format::Png2x => glyph.render_raster_2x(&config).await,
                Format::Png3x => glyph.render_raster_3x(&config).await,
            }
            .context("render failed")?;
            println!("{output}");
        }
        Commands::Fonts { names } => {
            if names {
                for name in glyph.list_font_names().await? {
                    println!("{name}");
                }
            } else {
                for path in glyph.list_font_paths().await? {
                    println!("{}", path.display());
                }
            }
        }
        Commands::Resolve { name_or_path } => {
            let font = glyph
                .resolve_font(&name_or_path)
                .await
                .with_context(|| format!("cannot resolve {name_or_path:?}"))?;
            println!("{}\t{}", font.name, font.path.display());
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity; `RUST_LOG` overrides.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}
