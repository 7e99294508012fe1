//! doclayout CLI - layout extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use doclayout::{
    JsonFormat, LayoutDocument, LayoutExtractor, LayoutOptions, Route, StyleInference,
};

#[derive(Parser)]
#[command(name = "doclayout")]
#[command(author)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
#[command(about = "Extract layout (geometry and style) from HTML, PDFs and images", long_about = None)]
struct Cli {
    #[command(flatten)]
    extract: ExtractArgs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract layout to JSON
    Extract(ExtractArgs),

    /// Show which engine would handle a file
    Route {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone)]
struct ExtractArgs {
    /// Input file (HTML, PDF or image)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output JSON file (default: <FILE>.layout.json)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Skip VLM style inference for scans and images
    #[arg(long)]
    no_vlm: bool,

    /// Gemini model used for style inference
    #[arg(long, value_name = "MODEL", default_value = "gemini-2.0-flash")]
    vlm_model: String,

    /// Gemini API key (falls back to GEMINI_API_KEY)
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Write annotated images and legends to this directory
    #[arg(short, long, value_name = "DIR")]
    debug: Option<PathBuf>,

    /// Correlation id stamped into the metadata
    #[arg(long, value_name = "ID")]
    extraction_id: Option<String>,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    /// Chrome/Chromium executable for HTML rendering
    #[arg(long, value_name = "PATH")]
    browser: Option<PathBuf>,
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match cli.command {
        Some(Commands::Extract(args)) => cmd_extract(&args),
        Some(Commands::Route { input }) => cmd_route(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if cli.extract.input.is_some() {
                cmd_extract(&cli.extract)
            } else {
                println!("{}", "Usage: doclayout <FILE> [-o OUTPUT]".yellow());
                println!("       doclayout --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_extract(args: &ExtractArgs) -> Result<(), Box<dyn std::error::Error>> {
    let input = args.input.as_deref().ok_or("no input file given")?;

    let mut options = LayoutOptions::new();
    if let Some(dir) = &args.debug {
        fs::create_dir_all(dir)?;
        options = options.with_debug_dir(dir);
    }
    if let Some(id) = &args.extraction_id {
        options = options.with_extraction_id(id);
    }
    if let Some(browser) = &args.browser {
        options = options.with_browser_path(browser);
    }

    let mut extractor = LayoutExtractor::with_options(options);
    let route = extractor.route(input)?;
    let client = if matches!(route, Route::Image | Route::ScannedPdf) && !args.no_vlm {
        style_client(args)
    } else {
        None
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Extracting layout ({:?})...", route));

    let doc = extractor.process(input, client.as_deref());
    spinner.finish_and_clear();
    let doc = doc?;

    let format = if args.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(input));
    fs::write(&output, doc.to_json(format)?)?;

    print_summary(&doc, &output);
    Ok(())
}

#[cfg(feature = "vlm")]
fn style_client(args: &ExtractArgs) -> Option<Box<dyn StyleInference>> {
    let key = args
        .api_key
        .clone()
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .filter(|k| !k.trim().is_empty());
    let Some(key) = key else {
        log::warn!("No GOOGLE_API_KEY or GEMINI_API_KEY set; skipping style inference");
        return None;
    };
    match doclayout::GeminiClient::new(key) {
        Ok(client) => Some(Box::new(client.with_model(&args.vlm_model))),
        Err(e) => {
            log::warn!("Could not create Gemini client: {}", e);
            None
        }
    }
}

#[cfg(not(feature = "vlm"))]
fn style_client(_args: &ExtractArgs) -> Option<Box<dyn StyleInference>> {
    log::warn!("Built without the `vlm` feature; skipping style inference");
    None
}

fn default_output_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_os_string();
    name.push(".layout.json");
    PathBuf::from(name)
}

fn print_summary(doc: &LayoutDocument, output: &Path) {
    let with_text = doc.elements().filter(|e| e.has_text()).count();
    let with_style = doc.elements().filter(|e| e.style.is_some()).count();

    println!("\n{}", "Layout Extraction".green().bold());
    println!("  {} {}", "File:".dimmed(), doc.metadata.filename);
    println!("  {} {}", "Origin:".dimmed(), doc.metadata.origin_type);
    println!("  {} {}", "Pages:".dimmed(), doc.metadata.page_count);
    println!("  {} {}", "Elements:".dimmed(), doc.element_count());
    println!("  {} {}", "With text:".dimmed(), with_text);
    println!("  {} {}", "With style:".dimmed(), with_style);
    println!("\n{} {}", "Saved to".green(), output.display());
}

fn cmd_route(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = LayoutExtractor::new();
    let route = extractor.route(input)?;
    let info = serde_json::json!({
        "file": input.display().to_string(),
        "route": format!("{:?}", route),
        "origin_type": route.origin_type(),
    });
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn cmd_version() {
    println!("doclayout {}", env!("CARGO_PKG_VERSION"));
    println!("Layout extraction for HTML, PDFs and images");
    println!();
    println!("Features:");
    println!("  dom: {}", cfg!(feature = "dom"));
    println!("  vlm: {}", cfg!(feature = "vlm"));
    println!("  ocr: {}", cfg!(feature = "ocr"));
}
