use std::fs;
use std::io::{self, Read, Write};

use canvas::config::{ConfigError, EditorConfig};
use canvas::doc::{Element, Page};
use canvas::project::{ProjectError, decode_pages, encode_pages, summarize};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error(transparent)]
    Project(#[from] ProjectError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{count} layout problem(s) found")]
    Problems { count: usize },
}

#[derive(Parser, Debug)]
#[command(name = "brochure", about = "Inspect and prepare brochure project files")]
struct Cli {
    /// Editor config JSON; omitted fields take their defaults.
    #[arg(long, env = "BROCHURE_CONFIG", global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that a project decodes and its elements fit the editor's limits.
    Validate {
        #[arg(default_value = "-", help = "Project file path, or - for stdin")]
        input: String,
    },
    /// Print page and element counts.
    Summary {
        #[arg(default_value = "-", help = "Project file path, or - for stdin")]
        input: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Rewrite a project as canonical pretty-printed JSON.
    Format {
        #[arg(default_value = "-", help = "Project file path, or - for stdin")]
        input: String,
        #[arg(long, short, help = "Output file path; stdout when omitted")]
        output: Option<String>,
    },
    /// Create a project of blank pages.
    New {
        #[arg(long, default_value_t = 1)]
        pages: usize,
        #[arg(long, default_value = "Page")]
        title: String,
        #[arg(long, short, help = "Output file path; stdout when omitted")]
        output: Option<String>,
    },
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::from_json(&read_input(path)?)?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Validate { input } => run_validate(&input, &config),
        Command::Summary { input, json } => run_summary(&input, json),
        Command::Format { input, output } => {
            let pages = decode_pages(&read_input(&input)?)?;
            write_output(output.as_deref(), &encode_pages(&pages)?)
        }
        Command::New { pages, title, output } => {
            write_output(output.as_deref(), &encode_pages(&blank_project(pages, &title))?)
        }
    }
}

fn run_validate(input: &str, config: &EditorConfig) -> Result<(), CliError> {
    let pages = decode_pages(&read_input(input)?)?;
    let problems = layout_problems(&pages, config);
    for problem in &problems {
        warn!("{problem}");
    }
    if !problems.is_empty() {
        return Err(CliError::Problems { count: problems.len() });
    }
    let summary = summarize(&pages);
    println!("ok: {} page(s), {} element(s)", summary.pages, summary.elements + summary.grouped);
    Ok(())
}

fn run_summary(input: &str, json: bool) -> Result<(), CliError> {
    let summary = summarize(&decode_pages(&read_input(input)?)?);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    println!("pages:    {}", summary.pages);
    println!("elements: {}", summary.elements);
    println!("grouped:  {}", summary.grouped);
    println!("locked:   {}", summary.locked);
    for (kind, count) in &summary.by_kind {
        println!("  {kind:<8}{count}");
    }
    Ok(())
}

/// Elements the editor could not have produced: at or below the minimum
/// size, or with a top-left corner outside the page's drawing region.
fn layout_problems(pages: &[Page], config: &EditorConfig) -> Vec<String> {
    fn check(page: &Page, el: &Element, region: (f64, f64), min: f64, out: &mut Vec<String>) {
        if el.width <= min || el.height <= min {
            out.push(format!("{}: element {} is {}x{}, not above {min}", page.title, el.id, el.width, el.height));
        }
        if el.x < 0.0 || el.y < 0.0 || el.x > region.0 || el.y > region.1 {
            out.push(format!("{}: element {} at ({}, {}) starts off the page", page.title, el.id, el.x, el.y));
        }
        for child in el.children() {
            if child.width <= min || child.height <= min {
                out.push(format!("{}: grouped element {} is {}x{}", page.title, child.id, child.width, child.height));
            }
        }
    }

    let mut out = Vec::new();
    for page in pages {
        let region = page.region_size(config.page_width, config.page_height);
        for el in &page.elements {
            check(page, el, region, config.min_element_size, &mut out);
        }
    }
    out
}

fn blank_project(count: usize, title: &str) -> Vec<Page> {
    (1..=count.max(1)).map(|n| Page::new(&format!("{title} {n}"))).collect()
}

fn read_input(path: &str) -> Result<String, CliError> {
    let text = if path == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        fs::read_to_string(path)
    }
    .map_err(|source| CliError::Read { path: path.to_owned(), source })?;
    debug!(path, bytes = text.len(), "read input");
    Ok(text)
}

fn write_output(path: Option<&str>, text: &str) -> Result<(), CliError> {
    match path {
        Some(path) => fs::write(path, format!("{text}\n")).map_err(|source| CliError::Write { path: path.to_owned(), source }),
        None => writeln!(io::stdout(), "{text}").map_err(|source| CliError::Write { path: "stdout".to_owned(), source }),
    }
}
