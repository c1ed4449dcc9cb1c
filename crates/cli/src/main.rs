use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use contextprompt_core::{
    CaptureConfig, CaptureDepth, CaptureRequest, Document, MarkdownConfig, PlatformRegistry, Readability,
    chat::extract_chat_with_registry, handle_request_with_registry,
};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// What to print for the captured page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// Main content Markdown
    Markdown,
    /// Chat transcript Markdown
    Chat,
    /// Full capture response envelope
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "chat" => Ok(Self::Chat),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: markdown, chat, json", s)),
        }
    }
}

/// Capture prompt-ready context from a rendered HTML page
#[derive(Parser, Debug)]
#[command(name = "contextprompt")]
#[command(version)]
#[command(about = "Capture prompt-ready context from rendered HTML pages", long_about = None)]
struct Args {
    /// Saved HTML file, or "-" for stdin (default: stdin)
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// URL the page was rendered from; enables chat platform detection
    #[arg(short, long, value_name = "URL")]
    url: Option<String>,

    /// Capture depth (light, standard, deep)
    #[arg(short, long, default_value = "standard", value_name = "DEPTH")]
    depth: CaptureDepth,

    /// Output format (markdown, chat, json)
    #[arg(short, long, default_value = "markdown", value_name = "FORMAT")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Text the user had selected on the page (JSON output only)
    #[arg(long, value_name = "TEXT")]
    selection: Option<String>,

    /// Platform table overriding the built-in chat platforms
    #[arg(long, value_name = "FILE")]
    platforms: Option<PathBuf>,

    /// Drop image placeholders from Markdown
    #[arg(long)]
    no_images: bool,

    /// Keep link text but drop link targets from Markdown
    #[arg(long)]
    no_links: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script and exit
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("contextprompt_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(input: Option<&str>) -> anyhow::Result<String> {
    match input {
        None | Some("-") => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path)),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "contextprompt", &mut io::stdout());
        return Ok(());
    }

    init_tracing(args.verbose);
    let started = Instant::now();
    let mut timings: Vec<(&str, Duration)> = Vec::new();

    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
        let source = args.input.as_deref().filter(|input| *input != "-").unwrap_or("stdin");
        echo::print_step(1, 4, &format!("Reading from {}", source.bright_white()));
    }

    let step = Instant::now();
    let html = read_input(args.input.as_deref())?;
    timings.push(("Read", step.elapsed()));

    if args.verbose {
        echo::print_detail("Size", &echo::format_size(html.len()));
        eprintln!();
        echo::print_step(2, 4, "Parsing HTML document");
    }

    let step = Instant::now();
    let doc = match &args.url {
        Some(url) => Document::parse_with_url(&html, url).with_context(|| format!("Invalid --url: {}", url))?,
        None => Document::parse(&html).context("Failed to parse HTML")?,
    };
    let registry =
        PlatformRegistry::load_with_overrides(args.platforms.as_deref()).context("Failed to load platform table")?;
    timings.push(("Parse", step.elapsed()));

    if args.verbose {
        if let Some(title) = doc.title() {
            echo::print_detail("Title", title.trim());
        }
        echo::print_detail("Chat hosts", &registry.hosts().len().to_string());
        if let Some(host) = doc.hostname() {
            let platform = registry.lookup(host).map(|p| p.display_name()).unwrap_or("none");
            echo::print_detail("Platform", platform);
        }
        eprintln!();
        echo::print_step(3, 4, &format!("Capturing at {} depth", args.depth));
    }

    let step = Instant::now();
    let output = match args.format {
        OutputFormat::Markdown => {
            let config = CaptureConfig::builder()
                .depth(args.depth)
                .markdown(MarkdownConfig { strip_images: args.no_images, strip_links: args.no_links })
                .build();
            let outcome = Readability::with_config(config).extract(&doc);

            if args.verbose {
                echo::print_extraction_details(&outcome);
            }
            if outcome.content.is_empty() {
                bail!("No content could be extracted from the document");
            }
            outcome.content
        }
        OutputFormat::Chat => {
            if doc.url().is_none() {
                bail!("--url is required to detect a chat platform");
            }
            let Some(transcript) = extract_chat_with_registry(&doc, &registry, args.depth) else {
                bail!("{} is not a known chat platform", doc.hostname().unwrap_or_default());
            };
            if transcript.is_empty() {
                echo::print_warning(&format!("No messages found on {}", transcript.platform_name));
            }
            transcript.to_markdown()
        }
        OutputFormat::Json => {
            let request = CaptureRequest::capture(args.depth);
            let response = handle_request_with_registry(&doc, &registry, &request, args.selection.as_deref());

            if args.verbose
                && let Some(context) = &response.context
            {
                echo::print_context_details(context);
            }
            serde_json::to_string_pretty(&response).context("Failed to serialize capture response")?
        }
    };
    timings.push(("Capture", step.elapsed()));

    if args.verbose {
        echo::print_step(4, 4, "Writing output");
        echo::print_detail("Format", &format!("{:?}", args.format));
        for (label, duration) in &timings {
            echo::print_timing(label, *duration);
        }
        echo::print_timing("Total", started.elapsed());
        eprintln!();
    }

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
