//! CLI entry point for pystruct

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use pystruct::annotate::{OpenAiAnnotator, OpenAiConfig};
use pystruct::file_utils::{DEFAULT_MAX_FILE_SIZE, parse_file_size};
use pystruct::{DEFAULT_IGNORED_NAMES, OutputConfig, Renderer, StreamingFormatter, WalkerConfig};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pystruct")]
#[command(about = "Print the directory structure of a Python project with its functions, classes and methods")]
#[command(version)]
struct Args {
    /// Directory to display
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Skip folders and files with this exact name, in addition to
    /// __pycache__ and .git (can be used multiple times)
    #[arg(short = 'I', long = "ignore", value_name = "NAME")]
    ignore: Vec<String>,

    /// Skip entries whose name matches a glob pattern (can be used multiple times)
    #[arg(long = "ignore-pattern", value_name = "GLOB")]
    ignore_pattern: Vec<String>,

    /// List non-Python files too
    #[arg(short = 'a', long = "all-files")]
    all_files: bool,

    /// Descend only N levels deep
    #[arg(short = 'L', long = "level")]
    level: Option<usize>,

    /// Also skip entries excluded by .gitignore and .ignore files
    #[arg(long = "gitignore")]
    gitignore: bool,

    /// Maximum size of a source file to parse (default: 1MB)
    /// Larger files are listed without declarations. Use suffixes: K, M, G
    #[arg(long = "max-file-size", value_name = "SIZE")]
    max_file_size: Option<String>,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Print directory, file and declaration counts at the end
    #[arg(long = "summary")]
    summary: bool,

    /// Explain each declaration with a language model
    #[arg(short = 'e', long = "explain")]
    explain: bool,

    /// Model used by --explain
    #[arg(long = "model", requires = "explain")]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long = "api-base", value_name = "URL", env = "OPENAI_BASE_URL")]
    api_base: Option<String>,

    /// API key for --explain
    #[arg(long = "api-key", value_name = "KEY", env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Token limit for each explanation
    #[arg(long = "max-tokens", default_value_t = pystruct::annotate::DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// Request timeout in seconds
    #[arg(long = "timeout", value_name = "SECS", default_value_t = pystruct::annotate::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Log debug detail to stderr
    #[arg(short = 'v', long = "verbose", conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn init_logging(args: &Args) {
    let filter = if args.verbose {
        "pystruct=debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    // Must run before parsing so `env = ...` arguments see values from `.env`.
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();
    init_logging(&args);

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded environment file"),
        Err(e) => tracing::debug!("no .env file loaded: {}", e),
    }

    let max_file_size = match args.max_file_size {
        Some(ref size_str) => parse_file_size(size_str).unwrap_or_else(|e| {
            eprintln!("pystruct: invalid --max-file-size '{}': {}", size_str, e);
            process::exit(1);
        }),
        None => DEFAULT_MAX_FILE_SIZE,
    };

    let walker_config = WalkerConfig {
        ignore_patterns: args.ignore_pattern.clone(),
        max_depth: args.level,
        show_all_files: args.all_files,
        respect_gitignore: args.gitignore,
        max_file_size,
        ..WalkerConfig::with_ignored(
            DEFAULT_IGNORED_NAMES
                .iter()
                .map(|s| s.to_string())
                .chain(args.ignore.iter().cloned()),
        )
    };

    let mut renderer = Renderer::new(walker_config);

    if args.explain {
        let annotator = OpenAiAnnotator::new(OpenAiConfig {
            api_key: args.api_key.clone(),
            api_base: args.api_base.clone(),
            model: args.model.clone(),
            max_tokens: args.max_tokens,
            timeout_secs: args.timeout,
        })
        .unwrap_or_else(|e| {
            eprintln!("pystruct: {}", e);
            process::exit(1);
        });
        tracing::debug!(model = annotator.model(), "explaining declarations");
        renderer = renderer.with_annotator(Box::new(annotator));
    }

    let mut lines = match renderer.render(&args.path) {
        Ok(lines) => lines,
        Err(e) => {
            eprintln!("pystruct: {}", e);
            process::exit(1);
        }
    };

    let mut formatter = StreamingFormatter::new(OutputConfig {
        use_color: should_use_color(args.color),
        show_summary: args.summary,
    });

    match lines.stream(&mut formatter) {
        Ok(summary) if summary.warnings > 0 => {
            tracing::info!(warnings = summary.warnings, "finished with warnings");
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
        Err(e) => {
            eprintln!("pystruct: error writing output: {}", e);
            process::exit(1);
        }
    }
}
