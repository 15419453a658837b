//! Command-line interface for gocodeai.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::config::{AnalyzeOptions, BackendConfig, FileConfig, Focus, TaskMode, ENV_BACKEND};
use crate::llm::{create_backend, BackendKind};
use crate::pipeline::Analyzer;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Prompt template written by `gocodeai init`.
const DEFAULT_PROMPT: &str = include_str!("../prompt.txt");

/// Function-level Go code review with heuristics and an LLM.
///
/// gocodeai walks Go sources, flags common smells in each function
/// (missing doc comments, long parameter lists, possibly unused locals,
/// error assignments to double-check) and asks a language model for a
/// summary, a doc comment and refactoring ideas.
#[derive(Parser)]
#[command(name = "gocodeai")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze Go functions in a file or directory
    Analyze(AnalyzeArgs),
    /// Write the default prompt template
    Init(InitArgs),
}

/// Output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Go file or directory to analyze
    pub path: PathBuf,

    /// Only analyze functions with this exact name
    #[arg(long = "func")]
    pub func: Option<String>,

    /// Stages to run: static, ai, both (alias: all)
    #[arg(short, long)]
    pub task: Option<TaskMode>,

    /// What to ask the model for: comment_suggestion, refactor, summary, anti_pattern, all
    #[arg(long)]
    pub focus: Option<Focus>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Prompt template file (default: prompt.txt)
    #[arg(short, long)]
    pub prompt: Option<PathBuf>,

    /// Config file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Backend to call: ollama or gemini
    #[arg(short, long)]
    pub backend: Option<BackendKind>,

    /// Model name, overriding config and environment
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "prompt.txt")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load the config file named on the command line, or a discovered one.
fn load_file_config(explicit: Option<&Path>) -> anyhow::Result<FileConfig> {
    let path = match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => FileConfig::discover(),
    };
    match path {
        Some(p) => {
            debug!(path = %p.display(), "loading config");
            FileConfig::parse_file(&p)
                .map_err(|e| anyhow::anyhow!("cannot load config {}: {}", p.display(), e))
        }
        None => Ok(FileConfig::default()),
    }
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    let file_config = match load_file_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Flags win over the config file
    let mut options = AnalyzeOptions::default().with_file_config(&file_config.analysis);
    if let Some(name) = &args.func {
        options.name_filter = Some(name.clone());
    }
    if let Some(task) = args.task {
        options.task = task;
    }
    if let Some(focus) = args.focus {
        options.focus = focus;
    }
    if let Some(prompt) = &args.prompt {
        options.prompt_path = prompt.clone();
    }

    if !args.path.exists() {
        eprintln!("Error: cannot access path {:?}", args.path);
        return Ok(EXIT_ERROR);
    }

    let mut analyzer = Analyzer::new(options);
    if analyzer.options().task.runs_ai() {
        // Environment is read once here; --backend takes the place of GOCODEAI_BACKEND.
        let backend_flag = args.backend.map(|k| k.to_string());
        let lookup = |key: &str| {
            if key == ENV_BACKEND && backend_flag.is_some() {
                return backend_flag.clone();
            }
            std::env::var(key).ok()
        };
        let mut backend_config = match BackendConfig::resolve(&file_config.backend, lookup) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Ok(EXIT_ERROR);
            }
        };
        if let Some(model) = &args.model {
            backend_config.model = model.clone();
        }

        let backend = match create_backend(&backend_config) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Error: {}", e);
                return Ok(EXIT_ERROR);
            }
        };
        info!(backend = %backend.kind(), model = backend.model(), "using backend");
        analyzer = analyzer.with_backend(backend);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let cancel = CancellationToken::new();
    let analysis = runtime.block_on(async {
        let token = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });
        analyzer.analyze_path(&args.path, &cancel).await
    });

    let analysis = match analysis {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match args.format {
        OutputFormat::Json => report::write_json(&analysis)?,
        OutputFormat::Pretty => report::write_pretty(&analysis),
    }
    report::write_failures(&analysis);

    if analysis.has_failures() || analysis.cancelled {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() && !args.force {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Use --force to overwrite it or --output to pick another path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_PROMPT) {
        eprintln!("Error: failed to write template: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to tune what the model is asked", args.output.display());
    println!(
        "  2. Run: gocodeai analyze . --prompt {}",
        args.output.display()
    );

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze_flags() {
        let cli = Cli::parse_from([
            "gocodeai",
            "analyze",
            "src",
            "--func",
            "main",
            "--task",
            "all",
            "--focus",
            "refactor",
            "--format",
            "json",
            "--backend",
            "google",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.func.as_deref(), Some("main"));
        assert_eq!(args.task, Some(TaskMode::Both));
        assert_eq!(args.focus, Some(Focus::Refactor));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.backend, Some(BackendKind::Gemini));
    }

    #[test]
    fn test_invalid_task_rejected() {
        assert!(Cli::try_parse_from(["gocodeai", "analyze", ".", "--task", "lint"]).is_err());
    }

    #[test]
    fn test_init_writes_template() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("nested/prompt.txt");
        let args = InitArgs {
            output: output.clone(),
            force: false,
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), DEFAULT_PROMPT);
        // Refuses to clobber without --force
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_static_run_exit_codes() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ok.go"), "package p\n\nfunc f() {}\n").unwrap();
        let mut args = AnalyzeArgs {
            path: dir.path().to_path_buf(),
            func: None,
            task: Some(TaskMode::Static),
            focus: None,
            format: OutputFormat::Json,
            prompt: None,
            config: Some(dir.path().join("missing.yaml")),
            backend: None,
            model: None,
        };
        // Unreadable config is a usage error
        assert_eq!(run_analyze(&args).unwrap(), EXIT_ERROR);

        std::fs::write(dir.path().join("gocodeai.yaml"), "analysis:\n  max_params: 3\n").unwrap();
        args.config = Some(dir.path().join("gocodeai.yaml"));
        assert_eq!(run_analyze(&args).unwrap(), EXIT_SUCCESS);

        std::fs::write(dir.path().join("bad.go"), "package p\nfunc (\n").unwrap();
        assert_eq!(run_analyze(&args).unwrap(), EXIT_FAILED);
    }
}
