//! codemedic CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codemedic::config::{ColorMode, Config, OutputFormat};
use codemedic::heuristics;
use codemedic::language::LanguageFamily;
use codemedic::loader;
use codemedic::output::{JsonFormatter, OutputFormatter, TextFormatter};
use codemedic::scanner;
use codemedic::{fixer, rules, DebugService, DebugSession, Watcher};
use colored::Colorize;
use log::{debug, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Project id used for one-shot runs
const CLI_PROJECT: &str = "cli";

#[derive(Parser)]
#[command(
    name = "codemedic",
    version,
    about = "Diagnostics and auto-fix engine for JavaScript, HTML and CSS"
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    format: Option<Format>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Disable specific rules (comma-separated)
    #[arg(long, value_delimiter = ',', global = true)]
    disable: Option<Vec<String>>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, global = true)]
    jobs: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze files and report diagnostics
    Check {
        /// Files, directories or glob patterns
        #[arg(required = true)]
        paths: Vec<String>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Apply every auto-fix (prints a diff unless --write is given)
    Fix {
        /// Files, directories or glob patterns
        #[arg(required = true)]
        paths: Vec<String>,

        /// Write fixed files back to disk
        #[arg(long)]
        write: bool,
    },

    /// Re-analyze a directory whenever its files change
    Watch {
        /// Project root
        dir: PathBuf,

        /// Quiet period before re-analyzing, in milliseconds
        #[arg(long)]
        debounce_ms: Option<u64>,
    },

    /// List available rules
    Rules,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = load_config(&cli)?;

    let debounce_ms = match &cli.command {
        Commands::Watch { debounce_ms, .. } => *debounce_ms,
        _ => None,
    };
    config.merge_cli(
        cli.format.map(OutputFormat::from),
        cli.no_color.then_some(ColorMode::Never),
        cli.disable.clone(),
        debounce_ms,
        cli.jobs,
    );

    match config.output.color {
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Auto => {}
    }

    match cli.command {
        Commands::Check { paths, pretty } => check(config, &paths, pretty),
        Commands::Fix { paths, write } => fix(config, &paths, write),
        Commands::Watch { dir, .. } => watch(config, dir),
        Commands::Rules => {
            list_rules(&config);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Config::load_default().context("Failed to load config"),
    }
}

fn formatter(config: &Config, pretty: bool) -> Box<dyn OutputFormatter> {
    match config.output.format {
        OutputFormat::Json if pretty => Box::new(JsonFormatter::new().pretty()),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
        OutputFormat::Text => {
            let colored = config.output.color != ColorMode::Never;
            Box::new(TextFormatter {
                colored,
                ..TextFormatter::default()
            })
        }
    }
}

fn check(config: Config, paths: &[String], pretty: bool) -> Result<ExitCode> {
    let files = loader::load_files(paths)?;
    if files.is_empty() {
        bail!("No files found to analyze");
    }

    let formatter = formatter(&config, pretty);
    let service = DebugService::new(config);
    let session = service.analyze_files(CLI_PROJECT, &files);

    println!("{}", formatter.format(&session).trim_end());
    Ok(exit_code(&session))
}

/// 2 with errors, 1 with warnings only, else 0
fn exit_code(session: &DebugSession) -> ExitCode {
    if !session.errors.is_empty() {
        ExitCode::from(2)
    } else if session.warnings.iter().any(|d| d.is_warning()) {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn fix(config: Config, paths: &[String], write: bool) -> Result<ExitCode> {
    let files = loader::load_files(paths)?;
    if files.is_empty() {
        bail!("No files found to fix");
    }

    let service = DebugService::new(config);
    service.analyze_files(CLI_PROJECT, &files);
    let fixed = service.apply_all_fixes(CLI_PROJECT, &files);
    let applied = service
        .get_session(CLI_PROJECT)
        .map(|s| s.fixed_count)
        .unwrap_or_default();

    let changed: Vec<_> = files
        .iter()
        .zip(&fixed)
        .filter(|(before, after)| before.content != after.content)
        .collect();

    if write {
        let to_write: Vec<_> = changed.iter().map(|(_, after)| (*after).clone()).collect();
        loader::write_files(&to_write)?;
    } else {
        for (before, after) in &changed {
            print_diff(&fixer::unified_diff(&before.path, &before.content, &after.content));
        }
    }

    let verb = if write { "Fixed" } else { "Would fix" };
    println!(
        "{} {} {} in {} {}",
        verb,
        applied,
        if applied == 1 { "issue" } else { "issues" },
        changed.len(),
        if changed.len() == 1 { "file" } else { "files" }
    );

    let remaining = DebugService::new(service.config().clone()).analyze_files(CLI_PROJECT, &fixed);
    let count = remaining.error_count();
    if count.errors + count.warnings > 0 {
        println!(
            "{} remaining: {} errors, {} warnings",
            "Not auto-fixable".yellow(),
            count.errors,
            count.warnings
        );
    }

    Ok(ExitCode::SUCCESS)
}

fn print_diff(diff: &str) {
    for line in diff.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else {
            println!("{}", line);
        }
    }
}

fn watch(config: Config, dir: PathBuf) -> Result<ExitCode> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
    let _guard = runtime.enter();

    let watcher = Watcher::new(&dir)
        .with_context(|| format!("Failed to watch {}", dir.display()))?;
    let root = loader::display_path(&dir);
    let inputs = vec![root.clone()];

    let formatter = formatter(&config, false);
    let service = Arc::new(DebugService::new(config));
    let _subscription = service.subscribe(move |session| {
        let stamp = session.last_analyzed.format("%H:%M:%S");
        println!("{} {}", format!("[{}]", stamp).dimmed(), session.project_id.bold());
        println!("{}", formatter.format(session).trim_end());
    });

    service.analyze_files(&root, &loader::load_files(&inputs)?);
    println!("{} {}", "Watching".green().bold(), root);

    while let Some(event) = watcher.wait() {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                warn!("Watch error: {}", e);
                continue;
            }
        };
        debug!("{:?} {:?}", event.kind, event.paths);

        match loader::load_files(&inputs) {
            Ok(files) => {
                service.schedule_analysis(&root, files);
            }
            Err(e) => warn!("Failed to reload {}: {}", root, e),
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn list_rules(config: &Config) {
    let status = |id: &str| {
        if config.is_rule_enabled(id) {
            String::new()
        } else {
            format!(" {}", "(disabled)".dimmed())
        }
    };

    for family in LanguageFamily::ALL {
        println!("{} ({})", family.to_string().bold(), family.extensions().join(", "));
        for rule in rules::rules_for(family) {
            println!(
                "  {:<24} {:<8} {}{}{}",
                rule.id.cyan(),
                rule.category.to_string(),
                rule.message,
                if rule.is_fixable() { " [fix]" } else { "" },
                status(rule.id)
            );
        }
        println!();
    }

    println!("{}", "structural".bold());
    for id in [
        scanner::UNEXPECTED_CLOSING,
        scanner::MISMATCHED,
        scanner::UNCLOSED,
        heuristics::TODO_COMMENT,
        heuristics::EMPTY_CATCH,
        heuristics::ASYNC_WITHOUT_AWAIT,
    ] {
        println!("  {}{}", id.cyan(), status(id));
    }
}
