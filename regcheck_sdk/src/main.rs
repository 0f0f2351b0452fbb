//! # regcheck CLI
//!

use clap::{Parser, Subcommand, ValueEnum};
use regcheck_base::config::compile_time::execution::MAX_WORKER_THREADS;
use regcheck_base::config::ConfigError;
use regcheck_base::logging::{self, codes, LogLevel};
use regcheck_base::registry::{normalize, RegistrySource};
use regcheck_base::results::{CheckReport, ReportError, UserContext};
use regcheck_base::{log_error, log_info, log_success};
use regcheck_base::{CheckerError, CheckerPreferences, ComplianceChecker};
use regcheck_sdk::{commands, identity, select_registry_source};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "regcheck", version, about = "Windows registry compliance checker")]
struct Cli {
    /// TOML preferences file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit debug log events
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a rule file or a directory of rule files
    Check {
        /// Rule file (.json) or directory
        path: PathBuf,

        /// Evaluate against a JSON registry snapshot instead of the live registry
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Write the JSON report here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads (defaults to available CPUs)
        #[arg(short, long)]
        threads: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Skip the advisory key presence check
        #[arg(long)]
        no_precheck: bool,

        /// Record the current user's SID in the report
        #[arg(long)]
        resolve_sid: bool,
    },

    /// Show how a registry path resolves
    Normalize { path: String },

    /// Print the current user's SID
    Sid,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let preferences = match load_preferences(cli.config.as_deref()) {
        Ok(preferences) if cli.verbose => preferences.with_log_level(LogLevel::Debug),
        Ok(preferences) => preferences,
        Err(e) => {
            // Logging is not up yet; this goes to stderr
            logging::safe_log_error(e.code(), &e.to_string());
            eprintln!("Error: {}", CheckerError::from(e).user_message());
            return ExitCode::from(2);
        }
    };

    if preferences.log_facade {
        env_logger::init();
    }
    if let Err(reason) = logging::init_global_logging(&preferences) {
        logging::safe_log_error(codes::system::INITIALIZATION_FAILURE, &reason);
        eprintln!("Error: {}", CheckerError::Logging { reason }.user_message());
        return ExitCode::from(2);
    }
    if let Some(config) = &cli.config {
        log_success!(
            codes::success::CONFIG_LOADED,
            "Preferences loaded",
            "path" => config.display(),
            "max_threads" => preferences.max_threads
        );
    }

    let outcome = match cli.command {
        Command::Check {
            path,
            snapshot,
            output,
            threads,
            format,
            no_precheck,
            resolve_sid,
        } => {
            let mut preferences = preferences;
            if no_precheck {
                preferences = preferences.with_presence_check(false);
            }
            if let Some(threads) = threads {
                preferences = preferences.with_max_threads(threads);
            } else if cli.config.is_none() && std::env::var("REGCHECK_MAX_THREADS").is_err() {
                preferences = preferences.with_max_threads(default_threads());
            }

            let options = CheckOptions {
                snapshot: snapshot.as_deref(),
                output: output.as_deref(),
                format,
                resolve_sid,
            };
            run_check(&path, preferences, &options)
        }
        Command::Normalize { path } => {
            print_normalized(&path);
            Ok(ExitCode::SUCCESS)
        }
        Command::Sid => print_sid(),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            logging::safe_log_error(codes::system::INTERNAL_ERROR, &e.to_string());
            eprintln!("Error: {}", e.user_message());
            ExitCode::from(2)
        }
    }
}

struct CheckOptions<'a> {
    snapshot: Option<&'a Path>,
    output: Option<&'a Path>,
    format: OutputFormat,
    resolve_sid: bool,
}

fn load_preferences(config: Option<&Path>) -> Result<CheckerPreferences, ConfigError> {
    match config {
        Some(path) => CheckerPreferences::from_toml_file(path),
        None => Ok(CheckerPreferences::default()),
    }
}

fn default_threads() -> usize {
    num_cpus::get().clamp(1, MAX_WORKER_THREADS)
}

fn run_check(
    path: &Path,
    preferences: CheckerPreferences,
    options: &CheckOptions,
) -> Result<ExitCode, CheckerError> {
    log_info!("regcheck starting", "path" => path.display());

    let source = select_registry_source(options.snapshot)?;
    let fail_on_non_compliant = preferences.fail_on_non_compliant;
    let checker = ComplianceChecker::with_preferences(source, preferences)?;

    let mut report = checker.check_path(path)?;
    if options.resolve_sid {
        report = with_resolved_sid(report);
    }

    match options.format {
        OutputFormat::Text => print_text(&checker, &report),
        OutputFormat::Json => println!("{}", report.to_json().map_err(ReportError::from)?),
    }

    if let Some(output) = options.output {
        report.write_to(output)?;
        if options.format == OutputFormat::Text {
            println!("\n[OK] Results saved to: {}", output.display());
        }
    }

    if report.passed() {
        log_success!(
            codes::success::BATCH_EVALUATION_COMPLETE,
            "Compliance check passed",
            "rules" => report.summary.total,
            "duration_ms" => report.timestamp.duration_ms
        );
    } else {
        log_error!(
            codes::evaluation::RULE_NON_COMPLIANT,
            "Compliance check failed",
            "non_compliant" => report.summary.non_compliant,
            "rules" => report.summary.total
        );
    }

    if !report.passed() && fail_on_non_compliant {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn with_resolved_sid(report: CheckReport) -> CheckReport {
    let executor = commands::create_windows_command_executor();
    match identity::resolve_current_user_sid(&executor) {
        Ok(sid) => report.with_user_context(UserContext::from_environment().with_sid(sid)),
        // Already logged; the report is still valid without a SID
        Err(_) => report,
    }
}

fn print_text<S: RegistrySource>(
    checker: &ComplianceChecker<S>,
    report: &CheckReport,
) {
    println!("{}", checker.analyze(&report.results));

    let summary = &report.summary;
    println!("\n=== Check Results ===");
    println!("Status: {}", summary.status);
    println!("Source: {}", report.source);
    println!("Total Rules: {}", summary.total);
    println!("Compliant: {}", summary.compliant);
    println!("Non-Compliant: {}", summary.non_compliant);
    println!("Not Evaluated: {}", summary.not_evaluated);
    println!("Pass Rate: {:.1}%", summary.pass_percentage);
    println!("Duration: {}ms", report.timestamp.duration_ms);
}

fn print_normalized(raw: &str) {
    let resolution = normalize(raw);
    println!("{}", resolution.to_path());
    if resolution.is_defaulted() {
        println!("(no recognized root key, defaulted to {})", resolution.root());
    }
}

fn print_sid() -> Result<ExitCode, CheckerError> {
    let executor = commands::create_windows_command_executor();
    match identity::resolve_current_user_sid(&executor) {
        Ok(sid) => {
            println!("{}", sid);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}
