use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use allowaudit::config::Config;
use allowaudit::error::AuditError;
use allowaudit::output::OutputFormat;
use allowaudit::rules::{CompiledPathMatcher, PathRule};
use allowaudit::{AuditInputs, AuditOptions};

#[derive(Parser)]
#[command(
    name = "allowaudit",
    about = "Audit application execution logs against allowlisting rules",
    version,
    author
)]
struct Cli {
    /// Log filter directive (e.g. warn, info, allowaudit=debug)
    #[arg(long, global = true, default_value = "warn", env = "ALLOWAUDIT_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify an execution log against path, publisher and hash allow rules
    Audit {
        /// Execution log (.csv, .tsv, .json, .jsonl)
        log: PathBuf,

        /// Path allow rules, one per line
        #[arg(long, short = 'r')]
        rules: PathBuf,

        /// Allowed publishers, one per line
        #[arg(long, short = 'p')]
        publishers: Option<PathBuf>,

        /// Allowed SHA-256 hashes, one per line
        #[arg(long = "hashes")]
        hashes: Option<PathBuf>,

        /// Config file path
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Output format (console, json, csv, tsv)
        #[arg(long, short = 'f', default_value = "console")]
        format: String,

        /// Only show executions that would be blocked
        #[arg(long)]
        only_blocked: bool,

        /// Exit with status 1 when any execution would be blocked
        #[arg(long)]
        fail_on_blocked: bool,

        /// Classify on a single thread
        #[arg(long)]
        no_parallel: bool,

        /// Write output to file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Clean and compile one path rule, optionally testing paths against it
    CheckRule {
        /// Path rule in vendor wildcard syntax
        rule: String,

        /// Candidate paths to test
        paths: Vec<String>,

        /// Match without regard to letter case
        #[arg(long, short = 'i')]
        case_insensitive: bool,
    },

    /// Generate a starter .allowaudit.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Audit {
            log,
            rules,
            publishers,
            hashes,
            config,
            format,
            only_blocked,
            fail_on_blocked,
            no_parallel,
            output,
        } => {
            let inputs = AuditInputs {
                path_rules: rules,
                publishers,
                hashes,
                execution_log: log,
            };
            let flags = AuditFlags {
                only_blocked,
                fail_on_blocked,
                no_parallel,
            };
            cmd_audit(inputs, config, format, flags, output)
        }
        Commands::CheckRule {
            rule,
            paths,
            case_insensitive,
        } => cmd_check_rule(rule, paths, case_insensitive),
        Commands::Init { force } => cmd_init(force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

struct AuditFlags {
    only_blocked: bool,
    fail_on_blocked: bool,
    no_parallel: bool,
}

fn cmd_audit(
    inputs: AuditInputs,
    config: Option<PathBuf>,
    format_str: String,
    flags: AuditFlags,
    output_path: Option<PathBuf>,
) -> Result<i32, AuditError> {
    let format = OutputFormat::from_str_lenient(&format_str).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", format_str);
        OutputFormat::Console
    });

    // Flags only ever switch behaviour on; leave config values alone otherwise.
    let options = AuditOptions {
        config_path: config,
        format,
        only_blocked_override: flags.only_blocked.then_some(true),
        fail_on_blocked_override: flags.fail_on_blocked.then_some(true),
        parallel_override: flags.no_parallel.then_some(false),
    };

    let result = allowaudit::audit(&inputs, &options)?;
    let rendered = allowaudit::render_report(&result)?;

    match output_path {
        Some(out) => std::fs::write(&out, &rendered)?,
        None => print!("{}", rendered),
    }

    // Exit code: 0 = pass, 1 = blocked executions with --fail-on-blocked
    Ok(if result.verdict.pass { 0 } else { 1 })
}

fn cmd_check_rule(
    raw: String,
    paths: Vec<String>,
    case_insensitive: bool,
) -> Result<i32, AuditError> {
    let Some(rule) = PathRule::parse(&raw) else {
        eprintln!("Not a path rule: {:?}", raw);
        return Ok(1);
    };
    let matcher = CompiledPathMatcher::compile(0, rule, case_insensitive)?;

    println!("rule:    {}", matcher.rule());
    println!("pattern: {}", matcher.pattern());

    let mut all_matched = true;
    for path in &paths {
        let matched = matcher.is_match(path);
        all_matched &= matched;
        println!("{:<8} {}", if matched { "match" } else { "no-match" }, path);
    }

    Ok(if all_matched { 0 } else { 1 })
}

fn cmd_init(force: bool) -> Result<i32, AuditError> {
    let path = PathBuf::from(".allowaudit.toml");

    if path.exists() && !force {
        eprintln!(".allowaudit.toml already exists. Use --force to overwrite.");
        return Ok(1);
    }

    std::fs::write(&path, Config::starter_toml())?;
    println!("Created .allowaudit.toml");

    Ok(0)
}
