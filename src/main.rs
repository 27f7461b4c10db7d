use std::io::{self, Read};
use std::path::PathBuf;

use clap::Parser;

use sqlpretty::mode::Mode;
use sqlpretty::report::{FileStatus, Report};

/// sqlpretty - A width-aware SQL pretty printer.
#[derive(Parser, Debug)]
#[command(name = "sqlpretty", version, about)]
struct Cli {
    /// Files or directories to format. Use "-" to read from stdin.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Maximum line length. Defaults to the configured value, or 80.
    #[arg(short = 'l', long)]
    line_length: Option<usize>,

    /// Check formatting without writing changes.
    #[arg(long)]
    check: bool,

    /// Show formatting diff.
    #[arg(long)]
    diff: bool,

    /// Skip safety equivalence check (faster).
    #[arg(long)]
    fast: bool,

    /// Glob patterns to exclude.
    #[arg(long)]
    exclude: Vec<String>,

    /// Verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Quiet output (errors only).
    #[arg(short, long)]
    quiet: bool,

    /// Force color output.
    #[arg(long)]
    force_color: bool,

    /// Disable color output.
    #[arg(long)]
    no_color: bool,

    /// Number of threads for parallel processing (0 = all cores).
    #[arg(short = 't', long, default_value_t = 0)]
    threads: usize,

    /// Disable multi-threaded processing.
    #[arg(long)]
    single_process: bool,

    /// Path to config file (pyproject.toml or sqlpretty.toml).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let is_stdin = cli.files.len() == 1 && cli.files[0].to_string_lossy() == "-";

    let base_mode = match sqlpretty::load_config(&cli.files, cli.config.as_deref()) {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(2);
        }
    };

    let mode = Mode {
        line_length: cli.line_length.unwrap_or(base_mode.line_length),
        check: cli.check,
        diff: cli.diff,
        fast: cli.fast,
        exclude: if cli.exclude.is_empty() {
            base_mode.exclude.clone()
        } else {
            cli.exclude.clone()
        },
        verbose: cli.verbose,
        quiet: cli.quiet,
        no_color: cli.no_color,
        force_color: cli.force_color,
        threads: cli.threads,
        single_process: cli.single_process,
        ..base_mode
    };

    if let Err(e) = mode.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(2);
    }

    if is_stdin {
        let mut source = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut source) {
            eprintln!("Error reading stdin: {}", e);
            std::process::exit(2);
        }

        match sqlpretty::format_string(&source, &mode) {
            Ok(formatted) => {
                println!("{}", formatted);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(2);
            }
        }
    } else {
        let report = sqlpretty::run(&cli.files, &mode);

        if !mode.quiet {
            print_verbose_results(&report, &mode);
            eprintln!("{}", report.summary(mode.check));
        }

        report.print_errors();

        if report.has_errors() {
            std::process::exit(2);
        } else if mode.check && report.has_changes() {
            std::process::exit(1);
        }
    }
}

fn print_verbose_results(report: &Report, mode: &Mode) {
    if !mode.verbose {
        return;
    }
    for result in &report.results {
        match result.status {
            FileStatus::Changed if mode.check => {
                eprintln!("would reformat {}", result.path.display());
            }
            FileStatus::Changed => {
                eprintln!("reformatted {}", result.path.display());
            }
            FileStatus::Unchanged => {
                eprintln!("unchanged {}", result.path.display());
            }
            // Errors are printed once by the report.
            FileStatus::Error => {}
        }
    }
}
