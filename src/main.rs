use anyhow::Result;
use clap::Parser;
use colored::control::set_override as set_color_override;
use kernel_test::campaign::{run_campaign, CampaignOptions};
use kernel_test::driver::{MakeDriver, DEFAULT_RUN_TIMEOUT};
use kernel_test::groups::load_groups;
use kernel_test::report::print_final;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

const SUPPORTED_TARGETS: [&str; 2] = ["x86_64", "x86_i386"];

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Runs kernel test campaigns under an emulator and validates their reports"
)]
struct Cli {
    /// Build target identifier
    #[arg(value_name = "TARGET")]
    target: String,

    /// Group-definition file (JSON)
    #[arg(value_name = "GROUPS")]
    groups: PathBuf,

    /// Test configuration header to patch
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Capture path for the emulator console output
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Wall-clock bound for one emulator run, in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Suppress report rendering, keep the counters and exit status
    #[arg(short = 'q', long = "silent")]
    silent: bool,

    /// Verbose progress logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    no_color: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // With -v show INFO and above; RUST_LOG can still override either way.
    let filter = if cli.verbose {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "kernel_test=info".to_string())
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "kernel_test=warn".to_string())
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if cli.no_color {
        set_color_override(false);
    }

    // Not fatal: the build tool gets the name as given and its failures are
    // counted per group.
    if !SUPPORTED_TARGETS.contains(&cli.target.as_str()) {
        error!(
            "unknown target '{}', supported targets are {}",
            cli.target,
            SUPPORTED_TARGETS.join(", ")
        );
    }

    let groups = load_groups(&cli.groups)?;
    info!(
        "campaign of {} group(s) on target {}",
        groups.len(),
        cli.target
    );

    let opts = CampaignOptions {
        target: cli.target,
        timeout: cli
            .timeout
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RUN_TIMEOUT),
        silent: cli.silent,
    };

    let summary = match run_campaign(&MakeDriver, &groups, &cli.config, &cli.output, &opts) {
        Ok(summary) => summary,
        Err(e) => {
            error!("{e:#}");
            std::process::exit(2);
        }
    };

    if !cli.silent {
        print_final(&summary);
    }

    std::process::exit(summary.error as i32);
}
