//! Command-line arguments

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use loadtest_common::config::{DEFAULT_DATA_DIR, DEFAULT_MASTER_URL, DEFAULT_TESTS_URL};
use loadtest_common::LoadtestConfig;

/// Marks an argument that names a file of further arguments
pub const ARG_FILE_PREFIX: char = '@';

/// Nesting limit for argument files that reference other argument files
const MAX_ARG_FILE_DEPTH: usize = 8;

/// Runs a load test using the Neocortix cloud load-test service
#[derive(Parser, Debug)]
#[command(name = "run-remote-loadtest")]
#[command(version = loadtest_common::VERSION, about, long_about = None)]
#[command(after_help = "Arguments may also be read from a file: @path reads one argument per line.")]
pub struct Cli {
    /// URL of the host to target as victim
    #[arg(value_name = "victimHostUrl")]
    pub victim_host_url: String,

    /// The NCS authorization token to use
    #[arg(long = "authToken", value_name = "TOKEN")]
    pub auth_token: String,

    /// An alternative target host URL for comparison
    #[arg(long = "altTargetHostUrl", value_name = "URL")]
    pub alt_target_host_url: Option<String>,

    /// File path to write detailed info in JSON format
    #[arg(long = "jsonOut", value_name = "PATH")]
    pub json_out: Option<String>,

    /// URL of the master
    #[arg(long = "masterUrl", default_value = DEFAULT_MASTER_URL)]
    pub master_url: String,

    /// Test-creation endpoint of the cloud API
    #[arg(long = "testsUrl", default_value = DEFAULT_TESTS_URL)]
    pub tests_url: String,

    /// Number of worker instances to launch (or zero for all available)
    #[arg(long = "nWorkers", default_value_t = 1)]
    pub n_workers: u32,

    /// Number of simulated users to start per second (overall) [default: 0]
    #[arg(long = "rampUpRate", value_name = "RATE")]
    pub ramp_up_rate: Option<f64>,

    /// List of geographic regions (or none for all regions)
    #[arg(long = "regions", num_args = 0..)]
    pub regions: Option<Vec<String>>,

    /// Required ms per response [default: 1000]
    #[arg(long = "reqMsprMean", value_name = "MS")]
    pub req_mspr_mean: Option<f64>,

    /// Time to sustain the test after startup (in seconds)
    #[arg(long = "susTime", default_value_t = 10)]
    pub sus_time: u32,

    /// List of URIs to target
    #[arg(long = "targetUris", num_args = 0..)]
    pub target_uris: Option<Vec<String>>,

    /// Number of simulated users per worker
    #[arg(long = "usersPerWorker", default_value_t = 6)]
    pub users_per_worker: u32,

    /// Local directory for downloaded result files
    #[arg(long = "dataDir", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse the process arguments, expanding `@file` references first
    pub fn parse_with_arg_files() -> Result<Self> {
        let args = expand_arg_files(std::env::args_os())?;
        Ok(Self::parse_from(args))
    }

    pub fn into_config(self) -> LoadtestConfig {
        LoadtestConfig {
            victim_host_url: self.victim_host_url,
            auth_token: self.auth_token,
            alt_target_host_url: self.alt_target_host_url,
            json_out: self.json_out,
            master_url: self.master_url,
            tests_url: self.tests_url,
            n_workers: self.n_workers,
            ramp_up_rate: self.ramp_up_rate,
            regions: self.regions,
            req_mspr_mean: self.req_mspr_mean,
            sus_time: self.sus_time,
            target_uris: self.target_uris,
            users_per_worker: self.users_per_worker,
            data_dir: self.data_dir,
        }
    }
}

/// Replace every `@path` argument with the lines of that file.
///
/// The first argument (the program name) is passed through untouched.
/// Blank lines are skipped; lines are otherwise taken verbatim.
pub fn expand_arg_files<I>(args: I) -> Result<Vec<OsString>>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter();
    let mut expanded: Vec<OsString> = args.next().into_iter().collect();
    for arg in args {
        expand_into(arg, &mut expanded, 0)?;
    }
    Ok(expanded)
}

fn expand_into(arg: OsString, out: &mut Vec<OsString>, depth: usize) -> Result<()> {
    let Some(path) = arg.to_str().and_then(|s| s.strip_prefix(ARG_FILE_PREFIX)) else {
        out.push(arg);
        return Ok(());
    };
    if depth >= MAX_ARG_FILE_DEPTH {
        bail!("argument files nested deeper than {} levels at @{}", MAX_ARG_FILE_DEPTH, path);
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read argument file {}", path))?;
    // a blank line would otherwise become an empty positional argument
    for line in contents.lines().filter(|l| !l.trim().is_empty()) {
        expand_into(OsString::from(line), out, depth + 1)?;
    }
    Ok(())
}
