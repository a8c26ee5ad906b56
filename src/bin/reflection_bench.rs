use clap::{Parser, Subcommand, ValueEnum};
use reflection_bench::benches;
use reflection_bench::harness::{BenchConfig, Profile};
use reflection_bench::records::record_registry;
use reflection_bench::schema::{BenchReport, RunMeta, SCHEMA_VERSION};
use reflection_bench::{RecordKind, ReportError};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Quick,
    Full,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Quick => Profile::Quick,
            ProfileArg::Full => Profile::Full,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generic vs hand-written JSON serialization of the demo records.
    Serialization {
        /// Which record type(s) to benchmark.
        #[arg(long, value_enum, default_value_t = RecordKind::All)]
        record: RecordKind,
    },

    /// Descriptor-driven vs hand-written SQL INSERT generation.
    Sql,

    /// Run every scenario.
    Suite,

    /// Print the registered record types and their fields.
    Describe,
}

#[derive(Parser, Debug)]
#[command(name = "reflection-bench")]
#[command(about = "Generic vs specialized serialization benchmark runner (JSON output)")]
struct Args {
    #[arg(long, value_enum, default_value_t = ProfileArg::Quick, global = true)]
    profile: ProfileArg,

    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Where to write the JSON report. If omitted, prints to stdout.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn now_utc() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

fn git_sha_short() -> Option<String> {
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

fn main() -> Result<(), ReportError> {
    let args = Args::parse();
    init_logging(args.verbose);

    let cfg = BenchConfig {
        profile: args.profile.into(),
        seed: args.seed,
    };
    let registry = record_registry()?;

    if let Command::Describe = args.cmd {
        for name in registry.type_names() {
            println!("{name}");
            for field in registry.fields_of(name.as_str())? {
                println!("  {}: {}", field.name(), field.kind());
            }
        }
        return Ok(());
    }

    let harness = cfg.harness();
    tracing::info!(
        profile = cfg.profile.as_str(),
        seed = cfg.seed,
        clock_ns = harness.clock().resolution_ns,
        "starting benchmark run"
    );

    let mut comparisons = Vec::new();
    match args.cmd {
        Command::Serialization { record } => {
            comparisons.extend(benches::serialization::run(&cfg, &harness, &registry, record)?);
        }
        Command::Sql => {
            comparisons.extend(benches::sql::run(&cfg, &harness, &registry)?);
        }
        Command::Suite => {
            comparisons.extend(benches::serialization::run(
                &cfg,
                &harness,
                &registry,
                RecordKind::All,
            )?);
            comparisons.extend(benches::sql::run(&cfg, &harness, &registry)?);
        }
        Command::Describe => {}
    }

    let report = BenchReport {
        run: RunMeta {
            schema_version: SCHEMA_VERSION,
            bench_version: env!("CARGO_PKG_VERSION").to_string(),
            profile: cfg.profile.as_str().to_string(),
            seed: cfg.seed,
            timestamp_utc: now_utc(),
            git_sha: git_sha_short(),
            clock: harness.clock(),
            warmup_trials: harness.warmup_trials(),
        },
        comparisons,
    };

    if !report.all_outputs_match() {
        tracing::warn!("generic and specialized outputs diverged in at least one scenario");
    }

    match args.out {
        Some(path) => {
            report.save(&path)?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => println!("{}", report.to_json_pretty()?),
    }

    Ok(())
}
