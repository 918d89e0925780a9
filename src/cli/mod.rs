//! CLI argument parsing and run setup

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;

use esperf_core::{
    aggregate_worker_stats, AggregatedStats, ConditionSet, EngineBuilder, LoadConfig,
    Recorder, RunContext, SubstitutionSet,
};
use esperf_samplers::TemplateSampler;
use esperf_storage::CsvRecorder;
use esperf_vendors::{ClientConfig, ElasticsearchClient};

/// esperf - concurrent search load generator
#[derive(Parser, Debug)]
#[command(name = "esperf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (Threads, Mins, Hosts, Index, Type)
    #[arg(long)]
    pub conf: PathBuf,

    /// Conditions file (list of {"ID", "Cond"} templates)
    #[arg(long)]
    pub conds: PathBuf,

    /// Substitution data file (placeholder key to candidate values)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Result log written one CSV row per request
    #[arg(long, default_value = "esperf.log")]
    pub log: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Seed for reproducible request streams
    #[arg(long, env = "ESPERF_SEED")]
    pub seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Load inputs, run the load test and print a summary
    ///
    /// Every startup failure is returned before any worker is spawned.
    pub async fn run(&self) -> Result<()> {
        let context = Arc::new(self.load_context()?);

        let recorder = Arc::new(
            CsvRecorder::create(&self.log)
                .with_context(|| format!("Failed to create result log: {}", self.log.display()))?,
        );

        let client_config =
            ClientConfig::default().with_request_timeout(Duration::from_secs(self.timeout));
        let client = Arc::new(
            ElasticsearchClient::new(client_config).context("Failed to build HTTP client")?,
        );

        let sampler = Arc::new(TemplateSampler::new(Arc::clone(&context)));

        let engine = EngineBuilder::new()
            .context(Arc::clone(&context))
            .client(client)
            .sampler(sampler)
            .recorder(recorder.clone())
            .seed(self.seed)
            .build()
            .context("Failed to build engine")?;

        self.print_banner(&context.config);

        let stats = engine
            .run_with_signal_handling(context.config.run_duration())
            .await
            .context("Load run failed")?;

        print_summary(
            &aggregate_worker_stats(&stats),
            recorder.records_written(),
            &self.log,
        );

        Ok(())
    }

    /// Read and validate the configuration, conditions and data files
    pub fn load_context(&self) -> Result<RunContext> {
        let config: LoadConfig = load_json(&self.conf, "configuration")?;
        let conditions: ConditionSet = load_json(&self.conds, "conditions")?;
        let substitutions = match &self.data {
            Some(path) => load_json(path, "substitution data")?,
            None => SubstitutionSet::empty(),
        };

        tracing::info!(
            threads = config.threads,
            mins = config.mins,
            hosts = config.hosts.len(),
            conditions = conditions.len(),
            substitution_keys = substitutions.len(),
            "Loaded run inputs"
        );

        RunContext::new(config, conditions, substitutions)
            .with_context(|| format!("Invalid configuration in {}", self.conf.display()))
    }

    fn print_banner(&self, config: &LoadConfig) {
        println!("\n{}", "=".repeat(70));
        println!("   esperf - Search Load Generator");
        println!("{}", "=".repeat(70));
        println!("  Threads:  {}", config.threads);
        println!("  Duration: {} min", config.mins);
        println!("  Hosts:    {}", config.hosts.join(", "));
        println!("  Endpoint: /{}/{}/_search", config.index, config.doc_type);
        println!("  Log:      {}", self.log.display());
        if let Some(seed) = self.seed {
            println!("  Seed:     {}", seed);
        }
        println!("{}", "=".repeat(70));
        println!();
    }
}

fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {} file: {}", what, path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse {} file: {}", what, path.display()))
}

fn print_summary(stats: &AggregatedStats, rows: u64, log: &Path) {
    println!("\n{}", "=".repeat(70));
    println!("   Results");
    println!("{}", "=".repeat(70));
    println!("  Workers:            {}", stats.total_workers);
    println!("  Requests:           {}", stats.total_attempts);
    println!(
        "  Succeeded:          {} ({:.2}%)",
        stats.total_succeeded(),
        stats.success_rate() * 100.0
    );
    println!("  Errors:             {}", stats.total_errors);
    println!("  Non-200 responses:  {}", stats.total_unsuccessful_status);
    println!("  Total hits:         {}", stats.total_hits);
    println!("  Throughput:         {:.2} req/s", stats.requests_per_second);
    println!();
    println!("  Latency (ms):");
    println!("    mean: {:>10.2}", stats.latency.mean);
    println!("    p50:  {:>10.2}", stats.latency.p50);
    println!("    p90:  {:>10.2}", stats.latency.p90);
    println!("    p99:  {:>10.2}", stats.latency.p99);
    println!("    max:  {:>10.2}", stats.latency.max);
    println!();
    println!("  Rows written to {}: {}", log.display(), rows);
    if stats.total_record_failures > 0 {
        println!("  Rows lost:          {}", stats.total_record_failures);
    }
    println!("{}", "=".repeat(70));
}
