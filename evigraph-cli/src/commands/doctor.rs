//! Doctor command - health check for an evigraph setup
//!
//! Checks that the configuration validates, that the SPARQL endpoint answers
//! `ASK {}`, and that the output directories are writable.

use std::path::Path;

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use evigraph_engine::{load_prefixes, EngineConfig, SparqlClient};

use super::BackendArgs;
use crate::output::{Output, OutputFormat, TableDisplay};

#[derive(Debug, Clone, Args)]
pub struct DoctorArgs {
    /// SPARQL endpoint URL (overrides `[endpoint].url`)
    #[arg(long, env = "EVIGRAPH_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Skip the endpoint reachability check
    #[arg(long)]
    pub offline: bool,
}

/// Status of a health check item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckStatus {
    fn colored_icon(&self) -> String {
        match self {
            CheckStatus::Ok => "[OK]".green().to_string(),
            CheckStatus::Warning => "[!!]".yellow().to_string(),
            CheckStatus::Error => "[!!]".red().to_string(),
        }
    }
}

/// A single health check item
#[derive(Debug, Clone, Serialize)]
pub struct CheckItem {
    pub status: CheckStatus,
    pub label: String,
    pub value: String,
}

impl CheckItem {
    fn ok(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Ok,
            label: label.into(),
            value: value.into(),
        }
    }

    fn warning(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Warning,
            label: label.into(),
            value: value.into(),
        }
    }

    fn error(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Error,
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Result of health check
#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: Vec<CheckItem>,
    pub recommendations: Vec<String>,
}

impl DoctorResult {
    pub fn errors(&self) -> usize {
        self.checks
            .iter()
            .filter(|c| c.status == CheckStatus::Error)
            .count()
    }
}

impl TableDisplay for DoctorResult {
    fn to_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("{}\n", "evigraph Health Check".cyan().bold()));
        output.push_str(&format!("{}\n", "\u{2500}".repeat(40).dimmed()));

        for check in &self.checks {
            output.push_str(&format!(
                "{} {}: {}\n",
                check.status.colored_icon(),
                check.label,
                check.value
            ));
        }

        if !self.recommendations.is_empty() {
            output.push_str(&format!("\n{}\n", "Recommendations:".yellow().bold()));
            for rec in &self.recommendations {
                output.push_str(&format!("  - {}\n", rec));
            }
        }

        output
    }
}

fn check_config(config: &EngineConfig) -> CheckItem {
    match config.validate() {
        Ok(()) => CheckItem::ok(
            "Config",
            format!(
                "valid (fetch concurrency {}, flush every {} records)",
                config.fetch.concurrency, config.batch.flush_interval
            ),
        ),
        Err(e) => CheckItem::error("Config", e.to_string()),
    }
}

fn check_prefixes(config: &EngineConfig) -> CheckItem {
    match load_prefixes(&config.prefixes) {
        Ok(prefixes) => CheckItem::ok("Prefixes", format!("{} declared", prefixes.len())),
        Err(e) => CheckItem::error("Prefixes", e.to_string()),
    }
}

async fn check_endpoint(config: &EngineConfig) -> CheckItem {
    let client = match SparqlClient::new(&config.endpoint) {
        Ok(client) => client,
        Err(e) => return CheckItem::error("Endpoint", e.to_string()),
    };
    match client.ping().await {
        Ok(true) => CheckItem::ok("Endpoint", format!("{} answers ASK", client.endpoint())),
        Ok(false) => CheckItem::warning(
            "Endpoint",
            format!("{} answered ASK with false", client.endpoint()),
        ),
        Err(e) => CheckItem::error("Endpoint", format!("{}: {}", client.endpoint(), e)),
    }
}

/// Create `dir` if needed and write a probe file into it.
fn check_writable(label: &str, dir: &Path) -> CheckItem {
    let probe = dir.join(".evigraph-write-test");
    let result = std::fs::create_dir_all(dir)
        .and_then(|_| std::fs::write(&probe, b"ok"))
        .and_then(|_| std::fs::remove_file(&probe));
    match result {
        Ok(()) => CheckItem::ok(label, format!("{} is writable", dir.display())),
        Err(e) => CheckItem::error(label, format!("{}: {}", dir.display(), e)),
    }
}

/// Run every check against `config`.
pub async fn diagnose(config: &EngineConfig, offline: bool) -> DoctorResult {
    let mut checks = vec![check_config(config), check_prefixes(config)];
    let mut recommendations = Vec::new();

    if offline {
        checks.push(CheckItem::warning("Endpoint", "skipped (--offline)"));
    } else {
        let endpoint = check_endpoint(config).await;
        if endpoint.status == CheckStatus::Error {
            recommendations.push(
                "Start the SPARQL endpoint or point --endpoint at a reachable one; \
                 `generate --triples <file>` runs without an endpoint"
                    .to_string(),
            );
        }
        checks.push(endpoint);
    }

    checks.push(check_writable("Output dir", &config.batch.output_dir));
    checks.push(check_writable("Intermediate dir", &config.batch.intermediate_dir));

    if checks[0].status == CheckStatus::Error {
        recommendations.push("Fix the settings in .evigraphrc.toml".to_string());
    }

    DoctorResult {
        checks,
        recommendations,
    }
}

/// Run the doctor command
pub async fn run(
    args: DoctorArgs,
    mut config: EngineConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let backend = BackendArgs {
        endpoint: args.endpoint,
        ..Default::default()
    };
    backend.apply(&mut config);

    let result = diagnose(&config, args.offline).await;
    let errors = result.errors();
    Output::new(result, format).render()?;

    if errors > 0 {
        anyhow::bail!("{} check(s) failed", errors);
    }
    Ok(())
}
