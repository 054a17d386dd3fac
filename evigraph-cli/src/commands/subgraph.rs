//! Subgraph command - run the pipeline for an ad-hoc set of entities
//!
//! The first entity is used as the record key, the rest as its mentions.

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use evigraph_core::{prune_triple, PrefixMap, Triple};
use evigraph_engine::{build_pipeline, load_prefixes, EngineConfig, Record, RecordResult};

use super::BackendArgs;
use crate::output::{truncate, Output, OutputFormat, TableDisplay, TableOutput};

/// Widest cell shown in table output.
const MAX_CELL_WIDTH: usize = 60;

#[derive(Debug, Clone, Args)]
pub struct SubgraphArgs {
    /// External entity ids (e.g. Q42); the first one is the record key
    #[arg(required = true, num_args = 1..)]
    pub entities: Vec<String>,

    /// Print only the local name of every URI
    #[arg(long, conflicts_with = "compact")]
    pub prune: bool,

    /// Abbreviate URIs with known prefixes (yago:, schema:, ...)
    #[arg(long)]
    pub compact: bool,

    /// Print only the largest connected piece
    #[arg(long)]
    pub largest_only: bool,

    #[command(flatten)]
    pub backend: BackendArgs,
}

/// Which rendering to apply to each URI.
#[derive(Debug, Clone)]
enum Rendering {
    Full,
    Pruned,
    Compact(PrefixMap),
}

impl Rendering {
    fn apply(&self, triple: &Triple) -> Triple {
        match self {
            Rendering::Full => triple.clone(),
            Rendering::Pruned => prune_triple(triple),
            Rendering::Compact(prefixes) => prefixes.compact_triple(triple),
        }
    }
}

/// Result of a subgraph run
#[derive(Debug, Serialize)]
pub struct SubgraphReport {
    pub key: String,
    pub entities: Vec<String>,
    pub steiner_length: usize,
    pub largest_connected_length: usize,
    pub largest_only: bool,
    pub triples: Vec<Triple>,
}

impl SubgraphReport {
    fn new(record: &Record, result: RecordResult, largest_only: bool, rendering: &Rendering) -> Self {
        let selected = if largest_only {
            &result.largest
        } else {
            &result.steiner
        };
        Self {
            key: record.key.clone(),
            entities: record.interesting_ids(),
            steiner_length: result.steiner_len,
            largest_connected_length: result.largest_len,
            largest_only,
            triples: selected.iter().map(|t| rendering.apply(t)).collect(),
        }
    }
}

impl TableDisplay for SubgraphReport {
    fn to_table(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} {} ({})\n",
            "Subgraph for".cyan().bold(),
            self.key.yellow(),
            self.entities.join(", ")
        ));

        if self.triples.is_empty() {
            output.push_str(&format!("{}", "No connecting subgraph found.".dimmed()));
            return output;
        }

        let rows: Vec<Vec<String>> = self
            .triples
            .iter()
            .map(|t| {
                vec![
                    truncate(&t.subject, MAX_CELL_WIDTH),
                    truncate(&t.predicate, MAX_CELL_WIDTH),
                    truncate(&t.object, MAX_CELL_WIDTH),
                ]
            })
            .collect();
        output.push_str(&TableOutput::rows(&["subject", "predicate", "object"], &rows));
        output.push_str(&format!(
            "\n{} {} triple(s), largest connected piece {}",
            "Steiner".dimmed(),
            self.steiner_length.to_string().cyan(),
            self.largest_connected_length.to_string().cyan()
        ));
        output
    }
}

/// Run the subgraph command
pub async fn run(
    args: SubgraphArgs,
    mut config: EngineConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    args.backend.apply(&mut config);

    let rendering = if args.prune {
        Rendering::Pruned
    } else if args.compact {
        Rendering::Compact(load_prefixes(&config.prefixes)?)
    } else {
        Rendering::Full
    };

    let (key, mentions) = args
        .entities
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("At least one entity is required"))?;
    let record = Record::from_ids(key.clone(), mentions);

    let backends = args.backend.backends(&config)?;
    let pipeline = build_pipeline(&config, backends)?;
    let result = pipeline.run(&record).await?;

    let report = SubgraphReport::new(&record, result, args.largest_only, &rendering);
    Output::new(report, format).render()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> RecordResult {
        RecordResult::new(
            vec![
                Triple::new(
                    "http://yago-knowledge.org/resource/Rome",
                    "http://schema.org/containedInPlace",
                    "http://yago-knowledge.org/resource/Italy",
                ),
                Triple::new("http://example.org/X", "http://example.org/p", "http://example.org/Y"),
            ],
            vec![Triple::new(
                "http://yago-knowledge.org/resource/Rome",
                "http://schema.org/containedInPlace",
                "http://yago-knowledge.org/resource/Italy",
            )],
        )
    }

    #[test]
    fn test_report_selects_largest() {
        let record = Record::from_ids("Q220", &["Q38".to_string()]);
        let report = SubgraphReport::new(&record, result(), true, &Rendering::Full);
        assert_eq!(report.triples.len(), 1);
        assert_eq!(report.steiner_length, 2);
        assert_eq!(report.largest_connected_length, 1);
        assert_eq!(report.entities, vec!["Q38", "Q220"]);
    }

    #[test]
    fn test_report_renderings() {
        let record = Record::from_ids("Q220", &[]);

        let pruned = SubgraphReport::new(&record, result(), false, &Rendering::Pruned);
        assert_eq!(pruned.triples[0], Triple::new("Rome", "containedInPlace", "Italy"));

        let compact =
            SubgraphReport::new(&record, result(), false, &Rendering::Compact(PrefixMap::default()));
        assert_eq!(
            compact.triples[0],
            Triple::new("yago:Rome", "schema:containedInPlace", "yago:Italy")
        );
        // unknown namespaces stay as full URIs
        assert_eq!(compact.triples[1].subject, "http://example.org/X");
    }

    #[test]
    fn test_empty_report_table() {
        let record = Record::from_ids("Q1", &[]);
        let report = SubgraphReport::new(&record, RecordResult::default(), false, &Rendering::Full);
        assert!(report.to_table().contains("No connecting subgraph"));
    }
}
