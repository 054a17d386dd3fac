//! Inspect command - summarize a checkpoint artifact

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use evigraph_core::local_name;
use evigraph_engine::{read_artifact, BatchResults};

use crate::output::{Output, OutputFormat, TableDisplay, TableOutput};

/// Predicates listed in the frequency table.
const TOP_PREDICATES: usize = 10;

#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Artifact written by `generate` (final or intermediate)
    pub artifact: PathBuf,
}

/// Size of the biggest record in an artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LargestRecord {
    pub key: String,
    pub steiner_length: usize,
}

/// Statistics over one artifact
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub path: PathBuf,
    pub records: usize,
    pub empty_records: usize,
    pub steiner_triples: usize,
    pub largest_connected_triples: usize,
    pub avg_steiner_length: f64,
    pub avg_largest_connected_length: f64,
    pub largest_record: Option<LargestRecord>,
    /// Most frequent predicates across Steiner subgraphs, by local name.
    pub top_predicates: Vec<(String, usize)>,
}

impl InspectReport {
    pub fn from_results(path: &Path, results: &BatchResults) -> Self {
        let records = results.len();
        let mut empty_records = 0;
        let mut steiner_triples = 0;
        let mut largest_connected_triples = 0;
        let mut largest_record: Option<LargestRecord> = None;
        let mut predicates: HashMap<&str, usize> = HashMap::new();

        for (key, result) in results.iter() {
            if result.steiner.is_empty() {
                empty_records += 1;
            }
            steiner_triples += result.steiner.len();
            largest_connected_triples += result.largest.len();

            if largest_record
                .as_ref()
                .map_or(true, |r| result.steiner.len() > r.steiner_length)
            {
                largest_record = Some(LargestRecord {
                    key: key.to_string(),
                    steiner_length: result.steiner.len(),
                });
            }

            for triple in &result.steiner {
                *predicates.entry(local_name(&triple.predicate)).or_default() += 1;
            }
        }

        let mut top_predicates: Vec<(String, usize)> = predicates
            .into_iter()
            .map(|(p, n)| (p.to_string(), n))
            .collect();
        top_predicates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_predicates.truncate(TOP_PREDICATES);

        let average = |total: usize| {
            if records == 0 {
                0.0
            } else {
                total as f64 / records as f64
            }
        };

        Self {
            path: path.to_path_buf(),
            records,
            empty_records,
            steiner_triples,
            largest_connected_triples,
            avg_steiner_length: average(steiner_triples),
            avg_largest_connected_length: average(largest_connected_triples),
            largest_record,
            top_predicates,
        }
    }
}

impl TableDisplay for InspectReport {
    fn to_table(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{} {}\n",
            "Artifact".cyan().bold(),
            self.path.display()
        ));

        let mut pairs = vec![
            ("records", self.records.to_string()),
            ("empty records", self.empty_records.to_string()),
            ("Steiner triples", self.steiner_triples.to_string()),
            (
                "largest-connected triples",
                self.largest_connected_triples.to_string(),
            ),
            ("avg Steiner length", format!("{:.2}", self.avg_steiner_length)),
            (
                "avg largest-connected length",
                format!("{:.2}", self.avg_largest_connected_length),
            ),
        ];
        if let Some(largest) = &self.largest_record {
            pairs.push((
                "largest record",
                format!("{} ({} triples)", largest.key, largest.steiner_length),
            ));
        }
        output.push_str(&TableOutput::key_value(&pairs));

        if !self.top_predicates.is_empty() {
            output.push_str(&format!("\n{}\n", "Top predicates".cyan().bold()));
            let rows: Vec<Vec<String>> = self
                .top_predicates
                .iter()
                .map(|(p, n)| vec![p.clone(), n.to_string()])
                .collect();
            output.push_str(&TableOutput::rows(&["predicate", "count"], &rows));
        }
        output
    }
}

/// Run the inspect command
pub fn run(args: InspectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let results = read_artifact(&args.artifact)?;
    let report = InspectReport::from_results(&args.artifact, &results);
    Output::new(report, format).render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use evigraph_core::Triple;
    use evigraph_engine::RecordResult;

    fn results() -> BatchResults {
        let mut results = BatchResults::new();
        results.insert(
            "Q1".to_string(),
            RecordResult::new(
                vec![
                    Triple::new("A", "http://schema.org/memberOf", "B"),
                    Triple::new("B", "http://schema.org/memberOf", "C"),
                    Triple::new("X", "http://schema.org/knows", "Y"),
                ],
                vec![
                    Triple::new("A", "http://schema.org/memberOf", "B"),
                    Triple::new("B", "http://schema.org/memberOf", "C"),
                ],
            ),
        );
        results.insert("Q2".to_string(), RecordResult::default());
        results.insert(
            "Q3".to_string(),
            RecordResult::new(
                vec![Triple::new("D", "http://schema.org/knows", "E")],
                vec![Triple::new("D", "http://schema.org/knows", "E")],
            ),
        );
        results
    }

    #[test]
    fn test_report_statistics() {
        let report = InspectReport::from_results(Path::new("final_results.json"), &results());
        assert_eq!(report.records, 3);
        assert_eq!(report.empty_records, 1);
        assert_eq!(report.steiner_triples, 4);
        assert_eq!(report.largest_connected_triples, 3);
        assert!((report.avg_steiner_length - 4.0 / 3.0).abs() < 1e-9);
        assert!((report.avg_largest_connected_length - 1.0).abs() < 1e-9);
        assert_eq!(
            report.largest_record,
            Some(LargestRecord {
                key: "Q1".to_string(),
                steiner_length: 3,
            })
        );
        assert_eq!(
            report.top_predicates,
            vec![("knows".to_string(), 2), ("memberOf".to_string(), 2)]
        );
    }

    #[test]
    fn test_empty_artifact() {
        let report = InspectReport::from_results(Path::new("empty.json"), &BatchResults::new());
        assert_eq!(report.records, 0);
        assert_eq!(report.avg_steiner_length, 0.0);
        assert!(report.largest_record.is_none());
        assert!(report.top_predicates.is_empty());
    }

    #[test]
    fn test_run_missing_artifact() {
        let args = InspectArgs {
            artifact: PathBuf::from("/nonexistent/final_results.json"),
        };
        assert!(run(args, OutputFormat::Json).is_err());
    }
}
