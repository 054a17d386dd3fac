//! Table output formatting using the `tabled` crate

use tabled::{builder::Builder, settings::Style};

/// Table output formatter
pub struct TableOutput;

impl TableOutput {
    /// Rows under a header, rounded style.
    pub fn rows<H, R>(headers: &[H], rows: &[R]) -> String
    where
        H: AsRef<str>,
        R: AsRef<[String]>,
    {
        let mut builder = Builder::default();
        builder.push_record(headers.iter().map(|h| h.as_ref().to_string()));
        for row in rows {
            builder.push_record(row.as_ref().iter().cloned());
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        table.to_string()
    }

    /// Two-column key/value table without a header.
    pub fn key_value(pairs: &[(&str, String)]) -> String {
        let mut builder = Builder::default();
        for (key, value) in pairs {
            builder.push_record([key.to_string(), value.clone()]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_contain_cells() {
        let rows = vec![
            vec!["yago:Rome".to_string(), "3".to_string()],
            vec!["yago:Italy".to_string(), "7".to_string()],
        ];
        let table = TableOutput::rows(&["entity", "triples"], &rows);
        assert!(table.contains("entity"));
        assert!(table.contains("yago:Italy"));
        assert_eq!(table.lines().filter(|l| l.contains("yago:")).count(), 2);
    }

    #[test]
    fn test_key_value() {
        let table = TableOutput::key_value(&[("records", "10".to_string())]);
        assert!(table.contains("records"));
        assert!(table.contains("10"));
    }
}
