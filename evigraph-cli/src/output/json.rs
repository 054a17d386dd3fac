//! JSON output formatting

use super::OutputConfig;
use serde::Serialize;

/// JSON output formatter
pub struct JsonOutput;

impl JsonOutput {
    /// Pretty-printed by default, single line in compact mode.
    pub fn format<T: Serialize>(data: &T, config: &OutputConfig) -> anyhow::Result<String> {
        let text = if config.compact {
            serde_json::to_string(data)?
        } else {
            serde_json::to_string_pretty(data)?
        };
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    #[test]
    fn test_pretty_and_compact() {
        let data = serde_json::json!({"a": [1, 2]});
        let pretty = JsonOutput::format(&data, &OutputConfig::new(OutputFormat::Json)).unwrap();
        assert!(pretty.contains('\n'));

        let config = OutputConfig {
            compact: true,
            ..OutputConfig::new(OutputFormat::Json)
        };
        let compact = JsonOutput::format(&data, &config).unwrap();
        assert_eq!(compact, r#"{"a":[1,2]}"#);
    }
}
