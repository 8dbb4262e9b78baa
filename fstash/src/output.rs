//! Output formatting for CLI commands.
//!
//! Provides abstraction layer for outputting results in text or JSON format.

use anyhow::Result;
use fstash_core::CopyStats;
use serde::Serialize;
use std::io::{self, Write};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writer for command output with format abstraction.
pub struct OutputWriter {
    format: OutputFormat,
    stdout: io::Stdout,
}

impl OutputWriter {
    /// Create a new OutputWriter.
    pub fn new(json: bool) -> Self {
        Self {
            format: if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            stdout: io::stdout(),
        }
    }

    /// Write output using the configured format.
    ///
    /// The `text_fn` closure is called only in text mode to generate the
    /// human-readable output.
    pub fn write<T: Serialize>(&self, data: &T, text_fn: impl FnOnce() -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(data)?;
                writeln!(&self.stdout, "{}", json)?;
            }
            OutputFormat::Text => {
                let text = text_fn();
                if !text.is_empty() {
                    write!(&self.stdout, "{}", text)?;
                }
            }
        }
        Ok(())
    }

    /// Write an error message to stderr.
    ///
    /// In JSON mode, writes a JSON error object with success=false.
    pub fn write_error(&self, error: &anyhow::Error, result_code: u8) {
        match self.format {
            OutputFormat::Json => {
                let error_output = ErrorOutput {
                    success: false,
                    result_code,
                    error: format!("{:#}", error),
                };
                if let Ok(json) = serde_json::to_string_pretty(&error_output) {
                    let _ = writeln!(io::stderr(), "{}", json);
                }
            }
            OutputFormat::Text => {
                let _ = writeln!(io::stderr(), "Error: {:#}", error);
            }
        }
    }
}

// ============================================================================
// Data Transfer Objects (DTOs) for JSON output
// ============================================================================

/// Error output structure.
#[derive(Debug, Serialize)]
pub struct ErrorOutput {
    pub success: bool,
    pub result_code: u8,
    pub error: String,
}

/// Output for `create` command.
#[derive(Debug, Serialize)]
pub struct CreateOutput {
    pub success: bool,
    pub result_code: u8,
    pub name: String,
    pub source: String,
    pub path: String,
    #[serde(flatten)]
    pub stats: CopyStats,
}

/// Output for `expand` command.
#[derive(Debug, Serialize)]
pub struct ExpandOutput {
    pub success: bool,
    pub result_code: u8,
    pub name: String,
    pub destination: String,
    #[serde(flatten)]
    pub stats: CopyStats,
}

/// Output for `delete` command.
#[derive(Debug, Serialize)]
pub struct DeleteOutput {
    pub success: bool,
    pub result_code: u8,
    pub name: String,
    pub removed: bool,
}

/// Output for `list` command.
#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub success: bool,
    pub result_code: u8,
    pub depth: usize,
    pub names: Vec<String>,
}

/// Output for `path` command.
#[derive(Debug, Serialize)]
pub struct PathOutput {
    pub success: bool,
    pub result_code: u8,
    pub name: String,
    pub path: String,
    pub exists: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_output_flattens_stats() {
        let output = CreateOutput {
            success: true,
            result_code: 0,
            name: "proj".into(),
            source: ".".into(),
            path: "/h/B0/45/3F/18/proj".into(),
            stats: CopyStats {
                dirs: 2,
                files: 3,
                bytes: 42,
                rendered: 0,
            },
        };

        let json: serde_json::Value = serde_json::to_value(&output).unwrap();
        assert_eq!(json["files"], 3);
        assert_eq!(json["bytes"], 42);
        assert_eq!(json["name"], "proj");
        assert!(json.get("stats").is_none());
    }

    #[test]
    fn test_error_output_shape() {
        let output = ErrorOutput {
            success: false,
            result_code: 4,
            error: "Stash does not exist: ghost".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&output).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["result_code"], 4);
    }
}
