use super::{DEFAULT_BUNDLE_FILENAME, SUPPORTED_INPUT_EXTENSIONS, SUPPORTED_OUTPUT_FORMATS};
use crate::core::chart::ChartOptions;
use crate::core::dataset::{DatasetOptions, MANUAL_ENTRY_MAX_ROWS};
use crate::core::geometry::AnchorMethod;
use crate::core::{ConfigProvider, InputSource};
use crate::utils::error::{ChartError, Result};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "atterberg-chart")]
#[command(about = "Classify soil samples on the Atterberg Limits (plasticity) chart")]
pub struct CliConfig {
    /// CSV/TSV file with Sample, LL and PL columns
    #[arg(short, long, conflicts_with_all = ["paste", "demo"])]
    pub input: Option<String>,

    /// Read tab-separated Sample/LL/PL rows from stdin
    #[arg(long, conflicts_with = "demo")]
    pub paste: bool,

    /// Use the built-in example borings
    #[arg(long)]
    pub demo: bool,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "csv,json")]
    pub output_formats: Vec<String>,

    /// Bundle all outputs into a single zip archive
    #[arg(long)]
    pub bundle: bool,

    /// Maximum number of rows accepted (20 by default for pasted input)
    #[arg(long)]
    pub max_rows: Option<usize>,

    /// How the A-line crossings at PI 4 and 7.3 are located
    #[arg(long, default_value = "sampled")]
    pub anchor_method: AnchorMethod,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Paste text is supplied by the caller, since reading stdin is the binary's job.
    pub fn input_source(&self, pasted: Option<String>) -> Result<InputSource> {
        if let Some(path) = &self.input {
            return Ok(InputSource::File(path.clone()));
        }
        if self.paste {
            return pasted
                .map(InputSource::Paste)
                .ok_or_else(|| ChartError::MissingConfigError {
                    field: "paste".to_string(),
                });
        }
        if self.demo {
            return Ok(InputSource::Demo);
        }
        Err(ChartError::MissingConfigError {
            field: "input".to_string(),
        })
    }

    fn effective_max_rows(&self) -> Option<usize> {
        match self.max_rows {
            Some(rows) => Some(rows),
            None if self.paste => Some(MANUAL_ENTRY_MAX_ROWS),
            None => None,
        }
    }
}

impl ConfigProvider for CliConfig {
    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            anchor_method: self.anchor_method,
            dataset: DatasetOptions {
                max_rows: self.effective_max_rows(),
                ..DatasetOptions::default()
            },
            ..ChartOptions::default()
        }
    }

    fn bundle_filename(&self) -> Option<&str> {
        self.bundle.then_some(DEFAULT_BUNDLE_FILENAME)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.input.is_none() && !self.paste && !self.demo {
            return Err(ChartError::MissingConfigError {
                field: "input (or --paste / --demo)".to_string(),
            });
        }
        if let Some(input) = &self.input {
            validation::validate_path("input", input)?;
            validation::validate_file_extensions(
                "input",
                std::slice::from_ref(input),
                &SUPPORTED_INPUT_EXTENSIONS,
            )?;
        }
        validation::validate_path("output_path", &self.output_path)?;
        for format in &self.output_formats {
            validation::validate_one_of("output_formats", format, &SUPPORTED_OUTPUT_FORMATS)?;
        }
        self.chart_options().validate()
    }
}
