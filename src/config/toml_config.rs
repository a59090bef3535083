use super::{DEFAULT_BUNDLE_FILENAME, SUPPORTED_INPUT_EXTENSIONS, SUPPORTED_OUTPUT_FORMATS};
use crate::core::boundary::{SamplingDomain, DEFAULT_CURVE_DOMAIN};
use crate::core::chart::ChartOptions;
use crate::core::dataset::DatasetOptions;
use crate::core::geometry::{AnchorMethod, DEFAULT_ANCHOR_DOMAIN};
use crate::core::{ConfigProvider, InputSource};
use crate::utils::error::{ChartError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub project: Option<ProjectConfig>,
    pub input: InputConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: Option<String>,
    pub demo: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartConfig {
    pub anchor_method: Option<AnchorMethod>,
    pub curve_domain: Option<SamplingDomain>,
    pub anchor_domain: Option<SamplingDomain>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub max_rows: Option<usize>,
    /// 額外欄位別名，例如 "Liquid Limit" = "LL"
    pub aliases: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub verbose: Option<bool>,
    pub log_json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ChartError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ChartError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ChartError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn input_source(&self) -> Result<InputSource> {
        match (&self.input.path, self.input.demo.unwrap_or(false)) {
            (Some(path), false) => Ok(InputSource::File(path.clone())),
            (None, true) => Ok(InputSource::Demo),
            (Some(_), true) => Err(ChartError::ConfigValidationError {
                field: "input".to_string(),
                message: "set either input.path or input.demo, not both".to_string(),
            }),
            (None, false) => Err(ChartError::MissingConfigError {
                field: "input.path".to_string(),
            }),
        }
    }

    pub fn verbose(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.verbose)
            .unwrap_or(false)
    }

    pub fn log_json(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_json)
            .unwrap_or(false)
    }

    pub fn project_name(&self) -> &str {
        self.project
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("atterberg-chart")
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if let Some(project) = &self.project {
            validation::validate_non_empty_string("project.name", &project.name)?;
        }

        if let InputSource::File(path) = self.input_source()? {
            validation::validate_path("input.path", &path)?;
            validation::validate_file_extensions(
                "input.path",
                std::slice::from_ref(&path),
                &SUPPORTED_INPUT_EXTENSIONS,
            )?;
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        if self.load.output_formats.is_empty() {
            return Err(ChartError::ConfigValidationError {
                field: "load.output_formats".to_string(),
                message: "at least one output format is required".to_string(),
            });
        }
        for format in &self.load.output_formats {
            validation::validate_one_of("load.output_formats", format, &SUPPORTED_OUTPUT_FORMATS)?;
        }

        if let Some(compression) = self.load.compression.as_ref().filter(|c| c.enabled) {
            if let Some(filename) = &compression.filename {
                validation::validate_file_extensions(
                    "load.compression.filename",
                    std::slice::from_ref(filename),
                    &["zip"],
                )?;
            }
        }

        if let Some(max_rows) = self.dataset.max_rows {
            validation::validate_range("dataset.max_rows", max_rows, 1, 100_000)?;
        }
        if let Some(aliases) = &self.dataset.aliases {
            for (alias, target) in aliases {
                validation::validate_non_empty_string("dataset.aliases", alias)?;
                validation::validate_one_of("dataset.aliases", target, &["Sample", "LL", "PL"])?;
            }
        }

        self.chart_options().validate()
    }
}

impl ConfigProvider for TomlConfig {
    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn chart_options(&self) -> ChartOptions {
        ChartOptions {
            curve_domain: self.chart.curve_domain.unwrap_or(DEFAULT_CURVE_DOMAIN),
            anchor_domain: self.chart.anchor_domain.unwrap_or(DEFAULT_ANCHOR_DOMAIN),
            anchor_method: self.chart.anchor_method.unwrap_or_default(),
            dataset: DatasetOptions {
                max_rows: self.dataset.max_rows,
                extra_aliases: self.dataset.aliases.clone().unwrap_or_default(),
            },
        }
    }

    fn bundle_filename(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_deref().unwrap_or(DEFAULT_BUNDLE_FILENAME))
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
