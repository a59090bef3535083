pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
mod cli_config;

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

/// `samples` re-exports the plotted samples as `Sample,LL,PL,PI`.
pub const SUPPORTED_OUTPUT_FORMATS: [&str; 3] = ["csv", "json", "samples"];
pub const SUPPORTED_INPUT_EXTENSIONS: [&str; 3] = ["csv", "tsv", "txt"];
pub const DEFAULT_BUNDLE_FILENAME: &str = "atterberg_chart.zip";
