pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::chart_pipeline::ChartPipeline;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::chart::{build_chart, ChartModel, ChartOptions};
pub use core::engine::ChartEngine;
pub use core::geometry::{AnchorMethod, ZoneGeometry};
pub use domain::model::{ChartReport, InputSource, Sample, Zone};
pub use utils::error::{ChartError, Result};
