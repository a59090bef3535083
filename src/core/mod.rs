pub mod boundary;
pub mod chart;
pub mod classifier;
pub mod dataset;
pub mod engine;
pub mod geometry;

pub use crate::domain::model::{ChartReport, InputSource, RawTable, Record, Sample, Zone};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
