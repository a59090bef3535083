use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct ChartEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ChartEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting chart generation");

        // Extract
        let table = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} rows ({} columns)", table.len(), table.columns.len());

        // Transform
        let report = self.pipeline.transform(table).await?;
        tracing::info!(
            "🧮 Classified {} samples, rejected {}",
            report.metadata.plotted,
            report.metadata.rejected
        );
        for (zone, count) in report.chart.zone_counts() {
            tracing::debug!("   {}: {}", zone, count);
        }

        // Load
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("📁 Output saved to: {}", output_path);

        Ok(output_path)
    }
}
