use crate::adapters::table;
use crate::core::chart::build_chart;
use crate::core::{ChartReport, ConfigProvider, InputSource, Pipeline, RawTable, Storage};
use crate::utils::error::{ChartError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const CLASSIFIED_CSV: &str = "classified.csv";
pub const REJECTED_CSV: &str = "rejected.csv";
pub const CHART_JSON: &str = "chart.json";
pub const SAMPLES_CSV: &str = "samples.csv";

/// 讀取表格 → 分類 → 輸出 CSV/JSON（可選擇打包成 zip）
pub struct ChartPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    source: InputSource,
}

impl<S: Storage, C: ConfigProvider> ChartPipeline<S, C> {
    pub fn new(storage: S, config: C, source: InputSource) -> Self {
        Self {
            storage,
            config,
            source,
        }
    }

    fn output_file(&self, name: &str) -> String {
        format!("{}/{}", self.config.output_path().trim_end_matches('/'), name)
    }

    /// Files produced for the configured formats, in write order.
    fn render_outputs(&self, report: &ChartReport) -> Result<Vec<(&'static str, Vec<u8>)>> {
        let mut files = Vec::new();
        for format in self.config.output_formats() {
            match format.as_str() {
                "csv" => {
                    files.push((CLASSIFIED_CSV, table::write_classified_csv(&report.chart)?));
                    if !report.chart.rejected.is_empty() {
                        files.push((REJECTED_CSV, table::write_rejected_csv(&report.chart.rejected)?));
                    }
                }
                "json" => {
                    files.push((CHART_JSON, serde_json::to_vec_pretty(report)?));
                }
                "samples" => {
                    let samples = report.chart.points.iter().map(|p| &p.sample);
                    files.push((SAMPLES_CSV, table::write_samples_csv(samples)?));
                }
                other => {
                    tracing::warn!("Skipping unsupported output format: {}", other);
                }
            }
        }
        Ok(files)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ChartPipeline<S, C> {
    async fn extract(&self) -> Result<RawTable> {
        tracing::info!("📥 Reading samples from {}", self.source.describe());
        let table = match &self.source {
            InputSource::File(path) => {
                let bytes = self.storage.read_file(path).await?;
                table::read_delimited(&bytes, table::delimiter_for_path(path))?
            }
            InputSource::Paste(text) => table::parse_pasted_rows(text),
            InputSource::Demo => table::demo_table(),
        };
        Ok(table)
    }

    async fn transform(&self, table: RawTable) -> Result<ChartReport> {
        let options = self.config.chart_options();
        tracing::debug!(
            "Chart options: curve {:?}, anchor {:?}, method {:?}, max rows {:?}",
            options.curve_domain,
            options.anchor_domain,
            options.anchor_method,
            options.dataset.max_rows
        );

        let chart = build_chart(&table, &options)?;
        Ok(ChartReport::new(&self.source, chart))
    }

    async fn load(&self, report: ChartReport) -> Result<String> {
        // 依設定格式產生輸出內容
        let files = self.render_outputs(&report)?;
        if files.is_empty() {
            return Err(ChartError::ProcessingError {
                message: "no output produced for the configured formats".to_string(),
            });
        }
        tracing::debug!("Writing {} output files", files.len());

        // 打包成單一 ZIP 文件
        if let Some(bundle) = self.config.bundle_filename() {
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, data) in &files {
                    zip.start_file::<_, ()>(*name, FileOptions::default())?;
                    zip.write_all(data)?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            let bundle_path = self.output_file(bundle);
            tracing::debug!("Writing ZIP file ({} bytes) to {}", zip_data.len(), bundle_path);
            self.storage.write_file(&bundle_path, &zip_data).await?;
            return Ok(bundle_path);
        }

        // 個別寫入
        for (name, data) in &files {
            self.storage.write_file(&self.output_file(name), data).await?;
        }
        Ok(self.config.output_path().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chart::ChartOptions;
    use crate::core::dataset::DatasetOptions;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                ChartError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        output_path: String,
        output_formats: Vec<String>,
        bundle: Option<String>,
        max_rows: Option<usize>,
    }

    impl MockConfig {
        fn new(formats: &[&str]) -> Self {
            Self {
                output_path: "test_output".to_string(),
                output_formats: formats.iter().map(|f| f.to_string()).collect(),
                bundle: None,
                max_rows: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn chart_options(&self) -> ChartOptions {
            ChartOptions {
                dataset: DatasetOptions {
                    max_rows: self.max_rows,
                    ..DatasetOptions::default()
                },
                ..ChartOptions::default()
            }
        }

        fn bundle_filename(&self) -> Option<&str> {
            self.bundle.as_deref()
        }
    }

    #[tokio::test]
    async fn test_extract_from_stored_csv() {
        let storage = MockStorage::new();
        storage
            .put_file(
                "borings.csv",
                b"Boring Name,LL (Liquid Limit),PL (Plastic Limit)\nB-1,47,25\n",
            )
            .await;
        let pipeline = ChartPipeline::new(
            storage,
            MockConfig::new(&["csv"]),
            InputSource::File("borings.csv".to_string()),
        );

        let table = pipeline.extract().await.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.columns[0], "Boring Name");
    }

    #[tokio::test]
    async fn test_extract_missing_file_fails() {
        let pipeline = ChartPipeline::new(
            MockStorage::new(),
            MockConfig::new(&["csv"]),
            InputSource::File("nope.csv".to_string()),
        );
        assert!(matches!(
            pipeline.extract().await,
            Err(ChartError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn test_transform_demo_dataset() {
        let pipeline = ChartPipeline::new(
            MockStorage::new(),
            MockConfig::new(&["csv"]),
            InputSource::Demo,
        );
        let table = pipeline.extract().await.unwrap();
        let report = pipeline.transform(table).await.unwrap();

        assert_eq!(report.metadata.plotted, 15);
        assert_eq!(report.metadata.rejected, 0);
        assert_eq!(report.metadata.source, "demo");
        assert_eq!(report.chart.points[0].sample.id, "B-1");
    }

    #[tokio::test]
    async fn test_transform_pasted_rows_respects_row_cap() {
        let mut config = MockConfig::new(&["csv"]);
        config.max_rows = Some(2);
        let pasted = "B-1\t47\t25\nB-2\t47\t26\nB-3\t53\t20\n".to_string();
        let pipeline = ChartPipeline::new(MockStorage::new(), config, InputSource::Paste(pasted));

        let table = pipeline.extract().await.unwrap();
        let report = pipeline.transform(table).await.unwrap();
        assert_eq!(report.metadata.plotted, 2);
        assert_eq!(report.chart.rejected[0].sample, "B-3");
    }

    #[tokio::test]
    async fn test_load_writes_csv_and_json() {
        let storage = MockStorage::new();
        let pipeline = ChartPipeline::new(
            storage.clone(),
            MockConfig::new(&["csv", "json"]),
            InputSource::Paste("B-1\t47\t25\nX\t40\t45".to_string()),
        );

        let table = pipeline.extract().await.unwrap();
        let report = pipeline.transform(table).await.unwrap();
        let output = pipeline.load(report).await.unwrap();
        assert_eq!(output, "test_output");

        let classified = storage.get_file("test_output/classified.csv").await.unwrap();
        let text = String::from_utf8(classified).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Sample,LL,PL,PI,Zone,ColorIndex,AboveULine");
        assert_eq!(lines[1], "B-1,47.0,25.0,22.0,CL,0,false");

        let rejected = storage.get_file("test_output/rejected.csv").await.unwrap();
        let text = String::from_utf8(rejected).unwrap();
        assert!(text.starts_with("Row,Sample,Reason\n2,X,"));

        let json = storage.get_file("test_output/chart.json").await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["chart"]["points"][0]["zone"], "CL");
        assert_eq!(value["chart"]["geometry"]["vertical_ll"], 50.0);
        assert_eq!(value["metadata"]["rejected"], 1);
    }

    #[tokio::test]
    async fn test_load_without_rejections_skips_rejected_csv() {
        let storage = MockStorage::new();
        let pipeline = ChartPipeline::new(
            storage.clone(),
            MockConfig::new(&["csv"]),
            InputSource::Demo,
        );
        let table = pipeline.extract().await.unwrap();
        let report = pipeline.transform(table).await.unwrap();
        pipeline.load(report).await.unwrap();

        assert!(storage.get_file("test_output/classified.csv").await.is_some());
        assert!(storage.get_file("test_output/rejected.csv").await.is_none());
        assert!(storage.get_file("test_output/chart.json").await.is_none());
    }

    #[tokio::test]
    async fn test_load_samples_format() {
        let storage = MockStorage::new();
        let pipeline = ChartPipeline::new(
            storage.clone(),
            MockConfig::new(&["samples"]),
            InputSource::Paste("B-1\t47\t25\nX\t40\t45".to_string()),
        );
        let table = pipeline.extract().await.unwrap();
        let report = pipeline.transform(table).await.unwrap();
        pipeline.load(report).await.unwrap();

        let samples = storage.get_file("test_output/samples.csv").await.unwrap();
        assert_eq!(
            String::from_utf8(samples).unwrap(),
            "Sample,LL,PL,PI\nB-1,47.0,25.0,22.0\n"
        );
    }

    #[tokio::test]
    async fn test_load_bundles_into_zip() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new(&["csv", "json"]);
        config.bundle = Some("chart.zip".to_string());
        let pipeline = ChartPipeline::new(storage.clone(), config, InputSource::Demo);

        let table = pipeline.extract().await.unwrap();
        let report = pipeline.transform(table).await.unwrap();
        let output = pipeline.load(report).await.unwrap();
        assert_eq!(output, "test_output/chart.zip");

        let zip_bytes = storage.get_file("test_output/chart.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_bytes)).unwrap();
        let mut names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["chart.json", "classified.csv"]);
        assert!(storage.get_file("test_output/classified.csv").await.is_none());
    }

    #[tokio::test]
    async fn test_load_with_no_known_format_fails() {
        let pipeline = ChartPipeline::new(
            MockStorage::new(),
            MockConfig::new(&["png"]),
            InputSource::Demo,
        );
        let table = pipeline.extract().await.unwrap();
        let report = pipeline.transform(table).await.unwrap();
        assert!(matches!(
            pipeline.load(report).await,
            Err(ChartError::ProcessingError { .. })
        ));
    }
}
