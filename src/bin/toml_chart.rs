use atterberg_chart::core::{ConfigProvider, InputSource, Pipeline};
use atterberg_chart::utils::error::ErrorSeverity;
use atterberg_chart::utils::{logger, validation::Validate};
use atterberg_chart::{ChartEngine, ChartPipeline, LocalStorage, TomlConfig};
use anyhow::Context;
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-chart")]
#[command(about = "Atterberg chart classifier driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "atterberg-chart.toml")]
    config: String,

    /// Override input.path from config
    #[arg(short, long)]
    input: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Classify and report without writing any output
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    let verbose = args.verbose || config.verbose();
    if config.log_json() {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("🚀 Starting TOML-based chart tool");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(input) = args.input {
        tracing::info!("🔧 Input overridden to: {}", input);
        config.input.path = Some(input);
        config.input.demo = None;
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let source = config.input_source()?;
    display_config_summary(&config, &source, args.dry_run);

    let pipeline = ChartPipeline::new(LocalStorage::default(), config, source);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        perform_dry_run(&pipeline).await?;
        return Ok(());
    }

    let engine = ChartEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Chart data generated successfully!");
            println!("✅ Chart data generated successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Chart generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, source: &InputSource, dry_run: bool) {
    let options = config.chart_options();

    println!("📋 Configuration Summary:");
    println!("  Project: {}", config.project_name());
    println!("  Input: {}", source.describe());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!("  Anchor method: {:?}", options.anchor_method);

    if let Some(max_rows) = options.dataset.max_rows {
        println!("  Max rows: {}", max_rows);
    }
    if let Some(bundle) = config.bundle_filename() {
        println!("  Bundle: {} (ZIP)", bundle);
    }
    if dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run<P: Pipeline>(pipeline: &P) -> anyhow::Result<()> {
    let table = pipeline.extract().await.context("reading samples")?;
    let report = pipeline
        .transform(table)
        .await
        .context("classifying samples")?;

    println!("🔍 Dry Run Analysis:");
    println!("  Plotted samples: {}", report.metadata.plotted);
    for (zone, count) in report.chart.zone_counts() {
        println!("    {}: {}", zone, count);
    }
    for rejected in &report.chart.rejected {
        println!(
            "  ⚠️ Row {} ({}) skipped: {}",
            rejected.row, rejected.sample, rejected.reason
        );
    }
    Ok(())
}
