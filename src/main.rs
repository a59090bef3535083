use atterberg_chart::utils::error::{ChartError, ErrorSeverity};
use atterberg_chart::utils::{logger, validation::Validate};
use atterberg_chart::{ChartEngine, ChartPipeline, CliConfig, LocalStorage};
use clap::Parser;
use tokio::io::AsyncReadExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting atterberg-chart CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let pasted = if config.paste {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        Some(text)
    } else {
        None
    };

    let source = match config.input_source(pasted) {
        Ok(source) => source,
        Err(e) => exit_with(e),
    };

    let storage = LocalStorage::default();
    let pipeline = ChartPipeline::new(storage, config, source);
    let engine = ChartEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Chart data generated successfully!");
            println!("✅ Chart data generated successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn exit_with(e: ChartError) -> ! {
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
    std::process::exit(exit_code)
}
