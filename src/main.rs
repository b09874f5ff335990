use clap::Parser;
use heart_predictor::adapters::http;
use heart_predictor::core::ServiceSettings;
use heart_predictor::utils::{logger, validation::Validate};
use heart_predictor::{CliConfig, LocalArtifactStore, ModelLoader, PredictionService, PredictorError};
use std::sync::Arc;

fn fail(e: &PredictorError) -> ! {
    tracing::error!(
        "❌ Startup failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger(&config.log_level);
    } else {
        logger::init_cli_logger(&config.log_level);
    }

    tracing::info!(
        "Starting heart-predictor on {}:{} with model {}",
        config.host(),
        config.port(),
        config.model_path()
    );
    tracing::debug!("Server config: {:?}", config);

    if let Err(e) = config.validate() {
        fail(&e);
    }

    // 模型載入失敗時不啟動服務
    let loader = ModelLoader::new(LocalArtifactStore::current_dir());
    let model = match loader.load(config.model_path()).await {
        Ok(model) => model,
        Err(e) => fail(&e),
    };

    let addr = match config.socket_addr() {
        Ok(addr) => addr,
        Err(e) => fail(&e),
    };

    let service = Arc::new(PredictionService::new(model));
    http::serve(service, addr).await?;

    Ok(())
}
