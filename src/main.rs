use api_etl_connector::config::{load_dotenv, LogConfig, RunConfig};
use api_etl_connector::utils::{logger, validation::Validate};
use api_etl_connector::{ApiPipeline, EtlEngine, HttpClient, LocalStorage, MongoStore, RetryPolicy};

const EXIT_INVALID_CONFIG: i32 = 1;
const EXIT_ABORTED: i32 = 3;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_path = load_dotenv();

    // 初始化日誌 (console + 檔案)，guard 需存活到行程結束
    let log_guard = logger::init_logger(&LogConfig::from_env())?;

    if let Some(path) = dotenv_path {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let config = RunConfig::from_env();
    tracing::info!(
        "Starting {} connector: {} endpoint(s) from {} into {}.{}",
        config.connector_name,
        config.api_endpoints.len(),
        config.api_base_url,
        config.db_name,
        config.collection_name
    );

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        drop(log_guard);
        std::process::exit(EXIT_INVALID_CONFIG);
    }

    let auth_headers = config.auth_headers()?;
    let client = HttpClient::new(RetryPolicy::default())?;
    let store = MongoStore::new(&config.db_uri, &config.db_name, &config.collection_name);
    let storage = LocalStorage::new(config.output_dir.clone());

    let pipeline = ApiPipeline::new(
        client,
        config.api_base_url.clone(),
        auth_headers,
        store,
        storage,
    );
    let engine = EtlEngine::new(pipeline);

    let summary = engine.run(&config.api_endpoints).await;

    if summary.aborted {
        eprintln!(
            "❌ Run aborted after {} endpoint(s); total inserted: {}",
            summary.endpoints.len(),
            summary.total_inserted
        );
        drop(log_guard);
        std::process::exit(EXIT_ABORTED);
    }

    println!("✅ Total inserted: {}", summary.total_inserted);
    drop(log_guard);
    Ok(())
}
