use std::sync::Arc;

use crate::config::Config;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use bandwatch_core::{PriceUpdateService, RetentionPolicy};
use bandwatch_market_data::{ThrottledProvider, YahooProvider};
use bandwatch_storage_sqlite::admin::AdminRepository;
use bandwatch_storage_sqlite::db;
use bandwatch_storage_sqlite::history::HistoryRepository;
use bandwatch_storage_sqlite::instruments::InstrumentRepository;

/// The fully wired update service: SQLite repositories underneath, a
/// throttled Yahoo provider on the network side.
pub type UpdateService = PriceUpdateService<
    InstrumentRepository,
    HistoryRepository,
    AdminRepository,
    ThrottledProvider<YahooProvider>,
>;

pub struct AppState {
    pub update_service: Arc<UpdateService>,
    pub history_repository: Arc<HistoryRepository>,
}

pub fn init_tracing() {
    let log_format = std::env::var("BANDWATCH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    // Keep DATABASE_URL aligned with the configured path so the storage
    // crate resolves the same file
    std::env::set_var("DATABASE_URL", &config.db_path);
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let instrument_repository = Arc::new(InstrumentRepository::new(pool.clone(), writer.clone()));
    let history_repository = Arc::new(HistoryRepository::new(pool.clone(), writer.clone()));
    let admin_repository = Arc::new(AdminRepository::new(pool.clone(), writer.clone()));

    let provider = Arc::new(ThrottledProvider::new(YahooProvider::new().await?));

    let update_service = Arc::new(PriceUpdateService::new(
        instrument_repository,
        history_repository.clone(),
        admin_repository,
        provider,
        RetentionPolicy::default(),
    ));

    Ok(AppState {
        update_service,
        history_repository,
    })
}
