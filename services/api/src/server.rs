use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryLendingStore};
use crate::routes::with_lending_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_engine::config::AppConfig;
use credit_engine::error::AppError;
use credit_engine::lending::{CreditService, CsvSeedImporter};
use credit_engine::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(customers) = args.customers.take() {
        config.seed.customers_csv = Some(customers);
        config.seed.loans_csv = args.loans.take();
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryLendingStore::default());
    let credit_service = Arc::new(CreditService::new(store));

    if let Some(customers) = config.seed.customers_csv.as_ref() {
        let summary = CsvSeedImporter::new(credit_service.store().as_ref(), credit_service.policy())
            .from_paths(customers, config.seed.loans_csv.as_ref())?;
        info!(
            customers = summary.customers,
            skipped_customers = summary.skipped_customers,
            loans = summary.loans,
            skipped_loans = summary.skipped_loans,
            "store seeded from CSV exports"
        );
    }

    let app = with_lending_routes(credit_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "credit approval service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
