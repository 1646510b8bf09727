use std::sync::Arc;

use mirage_core::config::ServiceConfig;
use mirage_db::pg::PgRecordStore;
use mirage_filesync::FileSyncClient;
use mirage_scheduler::controller::SynthesisController;
use mirage_scheduler::poller::PollingScheduler;
use mirage_scheduler::probe::FfprobeDurationProbe;
use mirage_synth::speech::HttpSpeechApi;
use mirage_synth::video::HttpVideoApi;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mirage_worker=debug,mirage_scheduler=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServiceConfig::from_env();
    tracing::info!(
        video_api = %config.video_api_url,
        speech_api = %config.speech_api_url,
        dev_mode = config.dev_mode,
        "Loaded service configuration"
    );

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = mirage_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    mirage_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    mirage_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store = Arc::new(PgRecordStore::new(pool));

    // --- Remote services ---
    // One HTTP client shared across every remote call.
    let http = reqwest::Client::new();
    let video_api = Arc::new(HttpVideoApi::with_client(
        http.clone(),
        config.video_api_url.clone(),
    ));
    let speech_api = Arc::new(HttpSpeechApi::with_client(
        http.clone(),
        config.speech_api_url.clone(),
    ));
    let video_files = Arc::new(FileSyncClient::with_client(
        http.clone(),
        config.video_file_server_url.clone(),
    ));
    let speech_files = Arc::new(FileSyncClient::with_client(
        http,
        config.speech_file_server_url.clone(),
    ));

    // --- Pipeline ---
    let controller = Arc::new(SynthesisController::new(
        store.clone(),
        speech_api,
        video_api.clone(),
        speech_files,
        config.clone(),
    ));
    let scheduler = PollingScheduler::new(
        store,
        controller,
        video_api,
        video_files,
        Arc::new(FfprobeDurationProbe),
        config.work_dir.clone(),
        config.poll_interval,
    );

    let cancel = tokio_util::sync::CancellationToken::new();
    let loop_cancel = cancel.clone();
    let scheduler_handle = tokio::spawn(async move { scheduler.run(loop_cancel).await });
    tracing::info!(interval = ?config.poll_interval, "Polling scheduler started");

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install ctrl-c handler");
    tracing::info!("Shutdown signal received");

    cancel.cancel();
    let _ = scheduler_handle.await;
    tracing::info!("Worker stopped");
}
