use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use rankstream_api::traits::{QueryExecutor, RankingSource, RecordWriter};
use rankstream_api_server::StoreTargets;
use rankstream_migration::{BatchWriter, Migrator, MySqlExtractor};
use rankstream_query::QueryRunner;
use rankstream_store::StoreClient;

use crate::config::{ServeArgs, ServerConfig};
use crate::error::ServerError;

pub async fn run(args: ServeArgs) -> Result<(), ServerError> {
    tracing::info!("rankstream-server starting");

    // --- Load config ---
    let config = ServerConfig::load(&args.config)?;
    tracing::info!(config = %args.config, "loaded config");

    // --- CancellationToken for graceful shutdown ---
    let token = CancellationToken::new();

    // --- Store client (query + write стороны одного клиента) ---
    let store = Arc::new(StoreClient::new(&config.store.endpoint)?);
    let runner = Arc::new(QueryRunner::new(store.clone() as Arc<dyn QueryExecutor>));

    // --- Source extractor ---
    let extractor = Arc::new(MySqlExtractor::new(config.source.clone())?);

    // --- Migrator ---
    let batch = BatchWriter::new(
        store.clone() as Arc<dyn RecordWriter>,
        config.store.database.clone(),
        config.store.table.clone(),
    );
    let migrator = Arc::new(Migrator::new(
        extractor.clone() as Arc<dyn RankingSource>,
        batch,
        config.chunk_size,
    ));

    let targets = StoreTargets {
        database: config.store.database.clone(),
        table: config.store.table.clone(),
        dummy_table: config.store.dummy_table.clone(),
        select_limit: config.select_limit,
    };

    // --- API server ---
    let api_port = config.api_port;
    let api_token = token.clone();
    let api_writer = store.clone() as Arc<dyn RecordWriter>;
    let api_handle = tokio::spawn(async move {
        if let Err(e) =
            rankstream_api_server::run(api_port, runner, api_writer, migrator, targets, api_token).await
        {
            tracing::error!(error = %e, "api server error");
        }
    });

    tracing::info!(port = config.api_port, "api server listening");
    tracing::info!("server ready");

    // --- Ожидание Ctrl+C ---
    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down...");

    token.cancel();
    let _ = api_handle.await;

    tracing::info!("shutdown complete");
    Ok(())
}
