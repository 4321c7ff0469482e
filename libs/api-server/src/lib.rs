use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use tokio_util::sync::CancellationToken;

use rankstream_api::traits::RecordWriter;
use rankstream_api::write::{Dimension, MeasureValueType, Record};
use rankstream_api::now_ms;
use rankstream_migration::Migrator;
use rankstream_query::QueryRunner;

/// Целевые имена в store + лимит select-all запроса.
#[derive(Clone)]
pub struct StoreTargets {
    pub database: String,
    pub table: String,
    pub dummy_table: String,
    pub select_limit: u32,
}

#[derive(Clone)]
struct AppState {
    runner: Arc<QueryRunner>,
    writer: Arc<dyn RecordWriter>,
    migrator: Arc<Migrator>,
    targets: StoreTargets,
}

/// HTTP trigger-поверхность миграционного сервиса.
///
/// Все три endpoint'а отвечают фиксированным `true` независимо от
/// внутреннего исхода: это операционные триггеры, результат читается
/// из лога и счётчиков, не из ответа.
pub async fn run(
    port: u16,
    runner: Arc<QueryRunner>,
    writer: Arc<dyn RecordWriter>,
    migrator: Arc<Migrator>,
    targets: StoreTargets,
    shutdown: CancellationToken,
) -> Result<(), String> {
    let state = AppState { runner, writer, migrator, targets };

    let app = Router::new()
        .route("/api/items", get(handle_items))
        .route("/api/dummy", post(handle_dummy))
        .route("/api/categories", get(handle_categories))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| format!("bind api :{port}: {e}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| format!("axum serve: {e}"))?;

    Ok(())
}

// --- REST: GET /api/items ---

async fn handle_items(State(state): State<AppState>) -> impl IntoResponse {
    // Текст запроса собирается на каждый вызов из текущей конфигурации,
    // не хранится в состоянии.
    let query = select_all_query(&state.targets);
    let rows = state.runner.run(&query).await;
    tracing::info!(rows, "items query triggered");
    axum::Json(true)
}

fn select_all_query(targets: &StoreTargets) -> String {
    format!(
        "SELECT * FROM \"{}\".\"{}\" LIMIT {}",
        targets.database, targets.table, targets.select_limit
    )
}

// --- REST: POST /api/dummy ---

async fn handle_dummy(State(state): State<AppState>) -> impl IntoResponse {
    let record = dummy_record(now_ms());
    match state
        .writer
        .write_records(&state.targets.database, &state.targets.dummy_table, vec![record])
        .await
    {
        Ok(()) => tracing::info!("dummy record written"),
        Err(e) => tracing::error!(error = %e, "dummy record write failed"),
    }
    axum::Json(true)
}

/// Синтетическая запись для проверки write-пути.
fn dummy_record(ts_ms: i64) -> Record {
    Record {
        dimensions: vec![
            Dimension::new("example_type_1", "dummy_1"),
            Dimension::new("example_type_2", "dummy_2"),
        ],
        measure_name: "dummy_measure".to_string(),
        measure_value: "1".to_string(),
        measure_value_type: MeasureValueType::Bigint,
        time: ts_ms.to_string(),
    }
}

// --- REST: GET /api/categories ---

async fn handle_categories(State(state): State<AppState>) -> impl IntoResponse {
    let stats = state.migrator.run().await;
    tracing::info!(
        tracks_migrated = stats.tracks_migrated,
        tracks_failed = stats.tracks_failed,
        "migration triggered over http"
    );
    axum::Json(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_all_query_is_built_from_config() {
        let targets = StoreTargets {
            database: "rankings".into(),
            table: "category_ranking".into(),
            dummy_table: "dummy".into(),
            select_limit: 100,
        };
        assert_eq!(
            select_all_query(&targets),
            "SELECT * FROM \"rankings\".\"category_ranking\" LIMIT 100"
        );
    }

    #[test]
    fn dummy_record_shape() {
        let record = dummy_record(1_617_373_620_000);
        assert_eq!(record.dimensions.len(), 2);
        assert_eq!(record.dimensions[0].name, "example_type_1");
        assert_eq!(record.measure_name, "dummy_measure");
        assert_eq!(record.measure_value, "1");
        assert_eq!(record.time, "1617373620000");
    }
}
