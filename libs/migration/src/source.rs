use std::future::Future;
use std::pin::Pin;

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::mysql::{MySqlConnection, MySqlRow};
use sqlx::{Connection, Row as _};

use rankstream_api::error::SourceError;
use rankstream_api::ranking::{CategoryRanking, RankingType, TargetDevice};
use rankstream_api::traits::RankingSource;

use crate::config::SourceConfig;

// ════════════════════════════════════════════════════════════════
//  MySQL extractor
// ════════════════════════════════════════════════════════════════

/// Экстрактор рейтингов из MySQL.
///
/// Каждый вызов открывает собственное соединение и детерминированно
/// закрывает его на любом исходе (drop сокета — backstop). Состояния
/// между вызовами нет.
pub struct MySqlExtractor {
    config: SourceConfig,
    min_date: NaiveDateTime,
}

impl MySqlExtractor {
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let min_date = NaiveDate::parse_from_str(&config.min_date, "%Y-%m-%d")
            .map_err(|e| SourceError::Query(format!("min_date '{}': {e}", config.min_date)))
            .map(|date| date.and_hms_opt(0, 0, 0))?
            .ok_or_else(|| SourceError::Query(format!("min_date '{}'", config.min_date)))?;
        Ok(Self { config, min_date })
    }

    async fn connect(&self) -> Result<MySqlConnection, SourceError> {
        MySqlConnection::connect(&self.config.url)
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))
    }
}

impl RankingSource for MySqlExtractor {
    fn list_track_ids(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<i64>, SourceError>> + Send + '_>> {
        Box::pin(async move {
            let mut conn = self.connect().await?;
            let result = list_track_ids(&mut conn, &self.config).await;
            close(conn).await;
            result
        })
    }

    fn fetch_rankings(
        &self,
        track_id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CategoryRanking>, SourceError>> + Send + '_>> {
        Box::pin(async move {
            let mut conn = self.connect().await?;
            let result = fetch_rankings(&mut conn, &self.config, self.min_date, track_id).await;
            close(conn).await;
            result
        })
    }
}

async fn close(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "source connection close failed");
    }
}

/// Уникальные track id в фиксированном offset/limit окне.
async fn list_track_ids(
    conn: &mut MySqlConnection,
    config: &SourceConfig,
) -> Result<Vec<i64>, SourceError> {
    let rows = sqlx::query("SELECT DISTINCT track_id FROM category_ranking LIMIT ? OFFSET ?")
        .bind(config.key_limit)
        .bind(config.key_offset)
        .fetch_all(conn)
        .await
        .map_err(|e| SourceError::Query(e.to_string()))?;

    rows.iter()
        .map(|row| row.try_get::<i64, _>("track_id").map_err(|e| SourceError::Query(e.to_string())))
        .collect()
}

/// Все строки одного track id новее порога даты, не больше row cap.
async fn fetch_rankings(
    conn: &mut MySqlConnection,
    config: &SourceConfig,
    min_date: NaiveDateTime,
    track_id: i64,
) -> Result<Vec<CategoryRanking>, SourceError> {
    // `rank` — зарезервированное слово в MySQL 8.
    let rows = sqlx::query(
        "SELECT track_id, country_code, category_id, ranking_type, target_device, date, `rank` \
         FROM category_ranking \
         WHERE track_id = ? AND date > ? \
         LIMIT ?",
    )
    .bind(track_id)
    .bind(min_date)
    .bind(config.row_cap)
    .fetch_all(conn)
    .await
    .map_err(|e| SourceError::Query(e.to_string()))?;

    rows.iter().map(map_row).collect()
}

fn map_row(row: &MySqlRow) -> Result<CategoryRanking, SourceError> {
    let sql = |e: sqlx::Error| SourceError::Query(e.to_string());
    Ok(CategoryRanking {
        track_id: row.try_get("track_id").map_err(sql)?,
        country_code: row.try_get("country_code").map_err(sql)?,
        category_id: row.try_get("category_id").map_err(sql)?,
        ranking_type: RankingType::from_code(row.try_get("ranking_type").map_err(sql)?)?,
        target_device: TargetDevice::from_code(row.try_get("target_device").map_err(sql)?)?,
        date: row.try_get("date").map_err(sql)?,
        rank: row.try_get("rank").map_err(sql)?,
    })
}
