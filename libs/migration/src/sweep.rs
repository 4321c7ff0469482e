use std::sync::Arc;

use rankstream_api::traits::RankingSource;

use crate::batch::{BatchWriter, WriteStats};

// ════════════════════════════════════════════════════════════════
//  Migration sweep
// ════════════════════════════════════════════════════════════════

/// Агрегированные счётчики одного прогона миграции.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationStats {
    pub tracks_migrated: u64,
    pub tracks_empty: u64,
    pub tracks_failed: u64,
    pub write: WriteStats,
}

/// Последовательный проход по всем partition keys источника:
/// fetch → batch write на каждый ключ.
///
/// Изоляция на границе ключа: любой отказ одного ключа логируется,
/// считается и никогда не прерывает остальную миграцию.
pub struct Migrator {
    source: Arc<dyn RankingSource>,
    writer: BatchWriter,
    chunk_size: usize,
}

impl Migrator {
    pub fn new(source: Arc<dyn RankingSource>, writer: BatchWriter, chunk_size: usize) -> Self {
        Self { source, writer, chunk_size }
    }

    pub async fn run(&self) -> MigrationStats {
        let mut stats = MigrationStats::default();

        let track_ids = match self.source.list_track_ids().await {
            Ok(ids) => ids,
            Err(e) => {
                // Недоступный источник — пустая выборка, не ошибка наружу.
                tracing::error!(error = %e, "listing track ids failed, nothing to migrate");
                return stats;
            }
        };
        tracing::info!(tracks = track_ids.len(), "migration sweep started");

        for track_id in track_ids {
            match self.source.fetch_rankings(track_id).await {
                Ok(rankings) if rankings.is_empty() => {
                    tracing::debug!(track_id, "no rankings, skipping");
                    stats.tracks_empty += 1;
                }
                Ok(rankings) => {
                    tracing::info!(track_id, count = rankings.len(), "migrating track");
                    stats.write.merge(self.writer.write(&rankings, self.chunk_size).await);
                    stats.tracks_migrated += 1;
                }
                Err(e) => {
                    tracing::error!(track_id, error = %e, "track failed, continuing sweep");
                    stats.tracks_failed += 1;
                }
            }
        }

        tracing::info!(
            tracks_migrated = stats.tracks_migrated,
            tracks_empty = stats.tracks_empty,
            tracks_failed = stats.tracks_failed,
            chunks_written = stats.write.chunks_written,
            chunks_failed = stats.write.chunks_failed,
            records_written = stats.write.records_written,
            records_rejected = stats.write.records_rejected,
            "migration sweep finished"
        );
        stats
    }
}
