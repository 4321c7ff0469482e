use std::sync::Arc;

use rankstream_api::error::WriteError;
use rankstream_api::ranking::CategoryRanking;
use rankstream_api::traits::RecordWriter;
use rankstream_api::write::Record;

// ════════════════════════════════════════════════════════════════
//  Batch writer
// ════════════════════════════════════════════════════════════════

/// Счётчики одного write-прохода. Внутренняя наблюдаемость: наружу
/// по-прежнему уходит только acknowledgement, но orchestrator
/// агрегирует эти числа вместо выбрасывания деталей.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub chunks_written: u64,
    pub chunks_failed: u64,
    pub records_written: u64,
    pub records_rejected: u64,
}

impl WriteStats {
    pub fn merge(&mut self, other: WriteStats) {
        self.chunks_written += other.chunks_written;
        self.chunks_failed += other.chunks_failed;
        self.records_written += other.records_written;
        self.records_rejected += other.records_rejected;
    }
}

/// Режет список записей на последовательные chunks фиксированного
/// размера и отправляет каждый одним вызовом store.
///
/// Политика: ровно одна попытка на chunk. Частичный reject — лог
/// каждой отклонённой записи, не фатально. Транспортный отказ —
/// chunk пропущен, внешний цикл продолжается.
pub struct BatchWriter {
    writer: Arc<dyn RecordWriter>,
    database: String,
    table: String,
}

impl BatchWriter {
    pub fn new(writer: Arc<dyn RecordWriter>, database: impl Into<String>, table: impl Into<String>) -> Self {
        Self { writer, database: database.into(), table: table.into() }
    }

    /// Отправить `rankings` chunks'ами не больше `chunk_size`
    /// (последний может быть короче, порядок сохраняется).
    pub async fn write(&self, rankings: &[CategoryRanking], chunk_size: usize) -> WriteStats {
        // chunks(0) паникует.
        let chunk_size = chunk_size.max(1);
        let mut stats = WriteStats::default();

        for chunk in rankings.chunks(chunk_size) {
            let records: Vec<Record> = chunk.iter().map(CategoryRanking::to_record).collect();
            let submitted = records.len() as u64;

            match self.writer.write_records(&self.database, &self.table, records).await {
                Ok(()) => {
                    stats.chunks_written += 1;
                    stats.records_written += submitted;
                }
                Err(WriteError::Rejected(rejected)) => {
                    for record in &rejected {
                        tracing::warn!(
                            record_index = record.record_index,
                            reason = %record.reason,
                            "record rejected by store"
                        );
                    }
                    // Остальные записи chunk'а считаются принятыми.
                    stats.chunks_written += 1;
                    stats.records_rejected += rejected.len() as u64;
                    stats.records_written += submitted.saturating_sub(rejected.len() as u64);
                }
                Err(WriteError::Transport(e)) => {
                    tracing::error!(error = %e, size = submitted, "chunk write failed, skipping chunk");
                    stats.chunks_failed += 1;
                }
            }
        }
        stats
    }
}
