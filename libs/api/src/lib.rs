pub mod error;
pub mod query;
pub mod ranking;
pub mod traits;
pub mod write;

pub use error::{AmbiguousColumnType, SourceError, StoreError, WriteError};
pub use query::{ColumnInfo, ColumnKind, ColumnType, Datum, QueryPage, QueryStatus, Row, TimeSeriesDataPoint};
pub use ranking::{CategoryRanking, RankingType, TargetDevice};
pub use traits::{QueryExecutor, RankingSource, RecordWriter};
pub use write::{Dimension, MeasureValueType, Record, RejectedRecord};

/// Текущее Unix-время в миллисекундах.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
