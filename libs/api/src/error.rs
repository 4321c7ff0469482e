use crate::write::RejectedRecord;

/// Дескриптор колонки объявил не ровно один индикатор формы.
///
/// Ноль индикаторов или больше одного — нарушение контракта со стороны
/// движка запросов; декодер обязан вернуть ошибку, а не молча принять
/// колонку за скаляр.
#[derive(Debug, Clone, thiserror::Error)]
#[error("column type declares {indicators} shape indicators, expected exactly one")]
pub struct AmbiguousColumnType {
    pub indicators: usize,
}

/// Transport-level ошибка при обращении к time-series store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Запрос не дошёл или соединение оборвалось.
    #[error("store request: {0}")]
    Transport(String),

    /// Store ответил не-2xx статусом.
    #[error("store returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Тело ответа не распарсилось.
    #[error("store response parse: {0}")]
    Parse(String),
}

/// Исход одного write-вызова, различающий частичный и полный отказ.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// Store принял batch, но отклонил отдельные записи
    /// (вне retention window, дубликат и т.п.). Не фатально.
    #[error("{} record(s) rejected by store", .0.len())]
    Rejected(Vec<RejectedRecord>),

    /// Сам вызов не удался — batch целиком пропущен.
    #[error(transparent)]
    Transport(#[from] StoreError),
}

/// Ошибка реляционного источника.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source connection: {0}")]
    Connection(String),

    #[error("source query: {0}")]
    Query(String),

    /// Целочисленный код enum-колонки вне известного набора.
    #[error("unknown {column} code {code}")]
    UnknownCode { column: &'static str, code: i32 },
}
