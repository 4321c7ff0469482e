use std::future::Future;
use std::pin::Pin;

use crate::error::{SourceError, StoreError, WriteError};
use crate::query::QueryPage;
use crate::ranking::CategoryRanking;
use crate::write::Record;

/// Query-сторона time-series store: одна страница за вызов.
///
/// Текст запроса — явный параметр каждого вызова, не состояние
/// конструктора: конфигурация может меняться между вызовами.
pub trait QueryExecutor: Send + Sync {
    /// Выполнить запрос / продолжить пагинацию по `next_token`.
    fn query_page<'a>(
        &'a self,
        query: &'a str,
        next_token: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<QueryPage, StoreError>> + Send + 'a>>;
}

/// Write-сторона time-series store: один batch за вызов.
pub trait RecordWriter: Send + Sync {
    /// Отправить batch записей в `database`.`table`.
    ///
    /// Частичный отказ (store принял вызов, но отклонил отдельные
    /// записи) приходит как [`WriteError::Rejected`] с причинами.
    fn write_records<'a>(
        &'a self,
        database: &'a str,
        table: &'a str,
        records: Vec<Record>,
    ) -> Pin<Box<dyn Future<Output = Result<(), WriteError>> + Send + 'a>>;
}

/// Реляционный источник рейтингов.
pub trait RankingSource: Send + Sync {
    /// Уникальные partition keys (track id) в пределах настроенного
    /// offset/limit окна.
    fn list_track_ids(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<i64>, SourceError>> + Send + '_>>;

    /// Все строки одного track id с настроенным нижним порогом даты
    /// и row cap.
    fn fetch_rankings(
        &self,
        track_id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<CategoryRanking>, SourceError>> + Send + '_>>;
}
