use std::sync::Arc;

use rankstream_api::query::QueryStatus;
use rankstream_api::traits::QueryExecutor;

use crate::decoder::decode_row;

const ONE_GIB: f64 = 1_073_741_824.0;

/// Прогоняет запрос по страницам и рендерит результат в лог.
///
/// Политика best-effort: ошибка fetch'а или декодирования логируется
/// и досрочно завершает прогон (оставшиеся страницы не запрашиваются),
/// наружу структурная ошибка не отдаётся. Уже отрендеренные строки
/// не откатываются.
pub struct QueryRunner {
    executor: Arc<dyn QueryExecutor>,
}

impl QueryRunner {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Выполнить запрос: страницы forward-only, страница N декодируется
    /// до запроса страницы N+1. Возвращает число отрендеренных строк
    /// (внутренняя наблюдаемость, не контракт).
    pub async fn run(&self, query: &str) -> u64 {
        let mut next_token: Option<String> = None;
        let mut pages = 0u64;
        let mut rows_rendered = 0u64;

        loop {
            let page = match self.executor.query_page(query, next_token.as_deref()).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(error = %e, pages, "page fetch failed, stopping run");
                    break;
                }
            };
            pages += 1;

            // Телеметрия страницы — один раз, до строк.
            log_progress(&page.query_status);
            tracing::debug!(
                columns = page.column_info.len(),
                rows = page.rows.len(),
                "page received"
            );

            let mut abandoned = false;
            for row in &page.rows {
                match decode_row(&page.column_info, row) {
                    Ok(rendered) => {
                        tracing::info!("{rendered}");
                        rows_rendered += 1;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "decode failed, abandoning page");
                        abandoned = true;
                        break;
                    }
                }
            }
            if abandoned {
                break;
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        tracing::info!(pages, rows = rows_rendered, "query run finished");
        rows_rendered
    }
}

fn log_progress(status: &QueryStatus) {
    tracing::info!(
        progress_pct = status.progress_percentage,
        scanned_gb = status.cumulative_bytes_scanned as f64 / ONE_GIB,
        metered_gb = status.cumulative_bytes_metered as f64 / ONE_GIB,
        "query progress"
    );
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rankstream_api::error::StoreError;
    use rankstream_api::query::{ColumnInfo, Datum, QueryPage, Row};

    use super::*;

    struct ScriptedExecutor {
        pages: Mutex<VecDeque<Result<QueryPage, StoreError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedExecutor {
        fn new(pages: Vec<Result<QueryPage, StoreError>>) -> Self {
            Self { pages: Mutex::new(pages.into()), calls: AtomicUsize::new(0) }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl QueryExecutor for ScriptedExecutor {
        fn query_page<'a>(
            &'a self,
            _query: &'a str,
            _next_token: Option<&'a str>,
        ) -> Pin<Box<dyn Future<Output = Result<QueryPage, StoreError>> + Send + 'a>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.pages
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or_else(|| Err(StoreError::Transport("script exhausted".into())))
            })
        }
    }

    fn page(rows: Vec<Row>, next_token: Option<&str>) -> QueryPage {
        QueryPage {
            column_info: vec![ColumnInfo::scalar("rank", "BIGINT")],
            rows,
            next_token: next_token.map(str::to_string),
            ..Default::default()
        }
    }

    fn scalar_row(v: &str) -> Row {
        Row { data: vec![Datum::scalar(v)] }
    }

    #[tokio::test]
    async fn follows_pagination_in_order() {
        let executor = Arc::new(ScriptedExecutor::new(vec![
            Ok(page(vec![scalar_row("1"), scalar_row("2")], Some("t1"))),
            Ok(page(vec![scalar_row("3")], None)),
        ]));
        let runner = QueryRunner::new(executor.clone());
        assert_eq!(runner.run("SELECT *").await, 3);
        assert_eq!(executor.calls(), 2);
    }

    #[tokio::test]
    async fn fetch_failure_terminates_early() {
        let executor = Arc::new(ScriptedExecutor::new(vec![
            Ok(page(vec![scalar_row("1")], Some("t1"))),
            Err(StoreError::Status { status: 500, body: "sequence too large".into() }),
            Ok(page(vec![scalar_row("never")], None)),
        ]));
        let runner = QueryRunner::new(executor.clone());
        // Первая страница отрендерена, третья не запрашивается.
        assert_eq!(runner.run("SELECT *").await, 1);
        assert_eq!(executor.calls(), 2);
    }

    #[tokio::test]
    async fn decode_failure_abandons_page_and_run() {
        let bad_row = Row { data: vec![Datum::array(vec![])] }; // scalar columns, array cell
        let executor = Arc::new(ScriptedExecutor::new(vec![
            Ok(page(vec![scalar_row("1"), bad_row, scalar_row("2")], Some("t1"))),
            Ok(page(vec![scalar_row("3")], None)),
        ]));
        let runner = QueryRunner::new(executor.clone());
        // Строка до ошибки остаётся, остаток страницы и прогон брошены.
        assert_eq!(runner.run("SELECT *").await, 1);
        assert_eq!(executor.calls(), 1);
    }

    #[tokio::test]
    async fn empty_result_is_a_clean_run() {
        let executor = Arc::new(ScriptedExecutor::new(vec![Ok(page(vec![], None))]));
        let runner = QueryRunner::new(executor.clone());
        assert_eq!(runner.run("SELECT *").await, 0);
        assert_eq!(executor.calls(), 1);
    }
}
