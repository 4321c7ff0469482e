use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use rankstream_api::error::{StoreError, WriteError};
use rankstream_api::query::QueryPage;
use rankstream_api::traits::{QueryExecutor, RecordWriter};
use rankstream_api::write::{Record, RejectedRecord};

const TARGET_QUERY: &str = "Timestream_20181101.Query";
const TARGET_WRITE: &str = "Timestream_20181101.WriteRecords";
const CONTENT_TYPE: &str = "application/x-amz-json-1.0";

// ════════════════════════════════════════════════════════════════
//  HTTP client
// ════════════════════════════════════════════════════════════════

/// HTTP клиент time-series store.
///
/// Операция кодируется заголовком `X-Amz-Target`, тело — PascalCase
/// JSON. Подпись запросов и lifecycle credentials вне скоупа: endpoint
/// берётся из конфигурации как есть. Retry/timeout живут на уровне
/// `reqwest::Client`, не здесь.
pub struct StoreClient {
    http: reqwest::Client,
    endpoint: String,
}

impl StoreClient {
    pub fn new(endpoint: &str) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StoreError::Transport(format!("HTTP client: {e}")))?;
        Ok(Self { http, endpoint: endpoint.to_string() })
    }

    async fn exec(&self, target: &str, body: serde_json::Value) -> Result<String, ExecFailure> {
        tracing::debug!(operation = target, "store call");
        let resp = self
            .http
            .post(&self.endpoint)
            .header("X-Amz-Target", target)
            .header("Content-Type", CONTENT_TYPE)
            .json(&body)
            .send()
            .await
            .map_err(|e| ExecFailure::Transport(format!("store request: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ExecFailure::Transport(format!("store read: {e}")))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(ExecFailure::Status { status: status.as_u16(), body })
        }
    }
}

/// Сырой исход exec'а до классификации на стороне операции.
enum ExecFailure {
    Transport(String),
    Status { status: u16, body: String },
}

impl From<ExecFailure> for StoreError {
    fn from(failure: ExecFailure) -> Self {
        match failure {
            ExecFailure::Transport(msg) => StoreError::Transport(msg),
            ExecFailure::Status { status, body } => StoreError::Status { status, body },
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Wire bodies
// ════════════════════════════════════════════════════════════════

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct QueryRequest<'a> {
    query_string: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WriteRecordsRequest<'a> {
    database_name: &'a str,
    table_name: &'a str,
    records: Vec<Record>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WriteFailureBody {
    #[serde(default)]
    rejected_records: Vec<RejectedRecord>,
}

/// Классифицировать неуспешный write-ответ: тело с `RejectedRecords` —
/// частичный reject (не фатально), всё остальное — транспортный отказ.
fn classify_write_failure(status: u16, body: &str) -> WriteError {
    if let Ok(parsed) = serde_json::from_str::<WriteFailureBody>(body) {
        if !parsed.rejected_records.is_empty() {
            return WriteError::Rejected(parsed.rejected_records);
        }
    }
    WriteError::Transport(StoreError::Status { status, body: body.to_string() })
}

// ════════════════════════════════════════════════════════════════
//  Trait impls
// ════════════════════════════════════════════════════════════════

impl QueryExecutor for StoreClient {
    fn query_page<'a>(
        &'a self,
        query: &'a str,
        next_token: Option<&'a str>,
    ) -> Pin<Box<dyn Future<Output = Result<QueryPage, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let request = QueryRequest { query_string: query, next_token };
            let body = serde_json::to_value(&request)
                .map_err(|e| StoreError::Transport(format!("encode query: {e}")))?;
            let response = self.exec(TARGET_QUERY, body).await.map_err(StoreError::from)?;
            serde_json::from_str(&response)
                .map_err(|e| StoreError::Parse(format!("query page: {e}")))
        })
    }
}

impl RecordWriter for StoreClient {
    fn write_records<'a>(
        &'a self,
        database: &'a str,
        table: &'a str,
        records: Vec<Record>,
    ) -> Pin<Box<dyn Future<Output = Result<(), WriteError>> + Send + 'a>> {
        Box::pin(async move {
            let request = WriteRecordsRequest {
                database_name: database,
                table_name: table,
                records,
            };
            let body = serde_json::to_value(&request)
                .map_err(|e| WriteError::Transport(StoreError::Transport(format!("encode write: {e}"))))?;
            match self.exec(TARGET_WRITE, body).await {
                Ok(_) => Ok(()),
                Err(ExecFailure::Status { status, body }) => {
                    Err(classify_write_failure(status, &body))
                }
                Err(failure) => Err(WriteError::Transport(failure.into())),
            }
        })
    }
}
