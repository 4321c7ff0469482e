#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("store: {0}")]
    Store(#[from] rankstream_api::StoreError),

    #[error("source: {0}")]
    Source(#[from] rankstream_api::SourceError),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}
