mod api;
mod classify;
mod cleanup;
mod pages;
mod retry;

pub(crate) use classify::*;
pub(crate) use cleanup::*;
pub(crate) use pages::*;
pub(crate) use retry::*;

use crate::http::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HistoryEntry {
    pub(crate) id: String,
    pub(crate) item_type: String,
    pub(crate) title: String,
    pub(crate) parent_title: Option<String>,
    pub(crate) grandparent_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Page {
    pub(crate) entries: Vec<HistoryEntry>,
    pub(crate) has_next_page: bool,
    pub(crate) end_cursor: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Category {
    Episode,
    Movie,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DeletionOutcome {
    Success,
    Failed(String),
    Skipped,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum HistoryError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("API returned errors: {0}")]
    Api(String),
    #[error("malformed watch history response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum DeleteError {
    #[error(transparent)]
    Transport(TransportError),
    #[error("API returned errors: {0}")]
    Api(String),
    #[error("still rate limited after {retries} retries")]
    RateLimitExhausted { retries: u32 },
}
