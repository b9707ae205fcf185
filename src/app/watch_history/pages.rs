use std::iter::FusedIterator;

use crate::http::Transport;

use super::api::{
    WATCH_HISTORY_OPERATION, WATCH_HISTORY_QUERY, parse_watch_history_page, watch_history_variables,
};
use super::{HistoryError, Page};

// A failed fetch is yielded once, then the iterator is exhausted.
pub(crate) struct HistoryPages<'a, T: Transport + ?Sized> {
    transport: &'a T,
    user_id: &'a str,
    page_size: u32,
    cursor: Option<String>,
    finished: bool,
}

pub(crate) fn pages<'a, T: Transport + ?Sized>(
    transport: &'a T,
    user_id: &'a str,
    page_size: u32,
    start_cursor: Option<String>,
) -> HistoryPages<'a, T> {
    HistoryPages {
        transport,
        user_id,
        page_size,
        cursor: start_cursor,
        finished: false,
    }
}

impl<T: Transport + ?Sized> HistoryPages<'_, T> {
    fn fetch(&self) -> Result<Page, HistoryError> {
        let variables =
            watch_history_variables(self.user_id, self.page_size, self.cursor.as_deref());
        let response = self
            .transport
            .execute(WATCH_HISTORY_QUERY, variables, WATCH_HISTORY_OPERATION)?;
        parse_watch_history_page(&response)
    }
}

impl<T: Transport + ?Sized> Iterator for HistoryPages<'_, T> {
    type Item = Result<Page, HistoryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.fetch() {
            Ok(page) => {
                tracing::info!(
                    cursor = self.cursor.as_deref().unwrap_or("<start>"),
                    entries = page.entries.len(),
                    has_next_page = page.has_next_page,
                    "fetched watch history page"
                );
                if page.has_next_page {
                    self.cursor = page.end_cursor.clone();
                } else {
                    self.finished = true;
                }
                Some(Ok(page))
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch watch history");
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl<T: Transport + ?Sized> FusedIterator for HistoryPages<'_, T> {}
