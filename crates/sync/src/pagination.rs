//! Turns a paged listing endpoint into one complete collection.

use crate::error::{SyncError, SyncResult};
use crate::transport::ApiResponse;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;

/// Upper bound on pages fetched for one listing; guards against servers that
/// ignore the `page` parameter.
const MAX_PAGES: usize = 10_000;

/// Fetches every page of a listing and concatenates the items found under
/// `items_key`.
///
/// `fetch` is called with `(per_page, page)` starting at page 1. When the
/// server reports a `total`, paging continues until that many items have
/// been collected, so a server that caps its page size below `per_page` is
/// still read completely; only an empty page ends it early. Without a
/// `total`, a page shorter than `per_page` is the last one. Any failed page
/// fails the whole collection.
pub async fn collect_all_pages<T, F, Fut>(
    per_page: usize,
    items_key: &'static str,
    mut fetch: F,
) -> SyncResult<Vec<T>>
where
    T: DeserializeOwned,
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = SyncResult<ApiResponse>>,
{
    let per_page = per_page.max(1);
    let mut items: Vec<T> = Vec::new();
    let mut page = 1;

    loop {
        let response = fetch(per_page, page).await?;
        let page_items = match response.data.get(items_key) {
            Some(Value::Array(values)) => values.clone(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                let message = format!("expected an array, found {other}");
                return Err(SyncError::decode(
                    items_key,
                    serde::de::Error::custom(message),
                ));
            }
        };
        let received = page_items.len();
        for value in page_items {
            let item = serde_json::from_value(value).map_err(|e| SyncError::decode(items_key, e))?;
            items.push(item);
        }

        tracing::trace!(items_key, page, received, total = ?response.total, "fetched page");

        let last_page = match response.total {
            Some(total) => items.len() >= total || received == 0,
            None => received < per_page,
        };
        if last_page {
            break;
        }
        if page >= MAX_PAGES {
            return Err(SyncError::decode(
                items_key,
                serde::de::Error::custom(format!(
                    "gave up after {MAX_PAGES} pages with {} items collected",
                    items.len()
                )),
            ));
        }
        page += 1;
    }

    Ok(items)
}
