/// Entity repositories
///
/// Each repository owns persistence of exactly one entity: it assembles the
/// filter and update expressions for the store, enforces soft-delete
/// visibility and uniqueness, and shapes scan results into pages. The store
/// handle is injected at construction and shared via `Arc` — repositories
/// hold no other state, so cloning one is cheap and concurrent use is safe.
///
/// Pagination is continuation-token based everywhere: a listing returns a
/// [`Page`] whose `next_token` feeds the next [`PageRequest`]. Tokens are
/// opaque to callers.
use serde::{Deserialize, Serialize};

use crate::db::{Filter, Item, KeyValueStore, ScanRequest, StoreError};
use crate::error::{Error, Result};

pub mod events;
pub mod registrations;
pub mod users;

pub use events::{EventFilter, EventRepository};
pub use registrations::RegistrationRepository;
pub use users::{UserFilter, UserRepository};

/// Default number of items per page when the caller does not say
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Opaque continuation token for paged listings
///
/// Wraps the store's last-evaluated key; callers pass it back verbatim to
/// fetch the next page and never inspect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    pub(crate) fn encode(key: &str) -> Self {
        Self(hex::encode(key.as_bytes()))
    }

    pub(crate) fn decode(&self) -> Result<String> {
        let bytes = hex::decode(&self.0)
            .map_err(|_| Error::validation("malformed page token"))?;
        String::from_utf8(bytes).map_err(|_| Error::validation("malformed page token"))
    }

    /// Token as its wire form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PageToken {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Paging parameters for a listing
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    /// Page size; defaults to [`DEFAULT_PAGE_SIZE`], minimum 1
    pub limit: Option<u32>,

    /// Continuation token from the previous page
    pub token: Option<PageToken>,
}

impl PageRequest {
    /// First page with the default size
    pub fn first() -> Self {
        Self::default()
    }

    /// First page with an explicit size
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            token: None,
        }
    }

    /// Page following `token`, keeping the same size
    pub fn after(&self, token: PageToken) -> Self {
        Self {
            limit: self.limit,
            token: Some(token),
        }
    }

    pub(crate) fn effective_limit(&self) -> Result<usize> {
        match self.limit {
            None => Ok(DEFAULT_PAGE_SIZE as usize),
            Some(0) => Err(Error::validation("page size must be at least 1")),
            Some(n) => Ok(n as usize),
        }
    }

    pub(crate) fn start_key(&self) -> Result<Option<String>> {
        self.token.as_ref().map(PageToken::decode).transpose()
    }
}

/// One page of a listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,

    /// Token for the next page; `None` when the listing is exhausted
    pub next_token: Option<PageToken>,
}

impl<T> Page<T> {
    /// Maps the items while keeping the continuation token
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_token: self.next_token,
        }
    }
}

/// Scans every store-side page of `table` matching `filter`
///
/// Follows the continuation key until the table is exhausted — the
/// full-table read behind unique-key lookups.
pub(crate) async fn scan_all(
    store: &dyn KeyValueStore,
    table: &str,
    filter: &Filter,
) -> std::result::Result<Vec<Item>, StoreError> {
    let mut items = Vec::new();
    let mut key: Option<String> = None;
    loop {
        let page = store
            .scan(
                ScanRequest::new(table)
                    .with_filter(filter.clone())
                    .with_start_after(key),
            )
            .await?;
        items.extend(page.items);
        match page.last_evaluated_key {
            Some(next) => key = Some(next),
            None => return Ok(items),
        }
    }
}
