use async_trait::async_trait;

use crate::error::Error;
use crate::types::Page;

/// Hard cap on pages consumed for one logical query. A paged endpoint that
/// still reports a continuation after this many pages is treated as
/// misbehaving and the fetch fails closed.
pub const MAX_PAGES: u32 = 50;

/// Directive handed to a page source: fetch the first page, or follow a
/// continuation URL a previous page handed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    First,
    Next(String),
}

/// A bound view of one paged endpoint. Implementors resolve `First` to the
/// endpoint's own URL and `Next` to the continuation URL as given, without
/// re-deriving query parameters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageSource<T: 'static + Sync> {
    async fn page(&self, req: PageRequest) -> Result<Page<T>, Error>;
}

/// Drains every page of `source` into a single Vec, preserving page order and
/// intra-page order. Errors from the source propagate unmodified; no retry,
/// no partial result. Stops with `Error::TooManyPages` once `max_pages` pages
/// have been consumed without the source reporting exhaustion.
pub async fn fetch_all<T, S>(source: &S, max_pages: u32) -> Result<Vec<T>, Error>
where
    T: Send + Sync + 'static,
    S: PageSource<T> + Sync + ?Sized,
{
    let mut items = Vec::new();
    let mut req = PageRequest::First;
    let mut pages = 0u32;

    loop {
        if pages == max_pages {
            return Err(Error::TooManyPages(max_pages));
        }

        let page = source.page(req).await?;
        pages += 1;
        items.extend(page.items);

        match page.next {
            Some(next) => req = PageRequest::Next(next),
            None => return Ok(items),
        }
    }
}
