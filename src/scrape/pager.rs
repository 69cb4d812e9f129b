use std::{collections::HashSet, sync::LazyLock};

use html_scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};
use url::Url;

use crate::{error::FetchError, fetch::Fetcher};

/// The "next page" arrow is an image with this title wrapped in a link.
static NEXT_PAGE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[title="Seite vor"]"#).expect("bad hardcoded selector"));

/// Walks the "next page" chain of a league schedule, one request at a time.
/// Each URL is fetched at most once.
pub struct Pager<'f, F> {
    fetcher: &'f F,
    next: Option<Url>,
    visited: HashSet<Url>,
}

impl<'f, F: Fetcher> Pager<'f, F> {
    pub fn new(fetcher: &'f F, start: Url) -> Self {
        Self {
            fetcher,
            next: Some(start),
            visited: HashSet::new(),
        }
    }

    /// Fetches the next page, or returns `None` once the previous page had no
    /// "next page" link. A failed request ends the walk with an error; there
    /// is no retry.
    pub async fn next_page(&mut self) -> Result<Option<Html>, FetchError> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };

        info!(%url, "reading league page");
        let body = self.fetcher.get_text(&url).await?;
        let page = Html::parse_document(&body);
        self.visited.insert(url.clone());

        self.next = next_page_href(&page).and_then(|href| match url.join(href) {
            Ok(next) if self.visited.contains(&next) => {
                warn!(%next, "next page link leads back to a visited page, stopping");
                None
            }
            Ok(next) => Some(next),
            Err(e) => {
                warn!(href, error = %e, "unusable next page link, stopping");
                None
            }
        });

        Ok(Some(page))
    }
}

fn next_page_href(page: &Html) -> Option<&str> {
    let arrow = page.select(&NEXT_PAGE).next()?;
    let link = arrow.parent().and_then(ElementRef::wrap)?;
    link.value().attr("href")
}
