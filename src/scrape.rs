//! Phase one of a league sync: walk the paginated league schedule and collect
//! venue names and cancelled game numbers.

use html_scraper::Html;
use tracing::info;
use url::Url;

use crate::{
    error::FetchError,
    fetch::Fetcher,
    league::{LeagueTables, TablesBuilder},
};

mod cancellations;
mod locations;
mod pager;

pub use cancellations::extract_cancelled_numbers;
pub use locations::extract_location_pairs;
pub use pager::Pager;

/// Reads every page of the league starting at `start` and returns the
/// completed lookup tables.
pub async fn scrape_league<F: Fetcher>(fetcher: &F, start: Url) -> Result<LeagueTables, FetchError> {
    let mut pager = Pager::new(fetcher, start);
    let mut tables = TablesBuilder::default();

    while let Some(page) = pager.next_page().await? {
        absorb_page(&mut tables, &page);
    }

    Ok(tables.finish())
}

pub fn absorb_page(tables: &mut TablesBuilder, page: &Html) {
    for (shortname, name) in extract_location_pairs(page) {
        info!(%shortname, %name, "location found");
        tables.add_location(shortname, name);
    }

    for game_number in extract_cancelled_numbers(page) {
        info!(%game_number, "cancelled game found");
        tables.add_cancelled(game_number);
    }
}
