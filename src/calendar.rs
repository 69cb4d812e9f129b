//! Phase two of a league sync: read the team's calendar feed and join it
//! against the scraped [`LeagueTables`].

use tracing::{info, warn};
use url::Url;

use crate::{
    config::TeamConfig,
    error::{FeedError, FetchError},
    fetch::Fetcher,
    league::{Game, LeagueSchedule, LeagueTables},
};

pub mod ics;
mod summary;

pub use summary::{display_title, Summary};

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("malformed calendar feed")]
    Feed(#[from] FeedError),
}

/// Fetches the feed with a single GET and parses it.
pub async fn fetch_schedule<F: Fetcher>(
    fetcher: &F,
    feed_url: &Url,
    tables: &LeagueTables,
    team: &TeamConfig,
) -> Result<LeagueSchedule, CalendarError> {
    info!(url = %feed_url, "reading calendar feed");
    let document = fetcher.get_text(feed_url).await?;
    Ok(parse_feed(&document, tables, team)?)
}

/// Builds one [`Game`] per event whose summary has the expected shape, in feed
/// order. Anything else is logged and skipped.
pub fn parse_feed(
    document: &str,
    tables: &LeagueTables,
    team: &TeamConfig,
) -> Result<LeagueSchedule, FeedError> {
    let mut schedule = LeagueSchedule::default();

    for event in ics::events(document)? {
        let summary = match event.text("SUMMARY").unwrap_or_default().parse::<Summary>() {
            Ok(summary) => summary,
            Err(mismatch) => {
                warn!(summary = %mismatch.summary, "skipping event with unrecognized format");
                continue;
            }
        };

        let (Some(start), Some(end)) = (event.date_time("DTSTART"), event.date_time("DTEND")) else {
            warn!(game_number = %summary.game_number, "skipping event without start or end");
            continue;
        };
        let (start, end) = (start?, end?);

        let title = display_title(&summary.title, &team.team_name, &team.team_shortname);
        let venue = tables.venue_name(&summary.venue_shortname).map(str::to_string);
        let cancelled = tables.is_cancelled(&summary.game_number);
        let address = event.text("LOCATION").unwrap_or_default();

        match &venue {
            Some(name) => info!(%title, venue = %name, %address, cancelled, "event found"),
            None => info!(
                %title,
                shortname = %summary.venue_shortname,
                cancelled,
                "event found at unknown venue"
            ),
        }

        if let Some(name) = &venue {
            schedule.venues.insert(name.clone(), address);
        }
        schedule.games.push(Game {
            title,
            start,
            end,
            venue,
            cancelled,
        });
    }

    Ok(schedule)
}
