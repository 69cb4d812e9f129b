use std::collections::HashMap;

use anyhow::{Context, Result};
use itertools::Itertools;
use tracing::{info, instrument};

use crate::{
    calendar,
    config::{FeedRange, TeamConfig},
    error::WriteError,
    events::{event_title, EventApi, NewEvent},
    fetch::{Fetcher, HttpFetcher, HttpSessions, SessionSource},
    league::LeagueData,
    scrape,
};

/// Scrapes the league pages, then reads the team's feed against the
/// finished tables.
pub async fn collect_league<P: Fetcher, C: Fetcher>(
    pages: &P,
    feed: &C,
    team: &TeamConfig,
) -> Result<LeagueData> {
    let website = team.league_url()?;
    let tables = scrape::scrape_league(pages, website.clone())
        .await
        .with_context(|| format!("failed to scrape league {}", team.league_id))?;

    let feed_url = team.feed_url(FeedRange::All)?;
    let schedule = calendar::fetch_schedule(feed, &feed_url, &tables, team)
        .await
        .with_context(|| format!("failed to read calendar of team {}", team.team_id))?;

    Ok(LeagueData {
        league_id: team.league_id.clone(),
        team_shortname: team.team_shortname.clone(),
        website: website.to_string(),
        tables,
        schedule,
    })
}

/// Replaces the league's events on the website: venues first, then every
/// event carrying the league's website marker is deleted, then all games are
/// created. Stops at the first failed call; earlier writes are not undone.
pub async fn publish<A: EventApi>(
    api: &A,
    league: &LeagueData,
    categories: &[String],
) -> Result<(), WriteError> {
    let mut venue_ids = HashMap::new();
    for (name, address) in &league.schedule.venues {
        info!(venue = %name, "creating or updating venue");
        let id = api.upsert_venue(name, address).await?;
        venue_ids.insert(name.as_str(), id);
    }

    for event in api.list_events_for_website(&league.website).await? {
        info!(id = event.id, title = %html_escape::decode_html_entities(&event.title), "deleting event");
        api.delete_event(event.id).await?;
    }

    for game in &league.schedule.games {
        let venue = game
            .venue
            .as_deref()
            .and_then(|name| venue_ids.get(name).copied());
        info!(title = %event_title(game), "creating event");
        api.create_event(&NewEvent::from_game(game, venue, categories, &league.website))
            .await?;
    }

    Ok(())
}

/// Runs team syncs one after the other. Without a publisher nothing is
/// written; the scrape and parse still run in full.
pub struct Syncer<A, S = HttpSessions, C = HttpFetcher> {
    sessions: S,
    feed: C,
    publisher: Option<A>,
}

impl<A: EventApi> Syncer<A> {
    pub fn new(publisher: Option<A>) -> Result<Self> {
        Ok(Self::with_fetchers(HttpSessions, HttpFetcher::new()?, publisher))
    }
}

impl<A: EventApi, S: SessionSource, C: Fetcher> Syncer<A, S, C> {
    pub fn with_fetchers(sessions: S, feed: C, publisher: Option<A>) -> Self {
        Self {
            sessions,
            feed,
            publisher,
        }
    }

    #[instrument(level = "info", skip_all, fields(league = %team.league_id, team = %team.team_shortname))]
    pub async fn sync_team(&self, team: &TeamConfig) -> Result<LeagueData> {
        // fresh session per league, "next page" links are bound to it
        let pages = self.sessions.open_session()?;
        let league = collect_league(&pages, &self.feed, team).await?;

        match &self.publisher {
            Some(api) => publish(api, &league, &team.event_categories)
                .await
                .with_context(|| format!("failed to publish league {}", team.league_id))?,
            None => info!(
                games = league.schedule.games.len(),
                categories = %team.event_categories.iter().join(","),
                "dry run, not writing venues or events"
            ),
        }

        Ok(league)
    }
}
