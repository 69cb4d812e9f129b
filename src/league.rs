use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use jiff::civil::DateTime;
use serde::Serialize;

/// Venue shortname → full venue name, as advertised in the league pages.
pub type LocationMap = HashMap<String, String>;

/// Game numbers whose schedule row carries the cancellation marker.
pub type CancelledSet = HashSet<String>;

/// Full venue name → free-text address taken from the calendar feed, in the
/// order the venues first appear there.
pub type VenueAddressMap = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Game {
    pub title: String,
    /// Wall-clock time from the feed, published as UTC.
    pub start: DateTime,
    pub end: DateTime,
    /// `None` when the shortname was not seen on any league page.
    pub venue: Option<String>,
    pub cancelled: bool,
}

/// Lookup tables collected while walking the league pages.
///
/// Only [`LeagueTables`] can be handed to the calendar parser, so the feed is
/// never joined against a partially scraped league.
#[derive(Debug, Default)]
pub struct TablesBuilder {
    locations: LocationMap,
    cancelled: CancelledSet,
}

impl TablesBuilder {
    /// Last write wins when a shortname shows up again.
    pub fn add_location(&mut self, shortname: String, name: String) {
        self.locations.insert(shortname, name);
    }

    pub fn add_cancelled(&mut self, game_number: String) {
        self.cancelled.insert(game_number);
    }

    pub fn finish(self) -> LeagueTables {
        LeagueTables {
            locations: self.locations,
            cancelled: self.cancelled,
        }
    }
}

/// Built only by [`TablesBuilder::finish`].
#[derive(Debug, Clone, Serialize)]
pub struct LeagueTables {
    locations: LocationMap,
    cancelled: CancelledSet,
}

impl LeagueTables {
    pub fn venue_name(&self, shortname: &str) -> Option<&str> {
        self.locations.get(shortname).map(String::as_str)
    }

    pub fn is_cancelled(&self, game_number: &str) -> bool {
        self.cancelled.contains(game_number)
    }

    pub fn locations(&self) -> &LocationMap {
        &self.locations
    }

    pub fn cancelled(&self) -> &CancelledSet {
        &self.cancelled
    }
}

/// Games and venue addresses parsed from one team's calendar feed.
#[derive(Debug, Default, Clone, Serialize)]
pub struct LeagueSchedule {
    pub games: Vec<Game>,
    pub venues: VenueAddressMap,
}

/// Everything learned about one (league, team) pair during a single run.
#[derive(Debug, Clone, Serialize)]
pub struct LeagueData {
    pub league_id: String,
    pub team_shortname: String,
    /// League page URL, also stamped on every published event.
    pub website: String,
    pub tables: LeagueTables,
    pub schedule: LeagueSchedule,
}
