use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

const LEAGUE_SITE: &str = "https://www.basketball-bund.net";

/// Club website whose event calendar receives the games.
pub const DEFAULT_BASE_URL: &str = "https://www.rolling-chocolate.de/";

/// Which games the calendar feed should contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedRange {
    /// Every game of the season, including past ones.
    All,
    Upcoming,
}

impl FeedRange {
    fn code(self) -> i8 {
        match self {
            FeedRange::All => -1,
            FeedRange::Upcoming => -2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamConfig {
    pub league_id: String,
    pub team_id: String,
    /// Name as it appears in the feed.
    pub team_name: String,
    /// Replacement for `team_name` in published titles.
    pub team_shortname: String,
    pub event_categories: Vec<String>,
}

impl TeamConfig {
    /// First schedule page of the league. Doubles as the website marker of
    /// every event published for it.
    pub fn league_url(&self) -> Result<Url> {
        Url::parse(&format!(
            "{LEAGUE_SITE}/index.jsp?Action=101&liga_id={}",
            self.league_id
        ))
        .with_context(|| format!("bad league id {:?}", self.league_id))
    }

    pub fn feed_url(&self, range: FeedRange) -> Result<Url> {
        Url::parse(&format!(
            "{LEAGUE_SITE}/servlet/KalenderDienst?typ=2&liga_id={}&ms_liga_id={}&spt={}",
            self.league_id,
            self.team_id,
            range.code()
        ))
        .with_context(|| format!("bad league/team id {:?}/{:?}", self.league_id, self.team_id))
    }
}

pub fn default_teams() -> Vec<TeamConfig> {
    let season = |team: &str| vec![team.to_string(), "spieltag".to_string(), "runde-25-26".to_string()];
    vec![
        TeamConfig {
            league_id: "48078".to_string(),
            team_id: "401699".to_string(),
            team_name: "SGK Rolling Chocolate".to_string(),
            team_shortname: "RC1".to_string(),
            event_categories: season("rc1"),
        },
        TeamConfig {
            league_id: "48083".to_string(),
            team_id: "401735".to_string(),
            team_name: "SGK Rolling Chocolate 2".to_string(),
            team_shortname: "RC2".to_string(),
            event_categories: season("rc2"),
        },
    ]
}

/// Reads a JSON array of teams from `path`, or falls back to the built-in list.
pub fn load_teams(path: Option<&Path>) -> Result<Vec<TeamConfig>> {
    let Some(path) = path else {
        return Ok(default_teams());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read team list {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse team list {}", path.display()))
}

/// Parses the CMS base URL, making sure it ends in `/` so API paths are
/// appended rather than replacing its last segment.
pub fn base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).with_context(|| format!("invalid base url {raw:?}"))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn league_and_feed_urls() {
        let team = &default_teams()[0];

        assert_eq!(
            team.league_url().unwrap().as_str(),
            "https://www.basketball-bund.net/index.jsp?Action=101&liga_id=48078"
        );
        assert_eq!(
            team.feed_url(FeedRange::All).unwrap().as_str(),
            "https://www.basketball-bund.net/servlet/KalenderDienst?typ=2&liga_id=48078&ms_liga_id=401699&spt=-1"
        );
        assert!(team.feed_url(FeedRange::Upcoming).unwrap().as_str().ends_with("&spt=-2"));
    }

    #[test]
    fn team_list_from_json() {
        let dir = std::env::temp_dir().join(format!("league_sync_teams_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("teams.json");
        std::fs::write(
            &path,
            r#"[{"league_id":"1","team_id":"2","team_name":"TSV Beispiel","team_shortname":"TSV","event_categories":["tsv"]}]"#,
        )
        .unwrap();

        let teams = load_teams(Some(&path)).unwrap();

        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].team_shortname, "TSV");
        assert_eq!(teams[0].event_categories, vec!["tsv"]);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn default_list_without_path() {
        assert_eq!(load_teams(None).unwrap(), default_teams());
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        assert_eq!(base_url("https://club.test/wp").unwrap().as_str(), "https://club.test/wp/");
        assert_eq!(base_url("https://club.test/").unwrap().as_str(), "https://club.test/");
        assert!(base_url("not a url").is_err());
    }
}
