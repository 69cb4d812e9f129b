use std::{str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::error::ParseMismatch;

/// `{title}, {venue shortname} (SpNr. {game number})`
static SUMMARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<title>.+?),\s+(?P<venue>\S+)\s+\(SpNr\.\s*(?P<game>\d+)\)$")
        .expect("bad hardcoded summary pattern")
});

/// A hyphen and any whitespace around it.
static HYPHEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*-\s*").expect("bad hardcoded hyphen pattern"));

/// "Lahn-Dill" is a single place name, not a pairing, and must survive the
/// hyphen spacing applied to titles.
const UNSPLIT_PLACE_NAME: (&str, &str) = ("Lahn - Dill", "Lahn-Dill");

/// The three parts encoded in a feed event's summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub title: String,
    pub venue_shortname: String,
    pub game_number: String,
}

impl FromStr for Summary {
    type Err = ParseMismatch;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = SUMMARY.captures(s).ok_or_else(|| ParseMismatch {
            summary: s.to_string(),
        })?;
        Ok(Summary {
            title: captures["title"].to_string(),
            venue_shortname: captures["venue"].to_string(),
            game_number: captures["game"].to_string(),
        })
    }
}

/// Title as shown on the website: own team shortened, pairings spaced as
/// `A - B`.
pub fn display_title(title: &str, team_name: &str, team_shortname: &str) -> String {
    let shortened = if team_name.is_empty() {
        title.to_string()
    } else {
        title.replace(team_name, team_shortname)
    };
    let (split, joined) = UNSPLIT_PLACE_NAME;
    HYPHEN.replace_all(&shortened, " - ").replace(split, joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_parts() {
        let summary: Summary = "TeamA - TeamB, RBB-SZS (SpNr. 42)".parse().unwrap();

        assert_eq!(
            summary,
            Summary {
                title: "TeamA - TeamB".to_string(),
                venue_shortname: "RBB-SZS".to_string(),
                game_number: "42".to_string(),
            }
        );
    }

    #[test]
    fn title_may_contain_commas() {
        let summary: Summary = "Pokal, Runde 1: TeamA-TeamB, KSH (SpNr.7)".parse().unwrap();

        assert_eq!(summary.title, "Pokal, Runde 1: TeamA-TeamB");
        assert_eq!(summary.venue_shortname, "KSH");
        assert_eq!(summary.game_number, "7");
    }

    #[test]
    fn missing_game_number_is_a_mismatch() {
        let err = "TeamA - TeamB, RBB-SZS".parse::<Summary>().unwrap_err();
        assert_eq!(err.summary, "TeamA - TeamB, RBB-SZS");
    }

    #[test]
    fn trailing_text_is_a_mismatch() {
        assert!("TeamA - TeamB, KSH (SpNr. 42) verlegt".parse::<Summary>().is_err());
        assert!("TeamA - TeamB, KSH (SpNr. x)".parse::<Summary>().is_err());
    }

    #[test]
    fn own_team_is_shortened_everywhere() {
        assert_eq!(display_title("TeamA - TeamB", "TeamA", "TA"), "TA - TeamB");
        assert_eq!(
            display_title("SGK Rolling Chocolate-RSV Lahn-Dill", "SGK Rolling Chocolate", "RC1"),
            "RC1 - RSV Lahn-Dill"
        );
    }

    #[test]
    fn hyphens_get_spaces() {
        assert_eq!(display_title("Heim-Gast", "Nobody", "N"), "Heim - Gast");
    }

    #[test]
    fn spaced_hyphens_are_not_doubled() {
        assert_eq!(display_title("Heim  -Gast", "Nobody", "N"), "Heim - Gast");
    }

    #[test]
    fn empty_team_name_leaves_title_alone() {
        assert_eq!(display_title("Heim", "", "X"), "Heim");
    }
}
