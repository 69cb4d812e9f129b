use std::sync::LazyLock;

use html_scraper::{Html, Selector};
use regex::Regex;

static MOUSE_OVER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[onmouseover]").expect("bad hardcoded selector"));

/// Venue tooltip, e.g.
/// `ShowBubble('...Bezeichnung:</td><td>Halle 1</td>...Kurzname:</td><td>H1</td>...')`.
static VENUE_BUBBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)^ShowBubble.*Bezeichnung:</td><td>(?P<name>.*?)</td>.*Kurzname:</td><td>(?P<shortname>.*?)</td>",
    )
    .expect("bad hardcoded venue pattern")
});

/// Returns every `(shortname, full name)` pair advertised in the page's venue
/// tooltips, in document order. Tooltips of any other kind are ignored.
pub fn extract_location_pairs(page: &Html) -> Vec<(String, String)> {
    page.select(&MOUSE_OVER)
        .filter_map(|element| element.value().attr("onmouseover"))
        .filter_map(parse_venue_bubble)
        .collect()
}

fn parse_venue_bubble(tooltip: &str) -> Option<(String, String)> {
    let captures = VENUE_BUBBLE.captures(tooltip)?;
    let name = collapse_whitespace(&captures["name"]);
    Some((captures["shortname"].to_string(), name))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
