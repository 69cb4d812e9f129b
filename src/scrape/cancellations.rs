use std::{collections::HashSet, sync::LazyLock};

use html_scraper::{ElementRef, Html, Selector};

const CANCELLED_MARKER: &str = "Spiel abgesagt";

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").expect("bad hardcoded selector"));
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("bad hardcoded selector"));
static MARKER: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(&format!(
        r#"img[title="{CANCELLED_MARKER}"], img[alt="{CANCELLED_MARKER}"]"#
    ))
    .expect("bad hardcoded selector")
});

/// Game numbers of all rows showing the "Spiel abgesagt" image. The number is
/// the trimmed text of the row's first cell; rows with an empty first cell are
/// ignored.
pub fn extract_cancelled_numbers(page: &Html) -> HashSet<String> {
    page.select(&ROW)
        .filter(|row| row.select(&MARKER).next().is_some())
        .filter_map(first_cell_text)
        .collect()
}

fn first_cell_text(row: ElementRef<'_>) -> Option<String> {
    let cell = row.select(&CELL).next()?;
    let text = cell
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<String>();
    (!text.is_empty()).then_some(text)
}
