//! Just enough of RFC 5545 to read the league's calendar export: line
//! unfolding, content lines, TEXT unescaping and `VEVENT` blocks.

use jiff::civil::{Date, DateTime, Time};

use crate::error::FeedError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub params: Vec<(String, String)>,
    pub value: String,
}

impl Property {
    /// The value with TEXT escapes (`\,` `\;` `\\` `\n`) resolved.
    pub fn text(&self) -> String {
        unescape_text(&self.value)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Properties of one `VEVENT`, excluding those of nested components such as
/// `VALARM`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Event {
    properties: Vec<Property>,
}

impl Event {
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(Property::text)
    }

    /// Reads `DTSTART`/`DTEND` style values. A trailing `Z` is dropped and the
    /// wall-clock time kept; date-only values start at midnight.
    pub fn date_time(&self, name: &'static str) -> Option<Result<DateTime, FeedError>> {
        self.get(name).map(|p| parse_date_time(name, &p.value))
    }
}

/// All `VEVENT` components of `document`, in document order.
pub fn events(document: &str) -> Result<Vec<Event>, FeedError> {
    let mut events = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut current: Option<Event> = None;

    for line in unfold(document) {
        let Some(property) = parse_line(&line) else {
            continue;
        };

        if property.name == "BEGIN" {
            let component = property.value.trim().to_ascii_uppercase();
            if component == "VEVENT" && current.is_none() {
                current = Some(Event::default());
            }
            open.push(component);
        } else if property.name == "END" {
            let component = property.value.trim().to_ascii_uppercase();
            match open.pop() {
                Some(expected) if expected == component => {}
                Some(expected) => {
                    return Err(FeedError::Unbalanced {
                        expected,
                        found: component,
                    })
                }
                None => return Err(FeedError::UnexpectedEnd(component)),
            }
            if component == "VEVENT" && !open.iter().any(|c| c == "VEVENT") {
                events.extend(current.take());
            }
        } else if open.last().is_some_and(|c| c == "VEVENT") {
            if let Some(event) = current.as_mut() {
                event.properties.push(property);
            }
        }
    }

    match open.pop() {
        Some(component) => Err(FeedError::Unterminated(component)),
        None => Ok(events),
    }
}

/// Joins continuation lines (leading space or tab) onto the previous line.
fn unfold(document: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for raw in document.split('\n') {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let continuation = raw.strip_prefix([' ', '\t']).filter(|_| !lines.is_empty());
        if let Some(continuation) = continuation {
            let last = lines.len() - 1;
            lines[last].push_str(continuation);
        } else if !raw.is_empty() {
            lines.push(raw.to_string());
        }
    }
    lines
}

/// Splits `NAME;PARAM=VALUE:value`. Colons and semicolons inside quoted
/// parameter values do not count as separators.
fn parse_line(line: &str) -> Option<Property> {
    let mut in_quotes = false;
    let mut separators = Vec::new();
    let mut colon = None;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => separators.push(i),
            ':' if !in_quotes => {
                colon = Some(i);
                break;
            }
            _ => {}
        }
    }
    let colon = colon?;
    let (head, value) = (&line[..colon], &line[colon + 1..]);

    let name_end = separators.first().copied().unwrap_or(colon);
    let name = head[..name_end].trim().to_ascii_uppercase();
    if name.is_empty() {
        return None;
    }

    let params = separators
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = separators.get(n + 1).copied().unwrap_or(colon);
            &line[start + 1..end]
        })
        .filter_map(|param| param.split_once('='))
        .map(|(key, value)| (key.trim().to_ascii_uppercase(), value.trim_matches('"').to_string()))
        .collect();

    Some(Property {
        name,
        params,
        value: value.to_string(),
    })
}

fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn parse_date_time(property: &'static str, value: &str) -> Result<DateTime, FeedError> {
    let trimmed = value.trim();
    let local = trimmed.strip_suffix(['Z', 'z']).unwrap_or(trimmed);
    let parsed = if local.len() == 8 {
        Date::strptime("%Y%m%d", local).map(|d| d.to_datetime(Time::midnight()))
    } else {
        DateTime::strptime("%Y%m%dT%H%M%S", local)
    };
    parsed.map_err(|source| FeedError::Timestamp {
        property,
        value: value.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;

    use super::*;

    #[test]
    fn folded_lines_are_joined() {
        let doc = "BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nSUMMARY:SGK Rolling Chocolate - TV \r\n Musterstadt, KSH (SpNr. 12)\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

        let events = events(doc).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].text("summary").as_deref(),
            Some("SGK Rolling Chocolate - TV Musterstadt, KSH (SpNr. 12)")
        );
    }

    #[test]
    fn text_escapes_are_resolved() {
        let doc = "BEGIN:VEVENT\nLOCATION:Am Sportpark 3\\, 35390 Gießen\\nHalle B\\;\\\\\nEND:VEVENT\n";

        let events = events(doc).unwrap();

        assert_eq!(
            events[0].text("LOCATION").as_deref(),
            Some("Am Sportpark 3, 35390 Gießen\nHalle B;\\")
        );
    }

    #[test]
    fn quoted_params_may_contain_colons() {
        let property = parse_line(r#"DTSTART;TZID="Europe/Berlin:Test";VALUE=DATE-TIME:20251004T160000"#).unwrap();

        assert_eq!(property.name, "DTSTART");
        assert_eq!(property.param("tzid"), Some("Europe/Berlin:Test"));
        assert_eq!(property.param("VALUE"), Some("DATE-TIME"));
        assert_eq!(property.value, "20251004T160000");
    }

    #[test]
    fn nested_alarm_properties_stay_out_of_the_event() {
        let doc = "BEGIN:VCALENDAR\nBEGIN:VTIMEZONE\nTZID:Europe/Berlin\nEND:VTIMEZONE\nBEGIN:VEVENT\nSUMMARY:Spiel\nBEGIN:VALARM\nSUMMARY:Erinnerung\nEND:VALARM\nDTSTART:20251004T160000Z\nEND:VEVENT\nEND:VCALENDAR\n";

        let events = events(doc).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text("SUMMARY").as_deref(), Some("Spiel"));
        assert!(events[0].get("DTSTART").is_some());
        assert!(events[0].get("TZID").is_none());
    }

    #[test]
    fn unterminated_component_is_an_error() {
        let err = events("BEGIN:VCALENDAR\nBEGIN:VEVENT\nSUMMARY:x\n").unwrap_err();
        assert!(matches!(err, FeedError::Unterminated(c) if c == "VEVENT"));
    }

    #[test]
    fn mismatched_end_is_an_error() {
        let err = events("BEGIN:VCALENDAR\nBEGIN:VEVENT\nEND:VCALENDAR\n").unwrap_err();
        assert!(matches!(err, FeedError::Unbalanced { .. }));
    }

    #[test]
    fn date_time_forms() {
        assert_eq!(
            parse_date_time("DTSTART", "20251004T160000Z").unwrap(),
            date(2025, 10, 4).at(16, 0, 0, 0)
        );
        assert_eq!(
            parse_date_time("DTSTART", "20251004T180000").unwrap(),
            date(2025, 10, 4).at(18, 0, 0, 0)
        );
        assert_eq!(
            parse_date_time("DTSTART", "20251004").unwrap(),
            date(2025, 10, 4).at(0, 0, 0, 0)
        );
        assert!(parse_date_time("DTEND", "morgen").is_err());
    }
}
