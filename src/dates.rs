//! Validity windows as printed on leaflet thumbnails, e.g. `"01.01.2024 - 31.12.2024"`
//! or `"von Freitag 05.01.2024"`.

use chrono::NaiveDate;

const DATE_FORMAT: &str = "%d.%m.%Y";
const RANGE_SEPARATOR: &str = " - ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    Full { from: NaiveDate, to: NaiveDate },
    /// Only one date is printed; it is taken as the last day.
    OpenStart { to: NaiveDate },
    Unparseable,
}

/// Which leaflets count as active on a given day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActivePolicy {
    /// Only leaflets with both dates printed, with today inside the range.
    #[default]
    FullRangeOnly,
    /// Also leaflets with a single date, while today is not past it.
    IncludeOpenStart,
}

impl ActivePolicy {
    /// Returns the `(valid_from, valid_to)` to record when `range` is active on `today`.
    pub fn admit(self, range: DateRange, today: NaiveDate) -> Option<(Option<NaiveDate>, NaiveDate)> {
        match (self, range) {
            (_, DateRange::Full { from, to }) if from <= today && today <= to => Some((Some(from), to)),
            (Self::IncludeOpenStart, DateRange::OpenStart { to }) if today <= to => Some((None, to)),
            _ => None,
        }
    }
}

/// Parse the raw date text of a leaflet. Never fails: text that does not
/// match either shape comes back as [`DateRange::Unparseable`].
pub fn parse_date_range(text: &str) -> DateRange {
    let parts: Vec<&str> = text.split(RANGE_SEPARATOR).collect();

    if let [from, to] = parts.as_slice() {
        return match (parse_date(from), parse_date(to)) {
            (Some(from), Some(to)) => {
                if from > to {
                    tracing::warn!(text, "leaflet date range ends before it starts");
                }
                DateRange::Full { from, to }
            }
            _ => DateRange::Unparseable,
        };
    }

    match text.split_whitespace().find_map(parse_date) {
        Some(to) => DateRange::OpenStart { to },
        None => DateRange::Unparseable,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}
