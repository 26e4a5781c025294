use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Parses a publication date with the site's formats
///
/// Formats are chrono `strftime` patterns tried in order, first against the
/// whole text and then against the part after the last `-`, which is where
/// listings like "Opinions - 12.05.2024" keep the date. Date-only formats
/// produce midnight. RFC 3339 (as found in `<time datetime>` and
/// `article:published_time`) is always accepted and converted to local
/// wall-clock time of the source.
///
/// # Examples
///
/// ```
/// use kiosque::adapter::parse_date;
///
/// let formats = vec!["%d.%m.%Y".to_string()];
/// let parsed = parse_date("Opinions - 12.05.2024", &formats).unwrap();
/// assert_eq!(parsed.to_string(), "2024-05-12 00:00:00");
/// ```
pub fn parse_date(text: &str, formats: &[String]) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut candidates = vec![text];
    if let Some((_, tail)) = text.rsplit_once('-') {
        let tail = tail.trim();
        if !tail.is_empty() {
            candidates.push(tail);
        }
    }

    for candidate in candidates {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(candidate) {
            return Some(parsed.naive_local());
        }

        for format in formats {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(candidate, format) {
                return Some(parsed);
            }
            if let Ok(parsed) = NaiveDate::parse_from_str(candidate, format) {
                return parsed.and_hms_opt(0, 0, 0);
            }
        }
    }

    None
}
