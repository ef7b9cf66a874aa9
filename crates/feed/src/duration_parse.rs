// ABOUTME: Duration parsing for podcast episode lengths.
// ABOUTME: Supports raw seconds, MM:SS, and HH:MM:SS; anything else is 0.

/// A duration as it appears in a feed: either a number already in seconds or text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationValue<'a> {
    Seconds(u64),
    Text(&'a str),
}

impl From<u64> for DurationValue<'_> {
    fn from(secs: u64) -> Self {
        DurationValue::Seconds(secs)
    }
}

impl<'a> From<&'a str> for DurationValue<'a> {
    fn from(s: &'a str) -> Self {
        DurationValue::Text(s)
    }
}

/// Converts a duration into whole seconds.
///
/// - numbers are returned unchanged
/// - an all-digit string is a second count
/// - `MM:SS` and `HH:MM:SS` are expanded
///
/// Every other shape yields 0. This never fails.
pub fn parse_duration<'a>(value: impl Into<DurationValue<'a>>) -> u64 {
    match value.into() {
        DurationValue::Seconds(secs) => secs,
        DurationValue::Text(s) => parse_duration_seconds(s).unwrap_or(0),
    }
}

/// Parses a duration string into seconds, returning None if the shape is not recognized.
pub fn parse_duration_seconds(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<u64>().ok();
    }

    if s.contains(':') {
        return parse_colon_format(s);
    }

    None
}

fn parse_colon_format(s: &str) -> Option<u64> {
    let parts = s
        .split(':')
        .map(parse_segment)
        .collect::<Option<Vec<u64>>>()?;

    match parts.as_slice() {
        [mins, secs] => mins.checked_mul(60)?.checked_add(*secs),
        [hours, mins, secs] => hours
            .checked_mul(3600)?
            .checked_add(mins.checked_mul(60)?)?
            .checked_add(*secs),
        _ => None,
    }
}

fn parse_segment(part: &str) -> Option<u64> {
    let part = part.trim();
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
