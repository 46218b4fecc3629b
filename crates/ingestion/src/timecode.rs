//! `HH:MM:SS[.fff]` timecode parsing

/// Parse a formatted timecode into milliseconds
///
/// Minutes and seconds must be below 60; hours are unbounded.
pub fn parse_timecode(value: &str) -> Option<f64> {
    let mut parts = value.trim().split(':');
    let hours: u64 = parts.next()?.trim().parse().ok()?;
    let minutes: u64 = parts.next()?.trim().parse().ok()?;
    let seconds: f64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if minutes >= 60 || !seconds.is_finite() || !(0.0..60.0).contains(&seconds) {
        return None;
    }

    let whole_minutes = hours.checked_mul(60)?.checked_add(minutes)?;
    let whole_seconds = whole_minutes.checked_mul(60)? as f64 + seconds;
    Some(whole_seconds * 1000.0)
}
