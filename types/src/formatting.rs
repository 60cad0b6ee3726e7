//! Centralized number formatting utilities.
//!
//! All numeric display formatting goes through this module so the app
//! shell and reports render values consistently.

/// Format a PED value with two decimals and unit suffix.
///
/// # Examples
/// ```
/// use artemis_types::formatting::format_ped;
/// assert_eq!(format_ped(2.4), "2.40 PED");
/// assert_eq!(format_ped(0.0123), "0.01 PED");
/// ```
pub fn format_ped(value: f64) -> String {
    format!("{value:.2} PED")
}

/// Format a 0–1 ratio as a percentage with one decimal.
///
/// # Examples
/// ```
/// use artemis_types::formatting::format_percent;
/// assert_eq!(format_percent(0.7), "70.0%");
/// assert_eq!(format_percent(1.0), "100.0%");
/// ```
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// Format a distance in game-world units, switching to kilometers for
/// large values.
///
/// # Examples
/// ```
/// use artemis_types::formatting::format_distance;
/// assert_eq!(format_distance(269.4), "269m");
/// assert_eq!(format_distance(4820.0), "4.8km");
/// ```
pub fn format_distance(units: f64) -> String {
    if units >= 1000.0 {
        format!("{:.1}km", units / 1000.0)
    } else {
        format!("{}m", units.round() as i64)
    }
}

/// Format a millisecond duration as `MM:SS` (or `H:MM:SS` past an hour).
pub fn format_duration_ms(ms: i64) -> String {
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    if hours > 0 {
        format!("{hours}:{mins:02}:{secs:02}")
    } else {
        format!("{mins:02}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_formats() {
        assert_eq!(format_duration_ms(0), "00:00");
        assert_eq!(format_duration_ms(83_000), "01:23");
        assert_eq!(format_duration_ms(3_723_000), "1:02:03");
    }
}
