//! ISO-8601 duration parsing for `contentDetails.duration`

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// `P[nD][T[nH][nM][nS]]` with every component optional
static ISO_DURATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("Invalid ISO duration regex pattern")
});

const SECONDS_PER_DAY: u64 = 86_400;

/// Parse an ISO-8601 video duration into whole seconds.
///
/// Anything that does not match (including fractional seconds and year or
/// month designators) yields 0. Components too large for `u64` saturate.
pub fn parse_duration(value: &str) -> u64 {
    let Some(captures) = ISO_DURATION_REGEX.captures(value.trim()) else {
        debug!("Unparsable duration '{}', using 0", value);
        return 0;
    };

    let component = |index: usize| -> u64 {
        captures
            .get(index)
            // The regex only admits digits, so a failed parse is an overflow
            .map_or(0, |m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
    };

    component(1)
        .saturating_mul(SECONDS_PER_DAY)
        .saturating_add(component(2).saturating_mul(3600))
        .saturating_add(component(3).saturating_mul(60))
        .saturating_add(component(4))
}
