//! Arrival-rate fps derivation.

use std::time::Instant;

/// Rounds to one decimal place.
#[inline]
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Instantaneous fps from the gap between two frame arrivals.
///
/// Returns `None` when there is no previous frame or the gap is under one
/// millisecond.
#[must_use]
pub fn arrival_fps(previous: Option<Instant>, now: Instant) -> Option<f64> {
    let previous = previous?;
    let gap_ms = now.checked_duration_since(previous)?.as_millis();
    if gap_ms == 0 {
        return None;
    }
    Some(round1(1000.0 / gap_ms as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    #[test]
    fn test_round1() {
        assert_eq!(round1(15.249), 15.2);
        assert_eq!(round1(15.25), 15.3);
        assert_eq!(round1(0.0), 0.0);
    }

    #[test]
    fn test_first_frame_has_no_rate() {
        assert_eq!(arrival_fps(None, Instant::now()), None);
    }

    #[test]
    fn test_rate_from_gap() {
        let t0 = Instant::now();
        assert_eq!(arrival_fps(Some(t0), t0 + Duration::from_millis(100)), Some(10.0));
        assert_eq!(arrival_fps(Some(t0), t0 + Duration::from_millis(33)), Some(30.3));
    }

    #[test]
    fn test_zero_gap_is_ignored() {
        let t0 = Instant::now();
        assert_eq!(arrival_fps(Some(t0), t0), None);
        assert_eq!(arrival_fps(Some(t0 + Duration::from_millis(5)), t0), None);
    }
}
