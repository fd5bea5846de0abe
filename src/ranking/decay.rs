use chrono::{DateTime, Utc};

use crate::config::RankConfig;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Age of a timestamp in fractional days, clamped at zero
pub(crate) fn age_days(ts: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let seconds = (now - ts).num_milliseconds() as f64 / 1000.0;
    (seconds / SECONDS_PER_DAY).max(0.0)
}

/// Effective transition count after windowing or decay
///
/// Two mutually exclusive fast paths: a hard recency window when
/// `window_days` is set and no positive half-life is configured, otherwise
/// exponential half-life decay. With neither configured, counts pass
/// through undecayed.
pub(crate) fn effective_count(
    count: f64,
    last_updated: DateTime<Utc>,
    now: DateTime<Utc>,
    config: &RankConfig,
) -> f64 {
    let age = age_days(last_updated, now);

    if config.window_days > 0.0 && !(config.decay_half_life_days > 0.0) {
        if age <= config.window_days {
            count
        } else {
            0.0
        }
    } else if config.decay_half_life_days > 0.0 {
        count * 0.5_f64.powf(age / config.decay_half_life_days)
    } else {
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn config(half_life: f64, window: f64) -> RankConfig {
        RankConfig {
            decay_half_life_days: half_life,
            window_days: window,
            ..RankConfig::default()
        }
    }

    #[test]
    fn test_age_days_fractional() {
        let age = age_days(now() - Duration::hours(12), now());
        assert!((age - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_age_days_clamps_future_timestamps() {
        let age = age_days(now() + Duration::days(3), now());
        assert_eq!(age, 0.0);
    }

    #[test]
    fn test_window_mode_keeps_recent_counts_whole() {
        let config = config(0.0, 7.0);
        let effective = effective_count(5.0, now() - Duration::days(6), now(), &config);
        assert_eq!(effective, 5.0);
    }

    #[test]
    fn test_window_mode_zeroes_stale_counts() {
        let config = config(0.0, 7.0);
        let effective = effective_count(5.0, now() - Duration::days(8), now(), &config);
        assert_eq!(effective, 0.0);
    }

    #[test]
    fn test_decay_halves_at_half_life() {
        let config = config(7.0, 0.0);
        let effective = effective_count(8.0, now() - Duration::days(7), now(), &config);
        assert!((effective - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_decay_mode_wins_over_window() {
        // A positive half-life disables the hard window entirely.
        let config = config(7.0, 7.0);
        let effective = effective_count(8.0, now() - Duration::days(14), now(), &config);
        assert!((effective - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_decay_at_age_zero() {
        let config = config(7.0, 0.0);
        let effective = effective_count(5.0, now(), now(), &config);
        assert!((effective - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_counts_pass_through_when_both_unset() {
        let config = config(0.0, 0.0);
        let effective = effective_count(5.0, now() - Duration::days(365), now(), &config);
        assert_eq!(effective, 5.0);
    }
}
