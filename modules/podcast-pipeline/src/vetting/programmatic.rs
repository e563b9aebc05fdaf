use chrono::{DateTime, Utc};

use leadgen_common::EnrichedProfile;

/// `recency_max_days` threshold from spec §4.7 (the original's constant of
/// the same name).
pub const RECENCY_MAX_DAYS: i64 = 120;

/// Outcome of the programmatic consistency check (spec §4.7): a pure
/// function of profile fields, scoring recency and publishing frequency
/// independently and requiring both to clear 0.5 to pass.
pub struct ConsistencyResult {
    pub passed: bool,
    pub reason: String,
    pub days_since_last_episode: Option<i64>,
    pub average_frequency_days: Option<f64>,
    pub recency_score: f64,
    pub frequency_score: f64,
}

pub fn check_consistency(profile: &EnrichedProfile, now: DateTime<Utc>) -> ConsistencyResult {
    let (recency_score, days_since_last_episode, recency_note) = score_recency(profile, now);
    let (frequency_score, average_frequency_days, frequency_note) = score_frequency(profile);

    let passed = recency_score >= 0.5 && frequency_score >= 0.5;
    let reason = format!("{recency_note} {frequency_note}");

    ConsistencyResult {
        passed,
        reason,
        days_since_last_episode,
        average_frequency_days,
        recency_score,
        frequency_score,
    }
}

fn score_recency(profile: &EnrichedProfile, now: DateTime<Utc>) -> (f64, Option<i64>, String) {
    let Some(latest) = profile.latest_episode_date else {
        return (0.0, None, "No episode date available.".to_string());
    };
    let days = (now - latest).num_days().max(0);
    let score = if days <= RECENCY_MAX_DAYS / 2 {
        1.0
    } else if days <= RECENCY_MAX_DAYS {
        0.6
    } else if days <= (RECENCY_MAX_DAYS * 3) / 2 {
        0.3
    } else {
        0.1
    };
    (score, Some(days), format!("Last episode {days} days ago."))
}

fn score_frequency(profile: &EnrichedProfile) -> (f64, Option<f64>, String) {
    if let Some(precomputed) = profile.publishing_frequency_days {
        return (frequency_band(precomputed), Some(precomputed), format!(
            "Publishes roughly every {precomputed:.1} days."
        ));
    }

    let total = profile.total_episodes.unwrap_or(0);

    if total >= 5 {
        if let (Some(first), Some(last)) = (profile.first_episode_date, profile.latest_episode_date) {
            let span_days = (last - first).num_days().max(0) as f64;
            let avg = span_days / (total - 1) as f64;
            return (frequency_band(avg), Some(avg), format!(
                "Publishes roughly every {avg:.1} days across {total} episodes."
            ));
        }
    }

    if total == 0 {
        return (0.0, None, "No episodes recorded.".to_string());
    }

    (0.1, None, "Insufficient data to determine publishing frequency.".to_string())
}

fn frequency_band(avg_days: f64) -> f64 {
    if avg_days <= 30.0 {
        1.0
    } else if avg_days <= 60.0 {
        0.7
    } else {
        0.3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn profile_with(
        latest: Option<DateTime<Utc>>,
        first: Option<DateTime<Utc>>,
        total_episodes: Option<i64>,
        precomputed_freq: Option<f64>,
    ) -> EnrichedProfile {
        EnrichedProfile {
            latest_episode_date: latest,
            first_episode_date: first,
            total_episodes,
            publishing_frequency_days: precomputed_freq,
            ..Default::default()
        }
    }

    #[test]
    fn recent_episode_and_tight_cadence_passes() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let latest = now - chrono::Duration::days(10);
        let first = now - chrono::Duration::days(400);
        let profile = profile_with(Some(latest), Some(first), Some(20), None);
        let result = check_consistency(&profile, now);
        assert!(result.passed);
        assert_eq!(result.days_since_last_episode, Some(10));
    }

    #[test]
    fn stale_episode_fails_recency() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let latest = now - chrono::Duration::days(365);
        let profile = profile_with(Some(latest), None, Some(20), None);
        let result = check_consistency(&profile, now);
        assert!(!result.passed);
    }

    #[test]
    fn sub_five_episode_count_yields_low_frequency_score() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let latest = now - chrono::Duration::days(5);
        let profile = profile_with(Some(latest), None, Some(1), None);
        let result = check_consistency(&profile, now);
        assert!(result.frequency_score <= 0.1);
    }

    #[test]
    fn no_episodes_fails_both_factors() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let profile = profile_with(None, None, Some(0), None);
        let result = check_consistency(&profile, now);
        assert!(!result.passed);
        assert_eq!(result.frequency_score, 0.0);
    }
}
