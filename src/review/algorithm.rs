//! Interval-ladder spaced repetition
//!
//! A word climbs a fixed ladder of review intervals each time it is
//! remembered and drops back to the bottom rung when it is forgotten.
//!
//! Ladder (days), by rank:
//! - 0: 1
//! - 1: 3
//! - 2: 7
//! - 3: 15
//! - 4: 30
//! - 5: 60
//! - 6: 120 (ceiling)

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Review intervals in days, indexed by review rank
pub const INTERVAL_LADDER: [u32; 7] = [1, 3, 7, 15, 30, 60, 120];

/// Highest reachable rank
pub const LAST_INDEX: u32 = (INTERVAL_LADDER.len() - 1) as u32;

/// One day in milliseconds
pub const DAY_MS: i64 = 86_400_000;

/// Reserved multiplier, stored on every word but not used by the ladder
pub const DEFAULT_EASE_FACTOR: f32 = 2.5;

/// What happened when the user reviewed a word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewOutcome {
    Remembered,
    Forgotten,
}

impl std::str::FromStr for ReviewOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remembered" | "r" | "yes" => Ok(Self::Remembered),
            "forgotten" | "f" | "no" => Ok(Self::Forgotten),
            other => Err(format!("unknown review outcome '{}'", other)),
        }
    }
}

/// Schedule fields produced by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewParams {
    pub review_count: u32,
    /// Days until the next review
    pub interval: u32,
    pub next_review_at: DateTime<Utc>,
}

fn interval_for(rank: u32) -> u32 {
    INTERVAL_LADDER[rank.min(LAST_INDEX) as usize]
}

/// Drop sub-millisecond precision, which the stored form cannot carry
pub fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    at.trunc_subsecs(3)
}

fn due_after(now: DateTime<Utc>, interval: u32) -> DateTime<Utc> {
    truncate_to_millis(now) + Duration::milliseconds(interval as i64 * DAY_MS)
}

/// Compute the next schedule for a word at `now`.
///
/// Negative counts are treated as 0 and counts past the ladder clamp to the
/// ceiling, so any input is accepted.
pub fn calculate_next_review_at(
    current_review_count: i64,
    outcome: ReviewOutcome,
    now: DateTime<Utc>,
) -> ReviewParams {
    let current = current_review_count.clamp(0, LAST_INDEX as i64) as u32;

    let review_count = match outcome {
        ReviewOutcome::Remembered => (current + 1).min(LAST_INDEX),
        ReviewOutcome::Forgotten => 0,
    };
    let interval = interval_for(review_count);

    ReviewParams {
        review_count,
        interval,
        next_review_at: due_after(now, interval),
    }
}

/// Same as [`calculate_next_review_at`], reading the clock once
pub fn calculate_next_review(current_review_count: i64, outcome: ReviewOutcome) -> ReviewParams {
    calculate_next_review_at(current_review_count, outcome, Utc::now())
}

/// Schedule for a freshly saved word
pub fn initialize_review_params_at(now: DateTime<Utc>) -> ReviewParams {
    let interval = interval_for(0);
    ReviewParams {
        review_count: 0,
        interval,
        next_review_at: due_after(now, interval),
    }
}

pub fn initialize_review_params() -> ReviewParams {
    initialize_review_params_at(Utc::now())
}

/// Intervals each outcome would give, as `[forgotten, remembered]`
pub fn preview_intervals(current_review_count: i64) -> [u32; 2] {
    let now = Utc::now();
    [
        calculate_next_review_at(current_review_count, ReviewOutcome::Forgotten, now).interval,
        calculate_next_review_at(current_review_count, ReviewOutcome::Remembered, now).interval,
    ]
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: i64) -> String {
    if days <= 0 {
        "now".to_string()
    } else if days < 7 {
        format!("{}d", days)
    } else if days < 30 {
        format!("{}w", days / 7)
    } else if days < 365 {
        format!("{}mo", days / 30)
    } else {
        format!("{}y", days / 365)
    }
}
