//! Spaced repetition scheduling for saved words
//!
//! The scheduler is pure: given a word's current rank and a review outcome it
//! returns the new rank, interval and due time. Persisting the result is the
//! word store's job.

pub mod algorithm;

pub use algorithm::{
    calculate_next_review, calculate_next_review_at, format_interval, initialize_review_params,
    initialize_review_params_at, preview_intervals, truncate_to_millis, ReviewOutcome,
    ReviewParams, DAY_MS, DEFAULT_EASE_FACTOR, INTERVAL_LADDER, LAST_INDEX,
};
