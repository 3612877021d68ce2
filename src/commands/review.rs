//! Review handlers

use chrono::Utc;

use crate::protocol::{GetDueCount, GetDueWords, GetReviewStats, ReviewWord};
use crate::words::{ReviewStats, WordRecord};
use crate::BackgroundState;

use super::CommandResult;

/// Words due now, oldest due first
pub fn get_due_words(state: &mut BackgroundState, _: GetDueWords) -> CommandResult<Vec<WordRecord>> {
    Ok(state.words.get_due(Utc::now()))
}

pub fn get_due_count(state: &mut BackgroundState, _: GetDueCount) -> CommandResult<usize> {
    Ok(state.words.due_count(Utc::now()))
}

/// Record a review outcome for a word
pub fn review_word(state: &mut BackgroundState, command: ReviewWord) -> CommandResult<bool> {
    state
        .words
        .apply_review(command.word_id, command.result, Utc::now())?;
    Ok(true)
}

pub fn get_review_stats(state: &mut BackgroundState, _: GetReviewStats) -> CommandResult<ReviewStats> {
    Ok(state.words.review_stats(Utc::now()))
}
