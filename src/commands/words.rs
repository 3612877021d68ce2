//! Word handlers

use chrono::Utc;

use crate::protocol::{DeleteWord, GetWord, GetWords, SaveWord, UpdateWord};
use crate::words::WordRecord;
use crate::BackgroundState;

use super::CommandResult;

/// List words, filtered when a non-empty query is given
pub fn get_words(state: &mut BackgroundState, command: GetWords) -> CommandResult<Vec<WordRecord>> {
    Ok(state.words.get_all(command.search_query.as_deref()))
}

pub fn get_word(state: &mut BackgroundState, command: GetWord) -> CommandResult<WordRecord> {
    state.words.get(command.id).cloned().map_err(Into::into)
}

/// Save a newly captured word
pub fn save_word(state: &mut BackgroundState, command: SaveWord) -> CommandResult<WordRecord> {
    state
        .words
        .save_word(command.0, Utc::now())
        .map_err(Into::into)
}

/// Update a word's content fields
pub fn update_word(state: &mut BackgroundState, command: UpdateWord) -> CommandResult<bool> {
    state.words.update(command.id, command.updates)?;
    Ok(true)
}

pub fn delete_word(state: &mut BackgroundState, command: DeleteWord) -> CommandResult<bool> {
    state.words.delete(command.id)?;
    Ok(true)
}
