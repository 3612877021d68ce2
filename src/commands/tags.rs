//! Tag management handlers

use chrono::Utc;

use crate::protocol::{AddWordTags, CreateTag, DeleteTag, GetTags, SetWordTags, UpdateTag};
use crate::words::Tag;
use crate::BackgroundState;

use super::CommandResult;

pub fn get_tags(state: &mut BackgroundState, _: GetTags) -> CommandResult<Vec<Tag>> {
    Ok(state.words.list_tags())
}

pub fn create_tag(state: &mut BackgroundState, command: CreateTag) -> CommandResult<Tag> {
    state
        .words
        .create_tag(&command.name, &command.color, Utc::now())
        .map_err(Into::into)
}

pub fn update_tag(state: &mut BackgroundState, command: UpdateTag) -> CommandResult<Tag> {
    state
        .words
        .update_tag(command.id, command.name.as_deref(), command.color.as_deref())
        .map_err(Into::into)
}

/// Delete a tag, detaching it from every word first
pub fn delete_tag(state: &mut BackgroundState, command: DeleteTag) -> CommandResult<bool> {
    state.words.delete_tag(command.id)?;
    Ok(true)
}

pub fn set_word_tags(state: &mut BackgroundState, command: SetWordTags) -> CommandResult<bool> {
    state.words.set_word_tags(command.word_id, command.tag_ids)?;
    Ok(true)
}

/// Merge tags into a word. Read and write happen in this one call.
pub fn add_word_tags(state: &mut BackgroundState, command: AddWordTags) -> CommandResult<bool> {
    state.words.add_word_tags(command.word_id, command.tag_ids)?;
    Ok(true)
}
