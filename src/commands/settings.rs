use crate::protocol::{GetSettings, UpdateSettings};
use crate::settings::Settings;
use crate::BackgroundState;

use super::CommandResult;

pub fn get_settings(state: &mut BackgroundState, _: GetSettings) -> CommandResult<Settings> {
    Ok(state.settings.get().clone())
}

pub fn update_settings(state: &mut BackgroundState, command: UpdateSettings) -> CommandResult<Settings> {
    state.settings.update(command.0).map_err(Into::into)
}
