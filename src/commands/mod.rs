//! Background context handlers, one per message type

mod review;
mod settings;
mod tags;
mod words;

pub use review::*;
pub use settings::*;
pub use tags::*;
pub use words::*;

use crate::protocol::{CommandError, DispatchError, Dispatcher};
use crate::BackgroundState;

pub type CommandResult<T> = Result<T, CommandError>;

/// Register every handler the background context serves
pub fn register_all(dispatcher: &mut Dispatcher<BackgroundState>) -> Result<(), DispatchError> {
    dispatcher
        // Word commands
        .register(get_words)?
        .register(get_word)?
        .register(save_word)?
        .register(update_word)?
        .register(delete_word)?
        // Review commands
        .register(get_due_words)?
        .register(get_due_count)?
        .register(review_word)?
        .register(get_review_stats)?
        // Tag commands
        .register(get_tags)?
        .register(create_tag)?
        .register(update_tag)?
        .register(delete_tag)?
        .register(set_word_tags)?
        .register(add_word_tags)?
        // Settings commands
        .register(get_settings)?
        .register(update_settings)?;
    Ok(())
}

/// A dispatcher with every background handler registered
pub fn background_dispatcher() -> Result<Dispatcher<BackgroundState>, DispatchError> {
    let mut dispatcher = Dispatcher::new();
    register_all(&mut dispatcher)?;
    Ok(dispatcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::*;
    use crate::review::ReviewOutcome;
    use crate::words::{NewWord, WordUpdate};
    use serde::de::DeserializeOwned;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn setup() -> (Dispatcher<BackgroundState>, BackgroundState, TempDir) {
        let temp = TempDir::new().unwrap();
        let state = BackgroundState::open(temp.path().to_path_buf()).unwrap();
        (background_dispatcher().unwrap(), state, temp)
    }

    fn call<C: Command>(
        dispatcher: &Dispatcher<BackgroundState>,
        state: &mut BackgroundState,
        command: C,
    ) -> Response<C::Output>
    where
        C::Output: DeserializeOwned,
    {
        let raw = serde_json::to_string(&Envelope::for_command(&command).unwrap()).unwrap();
        serde_json::from_str(&dispatcher.dispatch(state, &raw)).unwrap()
    }

    #[test]
    fn test_every_message_type_has_a_handler() {
        let dispatcher = background_dispatcher().unwrap();
        assert!(dispatcher.missing().is_empty());
    }

    #[test]
    fn test_register_all_twice_fails() {
        let mut dispatcher = background_dispatcher().unwrap();
        assert!(matches!(
            register_all(&mut dispatcher),
            Err(DispatchError::AlreadyRegistered(MessageType::GetWords))
        ));
    }

    #[test]
    fn test_save_review_and_delete_flow() {
        let (dispatcher, mut state, _temp) = setup();

        let word = call(&dispatcher, &mut state, SaveWord(NewWord::new("quixotic")))
            .into_result()
            .unwrap();
        assert_eq!(word.interval, 1);

        let reviewed = call(
            &dispatcher,
            &mut state,
            ReviewWord {
                word_id: word.id,
                result: ReviewOutcome::Remembered,
            },
        );
        assert_eq!(reviewed, Response::Success(true));

        let fetched = call(&dispatcher, &mut state, GetWord { id: word.id })
            .into_result()
            .unwrap();
        assert_eq!(fetched.review_count, 1);
        assert_eq!(fetched.interval, 3);

        assert_eq!(
            call(&dispatcher, &mut state, DeleteWord { id: word.id }),
            Response::Success(true)
        );
        let remaining = call(&dispatcher, &mut state, GetWords::all()).into_result().unwrap();
        assert!(remaining.iter().all(|w| w.id != word.id));

        let again = call(&dispatcher, &mut state, DeleteWord { id: word.id });
        assert_eq!(again.into_result().unwrap_err().code, ErrorCode::NotFound);
    }

    #[test]
    fn test_new_word_is_not_due_yet() {
        let (dispatcher, mut state, _temp) = setup();
        call(&dispatcher, &mut state, SaveWord(NewWord::new("later")));

        assert_eq!(call(&dispatcher, &mut state, GetDueCount), Response::Success(0));
        assert_eq!(
            call(&dispatcher, &mut state, GetDueWords),
            Response::Success(Vec::new())
        );
    }

    #[test]
    fn test_review_missing_word_is_not_found() {
        let (dispatcher, mut state, _temp) = setup();
        let response = call(
            &dispatcher,
            &mut state,
            ReviewWord {
                word_id: Uuid::new_v4(),
                result: ReviewOutcome::Forgotten,
            },
        );
        assert_eq!(response.into_result().unwrap_err().code, ErrorCode::NotFound);
    }

    #[test]
    fn test_update_word_rejects_schedule_fields_on_the_wire() {
        let (dispatcher, mut state, _temp) = setup();
        let word = call(&dispatcher, &mut state, SaveWord(NewWord::new("fixed")))
            .into_result()
            .unwrap();

        let raw = serde_json::json!({
            "type": "UPDATE_WORD",
            "payload": { "id": word.id, "updates": { "nextReviewAt": 0 } }
        })
        .to_string();
        let response: Response<bool> =
            serde_json::from_str(&dispatcher.dispatch(&mut state, &raw)).unwrap();
        assert_eq!(
            response.into_result().unwrap_err().code,
            ErrorCode::ValidationError
        );

        let ok = call(
            &dispatcher,
            &mut state,
            UpdateWord {
                id: word.id,
                updates: WordUpdate {
                    example: Some("The price is fixed.".to_string()),
                    ..Default::default()
                },
            },
        );
        assert_eq!(ok, Response::Success(true));
    }

    #[test]
    fn test_tag_commands() {
        let (dispatcher, mut state, _temp) = setup();

        let invalid = call(
            &dispatcher,
            &mut state,
            CreateTag {
                name: "colors".to_string(),
                color: "blue".to_string(),
            },
        );
        assert_eq!(
            invalid.into_result().unwrap_err().code,
            ErrorCode::ValidationError
        );

        let tag = call(
            &dispatcher,
            &mut state,
            CreateTag {
                name: "colors".to_string(),
                color: "#00f".to_string(),
            },
        )
        .into_result()
        .unwrap();
        assert_eq!(tag.color, "#0000ff");

        let word = call(&dispatcher, &mut state, SaveWord(NewWord::new("cerulean")))
            .into_result()
            .unwrap();
        let added = call(
            &dispatcher,
            &mut state,
            AddWordTags {
                word_id: word.id,
                tag_ids: [tag.id].into_iter().collect(),
            },
        );
        assert_eq!(added, Response::Success(true));

        assert_eq!(
            call(&dispatcher, &mut state, DeleteTag { id: tag.id }),
            Response::Success(true)
        );
        let word = call(&dispatcher, &mut state, GetWord { id: word.id })
            .into_result()
            .unwrap();
        assert!(word.tag_ids.is_empty());
    }

    #[test]
    fn test_settings_commands() {
        let (dispatcher, mut state, _temp) = setup();
        let settings = call(&dispatcher, &mut state, GetSettings).into_result().unwrap();
        assert_eq!(settings.language, "en");

        let updated = call(
            &dispatcher,
            &mut state,
            UpdateSettings(crate::settings::SettingsUpdate {
                language: Some("fr".to_string()),
                ..Default::default()
            }),
        )
        .into_result()
        .unwrap();
        assert_eq!(updated.language, "fr");
    }
}
