use anyhow::Result;
use chrono::Utc;

use wordnest_lib::protocol::{DeleteWord, GetTags, SaveWord, UpdateWord};
use wordnest_lib::ui::SearchController;
use wordnest_lib::words::{NewWord, WordUpdate};

use crate::app::App;
use crate::render::terminal::{word_card, word_line};
use crate::OutputFormat;

pub struct NewWordArgs {
    pub text: String,
    pub meaning: Option<String>,
    pub pronunciation: Option<String>,
    pub part_of_speech: Option<String>,
    pub example: Option<String>,
    pub source_url: Option<String>,
    pub source_title: Option<String>,
    /// Comma-separated tag names
    pub tags: Option<String>,
}

pub async fn run_add(app: &App, args: NewWordArgs, format: &OutputFormat, use_color: bool) -> Result<()> {
    let tag_keys: Vec<String> = args
        .tags
        .as_deref()
        .map(|t| {
            t.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();
    let tags = app.find_tags(&tag_keys).await?;

    let new_word = NewWord {
        text: args.text,
        meaning: args.meaning.unwrap_or_default(),
        pronunciation: args.pronunciation.unwrap_or_default(),
        part_of_speech: args.part_of_speech.unwrap_or_default(),
        example: args.example.unwrap_or_default(),
        source_url: args.source_url.unwrap_or_default(),
        source_title: args.source_title.unwrap_or_default(),
        anchor: None,
        tag_ids: tags.iter().map(|t| t.id).collect(),
    };

    let word = app.send(SaveWord(new_word)).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&word)?),
        OutputFormat::Plain => {
            for line in word_card(&word, &tags, Utc::now(), use_color) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

/// List words through the same debounced controller UI surfaces use, forcing
/// the search to run immediately
pub async fn run_list(app: &App, search: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let controller = SearchController::new(app.client(), app.config.search_debounce());
    controller.set_query(search.unwrap_or_default());
    controller.search_now().await?;

    let view = controller.view();
    if let Some(error) = view.error {
        anyhow::bail!("Search failed: {}", error);
    }

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "query": view.query,
                "matchCount": view.match_count,
                "totalCount": view.total_count,
                "words": view.results,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if view.results.is_empty() {
                println!("No words found.");
                return Ok(());
            }

            let now = Utc::now();
            for word in &view.results {
                println!("{}", word_line(word, now, use_color));
            }

            if view.query.trim().is_empty() {
                println!("\n{} words", view.total_count);
            } else {
                println!("\n{} of {} words match '{}'", view.match_count, view.total_count, view.query);
            }
        }
    }
    Ok(())
}

pub async fn run_show(app: &App, key: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let word = app.find_word(key).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&word)?),
        OutputFormat::Plain => {
            let tags = app.send(GetTags).await?;
            for line in word_card(&word, &tags, Utc::now(), use_color) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

pub async fn run_update(
    app: &App,
    key: &str,
    updates: WordUpdate,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    if updates.is_empty() {
        anyhow::bail!("Nothing to update; pass at least one field");
    }

    let word = app.find_word(key).await?;
    app.send(UpdateWord { id: word.id, updates }).await?;
    run_show(app, &word.id.to_string(), format, use_color).await
}

pub async fn run_delete(app: &App, key: &str, format: &OutputFormat) -> Result<()> {
    let word = app.find_word(key).await?;
    app.send(DeleteWord { id: word.id }).await?;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "deleted": word.id, "text": word.text })
        ),
        OutputFormat::Plain => println!("Deleted '{}'", word.text),
    }
    Ok(())
}
