use std::collections::BTreeSet;

use anyhow::Result;

use wordnest_lib::protocol::{
    AddWordTags, CreateTag, DeleteTag, GetTags, GetWords, SetWordTags, UpdateTag,
};

use crate::app::App;
use crate::render::terminal::tag_line;
use crate::OutputFormat;

pub async fn run_list(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let tags = app.send(GetTags).await?;
    let words = app.send(GetWords::all()).await?;

    let counted: Vec<_> = tags
        .iter()
        .map(|tag| {
            let count = words.iter().filter(|w| w.tag_ids.contains(&tag.id)).count();
            (tag, count)
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = counted
                .iter()
                .map(|(tag, count)| {
                    serde_json::json!({
                        "id": tag.id,
                        "name": tag.name,
                        "color": tag.color,
                        "wordCount": count,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if counted.is_empty() {
                println!("No tags found.");
                return Ok(());
            }
            for (tag, count) in &counted {
                println!("{}", tag_line(tag, *count, use_color));
            }
            println!("\n{} tags total", counted.len());
        }
    }
    Ok(())
}

pub async fn run_create(
    app: &App,
    name: &str,
    color: &str,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let tag = app
        .send(CreateTag {
            name: name.to_string(),
            color: color.to_string(),
        })
        .await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tag)?),
        OutputFormat::Plain => println!("Created {}", tag_line(&tag, 0, use_color)),
    }
    Ok(())
}

pub async fn run_update(
    app: &App,
    key: &str,
    name: Option<String>,
    color: Option<String>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    if name.is_none() && color.is_none() {
        anyhow::bail!("Nothing to update; pass --name or --color");
    }

    let tag = app.find_tag(key).await?;
    let tag = app.send(UpdateTag { id: tag.id, name, color }).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tag)?),
        OutputFormat::Plain => println!("Updated {}", tag_line(&tag, 0, use_color)),
    }
    Ok(())
}

pub async fn run_delete(app: &App, key: &str, format: &OutputFormat) -> Result<()> {
    let tag = app.find_tag(key).await?;
    app.send(DeleteTag { id: tag.id }).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "deleted": tag.id })),
        OutputFormat::Plain => println!("Deleted tag '{}'", tag.name),
    }
    Ok(())
}

/// Replace (`replace = true`) or extend a word's tags
pub async fn run_assign(
    app: &App,
    word_key: &str,
    tag_keys: &[String],
    replace: bool,
    format: &OutputFormat,
) -> Result<()> {
    let word = app.find_word(word_key).await?;
    let tags = app.find_tags(tag_keys).await?;
    let tag_ids: BTreeSet<_> = tags.iter().map(|t| t.id).collect();

    if replace {
        app.send(SetWordTags {
            word_id: word.id,
            tag_ids,
        })
        .await?;
    } else {
        app.send(AddWordTags {
            word_id: word.id,
            tag_ids,
        })
        .await?;
    }

    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "wordId": word.id, "tags": names, "replaced": replace })
        ),
        OutputFormat::Plain if replace && names.is_empty() => {
            println!("Cleared tags on '{}'", word.text)
        }
        OutputFormat::Plain if replace => {
            println!("Tags on '{}' set to {}", word.text, names.join(", "))
        }
        OutputFormat::Plain => println!("Added {} to '{}'", names.join(", "), word.text),
    }
    Ok(())
}
