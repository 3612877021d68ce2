use anyhow::Result;
use chrono::Utc;

use wordnest_lib::protocol::{GetDueWords, GetReviewStats, GetWord, ReviewWord};
use wordnest_lib::review::{format_interval, preview_intervals, ReviewOutcome};
use wordnest_lib::ui::DueBadge;

use crate::app::App;
use crate::render::terminal::{days_until, format_date, paint, Color};
use crate::OutputFormat;

pub async fn run_due(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let words = app.send(GetDueWords).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&words)?),
        OutputFormat::Plain => {
            if words.is_empty() {
                println!("Nothing due. Come back later.");
                return Ok(());
            }

            for word in &words {
                let [forgot, remembered] = preview_intervals(word.review_count as i64);
                println!(
                    "{}  {}",
                    paint(&word.text, Color::BOLD, use_color),
                    paint(
                        &format!(
                            "[forgot: {} | remembered: {}]",
                            format_interval(forgot as i64),
                            format_interval(remembered as i64)
                        ),
                        Color::GRAY,
                        use_color
                    )
                );
            }
            println!("\n{} due", words.len());
        }
    }
    Ok(())
}

pub async fn run_review(
    app: &App,
    key: &str,
    outcome: ReviewOutcome,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let word = app.find_word(key).await?;
    app.send(ReviewWord {
        word_id: word.id,
        result: outcome,
    })
    .await?;
    let updated = app.send(GetWord { id: word.id }).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&updated)?),
        OutputFormat::Plain => {
            let verdict = match outcome {
                ReviewOutcome::Remembered => paint("remembered", Color::GREEN, use_color),
                ReviewOutcome::Forgotten => paint("forgotten", Color::RED, use_color),
            };
            let days = days_until(updated.next_review_at, Utc::now());
            println!(
                "'{}' {}; next review in {} ({})",
                updated.text,
                verdict,
                format_interval(days),
                format_date(updated.next_review_at)
            );
        }
    }
    Ok(())
}

pub async fn run_stats(app: &App, format: &OutputFormat) -> Result<()> {
    let stats = app.send(GetReviewStats).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Plain => {
            println!("Total:     {}", stats.total_words);
            println!("Due:       {}", stats.due_words);
            println!("New:       {}", stats.new_words);
            println!("Learning:  {}", stats.learning_words);
            println!("Mastered:  {}", stats.mastered_words);
        }
    }
    Ok(())
}

pub async fn run_badge(app: &App, format: &OutputFormat) -> Result<()> {
    let badge = DueBadge::mount(app.client()).await;

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "count": badge.count(), "label": badge.label() })
        ),
        OutputFormat::Plain => println!("{}", badge.label().unwrap_or_default()),
    }
    Ok(())
}
