use chrono::{DateTime, Local, Utc};

use wordnest_lib::review::{format_interval, preview_intervals};
use wordnest_lib::words::{Tag, WordRecord};

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const ITALIC: &str = "\x1b[3m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap `text` in a color when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

pub fn format_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// Days from now until `at`, rounded up; zero or less means due
pub fn days_until(at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (at - now).num_milliseconds();
    if ms <= 0 {
        0
    } else {
        (ms + wordnest_lib::review::DAY_MS - 1) / wordnest_lib::review::DAY_MS
    }
}

/// "due" once the review time has passed, otherwise "in 3d" and similar
pub fn due_label(next_review_at: DateTime<Utc>, now: DateTime<Utc>, use_color: bool) -> String {
    match days_until(next_review_at, now) {
        0 => paint("due", Color::YELLOW, use_color),
        days => paint(&format!("in {}", format_interval(days)), Color::GRAY, use_color),
    }
}

/// One-line summary used in listings
pub fn word_line(word: &WordRecord, now: DateTime<Utc>, use_color: bool) -> String {
    let when = due_label(word.next_review_at, now, use_color);

    let meaning = if word.meaning.is_empty() {
        String::new()
    } else {
        format!("  {}", truncate(&word.meaning, 50))
    };

    format!("{}{}  [{}]", paint(&word.text, Color::BOLD, use_color), meaning, when)
}

/// Full card for a single word
pub fn word_card(word: &WordRecord, tags: &[Tag], now: DateTime<Utc>, use_color: bool) -> Vec<String> {
    let mut lines = Vec::new();

    let mut heading = paint(&word.text, Color::BOLD, use_color);
    if !word.pronunciation.is_empty() {
        heading.push_str(&format!("  /{}/", word.pronunciation));
    }
    if !word.part_of_speech.is_empty() {
        heading.push_str(&format!(
            "  {}",
            paint(&word.part_of_speech, Color::ITALIC, use_color)
        ));
    }
    lines.push(heading);

    if !word.meaning.is_empty() {
        lines.extend(wrap_lines(&word.meaning, "  ", 80));
    }
    if !word.example.is_empty() {
        let example = format!("\"{}\"", word.example);
        lines.extend(
            wrap_lines(&example, "  ", 80)
                .into_iter()
                .map(|l| paint(&l, Color::DIM, use_color)),
        );
    }

    lines.push(String::new());

    let tag_names: Vec<&str> = tags
        .iter()
        .filter(|t| word.tag_ids.contains(&t.id))
        .map(|t| t.name.as_str())
        .collect();
    if !tag_names.is_empty() {
        lines.push(format!("Tags:     {}", paint(&tag_names.join(", "), Color::CYAN, use_color)));
    }
    if !word.source_url.is_empty() {
        let title = if word.source_title.is_empty() {
            word.source_url.clone()
        } else {
            format!("{} ({})", word.source_title, word.source_url)
        };
        lines.push(format!("Source:   {}", title));
    }
    lines.push(format!("Added:    {}", format_date(word.created_at)));
    lines.push(format!(
        "Review:   #{} every {}, next {} ({})",
        word.review_count,
        format_interval(word.interval as i64),
        format_date(word.next_review_at),
        due_label(word.next_review_at, now, use_color)
    ));

    let [forgot, remembered] = preview_intervals(word.review_count as i64);
    lines.push(format!(
        "Next:     {} if forgotten, {} if remembered",
        paint(&format_interval(forgot as i64), Color::RED, use_color),
        paint(&format_interval(remembered as i64), Color::GREEN, use_color),
    ));

    lines.push(paint(&format!("Id:       {}", word.id), Color::GRAY, use_color));
    lines
}

pub fn tag_line(tag: &Tag, word_count: usize, use_color: bool) -> String {
    format!(
        "{}  {}  ({} words)",
        paint(&tag.color, Color::GRAY, use_color),
        paint(&tag.name, Color::BOLD, use_color),
        word_count
    )
}

fn truncate(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or("");
    if first_line.chars().count() <= max_chars {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}\u{2026}", cut)
    }
}

fn wrap_lines(text: &str, prefix: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let effective_width = max_width.saturating_sub(prefix.len());

    for line in text.lines() {
        if line.chars().count() <= effective_width {
            lines.push(format!("{}{}", prefix, line));
            continue;
        }

        let mut current_line = String::new();
        for word in line.split_whitespace() {
            if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_line.chars().count() + 1 + word.chars().count() <= effective_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                lines.push(format!("{}{}", prefix, current_line));
                current_line = word.to_string();
            }
        }
        if !current_line.is_empty() {
            lines.push(format!("{}{}", prefix, current_line));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_days_until_rounds_up() {
        let now = Utc::now();
        assert_eq!(days_until(now - Duration::hours(1), now), 0);
        assert_eq!(days_until(now + Duration::hours(1), now), 1);
        assert_eq!(days_until(now + Duration::days(3), now), 3);
    }

    #[test]
    fn test_card_shows_due_state() {
        use wordnest_lib::review::initialize_review_params_at;
        use wordnest_lib::words::NewWord;

        let created = Utc::now() - Duration::days(10);
        let word = WordRecord::new(
            NewWord::new("overdue"),
            initialize_review_params_at(created),
            created,
        );

        let card = word_card(&word, &[], Utc::now(), false);
        assert!(card.iter().any(|l| l.starts_with("Review:") && l.ends_with("(due)")));

        let card = word_card(&word, &[], created, false);
        assert!(card.iter().any(|l| l.starts_with("Review:") && l.ends_with("(in 1d)")));
    }

    #[test]
    fn test_wrap_lines() {
        let lines = wrap_lines("one two three four", "> ", 12);
        assert_eq!(lines, vec!["> one two", "> three four"]);
    }

    #[test]
    fn test_truncate_uses_first_line() {
        assert_eq!(truncate("short\nsecond", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 5), "abcd\u{2026}");
    }
}
