mod app;
mod commands;
mod render;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use wordnest_lib::review::ReviewOutcome;
use wordnest_lib::settings::Theme;

#[derive(Parser)]
#[command(name = "wordnest-cli", about = "Wordnest vocabulary CLI", version)]
struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Save a new word
    Add {
        text: String,
        #[arg(long)]
        meaning: Option<String>,
        #[arg(long)]
        pronunciation: Option<String>,
        /// Part of speech
        #[arg(long)]
        pos: Option<String>,
        #[arg(long)]
        example: Option<String>,
        /// Page the word was found on
        #[arg(long)]
        source_url: Option<String>,
        #[arg(long)]
        source_title: Option<String>,
        /// Comma-separated tag names
        #[arg(long)]
        tags: Option<String>,
    },

    /// List saved words, newest first
    List {
        /// Case-insensitive substring filter
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one word
    Show {
        /// Word text (case-insensitive prefix match) or id
        word: String,
    },

    /// List words due for review
    Due,

    /// Record a review result
    Review {
        /// Word text or id
        word: String,
        /// remembered | forgotten
        outcome: ReviewOutcome,
    },

    /// Edit a word's content
    Update {
        /// Word text or id
        word: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        meaning: Option<String>,
        #[arg(long)]
        pronunciation: Option<String>,
        #[arg(long)]
        pos: Option<String>,
        #[arg(long)]
        example: Option<String>,
    },

    /// Delete a word
    Delete {
        /// Word text or id
        word: String,
    },

    /// Review statistics
    Stats,

    /// Print the due-count badge text
    Badge,

    /// Tag management
    #[command(subcommand)]
    Tags(TagCommand),

    /// Show or change settings
    Settings {
        #[arg(long)]
        theme: Option<Theme>,
        #[arg(long)]
        language: Option<String>,
    },
}

#[derive(Subcommand)]
enum TagCommand {
    /// List tags
    List,

    /// Create a tag
    Create {
        name: String,
        /// Hex color, e.g. "#3b82f6"
        color: String,
    },

    /// Rename or recolor a tag
    Update {
        /// Tag name or id
        tag: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a tag and detach it from every word
    Delete {
        /// Tag name or id
        tag: String,
    },

    /// Replace a word's tags
    Set {
        /// Word text or id
        word: String,
        /// Tag names or ids
        tags: Vec<String>,
    },

    /// Add tags to a word, keeping the ones it has
    Add {
        /// Word text or id
        word: String,
        /// Tag names or ids
        #[arg(required = true)]
        tags: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = app::load_config(cli.config.as_deref(), cli.data_dir)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let use_color = !cli.no_color && atty_check();
    let format = cli.format;
    let app = app::App::start(config)?;

    let result = run(&app, cli.command, &format, use_color).await;
    app.shutdown().await;
    result
}

async fn run(
    app: &app::App,
    command: Command,
    format: &OutputFormat,
    use_color: bool,
) -> anyhow::Result<()> {
    match command {
        Command::Add {
            text,
            meaning,
            pronunciation,
            pos,
            example,
            source_url,
            source_title,
            tags,
        } => {
            let fields = commands::words::NewWordArgs {
                text,
                meaning,
                pronunciation,
                part_of_speech: pos,
                example,
                source_url,
                source_title,
                tags,
            };
            commands::words::run_add(app, fields, format, use_color).await
        }
        Command::List { search } => {
            commands::words::run_list(app, search.as_deref(), format, use_color).await
        }
        Command::Show { word } => commands::words::run_show(app, &word, format, use_color).await,
        Command::Due => commands::review::run_due(app, format, use_color).await,
        Command::Review { word, outcome } => {
            commands::review::run_review(app, &word, outcome, format, use_color).await
        }
        Command::Update {
            word,
            text,
            meaning,
            pronunciation,
            pos,
            example,
        } => {
            let updates = wordnest_lib::words::WordUpdate {
                text,
                meaning,
                pronunciation,
                part_of_speech: pos,
                example,
                tag_ids: None,
            };
            commands::words::run_update(app, &word, updates, format, use_color).await
        }
        Command::Delete { word } => commands::words::run_delete(app, &word, format).await,
        Command::Stats => commands::review::run_stats(app, format).await,
        Command::Badge => commands::review::run_badge(app, format).await,
        Command::Tags(subcmd) => match subcmd {
            TagCommand::List => commands::tags::run_list(app, format, use_color).await,
            TagCommand::Create { name, color } => {
                commands::tags::run_create(app, &name, &color, format, use_color).await
            }
            TagCommand::Update { tag, name, color } => {
                commands::tags::run_update(app, &tag, name, color, format, use_color).await
            }
            TagCommand::Delete { tag } => commands::tags::run_delete(app, &tag, format).await,
            TagCommand::Set { word, tags } => {
                commands::tags::run_assign(app, &word, &tags, true, format).await
            }
            TagCommand::Add { word, tags } => {
                commands::tags::run_assign(app, &word, &tags, false, format).await
            }
        },
        Command::Settings { theme, language } => {
            commands::settings::run(app, theme, language, format).await
        }
    }
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
