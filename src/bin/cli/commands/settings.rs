use anyhow::Result;

use wordnest_lib::protocol::{GetSettings, UpdateSettings};
use wordnest_lib::settings::{SettingsUpdate, Theme};

use crate::app::App;
use crate::OutputFormat;

/// Print settings, applying any changes first
pub async fn run(
    app: &App,
    theme: Option<Theme>,
    language: Option<String>,
    format: &OutputFormat,
) -> Result<()> {
    let settings = if theme.is_some() || language.is_some() {
        app.send(UpdateSettings(SettingsUpdate { theme, language }))
            .await?
    } else {
        app.send(GetSettings).await?
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&settings)?),
        OutputFormat::Plain => {
            println!("Theme:     {}", format!("{:?}", settings.theme).to_lowercase());
            println!("Language:  {}", settings.language);
            println!("Data dir:  {}", app.config.data_dir()?.display());
        }
    }
    Ok(())
}
