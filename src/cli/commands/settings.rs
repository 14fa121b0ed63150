use crate::app::App;
use crate::cli::parser::Commands;
use crate::core::reducer::Action;
use crate::errors::{AppError, AppResult};
use crate::models::Settings;
use crate::store::ReadQuery;
use crate::ui::messages::{field, header, success};

fn print_settings(settings: &Settings) {
    header("Settings");
    field("Rate", format!("{:.2}", settings.rate));
    field("Tax", format!("{:.1}%", settings.tax));
    field("Focus interval", format!("{}h", settings.focus_interval));
    field("Color", &settings.color);
}

pub async fn handle(cmd: &Commands, app: &App) -> AppResult<()> {
    if let Commands::Settings {
        rate,
        tax,
        focus_interval,
        color,
    } = cmd
    {
        let state = app.load(&ReadQuery::default()).await?;
        let mut settings = state.settings.clone();

        if rate.is_none() && tax.is_none() && focus_interval.is_none() && color.is_none() {
            print_settings(&settings);
            return Ok(());
        }

        if let Some(rate) = rate {
            if *rate < 0.0 {
                return Err(AppError::Config("rate must not be negative".into()));
            }
            settings.rate = *rate;
        }
        if let Some(tax) = tax {
            if !(0.0..=100.0).contains(tax) {
                return Err(AppError::Config("tax must be between 0 and 100".into()));
            }
            settings.tax = *tax;
        }
        if let Some(focus) = focus_interval {
            settings.focus_interval = *focus;
        }
        if let Some(color) = color {
            settings.color = color.clone();
        }

        let state = app.dispatch(Action::ChangeSettings(settings)).await?;
        success("Settings saved.");
        print_settings(&state.settings);
    }
    Ok(())
}
