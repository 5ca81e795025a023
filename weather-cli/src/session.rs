use anyhow::Context;
use inquire::{InquireError, Select, Text};
use tracing::debug;
use weather_core::{LookupOutcome, RenderOptions, WeatherApp, render};

const HELP: &str = "city name, or :refresh :history :theme :dismiss :quit";

/// What the user typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    City(String),
    Refresh,
    History,
    Theme,
    Dismiss,
    Quit,
    Unknown(String),
}

fn parse_input(raw: &str) -> Input {
    let trimmed = raw.trim();
    match trimmed.strip_prefix(':') {
        Some(cmd) => match cmd.trim().to_lowercase().as_str() {
            "r" | "refresh" => Input::Refresh,
            "h" | "history" => Input::History,
            "t" | "theme" => Input::Theme,
            "d" | "dismiss" => Input::Dismiss,
            "q" | "quit" | "exit" => Input::Quit,
            _ => Input::Unknown(trimmed.to_string()),
        },
        None => Input::City(trimmed.to_string()),
    }
}

/// Current state rendered for today's local date.
pub fn screen(app: &WeatherApp, options: &RenderOptions) -> String {
    render(&app.state(), chrono::Local::now().date_naive(), options)
}

fn draw(app: &WeatherApp, options: &RenderOptions) {
    println!("{}", screen(app, options));
}

/// Drive a lookup, drawing the loading screen once it is in flight.
async fn with_loading<F>(app: &WeatherApp, options: &RenderOptions, lookup: F) -> LookupOutcome
where
    F: Future<Output = LookupOutcome>,
{
    let (outcome, ()) = tokio::join!(lookup, async {
        tokio::task::yield_now().await;
        if app.state().busy {
            draw(app, options);
        }
    });
    outcome
}

pub async fn run(app: &WeatherApp, options: &RenderOptions) -> anyhow::Result<()> {
    with_loading(app, options, app.startup()).await;
    draw(app, options);

    loop {
        let raw = match Text::new("City:").with_help_message(HELP).prompt() {
            Ok(raw) => raw,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(e) => return Err(e).context("Failed to read input"),
        };

        let outcome = match parse_input(&raw) {
            Input::City(city) => with_loading(app, options, app.lookup(&city)).await,
            Input::Refresh => with_loading(app, options, app.refresh()).await,
            Input::History => match pick_history(app)? {
                Some(index) => with_loading(app, options, app.select_history(index)).await,
                None => LookupOutcome::Skipped,
            },
            Input::Theme => {
                app.toggle_theme();
                LookupOutcome::Skipped
            }
            Input::Dismiss => {
                app.dismiss_error();
                LookupOutcome::Skipped
            }
            Input::Quit => break,
            Input::Unknown(cmd) => {
                println!("Unknown command {cmd}. Try {HELP}.");
                continue;
            }
        };

        debug!(?outcome, "input handled");
        draw(app, options);
    }

    Ok(())
}

fn pick_history(app: &WeatherApp) -> anyhow::Result<Option<usize>> {
    let entries = app.state().history.entries().to_vec();
    if entries.is_empty() {
        println!("No recent searches yet.");
        return Ok(None);
    }

    match Select::new("Recent Searches:", entries).raw_prompt() {
        Ok(choice) => Ok(Some(choice.index)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Failed to read selection"),
    }
}
