use std::{io::Write, sync::Arc};

use anyhow::{Context, bail};
use caster_core::{
    Config, Controller, Coordinates, LocationConfig, gateway_from_config, source_from_config,
};
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, Select, Text};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::render;

const LOCATION_MODES: [&str; 3] = ["ip", "fixed", "off"];

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "caster", version, about = "AI Caster: weather narratives grounded in live web search")]
pub struct Cli {
    /// Print debug logs to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `interactive`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the API key, model and location source.
    Configure,

    /// Show one report and exit.
    Show {
        /// City to search for; the current location is used when absent.
        city: Option<String>,

        /// Print the outcome as a JSON state object instead of rendering it.
        #[arg(long)]
        json: bool,
    },

    /// Locate, show the report, then keep asking for cities to search.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Configure) => configure(),
            Some(Command::Show { city, json }) => show(city, json).await,
            Some(Command::Interactive) | None => interactive().await,
        }
    }
}

fn controller_from_config() -> anyhow::Result<Controller> {
    let config = Config::load_with_env()?;
    let gateway = gateway_from_config(&config)?;
    let locator = source_from_config(&config.location);

    tracing::debug!(model = gateway.model(), location = ?config.location, "configuration loaded");
    Ok(Controller::new(Arc::new(gateway), locator))
}

async fn show(city: Option<String>, json: bool) -> anyhow::Result<()> {
    let mut controller = controller_from_config()?;

    match city {
        Some(city) => {
            if !controller.search(&city) {
                bail!("City name must not be blank.");
            }
        }
        None => controller.mount(),
    }

    if !json {
        println!("{}", render::view(controller.session()));
    }

    controller.settle().await;
    if json {
        let state = render::json_state(controller.session()).context("Failed to serialize report")?;
        let out = serde_json::to_string_pretty(&state).context("Failed to serialize report")?;
        println!("{out}");
    } else {
        println!("{}", render::view(controller.session()));
    }

    Ok(())
}

async fn interactive() -> anyhow::Result<()> {
    let mut controller = controller_from_config()?;
    controller.mount();

    let stdin = BufReader::new(tokio::io::stdin());
    search_loop(&mut controller, stdin, &mut std::io::stdout()).await
}

/// Read one city per line while applying task events as they arrive, so a
/// search submitted during a fetch supersedes it. Returns at end of input
/// once nothing is loading.
async fn search_loop<R, W>(controller: &mut Controller, input: R, out: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut reading = true;

    print_view(controller, out, reading)?;

    while reading || controller.session().is_loading() {
        tokio::select! {
            line = lines.next_line(), if reading => {
                match line.context("Failed to read search input")? {
                    // Blank submissions leave the current view as it is.
                    Some(text) => {
                        if controller.search(&text) {
                            print_view(controller, out, reading)?;
                        }
                    }
                    None => reading = false,
                }
            }
            Some(event) = controller.next_event() => {
                let before = controller.state().clone();
                controller.apply(event);
                if *controller.state() != before {
                    print_view(controller, out, reading)?;
                }
            }
            else => break,
        }
    }

    Ok(())
}

fn print_view<W: Write>(controller: &Controller, out: &mut W, prompt: bool) -> anyhow::Result<()> {
    writeln!(out, "{}", render::view(controller.session()))?;
    if prompt {
        write!(out, "{} (Ctrl-D to quit)\n> ", render::SEARCH_PLACEHOLDER)?;
    }
    out.flush().context("Failed to write to stdout")
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("Gemini API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.api_key = Some(api_key.trim().to_string());
    }

    let model = Text::new("Model id:").with_default(config.model_id()).prompt()?;
    config.model = Some(model.trim().to_string()).filter(|m| !m.is_empty());

    let mode = Select::new("Location source:", LOCATION_MODES.to_vec()).prompt()?;
    config.location = match mode {
        "fixed" => {
            let lat = CustomType::<f64>::new("Latitude:").prompt()?;
            let lng = CustomType::<f64>::new("Longitude:").prompt()?;
            LocationConfig::fixed(Coordinates { lat, lng })
        }
        "off" => LocationConfig::Off,
        _ => LocationConfig::default(),
    };

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());

    Ok(())
}
