mod driver;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use formfill_core::{MessagePayload, Msg, ResumeFile, MESSAGE_ORIGIN};
use formfill_engine::EngineHandle;
use formfill_logging::{formfill_info, LogDestination};

use driver::config::{AppConfig, DEFAULT_CONFIG_FILE};
use driver::effects::EffectRunner;
use driver::runtime::Driver;

/// Slack on top of the request timeout before the driver stops waiting.
const SETTLE_MARGIN: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(name = "formfill", about = "Headless driver for the application form widgets", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RON config file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Overrides the endpoint base URL from the config.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log destination: terminal, file or both.
    #[arg(long, global = true, default_value = "terminal")]
    log: String,
}

#[derive(Subcommand)]
enum Command {
    /// Type a location and show the suggestions.
    Search {
        text: String,
        /// Commit the suggestion at this index.
        #[arg(long)]
        pick: Option<usize>,
    },
    /// Upload a resume and merge the parsed profile into the form.
    ParseResume { path: PathBuf },
    /// Deliver a prefill profile to the autofill button and click it.
    Autofill {
        json_path: PathBuf,
        /// Origin the provider's messages claim to come from.
        #[arg(long, default_value = MESSAGE_ORIGIN)]
        origin: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let destination = LogDestination::parse(&cli.log)
        .ok_or_else(|| anyhow!("unknown log destination {:?}", cli.log))?;
    formfill_logging::initialize(destination, LevelFilter::Info, None);

    let mut config = AppConfig::load(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    formfill_info!("Using endpoints at {}", config.base_url);

    let settings = config.transport_settings();
    let idle_timeout = settings.request_timeout + SETTLE_MARGIN;
    let runner = EffectRunner::new(EngineHandle::new(settings));
    let mut driver = Driver::new(config.initial_state(), runner, idle_timeout);
    if !config.captcha_response.is_empty() {
        driver.dispatch(Msg::CaptchaSolved(config.captcha_response.clone()));
    }

    match cli.command {
        Command::Search { text, pick } => {
            driver.dispatch(Msg::LocationInput(text));
            settle_and_print(&mut driver)?;
            if let Some(index) = pick {
                driver.dispatch(Msg::LocationOptionPressed(index));
                settle_and_print(&mut driver)?;
            }
        }
        Command::ParseResume { path } => {
            driver.dispatch(Msg::ResumeSelected(Some(resume_file(&path)?)));
            settle_and_print(&mut driver)?;
        }
        Command::Autofill { json_path, origin } => {
            let text = fs::read_to_string(&json_path)
                .with_context(|| format!("reading prefill data from {json_path:?}"))?;
            let data: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("parsing prefill data from {json_path:?}"))?;
            driver.dispatch(Msg::AutofillMessage {
                origin,
                payload: MessagePayload::Text(r#"{"method":"ready"}"#.to_string()),
            });
            driver.dispatch(Msg::PrefillDataReceived(Some(data)));
            driver.dispatch(Msg::OverlayClicked);
            settle_and_print(&mut driver)?;
            formfill_info!("Autofill button ended {:?}", driver.state().overlay().button());
        }
    }
    Ok(())
}

fn settle_and_print(driver: &mut Driver) -> Result<()> {
    if !driver.settle() {
        return Err(anyhow!("timed out waiting for the endpoints"));
    }
    if let Some(text) = driver.render_if_dirty() {
        println!("{text}");
    }
    Ok(())
}

fn resume_file(path: &Path) -> Result<ResumeFile> {
    let metadata = fs::metadata(path).with_context(|| format!("reading {path:?}"))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ResumeFile {
        name,
        size: metadata.len(),
        path: path.to_path_buf(),
    })
}
