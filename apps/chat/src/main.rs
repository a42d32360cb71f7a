//! Night School chat widget, terminal front end.

#![forbid(unsafe_code)]

mod client;
mod config;
mod widget;

use nightschool_core::{AppError, AppResult};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::client::{ChatTransport, HttpChatTransport};
use crate::config::ChatConfig;
use crate::widget::{ChatWidget, INPUT_PLACEHOLDER, PanelState};

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Open,
    Close,
    Quit,
    Compose(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        match line.trim() {
            "/open" => Self::Open,
            "/close" => Self::Close,
            "/quit" => Self::Quit,
            _ => Self::Compose(line),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ChatConfig::load()?;
    let mut widget = ChatWidget::new(config.auth_token.clone());
    if !widget.is_visible() {
        info!("CHAT_AUTH_TOKEN is not set; the chat is only available to signed-in users");
        return Ok(());
    }

    let transport = HttpChatTransport::new(reqwest::Client::new(), config.api_url.as_str());
    info!(api_url = %config.api_url, "chat widget ready");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    redraw(&mut stdout, &widget).await?;

    loop {
        if widget.panel() == PanelState::Open {
            write_out(&mut stdout, &format!("{INPUT_PLACEHOLDER} ")).await?;
        }

        let Some(line) = lines
            .next_line()
            .await
            .map_err(|error| AppError::Internal(format!("failed to read stdin: {error}")))?
        else {
            break;
        };

        match Command::parse(&line) {
            Command::Open => widget.open(),
            Command::Close => widget.close(),
            Command::Quit => break,
            Command::Compose(text) => {
                widget.set_input(text);
                let Some(outgoing) = widget.begin_submit() else {
                    continue;
                };
                redraw(&mut stdout, &widget).await?;

                let result = transport
                    .send_message(&outgoing.auth_token, &outgoing.message)
                    .await;
                widget.finish(result);
            }
        }

        redraw(&mut stdout, &widget).await?;
    }

    Ok(())
}

async fn redraw(stdout: &mut Stdout, widget: &ChatWidget) -> AppResult<()> {
    match widget.render() {
        Some(output) => write_out(stdout, &format!("\n{output}")).await,
        None => Ok(()),
    }
}

async fn write_out(stdout: &mut Stdout, text: &str) -> AppResult<()> {
    stdout
        .write_all(text.as_bytes())
        .await
        .map_err(|error| AppError::Internal(format!("failed to write stdout: {error}")))?;
    stdout
        .flush()
        .await
        .map_err(|error| AppError::Internal(format!("failed to flush stdout: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();
}
