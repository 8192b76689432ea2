use chairside::adapters::{FileCredentialProvider, ReqwestHttpClient};
use chairside::chat::{ChatRequest, ChatService, ChatType};
use chairside::config::{ClientConfig, ENV_LOG};
use chairside::notifications::TracingNotifier;

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use std::io::{self, Read, Write};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_LOG_FILTER: &str = "chairside=info";

const USAGE: &str = "\
Usage: chairside [--version] [--help] <chat-type> <message...>

Chat types:
  help                      Public help desk (no sign-in needed)
  aidentist                 Clinical assistant for dentists
  receptionist              Front-desk assistant
  triage                    Symptom triage
  documentation-summarize   Summarize clinical documentation

With no message, the message is read from stdin.

Environment:
  CHAIRSIDE_API_URL              API base URL (default http://localhost:8080)
  CHAIRSIDE_IDLE_TIMEOUT_SECS    Max silence between chunks, 0 disables (default 60)
  CHAIRSIDE_TOTAL_TIMEOUT_SECS   Max reply duration, 0 disables (default 300)
  CHAIRSIDE_CONNECT_TIMEOUT_SECS Connection timeout (default 10)
  CHAIRSIDE_LOG                  Log filter, falls back to RUST_LOG";

/// Send `message` and print the reply as it streams in.
async fn run_chat(chat_type: ChatType, message: String) -> Result<i32> {
    let config = ClientConfig::from_env().wrap_err("invalid configuration")?;
    tracing::debug!("Using API at {}", config.base_url);

    let http = ReqwestHttpClient::from_config(&config).wrap_err("failed to build HTTP client")?;
    let credentials =
        FileCredentialProvider::new().wrap_err("failed to locate the credentials file")?;
    let service = ChatService::new(
        Arc::new(http),
        Arc::new(credentials),
        Arc::new(TracingNotifier),
        config,
    );

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling reply");
            on_interrupt.cancel();
        }
    });

    let mut stdout = io::stdout();
    let mut shown = String::new();
    let mut output_failed = false;
    let output_cancel = cancel.clone();
    let request = ChatRequest::new(chat_type, message).with_cancellation(cancel);
    let result = service
        .send(request, |_token, full| {
            if output_failed {
                return;
            }
            match write_delta(&mut stdout, &shown, full) {
                Ok(()) => {
                    shown.clear();
                    shown.push_str(full);
                }
                Err(e) => {
                    tracing::debug!("Cannot write reply to stdout, cancelling: {}", e);
                    output_failed = true;
                    output_cancel.cancel();
                }
            }
        })
        .await;

    if output_failed {
        return Ok(1);
    }
    if let Err(e) = writeln!(stdout) {
        tracing::debug!("Cannot finish reply on stdout: {}", e);
        return Ok(1);
    }

    Ok(match result {
        Ok(_) => 0,
        Err(err) if err.is_aborted() => 130,
        Err(err) => {
            tracing::debug!("{}", err.recovery_hint());
            1
        }
    })
}

/// Print the part of `full` not yet on screen, then flush.
///
/// A failure replaces the reply instead of extending it, so text that does
/// not extend `shown` starts on a new line.
fn write_delta(out: &mut impl Write, shown: &str, full: &str) -> io::Result<()> {
    match full.strip_prefix(shown) {
        Some(fresh) => write!(out, "{}", fresh)?,
        None => write!(out, "\n{}", full)?,
    }
    out.flush()
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env(ENV_LOG)
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Handle --version flag before any initialization
    if args.iter().any(|arg| arg == "--version") {
        println!("chairside {}", VERSION);
        std::process::exit(0);
    }

    if args.is_empty() || args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{}", USAGE);
        std::process::exit(if args.is_empty() { 2 } else { 0 });
    }

    color_eyre::install()?;
    init_logging();

    let chat_type: ChatType = args[0].parse()?;
    let mut message = args[1..].join(" ");
    if message.trim().is_empty() {
        io::stdin()
            .read_to_string(&mut message)
            .wrap_err("failed to read message from stdin")?;
    }
    let message = message.trim().to_string();
    if message.is_empty() {
        return Err(eyre!("message is empty"));
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let code = runtime.block_on(run_chat(chat_type, message))?;
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_delta_prints_only_new_text() {
        let mut out = Vec::new();
        write_delta(&mut out, "", "Your next").unwrap();
        write_delta(&mut out, "Your next", "Your next check-up").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Your next check-up");
    }

    #[test]
    fn test_write_delta_replacement_starts_new_line() {
        let mut out = Vec::new();
        write_delta(&mut out, "Partial", "Sorry, try again.").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\nSorry, try again.");
    }

    #[test]
    fn test_write_delta_reports_closed_output() {
        let err = write_delta(&mut ClosedPipe, "", "Hello").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }
}
