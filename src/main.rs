use anyhow::{bail, Context, Result};
use std::io::Write;
use std::time::Duration;

use screen_rusty::{ScreenClient, ScreenConfig, ScreenRegistry};

const TAIL_INTERVAL: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ScreenConfig::load().context("Failed to load configuration")?;
    let registry = ScreenRegistry::new(ScreenClient::new(config));

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("ls") => list(&registry),
        Some("json") => {
            let sessions = registry.list_sessions()?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
            Ok(())
        }
        Some("send") => {
            let Some(name) = args.get(1) else {
                bail!("usage: screen-rusty send <name> <command>...");
            };
            registry
                .screen(name.as_str())
                .send_commands(&args[2..])
                .with_context(|| format!("Failed to send to '{}'", name))
        }
        Some("tail") => {
            let Some(name) = args.get(1) else {
                bail!("usage: screen-rusty tail <name>");
            };
            tail(&registry, name)
        }
        Some(other) => bail!("unknown command '{}' (expected ls, json, send or tail)", other),
    }
}

fn list(registry: &ScreenRegistry) -> Result<()> {
    let sessions = registry.list_sessions()?;
    if sessions.is_empty() {
        println!("No screen sessions");
        return Ok(());
    }

    for session in sessions {
        println!(
            "{}.{}\t{}\t{}",
            session.info.id(),
            session.name,
            session.info.status(),
            session.info.date().unwrap_or("-"),
        );
    }
    Ok(())
}

fn tail(registry: &ScreenRegistry, name: &str) -> Result<()> {
    let mut screen = registry.screen(name);
    screen
        .enable_logs()
        .with_context(|| format!("Failed to enable logs for '{}'", name))?;

    loop {
        if let Some(tailer) = screen.logs() {
            let chunk = tailer.next_chunk()?;
            if !chunk.is_empty() {
                print!("{}", chunk);
                std::io::stdout().flush()?;
            }
        }

        if !screen.exists()? {
            break;
        }
        std::thread::sleep(TAIL_INTERVAL);
    }

    Ok(())
}
