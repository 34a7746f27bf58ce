//! Mini KV - An embeddable in-memory key-value cache
//!
//! Console driver: reads one command per line from stdin and prints the
//! reply on stdout. Logs go to stderr.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mini_kv::{CacheEngine, Command, Config};

fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_kv=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_memory={} bytes, default_ttl={}ms",
        config.max_memory,
        config.default_ttl.as_millis()
    );

    let cache = CacheEngine::from_config(&config);
    info!("Cache ready, reading commands from stdin");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line.context("failed to read from stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let (reply, quit) = match line.parse::<Command>() {
            Ok(command) => {
                debug!(?command, "Executing");
                let quit = command == Command::Quit;
                match command.execute(&cache) {
                    Ok(reply) => (reply, quit),
                    Err(err) => (format!("ERR {}", err), false),
                }
            }
            Err(err) => (format!("ERR {}", err), false),
        };

        writeln!(stdout, "{}", reply).context("failed to write reply")?;
        stdout.flush().context("failed to flush stdout")?;

        if quit {
            break;
        }
    }

    info!("Shutting down with {} entries", cache.count());
    Ok(())
}
