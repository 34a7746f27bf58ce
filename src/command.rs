//! Console Commands
//!
//! Parses text commands and runs them against a [`CacheEngine`].
//!
//! # Commands
//! - `SET key value [ttl_ms]` - Store a value, optionally expiring
//! - `GET key` - Retrieve a value
//! - `DEL key` - Delete a key
//! - `EXISTS key` - Check presence, ignoring expiry
//! - `FLUSH` - Remove every entry
//! - `KEYS` - Number of entries
//! - `MAXMEMORY size` - Change the memory ceiling (e.g. `64MB`)
//! - `STATS` - Counters as JSON
//! - `QUIT` - Leave the console

use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheEngine;
use crate::error::{CacheError, Result};

/// One parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set {
        key: String,
        value: String,
        ttl: Option<Duration>,
    },
    Get(String),
    Del(String),
    Exists(String),
    Flush,
    Keys,
    MaxMemory(String),
    Stats,
    Quit,
}

impl FromStr for Command {
    type Err = CacheError;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| CacheError::InvalidCommand("empty line".to_string()))?
            .to_ascii_uppercase();
        let args: Vec<&str> = parts.collect();

        let arity = |expected: usize| -> Result<()> {
            if args.len() == expected {
                Ok(())
            } else {
                Err(CacheError::InvalidCommand(format!(
                    "{} takes {} argument(s)",
                    name, expected
                )))
            }
        };

        let command = match name.as_str() {
            "SET" => {
                if !(2..=3).contains(&args.len()) {
                    return Err(CacheError::InvalidCommand(
                        "usage: SET key value [ttl_ms]".to_string(),
                    ));
                }
                let ttl = match args.get(2) {
                    Some(raw) => Some(Duration::from_millis(raw.parse().map_err(|_| {
                        CacheError::InvalidCommand(format!("invalid ttl: {}", raw))
                    })?)),
                    None => None,
                };
                Command::Set {
                    key: args[0].to_string(),
                    value: args[1].to_string(),
                    ttl,
                }
            }
            "GET" => {
                arity(1)?;
                Command::Get(args[0].to_string())
            }
            "DEL" => {
                arity(1)?;
                Command::Del(args[0].to_string())
            }
            "EXISTS" => {
                arity(1)?;
                Command::Exists(args[0].to_string())
            }
            "MAXMEMORY" => {
                arity(1)?;
                Command::MaxMemory(args[0].to_string())
            }
            "FLUSH" => {
                arity(0)?;
                Command::Flush
            }
            "KEYS" => {
                arity(0)?;
                Command::Keys
            }
            "STATS" => {
                arity(0)?;
                Command::Stats
            }
            "QUIT" | "EXIT" => Command::Quit,
            other => {
                return Err(CacheError::InvalidCommand(format!(
                    "unknown command '{}'",
                    other
                )))
            }
        };
        Ok(command)
    }
}

impl Command {
    /// Runs the command and renders its reply.
    pub fn execute(&self, cache: &CacheEngine) -> Result<String> {
        let reply = match self {
            Command::Set { key, value, ttl } => {
                cache.set(key.as_str(), value.as_str(), *ttl)?;
                "OK".to_string()
            }
            Command::Get(key) => cache.get(key).unwrap_or_else(|| "(nil)".to_string()),
            Command::Del(key) => u8::from(cache.delete(key)).to_string(),
            Command::Exists(key) => u8::from(cache.exists(key)).to_string(),
            Command::Flush => {
                cache.flush();
                "OK".to_string()
            }
            Command::Keys => cache.count().to_string(),
            Command::MaxMemory(spec) => cache.set_max_memory(spec)?.to_string(),
            Command::Stats => serde_json::to_string(&cache.stats())
                .map_err(|err| CacheError::InvalidCommand(err.to_string()))?,
            Command::Quit => "BYE".to_string(),
        };
        Ok(reply)
    }
}
