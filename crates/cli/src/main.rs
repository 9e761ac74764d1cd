//! # CLI - Cask Interactive Shell
//!
//! A REPL-style command-line interface over the `cask` storage engine.
//! Reads commands from stdin, executes them, and prints results to stdout.
//! Designed for both interactive use and scripted testing (pipe commands via
//! stdin).
//!
//! ## Commands
//!
//! ```text
//! SET key value   Insert or update a key-value pair
//! GET key         Look up a key (prints value or "(nil)")
//! DEL key         Delete a key (writes a tombstone)
//! FLUSH           Force-rotate the active data file
//! STATS           Print database debug info
//! EXIT / QUIT     Shut down gracefully
//! ```
//!
//! ## Configuration
//!
//! All settings are controlled via environment variables:
//!
//! ```text
//! CASK_DIR           Database directory       (default: "data/cask")
//! CASK_HINT_MODE     Recover via hint files    (default: "false")
//! CASK_BLOOM_BITS    Per-file bloom bit count  (default: 30000)
//! CASK_BLOOM_HASHES  Per-file bloom hash count (default: 13)
//! CASK_INDEX_SHARDS  Key index shard count     (default: 16)
//! ```
//!
//! ## Example
//!
//! ```text
//! $ cargo run -p cli
//! Cask opened (dir=data/cask, hint_mode=false, keys=0)
//! > SET name Alice
//! OK
//! > GET name
//! Alice
//! > EXIT
//! bye
//! ```
use anyhow::Result;
use cask::{Cask, Config};
use log::info;
use std::io::{self, BufRead, Write};

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn main() -> Result<()> {
    env_logger::init();

    let directory = env_or("CASK_DIR", "data/cask");
    let config = Config::from_env(&directory);

    let cask = Cask::open(&directory, config)?;
    info!("opened {directory} (hint_mode={}, keys={})", cask.hint_mode(), cask.len());

    println!(
        "Cask opened (dir={}, hint_mode={}, keys={})",
        directory,
        cask.hint_mode(),
        cask.len()
    );
    println!("Commands: SET key value | GET key | DEL key | FLUSH | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            match cmd.to_uppercase().as_str() {
                "SET" => {
                    if let Some(k) = parts.next() {
                        let v: String = parts.collect::<Vec<&str>>().join(" ");
                        if v.is_empty() {
                            println!("ERR usage: SET key value");
                        } else {
                            match cask.insert(k.as_bytes(), v.as_bytes()) {
                                Ok(()) => println!("OK"),
                                Err(e) => println!("ERR set failed: {e}"),
                            }
                        }
                    } else {
                        println!("ERR usage: SET key value");
                    }
                }
                "GET" => {
                    if let Some(k) = parts.next() {
                        match cask.get(k.as_bytes()) {
                            Ok(v) => println!("{}", String::from_utf8_lossy(&v)),
                            Err(cask::CaskError::NotFound) => println!("(nil)"),
                            Err(e) => println!("ERR get failed: {e}"),
                        }
                    } else {
                        println!("ERR usage: GET key");
                    }
                }
                "DEL" => {
                    if let Some(k) = parts.next() {
                        match cask.delete(k.as_bytes()) {
                            Ok(()) => println!("OK"),
                            Err(e) => println!("ERR del failed: {e}"),
                        }
                    } else {
                        println!("ERR usage: DEL key");
                    }
                }
                "FLUSH" => match cask.flush_active_file() {
                    Ok(()) => println!("OK (keys={})", cask.len()),
                    Err(e) => println!("ERR flush failed: {e}"),
                },
                "STATS" => {
                    println!("{cask:?}");
                }
                "EXIT" | "QUIT" => {
                    if let Err(e) = cask.close() {
                        println!("ERR close failed: {e}");
                    }
                    println!("bye");
                    break;
                }
                other => {
                    println!("unknown command: {other}");
                }
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}
