//! Reference command-line client for the sync engine
//!
//! Reads commands from stdin until `quit`, end of input or Ctrl-C, then runs
//! the shutdown hook.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use discount_sync::application::{InsertionError, SyncEngine, SyncEvent};
use discount_sync::domain::ProductForm;
use discount_sync::infrastructure::{FileKeyValueStore, HttpDiscountApi, SyncConfig, init_logging_with_config};

const HELP: &str = "commands: pause | resume | insert <name> <price> <code> [discount] | retry | list | status | help | quit";

#[tokio::main]
async fn main() -> Result<()> {
    let config = SyncConfig::load(config_path_from_args().as_deref()).context("Failed to load configuration")?;
    init_logging_with_config(&config.logging)?;

    let store_path = config.storage.store_path();
    info!("Using key-value store {:?}", store_path);
    let store = Arc::new(FileKeyValueStore::open(&store_path).await?);
    let api = Arc::new(HttpDiscountApi::from_remote_config(&config.remote)?);

    let engine = SyncEngine::start(&config.polling, api, store).await;
    spawn_event_printer(&engine);
    println!("{HELP}");

    let mut form = ProductForm::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_command(&engine, &mut form, line.trim()).await {
                    break;
                }
            }
        }
    }

    engine.shutdown().await;
    Ok(())
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}

fn spawn_event_printer(engine: &SyncEngine) {
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SyncEvent::CounterIncreased { total, .. } => {
                    println!("Discounted products: {total}");
                }
                SyncEvent::ProductsMerged { codes, total } => {
                    println!("New products {codes:?} ({total} listed)");
                }
                SyncEvent::ShutDown => break,
                _ => {}
            }
        }
    });
}

/// Returns `false` when the client should stop.
async fn handle_command(engine: &SyncEngine, form: &mut ProductForm, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    match parts.next() {
        None => {}
        Some("pause") => engine.pause(),
        Some("resume") => engine.resume(),
        Some("insert") => {
            let fields: Vec<&str> = parts.collect();
            if fields.len() < 3 {
                println!("usage: insert <name> <price> <code> [discount]");
                return true;
            }
            let discount = fields
                .get(3)
                .is_some_and(|flag| matches!(flag.to_lowercase().as_str(), "1" | "true" | "yes" | "si" | "sí"));
            *form = ProductForm::new(fields[0], fields[1], fields[2], discount);
            submit(engine, form).await;
        }
        Some("retry") => {
            if *form == ProductForm::default() {
                println!("Nothing to retry");
            } else {
                submit(engine, form).await;
            }
        }
        Some("list") => {
            for product in engine.products().await {
                let discount = if product.discount { "yes" } else { "no" };
                println!("{}\t{}\t{}\t{}", product.name, product.price, product.code, discount);
            }
        }
        Some("status") => {
            let status = engine.status().await;
            match serde_json::to_string_pretty(&status) {
                Ok(json) => println!("{json}"),
                Err(e) => println!("{status:?} ({e})"),
            }
        }
        Some("help") => println!("{HELP}"),
        Some("quit" | "exit") => return false,
        Some(other) => println!("unknown command '{other}'; {HELP}"),
    }
    true
}

async fn submit(engine: &SyncEngine, form: &mut ProductForm) {
    match engine.insert(form).await {
        Ok(product) => println!("Inserted {} ({})", product.name, product.code),
        Err(e) if e.is_validation() => println!("{e}"),
        Err(e @ InsertionError::ShutDown) => println!("{e}"),
        Err(e) => println!("{e}; use 'retry' to submit the same product again"),
    }
}
