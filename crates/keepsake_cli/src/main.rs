//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `keepsake_core` linkage.
//! - Load the configured backend once and report what it holds.

use keepsake_core::{open_store, AppConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("keepsake_core ping={}", keepsake_core::ping());
    println!("keepsake_core version={}", keepsake_core::core_version());

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("keepsake config error: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!("keepsake backend={}", config.backend.kind());

    let mut store = match open_store(&config) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("keepsake bootstrap error: {err}");
            return ExitCode::FAILURE;
        }
    };
    match store.init() {
        Ok(entries) => {
            println!("keepsake memories={}", entries.len());
            if let Some(latest) = keepsake_core::latest_memory(entries) {
                println!("keepsake latest={}", latest.display_date);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("keepsake load error ({}): {err}", err.stage());
            ExitCode::FAILURE
        }
    }
}
