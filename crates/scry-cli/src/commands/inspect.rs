//! Inspect command
//!
//! Renders a snapshot file the same way the live view would, once, without
//! a server.

use scry_core::UiState;
use scry_term::dispatch_table;
use std::fs;
use tracing::warn;

pub fn run(input: &str) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(input)?;
    let state: UiState = serde_json::from_str(&text)?;

    for id in state.dangling_ids() {
        warn!(%id, "order references unknown element");
    }

    let table = dispatch_table();
    for line in table.walk(&state) {
        println!("{}", line.text);
    }

    Ok(())
}
