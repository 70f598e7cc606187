use std::path::Path;
use std::sync::Arc;

use funnel_board::notify::TracingSink;
use funnel_core::stages::StageRegistry;

use super::{open_board, print_stats};

/// Run the `stats` subcommand.
pub async fn run(registry: StageRegistry, leads: &Path, json: bool) -> anyhow::Result<()> {
    let board = open_board(registry, leads, Arc::new(TracingSink)).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(board.stats())?);
    } else {
        print_stats(board.stats());
    }
    Ok(())
}
