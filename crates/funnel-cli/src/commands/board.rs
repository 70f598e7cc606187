use std::path::Path;
use std::sync::Arc;

use funnel_board::notify::TracingSink;
use funnel_core::stages::StageRegistry;

use super::{money, open_board, print_stats};

/// Run the `board` subcommand: one block per column, then the stats.
pub async fn run(registry: StageRegistry, leads: &Path) -> anyhow::Result<()> {
    let board = open_board(registry, leads, Arc::new(TracingSink)).await?;

    for column in board.columns() {
        println!(
            "== {} ({}) {}",
            column.stage.title,
            column.len(),
            money(column.total_value())
        );
        for card in &column.cards {
            let lead = card.lead();
            let value = card.value_label().unwrap_or_else(|| "-".into());
            let service = lead.service.as_deref().unwrap_or("");
            println!("   {:<8} {:<24} {:>12}  {}", lead.id, lead.name, value, service);
        }
    }
    for orphan in board.orphans() {
        println!("!! {} has unknown status {:?}", orphan.id, orphan.status.as_str());
    }
    println!();
    print_stats(board.stats());
    Ok(())
}
