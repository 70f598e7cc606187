pub mod board;
pub mod move_lead;
pub mod stages;
pub mod stats;

use std::path::Path;
use std::sync::Arc;

use funnel_board::notify::NotificationSink;
use funnel_board::FunnelBoard;
use funnel_core::stages::StageRegistry;
use funnel_core::stats::FunnelStats;

use crate::store::JsonFileLeadStore;

/// Open the lead file and load it into a board.
pub async fn open_board(
    registry: StageRegistry,
    leads: &Path,
    sink: Arc<dyn NotificationSink>,
) -> anyhow::Result<FunnelBoard> {
    let store = JsonFileLeadStore::open(leads).await?;
    let mut board = FunnelBoard::new(registry, Arc::new(store), sink);
    board.load().await?;
    Ok(board)
}

pub fn money(v: f64) -> String {
    format!("{v:.2}")
}

pub fn print_stats(stats: &FunnelStats) {
    println!("Leads:       {} ({} valued)", stats.total_leads, stats.valued_leads);
    println!("Conversion:  {:.1}%", stats.conversion_rate);
    println!("Potential:   {}", money(stats.potential_value));
    println!("Realized:    {}", money(stats.realized_value));
    println!("Lost:        {}", money(stats.lost_value));
    if stats.orphaned > 0 {
        println!("Unknown status: {} lead(s) not shown on the board", stats.orphaned);
    }
}
