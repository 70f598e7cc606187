use std::path::Path;
use std::sync::Arc;

use funnel_board::card::CardRegion;
use funnel_board::drag::PointerOffset;
use funnel_board::notify::{NotificationKind, NotificationLog};
use funnel_board::{BoardEvent, BoardOutcome, TransitionOutcome};
use funnel_core::config::Config;
use funnel_core::stages::StageRegistry;
use funnel_core::types::{LeadId, StageKey};

use super::{open_board, print_stats};

/// Run the `move` subcommand: replay a drag of `lead` onto `stage` and wait
/// for the store to confirm or reject it.
pub async fn run(
    config: &Config,
    registry: StageRegistry,
    leads: &Path,
    lead: &str,
    stage: &str,
) -> anyhow::Result<()> {
    let log = Arc::new(NotificationLog::new(config.board.notification_history));
    let mut board = open_board(registry, leads, log.clone()).await?;

    let lead_id = LeadId::from(lead);
    let Some(from) = board.lead(&lead_id).map(|l| l.status.clone()) else {
        anyhow::bail!("no lead with id {lead:?}");
    };

    let events = board.sender();
    events.send(BoardEvent::DragStart {
        lead_id: lead_id.clone(),
        region: CardRegion::Body,
        pointer: PointerOffset::new(0.0, 0.0),
    })?;
    events.send(BoardEvent::Hover(StageKey::from(stage)))?;
    events.send(BoardEvent::Drop)?;

    let mut outcomes = board.drain();
    match outcomes.last() {
        Some(BoardOutcome::Dropped(TransitionOutcome::Requested(_))) => {}
        Some(BoardOutcome::Dropped(TransitionOutcome::SameStage)) => {
            println!("{lead} is already in {stage}; nothing to do");
            return Ok(());
        }
        Some(BoardOutcome::Dropped(TransitionOutcome::UnknownStage)) => {
            anyhow::bail!("unknown stage {stage:?} (see `funnel stages`)");
        }
        other => anyhow::bail!("move not started: {other:?}"),
    }

    outcomes.extend(board.settle().await);
    tracing::debug!(?outcomes, "move settled");

    if log.count_of(NotificationKind::Error) > 0 {
        for note in log.list() {
            eprintln!("{}: {}", note.title, note.message);
        }
        println!("{lead} stays in {from}");
    } else {
        println!("{lead}: {from} -> {stage}");
    }
    println!();
    print_stats(board.stats());
    Ok(())
}
