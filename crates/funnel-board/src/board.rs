//! The board coordinator.
//!
//! `FunnelBoard` owns the authoritative lead list and is the only place a
//! lead's status changes. Everything that can change it arrives as a
//! [`BoardEvent`] on one FIFO queue: pointer events from the UI and
//! completions of persistence calls alike. Each event is handled to the end
//! before the next one is taken, so an optimistic update is always visible to
//! the next drag.
//!
//! A transition moves through three steps:
//!
//! 1. the lead's status is replaced in the list and the stats recomputed,
//! 2. the store is asked to persist the change on a spawned task,
//! 3. the task posts `PersistOk` or `PersistFail` back onto the queue.
//!
//! A failure applies the pre-image recorded at step 1 and reports the reason
//! once through the notification sink. Success is silent.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use funnel_core::stages::StageRegistry;
use funnel_core::stats::FunnelStats;
use funnel_core::types::{Lead, LeadId, StageKey};
use uuid::Uuid;

use crate::card::{CardEvent, CardRegion, FunnelCard};
use crate::column::{self, ColumnDrop, FunnelColumn, TransitionRequest};
use crate::drag::{DragEngine, DragError, PointerOffset};
use crate::notify::{NotificationKind, NotificationSink};
use crate::overlay::{self, OverlayPreview};
use crate::store::{LeadStore, StoreError};

pub const PERSIST_FAILED_TITLE: &str = "Could not move lead";

// ---------------------------------------------------------------------------
// Events and outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum BoardEvent {
    DragStart {
        lead_id: LeadId,
        region: CardRegion,
        pointer: PointerOffset,
    },
    /// `None` when the pointer left the tracked area.
    PointerMove(Option<PointerOffset>),
    Hover(StageKey),
    Leave(StageKey),
    /// Pointer released. Drops onto the hovered column, if any.
    Drop,
    Cancel,
    PersistOk {
        request: RequestId,
    },
    PersistFail {
        request: RequestId,
        reason: String,
    },
    /// Replace the whole list, e.g. after a refresh from the store.
    Reload(Vec<Lead>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    Requested(RequestId),
    SameStage,
    UnknownStage,
    UnknownLead,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardOutcome {
    DragStarted(Uuid),
    EditRequested(LeadId),
    /// Pointer or hover bookkeeping only.
    Tracked,
    /// The session ended without a transition request.
    Abandoned,
    /// The dragged lead is gone from the list.
    StaleDrop(LeadId),
    Dropped(TransitionOutcome),
    Confirmed(RequestId),
    Reverted(RequestId),
    /// Failed, but a later move of the same lead is still pending; that move
    /// now carries the revert target.
    Superseded(RequestId),
    /// Failed, but the lead no longer sits where this request put it.
    FailedWithoutRevert(RequestId),
    Reloaded(usize),
    Ignored,
}

/// A transition waiting on the store, with the pre-image needed to undo it.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransition {
    pub lead_id: LeadId,
    pub from: StageKey,
    pub to: StageKey,
    /// Rank the lead held before the move. A revert puts it back between
    /// the same neighbours.
    pub rank: u64,
    /// Rank given to the lead by this move.
    pub moved_rank: u64,
}

// ---------------------------------------------------------------------------
// FunnelBoard
// ---------------------------------------------------------------------------

pub struct FunnelBoard {
    registry: StageRegistry,
    leads: Vec<Lead>,
    /// Parallel to `leads`, strictly increasing. A lead's rank is its place in
    /// the list; moved leads take a fresh rank at the end.
    ranks: Vec<u64>,
    next_rank: u64,
    stats: FunnelStats,
    drag: DragEngine,
    pending: BTreeMap<RequestId, PendingTransition>,
    next_request: u64,
    store: Arc<dyn LeadStore>,
    sink: Arc<dyn NotificationSink>,
    events_tx: flume::Sender<BoardEvent>,
    events_rx: flume::Receiver<BoardEvent>,
}

impl fmt::Debug for FunnelBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunnelBoard")
            .field("stages", &self.registry.len())
            .field("leads", &self.leads.len())
            .field("pending", &self.pending.len())
            .field("dragging", &self.drag.is_active())
            .finish()
    }
}

impl FunnelBoard {
    pub fn new(
        registry: StageRegistry,
        store: Arc<dyn LeadStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let (events_tx, events_rx) = flume::unbounded();
        let stats = FunnelStats::compute(&[], &registry);
        Self {
            registry,
            leads: Vec::new(),
            ranks: Vec::new(),
            next_rank: 0,
            stats,
            drag: DragEngine::new(),
            pending: BTreeMap::new(),
            next_request: 1,
            store,
            sink,
            events_tx,
            events_rx,
        }
    }

    /// Populate the board from the store, replacing whatever it held.
    pub async fn load(&mut self) -> Result<usize, StoreError> {
        let leads = self.store.list().await?;
        Ok(self.replace_leads(leads))
    }

    // -- read side ----------------------------------------------------------

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn lead(&self, id: &LeadId) -> Option<&Lead> {
        self.leads.iter().find(|l| &l.id == id)
    }

    pub fn stats(&self) -> &FunnelStats {
        &self.stats
    }

    pub fn drag(&self) -> &DragEngine {
        &self.drag
    }

    pub fn pending(&self) -> &BTreeMap<RequestId, PendingTransition> {
        &self.pending
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.events_rx.is_empty()
    }

    /// Columns in registry order, each holding the cards whose status matches.
    pub fn columns(&self) -> Vec<FunnelColumn<'_>> {
        self.registry
            .iter()
            .map(|stage| {
                let moving = self.pending.values().any(|p| p.to == stage.key);
                FunnelColumn::build(stage, &self.leads, &self.drag, moving)
            })
            .collect()
    }

    pub fn column(&self, key: &StageKey) -> Option<FunnelColumn<'_>> {
        let stage = self.registry.get(key)?;
        let moving = self.pending.values().any(|p| &p.to == key);
        Some(FunnelColumn::build(stage, &self.leads, &self.drag, moving))
    }

    pub fn card(&self, id: &LeadId) -> Option<FunnelCard<'_>> {
        self.lead(id).map(|lead| FunnelCard::new(lead, &self.drag))
    }

    pub fn overlay(&self) -> Option<OverlayPreview> {
        overlay::render(&self.drag)
    }

    /// Leads whose status names no registered stage. They show in no column
    /// but still count toward `total_leads`.
    pub fn orphans(&self) -> Vec<&Lead> {
        self.leads
            .iter()
            .filter(|l| !self.registry.contains(&l.status))
            .collect()
    }

    // -- event queue --------------------------------------------------------

    /// Handle for UI emitters. Events are processed in send order.
    pub fn sender(&self) -> flume::Sender<BoardEvent> {
        self.events_tx.clone()
    }

    /// Handle every event already queued, without waiting.
    pub fn drain(&mut self) -> Vec<BoardOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            outcomes.push(self.handle(event));
        }
        outcomes
    }

    /// Wait for the next event and handle it.
    pub async fn process_next(&mut self) -> BoardOutcome {
        // The board holds a sender itself, so the channel never disconnects.
        let received = self.events_rx.recv_async().await;
        match received {
            Ok(event) => self.handle(event),
            Err(_) => BoardOutcome::Ignored,
        }
    }

    /// Handle events until nothing is queued and no persistence is in flight.
    pub async fn settle(&mut self) -> Vec<BoardOutcome> {
        let mut outcomes = self.drain();
        while !self.pending.is_empty() {
            outcomes.push(self.process_next().await);
            outcomes.extend(self.drain());
        }
        outcomes
    }

    /// Apply one event.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime and the event produces a
    /// transition, since the persistence call is spawned onto the runtime.
    pub fn handle(&mut self, event: BoardEvent) -> BoardOutcome {
        match event {
            BoardEvent::DragStart {
                lead_id,
                region,
                pointer,
            } => self.on_drag_start(&lead_id, region, pointer),
            BoardEvent::PointerMove(pointer) => self.track(|d| d.move_to(pointer)),
            BoardEvent::Hover(stage) => self.track(|d| d.hover(stage)),
            BoardEvent::Leave(stage) => self.track(|d| d.leave(&stage)),
            BoardEvent::Drop => self.on_drop(),
            BoardEvent::Cancel => match self.drag.cancel() {
                Some(_) => BoardOutcome::Abandoned,
                None => BoardOutcome::Ignored,
            },
            BoardEvent::PersistOk { request } => self.on_persist_ok(request),
            BoardEvent::PersistFail { request, reason } => self.on_persist_fail(request, &reason),
            BoardEvent::Reload(leads) => BoardOutcome::Reloaded(self.replace_leads(leads)),
        }
    }

    // -- transitions --------------------------------------------------------

    /// Move `lead_id` to `target` optimistically and start persisting it.
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime when the transition is requested.
    pub fn request_transition(&mut self, lead_id: &LeadId, target: &StageKey) -> TransitionOutcome {
        if !self.registry.contains(target) {
            tracing::debug!(lead_id = %lead_id, to = %target, "transition to unknown stage ignored");
            return TransitionOutcome::UnknownStage;
        }
        let Some(position) = self.leads.iter().position(|l| &l.id == lead_id) else {
            tracing::debug!(lead_id = %lead_id, "transition for unknown lead ignored");
            return TransitionOutcome::UnknownLead;
        };
        if &self.leads[position].status == target {
            return TransitionOutcome::SameStage;
        }

        // The moved lead goes to the end of the list so it lands last in its
        // new column. Everyone else keeps their relative order.
        let mut lead = self.leads.remove(position);
        let rank = self.ranks.remove(position);
        let from = std::mem::replace(&mut lead.status, target.clone());
        let moved_rank = self.take_rank();
        self.leads.push(lead);
        self.ranks.push(moved_rank);
        self.recompute_stats();

        let request = RequestId(self.next_request);
        self.next_request += 1;
        self.pending.insert(
            request,
            PendingTransition {
                lead_id: lead_id.clone(),
                from: from.clone(),
                to: target.clone(),
                rank,
                moved_rank,
            },
        );
        tracing::info!(
            request_id = %request,
            lead_id = %lead_id,
            from = %from,
            to = %target,
            "lead moved, persisting"
        );

        self.spawn_persist(request, lead_id.clone(), target.clone());
        TransitionOutcome::Requested(request)
    }

    /// Entry point for a column's drop result.
    pub fn submit(&mut self, request: TransitionRequest) -> TransitionOutcome {
        self.request_transition(&request.lead.id, &request.target)
    }

    fn spawn_persist(&self, request: RequestId, lead_id: LeadId, target: StageKey) {
        let store = Arc::clone(&self.store);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let event = match store.persist_status(&lead_id, &target).await {
                Ok(()) => BoardEvent::PersistOk { request },
                Err(e) => BoardEvent::PersistFail {
                    request,
                    reason: e.reason(),
                },
            };
            if tx.send(event).is_err() {
                tracing::debug!(request_id = %request, "board dropped before persist completed");
            }
        });
    }

    fn on_drag_start(
        &mut self,
        lead_id: &LeadId,
        region: CardRegion,
        pointer: PointerOffset,
    ) -> BoardOutcome {
        let Some(card) = self.card(lead_id) else {
            return BoardOutcome::Ignored;
        };
        match card.pointer_down(region) {
            CardEvent::Edit(id) => BoardOutcome::EditRequested(id),
            CardEvent::DragStart(payload) => match self.drag.start(payload, pointer) {
                Ok(session) => BoardOutcome::DragStarted(session),
                Err(e) => {
                    tracing::debug!(lead_id = %lead_id, error = %e, "drag start refused");
                    BoardOutcome::Ignored
                }
            },
        }
    }

    fn track(&mut self, f: impl FnOnce(&mut DragEngine) -> Result<(), DragError>) -> BoardOutcome {
        match f(&mut self.drag) {
            Ok(()) => BoardOutcome::Tracked,
            Err(_) => BoardOutcome::Ignored,
        }
    }

    fn on_drop(&mut self) -> BoardOutcome {
        let Ok(session) = self.drag.finish() else {
            return BoardOutcome::Ignored;
        };
        let Some(target) = session.hover.clone() else {
            tracing::debug!(session_id = %session.id, "released over no column");
            return BoardOutcome::Abandoned;
        };
        let Some(stage) = self.registry.get(&target) else {
            tracing::debug!(session_id = %session.id, to = %target, "drop on unknown stage");
            return BoardOutcome::Dropped(TransitionOutcome::UnknownStage);
        };

        // The payload was captured at drag start. Resolve against the live
        // lead so a refresh during the drag cannot replay stale state.
        let Some(live) = self.lead(session.lead_id()) else {
            tracing::debug!(lead_id = %session.lead_id(), "dragged lead vanished before drop");
            return BoardOutcome::StaleDrop(session.lead_id().clone());
        };
        let mut payload = session.payload.clone();
        payload.lead = live.clone();

        match column::resolve_drop(stage, &payload) {
            ColumnDrop::Rejected => BoardOutcome::Abandoned,
            ColumnDrop::SameStage => BoardOutcome::Dropped(TransitionOutcome::SameStage),
            ColumnDrop::Transition(request) => BoardOutcome::Dropped(self.submit(request)),
        }
    }

    fn on_persist_ok(&mut self, request: RequestId) -> BoardOutcome {
        match self.pending.remove(&request) {
            Some(p) => {
                tracing::debug!(request_id = %request, lead_id = %p.lead_id, "move confirmed");
                BoardOutcome::Confirmed(request)
            }
            None => BoardOutcome::Ignored,
        }
    }

    fn on_persist_fail(&mut self, request: RequestId, reason: &str) -> BoardOutcome {
        let Some(failed) = self.pending.remove(&request) else {
            return BoardOutcome::Ignored;
        };
        tracing::warn!(
            request_id = %request,
            lead_id = %failed.lead_id,
            from = %failed.from,
            to = %failed.to,
            reason,
            "persisting move failed"
        );
        self.sink
            .report(NotificationKind::Error, PERSIST_FAILED_TITLE, reason);

        // A later move of the same lead is still in flight: it stacked on top
        // of this one, so its undo must go all the way back.
        let later = self
            .pending
            .range_mut(request..)
            .find(|(_, p)| p.lead_id == failed.lead_id);
        if let Some((_, next)) = later {
            next.from = failed.from;
            next.rank = failed.rank;
            return BoardOutcome::Superseded(request);
        }

        let Some(idx) = self
            .leads
            .iter()
            .position(|l| l.id == failed.lead_id && l.status == failed.to)
        else {
            return BoardOutcome::FailedWithoutRevert(request);
        };

        // A reload in between renumbered the list; the old rank means nothing
        // there, so only the status goes back.
        if self.ranks[idx] != failed.moved_rank {
            self.leads[idx].status = failed.from;
            self.recompute_stats();
            return BoardOutcome::Reverted(request);
        }

        let mut lead = self.leads.remove(idx);
        self.ranks.remove(idx);
        lead.status = failed.from;
        let at = self.ranks.partition_point(|&r| r < failed.rank);
        self.leads.insert(at, lead);
        self.ranks.insert(at, failed.rank);
        self.recompute_stats();
        BoardOutcome::Reverted(request)
    }

    fn replace_leads(&mut self, leads: Vec<Lead>) -> usize {
        self.leads = leads;
        let start = self.next_rank;
        self.next_rank += self.leads.len() as u64;
        self.ranks = (start..self.next_rank).collect();
        let orphans: Vec<&str> = self
            .leads
            .iter()
            .filter(|l| !self.registry.contains(&l.status))
            .map(|l| l.id.as_str())
            .collect();
        if !orphans.is_empty() {
            tracing::warn!(
                count = orphans.len(),
                lead_ids = ?orphans,
                "leads with unknown status are hidden from every column"
            );
        }
        let negative: Vec<&str> = self
            .leads
            .iter()
            .filter(|l| l.has_negative_value())
            .map(|l| l.id.as_str())
            .collect();
        if !negative.is_empty() {
            tracing::warn!(
                count = negative.len(),
                lead_ids = ?negative,
                "leads with negative value count as zero"
            );
        }
        self.recompute_stats();
        tracing::info!(leads = self.leads.len(), "board loaded");
        self.leads.len()
    }

    fn take_rank(&mut self) -> u64 {
        let rank = self.next_rank;
        self.next_rank += 1;
        rank
    }

    fn recompute_stats(&mut self) {
        self.stats = FunnelStats::compute(&self.leads, &self.registry);
    }
}
