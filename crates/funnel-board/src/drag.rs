//! Drag sessions.
//!
//! The interaction model is single-pointer, so the engine holds at most one
//! session in a single slot. A session starts on a card, follows the pointer,
//! tracks the column it hovers, and ends either in a drop or a cancel.

use chrono::{DateTime, Utc};
use funnel_core::types::{Lead, LeadId, StageKey};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The only payload kind columns accept.
pub const LEAD_CARD: &str = "lead-card";

/// Pointer position relative to the board's origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerOffset {
    pub x: f64,
    pub y: f64,
}

impl PointerOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What a drag carries: the lead by value, captured when the drag began.
#[derive(Debug, Clone, PartialEq)]
pub struct DragPayload {
    pub kind: &'static str,
    pub lead: Lead,
}

impl DragPayload {
    pub fn lead_card(lead: Lead) -> Self {
        Self {
            kind: LEAD_CARD,
            lead,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DragSession {
    pub id: Uuid,
    pub payload: DragPayload,
    pub origin: PointerOffset,
    /// `None` once the pointer leaves the tracked area.
    pub pointer: Option<PointerOffset>,
    pub hover: Option<StageKey>,
    pub started_at: DateTime<Utc>,
}

impl DragSession {
    pub fn lead_id(&self) -> &LeadId {
        &self.payload.lead.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DragError {
    #[error("a drag session is already active: {0}")]
    SessionActive(Uuid),
    #[error("no drag session is active")]
    NoSession,
}

#[derive(Debug, Default)]
pub struct DragEngine {
    slot: Option<DragSession>,
}

impl DragEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session. Fails while another session is active.
    pub fn start(&mut self, payload: DragPayload, origin: PointerOffset) -> Result<Uuid, DragError> {
        if let Some(active) = &self.slot {
            return Err(DragError::SessionActive(active.id));
        }
        let session = DragSession {
            id: Uuid::new_v4(),
            payload,
            origin,
            pointer: Some(origin),
            hover: None,
            started_at: Utc::now(),
        };
        let id = session.id;
        tracing::debug!(session_id = %id, lead_id = %session.lead_id(), "drag started");
        self.slot = Some(session);
        Ok(id)
    }

    pub fn move_to(&mut self, pointer: Option<PointerOffset>) -> Result<(), DragError> {
        let session = self.slot.as_mut().ok_or(DragError::NoSession)?;
        session.pointer = pointer;
        Ok(())
    }

    pub fn hover(&mut self, stage: StageKey) -> Result<(), DragError> {
        let session = self.slot.as_mut().ok_or(DragError::NoSession)?;
        session.hover = Some(stage);
        Ok(())
    }

    /// Clear the hover target, but only if it is still `stage`. A late leave
    /// from the previous column must not wipe the hover of the next one.
    pub fn leave(&mut self, stage: &StageKey) -> Result<(), DragError> {
        let session = self.slot.as_mut().ok_or(DragError::NoSession)?;
        if session.hover.as_ref() == Some(stage) {
            session.hover = None;
        }
        Ok(())
    }

    /// End the session for a drop, handing it to the caller.
    pub fn finish(&mut self) -> Result<DragSession, DragError> {
        self.slot.take().ok_or(DragError::NoSession)
    }

    /// Abandon the session. No transition follows.
    pub fn cancel(&mut self) -> Option<DragSession> {
        let session = self.slot.take();
        if let Some(s) = &session {
            tracing::debug!(session_id = %s.id, lead_id = %s.lead_id(), "drag cancelled");
        }
        session
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.slot.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.slot.is_some()
    }

    pub fn is_dragging(&self, lead: &LeadId) -> bool {
        self.slot.as_ref().is_some_and(|s| s.lead_id() == lead)
    }

    pub fn hovered(&self) -> Option<&StageKey> {
        self.slot.as_ref().and_then(|s| s.hover.as_ref())
    }
}
