use funnel_core::types::{Lead, LeadId};

use crate::drag::{DragEngine, DragPayload};

/// Which part of a card the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardRegion {
    Body,
    /// The edit affordance. Never starts a drag.
    EditControl,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardEvent {
    DragStart(DragPayload),
    Edit(LeadId),
}

/// One lead rendered as a draggable card.
#[derive(Debug, Clone, Copy)]
pub struct FunnelCard<'a> {
    lead: &'a Lead,
    dragging: bool,
}

impl<'a> FunnelCard<'a> {
    pub fn new(lead: &'a Lead, drag: &DragEngine) -> Self {
        Self {
            lead,
            dragging: drag.is_dragging(&lead.id),
        }
    }

    pub fn lead(&self) -> &'a Lead {
        self.lead
    }

    /// True while this card's lead is the one being dragged.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Translate a pointer-down into a card event. The edit control is
    /// handled here and never reaches drag start.
    pub fn pointer_down(&self, region: CardRegion) -> CardEvent {
        match region {
            CardRegion::EditControl => CardEvent::Edit(self.lead.id.clone()),
            CardRegion::Body => CardEvent::DragStart(self.payload()),
        }
    }

    /// Snapshot of the lead as it is right now.
    pub fn payload(&self) -> DragPayload {
        DragPayload::lead_card(self.lead.clone())
    }

    pub fn value_label(&self) -> Option<String> {
        self.lead.value.map(|v| format!("{v:.2}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::{PointerOffset, LEAD_CARD};

    fn lead() -> Lead {
        Lead::new("7", "Ada", "ada@example.com", "new").with_value(1500.0)
    }

    #[test]
    fn test_body_starts_drag_with_snapshot() {
        let lead = lead();
        let card = FunnelCard::new(&lead, &DragEngine::new());
        match card.pointer_down(CardRegion::Body) {
            CardEvent::DragStart(payload) => {
                assert_eq!(payload.kind, LEAD_CARD);
                assert_eq!(payload.lead, lead);
            }
            other => panic!("expected drag start, got {other:?}"),
        }
    }

    #[test]
    fn test_edit_control_never_drags() {
        let lead = lead();
        let card = FunnelCard::new(&lead, &DragEngine::new());
        assert_eq!(
            card.pointer_down(CardRegion::EditControl),
            CardEvent::Edit(LeadId::from("7"))
        );
    }

    #[test]
    fn test_dragging_flag_follows_engine() {
        let lead = lead();
        let other = Lead::new("8", "Grace", "g@example.com", "new");
        let mut engine = DragEngine::new();
        engine
            .start(DragPayload::lead_card(lead.clone()), PointerOffset::new(0.0, 0.0))
            .unwrap();
        assert!(FunnelCard::new(&lead, &engine).is_dragging());
        assert!(!FunnelCard::new(&other, &engine).is_dragging());
    }

    #[test]
    fn test_snapshot_is_detached_from_live_lead() {
        let mut lead = lead();
        let payload = FunnelCard::new(&lead, &DragEngine::new()).payload();
        lead.status = "lost".into();
        assert_eq!(payload.lead.status, "new");
    }

    #[test]
    fn test_value_label() {
        let lead = lead();
        let card = FunnelCard::new(&lead, &DragEngine::new());
        assert_eq!(card.value_label().as_deref(), Some("1500.00"));
        let bare = Lead::new("9", "Linus", "l@example.com", "new");
        assert!(FunnelCard::new(&bare, &DragEngine::new()).value_label().is_none());
    }
}
