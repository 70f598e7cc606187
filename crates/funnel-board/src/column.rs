use funnel_core::types::{Lead, Stage, StageKey};

use crate::card::FunnelCard;
use crate::drag::{DragEngine, DragPayload, LEAD_CARD};

/// A request to move `lead` into `target`, raised by a column on drop.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest {
    pub lead: Lead,
    pub target: StageKey,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDrop {
    /// The payload is not a lead card.
    Rejected,
    /// The lead already sits in this column.
    SameStage,
    Transition(TransitionRequest),
}

/// Decide what a drop of `payload` onto `stage`'s column means.
pub fn resolve_drop(stage: &Stage, payload: &DragPayload) -> ColumnDrop {
    if !accepts(payload.kind) {
        return ColumnDrop::Rejected;
    }
    if payload.lead.status == stage.key {
        return ColumnDrop::SameStage;
    }
    ColumnDrop::Transition(TransitionRequest {
        lead: payload.lead.clone(),
        target: stage.key.clone(),
    })
}

pub fn accepts(kind: &str) -> bool {
    kind == LEAD_CARD
}

/// Leads belonging to `stage`, in list order.
pub fn visible<'a>(stage: &'a StageKey, leads: &'a [Lead]) -> impl Iterator<Item = &'a Lead> + 'a {
    leads.iter().filter(move |l| &l.status == stage)
}

/// A stage column as rendered for one frame. Built from the board's lead
/// list on demand; it keeps no copy of its own.
#[derive(Debug, Clone)]
pub struct FunnelColumn<'a> {
    pub stage: &'a Stage,
    pub cards: Vec<FunnelCard<'a>>,
    /// A drag is hovering this column.
    pub is_active_drop_target: bool,
    /// A transition into this column is waiting on the store.
    pub is_moving: bool,
}

impl<'a> FunnelColumn<'a> {
    pub fn build(stage: &'a Stage, leads: &'a [Lead], drag: &DragEngine, is_moving: bool) -> Self {
        let cards = visible(&stage.key, leads)
            .map(|lead| FunnelCard::new(lead, drag))
            .collect();
        let is_active_drop_target = drag
            .session()
            .is_some_and(|s| accepts(s.payload.kind) && s.hover.as_ref() == Some(&stage.key));
        Self {
            stage,
            cards,
            is_active_drop_target,
            is_moving,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn total_value(&self) -> f64 {
        self.cards.iter().map(|c| c.lead().amount()).sum()
    }

    pub fn lead_ids(&self) -> Vec<&str> {
        self.cards.iter().map(|c| c.lead().id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::PointerOffset;

    fn qualified() -> Stage {
        Stage::new("qualified", "Qualified", "#f59e0b")
    }

    #[test]
    fn test_drop_on_other_stage_requests_transition() {
        let lead = Lead::new("1", "Ada", "a@example.com", "new");
        let drop = resolve_drop(&qualified(), &DragPayload::lead_card(lead.clone()));
        assert_eq!(
            drop,
            ColumnDrop::Transition(TransitionRequest {
                lead,
                target: StageKey::from("qualified"),
            })
        );
    }

    #[test]
    fn test_drop_on_own_stage_is_noop() {
        let lead = Lead::new("1", "Ada", "a@example.com", "qualified");
        let drop = resolve_drop(&qualified(), &DragPayload::lead_card(lead));
        assert_eq!(drop, ColumnDrop::SameStage);
    }

    #[test]
    fn test_foreign_payload_rejected() {
        let payload = DragPayload {
            kind: "file",
            lead: Lead::new("1", "Ada", "a@example.com", "new"),
        };
        assert_eq!(resolve_drop(&qualified(), &payload), ColumnDrop::Rejected);
    }

    #[test]
    fn test_build_filters_by_status_in_list_order() {
        let stage = qualified();
        let leads = vec![
            Lead::new("3", "C", "c@example.com", "qualified").with_value(10.0),
            Lead::new("1", "A", "a@example.com", "new"),
            Lead::new("2", "B", "b@example.com", "qualified").with_value(5.0),
        ];
        let column = FunnelColumn::build(&stage, &leads, &DragEngine::new(), false);
        assert_eq!(column.lead_ids(), ["3", "2"]);
        assert_eq!(column.len(), 2);
        assert_eq!(column.total_value(), 15.0);
        assert!(!column.is_active_drop_target);
    }

    #[test]
    fn test_active_only_while_hovered() {
        let stage = qualified();
        let leads = vec![Lead::new("1", "A", "a@example.com", "new")];
        let mut drag = DragEngine::new();
        drag.start(
            DragPayload::lead_card(leads[0].clone()),
            PointerOffset::new(1.0, 1.0),
        )
        .unwrap();
        assert!(!FunnelColumn::build(&stage, &leads, &drag, false).is_active_drop_target);

        drag.hover(StageKey::from("qualified")).unwrap();
        assert!(FunnelColumn::build(&stage, &leads, &drag, false).is_active_drop_target);

        drag.leave(&StageKey::from("qualified")).unwrap();
        assert!(!FunnelColumn::build(&stage, &leads, &drag, false).is_active_drop_target);
    }
}
