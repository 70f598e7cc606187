use funnel_core::types::LeadId;

use crate::drag::{DragEngine, PointerOffset};

/// Follow-the-pointer preview of the dragged lead.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayPreview {
    pub lead_id: LeadId,
    pub name: String,
    pub email: String,
    pub value: Option<f64>,
    pub position: PointerOffset,
}

/// Derive the preview from the engine. Nothing is shown without a session
/// or once the pointer position is unknown.
pub fn render(drag: &DragEngine) -> Option<OverlayPreview> {
    let session = drag.session()?;
    let position = session.pointer?;
    let lead = &session.payload.lead;
    Some(OverlayPreview {
        lead_id: lead.id.clone(),
        name: lead.name.clone(),
        email: lead.email.clone(),
        value: lead.value,
        position,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::DragPayload;
    use funnel_core::types::Lead;

    #[test]
    fn test_nothing_without_session() {
        assert!(render(&DragEngine::new()).is_none());
    }

    #[test]
    fn test_follows_pointer() {
        let mut drag = DragEngine::new();
        let lead = Lead::new("1", "Ada", "ada@example.com", "new").with_value(99.0);
        drag.start(DragPayload::lead_card(lead), PointerOffset::new(4.0, 8.0))
            .unwrap();

        let preview = render(&drag).unwrap();
        assert_eq!(preview.name, "Ada");
        assert_eq!(preview.email, "ada@example.com");
        assert_eq!(preview.value, Some(99.0));
        assert_eq!(preview.position, PointerOffset::new(4.0, 8.0));

        drag.move_to(Some(PointerOffset::new(40.0, 12.5))).unwrap();
        assert_eq!(render(&drag).unwrap().position, PointerOffset::new(40.0, 12.5));
    }

    #[test]
    fn test_hidden_when_pointer_lost() {
        let mut drag = DragEngine::new();
        let lead = Lead::new("1", "Ada", "ada@example.com", "new");
        drag.start(DragPayload::lead_card(lead), PointerOffset::new(0.0, 0.0))
            .unwrap();
        drag.move_to(None).unwrap();
        assert!(render(&drag).is_none());
        assert!(drag.is_active());
    }
}
