use funnel_core::types::*;
use serde_json::json;

#[test]
fn lead_creation() {
    let lead = Lead::new("l-1", "Ada", "ada@example.com", "new");
    assert_eq!(lead.id, LeadId::from("l-1"));
    assert_eq!(lead.status, "new");
    assert!(lead.value.is_none());
    assert!(lead.service.is_none());
    assert_eq!(lead.amount(), 0.0);
}

#[test]
fn lead_builder_sets_optional_fields() {
    let lead = Lead::new("l-2", "Grace", "grace@example.com", "qualified")
        .with_value(1200.0)
        .with_service("consulting");
    assert_eq!(lead.value, Some(1200.0));
    assert_eq!(lead.amount(), 1200.0);
    assert_eq!(lead.service.as_deref(), Some("consulting"));
}

#[test]
fn lead_uses_camel_case_and_skips_absent_value() {
    let lead = Lead::new("l-3", "Linus", "linus@example.com", "contacted");
    let value = serde_json::to_value(&lead).expect("serialize");
    assert!(value.get("createdAt").is_some());
    assert!(value.get("value").is_none());
    assert!(value.get("service").is_none());
    assert_eq!(value["status"], "contacted");
    assert_eq!(value["id"], "l-3");
}

#[test]
fn lead_parses_store_payload() {
    let raw = json!({
        "id": "42",
        "name": "Margaret",
        "email": "m@example.com",
        "createdAt": "2024-03-01T10:00:00Z",
        "status": "proposal",
        "value": 2500.5,
    });
    let lead: Lead = serde_json::from_value(raw).expect("deserialize");
    assert_eq!(lead.id.as_str(), "42");
    assert_eq!(lead.status, StageKey::from("proposal"));
    assert_eq!(lead.value, Some(2500.5));
    assert!(lead.service.is_none());
}

#[test]
fn stage_terminal_markers() {
    let open = Stage::new("new", "New", "#fff");
    assert!(!open.is_terminal());

    let won = Stage::new("customer", "Customer", "#0f0").terminal(Terminal::Won);
    assert!(won.is_terminal());
    assert!(won.is_won());
    assert!(!won.is_lost());

    let lost = Stage::new("lost", "Lost", "#f00").terminal(Terminal::Lost);
    assert!(lost.is_lost());
}

#[test]
fn amount_clamps_negative_values() {
    let lead = Lead::new("1", "Ada", "ada@example.com", "new");
    assert_eq!(lead.amount(), 0.0);
    assert!(!lead.has_negative_value());

    let lead = lead.with_value(-40.0);
    assert!(lead.has_negative_value());
    assert_eq!(lead.amount(), 0.0);
    assert_eq!(lead.value, Some(-40.0));
}
