use funnel_core::stages::StageRegistry;
use funnel_core::stats::FunnelStats;
use funnel_core::types::{Lead, StageKey};

fn lead(id: &str, status: &str, value: Option<f64>) -> Lead {
    let mut lead = Lead::new(id, format!("Lead {id}"), format!("{id}@example.com"), status);
    lead.value = value;
    lead
}

#[test]
fn empty_list_reports_zeroes() {
    let stats = FunnelStats::compute(&[], &StageRegistry::default());
    assert_eq!(stats.total_leads, 0);
    assert_eq!(stats.conversion_rate, 0.0);
    assert_eq!(stats.potential_value, 0.0);
    assert_eq!(stats.realized_value, 0.0);
}

#[test]
fn half_converted_board() {
    let leads = vec![
        lead("1", "customer", Some(500.0)),
        lead("2", "new", None),
    ];
    let stats = FunnelStats::compute(&leads, &StageRegistry::default());
    assert_eq!(stats.total_leads, 2);
    assert_eq!(stats.conversion_rate, 50.0);
    assert_eq!(stats.potential_value, 0.0);
    assert_eq!(stats.realized_value, 500.0);
    assert_eq!(stats.valued_leads, 1);
}

#[test]
fn single_in_flight_lead() {
    let leads = vec![lead("1", "qualified", Some(1000.0))];
    let stats = FunnelStats::compute(&leads, &StageRegistry::default());
    assert_eq!(stats.potential_value, 1000.0);
    assert_eq!(stats.realized_value, 0.0);
    assert_eq!(stats.conversion_rate, 0.0);
}

#[test]
fn unvalued_leads_still_count() {
    let leads = vec![
        lead("1", "new", None),
        lead("2", "contacted", None),
        lead("3", "customer", None),
    ];
    let stats = FunnelStats::compute(&leads, &StageRegistry::default());
    assert_eq!(stats.total_leads, 3);
    assert_eq!(stats.valued_leads, 0);
    assert_eq!(stats.realized_value, 0.0);
    assert!((stats.conversion_rate - 100.0 / 3.0).abs() < 1e-9);
}

#[test]
fn value_partitions_across_terminal_and_open_stages() {
    let leads = vec![
        lead("1", "new", Some(100.0)),
        lead("2", "proposal", Some(250.0)),
        lead("3", "customer", Some(400.0)),
        lead("4", "customer", None),
        lead("5", "opportunity", Some(50.0)),
    ];
    let stats = FunnelStats::compute(&leads, &StageRegistry::default());
    let total: f64 = leads.iter().filter_map(|l| l.value).sum();
    assert_eq!(stats.potential_value + stats.realized_value, total);
    assert_eq!(stats.lost_value, 0.0);
}

#[test]
fn lost_value_is_neither_potential_nor_realized() {
    let leads = vec![
        lead("1", "lost", Some(300.0)),
        lead("2", "new", Some(100.0)),
        lead("3", "customer", Some(200.0)),
    ];
    let stats = FunnelStats::compute(&leads, &StageRegistry::default());
    assert_eq!(stats.potential_value, 100.0);
    assert_eq!(stats.realized_value, 200.0);
    assert_eq!(stats.lost_value, 300.0);
    assert_eq!(
        stats.potential_value + stats.realized_value + stats.lost_value,
        600.0
    );
}

#[test]
fn orphaned_leads_count_toward_potential_value() {
    let leads = vec![
        lead("1", "archived", Some(900.0)),
        lead("2", "customer", Some(100.0)),
    ];
    let stats = FunnelStats::compute(&leads, &StageRegistry::default());
    assert_eq!(stats.total_leads, 2);
    assert_eq!(stats.orphaned, 1);
    assert_eq!(stats.conversion_rate, 50.0);
    assert_eq!(stats.potential_value, 900.0);
    assert_eq!(stats.realized_value, 100.0);
    assert_eq!(stats.potential_value + stats.realized_value, 1000.0);
    assert_eq!(stats.lost_value, 0.0);
    let counted: usize = stats.by_stage.iter().map(|t| t.count).sum();
    assert_eq!(counted, 1);
}

#[test]
fn per_stage_tally() {
    let leads = vec![
        lead("1", "new", Some(10.0)),
        lead("2", "new", Some(15.0)),
        lead("3", "lost", None),
    ];
    let stats = FunnelStats::compute(&leads, &StageRegistry::default());
    let new = stats.tally(&StageKey::from("new")).expect("new tally");
    assert_eq!(new.count, 2);
    assert_eq!(new.value, 25.0);
    let lost = stats.tally(&StageKey::from("lost")).expect("lost tally");
    assert_eq!(lost.count, 1);
    assert_eq!(lost.value, 0.0);
}

#[test]
fn negative_values_count_as_zero() {
    let leads = vec![
        lead("1", "new", Some(-250.0)),
        lead("2", "proposal", Some(100.0)),
        lead("3", "customer", Some(-5.0)),
    ];
    let stats = FunnelStats::compute(&leads, &StageRegistry::default());
    assert_eq!(stats.valued_leads, 3);
    assert_eq!(stats.potential_value, 100.0);
    assert_eq!(stats.realized_value, 0.0);
    assert_eq!(stats.tally(&StageKey::from("new")).expect("tally").value, 0.0);
}
