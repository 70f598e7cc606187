use serde::{Deserialize, Serialize};

use crate::stages::StageRegistry;
use crate::types::{Lead, StageKey, Terminal};

/// Per-stage count and value, in registry order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageTally {
    pub key: StageKey,
    pub count: usize,
    pub value: f64,
}

/// Aggregates derived from the current lead list. Never stored; recompute
/// with [`FunnelStats::compute`] whenever the list changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelStats {
    /// All leads on the board, including those with an unknown status.
    pub total_leads: usize,
    /// Leads carrying a `value`.
    pub valued_leads: usize,
    /// Percentage (0..=100) of leads in the won stage.
    pub conversion_rate: f64,
    /// Value still in flight: leads not in a terminal stage, including
    /// those with an unknown status.
    pub potential_value: f64,
    /// Value of leads in the won stage.
    pub realized_value: f64,
    /// Value of leads in a lost stage.
    pub lost_value: f64,
    /// Leads whose status is not a registered stage.
    pub orphaned: usize,
    pub by_stage: Vec<StageTally>,
}

impl FunnelStats {
    pub fn compute(leads: &[Lead], registry: &StageRegistry) -> Self {
        let mut by_stage: Vec<StageTally> = registry
            .iter()
            .map(|s| StageTally {
                key: s.key.clone(),
                count: 0,
                value: 0.0,
            })
            .collect();

        let mut stats = FunnelStats {
            total_leads: leads.len(),
            valued_leads: 0,
            conversion_rate: 0.0,
            potential_value: 0.0,
            realized_value: 0.0,
            lost_value: 0.0,
            orphaned: 0,
            by_stage: Vec::new(),
        };
        let mut won = 0usize;

        for lead in leads {
            if lead.value.is_some() {
                stats.valued_leads += 1;
            }
            let amount = lead.amount();
            let Some(idx) = registry.position(&lead.status) else {
                stats.orphaned += 1;
                stats.potential_value += amount;
                continue;
            };
            by_stage[idx].count += 1;
            by_stage[idx].value += amount;

            match registry.stages()[idx].terminal {
                Some(Terminal::Won) => {
                    won += 1;
                    stats.realized_value += amount;
                }
                Some(Terminal::Lost) => stats.lost_value += amount,
                None => stats.potential_value += amount,
            }
        }

        if stats.total_leads > 0 {
            stats.conversion_rate = won as f64 / stats.total_leads as f64 * 100.0;
        }
        stats.by_stage = by_stage;
        stats
    }

    pub fn tally(&self, key: &StageKey) -> Option<&StageTally> {
        self.by_stage.iter().find(|t| &t.key == key)
    }
}
