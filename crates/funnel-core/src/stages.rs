//! The ordered list of pipeline stages.
//!
//! Order is only used to lay columns out left to right. Any stage may move to
//! any other stage; there is no forward-only rule.

use crate::types::{Stage, StageKey, Terminal};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("stage registry must not be empty")]
    Empty,
    #[error("stage key must not be empty (position {0})")]
    BlankKey(usize),
    #[error("duplicate stage key: {0}")]
    DuplicateKey(String),
    #[error("expected exactly one won stage, found {0}")]
    WonStageCount(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRegistry {
    stages: Vec<Stage>,
    won: usize,
}

impl StageRegistry {
    /// Build a registry, rejecting empty lists, blank or duplicate keys and
    /// anything other than a single won stage.
    pub fn new(stages: Vec<Stage>) -> Result<Self, RegistryError> {
        if stages.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = std::collections::HashSet::new();
        for (idx, stage) in stages.iter().enumerate() {
            if stage.key.as_str().trim().is_empty() {
                return Err(RegistryError::BlankKey(idx));
            }
            if !seen.insert(stage.key.as_str()) {
                return Err(RegistryError::DuplicateKey(stage.key.to_string()));
            }
        }

        let won: Vec<usize> = stages
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_won())
            .map(|(idx, _)| idx)
            .collect();
        if won.len() != 1 {
            return Err(RegistryError::WonStageCount(won.len()));
        }

        Ok(Self {
            won: won[0],
            stages,
        })
    }

    /// The standard sales pipeline: new, contacted, qualified, opportunity,
    /// proposal, customer (won) and lost.
    pub fn default_pipeline() -> Self {
        Self {
            stages: default_stages(),
            won: 5,
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stage> {
        self.stages.iter()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn get(&self, key: &StageKey) -> Option<&Stage> {
        self.stages.iter().find(|s| &s.key == key)
    }

    pub fn contains(&self, key: &StageKey) -> bool {
        self.get(key).is_some()
    }

    /// Left-to-right column index of `key`.
    pub fn position(&self, key: &StageKey) -> Option<usize> {
        self.stages.iter().position(|s| &s.key == key)
    }

    pub fn is_terminal(&self, key: &StageKey) -> bool {
        self.get(key).is_some_and(Stage::is_terminal)
    }

    pub fn terminal_kind(&self, key: &StageKey) -> Option<Terminal> {
        self.get(key).and_then(|s| s.terminal)
    }

    /// The single stage that counts as converted.
    pub fn won_stage(&self) -> &Stage {
        &self.stages[self.won]
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::default_pipeline()
    }
}

impl<'a> IntoIterator for &'a StageRegistry {
    type Item = &'a Stage;
    type IntoIter = std::slice::Iter<'a, Stage>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}

pub fn default_stages() -> Vec<Stage> {
    vec![
        Stage::new("new", "New", "#3b82f6"),
        Stage::new("contacted", "Contacted", "#8b5cf6"),
        Stage::new("qualified", "Qualified", "#f59e0b"),
        Stage::new("opportunity", "Opportunity", "#f97316"),
        Stage::new("proposal", "Proposal", "#06b6d4"),
        Stage::new("customer", "Customer", "#22c55e").terminal(Terminal::Won),
        Stage::new("lost", "Lost", "#ef4444").terminal(Terminal::Lost),
    ]
}
