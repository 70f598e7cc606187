use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Stable identity of a lead, as assigned by the lead store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(String);

impl LeadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for LeadId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LeadId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Key of a pipeline stage. A lead's `status` holds one of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageKey(String);

impl StageKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for StageKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StageKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for StageKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StageKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// ---------------------------------------------------------------------------
// Lead
// ---------------------------------------------------------------------------

/// A lead as it sits on the board. Only `status` is mutated by the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub status: StageKey,
    /// Monetary amount. `None` is an unvalued lead, not a zero-valued one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl Lead {
    pub fn new(
        id: impl Into<LeadId>,
        name: impl Into<String>,
        email: impl Into<String>,
        status: impl Into<StageKey>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            created_at: Utc::now(),
            status: status.into(),
            value: None,
            service: None,
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// The amount this lead contributes to monetary sums. Negative or NaN
    /// amounts count as zero.
    pub fn amount(&self) -> f64 {
        self.value.map_or(0.0, |v| v.max(0.0))
    }

    /// A present value below zero, which no store should hand out.
    pub fn has_negative_value(&self) -> bool {
        self.value.is_some_and(|v| v < 0.0)
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    /// Converted. Leads here count toward conversion and realized value.
    Won,
    /// Permanently lost.
    Lost,
}

/// One column of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub key: StageKey,
    pub title: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<Terminal>,
}

impl Stage {
    pub fn new(key: impl Into<StageKey>, title: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            color: color.into(),
            terminal: None,
        }
    }

    pub fn terminal(mut self, terminal: Terminal) -> Self {
        self.terminal = Some(terminal);
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    pub fn is_won(&self) -> bool {
        self.terminal == Some(Terminal::Won)
    }

    pub fn is_lost(&self) -> bool {
        self.terminal == Some(Terminal::Lost)
    }
}
