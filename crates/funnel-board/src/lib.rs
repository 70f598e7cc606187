//! Drag-and-drop pipeline board: a single-session drag engine, the card,
//! column and overlay views derived from it, and the coordinator that turns
//! drops into optimistic, store-confirmed stage transitions.
//!
//! Key components:
//! - **Drag**: the one-slot session engine ([`drag::DragEngine`])
//! - **Views**: [`card::FunnelCard`], [`column::FunnelColumn`] and the
//!   [`overlay`] preview, rebuilt from board state on every render
//! - **Board**: [`board::FunnelBoard`], the event-queue state machine
//! - **Collaborators**: [`store::LeadStore`] and [`notify::NotificationSink`]

pub mod board;
pub mod card;
pub mod column;
pub mod drag;
pub mod notify;
pub mod overlay;
pub mod store;

pub use board::{BoardEvent, BoardOutcome, FunnelBoard, RequestId, TransitionOutcome};
