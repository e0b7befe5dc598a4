//! Core types and service wiring for the gomibi trash collection notifier.

/// Configuration keys, file format, and precedence rules.
pub mod config;
/// Notification text and the reference document eras.
pub mod message;
/// Domain models shared by the calculator and the relays.
pub mod model;
/// Traits describing the outbound relay interface.
pub mod ports;
/// Recurrence rules and the dated override table.
pub mod schedule;
/// High-level service facade used by the binary.
pub mod service;
/// Hour-of-day window deciding between today and tomorrow.
pub mod window;

pub use config::*;
pub use message::*;
pub use model::*;
pub use ports::*;
pub use schedule::*;
pub use service::*;
pub use window::*;
