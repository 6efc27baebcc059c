//! Observability for the census service
//!
//! Structured JSON logging keyed by typed lifecycle [`Event`]s.
//!
//! # Usage
//!
//! ```ignore
//! use census::observability::{Event, Logger};
//!
//! Logger::info(Event::DatasheetLoaded, &[("file", "Currency.txt"), ("records", "42")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
