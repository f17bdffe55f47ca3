//! Business logic services
//!
//! - [`timezone`] converts between wall-clock readings and instants
//! - [`audit`] diffs event edits into audit log changes
//! - [`profiles`] is the profile directory
//! - [`events`] is the event store, driving the other three

pub mod audit;
pub mod error;
pub mod events;
pub mod profiles;
pub mod timezone;

pub use error::SchedulingError;
pub use events::EventService;
pub use profiles::ProfileService;
pub use timezone::{FormatSpec, TimeInput, TimezoneError};
