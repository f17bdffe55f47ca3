//! Data models

mod event;
mod event_log;
mod profile;

pub use event::*;
pub use event_log::*;
pub use profile::*;
