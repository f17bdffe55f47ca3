//! Shared scenario state


pub use world::TestWorld;
