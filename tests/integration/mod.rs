//! Integration tests for the tzcal HTTP API

mod api_tests;
mod profile_tests;
