//! Test fixtures for mission-planner.
//!
//! Provides realistic test data including:
//! - Real Senegalese city coordinates (from OpenStreetMap)
//! - Helpers turning cities into sites

pub mod senegal_cities;

pub use senegal_cities::*;
