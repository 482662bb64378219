//! mission-planner core
//!
//! Orders the sites of a multi-stop field mission to minimize travel time,
//! then expands the order into a day-by-day itinerary that respects working
//! hours, travel hours and recurring breaks.

pub mod config;
pub mod error;
pub mod event;
pub mod haversine;
pub mod matrix;
pub mod order;
pub mod scheduler;
pub mod site;
pub mod solver;
pub mod traits;
pub mod window;
