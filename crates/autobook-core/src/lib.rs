//! Autobook engine: poll a fitness-class catalog for a target date and claim
//! the first class that matches the configured filters.

pub mod api;
pub mod claim;
pub mod clock;
pub mod config;
pub mod control;
pub mod events;
pub mod filter;
pub mod http;
pub mod logging;
pub mod model;
pub mod poll;
pub mod retry;
pub mod schedule;

#[cfg(test)]
mod testkit;
