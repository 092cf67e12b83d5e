//! Common functionality for rotoplan.
#![warn(missing_docs)]
pub mod allocation;
pub mod commands;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod schedule;
pub mod settings;
pub mod solver;
pub mod units;

#[cfg(test)]
mod fixture;
