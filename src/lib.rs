//! Headcount - per-minute concurrent attendance from join/leave exports
//!
//! Turns raw participant join/leave records from one or more venues into a
//! minute-by-minute count of people present, merges the venues onto one time
//! axis with a `Total` column, and pads the axis to whole hours.
//!
//! Pipeline: [`ingest`] → [`interval`] → [`occupancy`] (per source, in
//! parallel) → [`aligner`] → [`padding`] → [`csv_output`] / [`html_output`]
//! / [`json_output`]. [`pipeline::run`] wires it together from a
//! [`config::PipelineConfig`].

pub mod aligner;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod discovery;
pub mod error;
pub mod html_output;
pub mod ingest;
pub mod interval;
pub mod json_output;
pub mod occupancy;
pub mod padding;
pub mod pipeline;
pub mod table;
pub mod time_point;

pub use error::{OccupancyError, Result};
