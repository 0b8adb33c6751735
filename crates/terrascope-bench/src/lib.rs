//! Native CPU benchmark of the per-frame update pipeline: parameter
//! revisions, texture slot swaps, material sync and the frame clock.

pub mod report;
pub mod runner;
pub mod scenes;
