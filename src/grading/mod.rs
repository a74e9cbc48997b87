// src/grading/mod.rs

//! Scoring of submissions and reconstruction of reviewed results.
//! Nothing in here touches the store or HTTP.

pub mod review;
pub mod scoring;

pub use review::{DetailedResult, ReviewMarks, assemble_detail};
pub use scoring::{ScoreOutcome, score};
