// src/models/mod.rs

//! Domain models for the repost service.

mod candidate;

pub use candidate::Candidate;
