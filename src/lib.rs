//! Aggregation engine for public activity profiles.
//!
//! A profile snapshot is flattened by [`normalize::normalize_profile`] into
//! one list of [`models::NormalizedItem`]s; every other module derives a view
//! from that list without touching it.

pub mod charts;
pub mod export;
pub mod grouping;
pub mod models;
pub mod normalize;
pub mod profile;
pub mod report;
pub mod stats;
pub mod timeline;
