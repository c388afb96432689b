//! Pipeline stages for financial-statement extraction.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets the heuristics
//! (patterns, floors, lookahead) be tuned without touching the plumbing
//! around them.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ pages ──▶ locate ──▶ rows ──▶ classify
//! (path)   (text)    (page #)   (cells)  (normalize + record)
//! ```
//!
//! 1. [`input`]     — validate the manifest path points at a readable PDF
//! 2. [`pages`]     — extract one text string per page (`pdf-extract`)
//! 3. [`locate`]    — find the statement page by title-phrase match in the
//!    hint window
//! 4. [`rows`]      — split page text into rows of raw cells, merging
//!    continuation lines
//! 5. [`classify`]  — match rows against the metric rule table, driving
//!    [`normalize`] over each matched row's cells
//!
//! [`normalize`] is the core contract of the crate: a cell either parses to a
//! signed decimal or is unavailable, never silently zero.

pub mod classify;
pub mod input;
pub mod locate;
pub mod normalize;
pub mod pages;
pub mod rows;
