//! Xuci Trainer · Mandarin function-word practice
//!
//! Multiple-choice and judgment questions on prepositions, particles,
//! conjunctions and modal particles, served by an adaptive difficulty engine
//! that moves between a basic and an advanced tier based on answer streaks.
//!
//! - `engine`: the adaptive difficulty state machine
//! - `bank` / `seeds`: the question repository
//! - `session` / `store`: the practice host and its local persistence
//! - `report` / `catalog`: end-of-session analysis

pub mod bank;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod pinyin;
pub mod report;
pub mod seeds;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod terminal;
pub mod util;
