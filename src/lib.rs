//! Deterministic simulation engine for a hex-grid tile-painting arcade
//! game: player movement with pathfinding autopilot, adversary pursuit
//! behaviors, hazards and timed power-ups, combo scoring, and a level
//! progression state machine. Rendering, audio and input capture live
//! outside this crate; they consume snapshots and events from
//! [`engine::GameEngine`].

pub mod board;
pub mod catalog;
pub mod constants;
pub mod engine;
pub mod hex;
pub mod pathfind;
pub mod rng;
pub mod scheduler;
pub mod types;
