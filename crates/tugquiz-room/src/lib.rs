//! Room lifecycle and round scheduling for Tugquiz.
//!
//! This crate is the heart of the server: it owns every room, drives the
//! round state machine under time pressure, and survives players dropping
//! off mid-game. Everything time-bounded here — the pre-game countdown, the
//! per-round timer, the inter-round gap, the post-victory teardown, the
//! reconnect grace period — is a plain spawned task that re-validates the
//! world when it wakes, so a stale wakeup can never act on a room that
//! moved on without it.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates/destroys rooms, routes every operation
//! - [`GameEngine`] / [`EngineFactory`] — the contract a game mode implements
//! - [`RoomConfig`] — capacity and every delay of the scheduler
//! - [`Broadcaster`] — translates room events into session-layer multicasts
//!
//! # Concurrency model
//!
//! One mutex per room serializes the scheduler, the disconnect handler, and
//! registry operations against the same room record. Locks are never held
//! across an await point; the delay tasks sleep unlocked and re-acquire on
//! wake. Rooms share nothing but the registry's lookup maps.

mod broadcast;
mod config;
mod engine;
mod error;
mod reconnect;
mod registry;
mod room;
mod scheduler;

pub use broadcast::Broadcaster;
pub use config::RoomConfig;
pub use engine::{EngineFactory, GameEngine, Question};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::Player;
