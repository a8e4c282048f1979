//! # Tugquiz
//!
//! Real-time tug-of-war trivia server.
//!
//! Two players join a room and race to answer the same timed questions; each
//! round's winner pulls a shared cursor toward their edge, and reaching an
//! edge wins the game. This crate ties the layers together: WebSocket
//! transport on the outside, the session registry in the middle, and the
//! room scheduler (in `tugquiz-room`) doing the actual work.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use tugquiz::TugquizServer;
//! use tugquiz_resistance::ResistanceFactory;
//!
//! let server = TugquizServer::builder()
//!     .bind("0.0.0.0:9090")
//!     .build(ResistanceFactory)
//!     .await?;
//! server.run().await
//! ```

mod error;
mod handler;
mod server;

pub use error::TugquizError;
pub use server::{TugquizServer, TugquizServerBuilder};
