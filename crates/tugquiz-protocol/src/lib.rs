//! Wire protocol for Tugquiz.
//!
//! This crate defines the language that clients and the server speak:
//!
//! - **Types** ([`ClientCommand`], [`GameMessage`], [`RoomState`], the id
//!   newtypes) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from text frames.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding or
//!   decoding.
//!
//! The protocol layer sits below sessions and rooms. It knows nothing about
//! connections, timers, or game rules — only message shapes.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientCommand, ClientQuestion, GameMessage, PlayerId, RoomId, RoomState,
    RoomSummary,
};
