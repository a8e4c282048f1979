//! Player session management for Tugquiz.
//!
//! A session is the server's outbound mailbox for one connected player:
//! an unbounded channel whose receiving half is pumped into the player's
//! WebSocket by the connection handler. The room layer above never touches
//! sockets — it addresses players by id and hands frames to
//! [`SessionManager::multicast`].
//!
//! ```text
//! Room layer (above)   ← addresses players by PlayerId
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Transport (below)    ← one pump task per WebSocket connection
//! ```

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::Session;
