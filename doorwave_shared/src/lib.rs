//! `doorwave_shared`
//!
//! Shared libraries used by the client and the room server's peers.
//!
//! Design goals:
//! - Deterministic and modular where practical.
//! - Clear separation of concerns (net, room model, math, config).
//! - No `unsafe`.

pub mod chat;
pub mod config;
pub mod math;
pub mod net;
pub mod room;
pub mod shop;

pub mod prelude {
    //! Commonly used exports.

    pub use crate::config::*;
    pub use crate::math::*;
    pub use crate::net::*;
    pub use crate::room::*;
}
