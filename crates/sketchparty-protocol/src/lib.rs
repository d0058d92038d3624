//! Wire protocol for Sketchparty.
//!
//! This crate defines what clients and the server exchange:
//!
//! - **Identity** ([`MemberId`], [`RoomId`]) and the member record
//!   ([`Member`], [`Avatar`], [`Point`]).
//! - **Inbound events** ([`ClientEvent`]): one variant per named client event.
//! - **Routing** ([`Recipient`]): who a room-produced event goes to.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): events to and from text.
//!
//! Outbound events carry game state and so live next to it, in the
//! room crate.
//!
//! ```text
//! Transport (frames) → Protocol (ClientEvent) → Room (state machine)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Avatar, ClientEvent, Member, MemberId, Point, Recipient, RoomId,
};
