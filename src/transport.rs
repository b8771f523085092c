//! Byte-stream transport between the two parties.

pub mod channel;
pub mod wire;

pub use channel::Channel;
