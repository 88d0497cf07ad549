//! HTTP peer transport: the listener (`server`) other nodes hit to ask this
//! node for a key it owns, and the client (`client`/`picker`) this node uses
//! to ask other nodes for keys they own.

pub mod client;
pub mod metrics;
pub mod picker;
pub mod server;

pub use client::HttpPeerGetter;
pub use picker::HttpPeerPicker;
