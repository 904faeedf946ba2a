mod client;
mod push;
mod wire;

pub use client::BackendClient;
pub use push::spawn_push_worker;
pub use wire::{GraphStats, RawGraph};
#[cfg(test)]
pub use wire::{RawCluster, RawEdge, RawNode};
