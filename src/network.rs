//! Representation and handling of logic networks

pub mod arena;
pub mod fcode;
pub mod generators;
pub mod id_pool;
mod network;
pub mod node;
mod order;
pub mod owners;
mod signal;
pub mod stats;
pub mod strash;
mod tree;

pub use fcode::Fcode;
pub use network::Network;
pub use node::{AuxData, Edge, EdgeRef, InputType, Node, NodeKind, OutputType};
pub use owners::{FlipFlop, Latch, Port};
pub use signal::Signal;
