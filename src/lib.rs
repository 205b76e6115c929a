//! Canonical network of two-input gates
//!
//! This crate provides the in-memory representation of a gate-level logic circuit, as used by
//! logic synthesis and verification tools. Front ends populate a [`Network`], back ends read it.
//!
//! # Datastructures
//!
//! `Network` is a Gate-Inverter-Graph: every logic node is a two-input gate described by its
//! truth table, an [`Fcode`]. Inverters are implicit, occupying just one bit in [`Signal`].
//!
//! Logic nodes are hash-consed: a gate is only created if no gate with the same function and
//! the same inputs exists. Functions are kept in a canonical form, so that equivalent gates
//! are shared regardless of how they were written:
//! * the output of the gate is zero when both inputs are zero, the inversion being on the signal;
//! * the first input of the gate has the smaller id;
//! * gates with constant inputs, the same input twice or ignoring an input are never created.
//!
//! As a result, only five functions exist in the network: And, Or, Xor, and Ands with one
//! inverted input.
//!
//! ```
//! # use bdnet::{Network, Signal};
//! let mut net = Network::new();
//! let port = net.new_input_port("i", 2);
//! let a = Signal::from_node(net.port(port).input(0).unwrap());
//! let b = Signal::from_node(net.port(port).input(1).unwrap());
//! let x = net.new_and(a, b);
//! assert_eq!(net.new_and(b, a), x);
//! assert_eq!(net.new_or(!a, !b), !x);
//! assert_eq!(net.nb_logic(), 1);
//! ```
//!
//! Inputs and outputs of the logic belong to ports, flip-flops and latches.
//! Ids of nodes, flip-flops and latches are reused after deletion: a stale id may refer to a
//! different object later on.
//!
//! # Usage
//!
//! The crate is distributed as a library, with a small binary to inspect generated networks.
//! ```bash
//! # Show the statistics of a 16-bit adder
//! bdnet show adder -n 16
//! # Print a random network, node by node
//! bdnet dump random -n 4 --seed 3
//! ```

#![warn(missing_docs)]

pub mod network;
pub mod sim;

pub use network::{generators, stats, Fcode, Network, Signal};
