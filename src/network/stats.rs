//! Compute gate statistics
//!
//! ```
//! # use bdnet::Network;
//! # let net = Network::new();
//! use bdnet::network::stats::stats;
//! let stats = stats(&net);
//!
//! // Check that there is no Xor2 gate
//! assert_eq!(stats.nb_xor, 0);
//!
//! // Show the statistics
//! println!("{}", stats);
//! ```

use std::fmt;

use crate::network::node::InputType;
use crate::Network;

/// Number of inputs, outputs and gates in a network
#[derive(Clone, Debug)]
pub struct NetworkStats {
    /// Number of primary inputs
    pub nb_inputs: usize,
    /// Number of primary outputs
    pub nb_outputs: usize,
    /// Number of ports
    pub nb_ports: usize,
    /// Number of And and similar gates
    pub nb_and: usize,
    /// Number of And gates by number of inverted inputs
    pub and_inversions: [usize; 3],
    /// Number of Xor gates
    pub nb_xor: usize,
    /// Number of flip-flops
    pub nb_flipflops: usize,
    /// Number of latches
    pub nb_latches: usize,
    /// Number of logic nodes that drive nothing
    pub nb_dangling: usize,
    /// Logic depth
    pub level: usize,
    /// Largest fanout of a node
    pub max_fanout: usize,
}

impl NetworkStats {
    /// Total number of logic gates
    pub fn nb_gates(&self) -> usize {
        self.nb_and + self.nb_xor
    }
}

impl fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stats:")?;
        writeln!(f, "  Ports: {}", self.nb_ports)?;
        writeln!(f, "  Inputs: {}", self.nb_inputs)?;
        writeln!(f, "  Outputs: {}", self.nb_outputs)?;
        writeln!(f, "  Gates: {}", self.nb_gates())?;
        if self.nb_flipflops != 0 {
            writeln!(f, "  Flip-flops: {}", self.nb_flipflops)?;
        }
        if self.nb_latches != 0 {
            writeln!(f, "  Latches: {}", self.nb_latches)?;
        }
        if self.nb_and != 0 {
            writeln!(f, "  And: {}", self.nb_and)?;
            for (i, nb) in self.and_inversions.iter().enumerate() {
                if *nb != 0 {
                    writeln!(f, "      {} inverted: {}", i, nb)?;
                }
            }
        }
        if self.nb_xor != 0 {
            writeln!(f, "  Xor: {}", self.nb_xor)?;
        }
        if self.nb_dangling != 0 {
            writeln!(f, "  Dangling: {}", self.nb_dangling)?;
        }
        writeln!(f, "  Level: {}", self.level)?;
        writeln!(f, "  Max fanout: {}", self.max_fanout)?;
        fmt::Result::Ok(())
    }
}

/// Compute the statistics of the network
pub fn stats(a: &Network) -> NetworkStats {
    let mut ret = NetworkStats {
        nb_inputs: a
            .inputs()
            .iter()
            .filter(|&&i| a.node(i).input_type() == Some(InputType::Primary))
            .count(),
        nb_outputs: a
            .outputs()
            .iter()
            .filter(|&&o| a.node(o).port_bit().is_some())
            .count(),
        nb_ports: a.nb_ports(),
        nb_and: 0,
        and_inversions: [0; 3],
        nb_xor: 0,
        nb_flipflops: a.nb_flipflops(),
        nb_latches: a.nb_latches(),
        nb_dangling: 0,
        level: a.level(),
        max_fanout: a.nodes().map(|n| n.fanout_num()).max().unwrap_or(0),
    };
    for &id in a.logic_nodes() {
        let n = a.node(id);
        if n.is_xor() {
            ret.nb_xor += 1;
        } else {
            ret.nb_and += 1;
            let nb_inv = n.fanin_inv(0) as usize + n.fanin_inv(1) as usize;
            ret.and_inversions[nb_inv] += 1;
        }
        if n.fanout_num() == 0 {
            ret.nb_dangling += 1;
        }
    }
    ret
}

#[cfg(test)]
mod tests {
    use super::stats;
    use crate::network::generators::{adder, testcases};

    #[test]
    fn test_adder_stats() {
        let net = adder::ripple_carry(4);
        let s = stats(&net);
        assert_eq!(s.nb_inputs, 8);
        assert_eq!(s.nb_outputs, 5);
        assert_eq!(s.nb_ports, 3);
        assert_eq!(s.nb_gates(), net.nb_logic());
        assert_eq!(s.nb_dangling, 0);
        assert!(s.nb_xor >= 4);
        // Or gates read both inputs inverted
        assert!(s.and_inversions[2] > 0);
        format!("{s}");
    }

    #[test]
    fn test_sequential_stats() {
        let net = testcases::toggle_chain(3);
        let s = stats(&net);
        assert_eq!(s.nb_flipflops, 3);
        assert_eq!(s.nb_inputs, 2);
        assert_eq!(s.nb_outputs, 1);
        assert_eq!(s.nb_xor, 1);
        assert_eq!(s.level, 1);
    }
}
