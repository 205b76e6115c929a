//! Ports, flip-flops and latches: the owners of input and output nodes

use crate::network::node::AuxData;

/// A named, multi-bit port of the network
///
/// Each bit may have an input node, an output node, or both for bidirectional ports.
#[derive(Debug, Clone)]
pub struct Port {
    pub(crate) id: usize,
    pub(crate) name: String,
    pub(crate) inputs: Vec<Option<usize>>,
    pub(crate) outputs: Vec<Option<usize>>,
}

impl Port {
    pub(crate) fn new(id: usize, name: &str, bit_width: usize) -> Port {
        Port {
            id,
            name: name.to_string(),
            inputs: vec![None; bit_width],
            outputs: vec![None; bit_width],
        }
    }

    /// Id of the port
    pub fn id(&self) -> usize {
        self.id
    }

    /// Name of the port
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of bits
    pub fn bit_width(&self) -> usize {
        self.inputs.len()
    }

    /// Input node of a bit, if any
    pub fn input(&self, bit: usize) -> Option<usize> {
        assert!(
            bit < self.bit_width(),
            "Bit {bit} is out of range for port {} of width {}",
            self.name,
            self.bit_width()
        );
        self.inputs[bit]
    }

    /// Output node of a bit, if any
    pub fn output(&self, bit: usize) -> Option<usize> {
        assert!(
            bit < self.bit_width(),
            "Bit {bit} is out of range for port {} of width {}",
            self.name,
            self.bit_width()
        );
        self.outputs[bit]
    }

    /// Association given to the nodes of a bit
    pub fn aux(&self, bit: usize) -> AuxData {
        assert!(bit < self.bit_width());
        AuxData::Port { port: self.id, bit }
    }
}

/// A D flip-flop with asynchronous set and reset
///
/// The data output is an input node of the network; the other pins are output nodes.
#[derive(Debug, Clone)]
pub struct FlipFlop {
    pub(crate) id: usize,
    pub(crate) name: String,
    pub(crate) output: usize,
    pub(crate) input: usize,
    pub(crate) clock: usize,
    pub(crate) set: usize,
    pub(crate) reset: usize,
}

impl FlipFlop {
    /// Id of the flip-flop
    pub fn id(&self) -> usize {
        self.id
    }

    /// Name of the flip-flop
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data output node
    pub fn output(&self) -> usize {
        self.output
    }

    /// Data input node
    pub fn input(&self) -> usize {
        self.input
    }

    /// Clock node
    pub fn clock(&self) -> usize {
        self.clock
    }

    /// Set node
    pub fn set(&self) -> usize {
        self.set
    }

    /// Reset node
    pub fn reset(&self) -> usize {
        self.reset
    }

    /// All pin nodes, data output first
    pub fn pins(&self) -> [usize; 5] {
        [self.output, self.input, self.clock, self.set, self.reset]
    }
}

/// A level-sensitive latch
///
/// The data output is an input node of the network; the other pins are output nodes.
#[derive(Debug, Clone)]
pub struct Latch {
    pub(crate) id: usize,
    pub(crate) name: String,
    pub(crate) output: usize,
    pub(crate) input: usize,
    pub(crate) enable: usize,
}

impl Latch {
    /// Id of the latch
    pub fn id(&self) -> usize {
        self.id
    }

    /// Name of the latch
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Data output node
    pub fn output(&self) -> usize {
        self.output
    }

    /// Data input node
    pub fn input(&self) -> usize {
        self.input
    }

    /// Enable node
    pub fn enable(&self) -> usize {
        self.enable
    }

    /// All pin nodes, data output first
    pub fn pins(&self) -> [usize; 3] {
        [self.output, self.input, self.enable]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port() {
        let p = Port::new(2, "data", 4);
        assert_eq!(p.id(), 2);
        assert_eq!(p.name(), "data");
        assert_eq!(p.bit_width(), 4);
        assert_eq!(p.input(3), None);
        assert_eq!(p.output(0), None);
        assert_eq!(p.aux(1), AuxData::Port { port: 2, bit: 1 });
    }

    #[test]
    #[should_panic]
    fn test_port_out_of_range() {
        let p = Port::new(0, "a", 2);
        p.input(2);
    }
}
