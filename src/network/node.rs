//! Nodes of the network and their edges

use std::cell::Cell;
use std::fmt;

use crate::network::fcode::Fcode;
use crate::network::signal::Signal;

/// Role of an input node
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum InputType {
    /// Primary input, bound to a port bit
    Primary,
    /// Data output of a flip-flop
    FlipFlopOutput,
    /// Data output of a latch
    LatchOutput,
}

/// Role of an output node
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum OutputType {
    /// Primary output, bound to a port bit
    Primary,
    /// Data input of a flip-flop
    FlipFlopData,
    /// Clock of a flip-flop
    FlipFlopClock,
    /// Asynchronous set of a flip-flop
    FlipFlopSet,
    /// Asynchronous reset of a flip-flop
    FlipFlopReset,
    /// Data input of a latch
    LatchData,
    /// Enable of a latch
    LatchEnable,
}

/// Kind of a node
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum NodeKind {
    /// Source of the logic: primary input or sequential element output
    Input(InputType),
    /// Sink of the logic: primary output or sequential element pin
    Output(OutputType),
    /// Two-input logic gate
    Logic,
}

/// Association between a node and the port, flip-flop or latch it is a pin of
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum AuxData {
    /// Bit of a port
    Port {
        /// Port id
        port: usize,
        /// Bit position in the port
        bit: usize,
    },
    /// Pin of a flip-flop
    FlipFlop(usize),
    /// Pin of a latch
    Latch(usize),
}

/// Reference to an edge, by destination node and input position
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct EdgeRef {
    /// Destination node
    pub to: usize,
    /// Input position in the destination node (0 or 1)
    pub pos: usize,
}

/// An edge between two nodes
///
/// Edges are stored in their destination node. A missing source is the constant zero.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Edge {
    pub(crate) from: Option<usize>,
    pub(crate) to: usize,
    pub(crate) pos: usize,
}

impl Edge {
    /// Source node of the edge, or None for a constant
    pub fn from(&self) -> Option<usize> {
        self.from
    }

    /// Destination node of the edge
    pub fn to(&self) -> usize {
        self.to
    }

    /// Input position in the destination node
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Reference to this edge
    pub fn edge_ref(&self) -> EdgeRef {
        EdgeRef {
            to: self.to,
            pos: self.pos,
        }
    }
}

/// A node of the network
///
/// Nodes are owned by the network and addressed by id. Their content is only modified
/// through the network, which maintains the fanout lists and the structural hash.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: usize,
    pub(crate) kind: NodeKind,
    pub(crate) fcode: Fcode,
    pub(crate) fanins: [Edge; 2],
    pub(crate) output_inv: bool,
    pub(crate) fanouts: Vec<EdgeRef>,
    pub(crate) pomark: bool,
    pub(crate) level: Cell<Option<usize>>,
    pub(crate) aux: Option<AuxData>,
}

impl Node {
    /// Create an unconnected node
    pub(crate) fn new(id: usize, kind: NodeKind) -> Node {
        Node {
            id,
            kind,
            fcode: Fcode::ZERO,
            fanins: [
                Edge {
                    from: None,
                    to: id,
                    pos: 0,
                },
                Edge {
                    from: None,
                    to: id,
                    pos: 1,
                },
            ],
            output_inv: false,
            fanouts: Vec::new(),
            pomark: false,
            level: Cell::new(None),
            aux: None,
        }
    }

    /// Id of the node
    pub fn id(&self) -> usize {
        self.id
    }

    /// Printable name of the node, derived from its id
    pub fn id_str(&self) -> String {
        format!("n{}", self.id)
    }

    /// Uninverted signal for this node
    pub fn signal(&self) -> Signal {
        Signal::from_node(self.id)
    }

    /// Kind of the node
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns whether the node is an input
    pub fn is_input(&self) -> bool {
        matches!(self.kind, NodeKind::Input(_))
    }

    /// Returns whether the node is an output
    pub fn is_output(&self) -> bool {
        matches!(self.kind, NodeKind::Output(_))
    }

    /// Returns whether the node is a logic gate
    pub fn is_logic(&self) -> bool {
        self.kind == NodeKind::Logic
    }

    /// Role of an input node
    pub fn input_type(&self) -> Option<InputType> {
        match self.kind {
            NodeKind::Input(t) => Some(t),
            _ => None,
        }
    }

    /// Role of an output node
    pub fn output_type(&self) -> Option<OutputType> {
        match self.kind {
            NodeKind::Output(t) => Some(t),
            _ => None,
        }
    }

    /// Function code of a logic node
    pub fn fcode(&self) -> Fcode {
        assert!(self.is_logic(), "Node {} is not a logic node", self.id);
        self.fcode
    }

    /// Returns whether the node is an And gate, with optional inversions
    pub fn is_and(&self) -> bool {
        self.is_logic() && self.fcode.is_and()
    }

    /// Returns whether the node is a Xor gate
    pub fn is_xor(&self) -> bool {
        self.is_logic() && self.fcode.is_xor()
    }

    /// Fanin edge at the given position
    pub fn fanin_edge(&self, pos: usize) -> &Edge {
        assert!(
            pos < self.nb_fanins(),
            "Node {} has no fanin at position {pos}",
            self.id
        );
        &self.fanins[pos]
    }

    /// Number of fanins: 2 for logic, 1 for outputs, 0 for inputs
    pub fn nb_fanins(&self) -> usize {
        match self.kind {
            NodeKind::Input(_) => 0,
            NodeKind::Output(_) => 1,
            NodeKind::Logic => 2,
        }
    }

    /// Fanin node at the given position, or None for a constant
    pub fn fanin(&self, pos: usize) -> Option<usize> {
        self.fanin_edge(pos).from
    }

    /// First fanin of a logic node
    pub fn fanin0(&self) -> usize {
        self.logic_fanin(0)
    }

    /// Second fanin of a logic node
    pub fn fanin1(&self) -> usize {
        self.logic_fanin(1)
    }

    fn logic_fanin(&self, pos: usize) -> usize {
        assert!(self.is_logic(), "Node {} is not a logic node", self.id);
        match self.fanins[pos].from {
            Some(id) => id,
            None => panic!("Logic node {} has a dangling fanin", self.id),
        }
    }

    /// Polarity with which an And-like logic node reads its fanin
    ///
    /// For `f = !a & b`, the polarity of the first fanin is true. Xor gates have no
    /// input polarity and always return false. For output nodes, this is the output inversion.
    pub fn fanin_inv(&self, pos: usize) -> bool {
        match self.kind {
            NodeKind::Output(_) => {
                assert_eq!(pos, 0, "Output node {} has a single fanin", self.id);
                self.output_inv
            }
            NodeKind::Logic => {
                assert!(pos < 2, "Logic node {} has two fanins", self.id);
                match self.fcode.and_polarity() {
                    Some((i0, i1, _)) => [i0, i1][pos],
                    None => false,
                }
            }
            NodeKind::Input(_) => panic!("Input node {} has no fanin", self.id),
        }
    }

    /// Fanin signal with its polarity, as read by an And-like gate or an output
    pub fn fanin_signal(&self, pos: usize) -> Signal {
        Signal::from_parts(self.fanin(pos), self.fanin_inv(pos))
    }

    /// Fanin node of an output node, or None if driven by a constant
    pub fn output_fanin(&self) -> Option<usize> {
        assert!(self.is_output(), "Node {} is not an output", self.id);
        self.fanins[0].from
    }

    /// Inversion of the fanin of an output node
    pub fn output_fanin_inv(&self) -> bool {
        assert!(self.is_output(), "Node {} is not an output", self.id);
        self.output_inv
    }

    /// Signal driving an output node
    pub fn output_fanin_signal(&self) -> Signal {
        Signal::from_parts(self.output_fanin(), self.output_fanin_inv())
    }

    /// Edges driven by this node
    pub fn fanouts(&self) -> &[EdgeRef] {
        &self.fanouts
    }

    /// Number of edges driven by this node
    pub fn fanout_num(&self) -> usize {
        self.fanouts.len()
    }

    /// Returns whether the node drives an output node directly
    pub fn pomark(&self) -> bool {
        self.pomark
    }

    /// Port, flip-flop or latch this node is a pin of
    pub fn aux(&self) -> Option<AuxData> {
        self.aux
    }

    /// Port and bit position for a port pin
    pub fn port_bit(&self) -> Option<(usize, usize)> {
        match self.aux {
            Some(AuxData::Port { port, bit }) => Some((port, bit)),
            _ => None,
        }
    }

    /// Flip-flop this node is a pin of
    pub fn flipflop(&self) -> Option<usize> {
        match self.aux {
            Some(AuxData::FlipFlop(id)) => Some(id),
            _ => None,
        }
    }

    /// Latch this node is a pin of
    pub fn latch(&self) -> Option<usize> {
        match self.aux {
            Some(AuxData::Latch(id)) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            NodeKind::Input(_) => write!(f, "input"),
            NodeKind::Output(_) => write!(f, "output({})", self.output_fanin_signal()),
            NodeKind::Logic => write!(
                f,
                "{}({}, {})",
                self.fcode,
                Signal::from_parts(self.fanins[0].from, false),
                Signal::from_parts(self.fanins[1].from, false)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_node() {
        let n = Node::new(3, NodeKind::Input(InputType::Primary));
        assert_eq!(n.id(), 3);
        assert!(n.is_input());
        assert!(!n.is_logic());
        assert_eq!(n.nb_fanins(), 0);
        assert_eq!(n.fanout_num(), 0);
        assert!(!n.pomark());
        assert_eq!(n.input_type(), Some(InputType::Primary));
        assert_eq!(n.output_type(), None);
        assert_eq!(n.aux(), None);
        assert_eq!(n.signal(), Signal::from_node(3));
    }

    #[test]
    fn test_fanin_polarity() {
        let mut n = Node::new(2, NodeKind::Logic);
        n.fcode = Fcode::AND_NOT1;
        n.fanins[0].from = Some(0);
        n.fanins[1].from = Some(1);
        assert_eq!(n.fanin_signal(0), Signal::from_node(0));
        assert_eq!(n.fanin_signal(1), !Signal::from_node(1));
        assert!(n.is_and());
        assert_eq!(format!("{n}"), "Lut0x2(n0, n1)");

        n.fcode = Fcode::XOR;
        assert!(!n.fanin_inv(0) && !n.fanin_inv(1));
        assert!(n.is_xor());
    }

    #[test]
    fn test_output_node() {
        let mut n = Node::new(1, NodeKind::Output(OutputType::Primary));
        assert_eq!(n.output_fanin_signal(), Signal::zero());
        n.output_inv = true;
        assert_eq!(n.output_fanin_signal(), Signal::one());
        n.fanins[0].from = Some(0);
        assert_eq!(n.output_fanin_signal(), !Signal::from_node(0));
        assert_eq!(format!("{n}"), "output(!n0)");
    }

    #[test]
    #[should_panic]
    fn test_input_fanin() {
        let n = Node::new(0, NodeKind::Input(InputType::Primary));
        n.fanin(0);
    }
}
