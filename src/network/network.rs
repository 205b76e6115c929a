use std::cell::Cell;
use std::fmt;

use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;
use log::debug;

use crate::network::arena::NodeArena;
use crate::network::fcode::{normalize, Fcode, Normalization};
use crate::network::id_pool::IdPool;
use crate::network::node::{
    AuxData, Edge, EdgeRef, InputType, Node, NodeKind, OutputType,
};
use crate::network::owners::{FlipFlop, Latch, Port};
use crate::network::signal::Signal;
use crate::network::strash::{StrashKey, StrashTable};

/// Representation of a logic network as a graph of two-input gates
///
/// Logic nodes are kept in canonical form and structurally hashed: two live logic nodes never
/// share the same function code and fanins. Inversions are carried by the signals that reference
/// the nodes, so that a node and its complement are the same node.
///
/// Misuse of the API (dangling ids, wrong node kinds, combinational loops) is a programming error
/// and results in a panic.
///
/// ```
/// # use bdnet::{Network, Signal};
/// let mut net = Network::new();
/// let port = net.new_port("a", 2);
/// let a0 = Signal::from_node(net.new_port_input(port, 0));
/// let a1 = Signal::from_node(net.new_port_input(port, 1));
/// let x = net.new_and(a0, a1);
/// assert_eq!(net.new_and(a1, a0), x);
/// assert_eq!(net.new_nand(a0, a1), !x);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Network {
    name: String,
    ports: Vec<Port>,
    flipflops: Vec<Option<FlipFlop>>,
    flipflop_ids: IdPool,
    latches: Vec<Option<Latch>>,
    latch_ids: IdPool,
    nodes: NodeArena,
    inputs: Vec<usize>,
    outputs: Vec<usize>,
    logic: Vec<usize>,
    strash: StrashTable,
    pub(crate) level: Cell<Option<usize>>,
}

impl Network {
    /// Create a new network
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new network with a given initial size for the structural hash
    pub fn with_hash_capacity(capacity: usize) -> Self {
        Network {
            strash: StrashTable::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Name of the network
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the name of the network
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// Remove everything from the network
    pub fn clear(&mut self) {
        self.name.clear();
        self.ports.clear();
        self.flipflops.clear();
        self.flipflop_ids.clear();
        self.latches.clear();
        self.latch_ids.clear();
        self.nodes.clear();
        self.inputs.clear();
        self.outputs.clear();
        self.logic.clear();
        self.strash.clear();
        self.level.set(None);
    }

    /// Number of ports
    pub fn nb_ports(&self) -> usize {
        self.ports.len()
    }

    /// Get a port by id
    pub fn port(&self, id: usize) -> &Port {
        &self.ports[id]
    }

    /// All ports, in creation order
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Number of live flip-flops
    pub fn nb_flipflops(&self) -> usize {
        self.flipflop_ids.nb_allocated()
    }

    /// Bound on the ids of live flip-flops
    pub fn max_flipflop_id(&self) -> usize {
        self.flipflop_ids.capacity()
    }

    /// Get a live flip-flop by id
    pub fn flipflop(&self, id: usize) -> &FlipFlop {
        match self.flipflops.get(id) {
            Some(Some(ff)) => ff,
            _ => panic!("Flip-flop {id} does not exist"),
        }
    }

    /// Iterate over the live flip-flops by increasing id
    pub fn flipflops(&self) -> impl Iterator<Item = &FlipFlop> + '_ {
        self.flipflops.iter().flatten()
    }

    /// Number of live latches
    pub fn nb_latches(&self) -> usize {
        self.latch_ids.nb_allocated()
    }

    /// Bound on the ids of live latches
    pub fn max_latch_id(&self) -> usize {
        self.latch_ids.capacity()
    }

    /// Get a live latch by id
    pub fn latch(&self, id: usize) -> &Latch {
        match self.latches.get(id) {
            Some(Some(l)) => l,
            _ => panic!("Latch {id} does not exist"),
        }
    }

    /// Iterate over the live latches by increasing id
    pub fn latches(&self) -> impl Iterator<Item = &Latch> + '_ {
        self.latches.iter().flatten()
    }

    /// Bound on the ids of live nodes, for use as the size of per-node tables
    pub fn max_node_id(&self) -> usize {
        self.nodes.max_id()
    }

    /// Number of live nodes
    pub fn nb_nodes(&self) -> usize {
        self.nodes.nb_live()
    }

    /// Returns whether a node id is live
    pub fn is_live(&self, id: usize) -> bool {
        self.nodes.is_live(id)
    }

    /// Get a live node by id
    pub fn node(&self, id: usize) -> &Node {
        self.nodes.get(id)
    }

    /// Iterate over all live nodes by increasing id
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter()
    }

    /// Number of input nodes, including sequential element outputs
    pub fn nb_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Input nodes, in creation order
    pub fn inputs(&self) -> &[usize] {
        &self.inputs
    }

    /// Number of output nodes, including sequential element pins
    pub fn nb_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Output nodes, in creation order
    pub fn outputs(&self) -> &[usize] {
        &self.outputs
    }

    /// Number of logic nodes
    pub fn nb_logic(&self) -> usize {
        self.logic.len()
    }

    /// Logic nodes, in creation order
    pub fn logic_nodes(&self) -> &[usize] {
        &self.logic
    }

    /// Access an edge from its reference
    pub fn edge(&self, e: EdgeRef) -> &Edge {
        self.node(e.to).fanin_edge(e.pos)
    }

    /// For a bit of a bidirectional port, the node on the other side: the output node for an
    /// input node and the input node for an output node
    pub fn alt_node(&self, id: usize) -> Option<usize> {
        let n = self.node(id);
        let (port, bit) = n.port_bit()?;
        if n.is_input() {
            self.ports[port].outputs[bit]
        } else {
            self.ports[port].inputs[bit]
        }
    }

    /// Returns whether `target` is in the transitive fanin of `id`, or is `id` itself
    pub fn depends_on(&self, id: usize, target: usize) -> bool {
        self.reaches(vec![id], target)
    }

    /// Returns whether `target` is in the transitive fanin of any of the signals
    pub(crate) fn signals_depend_on(&self, sigs: &[Signal], target: usize) -> bool {
        self.reaches(sigs.iter().filter_map(|s| s.node()).collect(), target)
    }

    /// Depth-first search of `target` in the transitive fanin of several nodes at once
    fn reaches(&self, mut to_visit: Vec<usize>, target: usize) -> bool {
        let mut visited = FxHashSet::default();
        while let Some(n) = to_visit.pop() {
            if n == target {
                return true;
            }
            if !visited.insert(n) {
                continue;
            }
            let node = self.node(n);
            to_visit.extend((0..node.nb_fanins()).filter_map(|pos| node.fanin(pos)));
        }
        false
    }

    /// Add a new port with the given bit width; its pins are created separately
    pub fn new_port(&mut self, name: &str, bit_width: usize) -> usize {
        let id = self.ports.len();
        self.ports.push(Port::new(id, name, bit_width));
        id
    }

    /// Create the input node of a port bit
    pub fn new_port_input(&mut self, port: usize, bit: usize) -> usize {
        let aux = self.ports[port].aux(bit);
        assert!(
            self.ports[port].inputs[bit].is_none(),
            "Bit {bit} of port {} already has an input",
            self.ports[port].name
        );
        let id = self.alloc_input(InputType::Primary, aux);
        self.ports[port].inputs[bit] = Some(id);
        id
    }

    /// Create the output node of a port bit, driven by constant zero
    pub fn new_port_output(&mut self, port: usize, bit: usize) -> usize {
        let aux = self.ports[port].aux(bit);
        assert!(
            self.ports[port].outputs[bit].is_none(),
            "Bit {bit} of port {} already has an output",
            self.ports[port].name
        );
        let id = self.alloc_output(OutputType::Primary, aux);
        self.ports[port].outputs[bit] = Some(id);
        id
    }

    /// Add a new input port and create the input nodes for all its bits
    pub fn new_input_port(&mut self, name: &str, bit_width: usize) -> usize {
        let port = self.new_port(name, bit_width);
        for bit in 0..bit_width {
            self.new_port_input(port, bit);
        }
        port
    }

    /// Add a new output port and create the output nodes for all its bits
    pub fn new_output_port(&mut self, name: &str, bit_width: usize) -> usize {
        let port = self.new_port(name, bit_width);
        for bit in 0..bit_width {
            self.new_port_output(port, bit);
        }
        port
    }

    /// Find a port by name; with several ports of the same name, the first one is returned
    pub fn port_by_name(&self, name: &str) -> Option<usize> {
        self.ports.iter().position(|p| p.name == name)
    }

    /// Add a new 1-bit port with an input node; return the node
    pub fn new_input(&mut self, name: &str) -> usize {
        let port = self.new_port(name, 1);
        self.new_port_input(port, 0)
    }

    /// Add a new 1-bit port with an output node; return the node
    pub fn new_output(&mut self, name: &str) -> usize {
        let port = self.new_port(name, 1);
        self.new_port_output(port, 0)
    }

    /// Add a new flip-flop, with its data output as an input node and all other pins as output
    /// nodes driven by constant zero
    ///
    /// Flip-flop ids are reused after deletion.
    pub fn new_flipflop(&mut self, name: &str) -> usize {
        let id = self.flipflop_ids.alloc();
        let aux = AuxData::FlipFlop(id);
        let ff = FlipFlop {
            id,
            name: name.to_string(),
            output: self.alloc_input(InputType::FlipFlopOutput, aux),
            input: self.alloc_output(OutputType::FlipFlopData, aux),
            clock: self.alloc_output(OutputType::FlipFlopClock, aux),
            set: self.alloc_output(OutputType::FlipFlopSet, aux),
            reset: self.alloc_output(OutputType::FlipFlopReset, aux),
        };
        if id == self.flipflops.len() {
            self.flipflops.push(Some(ff));
        } else {
            self.flipflops[id] = Some(ff);
        }
        id
    }

    /// Delete a flip-flop and all its pin nodes
    ///
    /// The data output of the flip-flop must not drive anything.
    pub fn delete_flipflop(&mut self, id: usize) {
        let ff = self.flipflop(id).clone();
        assert_eq!(
            self.node(ff.output).fanout_num(),
            0,
            "Output of flip-flop {id} is still in use"
        );
        for n in ff.pins() {
            self.delete_node(n);
        }
        self.flipflops[id] = None;
        self.flipflop_ids.release(id);
    }

    /// Add a new latch, with its data output as an input node and all other pins as output
    /// nodes driven by constant zero
    ///
    /// Latch ids are reused after deletion.
    pub fn new_latch(&mut self, name: &str) -> usize {
        let id = self.latch_ids.alloc();
        let aux = AuxData::Latch(id);
        let latch = Latch {
            id,
            name: name.to_string(),
            output: self.alloc_input(InputType::LatchOutput, aux),
            input: self.alloc_output(OutputType::LatchData, aux),
            enable: self.alloc_output(OutputType::LatchEnable, aux),
        };
        if id == self.latches.len() {
            self.latches.push(Some(latch));
        } else {
            self.latches[id] = Some(latch);
        }
        id
    }

    /// Delete a latch and all its pin nodes
    ///
    /// The data output of the latch must not drive anything.
    pub fn delete_latch(&mut self, id: usize) {
        let latch = self.latch(id).clone();
        assert_eq!(
            self.node(latch.output).fanout_num(),
            0,
            "Output of latch {id} is still in use"
        );
        for n in latch.pins() {
            self.delete_node(n);
        }
        self.latches[id] = None;
        self.latch_ids.release(id);
    }

    /// Create a logic function of two signals
    ///
    /// The result may be a constant, one of the inputs, or an existing node.
    pub fn new_logic(&mut self, fcode: Fcode, a: Signal, b: Signal) -> Signal {
        self.set_logic(None, fcode, a, b)
    }

    /// Create an And2
    pub fn new_and(&mut self, a: Signal, b: Signal) -> Signal {
        self.new_logic(Fcode::AND, a, b)
    }

    /// Create a Nand2
    pub fn new_nand(&mut self, a: Signal, b: Signal) -> Signal {
        self.new_logic(Fcode::NAND, a, b)
    }

    /// Create an Or2
    pub fn new_or(&mut self, a: Signal, b: Signal) -> Signal {
        self.new_logic(Fcode::OR, a, b)
    }

    /// Create a Nor2
    pub fn new_nor(&mut self, a: Signal, b: Signal) -> Signal {
        self.new_logic(Fcode::NOR, a, b)
    }

    /// Create a Xor2
    pub fn new_xor(&mut self, a: Signal, b: Signal) -> Signal {
        self.new_logic(Fcode::XOR, a, b)
    }

    /// Create a Xnor2
    pub fn new_xnor(&mut self, a: Signal, b: Signal) -> Signal {
        self.new_logic(Fcode::XNOR, a, b)
    }

    /// Change the function of a logic node
    ///
    /// The node is updated in place when possible. If the new function simplifies or already
    /// exists elsewhere, the node is left untouched and all its fanouts are redirected instead.
    /// Changes propagate through the fanouts so that the network stays canonical; the node
    /// itself is never deleted.
    pub fn change_logic(&mut self, node: usize, fcode: Fcode, a: Signal, b: Signal) {
        self.check_change(node, &[a, b]);
        let cone = self.fanout_cone(node);
        let sig = self.set_logic(Some(node), fcode, a, b);
        self.propagate(node, sig, &cone);
    }

    /// Change a logic node to an And2
    pub fn change_and(&mut self, node: usize, a: Signal, b: Signal) {
        self.change_logic(node, Fcode::AND, a, b);
    }

    /// Change a logic node to a Nand2
    pub fn change_nand(&mut self, node: usize, a: Signal, b: Signal) {
        self.change_logic(node, Fcode::NAND, a, b);
    }

    /// Change a logic node to an Or2
    pub fn change_or(&mut self, node: usize, a: Signal, b: Signal) {
        self.change_logic(node, Fcode::OR, a, b);
    }

    /// Change a logic node to a Nor2
    pub fn change_nor(&mut self, node: usize, a: Signal, b: Signal) {
        self.change_logic(node, Fcode::NOR, a, b);
    }

    /// Change a logic node to a Xor2
    pub fn change_xor(&mut self, node: usize, a: Signal, b: Signal) {
        self.change_logic(node, Fcode::XOR, a, b);
    }

    /// Change a logic node to a Xnor2
    pub fn change_xnor(&mut self, node: usize, a: Signal, b: Signal) {
        self.change_logic(node, Fcode::XNOR, a, b);
    }

    /// Set the signal driving an output node
    ///
    /// For the input node of a bidirectional port bit, the corresponding output node is used.
    pub fn set_output_fanin(&mut self, node: usize, sig: Signal) {
        let node = if self.node(node).is_input() {
            match self.alt_node(node) {
                Some(o) => o,
                None => panic!("Input node {node} has no corresponding output node"),
            }
        } else {
            node
        };
        assert!(self.node(node).is_output(), "Node {node} is not an output");
        self.check_fanin(sig);
        self.nodes.get_mut(node).output_inv = sig.is_inverted();
        self.connect_edge(sig.node(), node, 0);
    }

    /// Replace the source of an edge, given by its destination node and position
    ///
    /// A missing source is the constant zero. On an output node the inversion is kept.
    /// On a logic node, the new source replaces the old one with the same polarity and the
    /// node is re-canonicalized as with [`change_logic`](Self::change_logic).
    pub fn connect(&mut self, from: Option<usize>, to: usize, pos: usize) {
        let n = self.node(to);
        match n.kind() {
            NodeKind::Input(_) => panic!("Input node {to} has no fanin"),
            NodeKind::Output(_) => {
                assert_eq!(pos, 0, "Output node {to} has a single fanin");
                self.check_fanin(Signal::from_parts(from, false));
                self.connect_edge(from, to, pos);
            }
            NodeKind::Logic => {
                assert!(pos < 2, "Logic node {to} has two fanins");
                let mut fanins = [0, 1].map(|i| Signal::from_parts(n.fanins[i].from, false));
                fanins[pos] = Signal::from_parts(from, false);
                let fcode = n.fcode;
                self.change_logic(to, fcode, fanins[0], fanins[1]);
            }
        }
    }

    /// Remove logic nodes that drive nothing, repeatedly; return the number of nodes removed
    pub fn clean_up(&mut self) -> usize {
        let mut to_delete: Vec<usize> = self
            .logic
            .iter()
            .copied()
            .filter(|&id| self.node(id).fanout_num() == 0)
            .collect();
        let mut removed = 0;
        while let Some(id) = to_delete.pop() {
            if !self.is_live(id) || self.node(id).fanout_num() != 0 {
                continue;
            }
            let fanins = [self.node(id).fanin0(), self.node(id).fanin1()];
            self.unlink_node(id);
            removed += 1;
            for f in fanins {
                let n = self.node(f);
                if n.is_logic() && n.fanout_num() == 0 {
                    to_delete.push(f);
                }
            }
        }
        let nodes = &self.nodes;
        self.logic.retain(|&i| nodes.is_live(i));
        debug!("Removed {removed} unused logic nodes");
        removed
    }

    /// Check consistency of the datastructure
    pub fn check(&self) {
        let mut nb_inputs = 0;
        let mut nb_outputs = 0;
        let mut nb_logic = 0;
        for n in self.nodes() {
            let id = n.id();
            match n.kind() {
                NodeKind::Input(_) => nb_inputs += 1,
                NodeKind::Output(_) => nb_outputs += 1,
                NodeKind::Logic => nb_logic += 1,
            }
            for e in n.fanouts() {
                assert_eq!(
                    self.edge(*e).from(),
                    Some(id),
                    "Fanout of node {id} to {e:?} is not a fanin"
                );
            }
            assert_eq!(
                n.fanouts().iter().unique().count(),
                n.fanout_num(),
                "Node {id} has duplicate fanouts"
            );
            let pomark = n.fanouts().iter().any(|e| self.node(e.to).is_output());
            assert_eq!(n.pomark(), pomark, "Bad output mark on node {id}");
            for pos in 0..n.nb_fanins() {
                let e = n.fanin_edge(pos);
                assert_eq!((e.to(), e.pos()), (id, pos), "Bad edge in node {id}");
                if let Some(f) = e.from() {
                    assert!(self.is_live(f), "Node {id} has a dead fanin {f}");
                    assert!(
                        self.node(f).fanouts().contains(&e.edge_ref()),
                        "Fanin {f} of node {id} is missing the fanout"
                    );
                    assert!(!self.node(f).is_output(), "Output {f} drives node {id}");
                }
            }
            if n.is_logic() {
                let fcode = n.fcode();
                assert!(fcode.is_canonical(), "Non-canonical {fcode} in node {id}");
                assert!(
                    n.fanin0() < n.fanin1(),
                    "Unsorted fanins {} and {} in node {id}",
                    n.fanin0(),
                    n.fanin1()
                );
                assert_eq!(
                    self.strash.find(&self.strash_key(id)),
                    Some(id),
                    "Node {id} is not hashed"
                );
            }
            match n.aux() {
                Some(AuxData::Port { port, bit }) => {
                    let p = &self.ports[port];
                    let pin = if n.is_input() {
                        p.inputs[bit]
                    } else {
                        p.outputs[bit]
                    };
                    assert_eq!(pin, Some(id), "Node {id} is not a pin of port {port}");
                }
                Some(AuxData::FlipFlop(ff)) => {
                    assert!(self.flipflop(ff).pins().contains(&id));
                }
                Some(AuxData::Latch(l)) => {
                    assert!(self.latch(l).pins().contains(&id));
                }
                None => assert!(n.is_logic(), "Node {id} has no owner"),
            }
        }
        assert_eq!(nb_inputs, self.inputs.len());
        assert_eq!(nb_outputs, self.outputs.len());
        assert_eq!(nb_logic, self.logic.len());
        assert_eq!(self.strash.len(), self.logic.len());
        assert_eq!(self.sort().len(), self.nb_logic(), "Combinational loop");
    }

    /// Create or update a logic node; return the signal implementing the function
    ///
    /// With `node`, the node is updated in place unless the function simplifies or already
    /// exists, in which case it is left untouched.
    pub(crate) fn set_logic(
        &mut self,
        node: Option<usize>,
        fcode: Fcode,
        a: Signal,
        b: Signal,
    ) -> Signal {
        self.check_fanin(a);
        self.check_fanin(b);
        let (fcode, [i0, i1], inv) = match normalize(fcode, a, b) {
            Normalization::Copy(s) => return s,
            Normalization::Node(fcode, fanins, inv) => (fcode, fanins, inv),
        };
        let key = StrashKey {
            fcode,
            fanin0: i0.id(),
            fanin1: i1.id(),
        };
        if let Some(existing) = self.strash.find(&key) {
            return Signal::new(existing, inv);
        }
        let id = match node {
            Some(id) => {
                let old = self.strash_key(id);
                self.strash.remove(&old, id);
                id
            }
            None => {
                let id = self.nodes.alloc_node(NodeKind::Logic);
                self.logic.push(id);
                id
            }
        };
        self.nodes.get_mut(id).fcode = fcode;
        self.connect_edge(Some(key.fanin0), id, 0);
        self.connect_edge(Some(key.fanin1), id, 1);
        self.strash.insert(key, id);
        Signal::new(id, inv)
    }

    /// Check that a logic node may be rebuilt from the given signals
    pub(crate) fn check_change(&self, node: usize, sigs: &[Signal]) {
        assert!(self.node(node).is_logic(), "Node {node} is not a logic node");
        for s in sigs {
            self.check_fanin(*s);
        }
        assert!(
            !self.signals_depend_on(sigs, node),
            "Using {} in node {node} would create a combinational loop",
            sigs.iter().join(", ")
        );
    }

    /// Logic nodes in the transitive fanout of a node, in topological order
    pub(crate) fn fanout_cone(&self, node: usize) -> Vec<usize> {
        let mut visited = FxHashSet::default();
        let mut postorder = Vec::new();
        let mut stack = vec![(node, 0)];
        visited.insert(node);
        while let Some((id, i)) = stack.pop() {
            let fanouts = self.node(id).fanouts();
            if i < fanouts.len() {
                stack.push((id, i + 1));
                let to = fanouts[i].to;
                if self.node(to).is_logic() && visited.insert(to) {
                    stack.push((to, 0));
                }
            } else {
                postorder.push(id);
            }
        }
        // The node itself is finished last
        postorder.pop();
        postorder.reverse();
        postorder
    }

    /// Rebuild the fanout cone of a node after its function was replaced by a new signal
    ///
    /// The cone must be computed before the node is changed. Each node of the cone is rebuilt
    /// in place, unless an earlier rebuild already reuses it, in which case a new node is
    /// created. Output nodes are redirected last.
    pub(crate) fn propagate(&mut self, node: usize, sig: Signal, cone: &[usize]) {
        let mut replacement: FxHashMap<usize, Signal> = FxHashMap::default();
        let mut replaced = Vec::new();
        let mut pinned: FxHashSet<usize> = FxHashSet::default();
        if sig != Signal::from_node(node) {
            debug!("Replacing node {node} by {sig}");
            replacement.insert(node, sig);
            replaced.push(node);
        }
        if let Some(n) = sig.node() {
            pinned.insert(n);
        }
        for &id in cone {
            let n = self.node(id);
            let old = [n.fanin0(), n.fanin1()];
            let new = old.map(|f| {
                replacement
                    .get(&f)
                    .copied()
                    .unwrap_or(Signal::from_node(f))
            });
            if new.iter().zip(old).all(|(s, f)| *s == Signal::from_node(f)) {
                continue;
            }
            let fcode = n.fcode;
            let target = if pinned.contains(&id) { None } else { Some(id) };
            let res = self.set_logic(target, fcode, new[0], new[1]);
            if let Some(r) = res.node() {
                pinned.insert(r);
            }
            if res != Signal::from_node(id) {
                debug!("Replacing node {id} by {res}");
                replacement.insert(id, res);
                replaced.push(id);
            }
        }
        let mut updates = Vec::new();
        for id in replaced {
            for e in self.node(id).fanouts() {
                let o = self.node(e.to);
                if o.is_output() {
                    updates.push((e.to, replacement[&id] ^ o.output_inv));
                }
            }
        }
        for (o, s) in updates {
            self.set_output_fanin(o, s);
        }
    }

    /// Structural key of a logic node
    fn strash_key(&self, id: usize) -> StrashKey {
        let n = self.node(id);
        StrashKey {
            fcode: n.fcode(),
            fanin0: n.fanin0(),
            fanin1: n.fanin1(),
        }
    }

    /// Check that a signal may be used as a fanin
    fn check_fanin(&self, s: Signal) {
        if let Some(id) = s.node() {
            assert!(self.is_live(id), "Signal {s} uses a deleted node");
            assert!(
                !self.node(id).is_output(),
                "Signal {s} uses an output node as a fanin"
            );
        }
    }

    fn alloc_input(&mut self, t: InputType, aux: AuxData) -> usize {
        let id = self.nodes.alloc_node(NodeKind::Input(t));
        self.nodes.get_mut(id).aux = Some(aux);
        self.inputs.push(id);
        self.level.set(None);
        id
    }

    fn alloc_output(&mut self, t: OutputType, aux: AuxData) -> usize {
        let id = self.nodes.alloc_node(NodeKind::Output(t));
        self.nodes.get_mut(id).aux = Some(aux);
        self.outputs.push(id);
        self.level.set(None);
        id
    }

    /// Remove a node that drives nothing
    fn delete_node(&mut self, id: usize) {
        let kind = self.node(id).kind();
        self.unlink_node(id);
        match kind {
            NodeKind::Input(_) => self.inputs.retain(|&i| i != id),
            NodeKind::Output(_) => self.outputs.retain(|&i| i != id),
            NodeKind::Logic => self.logic.retain(|&i| i != id),
        }
    }

    /// Disconnect and release a node that drives nothing, leaving it in the node lists
    fn unlink_node(&mut self, id: usize) {
        let n = self.node(id);
        assert_eq!(n.fanout_num(), 0, "Node {id} is still in use");
        if n.is_logic() {
            let key = self.strash_key(id);
            self.strash.remove(&key, id);
        }
        for pos in 0..self.node(id).nb_fanins() {
            self.connect_edge(None, id, pos);
        }
        self.nodes.release_node(id);
        self.level.set(None);
    }

    /// Set the source of an edge, maintaining fanout lists and output marks
    fn connect_edge(&mut self, from: Option<usize>, to: usize, pos: usize) {
        let e = EdgeRef { to, pos };
        let old = self.node(to).fanin_edge(pos).from();
        if let Some(o) = old {
            let fanouts = &mut self.nodes.get_mut(o).fanouts;
            match fanouts.iter().position(|f| *f == e) {
                Some(i) => {
                    fanouts.remove(i);
                }
                None => panic!("Node {o} is missing fanout {e:?}"),
            }
            self.update_pomark(o);
        }
        self.nodes.get_mut(to).fanins[pos].from = from;
        if let Some(f) = from {
            self.nodes.get_mut(f).fanouts.push(e);
            self.update_pomark(f);
        }
        self.level.set(None);
    }

    fn update_pomark(&mut self, id: usize) {
        let pomark = self
            .node(id)
            .fanouts()
            .iter()
            .any(|e| self.node(e.to).is_output());
        self.nodes.get_mut(id).pomark = pomark;
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Network {} with {} inputs, {} outputs, {} logic nodes:",
            self.name,
            self.nb_inputs(),
            self.nb_outputs(),
            self.nb_logic()
        )?;
        let pins = |v: &[Option<usize>]| {
            v.iter()
                .map(|p| match p {
                    Some(id) => format!("n{id}"),
                    None => "-".to_string(),
                })
                .join(", ")
        };
        for p in self.ports() {
            writeln!(
                f,
                "\tport {} {}: inputs [{}], outputs [{}]",
                p.id(),
                p.name(),
                pins(p.inputs.as_slice()),
                pins(p.outputs.as_slice())
            )?;
        }
        for &i in self.inputs() {
            writeln!(f, "\tn{i} = {}", self.node(i))?;
        }
        for i in self.sort() {
            writeln!(f, "\tn{i} = {}", self.node(i))?;
        }
        for &o in self.outputs() {
            writeln!(f, "\tn{o} = {}", self.node(o))?;
        }
        for ff in self.flipflops() {
            writeln!(
                f,
                "\tflipflop {} {}: q n{}, d n{}, clock n{}, set n{}, reset n{}",
                ff.id(),
                ff.name(),
                ff.output(),
                ff.input(),
                ff.clock(),
                ff.set(),
                ff.reset()
            )?;
        }
        for l in self.latches() {
            writeln!(
                f,
                "\tlatch {} {}: q n{}, d n{}, enable n{}",
                l.id(),
                l.name(),
                l.output(),
                l.input(),
                l.enable()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::network::node::{AuxData, NodeKind, OutputType};
    use crate::{Fcode, Network, Signal};

    fn inputs(net: &mut Network, nb: usize) -> Vec<Signal> {
        let port = net.new_input_port("i", nb);
        (0..nb)
            .map(|b| Signal::from_node(net.port(port).input(b).unwrap()))
            .collect()
    }

    #[test]
    fn test_basic() {
        let mut net = Network::new();
        net.set_name("basic");
        let i = inputs(&mut net, 2);
        let o = net.new_output_port("o", 1);
        let x = net.new_xor(i[0], i[1]);
        let out = net.port(o).output(0).unwrap();
        net.set_output_fanin(out, !x);

        assert_eq!(net.name(), "basic");
        assert_eq!(net.nb_inputs(), 2);
        assert_eq!(net.nb_outputs(), 1);
        assert_eq!(net.nb_logic(), 1);
        assert_eq!(net.nb_nodes(), 4);
        assert_eq!(net.node(out).output_fanin_signal(), !x);
        assert!(net.node(x.id()).pomark());
        assert!(!net.node(i[0].id()).pomark());
        assert_eq!(net.node(x.id()).fcode(), Fcode::XOR);
        assert_eq!(net.node(out).output_type(), Some(OutputType::Primary));
        assert_eq!(net.node(out).aux(), Some(AuxData::Port { port: o, bit: 0 }));
        net.check();
    }

    #[test]
    fn test_commutative() {
        let mut net = Network::new();
        let i = inputs(&mut net, 2);
        let x = net.new_and(i[0], i[1]);
        let y = net.new_and(i[1], i[0]);
        assert_eq!(x, y);
        assert_eq!(net.nb_logic(), 1);
        assert_eq!(net.new_nor(!i[0], !i[1]), x);
        assert_eq!(net.new_or(!i[1], !i[0]), !x);
        assert_eq!(net.nb_logic(), 1);
        net.check();
    }

    #[test]
    fn test_simplifications() {
        let mut net = Network::new();
        let i = inputs(&mut net, 2);
        let a = i[0];
        assert_eq!(net.new_and(a, a), a);
        assert_eq!(net.new_or(a, a), a);
        assert_eq!(net.new_and(a, !a), Signal::zero());
        assert_eq!(net.new_or(a, !a), Signal::one());
        assert_eq!(net.new_xor(a, a), Signal::zero());
        assert_eq!(net.new_xor(a, !a), Signal::one());
        assert_eq!(net.new_xnor(a, !a), Signal::zero());
        assert_eq!(net.new_and(a, Signal::one()), a);
        assert_eq!(net.new_and(a, Signal::zero()), Signal::zero());
        assert_eq!(net.new_xor(Signal::one(), a), !a);
        assert_eq!(net.new_logic(Fcode::ONE, a, i[1]), Signal::one());
        assert_eq!(net.nb_logic(), 0);
        net.check();
    }

    #[test]
    fn test_canonical_form() {
        let mut net = Network::new();
        let i = inputs(&mut net, 2);
        for bits in 0..16 {
            for inv0 in [false, true] {
                for inv1 in [false, true] {
                    net.new_logic(Fcode::new(bits), i[0] ^ inv0, i[1] ^ inv1);
                }
            }
        }
        // And with all four polarities, plus Xor
        assert_eq!(net.nb_logic(), 5);
        for &id in net.logic_nodes() {
            assert!(net.node(id).fcode().is_canonical());
        }
        net.check();
    }

    #[test]
    fn test_single_bit_ports() {
        let mut net = Network::new();
        let a = net.new_input("a");
        let z = net.new_output("z");
        net.new_input_port("bus", 4);
        assert_eq!(net.port_by_name("a"), Some(0));
        assert_eq!(net.port_by_name("z"), Some(1));
        assert_eq!(net.port_by_name("bus"), Some(2));
        assert_eq!(net.port_by_name("none"), None);
        assert_eq!(net.port(0).bit_width(), 1);
        assert_eq!(net.port(0).input(0), Some(a));
        assert_eq!(net.port(1).output(0), Some(z));
        assert_eq!(net.node(z).port_bit(), Some((1, 0)));
        net.set_output_fanin(z, !Signal::from_node(a));
        net.check();
    }

    #[test]
    fn test_clean_up_chain() {
        let mut net = Network::new();
        let i = inputs(&mut net, 2);
        let mut x = i[0];
        for k in 0..1000 {
            x = if k % 2 == 0 {
                net.new_and(x, i[1])
            } else {
                net.new_xor(x, i[1])
            };
        }
        let kept = net.new_or(i[0], i[1]);
        let o = net.new_output("o");
        net.set_output_fanin(o, kept);
        assert_eq!(net.nb_logic(), 1001);
        assert_eq!(net.clean_up(), 1000);
        assert_eq!(net.logic_nodes(), &[kept.id()]);
        assert_eq!(net.nb_nodes(), 4);
        net.check();
        // Released ids are reused by new nodes
        let y = net.new_and(i[0], i[1]);
        assert_eq!(y.id(), 2);
        net.check();
    }

    #[test]
    fn test_flipflop_reuse() {
        let mut net = Network::new();
        let f0 = net.new_flipflop("f0");
        let f1 = net.new_flipflop("f1");
        assert_eq!((f0, f1), (0, 1));
        assert_eq!(net.nb_inputs(), 2);
        assert_eq!(net.nb_outputs(), 8);
        let q = net.flipflop(f0).output();
        assert_eq!(net.node(q).flipflop(), Some(f0));
        net.delete_flipflop(f0);
        assert_eq!(net.nb_flipflops(), 1);
        assert_eq!(net.nb_nodes(), 5);
        let f2 = net.new_flipflop("f2");
        assert_eq!(f2, 0);
        assert_eq!(net.flipflop(f2).name(), "f2");
        assert_eq!(net.flipflops().count(), 2);
        net.check();
    }

    #[test]
    #[should_panic]
    fn test_delete_used_flipflop() {
        let mut net = Network::new();
        let f = net.new_flipflop("f");
        let q = Signal::from_node(net.flipflop(f).output());
        let d = net.flipflop(f).input();
        net.set_output_fanin(d, !q);
        net.delete_flipflop(f);
    }

    #[test]
    fn test_latch() {
        let mut net = Network::new();
        let i = inputs(&mut net, 1);
        let l = net.new_latch("l");
        let latch = net.latch(l).clone();
        let q = Signal::from_node(latch.output());
        let x = net.new_and(i[0], q);
        net.set_output_fanin(latch.input(), x);
        net.set_output_fanin(latch.enable(), i[0]);
        assert_eq!(
            net.node(latch.enable()).kind(),
            NodeKind::Output(OutputType::LatchEnable)
        );
        net.check();
        net.set_output_fanin(latch.input(), Signal::zero());
        assert_eq!(net.clean_up(), 1);
        net.delete_latch(l);
        assert_eq!(net.nb_latches(), 0);
        assert_eq!(net.nb_nodes(), 1);
        net.check();
    }

    #[test]
    fn test_bidirectional_port() {
        let mut net = Network::new();
        let p = net.new_port("io", 1);
        let i = net.new_port_input(p, 0);
        let o = net.new_port_output(p, 0);
        assert_eq!(net.alt_node(i), Some(o));
        assert_eq!(net.alt_node(o), Some(i));
        net.set_output_fanin(i, Signal::one());
        assert_eq!(net.node(o).output_fanin_signal(), Signal::one());
        net.check();
    }

    #[test]
    fn test_change_logic_in_place() {
        let mut net = Network::new();
        let i = inputs(&mut net, 3);
        let x = net.new_and(i[0], i[1]);
        let y = net.new_xor(x, i[2]);
        let o = net.new_output_port("o", 1);
        let out = net.port(o).output(0).unwrap();
        net.set_output_fanin(out, y);

        // The new function already exists, with an inversion
        net.change_nand(x.id(), i[0], i[1]);
        assert_eq!(net.node(x.id()).fcode(), Fcode::AND);
        assert_eq!(net.node(out).output_fanin_signal(), !y);
        net.check();

        // The node is updated in place
        net.change_xor(x.id(), i[0], i[1]);
        assert_eq!(net.node(x.id()).fcode(), Fcode::XOR);
        assert_eq!(net.node(out).output_fanin_signal(), !y);
        assert_eq!(net.nb_logic(), 2);
        net.check();
    }

    #[test]
    fn test_change_logic_redirect() {
        let mut net = Network::new();
        let i = inputs(&mut net, 3);
        let x = net.new_and(i[0], i[1]);
        let z = net.new_xor(i[0], i[2]);
        let y = net.new_and(x, i[2]);
        let o = net.new_output_port("o", 1);
        let out = net.port(o).output(0).unwrap();
        net.set_output_fanin(out, y);

        // x becomes a copy of an input: fanouts are redirected, x is left alone
        net.change_and(x.id(), i[0], i[0]);
        assert!(net.is_live(x.id()));
        assert_eq!(net.node(x.id()).fanout_num(), 0);
        let y2 = net.node(out).output_fanin_signal();
        assert_eq!(y2, y);
        assert_eq!(net.node(y.id()).fanin_signal(0), i[0]);

        // x becomes an existing node
        net.change_xor(x.id(), i[2], i[0]);
        assert_eq!(net.node(x.id()).fcode(), Fcode::AND);
        assert_eq!(net.new_xor(i[0], i[2]), z);
        net.check();
        // Both x and z are now unused
        assert_eq!(net.clean_up(), 2);
        net.check();
    }

    #[test]
    fn test_connect() {
        let mut net = Network::new();
        let i = inputs(&mut net, 3);
        let x = net.new_and(i[0], i[1]);
        let o = net.new_output_port("o", 1);
        let out = net.port(o).output(0).unwrap();
        net.set_output_fanin(out, !x);
        assert_eq!(net.level(), 1);

        net.connect(Some(i[2].id()), x.id(), 1);
        assert_eq!(net.node(x.id()).fanin(1), Some(i[2].id()));
        net.connect(Some(x.id()), out, 0);
        assert_eq!(net.node(out).output_fanin_signal(), !x);
        net.connect(None, out, 0);
        assert_eq!(net.node(out).output_fanin_signal(), Signal::one());
        assert!(!net.node(x.id()).pomark());
        assert_eq!(net.level(), 0);
        net.check();
    }

    #[test]
    #[should_panic]
    fn test_change_loop() {
        let mut net = Network::new();
        let i = inputs(&mut net, 2);
        let x = net.new_and(i[0], i[1]);
        let y = net.new_xor(x, i[1]);
        net.change_and(x.id(), y, i[0]);
    }

    #[test]
    #[should_panic]
    fn test_output_as_fanin() {
        let mut net = Network::new();
        let i = inputs(&mut net, 1);
        let o = net.new_output_port("o", 1);
        let out = net.port(o).output(0).unwrap();
        net.new_and(i[0], Signal::from_node(out));
    }

    #[test]
    fn test_clear() {
        let mut net = Network::with_hash_capacity(16);
        let i = inputs(&mut net, 2);
        net.new_and(i[0], i[1]);
        net.new_flipflop("f");
        net.clear();
        assert_eq!(net.nb_nodes(), 0);
        assert_eq!(net.nb_ports(), 0);
        assert_eq!(net.nb_flipflops(), 0);
        assert_eq!(net.max_node_id(), 0);
        net.check();
        let i = inputs(&mut net, 1);
        assert_eq!(i[0], Signal::from_node(0));
    }
}
