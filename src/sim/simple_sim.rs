use crate::network::fcode::Fcode;
use crate::{Network, Signal};

/// Structure for simulation based directly on the network representation
///
/// All input nodes, including flip-flop and latch outputs, are free variables.
pub struct SimpleSimulator<'a> {
    net: &'a Network,
    order: Vec<usize>,
    node_values: Vec<u64>,
}

/// Convert the inversion to a word for bitwise operations
fn pol_to_word(s: Signal) -> u64 {
    let pol = s.raw() & 1;
    (!(pol as u64)).wrapping_add(1)
}

/// Evaluate a two-input function on 64 patterns at once
pub(crate) fn eval_word(fcode: Fcode, a: u64, b: u64) -> u64 {
    let mut ret = 0;
    for i in 0..4 {
        if fcode.value(i & 1 != 0, i & 2 != 0) {
            let va = if i & 1 != 0 { a } else { !a };
            let vb = if i & 2 != 0 { b } else { !b };
            ret |= va & vb;
        }
    }
    ret
}

impl<'a> SimpleSimulator<'a> {
    pub fn from_network(net: &'a Network) -> SimpleSimulator<'a> {
        SimpleSimulator {
            net,
            order: net.sort(),
            node_values: vec![0; net.max_node_id()],
        }
    }

    /// Run on one word per input node; return one word per output node
    pub fn run(&mut self, input_values: &[u64]) -> Vec<u64> {
        self.copy_inputs(input_values);
        self.run_comb();
        self.get_output_values()
    }

    /// Values of all nodes after the last run, by node id
    pub fn node_values(&self) -> &[u64] {
        &self.node_values
    }

    pub fn get_value(&self, s: Signal) -> u64 {
        let v = match s.node() {
            Some(id) => self.node_values[id],
            None => 0,
        };
        v ^ pol_to_word(s)
    }

    fn copy_inputs(&mut self, inputs: &[u64]) {
        assert_eq!(inputs.len(), self.net.nb_inputs());
        for (&id, &v) in self.net.inputs().iter().zip(inputs) {
            self.node_values[id] = v;
        }
    }

    fn run_comb(&mut self) {
        for &id in &self.order {
            let n = self.net.node(id);
            let a = self.node_values[n.fanin0()];
            let b = self.node_values[n.fanin1()];
            self.node_values[id] = eval_word(n.fcode(), a, b);
        }
        for &id in self.net.outputs() {
            self.node_values[id] = self.get_value(self.net.node(id).output_fanin_signal());
        }
    }

    fn get_output_values(&self) -> Vec<u64> {
        self.net
            .outputs()
            .iter()
            .map(|&o| self.node_values[o])
            .collect()
    }
}
