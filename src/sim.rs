//! Simulation of a logic network. Faster, multi-pattern simulation methods are available internally.
//!
//! Simulation is combinational: flip-flop and latch outputs are treated as free inputs, in the
//! order of [`Network::inputs`], and all output nodes are observed in the order of
//! [`Network::outputs`].

mod simple_sim;

use volute::Lut;

use crate::network::fcode::Fcode;
use crate::{Network, Signal};

pub(crate) use simple_sim::eval_word;

/// Simple conversion to 64b format
fn bool_to_multi(values: &[Vec<bool>], nb_inputs: usize) -> Vec<u64> {
    assert!(values.len() <= 64);
    let mut ret = vec![0u64; nb_inputs];
    for (p, v) in values.iter().enumerate() {
        assert_eq!(v.len(), nb_inputs);
        for (i, b) in v.iter().enumerate() {
            if *b {
                ret[i] |= 1 << p;
            }
        }
    }
    ret
}

/// Simple conversion from 64b format
fn multi_to_bool(values: &[u64], nb_patterns: usize) -> Vec<Vec<bool>> {
    (0..nb_patterns)
        .map(|p| values.iter().map(|v| (v >> p) & 1 != 0).collect())
        .collect()
}

/// Simulate a network on multiple input patterns; return the output values for each pattern
pub fn simulate(a: &Network, input_values: &[Vec<bool>]) -> Vec<Vec<bool>> {
    let mut ret = Vec::new();
    for chunk in input_values.chunks(64) {
        let multi_input = bool_to_multi(chunk, a.nb_inputs());
        let multi_ret = simulate_multi(a, &multi_input);
        ret.extend(multi_to_bool(&multi_ret, chunk.len()));
    }
    ret
}

/// Simulate a network on a single input pattern; return the output values
pub fn simulate_comb(a: &Network, input_values: &[bool]) -> Vec<bool> {
    let output = simulate(a, &[input_values.to_vec()]);
    output[0].clone()
}

/// Simulate a network with 64b inputs; return the output values
pub fn simulate_multi(a: &Network, input_values: &[u64]) -> Vec<u64> {
    use simple_sim::SimpleSimulator;
    let mut sim = SimpleSimulator::from_network(a);
    sim.run(input_values)
}

/// Simulate a network with 64b inputs; return the values of all nodes by id
pub fn simulate_nodes(a: &Network, input_values: &[u64]) -> Vec<u64> {
    use simple_sim::SimpleSimulator;
    let mut sim = SimpleSimulator::from_network(a);
    sim.run(input_values);
    sim.node_values().to_vec()
}

/// Evaluate a two-input function on truth tables
fn eval_lut(fcode: Fcode, a: &Lut, b: &Lut, nb_vars: usize) -> Lut {
    let mut ret = Lut::zero(nb_vars);
    for i in 0..4 {
        if fcode.value(i & 1 != 0, i & 2 != 0) {
            let va = if i & 1 != 0 { a.clone() } else { !a.clone() };
            let vb = if i & 2 != 0 { b.clone() } else { !b.clone() };
            ret = ret | (va & vb);
        }
    }
    ret
}

/// Truth table of a signal, given the truth tables of the nodes
fn signal_lut(luts: &[Option<Lut>], s: Signal, nb_vars: usize) -> Lut {
    let v = match s.node() {
        Some(id) => match &luts[id] {
            Some(l) => l.clone(),
            None => panic!("Node {id} has no truth table"),
        },
        None => Lut::zero(nb_vars),
    };
    if s.is_inverted() {
        !v
    } else {
        v
    }
}

/// Compute the truth table of each output node as a function of all input nodes
///
/// The size of the tables is exponential in the number of inputs.
pub fn truth_tables(a: &Network) -> Vec<Lut> {
    let nb_vars = a.nb_inputs();
    let mut luts: Vec<Option<Lut>> = vec![None; a.max_node_id()];
    for (i, &id) in a.inputs().iter().enumerate() {
        luts[id] = Some(Lut::nth_var(nb_vars, i));
    }
    for id in a.sort() {
        let n = a.node(id);
        let l = {
            let f0 = signal_lut(&luts, Signal::from_node(n.fanin0()), nb_vars);
            let f1 = signal_lut(&luts, Signal::from_node(n.fanin1()), nb_vars);
            eval_lut(n.fcode(), &f0, &f1, nb_vars)
        };
        luts[id] = Some(l);
    }
    a.outputs()
        .iter()
        .map(|&o| signal_lut(&luts, a.node(o).output_fanin_signal(), nb_vars))
        .collect()
}
