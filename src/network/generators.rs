//! Network generators and templates

use crate::{Network, Signal};

/// Signals of the input nodes of a port
fn port_inputs(net: &Network, port: usize) -> Vec<Signal> {
    let p = net.port(port);
    (0..p.bit_width())
        .filter_map(|b| p.input(b))
        .map(Signal::from_node)
        .collect()
}

/// Drive the output nodes of a port
fn drive_port(net: &mut Network, port: usize, sigs: &[Signal]) {
    for (bit, s) in sigs.iter().enumerate() {
        if let Some(o) = net.port(port).output(bit) {
            net.set_output_fanin(o, *s);
        }
    }
}

/// Adder generators
pub mod adder {
    use super::{drive_port, port_inputs};
    use crate::{Network, Signal};

    /// A simple and slow ripple-carry adder, with inputs `a` and `b` and output `s`
    pub fn ripple_carry(len: usize) -> Network {
        let mut ret = Network::new();
        ret.set_name(&format!("adder{len}"));
        let pa = ret.new_input_port("a", len);
        let pb = ret.new_input_port("b", len);
        let ps = ret.new_output_port("s", len + 1);
        let a = port_inputs(&ret, pa);
        let b = port_inputs(&ret, pb);
        let mut c = Signal::zero();
        let mut sum = Vec::new();
        for i in 0..len {
            let p = ret.new_xor(a[i], b[i]);
            let g = ret.new_and(a[i], b[i]);
            sum.push(ret.new_xor(p, c));
            let t = ret.new_and(p, c);
            c = ret.new_or(g, t);
        }
        sum.push(c);
        drive_port(&mut ret, ps, &sum);
        ret.check();
        ret
    }
}

/// Carry chain generators
pub mod carry_chain {
    use super::{drive_port, port_inputs};
    use crate::{Network, Signal};

    /// A simple and slow ripple-carry chain, with inputs `p` and `g` and output `c`
    pub fn ripple_carry(len: usize) -> Network {
        let mut ret = Network::new();
        ret.set_name(&format!("carry{len}"));
        let pp = ret.new_input_port("p", len);
        let pg = ret.new_input_port("g", len);
        let pc = ret.new_output_port("c", len);
        let propagate = port_inputs(&ret, pp);
        let generate = port_inputs(&ret, pg);
        let mut c = Signal::zero();
        let mut carries = Vec::new();
        for i in 0..len {
            let d = ret.new_and(propagate[i], c);
            c = ret.new_nand(!generate[i], !d);
            carries.push(c);
        }
        drive_port(&mut ret, pc, &carries);
        ret
    }
}

/// Simple generators to test functionality
pub mod testcases {
    use super::{drive_port, port_inputs};
    use crate::{Network, Signal};

    /// A Xor of all inputs, as a balanced tree
    pub fn parity_tree(len: usize) -> Network {
        let mut ret = Network::new();
        ret.set_name(&format!("parity{len}"));
        let pi = ret.new_input_port("i", len);
        let po = ret.new_output_port("o", 1);
        let i = port_inputs(&ret, pi);
        let x = ret.new_xor_n(&i);
        drive_port(&mut ret, po, &[x]);
        ret.check();
        ret
    }

    /// A circular chain of flip-flops with a Xor with the input at the start
    pub fn toggle_chain(len: usize) -> Network {
        assert!(len > 0);
        let mut ret = Network::new();
        ret.set_name(&format!("toggle{len}"));
        let pi = ret.new_input_port("i", 1);
        let pclk = ret.new_input_port("clk", 1);
        let po = ret.new_output_port("o", 1);
        let input = port_inputs(&ret, pi)[0];
        let clk = port_inputs(&ret, pclk)[0];
        let ffs: Vec<usize> = (0..len)
            .map(|i| ret.new_flipflop(&format!("ff{i}")))
            .collect();
        let last = Signal::from_node(ret.flipflop(ffs[len - 1]).output());
        let mut x = ret.new_xor(last, input);
        for &ff in &ffs {
            let (d, c) = (ret.flipflop(ff).input(), ret.flipflop(ff).clock());
            ret.set_output_fanin(d, x);
            ret.set_output_fanin(c, clk);
            x = Signal::from_node(ret.flipflop(ff).output());
        }
        drive_port(&mut ret, po, &[x]);
        ret.check();
        ret
    }
}

/// Random networks, used to test the algorithms
pub mod random {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::{drive_port, port_inputs};
    use crate::network::fcode::Fcode;
    use crate::{Network, Signal};

    /// A random combinational network, with gates of any function on previously created signals
    pub fn random_logic(nb_inputs: usize, nb_gates: usize, nb_outputs: usize, seed: u64) -> Network {
        assert!(nb_inputs > 0);
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut ret = Network::new();
        ret.set_name(&format!("random{seed}"));
        let pi = ret.new_input_port("i", nb_inputs);
        let po = ret.new_output_port("o", nb_outputs);
        let mut sigs = port_inputs(&ret, pi);
        for _ in 0..nb_gates {
            let a = sigs[rng.gen_range(0..sigs.len())] ^ rng.gen::<bool>();
            let b = sigs[rng.gen_range(0..sigs.len())] ^ rng.gen::<bool>();
            let fcode = Fcode::new(rng.gen_range(0..16));
            let s = ret.new_logic(fcode, a, b);
            if !s.is_constant() {
                sigs.push(s);
            }
        }
        let outputs: Vec<Signal> = (0..nb_outputs)
            .map(|_| sigs[rng.gen_range(0..sigs.len())] ^ rng.gen::<bool>())
            .collect();
        drive_port(&mut ret, po, &outputs);
        ret.check();
        ret
    }
}
