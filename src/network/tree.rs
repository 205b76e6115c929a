//! Balanced trees of associative gates

use crate::network::fcode::Fcode;
use crate::{Network, Signal};

impl Network {
    /// Create an And of any number of signals, as a balanced tree; constant one if empty
    pub fn new_and_n(&mut self, sigs: &[Signal]) -> Signal {
        self.new_tree(Fcode::AND, sigs, Signal::one())
    }

    /// Create a Nand of any number of signals, as a balanced tree; constant zero if empty
    pub fn new_nand_n(&mut self, sigs: &[Signal]) -> Signal {
        !self.new_and_n(sigs)
    }

    /// Create an Or of any number of signals, as a balanced tree; constant zero if empty
    pub fn new_or_n(&mut self, sigs: &[Signal]) -> Signal {
        self.new_tree(Fcode::OR, sigs, Signal::zero())
    }

    /// Create a Nor of any number of signals, as a balanced tree; constant one if empty
    pub fn new_nor_n(&mut self, sigs: &[Signal]) -> Signal {
        !self.new_or_n(sigs)
    }

    /// Create a Xor of any number of signals, as a balanced tree; constant zero if empty
    pub fn new_xor_n(&mut self, sigs: &[Signal]) -> Signal {
        self.new_tree(Fcode::XOR, sigs, Signal::zero())
    }

    /// Create a Xnor of any number of signals, as a balanced tree; constant one if empty
    pub fn new_xnor_n(&mut self, sigs: &[Signal]) -> Signal {
        !self.new_xor_n(sigs)
    }

    /// Change a logic node to an And of any number of signals
    pub fn change_and_n(&mut self, node: usize, sigs: &[Signal]) {
        self.change_tree(node, Fcode::AND, sigs, Signal::one(), false);
    }

    /// Change a logic node to a Nand of any number of signals
    pub fn change_nand_n(&mut self, node: usize, sigs: &[Signal]) {
        self.change_tree(node, Fcode::AND, sigs, Signal::one(), true);
    }

    /// Change a logic node to an Or of any number of signals
    pub fn change_or_n(&mut self, node: usize, sigs: &[Signal]) {
        self.change_tree(node, Fcode::OR, sigs, Signal::zero(), false);
    }

    /// Change a logic node to a Nor of any number of signals
    pub fn change_nor_n(&mut self, node: usize, sigs: &[Signal]) {
        self.change_tree(node, Fcode::OR, sigs, Signal::zero(), true);
    }

    /// Change a logic node to a Xor of any number of signals
    pub fn change_xor_n(&mut self, node: usize, sigs: &[Signal]) {
        self.change_tree(node, Fcode::XOR, sigs, Signal::zero(), false);
    }

    /// Change a logic node to a Xnor of any number of signals
    pub fn change_xnor_n(&mut self, node: usize, sigs: &[Signal]) {
        self.change_tree(node, Fcode::XOR, sigs, Signal::zero(), true);
    }

    fn new_tree(&mut self, fcode: Fcode, sigs: &[Signal], empty: Signal) -> Signal {
        if sigs.is_empty() {
            empty
        } else {
            self.make_tree(None, fcode, sigs)
        }
    }

    fn change_tree(&mut self, node: usize, fcode: Fcode, sigs: &[Signal], empty: Signal, inv: bool) {
        self.check_change(node, sigs);
        let cone = self.fanout_cone(node);
        let sig = if sigs.is_empty() {
            empty
        } else {
            self.make_tree(Some(node), fcode, sigs)
        };
        self.propagate(node, sig ^ inv, &cone);
    }

    /// Build a balanced tree of an associative function, splitting the signals in two halves
    ///
    /// With `root`, the top gate is built in place in this node if possible.
    pub(crate) fn make_tree(&mut self, root: Option<usize>, fcode: Fcode, sigs: &[Signal]) -> Signal {
        match sigs.len() {
            0 => panic!("Cannot build a tree with no input"),
            1 => sigs[0],
            n => {
                let l = self.make_tree(None, fcode, &sigs[..n / 2]);
                let r = self.make_tree(None, fcode, &sigs[n / 2..]);
                // A subtree may reuse the old function of the root
                let root = root.filter(|&id| !self.signals_depend_on(&[l, r], id));
                self.set_logic(root, fcode, l, r)
            }
        }
    }
}
