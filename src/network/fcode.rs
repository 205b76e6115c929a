//! Two-input function codes and their canonical form

use std::fmt;
use std::ops::Not;

use crate::network::signal::Signal;

/// Function code of a two-input logic node
///
/// The code is the truth table of the function: bit `i` is the value of the output
/// when the first input is `i & 1` and the second input is `(i >> 1) & 1`.
///
/// Canonical codes have a zero output when both inputs are zero, and depend on both inputs.
/// Only five codes are canonical: And, Or, Xor and the two And gates with one inverted input.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default)]
pub struct Fcode(u8);

impl Fcode {
    /// Constant zero
    pub const ZERO: Fcode = Fcode(0x0);
    /// Nor2: !a & !b
    pub const NOR: Fcode = Fcode(0x1);
    /// a & !b
    pub const AND_NOT1: Fcode = Fcode(0x2);
    /// !a & b
    pub const AND_NOT0: Fcode = Fcode(0x4);
    /// Xor2
    pub const XOR: Fcode = Fcode(0x6);
    /// Nand2
    pub const NAND: Fcode = Fcode(0x7);
    /// And2
    pub const AND: Fcode = Fcode(0x8);
    /// Xnor2
    pub const XNOR: Fcode = Fcode(0x9);
    /// Or2
    pub const OR: Fcode = Fcode(0xe);
    /// Constant one
    pub const ONE: Fcode = Fcode(0xf);

    /// Create a function code from its truth table
    pub fn new(bits: u8) -> Fcode {
        assert!(bits < 16, "Function code {bits:#x} does not fit on 4 bits");
        Fcode(bits)
    }

    /// Truth table of the function
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Value of the function for the given inputs
    pub fn value(&self, x0: bool, x1: bool) -> bool {
        let i = (x0 as u8) | ((x1 as u8) << 1);
        (self.0 >> i) & 1 != 0
    }

    /// Function obtained by inverting the first input
    pub fn invert_input0(&self) -> Fcode {
        Fcode(((self.0 & 0x5) << 1) | ((self.0 & 0xa) >> 1))
    }

    /// Function obtained by inverting the second input
    pub fn invert_input1(&self) -> Fcode {
        Fcode(((self.0 & 0x3) << 2) | ((self.0 & 0xc) >> 2))
    }

    /// Function obtained by exchanging the two inputs
    pub fn swap_inputs(&self) -> Fcode {
        Fcode((self.0 & 0x9) | ((self.0 & 0x2) << 1) | ((self.0 & 0x4) >> 1))
    }

    /// Returns whether the output depends on the first input
    pub fn depends_on0(&self) -> bool {
        (self.0 ^ (self.0 >> 1)) & 0x5 != 0
    }

    /// Returns whether the output depends on the second input
    pub fn depends_on1(&self) -> bool {
        (self.0 ^ (self.0 >> 2)) & 0x3 != 0
    }

    /// Returns whether the code is in canonical form
    pub fn is_canonical(&self) -> bool {
        self.0 & 1 == 0 && self.depends_on0() && self.depends_on1()
    }

    /// Returns whether the function is an Xor or Xnor
    pub fn is_xor(&self) -> bool {
        *self == Fcode::XOR || *self == Fcode::XNOR
    }

    /// Returns whether the function is an And with optional inversions
    pub fn is_and(&self) -> bool {
        self.and_polarity().is_some()
    }

    /// Decompose an And-like function into input and output inversions
    ///
    /// Returns `(inv0, inv1, inv_out)` such that `f(a, b) = inv_out ^ ((a ^ inv0) & (b ^ inv1))`.
    pub fn and_polarity(&self) -> Option<(bool, bool, bool)> {
        let (minterms, inv_out) = match self.0.count_ones() {
            1 => (self.0, false),
            3 => ((!self.0) & 0xf, true),
            _ => return None,
        };
        let i = minterms.trailing_zeros();
        Some((i & 1 == 0, i & 2 == 0, inv_out))
    }
}

impl Not for Fcode {
    type Output = Fcode;
    fn not(self) -> Fcode {
        Fcode(!self.0 & 0xf)
    }
}

impl fmt::Display for Fcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Fcode::AND => write!(f, "And"),
            Fcode::NAND => write!(f, "Nand"),
            Fcode::OR => write!(f, "Or"),
            Fcode::NOR => write!(f, "Nor"),
            Fcode::XOR => write!(f, "Xor"),
            Fcode::XNOR => write!(f, "Xnor"),
            _ => write!(f, "Lut{:#x}", self.0),
        }
    }
}

impl fmt::Debug for Fcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Result of normalizing a two-input function
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Normalization {
    /// A canonical gate on two distinct uninverted nodes sorted by id, with an optional inverted output
    Node(Fcode, [Signal; 2], bool),
    /// The trivial case, where the function reduces to a single signal or constant
    Copy(Signal),
}

/// Obtain the canonical form of a function applied to two signals
///
/// Input inversions are absorbed in the function code, constant and repeated inputs are
/// folded, the output polarity is fixed and the inputs are sorted.
pub fn normalize(fcode: Fcode, a: Signal, b: Signal) -> Normalization {
    use Normalization::*;
    let mut f = fcode;
    if a.is_inverted() {
        f = f.invert_input0();
    }
    if b.is_inverted() {
        f = f.invert_input1();
    }
    let a = a.without_inversion();
    let b = b.without_inversion();

    // Constants and repetitions
    if a.is_constant() && b.is_constant() {
        return Copy(Signal::from(f.value(false, false)));
    }
    if a.is_constant() {
        return project(f.value(false, false), f.value(false, true), b);
    }
    if b.is_constant() || !f.depends_on1() {
        return project(f.value(false, false), f.value(true, false), a);
    }
    if a == b {
        return project(f.value(false, false), f.value(true, true), a);
    }
    if !f.depends_on0() {
        return project(f.value(false, false), f.value(false, true), b);
    }

    // Output polarity
    let inv = f.value(false, false);
    if inv {
        f = !f;
    }

    // Input ordering
    if a.ind() > b.ind() {
        Node(f.swap_inputs(), [b, a], inv)
    } else {
        Node(f, [a, b], inv)
    }
}

/// Single-input function given by its values for 0 and 1
fn project(v0: bool, v1: bool, s: Signal) -> Normalization {
    use Normalization::*;
    match (v0, v1) {
        (false, false) => Copy(Signal::zero()),
        (true, true) => Copy(Signal::one()),
        (false, true) => Copy(s),
        (true, false) => Copy(!s),
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Normalization::*;
        match self {
            Copy(s) => write!(f, "{s}"),
            Node(c, [a, b], inv) => {
                if *inv {
                    write!(f, "!")?;
                }
                write!(f, "{c}({a}, {b})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Normalization::*;

    /// Evaluate a signal given the values of nodes 0 and 1
    fn eval_signal(s: Signal, vals: [bool; 2]) -> bool {
        match s.node() {
            None => s.is_inverted(),
            Some(id) => vals[id] ^ s.is_inverted(),
        }
    }

    fn eval_normalization(n: Normalization, vals: [bool; 2]) -> bool {
        match n {
            Copy(s) => eval_signal(s, vals),
            Node(f, [a, b], inv) => {
                f.value(eval_signal(a, vals), eval_signal(b, vals)) ^ inv
            }
        }
    }

    fn all_signals() -> Vec<Signal> {
        let mut ret = vec![Signal::zero(), Signal::one()];
        for i in 0..2 {
            for b in [false, true] {
                ret.push(Signal::from_node(i) ^ b);
            }
        }
        ret
    }

    #[test]
    fn test_named_codes() {
        for x0 in [false, true] {
            for x1 in [false, true] {
                assert_eq!(Fcode::AND.value(x0, x1), x0 & x1);
                assert_eq!(Fcode::NAND.value(x0, x1), !(x0 & x1));
                assert_eq!(Fcode::OR.value(x0, x1), x0 | x1);
                assert_eq!(Fcode::NOR.value(x0, x1), !(x0 | x1));
                assert_eq!(Fcode::XOR.value(x0, x1), x0 ^ x1);
                assert_eq!(Fcode::XNOR.value(x0, x1), !(x0 ^ x1));
                assert_eq!(Fcode::AND_NOT1.value(x0, x1), x0 & !x1);
                assert_eq!(Fcode::AND_NOT0.value(x0, x1), !x0 & x1);
            }
        }
    }

    #[test]
    fn test_permutations() {
        for bits in 0..16 {
            let f = Fcode::new(bits);
            for x0 in [false, true] {
                for x1 in [false, true] {
                    assert_eq!(f.invert_input0().value(x0, x1), f.value(!x0, x1));
                    assert_eq!(f.invert_input1().value(x0, x1), f.value(x0, !x1));
                    assert_eq!(f.swap_inputs().value(x0, x1), f.value(x1, x0));
                    assert_eq!((!f).value(x0, x1), !f.value(x0, x1));
                }
            }
        }
    }

    #[test]
    fn test_canonical_codes() {
        let canonical: Vec<u8> = (0..16).filter(|b| Fcode::new(*b).is_canonical()).collect();
        assert_eq!(canonical, vec![0x2, 0x4, 0x6, 0x8, 0xe]);
        assert!(Fcode::XOR.is_xor());
        assert!(!Fcode::XOR.is_and());
        assert!(Fcode::OR.is_and());
        assert!(!Fcode::new(0xa).is_and());
    }

    #[test]
    fn test_and_polarity() {
        for bits in 0..16 {
            let f = Fcode::new(bits);
            if let Some((i0, i1, o)) = f.and_polarity() {
                for x0 in [false, true] {
                    for x1 in [false, true] {
                        assert_eq!(f.value(x0, x1), o ^ ((x0 ^ i0) & (x1 ^ i1)));
                    }
                }
            }
        }
        assert_eq!(Fcode::AND.and_polarity(), Some((false, false, false)));
        assert_eq!(Fcode::OR.and_polarity(), Some((true, true, true)));
        assert_eq!(Fcode::AND_NOT1.and_polarity(), Some((false, true, false)));
    }

    #[test]
    fn test_normalize() {
        for bits in 0..16 {
            let f = Fcode::new(bits);
            for a in all_signals() {
                for b in all_signals() {
                    let n = normalize(f, a, b);
                    if let Node(c, [i0, i1], _) = n {
                        assert!(c.is_canonical(), "{f}({a}, {b}) gives {n}");
                        assert!(i0.ind() < i1.ind(), "{f}({a}, {b}) gives {n}");
                        assert!(!i0.is_inverted() && !i1.is_inverted());
                    }
                    for v0 in [false, true] {
                        for v1 in [false, true] {
                            let vals = [v0, v1];
                            let expected =
                                f.value(eval_signal(a, vals), eval_signal(b, vals));
                            assert_eq!(
                                eval_normalization(n, vals),
                                expected,
                                "{f}({a}, {b}) gives {n}"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_normalize_complement() {
        // A function and its complement share the same gate
        for bits in 0..16 {
            let f = Fcode::new(bits);
            for a in all_signals() {
                for b in all_signals() {
                    match (normalize(f, a, b), normalize(!f, a, b)) {
                        (Copy(s0), Copy(s1)) => assert_eq!(s0, !s1),
                        (Node(g0, i0, o0), Node(g1, i1, o1)) => {
                            assert_eq!(g0, g1);
                            assert_eq!(i0, i1);
                            assert_eq!(o0, !o1);
                        }
                        _ => panic!("Normalization of complements resulted in different gates"),
                    }
                }
            }
        }
    }

    #[test]
    fn test_normalize_examples() {
        let a = Signal::from_node(0);
        let b = Signal::from_node(1);
        assert_eq!(normalize(Fcode::AND, a, a), Copy(a));
        assert_eq!(normalize(Fcode::XOR, a, !a), Copy(Signal::one()));
        assert_eq!(normalize(Fcode::XOR, a, a), Copy(Signal::zero()));
        assert_eq!(normalize(Fcode::AND, a, Signal::one()), Copy(a));
        assert_eq!(normalize(Fcode::OR, a, Signal::one()), Copy(Signal::one()));
        assert_eq!(normalize(Fcode::AND, b, a), Node(Fcode::AND, [a, b], false));
        assert_eq!(normalize(Fcode::NAND, a, b), Node(Fcode::AND, [a, b], true));
        assert_eq!(normalize(Fcode::AND, !a, !b), Node(Fcode::OR, [a, b], true));
        assert_eq!(normalize(Fcode::XNOR, !a, b), Node(Fcode::XOR, [a, b], false));
        assert_eq!(normalize(Fcode::new(0xa), a, b), Copy(a));
        assert_eq!(normalize(Fcode::new(0x3), a, b), Copy(!b));
    }
}
