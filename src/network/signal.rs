use std::fmt;
use std::ops::{BitXor, BitXorAssign, Not};

/// Representation of a signal (a node output or its complement)
///
/// May be 0, 1, n or !n.
/// Constants have no node: 0 is the uninverted constant and 1 its complement.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default)]
pub struct Signal {
    a: u32,
}

impl Signal {
    /// Constant zero signal
    pub fn zero() -> Signal {
        Signal { a: 0 }
    }

    /// Constant one signal
    pub fn one() -> Signal {
        Signal { a: 1 }
    }

    /// Create a signal from a node id
    pub fn from_node(id: usize) -> Signal {
        Self::from_ind(id as u32 + 1)
    }

    /// Create a signal from a node id and an inversion flag
    pub fn new(id: usize, inv: bool) -> Signal {
        Self::from_node(id) ^ inv
    }

    /// Create a signal from an optional node and an inversion flag
    pub(crate) fn from_parts(node: Option<usize>, inv: bool) -> Signal {
        match node {
            Some(id) => Signal::new(id, inv),
            None => Signal::from(inv),
        }
    }

    /// Create a signal from an index (including the constant at index 0)
    fn from_ind(v: u32) -> Signal {
        Signal { a: v << 1 }
    }

    /// Obtain the node id associated with the signal, or None for a constant
    pub fn node(&self) -> Option<usize> {
        if self.is_constant() {
            None
        } else {
            Some(self.ind() as usize - 1)
        }
    }

    /// Obtain the node id associated with the signal
    ///
    /// Panics on a constant.
    pub fn id(&self) -> usize {
        assert!(!self.is_constant(), "Constant signal has no node");
        self.ind() as usize - 1
    }

    /// Obtain the internal index associated with the signal: 0 for a constant, otherwise id() + 1
    pub fn ind(&self) -> u32 {
        self.a >> 1
    }

    /// Returns true if the signal represents a constant
    pub fn is_constant(&self) -> bool {
        self.ind() == 0
    }

    /// Returns true for the constant zero
    pub fn is_zero(&self) -> bool {
        *self == Signal::zero()
    }

    /// Returns true for the constant one
    pub fn is_one(&self) -> bool {
        *self == Signal::one()
    }

    /// Clear the inversion, if set
    pub fn without_inversion(&self) -> Signal {
        Signal { a: self.a & !1u32 }
    }

    /// Returns true if the signal is implicitly inverted
    ///
    /// False for nodes and zero.
    /// True for their complement and for one.
    pub fn is_inverted(&self) -> bool {
        self.a & 1 != 0
    }

    /// Return the internal representation of the signal
    pub fn raw(&self) -> u32 {
        self.a
    }
}

impl From<bool> for Signal {
    fn from(b: bool) -> Signal {
        if b {
            Signal::one()
        } else {
            Signal::zero()
        }
    }
}

impl Not for Signal {
    type Output = Signal;
    fn not(self) -> Signal {
        Signal { a: self.a ^ 1u32 }
    }
}

impl Not for &'_ Signal {
    type Output = Signal;
    fn not(self) -> Signal {
        Signal { a: self.a ^ 1u32 }
    }
}

impl BitXorAssign<bool> for Signal {
    fn bitxor_assign(&mut self, rhs: bool) {
        self.a ^= rhs as u32;
    }
}

impl BitXor<bool> for Signal {
    type Output = Signal;
    fn bitxor(self, rhs: bool) -> Self::Output {
        let mut l = self;
        l ^= rhs;
        l
    }
}

impl BitXor<bool> for &'_ Signal {
    type Output = Signal;
    fn bitxor(self, rhs: bool) -> Self::Output {
        let mut l = *self;
        l ^= rhs;
        l
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_constant() {
            let a = self.a & 1;
            write!(f, "{a}")
        } else {
            if self.is_inverted() {
                write!(f, "!")?;
            }
            write!(f, "n{}", self.id())
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
