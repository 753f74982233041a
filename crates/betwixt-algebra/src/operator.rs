//! Binary operators, monoids and semirings over `f64`.

/// A binary operator applied position-wise or as a semiring multiply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `x`
    First,
    /// `y`
    Second,
    Plus,
    Minus,
    Times,
    Div,
    Min,
    Max,
}

impl BinaryOp {
    #[inline]
    #[must_use]
    pub fn apply(self, x: f64, y: f64) -> f64 {
        match self {
            Self::First => x,
            Self::Second => y,
            Self::Plus => x + y,
            Self::Minus => x - y,
            Self::Times => x * y,
            Self::Div => x / y,
            Self::Min => x.min(y),
            Self::Max => x.max(y),
        }
    }
}

/// An associative operator with an identity, used for reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Monoid {
    Plus,
    Times,
    Min,
    Max,
}

impl Monoid {
    #[must_use]
    pub const fn identity(self) -> f64 {
        match self {
            Self::Plus => 0.0,
            Self::Times => 1.0,
            Self::Min => f64::INFINITY,
            Self::Max => f64::NEG_INFINITY,
        }
    }

    #[inline]
    #[must_use]
    pub fn combine(self, x: f64, y: f64) -> f64 {
        match self {
            Self::Plus => x + y,
            Self::Times => x * y,
            Self::Min => x.min(y),
            Self::Max => x.max(y),
        }
    }

    /// The same operation as a [`BinaryOp`], for use as an accumulator.
    #[must_use]
    pub const fn as_op(self) -> BinaryOp {
        match self {
            Self::Plus => BinaryOp::Plus,
            Self::Times => BinaryOp::Times,
            Self::Min => BinaryOp::Min,
            Self::Max => BinaryOp::Max,
        }
    }
}

/// `add` reduces along the shared dimension, `multiply` combines the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Semiring {
    pub add: Monoid,
    pub multiply: BinaryOp,
}

impl Semiring {
    /// Sums the left operand over every structurally present right entry.
    ///
    /// With a frontier of path counts on the left and an adjacency pattern on
    /// the right this propagates counts unchanged along edges.
    pub const PLUS_FIRST: Self = Self {
        add: Monoid::Plus,
        multiply: BinaryOp::First,
    };

    pub const PLUS_TIMES: Self = Self {
        add: Monoid::Plus,
        multiply: BinaryOp::Times,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_apply() {
        assert_eq!(BinaryOp::First.apply(2.0, 5.0), 2.0);
        assert_eq!(BinaryOp::Second.apply(2.0, 5.0), 5.0);
        assert_eq!(BinaryOp::Div.apply(3.0, 2.0), 1.5);
        assert_eq!(BinaryOp::Minus.apply(3.0, 2.0), 1.0);
        assert_eq!(BinaryOp::Max.apply(3.0, 2.0), 3.0);
    }

    #[test]
    fn monoid_identity_is_neutral() {
        for m in [Monoid::Plus, Monoid::Times, Monoid::Min, Monoid::Max] {
            assert_eq!(m.combine(m.identity(), 7.5), 7.5, "{m:?}");
            assert_eq!(m.as_op().apply(7.5, m.identity()), 7.5, "{m:?}");
        }
    }
}
