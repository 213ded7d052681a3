//! Compiled formula representation.
//!
//! The compiler emits a closed tree of these nodes; the bar index is the
//! only free variable. Nothing outside this fixed grammar is
//! representable, which is what keeps untrusted formula text from gaining
//! capability beyond the field/function library.

use crate::domain::ohlcv::PriceField;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOp::Add => left + right,
            BinaryOp::Sub => left - right,
            BinaryOp::Mul => left * right,
            BinaryOp::Div => left / right,
        }
    }

    fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }
}

/// The fixed lookback function library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowFn {
    /// Trailing arithmetic mean over `period` bars.
    Ma,
    /// Exponential average re-seeded from the start of its own window.
    Ema,
    /// Value `period` bars back.
    Ref,
}

impl fmt::Display for WindowFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WindowFn::Ma => "MA",
            WindowFn::Ema => "EMA",
            WindowFn::Ref => "REF",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Field(PriceField),
    Literal(f64),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        func: WindowFn,
        field: PriceField,
        period: usize,
    },
}

impl Expr {
    /// Largest MA/EMA window referenced anywhere in the tree. REF lags are
    /// excluded: the insufficient-history diagnostic is defined over the
    /// smoothing windows only.
    pub fn max_smoothing_lookback(&self) -> usize {
        match self {
            Expr::Field(_) | Expr::Literal(_) => 0,
            Expr::Binary { left, right, .. } => left
                .max_smoothing_lookback()
                .max(right.max_smoothing_lookback()),
            Expr::Call { func, period, .. } => match func {
                WindowFn::Ma | WindowFn::Ema => *period,
                WindowFn::Ref => 0,
            },
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Field(field) => write!(f, "{}", field),
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Call {
                func,
                field,
                period,
            } => write!(f, "{}({},{})", func, field, period),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ma(period: usize) -> Expr {
        Expr::Call {
            func: WindowFn::Ma,
            field: PriceField::Close,
            period,
        }
    }

    #[test]
    fn binary_op_apply() {
        assert_eq!(BinaryOp::Add.apply(2.0, 3.0), 5.0);
        assert_eq!(BinaryOp::Sub.apply(2.0, 3.0), -1.0);
        assert_eq!(BinaryOp::Mul.apply(2.0, 3.0), 6.0);
        assert_eq!(BinaryOp::Div.apply(6.0, 3.0), 2.0);
    }

    #[test]
    fn division_follows_ieee() {
        assert!(BinaryOp::Div.apply(1.0, 0.0).is_infinite());
        assert!(BinaryOp::Div.apply(0.0, 0.0).is_nan());
    }

    #[test]
    fn lookback_of_leaf_nodes_is_zero() {
        assert_eq!(Expr::Field(PriceField::Close).max_smoothing_lookback(), 0);
        assert_eq!(Expr::Literal(3.5).max_smoothing_lookback(), 0);
    }

    #[test]
    fn lookback_of_ref_is_zero() {
        let lag = Expr::Call {
            func: WindowFn::Ref,
            field: PriceField::Close,
            period: 40,
        };
        assert_eq!(lag.max_smoothing_lookback(), 0);
    }

    #[test]
    fn lookback_takes_max_over_tree() {
        let expr = Expr::Binary {
            op: BinaryOp::Sub,
            left: Box::new(Expr::Call {
                func: WindowFn::Ema,
                field: PriceField::Close,
                period: 12,
            }),
            right: Box::new(ma(26)),
        };
        assert_eq!(expr.max_smoothing_lookback(), 26);
    }

    #[test]
    fn display_call() {
        assert_eq!(ma(20).to_string(), "MA(CLOSE,20)");
    }

    #[test]
    fn display_binary_is_parenthesized() {
        let expr = Expr::Binary {
            op: BinaryOp::Sub,
            left: Box::new(ma(12)),
            right: Box::new(ma(26)),
        };
        assert_eq!(expr.to_string(), "(MA(CLOSE,12) - MA(CLOSE,26))");
    }
}
