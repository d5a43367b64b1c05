//! Composite liquidity score.
//!
//! `score = depth / depth_divisor - spread * spread_penalty - slippage * slippage_penalty`
//!
//! The weights are heuristic ranking knobs, not derived quantities. Only the
//! shape (more depth up, wider spread and costlier fills down) is meant to hold.

use rust_decimal::Decimal;

/// Weights of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreWeights {
    /// Depth is divided by this.
    pub depth_divisor: Decimal,
    /// Multiplier on the spread penalty.
    pub spread_penalty: Decimal,
    /// Multiplier on the reference-budget slippage penalty.
    pub slippage_penalty: Decimal,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            depth_divisor: Decimal::new(1000, 0),
            spread_penalty: Decimal::new(3, 0),
            slippage_penalty: Decimal::new(4, 0),
        }
    }
}

impl ScoreWeights {
    /// Score a book; absent unless depth, spread and slippage are all present.
    pub fn score(
        &self,
        depth: Option<Decimal>,
        spread: Option<Decimal>,
        slippage_ref: Option<Decimal>,
    ) -> Option<Decimal> {
        let depth_term = depth?.checked_div(self.depth_divisor)?;
        let spread_term = spread?.checked_mul(self.spread_penalty)?;
        let slippage_term = slippage_ref?.checked_mul(self.slippage_penalty)?;

        depth_term.checked_sub(spread_term)?.checked_sub(slippage_term)
    }
}
