//! Execution-cost simulation by walking the ask side with a cash budget.

use rust_decimal::Decimal;
use tracing::instrument;

use super::aggregator::sorted_levels;
use super::types::{BookSide, BudgetFill, PriceLevel};

/// Remaining budget at or below this is treated as spent.
pub const BUDGET_EXHAUSTED_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Fills at or below this many shares count as no fill.
pub const MIN_FILLED_SHARES: Decimal = Decimal::from_parts(1, 0, 0, false, 12);

/// Simulate buying with `budget` units of cash, best ask first.
///
/// Levels are visited in ascending price order (stable on input order for equal
/// prices). Non-positive prices are skipped. The first level the remaining budget
/// cannot cover is filled partially and ends the walk. Returns `None` when the
/// budget is non-positive, the book is empty, nothing meaningful was filled, or
/// the running totals leave the decimal range.
/// The input slice is never modified.
#[instrument(level = "trace", skip(asks), fields(budget = %budget, levels = asks.len()))]
pub fn simulate_buy(asks: &[PriceLevel], budget: Decimal) -> Option<BudgetFill> {
    if budget <= Decimal::ZERO || asks.is_empty() {
        return None;
    }

    let mut remaining = budget;
    let mut total_spent = Decimal::ZERO;
    let mut filled_shares = Decimal::ZERO;
    let mut worst_price = Decimal::ZERO;
    let mut levels_touched = 0usize;

    for level in sorted_levels(asks, BookSide::Ask) {
        if level.price <= Decimal::ZERO {
            continue;
        }

        levels_touched += 1;
        worst_price = level.price;

        match level.notional() {
            Some(cost) if remaining >= cost => {
                total_spent = total_spent.checked_add(cost)?;
                filled_shares = filled_shares.saturating_add(level.size);
                remaining = remaining.checked_sub(cost)?;
            }
            _ => {
                let partial_shares = remaining
                    .checked_div(level.price)
                    .unwrap_or(Decimal::MAX);
                filled_shares = filled_shares.saturating_add(partial_shares);
                total_spent = total_spent.checked_add(remaining)?;
                break;
            }
        }

        if remaining <= BUDGET_EXHAUSTED_EPSILON {
            break;
        }
    }

    if filled_shares <= MIN_FILLED_SHARES {
        return None;
    }

    let avg_price = total_spent.checked_div(filled_shares)?;

    Some(BudgetFill {
        budget,
        filled_shares,
        total_spent,
        avg_price,
        worst_price,
        levels_touched,
    })
}

/// Average fill price for `budget`, if any shares could be bought.
pub fn avg_fill_price(asks: &[PriceLevel], budget: Decimal) -> Option<Decimal> {
    simulate_buy(asks, budget).map(|fill| fill.avg_price)
}

/// Reference price slippage is measured against: midpoint, else best ask.
pub fn slippage_baseline(mid: Option<Decimal>, best_ask: Option<Decimal>) -> Option<Decimal> {
    mid.or(best_ask)
}

/// Fill price minus baseline; absent if either is absent.
pub fn slippage(fill_price: Option<Decimal>, baseline: Option<Decimal>) -> Option<Decimal> {
    fill_price?.checked_sub(baseline?)
}
