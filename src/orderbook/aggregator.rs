//! Top-of-book and depth aggregation over parsed levels.
//!
//! None of these functions assume the input is sorted.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use super::types::{BookSide, PriceLevel};

/// Highest bid price and lowest ask price.
pub fn best_bid_ask(bids: &[PriceLevel], asks: &[PriceLevel]) -> (Option<Decimal>, Option<Decimal>) {
    let best_bid = bids.iter().map(|l| l.price).max();
    let best_ask = asks.iter().map(|l| l.price).min();
    (best_bid, best_ask)
}

/// Midpoint of the book, falling back to whichever side exists.
pub fn midpoint(best_bid: Option<Decimal>, best_ask: Option<Decimal>) -> Option<Decimal> {
    match (best_bid, best_ask) {
        // Halving the gap keeps the result in range when the sum would overflow.
        (Some(bid), Some(ask)) => bid
            .checked_add(ask)
            .map(|sum| sum / Decimal::TWO)
            .or_else(|| ask.checked_sub(bid).map(|gap| bid + gap / Decimal::TWO)),
        (Some(bid), None) => Some(bid),
        (None, Some(ask)) => Some(ask),
        (None, None) => None,
    }
}

/// Best ask minus best bid. Negative for a crossed book.
pub fn spread(best_bid: Option<Decimal>, best_ask: Option<Decimal>) -> Option<Decimal> {
    match (best_bid, best_ask) {
        (Some(bid), Some(ask)) => ask.checked_sub(bid),
        _ => None,
    }
}

/// Check if the book is crossed or locked the wrong way (best_ask < best_bid).
pub fn is_crossed(best_bid: Option<Decimal>, best_ask: Option<Decimal>) -> bool {
    matches!(spread(best_bid, best_ask), Some(s) if s < Decimal::ZERO)
}

fn total_size<'a>(levels: impl Iterator<Item = &'a PriceLevel>) -> Decimal {
    levels.fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.size))
}

/// Resting size within `band` of the midpoint, both sides combined.
///
/// Counts bids priced at or above `mid - band` and asks at or below `mid + band`.
pub fn depth_in_band(
    bids: &[PriceLevel],
    asks: &[PriceLevel],
    mid: Option<Decimal>,
    band: Decimal,
) -> Option<Decimal> {
    let mid = mid?;
    let lo = mid.saturating_sub(band);
    let hi = mid.saturating_add(band);

    let bid_depth = total_size(bids.iter().filter(|l| l.price >= lo));
    let ask_depth = total_size(asks.iter().filter(|l| l.price <= hi));

    Some(bid_depth.saturating_add(ask_depth))
}

/// Sort a copy of `levels` best-first for the given side.
///
/// Bids descend, asks ascend. The sort is stable, so equal prices keep input order.
pub fn sorted_levels(levels: &[PriceLevel], side: BookSide) -> Vec<PriceLevel> {
    let mut sorted = levels.to_vec();
    sorted.sort_by(|a, b| compare_for_side(a, b, side));
    sorted
}

/// Best `n` levels of a side, best-first.
pub fn top_levels(levels: &[PriceLevel], side: BookSide, n: usize) -> Vec<PriceLevel> {
    let mut sorted = sorted_levels(levels, side);
    sorted.truncate(n);
    sorted
}

fn compare_for_side(a: &PriceLevel, b: &PriceLevel, side: BookSide) -> Ordering {
    match side {
        BookSide::Bid => b.price.cmp(&a.price),
        BookSide::Ask => a.price.cmp(&b.price),
    }
}
