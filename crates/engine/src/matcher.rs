use crate::aggregate::{MismatchDetail, ReturnStats};
use crate::model::{MatchOutcome, Record, SaleIndex};
use crate::schema::{FieldPair, MatchStrategy, Schema};

/// Bounds policy for required-pair checks. Direct matching treats a column
/// past the end of either record as a failed comparison; the catalog
/// order scan skips such pairs instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bounds {
    Reject,
    Skip,
}

#[derive(Debug, Clone, Copy)]
enum Failure<'a> {
    Value {
        pair: &'a FieldPair,
        sale_value: &'a str,
        return_value: &'a str,
        nullable: bool,
    },
    OutOfBounds,
}

impl<'a> Failure<'a> {
    fn detail(self) -> Option<MismatchDetail<'a>> {
        match self {
            Self::Value { pair, sale_value, return_value, nullable } => Some(MismatchDetail {
                pair,
                sale_value,
                return_value,
                nullable,
            }),
            Self::OutOfBounds => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Pair checks
// ---------------------------------------------------------------------------

fn check_required<'a>(
    pairs: &'a [FieldPair],
    sale: &'a Record,
    ret: &'a Record,
    bounds: Bounds,
) -> Result<(), Failure<'a>> {
    for pair in pairs {
        match (sale.get(pair.sale.col), ret.get(pair.ret.col)) {
            (Some(sale_value), Some(return_value)) => {
                if sale_value != return_value {
                    return Err(Failure::Value { pair, sale_value, return_value, nullable: false });
                }
            }
            _ => {
                if bounds == Bounds::Reject {
                    return Err(Failure::OutOfBounds);
                }
            }
        }
    }
    Ok(())
}

/// Store customer linkage: must agree when both columns are present;
/// a short record on either side passes.
fn check_customer<'a>(
    pair: &'a FieldPair,
    sale: &'a Record,
    ret: &'a Record,
) -> Result<(), Failure<'a>> {
    match (sale.get(pair.sale.col), ret.get(pair.ret.col)) {
        (Some(sale_value), Some(return_value)) if sale_value != return_value => {
            Err(Failure::Value { pair, sale_value, return_value, nullable: false })
        }
        _ => Ok(()),
    }
}

/// Relaxed NULL semantics: an empty return value passes, a non-empty return
/// against an empty sale value passes, both non-empty must be equal.
fn check_nullable<'a>(
    pairs: &'a [FieldPair],
    sale: &'a Record,
    ret: &'a Record,
) -> Result<(), Failure<'a>> {
    for pair in pairs {
        if let (Some(sale_value), Some(return_value)) =
            (sale.get(pair.sale.col), ret.get(pair.ret.col))
        {
            if !return_value.is_empty() && !sale_value.is_empty() && sale_value != return_value {
                return Err(Failure::Value { pair, sale_value, return_value, nullable: true });
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Matching pass
// ---------------------------------------------------------------------------

/// Classify one return record and record it into `stats`.
///
/// `None` means the line was too short to derive a key: counted as skipped,
/// never as success or failure.
pub fn match_return(
    schema: &Schema,
    index: &SaleIndex,
    ret: &Record,
    stats: &mut ReturnStats,
) -> Option<MatchOutcome> {
    let Some(key) = schema.key.return_key(ret) else {
        stats.record_skipped();
        return None;
    };
    let Some(candidates) = index.candidates(&key) else {
        stats.record_no_sale(&key);
        return Some(MatchOutcome::NoSale);
    };
    let outcome = match &schema.strategy {
        MatchStrategy::Direct { customer } => match candidates.first() {
            Some(sale) => match_direct(schema, customer.as_ref(), sale, &key, ret, stats),
            // unique buckets always hold one record
            None => {
                stats.record_mismatch(&key, None);
                MatchOutcome::FieldMismatch
            }
        },
        MatchStrategy::TwoTier { order } => {
            match_two_tier(schema, order, candidates, &key, ret, stats)
        }
    };
    Some(outcome)
}

/// Run the full matching pass: every return is classified exactly once.
pub fn match_returns(
    schema: &Schema,
    index: &SaleIndex,
    returns: &[Record],
    stats: &mut ReturnStats,
) {
    for ret in returns {
        match_return(schema, index, ret, stats);
    }
}

fn match_direct(
    schema: &Schema,
    customer: Option<&FieldPair>,
    sale: &Record,
    key: &str,
    ret: &Record,
    stats: &mut ReturnStats,
) -> MatchOutcome {
    let checked = check_required(schema.required, sale, ret, Bounds::Reject)
        .and_then(|()| customer.map_or(Ok(()), |pair| check_customer(pair, sale, ret)))
        .and_then(|()| check_nullable(schema.nullable, sale, ret));
    match checked {
        Ok(()) => {
            stats.record_matched(key);
            MatchOutcome::Matched
        }
        Err(failure) => {
            stats.record_mismatch(key, failure.detail());
            MatchOutcome::FieldMismatch
        }
    }
}

/// Catalog matching: scan the item's order lines for one whose order number
/// matches and verifies, otherwise accept on item existence alone. Nullable
/// pairs are not consulted on this path.
fn match_two_tier(
    schema: &Schema,
    order: &FieldPair,
    candidates: &[Record],
    item_key: &str,
    ret: &Record,
    stats: &mut ReturnStats,
) -> MatchOutcome {
    let return_order = ret.get(order.ret.col).filter(|v| !v.is_empty());
    if let Some(order_no) = return_order {
        for sale in candidates {
            let sale_order = sale.get(order.sale.col).filter(|v| !v.is_empty());
            if sale_order != Some(order_no) {
                continue;
            }
            if check_required(schema.required, sale, ret, Bounds::Skip).is_ok() {
                stats.record_matched(&format!("{item_key}_{order_no}"));
                return MatchOutcome::Matched;
            }
            // field disagreement on this order line; keep scanning, the
            // existence fallback below still applies
        }
    }
    if candidates.is_empty() {
        // the loader never stores an empty bucket
        stats.record_mismatch(item_key, None);
        MatchOutcome::FieldMismatch
    } else {
        stats.record_existence_match(item_key, return_order);
        MatchOutcome::Matched
    }
}
