//! Material change detection between two snapshots of the same scope.

use super::{Rate, Snapshot};

/// Whether `new` differs materially from `old`.
///
/// A material change is any record added, removed, or differing in buy/sell
/// value. Values are compared at full fetched precision with exact decimal
/// equality; display rounding never enters into it.
///
/// Both directions are covered: because a snapshot holds at most one record
/// per pair, equal record counts plus a match for every old record imply a
/// bijection, so a pure addition always shows up either in the count check or
/// as a missing old pair.
#[must_use]
pub fn snapshot_changed(old: &Snapshot, new: &Snapshot) -> bool {
    if old.len() != new.len() {
        return true;
    }

    old.rates.iter().any(|prev| match new.rate_for(prev.pair) {
        Some(cur) => rate_changed(prev, cur),
        None => true,
    })
}

fn rate_changed(old: &Rate, new: &Rate) -> bool {
    old.buy != new.buy || old.sell != new.sell
}
