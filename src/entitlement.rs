//! Entitlement decision
//!
//! An account is entitled when its most recently created subscription
//! row is in an entitling status. Only the newest row counts: an old
//! active subscription does not outvote a newer canceled one, and a
//! canceled history does not block a newer active subscription.

use crate::store::Subscription;

/// Decide entitlement from an account's subscription rows, which must
/// already be sorted newest `created_at` first (the store's projection
/// order).
pub fn is_entitled(subscriptions_newest_first: &[Subscription]) -> bool {
    subscriptions_newest_first
        .first()
        .is_some_and(Subscription::is_entitling)
}
