//! Tie-break decisions
//!
//! When two parties race to open overlapping negotiations there is no
//! arbiter to ask, so both sides must compute the identical winner without
//! an extra round trip. The comparison is plain lexicographic order over
//! immutable strings - session ids or party identities - never creation
//! time, sequence counters or any other mutable property.
//!
//! Callers are responsible for symmetry: both parties must compare the same
//! two strings (e.g. both compare the two colliding sids, or both compare
//! the two party identities) for their outcomes to agree.

use std::cmp::Ordering;

/// Returns the prevailing value of the two; the owner of the greater string
/// proceeds, the other must abandon its attempt.
pub fn winner<'a>(a: &'a str, b: &'a str) -> &'a str {
    match a.cmp(b) {
        Ordering::Less => b,
        _ => a,
    }
}

/// Whether the local value prevails over the remote one.
pub fn local_wins(local: &str, remote: &str) -> bool {
    local > remote
}
