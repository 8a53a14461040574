// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use dropoff_core::Depth;

/// Breakpoints after ordering has been enforced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reconciled {
    pub b1: Depth,
    pub b2: Depth,
    /// `b2` was moved because it did not lie after `b1`.
    pub pushed: bool,
    /// After a push, whether the full `min_gap` fit before `xmax`.
    pub gap_honored: bool,
}

/// Orders the two breakpoints.
///
/// When `first >= second`, `b2` becomes `first + min_gap` clamped to `xmax`.
/// The correction is applied once; near the right edge the clamp can leave a
/// gap smaller than `min_gap` (down to zero when `first == xmax`). Callers
/// always pass a `first` taken from the series, so `b1 <= xmax` and the
/// clamped `b2` never falls below `b1`.
pub fn reconcile(first: Depth, second: Depth, min_gap: Depth, xmax: Depth) -> Reconciled {
    if first < second {
        return Reconciled {
            b1: first,
            b2: second,
            pushed: false,
            gap_honored: true,
        };
    }

    let pushed_to = first.saturating_add(min_gap);
    let b2 = pushed_to.min(xmax);
    Reconciled {
        b1: first,
        b2,
        pushed: true,
        gap_honored: b2 == pushed_to,
    }
}

#[cfg(test)]
mod tests {
    use super::{Reconciled, reconcile};

    #[test]
    fn ordered_breakpoints_pass_through() {
        assert_eq!(
            reconcile(30, 70, 10, 100),
            Reconciled {
                b1: 30,
                b2: 70,
                pushed: false,
                gap_honored: true,
            }
        );
    }

    #[test]
    fn ordered_breakpoints_closer_than_min_gap_are_left_alone() {
        let reconciled = reconcile(60, 65, 10, 100);
        assert_eq!((reconciled.b1, reconciled.b2), (60, 65));
        assert!(!reconciled.pushed);
    }

    #[test]
    fn equal_breakpoints_push_b2_by_min_gap() {
        let reconciled = reconcile(60, 60, 10, 100);
        assert_eq!((reconciled.b1, reconciled.b2), (60, 70));
        assert!(reconciled.pushed);
        assert!(reconciled.gap_honored);
    }

    #[test]
    fn inverted_breakpoints_push_b2_past_b1() {
        let reconciled = reconcile(70, 60, 10, 100);
        assert_eq!((reconciled.b1, reconciled.b2), (70, 80));
    }

    #[test]
    fn push_is_clamped_to_xmax() {
        let reconciled = reconcile(95, 80, 10, 100);
        assert_eq!((reconciled.b1, reconciled.b2), (95, 100));
        assert!(!reconciled.gap_honored);
    }

    #[test]
    fn b1_at_xmax_collapses_the_recovery_zone() {
        let reconciled = reconcile(100, 100, 10, 100);
        assert_eq!((reconciled.b1, reconciled.b2), (100, 100));
        assert!(reconciled.pushed);
        assert!(!reconciled.gap_honored);
    }

    #[test]
    fn zero_gap_keeps_b2_on_b1() {
        let reconciled = reconcile(40, 30, 0, 100);
        assert_eq!((reconciled.b1, reconciled.b2), (40, 40));
        assert!(reconciled.gap_honored);
    }
}
