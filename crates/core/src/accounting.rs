//! Asset-pool accounting arithmetic.
//!
//! A pool entry tracks `initial_quantity` and `current_quantity` for one
//! (campaign, asset) pair. Every transition clamps the result at zero and
//! the clamped excess is not remembered anywhere. Reversal subtracts the
//! original delta, not the effective change, so once a clamp has fired the
//! pair `apply` / `reverse` stops being an exact inverse and `current` can
//! end up above `initial + sum(deltas)`. Callers must not "fix" this by
//! adjusting directly: an edit of a recorded change is always
//! `reverse_delta(old)` followed by `apply_delta(new)` so the floor is
//! re-evaluated against the correct baseline.

/// Apply a signed quantity change to a current quantity.
pub fn apply_delta(current: i64, delta: i64) -> i64 {
    (current + delta).max(0)
}

/// Undo a previously applied change.
///
/// Subtracts the original delta and re-clamps. Not an exact inverse of
/// [`apply_delta`] once a clamp has occurred.
pub fn reverse_delta(current: i64, delta: i64) -> i64 {
    (current - delta).max(0)
}

/// Rebase an entry's starting quantity.
///
/// Shifts `current` by the same difference so the net effect of all
/// applied deltas is preserved, then re-clamps.
pub fn rebase_current(current: i64, old_initial: i64, new_initial: i64) -> i64 {
    (current + (new_initial - old_initial)).max(0)
}

/// Net movement of an entry since it was pooled.
pub fn net_change(initial: i64, current: i64) -> i64 {
    current - initial
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_then_reverse_is_identity_without_clamping() {
        let mut current = 10;
        for delta in [3, -5, 7, -2] {
            let applied = apply_delta(current, delta);
            assert_eq!(reverse_delta(applied, delta), current);
            current = applied;
        }
        assert_eq!(current, 13);
        assert_eq!(net_change(10, current), 3);
    }

    #[test]
    fn apply_clamps_at_zero() {
        assert_eq!(apply_delta(3, -5), 0);
        assert_eq!(apply_delta(0, -1), 0);
        assert_eq!(apply_delta(5, -5), 0);
    }

    #[test]
    fn reverse_clamps_at_zero() {
        assert_eq!(reverse_delta(3, 5), 0);
        assert_eq!(reverse_delta(0, 2), 0);
    }

    #[test]
    fn clamped_loss_reversal_overshoots_the_true_net() {
        // initial = current = 10, then a -15 loss clamps to 0.
        let clamped = apply_delta(10, -15);
        assert_eq!(clamped, 0);
        // Deleting that change reverses the original -15, not the
        // effective -10, landing on 15 rather than 10.
        assert_eq!(reverse_delta(clamped, -15), 15);
    }

    #[test]
    fn rebase_preserves_applied_deltas() {
        // initial 10 -> current 7 after a -3 change; rebasing to 20
        // keeps the -3 net effect.
        assert_eq!(rebase_current(7, 10, 20), 17);
        // Rebasing downward likewise.
        assert_eq!(rebase_current(7, 10, 5), 2);
    }

    #[test]
    fn rebase_clamps_when_the_new_start_is_too_low() {
        assert_eq!(rebase_current(2, 10, 1), 0);
    }

    #[test]
    fn net_change_is_signed() {
        assert_eq!(net_change(10, 7), -3);
        assert_eq!(net_change(4, 9), 5);
        assert_eq!(net_change(5, 5), 0);
    }
}
