//! Keeps a breakpoint sequence minimal: no two adjacent breakpoints may carry
//! the same label.

use itertools::Itertools;

use crate::models::Breakpoint;

/// Drops every breakpoint whose label equals the label of the previous kept
/// breakpoint. The input must already be sorted by index.
#[inline]
pub fn coalesce(breakpoints: &mut Vec<Breakpoint>) {
    // `dedup_by` compares each element against the last retained one
    breakpoints.dedup_by(|current, kept| current.label == kept.label);
}

/// Restores the invariant after a single insert, overwrite or removal at
/// `position`. Only the pairs `(position - 1, position)` and
/// `(position, position + 1)` can have become redundant.
#[inline]
pub fn coalesce_near(breakpoints: &mut Vec<Breakpoint>, position: usize) {
    let mut current = position.max(1);
    for _ in 0..2 {
        if current >= breakpoints.len() {
            break;
        }
        if breakpoints[current - 1].label == breakpoints[current].label {
            breakpoints.remove(current);
        } else {
            current += 1;
        }
    }
}

/// Strictly increasing indices and no adjacent duplicate labels.
#[inline]
pub fn is_canonical(breakpoints: &[Breakpoint]) -> bool {
    breakpoints
        .iter()
        .tuple_windows()
        .all(|(a, b)| a.index < b.index && a.label != b.label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Label;

    fn bp(index: usize, label: u8) -> Breakpoint {
        Breakpoint::new(index, Label::new(label).expect("non-zero label"))
    }

    #[test]
    fn keeps_first_of_each_run() {
        let mut breakpoints = vec![bp(0, 1), bp(3, 1), bp(5, 2), bp(6, 2), bp(9, 2), bp(12, 1)];
        coalesce(&mut breakpoints);
        assert_eq!(breakpoints, vec![bp(0, 1), bp(5, 2), bp(12, 1)]);
        assert!(is_canonical(&breakpoints));
    }

    #[test]
    fn coalescing_twice_changes_nothing() {
        let mut once = vec![bp(1, 3), bp(2, 3), bp(4, 1), bp(8, 3), bp(9, 3)];
        coalesce(&mut once);
        let mut twice = once.clone();
        coalesce(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_and_single_sequences_are_canonical() {
        let mut empty: Vec<Breakpoint> = Vec::new();
        coalesce(&mut empty);
        assert!(empty.is_empty());
        assert!(is_canonical(&empty));
        assert!(is_canonical(&[bp(7, 2)]));
    }

    #[test]
    fn detects_violations() {
        assert!(!is_canonical(&[bp(1, 1), bp(2, 1)]));
        assert!(!is_canonical(&[bp(2, 1), bp(2, 2)]));
        assert!(!is_canonical(&[bp(3, 1), bp(2, 2)]));
    }

    #[test]
    fn neighbourhood_pass_drops_redundant_insert() {
        // (10, 1) was inserted after (5, 1)
        let mut breakpoints = vec![bp(5, 1), bp(10, 1), bp(20, 2)];
        coalesce_near(&mut breakpoints, 1);
        assert_eq!(breakpoints, vec![bp(5, 1), bp(20, 2)]);
    }

    #[test]
    fn neighbourhood_pass_drops_redundant_follower() {
        // (10, 2) was inserted before (20, 2)
        let mut breakpoints = vec![bp(5, 1), bp(10, 2), bp(20, 2), bp(30, 3)];
        coalesce_near(&mut breakpoints, 1);
        assert_eq!(breakpoints, vec![bp(5, 1), bp(10, 2), bp(30, 3)]);
    }

    #[test]
    fn neighbourhood_pass_merges_both_sides_of_an_overwrite() {
        // (10, 2) was overwritten with label 1 between two label-1 breakpoints
        let mut breakpoints = vec![bp(5, 1), bp(10, 1), bp(15, 1), bp(20, 3)];
        coalesce_near(&mut breakpoints, 1);
        assert_eq!(breakpoints, vec![bp(5, 1), bp(20, 3)]);
    }

    #[test]
    fn neighbourhood_pass_after_removal() {
        // (10, 2) was removed from between (5, 1) and (15, 1)
        let mut breakpoints = vec![bp(5, 1), bp(15, 1), bp(20, 2)];
        coalesce_near(&mut breakpoints, 1);
        assert_eq!(breakpoints, vec![bp(5, 1), bp(20, 2)]);
    }

    #[test]
    fn neighbourhood_pass_at_the_front() {
        let mut breakpoints = vec![bp(0, 2), bp(4, 2), bp(8, 1)];
        coalesce_near(&mut breakpoints, 0);
        assert_eq!(breakpoints, vec![bp(0, 2), bp(8, 1)]);
    }
}
