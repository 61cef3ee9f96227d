//! Venn-diagram membership masks over label arrays.
//!
//! A Venn diagram is an ordered list of terms `(S, polarity)` combined by
//! logical AND: a label satisfies a term iff its membership in `S` equals the
//! polarity. Used to select events by inclusion/exclusion over unit labels.
use std::collections::HashSet;

/// An ordered conjunction of `(set, polarity)` terms.
pub type Venn = Vec<(HashSet<i64>, bool)>;

/// Evaluate a Venn diagram over `labels`.
///
/// `mask[i]` is true iff for every term `(S, p)`, `(labels[i] ∈ S) == p`.
/// Terms are evaluated left to right with short-circuiting.
pub fn apply_venn_mask(venn: &Venn, labels: &[i64]) -> Vec<bool> {
    labels
        .iter()
        .map(|label| venn.iter().all(|(set, polarity)| set.contains(label) == *polarity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusion_and_exclusion() {
        let venn: Venn = vec![
            (HashSet::from([1, 2]), true),
            (HashSet::from([3]), false),
        ];
        let mask = apply_venn_mask(&venn, &[1, 3, 2, 4]);
        assert_eq!(mask, vec![true, false, true, false]);
    }

    #[test]
    fn empty_diagram_accepts_everything() {
        let mask = apply_venn_mask(&Vec::new(), &[7, -1, 0]);
        assert_eq!(mask, vec![true, true, true]);
    }

    #[test]
    fn pure_exclusion() {
        let venn: Venn = vec![(HashSet::from([5]), false)];
        let mask = apply_venn_mask(&venn, &[4, 5, 6]);
        assert_eq!(mask, vec![true, false, true]);
    }
}
