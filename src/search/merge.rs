//! Merge algorithms over docID-ascending postings lists.

use std::{cmp::Ordering, collections::HashSet};

use crate::postings::{Offset, PostingsEntry, PostingsList};

/// Documents present in both lists, without positions.
pub fn intersect(a: &PostingsList, b: &PostingsList) -> PostingsList {
    let (a, b) = (a.entries(), b.entries());
    let mut answer = PostingsList::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].doc_id.cmp(&b[j].doc_id) {
            Ordering::Equal => {
                answer.push(PostingsEntry::new(a[i].doc_id));
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }

    answer
}

/// Documents where some position of `b` lies exactly `k` after a position
/// of `a`. The matching `b` positions become the result's positions, so the
/// output can be chained with a further term.
pub fn positional_intersect(a: &PostingsList, b: &PostingsList, k: Offset) -> PostingsList {
    let (a, b) = (a.entries(), b.entries());
    let mut answer = PostingsList::new();
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        match a[i].doc_id.cmp(&b[j].doc_id) {
            Ordering::Equal => {
                let positions = adjacent_positions(&a[i].positions, &b[j].positions, k);
                if !positions.is_empty() {
                    answer.push(PostingsEntry::with_positions(a[i].doc_id, positions));
                }
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }

    answer
}

fn adjacent_positions(first: &[Offset], second: &[Offset], k: Offset) -> Vec<Offset> {
    let mut matches = Vec::new();

    for &p1 in first {
        let target = u64::from(p1) + u64::from(k);
        for &p2 in second {
            let p2_wide = u64::from(p2);
            if p2_wide == target {
                matches.push(p2);
            } else if p2_wide > target {
                break;
            }
        }
    }

    matches
}

/// Every document of every list once, in first-seen order, without positions.
pub fn union<'a, I>(lists: I) -> PostingsList
where
    I: IntoIterator<Item = &'a PostingsList>,
{
    let mut seen = HashSet::new();

    lists
        .into_iter()
        .flat_map(PostingsList::iter)
        .filter(|entry| seen.insert(entry.doc_id))
        .map(|entry| PostingsEntry::new(entry.doc_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postings::DocId;

    fn list(entries: &[(DocId, &[Offset])]) -> PostingsList {
        entries
            .iter()
            .map(|(doc_id, positions)| PostingsEntry::with_positions(*doc_id, positions.to_vec()))
            .collect()
    }

    #[test]
    fn intersect_is_commutative() {
        let a = list(&[(0, &[1]), (2, &[0]), (5, &[3]), (9, &[1])]);
        let b = list(&[(1, &[0]), (2, &[4]), (9, &[2]), (12, &[0])]);

        let ab = intersect(&a, &b);
        assert_eq!(ab.doc_ids(), vec![2, 9]);
        assert_eq!(ab, intersect(&b, &a));
    }

    #[test]
    fn intersect_with_empty() {
        let a = list(&[(0, &[1])]);
        assert!(intersect(&a, &PostingsList::new()).is_empty());
    }

    #[test]
    fn phrase_of_adjacent_terms() {
        // "the cat sat" / "the dog sat"
        let the = list(&[(0, &[0]), (1, &[0])]);
        let cat = list(&[(0, &[1])]);

        let result = positional_intersect(&the, &cat, 1);
        assert_eq!(result.entries(), &[PostingsEntry::with_positions(0, vec![1])]);
    }

    #[test]
    fn phrase_chains_left_to_right() {
        let a = list(&[(0, &[0, 4]), (1, &[2])]);
        let b = list(&[(0, &[1, 5]), (1, &[7])]);
        let c = list(&[(0, &[6]), (1, &[8])]);

        let ab = positional_intersect(&a, &b, 1);
        assert_eq!(ab.entries(), &[PostingsEntry::with_positions(0, vec![1, 5])]);

        let abc = positional_intersect(&ab, &c, 1);
        assert_eq!(abc.entries(), &[PostingsEntry::with_positions(0, vec![6])]);
    }

    #[test]
    fn phrase_with_wider_gap() {
        let a = list(&[(3, &[2, 10])]);
        let b = list(&[(3, &[3, 5, 13])]);

        assert_eq!(
            positional_intersect(&a, &b, 3).entries(),
            &[PostingsEntry::with_positions(3, vec![5, 13])]
        );
    }

    #[test]
    fn union_keeps_first_seen_order() {
        let a = list(&[(4, &[0]), (7, &[1])]);
        let b = list(&[(1, &[0]), (4, &[2])]);

        assert_eq!(union([&a, &b]).doc_ids(), vec![4, 7, 1]);
    }
}
