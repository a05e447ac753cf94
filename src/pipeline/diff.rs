//! Delta detection between the current fetch and the previous snapshot.
//!
//! Identity is the offer `code`, compared by exact string equality.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::Offer;

/// Offers that appeared since the previous snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Delta {
    /// Offers whose code was not in the previous snapshot, in current order
    pub new_offers: Vec<Offer>,
    /// Whether anything should be notified
    pub has_new: bool,
    /// Codes present before but missing now
    pub removed: Vec<String>,
    /// Codes present in both whose other fields differ
    pub changed: Vec<String>,
}

impl Delta {
    /// Number of new offers.
    pub fn new_count(&self) -> usize {
        self.new_offers.len()
    }
}

/// Compute the delta between `current` and an optional `previous` snapshot.
///
/// With no previous snapshot every current offer is new, but an empty
/// current collection is never reported as new.
pub fn detect(current: &[Offer], previous: Option<&[Offer]>) -> Delta {
    let Some(previous) = previous else {
        return Delta {
            new_offers: current.to_vec(),
            has_new: !current.is_empty(),
            removed: Vec::new(),
            changed: Vec::new(),
        };
    };

    let prev_map: HashMap<&str, &Offer> =
        previous.iter().map(|o| (o.code.as_str(), o)).collect();
    let curr_codes: HashSet<&str> = current.iter().map(|o| o.code.as_str()).collect();

    let new_offers: Vec<Offer> = current
        .iter()
        .filter(|o| !prev_map.contains_key(o.code.as_str()))
        .cloned()
        .collect();

    let changed = current
        .iter()
        .filter(|o| prev_map.get(o.code.as_str()).is_some_and(|p| *p != *o))
        .map(|o| o.code.clone())
        .collect();

    let removed = previous
        .iter()
        .filter(|o| !curr_codes.contains(o.code.as_str()))
        .map(|o| o.code.clone())
        .collect();

    Delta {
        has_new: !new_offers.is_empty(),
        new_offers,
        removed,
        changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_offer(code: &str, status: &str) -> Offer {
        Offer {
            code: code.to_string(),
            title: format!("Offer {code}"),
            owner: "Dpto. Física".into(),
            start_date: "01/03/2024".into(),
            end_date: "15/03/2024".into(),
            status: status.to_string(),
        }
    }

    fn codes(offers: &[Offer]) -> Vec<&str> {
        offers.iter().map(|o| o.code.as_str()).collect()
    }

    #[test]
    fn test_first_run_everything_is_new() {
        let curr = vec![make_offer("A", "Abierta"), make_offer("B", "Abierta")];
        let delta = detect(&curr, None);
        assert!(delta.has_new);
        assert_eq!(delta.new_offers, curr);
    }

    // An empty first fetch is not "new": nothing to notify.
    #[test]
    fn test_first_run_empty_is_not_new() {
        let delta = detect(&[], None);
        assert!(!delta.has_new);
        assert!(delta.new_offers.is_empty());
    }

    #[test]
    fn test_additions_preserve_current_order() {
        let prev = vec![make_offer("1", "Abierta"), make_offer("2", "Abierta")];
        let curr = vec![make_offer("2", "Abierta"), make_offer("3", "Abierta")];

        let delta = detect(&curr, Some(prev.as_slice()));
        assert!(delta.has_new);
        assert_eq!(codes(&delta.new_offers), vec!["3"]);
        assert_eq!(delta.removed, vec!["1"]);
        assert!(delta.changed.is_empty());
    }

    #[test]
    fn test_order_follows_current() {
        let prev = vec![make_offer("1", "Abierta")];
        let curr = vec![
            make_offer("9", "Abierta"),
            make_offer("1", "Abierta"),
            make_offer("4", "Abierta"),
        ];
        let delta = detect(&curr, Some(prev.as_slice()));
        assert_eq!(codes(&delta.new_offers), vec!["9", "4"]);
    }

    #[test]
    fn test_no_new_codes_with_status_change() {
        let prev = vec![make_offer("1", "Abierta"), make_offer("2", "Abierta")];
        let curr = vec![make_offer("1", "Abierta"), make_offer("2", "Cerrada")];

        let delta = detect(&curr, Some(prev.as_slice()));
        assert!(!delta.has_new);
        assert!(delta.new_offers.is_empty());
        assert_eq!(delta.changed, vec!["2"]);
    }

    #[test]
    fn test_code_comparison_is_exact() {
        let prev = vec![make_offer("abc", "Abierta")];
        let curr = vec![make_offer("ABC", "Abierta"), make_offer(" abc", "Abierta")];
        let delta = detect(&curr, Some(prev.as_slice()));
        assert_eq!(codes(&delta.new_offers), vec!["ABC", " abc"]);
    }

    #[test]
    fn test_empty_previous_snapshot() {
        let curr = vec![make_offer("1", "Abierta")];
        let delta = detect(&curr, Some(&[][..]));
        assert!(delta.has_new);
        assert_eq!(delta.new_count(), 1);
    }

    #[test]
    fn test_detect_is_idempotent() {
        let prev = vec![make_offer("1", "Abierta"), make_offer("2", "Abierta")];
        let curr = vec![make_offer("2", "Cerrada"), make_offer("3", "Abierta")];
        assert_eq!(detect(&curr, Some(prev.as_slice())), detect(&curr, Some(prev.as_slice())));
        assert_eq!(detect(&curr, None), detect(&curr, None));
    }
}
