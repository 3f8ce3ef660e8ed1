//! Novelty detection against the baseline snapshot.

use mediere_client::RawListing;

/// Listings fetched this run whose id is absent from the baseline.
///
/// Ids are compared as text: the baseline comes back from CSV as strings
/// while the API may serve numbers, and a typed comparison would produce
/// false negatives. The quadratic scan is fine at the expected scale
/// (hundreds to low thousands of records).
pub fn new_listings(fetched: &[RawListing], baseline: &[RawListing]) -> Vec<RawListing> {
    fetched
        .iter()
        .filter(|listing| !baseline.iter().any(|seen| seen.id() == listing.id()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn listing(id: serde_json::Value) -> RawListing {
        RawListing::from_api_row([("id".to_string(), id)].into_iter().collect())
    }

    #[test]
    fn everything_is_new_against_empty_baseline() {
        let fetched = vec![listing(json!(1)), listing(json!(2))];
        assert_eq!(new_listings(&fetched, &[]).len(), 2);
    }

    #[test]
    fn known_id_is_never_reclassified_as_new() {
        let baseline = vec![listing(json!("42"))];
        let fetched = vec![listing(json!(42)), listing(json!(43))];

        let new = new_listings(&fetched, &baseline);
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].id(), "43");
    }

    #[test]
    fn numeric_and_text_ids_compare_equal() {
        // Baseline ids are CSV strings; fetched ids may be JSON numbers.
        let baseline = vec![listing(json!("100"))];
        let fetched = vec![listing(json!(100))];
        assert!(new_listings(&fetched, &baseline).is_empty());
    }
}
