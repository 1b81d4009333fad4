// src/services/classifier.rs

//! Buyable-or-researchable eligibility.

use crate::models::CatalogRecord;

/// Decide whether a ship is obtainable through normal progression or purchase.
///
/// Rules are checked in order and the first match wins:
/// 1. empty record: no
/// 2. premium: no, whatever else it carries
/// 3. collectible or special: no
/// 4. researchable: yes
/// 5. any strictly positive price: yes
/// 6. otherwise: no
///
/// Tier bounds are not checked here.
pub fn is_eligible(record: &CatalogRecord) -> bool {
    if record.is_empty() {
        return false;
    }
    if record.is_premium() {
        return false;
    }
    if record.is_collectible_or_special() {
        return false;
    }
    if record.is_researchable() {
        return true;
    }
    record.has_positive_price()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn eligible(value: Value) -> bool {
        is_eligible(&CatalogRecord::from(value))
    }

    #[test]
    fn test_empty_record_is_ineligible() {
        assert!(!eligible(json!({})));
        assert!(!eligible(Value::Null));
    }

    #[test]
    fn test_premium_short_circuits() {
        assert!(!eligible(json!({
            "ship_id": "200", "tier": 5, "is_premium": true,
            "price": {"credit": 1000000}
        })));
        assert!(!eligible(json!({"is_premium": true, "is_researchable": true})));
    }

    #[test]
    fn test_collectible_and_special_excluded() {
        assert!(!eligible(json!({"is_collectible": true, "is_researchable": true})));
        assert!(!eligible(json!({"is_special": true, "price_credit": 500})));
    }

    #[test]
    fn test_researchable_is_enough() {
        assert!(eligible(json!({"ship_id": "100", "tier": 5, "is_researchable": true, "name": "Fletcher"})));
        assert!(eligible(json!({"is_researchable": true, "is_premium": false, "is_special": false})));
    }

    #[test]
    fn test_positive_price_is_enough() {
        assert!(eligible(json!({"price": {"credit": 3200000}})));
        assert!(eligible(json!({"price_gold": 1})));
    }

    #[test]
    fn test_nothing_sufficient() {
        assert!(!eligible(json!({"name": "Tachibana", "tier": 1})));
        assert!(!eligible(json!({"price": {"credit": 0, "gold": 0}, "is_researchable": false})));
    }

    #[test]
    fn test_premium_dominates_every_combination() {
        for researchable in [true, false] {
            for price in [0, 1, 100_000] {
                let record = json!({
                    "is_premium": true,
                    "is_researchable": researchable,
                    "price": {"credit": price},
                    "price_gold": price
                });
                assert!(!eligible(record));
            }
        }
    }
}
