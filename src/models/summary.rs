//! Per-tier ship summaries and run statistics.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tiers that make it into the output.
pub const TIERS: RangeInclusive<u8> = 1..=10;

/// Minimal projection of a catalog record written to the tier files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShipSummary {
    pub ship_id: String,
    pub name: Option<String>,
    pub tier: u8,
    #[serde(rename = "type")]
    pub ship_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Local file name inside the images directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ShipSummary {
    pub fn new(ship_id: impl Into<String>, tier: u8) -> Self {
        Self {
            ship_id: ship_id.into(),
            name: None,
            tier,
            ship_type: None,
            image_url: None,
            image: None,
        }
    }
}

/// Ten ordered buckets, one per tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierBuckets {
    buckets: [Vec<ShipSummary>; 10],
}

impl TierBuckets {
    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
        }
    }

    /// Whether a coerced tier value is in the accepted range.
    pub fn accepts(tier: i64) -> Option<u8> {
        u8::try_from(tier).ok().filter(|t| TIERS.contains(t))
    }

    /// Append a summary to the bucket of its tier.
    ///
    /// Out-of-range tiers are ignored.
    pub fn push(&mut self, summary: ShipSummary) {
        if let Some(bucket) = self.bucket_mut(summary.tier) {
            bucket.push(summary);
        }
    }

    pub fn tier(&self, tier: u8) -> &[ShipSummary] {
        Self::index(tier)
            .map(|i| self.buckets[i].as_slice())
            .unwrap_or(&[])
    }

    /// Buckets in tier order, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[ShipSummary])> {
        TIERS.map(move |t| (t, self.tier(t)))
    }

    pub fn total(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    fn bucket_mut(&mut self, tier: u8) -> Option<&mut Vec<ShipSummary>> {
        Self::index(tier).map(|i| &mut self.buckets[i])
    }

    fn index(tier: u8) -> Option<usize> {
        TIERS.contains(&tier).then(|| usize::from(tier - 1))
    }
}

impl Default for TierBuckets {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters of a single partition run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartitionStats {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub records_seen: usize,
    pub skipped_tier: usize,
    pub skipped_ineligible: usize,
    pub included: usize,
    pub images_downloaded: usize,
    pub images_present: usize,
    pub images_failed: usize,
    pub images_unresolved: usize,
}

impl PartitionStats {
    pub fn started() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            records_seen: 0,
            skipped_tier: 0,
            skipped_ineligible: 0,
            included: 0,
            images_downloaded: 0,
            images_present: 0,
            images_failed: 0,
            images_unresolved: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_one_to_ten() {
        assert_eq!(TierBuckets::accepts(1), Some(1));
        assert_eq!(TierBuckets::accepts(10), Some(10));
        assert_eq!(TierBuckets::accepts(0), None);
        assert_eq!(TierBuckets::accepts(11), None);
        assert_eq!(TierBuckets::accepts(-3), None);
        assert_eq!(TierBuckets::accepts(266), None);
    }

    #[test]
    fn iter_yields_all_ten_buckets() {
        let mut buckets = TierBuckets::new();
        buckets.push(ShipSummary::new("1", 3));
        buckets.push(ShipSummary::new("2", 3));

        let sizes: Vec<_> = buckets.iter().map(|(t, b)| (t, b.len())).collect();
        assert_eq!(sizes.len(), 10);
        assert_eq!(sizes[2], (3, 2));
        assert_eq!(buckets.total(), 2);
        assert!(buckets.tier(11).is_empty());
    }

    #[test]
    fn summary_serializes_null_type_and_omits_images() {
        let mut summary = ShipSummary::new("100", 5);
        summary.name = Some("Fletcher".into());

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"ship_id": "100", "name": "Fletcher", "tier": 5, "type": null})
        );
    }
}
