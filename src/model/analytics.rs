//! Scan analytics returned by `GET /public/qr/:id/analytics`
//!
//! The client never aggregates scans itself; these are the service's numbers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Analytics response payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QrAnalytics {
    pub qr_code: QrSummary,
    pub analytics: ScanAnalytics,
}

/// The QR code the analytics belong to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QrSummary {
    pub id: String,
    pub name: String,
    pub short_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_url: Option<String>,
}

/// Aggregate scan counts and breakdowns
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanAnalytics {
    pub total_scans: u64,
    pub unique_scans: u64,
    pub recent_scans: u64,
    /// Keyed by `YYYY-MM-DD`
    #[serde(default)]
    pub scans_by_date: BTreeMap<String, u64>,
    /// Keyed by country name
    #[serde(default)]
    pub scans_by_location: BTreeMap<String, u64>,
    /// Keyed by device class: mobile, desktop, tablet
    #[serde(default)]
    pub scans_by_device: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_documented_response() {
        let json = r#"{
            "qrCode": {
                "id": "cm5abc123xyz",
                "name": "Product Launch Campaign",
                "shortUrl": "https://your-domain.com/q/launch24",
                "destinationUrl": "https://example.com/product/launch"
            },
            "analytics": {
                "totalScans": 156,
                "uniqueScans": 89,
                "recentScans": 23,
                "scansByDate": { "2026-01-15": 45, "2026-01-16": 67, "2026-01-17": 44 },
                "scansByLocation": { "United States": 89, "Canada": 34 },
                "scansByDevice": { "mobile": 112, "desktop": 34, "tablet": 10 }
            }
        }"#;

        let parsed: QrAnalytics = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.analytics.total_scans, 156);
        assert_eq!(parsed.analytics.unique_scans, 89);
        assert_eq!(parsed.analytics.scans_by_date.len(), 3);
        assert_eq!(parsed.analytics.scans_by_device["tablet"], 10);
    }
}
