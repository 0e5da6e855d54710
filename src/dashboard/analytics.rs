//! Analytics panel
//!
//! Read-only view of one QR code's scan analytics.

use std::collections::BTreeMap;

use crate::client::QrApi;
use crate::dashboard::{require_api, DashboardError};
use crate::model::QrAnalytics;

const ANALYTICS_FALLBACK: &str = "Failed to fetch analytics";

/// One row of a breakdown: label, count and share of all scans in percent
#[derive(Debug, Clone, PartialEq)]
pub struct Share {
    pub label: String,
    pub count: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsPanel {
    data: Option<QrAnalytics>,
}

impl AnalyticsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load analytics of `id`; the previous data is kept on failure
    pub async fn load(&mut self, api: Option<&dyn QrApi>, id: &str) -> Result<&QrAnalytics, DashboardError> {
        let api = require_api(api)?;
        let analytics = api
            .qr_analytics(id)
            .await
            .map_err(|e| DashboardError::request(e, ANALYTICS_FALLBACK))?;

        Ok(self.data.insert(analytics))
    }

    pub fn data(&self) -> Option<&QrAnalytics> {
        self.data.as_ref()
    }
}

/// Rows sorted by count, largest first; ties keep label order
pub fn shares(breakdown: &BTreeMap<String, u64>) -> Vec<Share> {
    let total: u64 = breakdown.values().sum();
    let mut rows: Vec<Share> = breakdown
        .iter()
        .map(|(label, &count)| Share {
            label: label.clone(),
            count,
            percent: if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            },
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));
    rows
}
