//! Output rendering for the CLI
//!
//! Text views are `Display` types with `String` shorthands; binaries only print.

use serde::Serialize;
use std::fmt;

use crate::dashboard::analytics::shares;
use crate::model::{ApiKey, PageMeta, QrAnalytics, QrCode};

/// Output format selected with `--format`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

/// Pretty JSON of any response payload
pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// What a code points at: its URL, or a short summary of `qrData`
fn target(qr: &QrCode) -> String {
    if let Some(url) = &qr.destination_url {
        return url.clone();
    }
    match &qr.qr_data {
        Some(serde_json::Value::Object(map)) => map
            .iter()
            .take(2)
            .map(|(k, v)| match v {
                serde_json::Value::String(s) => format!("{}={}", k, s),
                other => format!("{}={}", k, other),
            })
            .collect::<Vec<_>>()
            .join(" "),
        _ => "-".to_string(),
    }
}

fn status(qr: &QrCode) -> &'static str {
    if qr.is_active {
        "active"
    } else {
        "inactive"
    }
}

/// Column view of a page of QR codes, with the page footer when `meta` is set
pub struct QrTable<'a> {
    pub items: &'a [QrCode],
    pub meta: Option<&'a PageMeta>,
}

impl fmt::Display for QrTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return write!(f, "No QR codes yet");
        }

        writeln!(
            f,
            "{:<36}  {:<20}  {:<13}  {:<12}  {:>6}  {:<8}  {}",
            "ID", "Name", "Type", "Short code", "Scans", "Status", "Target"
        )?;
        write!(f, "{}", "-".repeat(130))?;

        for qr in self.items {
            let scans = match qr.scan_limit {
                Some(limit) => format!("{}/{}", qr.scan_count, limit),
                None => qr.scan_count.to_string(),
            };
            write!(
                f,
                "\n{:<36}  {:<20}  {:<13}  {:<12}  {:>6}  {:<8}  {}",
                truncate(&qr.id, 36),
                truncate(&qr.name, 20),
                qr.qr_type.as_str(),
                truncate(&qr.short_code, 12),
                scans,
                status(qr),
                truncate(&target(qr), 40),
            )?;
        }

        if let Some(meta) = self.meta {
            write!(
                f,
                "\n\nPage {} of {} ({} total)",
                meta.page,
                meta.total_pages(),
                meta.total
            )?;
        }
        Ok(())
    }
}

pub fn qr_table(items: &[QrCode], meta: Option<&PageMeta>) -> String {
    QrTable { items, meta }.to_string()
}

pub fn qr_csv(items: &[QrCode]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "id",
        "name",
        "type",
        "shortCode",
        "shortUrl",
        "destinationUrl",
        "scanCount",
        "scanLimit",
        "isActive",
        "expiresAt",
        "createdAt",
    ])?;

    for qr in items {
        writer.write_record([
            qr.id.clone(),
            qr.name.clone(),
            qr.qr_type.as_str().to_string(),
            qr.short_code.clone(),
            qr.short_url.clone(),
            qr.destination_url.clone().unwrap_or_default(),
            qr.scan_count.to_string(),
            qr.scan_limit.map(|l| l.to_string()).unwrap_or_default(),
            qr.is_active.to_string(),
            qr.expires_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            qr.created_at.to_rfc3339(),
        ])?;
    }

    finish_csv(writer)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String, csv::Error> {
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Field-per-line view of one QR code
pub struct QrDetail<'a>(pub &'a QrCode);

impl fmt::Display for QrDetail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qr = self.0;
        writeln!(f, "{} ({})", qr.name, qr.qr_type)?;
        writeln!(f, "  ID:          {}", qr.id)?;
        writeln!(f, "  Short URL:   {}", qr.short_url)?;
        writeln!(f, "  Image:       {}", qr.qr_code_url)?;
        if let Some(url) = &qr.destination_url {
            writeln!(f, "  Destination: {}", url)?;
        }
        if let Some(data) = &qr.qr_data {
            writeln!(f, "  Data:        {}", data)?;
        }
        writeln!(f, "  Status:      {}", status(qr))?;
        match qr.remaining_scans() {
            Some(left) => writeln!(f, "  Scans:       {} ({} left)", qr.scan_count, left)?,
            None => writeln!(f, "  Scans:       {}", qr.scan_count)?,
        }
        if let Some(at) = qr.expires_at {
            writeln!(f, "  Expires:     {}", at.format("%Y-%m-%d %H:%M UTC"))?;
        }
        if let Some(design) = &qr.custom_design {
            if let Ok(design) = serde_json::to_string(design) {
                writeln!(f, "  Design:      {}", design)?;
            }
        }
        write!(f, "  Created:     {}", qr.created_at.format("%Y-%m-%d %H:%M UTC"))?;
        if let Some(at) = qr.updated_at {
            write!(f, "\n  Updated:     {}", at.format("%Y-%m-%d %H:%M UTC"))?;
        }
        Ok(())
    }
}

pub fn qr_detail(qr: &QrCode) -> String {
    QrDetail(qr).to_string()
}

/// Totals followed by the device, location and date breakdowns that have data
pub struct AnalyticsReport<'a>(pub &'a QrAnalytics);

impl fmt::Display for AnalyticsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = &self.0.analytics;

        writeln!(f, "{}  {}", self.0.qr_code.name, self.0.qr_code.short_url)?;
        writeln!(f)?;
        writeln!(f, "Total scans:   {}", a.total_scans)?;
        writeln!(f, "Unique scans:  {}", a.unique_scans)?;
        write!(f, "Last 7 days:   {}", a.recent_scans)?;

        for (title, breakdown) in [
            ("By device", &a.scans_by_device),
            ("By location", &a.scans_by_location),
        ] {
            if breakdown.is_empty() {
                continue;
            }
            write!(f, "\n\n{}:", title)?;
            for share in shares(breakdown) {
                write!(
                    f,
                    "\n  {:<16} {:>6}  {:>5.1}%",
                    share.label, share.count, share.percent
                )?;
            }
        }

        if !a.scans_by_date.is_empty() {
            write!(f, "\n\nBy date:")?;
            for (date, count) in &a.scans_by_date {
                write!(f, "\n  {}  {:>6}", date, count)?;
            }
        }
        Ok(())
    }
}

pub fn analytics_text(analytics: &QrAnalytics) -> String {
    AnalyticsReport(analytics).to_string()
}

pub fn analytics_csv(analytics: &QrAnalytics) -> Result<String, csv::Error> {
    let a = &analytics.analytics;
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["dimension", "key", "scans"])?;

    writer.write_record(["total", "all", &a.total_scans.to_string()])?;
    writer.write_record(["total", "unique", &a.unique_scans.to_string()])?;
    writer.write_record(["total", "recent", &a.recent_scans.to_string()])?;
    for (dimension, breakdown) in [
        ("date", &a.scans_by_date),
        ("location", &a.scans_by_location),
        ("device", &a.scans_by_device),
    ] {
        for (key, count) in breakdown {
            writer.write_record([dimension, key.as_str(), &count.to_string()])?;
        }
    }

    finish_csv(writer)
}

/// Keys are shown masked; the full key is only printed right after creation
pub struct ApiKeyTable<'a>(pub &'a [ApiKey]);

impl fmt::Display for ApiKeyTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "No API keys");
        }

        writeln!(
            f,
            "{:<36}  {:<20}  {:<20}  {:<8}  {:<16}  {}",
            "ID", "Name", "Key", "Status", "Last used", "Expires"
        )?;
        write!(f, "{}", "-".repeat(120))?;

        let now = chrono::Utc::now();
        for key in self.0 {
            let status = if !key.is_active {
                "revoked"
            } else if key.is_expired(now) {
                "expired"
            } else {
                "active"
            };
            write!(
                f,
                "\n{:<36}  {:<20}  {:<20}  {:<8}  {:<16}  {}",
                truncate(&key.id, 36),
                truncate(&key.name, 20),
                key.masked(),
                status,
                key.last_used_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "never".to_string()),
                key.expires_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "never".to_string()),
            )?;
        }
        Ok(())
    }
}

pub fn api_keys_table(keys: &[ApiKey]) -> String {
    ApiKeyTable(keys).to_string()
}

pub fn api_keys_csv(keys: &[ApiKey]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "name", "key", "isActive", "lastUsedAt", "createdAt", "expiresAt"])?;
    for key in keys {
        writer.write_record([
            key.id.clone(),
            key.name.clone(),
            key.masked(),
            key.is_active.to_string(),
            key.last_used_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            key.created_at.to_rfc3339(),
            key.expires_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
        ])?;
    }
    finish_csv(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::fake::sample;
    use crate::model::{QrSummary, ScanAnalytics};

    #[test]
    fn test_table_with_meta() {
        let items = vec![sample("a"), sample("b")];
        let meta = PageMeta { page: 1, limit: 10, total: 2 };
        let text = qr_table(&items, Some(&meta));

        assert!(text.starts_with("ID"));
        assert!(text.contains("https://example.com"));
        assert!(text.ends_with("Page 1 of 1 (2 total)"));
        assert_eq!(qr_table(&[], None), "No QR codes yet");
    }

    #[test]
    fn test_views_write_through_formatter() {
        let qr = sample("a");
        let detail = format!("{}", QrDetail(&qr));
        assert_eq!(detail, qr_detail(&qr));
        assert!(detail.starts_with(&format!("{} (", qr.name)));
        assert!(!detail.ends_with('\n'));

        let padded = format!("[{}]", ApiKeyTable(&[]));
        assert_eq!(padded, "[No API keys]");
    }

    #[test]
    fn test_csv_quotes_commas() {
        let mut qr = sample("a");
        qr.name = "Menu, lunch".to_string();
        let csv = qr_csv(&[qr]).unwrap();

        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("id,name,type"));
        assert!(lines.next().unwrap().contains("\"Menu, lunch\""));
    }

    #[test]
    fn test_analytics_text() {
        let mut analytics = ScanAnalytics {
            total_scans: 4,
            unique_scans: 3,
            recent_scans: 4,
            ..Default::default()
        };
        analytics.scans_by_device.insert("mobile".to_string(), 3);
        analytics.scans_by_device.insert("desktop".to_string(), 1);

        let text = analytics_text(&QrAnalytics {
            qr_code: QrSummary {
                id: "a".to_string(),
                name: "Flyer".to_string(),
                short_url: "https://your-domain.com/q/a".to_string(),
                destination_url: None,
            },
            analytics,
        });

        assert!(text.contains("Total scans:   4"));
        assert!(text.contains("mobile"));
        assert!(text.contains("75.0%"));
        assert!(!text.contains("By location"));
    }

    #[test]
    fn test_keys_are_masked() {
        let key = ApiKey {
            id: "k1".to_string(),
            name: "CI".to_string(),
            key: "qr_live_abcdef123456".to_string(),
            is_active: true,
            last_used_at: None,
            created_at: chrono::Utc::now(),
            expires_at: None,
        };
        let text = api_keys_table(&[key]);
        assert!(text.contains("qr_live_...3456"));
        assert!(!text.contains("abcdef"));
    }
}
