//! In-memory store behind the stub server
//!
//! Every API key belongs to an account; QR codes are owned by the account
//! of the key that created them. Short codes are unique across accounts
//! because they form the public scan URL.

use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::StubConfig;
use crate::model::{
    ApiKey, CustomDesign, QrAnalytics, QrCode, QrCodeType, QrSummary, ScanAnalytics,
    UpdateQrRequest,
};
use crate::stub::error::StubError;

/// Scans newer than this count towards `recentScans`
const RECENT_SCAN_DAYS: i64 = 7;

/// Identity attached to an authenticated request
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account: String,
    pub key_id: String,
}

/// Outcome of counting a request against its key's window
#[derive(Debug, Clone, Copy)]
pub struct RateStatus {
    pub limit: u32,
    pub remaining: u32,
    /// Unix seconds when the window resets
    pub reset: i64,
    pub allowed: bool,
}

/// A validated create request
#[derive(Debug, Clone)]
pub struct NewQr {
    pub name: String,
    pub qr_type: QrCodeType,
    pub destination_url: Option<String>,
    pub short_code: Option<String>,
    pub qr_data: Option<serde_json::Value>,
    pub password: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scan_limit: Option<u32>,
    pub custom_design: Option<CustomDesign>,
}

/// One resolved scan
#[derive(Debug, Clone)]
pub struct ScanEvent {
    pub at: DateTime<Utc>,
    pub client: String,
    pub location: String,
    pub device: String,
}

#[derive(Debug)]
struct QrRecord {
    qr: QrCode,
    password: Option<String>,
    account: String,
    scans: Vec<ScanEvent>,
}

impl QrRecord {
    /// Deactivate once expired or out of scans
    fn settle(&mut self, now: DateTime<Utc>) {
        let expired = self.qr.expires_at.map(|at| at <= now).unwrap_or(false);
        let exhausted = self
            .qr
            .scan_limit
            .map(|limit| self.qr.scan_count >= limit as u64)
            .unwrap_or(false);
        if expired || exhausted {
            self.qr.is_active = false;
        }
    }
}

#[derive(Debug)]
struct KeyRecord {
    key: ApiKey,
    account: String,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    minute: i64,
    count: u32,
}

/// In-memory state of the stub server
#[derive(Debug)]
pub struct Store {
    public_url: String,
    plan_limit: usize,
    /// Insertion order, oldest first
    codes: Vec<QrRecord>,
    keys: Vec<KeyRecord>,
    windows: HashMap<String, Window>,
}

impl Store {
    /// Seed one account per configured key
    pub fn new(config: &StubConfig, public_url: String) -> Self {
        let now = Utc::now();
        let keys = config
            .api_keys
            .iter()
            .enumerate()
            .map(|(i, key)| KeyRecord {
                key: ApiKey {
                    id: uuid::Uuid::new_v4().to_string(),
                    name: format!("Startup key {}", i + 1),
                    key: key.clone(),
                    is_active: true,
                    last_used_at: None,
                    created_at: now,
                    expires_at: None,
                },
                account: uuid::Uuid::new_v4().to_string(),
            })
            .collect();

        Self {
            public_url,
            plan_limit: config.plan_limit,
            codes: Vec::new(),
            keys,
            windows: HashMap::new(),
        }
    }

    pub fn set_public_url(&mut self, public_url: String) {
        self.public_url = public_url;
    }

    // ==================== Authentication ====================

    /// Resolve a presented key to its account, recording the use
    pub fn authenticate(&mut self, key: &str, now: DateTime<Utc>) -> Result<AuthContext, StubError> {
        let record = self
            .keys
            .iter_mut()
            .find(|r| r.key.key == key && r.key.is_active)
            .ok_or_else(|| StubError::Unauthorized("Invalid API key".to_string()))?;

        if record.key.is_expired(now) {
            return Err(StubError::Unauthorized("API key has expired".to_string()));
        }

        record.key.last_used_at = Some(now);
        Ok(AuthContext {
            account: record.account.clone(),
            key_id: record.key.id.clone(),
        })
    }

    /// Count a request in the key's fixed one-minute window
    pub fn hit_rate_limit(&mut self, key_id: &str, limit: u32, now: DateTime<Utc>) -> RateStatus {
        let minute = now.timestamp().div_euclid(60);
        let window = self
            .windows
            .entry(key_id.to_string())
            .or_insert(Window { minute, count: 0 });

        if window.minute != minute {
            *window = Window { minute, count: 0 };
        }
        window.count = window.count.saturating_add(1);

        RateStatus {
            limit,
            remaining: limit.saturating_sub(window.count),
            reset: (minute + 1) * 60,
            allowed: window.count <= limit,
        }
    }

    // ==================== QR codes ====================

    pub fn create_qr(
        &mut self,
        account: &str,
        new: NewQr,
        now: DateTime<Utc>,
    ) -> Result<QrCode, StubError> {
        let owned = self.codes.iter().filter(|r| r.account == account).count();
        if owned >= self.plan_limit {
            return Err(StubError::Forbidden(format!(
                "QR code limit reached ({}). Please upgrade your plan.",
                self.plan_limit
            )));
        }

        let short_code = match new.short_code {
            Some(code) => {
                if self.short_code_taken(&code) {
                    return Err(StubError::Conflict(format!(
                        "Short code '{}' is already in use",
                        code
                    )));
                }
                code
            }
            None => self.generate_short_code(),
        };

        let qr = QrCode {
            id: uuid::Uuid::new_v4().to_string(),
            name: new.name,
            short_url: format!("{}/q/{}", self.public_url, short_code),
            qr_code_url: format!("{}/qr/{}.png", self.public_url, short_code),
            short_code,
            destination_url: new.destination_url,
            qr_type: new.qr_type,
            qr_data: new.qr_data,
            expires_at: new.expires_at,
            scan_limit: new.scan_limit,
            custom_design: new.custom_design,
            scan_count: 0,
            is_active: true,
            created_at: now,
            updated_at: None,
        };

        self.codes.push(QrRecord {
            qr: qr.clone(),
            password: new.password,
            account: account.to_string(),
            scans: Vec::new(),
        });

        Ok(qr)
    }

    fn short_code_taken(&self, code: &str) -> bool {
        self.codes.iter().any(|r| r.qr.short_code == code)
    }

    fn generate_short_code(&self) -> String {
        loop {
            let candidate: String = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();
            if !self.short_code_taken(&candidate) {
                return candidate;
            }
        }
    }

    /// Newest first, filtered by `search` over name, short code and URL
    pub fn list_qr(
        &mut self,
        account: &str,
        page: u32,
        limit: u32,
        search: Option<&str>,
        now: DateTime<Utc>,
    ) -> (Vec<QrCode>, u64) {
        let needle = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut matching: Vec<QrCode> = Vec::new();
        for record in self.codes.iter_mut().rev() {
            if record.account != account {
                continue;
            }
            record.settle(now);
            let hit = match &needle {
                Some(n) => {
                    record.qr.name.to_lowercase().contains(n)
                        || record.qr.short_code.to_lowercase().contains(n)
                        || record
                            .qr
                            .destination_url
                            .as_deref()
                            .map(|u| u.to_lowercase().contains(n))
                            .unwrap_or(false)
                }
                None => true,
            };
            if hit {
                matching.push(record.qr.clone());
            }
        }

        let total = matching.len() as u64;
        let skip = (page.saturating_sub(1) as usize).saturating_mul(limit as usize);
        let items = matching.into_iter().skip(skip).take(limit as usize).collect();
        (items, total)
    }

    fn record_mut(&mut self, account: &str, id: &str) -> Result<&mut QrRecord, StubError> {
        self.codes
            .iter_mut()
            .find(|r| r.account == account && r.qr.id == id)
            .ok_or_else(|| StubError::NotFound("QR code not found".to_string()))
    }

    pub fn get_qr(&mut self, account: &str, id: &str, now: DateTime<Utc>) -> Result<QrCode, StubError> {
        let record = self.record_mut(account, id)?;
        record.settle(now);
        Ok(record.qr.clone())
    }

    pub fn update_qr(
        &mut self,
        account: &str,
        id: &str,
        update: UpdateQrRequest,
        now: DateTime<Utc>,
    ) -> Result<QrCode, StubError> {
        let record = self.record_mut(account, id)?;

        if let Some(name) = update.name {
            record.qr.name = name;
        }
        if let Some(url) = update.destination_url {
            record.qr.destination_url = Some(url);
        }
        if let Some(active) = update.is_active {
            record.qr.is_active = active;
        }
        record.qr.updated_at = Some(now);
        record.settle(now);

        Ok(record.qr.clone())
    }

    pub fn delete_qr(&mut self, account: &str, id: &str) -> Result<(), StubError> {
        let index = self
            .codes
            .iter()
            .position(|r| r.account == account && r.qr.id == id)
            .ok_or_else(|| StubError::NotFound("QR code not found".to_string()))?;
        self.codes.remove(index);
        Ok(())
    }

    pub fn analytics(
        &mut self,
        account: &str,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<QrAnalytics, StubError> {
        let record = self.record_mut(account, id)?;
        record.settle(now);

        let recent_cutoff = now - Duration::days(RECENT_SCAN_DAYS);
        let mut by_date = BTreeMap::new();
        let mut by_location = BTreeMap::new();
        let mut by_device = BTreeMap::new();
        let mut clients = HashSet::new();
        let mut recent = 0;

        for scan in &record.scans {
            *by_date.entry(scan.at.format("%Y-%m-%d").to_string()).or_insert(0) += 1;
            *by_location.entry(scan.location.clone()).or_insert(0) += 1;
            *by_device.entry(scan.device.clone()).or_insert(0) += 1;
            clients.insert(scan.client.as_str());
            if scan.at >= recent_cutoff {
                recent += 1;
            }
        }

        Ok(QrAnalytics {
            qr_code: QrSummary {
                id: record.qr.id.clone(),
                name: record.qr.name.clone(),
                short_url: record.qr.short_url.clone(),
                destination_url: record.qr.destination_url.clone(),
            },
            analytics: ScanAnalytics {
                total_scans: record.qr.scan_count,
                unique_scans: clients.len() as u64,
                recent_scans: recent,
                scans_by_date: by_date,
                scans_by_location: by_location,
                scans_by_device: by_device,
            },
        })
    }

    // ==================== Scans ====================

    /// Resolve a public scan, counting it when it succeeds
    pub fn resolve_scan(
        &mut self,
        short_code: &str,
        password: Option<&str>,
        scan: ScanEvent,
    ) -> Result<QrCode, StubError> {
        let record = self
            .codes
            .iter_mut()
            .find(|r| r.qr.short_code == short_code)
            .ok_or_else(|| StubError::NotFound("QR code not found".to_string()))?;

        record.settle(scan.at);
        if !record.qr.is_active {
            let reason = if record.qr.expires_at.map(|at| at <= scan.at).unwrap_or(false) {
                "QR code has expired"
            } else if record
                .qr
                .scan_limit
                .map(|l| record.qr.scan_count >= l as u64)
                .unwrap_or(false)
            {
                "QR code scan limit reached"
            } else {
                "QR code is inactive"
            };
            return Err(StubError::Forbidden(reason.to_string()));
        }

        if let Some(expected) = &record.password {
            match password {
                None => {
                    return Err(StubError::Unauthorized(
                        "Password required for this QR code".to_string(),
                    ))
                }
                Some(given) if given != expected => {
                    return Err(StubError::Unauthorized("Invalid password".to_string()))
                }
                Some(_) => {}
            }
        }

        let at = scan.at;
        record.scans.push(scan);
        record.qr.scan_count += 1;
        record.settle(at);

        Ok(record.qr.clone())
    }

    // ==================== API keys ====================

    pub fn create_key(
        &mut self,
        account: &str,
        name: String,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> ApiKey {
        let key = ApiKey {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            key: format!("qr_live_{}", uuid::Uuid::new_v4().simple()),
            is_active: true,
            last_used_at: None,
            created_at: now,
            expires_at,
        };
        self.keys.push(KeyRecord {
            key: key.clone(),
            account: account.to_string(),
        });
        key
    }

    /// Newest first
    pub fn list_keys(&self, account: &str) -> Vec<ApiKey> {
        self.keys
            .iter()
            .rev()
            .filter(|r| r.account == account)
            .map(|r| r.key.clone())
            .collect()
    }

    fn key_mut(&mut self, account: &str, id: &str) -> Result<&mut KeyRecord, StubError> {
        self.keys
            .iter_mut()
            .find(|r| r.account == account && r.key.id == id)
            .ok_or_else(|| StubError::NotFound("API key not found".to_string()))
    }

    pub fn get_key(&mut self, account: &str, id: &str) -> Result<ApiKey, StubError> {
        Ok(self.key_mut(account, id)?.key.clone())
    }

    pub fn update_key(
        &mut self,
        account: &str,
        id: &str,
        name: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ApiKey, StubError> {
        let record = self.key_mut(account, id)?;
        if let Some(name) = name {
            record.key.name = name;
        }
        if let Some(at) = expires_at {
            record.key.expires_at = Some(at);
        }
        Ok(record.key.clone())
    }

    /// Deactivate a key; it stays listed
    pub fn revoke_key(&mut self, account: &str, id: &str) -> Result<(), StubError> {
        self.key_mut(account, id)?.key.is_active = false;
        self.windows.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_limit(plan_limit: usize) -> (Store, String) {
        let config = StubConfig {
            api_keys: vec!["qr_test_store".to_string()],
            plan_limit,
            ..Default::default()
        };
        let mut store = Store::new(&config, "https://your-domain.com".to_string());
        let auth = store.authenticate("qr_test_store", Utc::now()).unwrap();
        (store, auth.account)
    }

    fn link(name: &str) -> NewQr {
        NewQr {
            name: name.to_string(),
            qr_type: QrCodeType::Url,
            destination_url: Some("https://example.com".to_string()),
            short_code: None,
            qr_data: None,
            password: None,
            expires_at: None,
            scan_limit: None,
            custom_design: None,
        }
    }

    fn scan(client: &str, at: DateTime<Utc>) -> ScanEvent {
        ScanEvent {
            at,
            client: client.to_string(),
            location: "US".to_string(),
            device: "mobile".to_string(),
        }
    }

    #[test]
    fn test_plan_limit() {
        let (mut store, account) = store_with_limit(2);
        let now = Utc::now();
        store.create_qr(&account, link("a"), now).unwrap();
        store.create_qr(&account, link("b"), now).unwrap();

        let err = store.create_qr(&account, link("c"), now).unwrap_err();
        assert_eq!(
            err.to_string(),
            "QR code limit reached (2). Please upgrade your plan."
        );
    }

    #[test]
    fn test_short_urls_use_public_domain() {
        let (mut store, account) = store_with_limit(10);
        let mut new = link("a");
        new.short_code = Some("promo".to_string());
        let qr = store.create_qr(&account, new, Utc::now()).unwrap();

        assert_eq!(qr.short_url, "https://your-domain.com/q/promo");
        assert_eq!(qr.qr_code_url, "https://your-domain.com/qr/promo.png");
    }

    #[test]
    fn test_generated_short_codes_are_distinct() {
        let (mut store, account) = store_with_limit(10);
        let now = Utc::now();
        let a = store.create_qr(&account, link("a"), now).unwrap();
        let b = store.create_qr(&account, link("b"), now).unwrap();
        assert_eq!(a.short_code.len(), 8);
        assert_ne!(a.short_code, b.short_code);
    }

    #[test]
    fn test_scan_limit_deactivates() {
        let (mut store, account) = store_with_limit(10);
        let now = Utc::now();
        let mut new = link("limited");
        new.scan_limit = Some(2);
        let qr = store.create_qr(&account, new, now).unwrap();

        store.resolve_scan(&qr.short_code, None, scan("1.1.1.1", now)).unwrap();
        let second = store.resolve_scan(&qr.short_code, None, scan("1.1.1.1", now)).unwrap();
        assert_eq!(second.scan_count, 2);
        assert!(!second.is_active);

        let err = store
            .resolve_scan(&qr.short_code, None, scan("1.1.1.1", now))
            .unwrap_err();
        assert_eq!(err.to_string(), "QR code scan limit reached");
    }

    #[test]
    fn test_expiry_deactivates_on_read() {
        let (mut store, account) = store_with_limit(10);
        let now = Utc::now();
        let mut new = link("soon");
        new.expires_at = Some(now + Duration::minutes(5));
        let qr = store.create_qr(&account, new, now).unwrap();

        let later = now + Duration::minutes(10);
        assert!(!store.get_qr(&account, &qr.id, later).unwrap().is_active);
    }

    #[test]
    fn test_password_gate() {
        let (mut store, account) = store_with_limit(10);
        let now = Utc::now();
        let mut new = link("secret");
        new.password = Some("open-sesame".to_string());
        let qr = store.create_qr(&account, new, now).unwrap();

        assert!(store.resolve_scan(&qr.short_code, None, scan("a", now)).is_err());
        assert!(store
            .resolve_scan(&qr.short_code, Some("wrong"), scan("a", now))
            .is_err());
        let ok = store
            .resolve_scan(&qr.short_code, Some("open-sesame"), scan("a", now))
            .unwrap();
        assert_eq!(ok.scan_count, 1);
    }

    #[test]
    fn test_analytics_aggregation() {
        let (mut store, account) = store_with_limit(10);
        let now = Utc::now();
        let qr = store.create_qr(&account, link("tracked"), now).unwrap();

        let old = now - Duration::days(30);
        store.resolve_scan(&qr.short_code, None, scan("1.1.1.1", old)).unwrap();
        store.resolve_scan(&qr.short_code, None, scan("1.1.1.1", now)).unwrap();
        store.resolve_scan(&qr.short_code, None, scan("2.2.2.2", now)).unwrap();

        let a = store.analytics(&account, &qr.id, now).unwrap().analytics;
        assert_eq!(a.total_scans, 3);
        assert_eq!(a.unique_scans, 2);
        assert_eq!(a.recent_scans, 2);
        assert_eq!(a.scans_by_location.get("US"), Some(&3));
        assert_eq!(a.scans_by_date.len(), 2);
    }

    #[test]
    fn test_accounts_are_isolated() {
        let config = StubConfig {
            api_keys: vec!["key_a".to_string(), "key_b".to_string()],
            ..Default::default()
        };
        let mut store = Store::new(&config, "http://localhost".to_string());
        let now = Utc::now();
        let a = store.authenticate("key_a", now).unwrap().account;
        let b = store.authenticate("key_b", now).unwrap().account;

        let qr = store.create_qr(&a, link("mine"), now).unwrap();
        assert!(store.get_qr(&b, &qr.id, now).is_err());
        assert_eq!(store.list_qr(&b, 1, 10, None, now).1, 0);
    }

    #[test]
    fn test_rate_window_resets() {
        let (mut store, _) = store_with_limit(10);
        let now = Utc::now();

        assert!(store.hit_rate_limit("k", 2, now).allowed);
        let second = store.hit_rate_limit("k", 2, now);
        assert!(second.allowed);
        assert_eq!(second.remaining, 0);
        assert!(!store.hit_rate_limit("k", 2, now).allowed);

        let next_minute = now + Duration::seconds(61);
        assert!(store.hit_rate_limit("k", 2, next_minute).allowed);
    }

    #[test]
    fn test_expired_and_revoked_keys() {
        let (mut store, account) = store_with_limit(10);
        let now = Utc::now();
        let key = store.create_key(&account, "temp".to_string(), Some(now - Duration::hours(1)), now);

        let err = store.authenticate(&key.key, now).unwrap_err();
        assert_eq!(err.to_string(), "API key has expired");

        let live = store.create_key(&account, "live".to_string(), None, now);
        store.revoke_key(&account, &live.id).unwrap();
        let err = store.authenticate(&live.key, now).unwrap_err();
        assert_eq!(err.to_string(), "Invalid API key");
    }
}
