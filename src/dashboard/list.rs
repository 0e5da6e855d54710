//! QR list view
//!
//! One page of QR codes as last returned by the service. Deletes, updates
//! and creations are applied to the local page without refetching.

use crate::client::QrApi;
use crate::dashboard::{require_api, DashboardError};
use crate::model::{ListParams, PageMeta, QrCode, UpdateQrRequest};

const FETCH_FALLBACK: &str = "Failed to fetch QR codes";
const DELETE_FALLBACK: &str = "Failed to delete QR code";
const UPDATE_FALLBACK: &str = "Failed to update QR code";

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone)]
pub struct QrListView {
    page: u32,
    limit: u32,
    search_term: Option<String>,
    items: Vec<QrCode>,
    total: u64,
}

impl Default for QrListView {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl QrListView {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            search_term: None,
            items: Vec::new(),
            total: 0,
        }
    }

    /// Filter subsequent fetches; blank clears the filter
    pub fn set_search(&mut self, term: Option<String>) {
        self.search_term = term
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self.page = 1;
    }

    pub fn items(&self) -> &[QrCode] {
        &self.items
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn meta(&self) -> PageMeta {
        PageMeta {
            page: self.page,
            limit: self.limit,
            total: self.total,
        }
    }

    /// Fetch page `page` (1-indexed)
    pub async fn fetch_page(
        &mut self,
        api: Option<&dyn QrApi>,
        page: u32,
    ) -> Result<(), DashboardError> {
        let api = require_api(api)?;
        let params = ListParams {
            page: page.max(1),
            limit: self.limit,
            search_term: self.search_term.clone(),
        };

        let result = api
            .list_qr(&params)
            .await
            .map_err(|e| DashboardError::request(e, FETCH_FALLBACK))?;

        self.page = params.page;
        self.items = result.items;
        self.total = result.meta.total;
        Ok(())
    }

    /// Refetch the current page
    pub async fn refresh(&mut self, api: Option<&dyn QrApi>) -> Result<(), DashboardError> {
        self.fetch_page(api, self.page).await
    }

    /// Move forward one page; `false` when already on the last page
    pub async fn next_page(&mut self, api: Option<&dyn QrApi>) -> Result<bool, DashboardError> {
        if !self.meta().has_next() {
            return Ok(false);
        }
        self.fetch_page(api, self.page + 1).await?;
        Ok(true)
    }

    /// Move back one page; `false` when already on the first page
    pub async fn prev_page(&mut self, api: Option<&dyn QrApi>) -> Result<bool, DashboardError> {
        if !self.meta().has_prev() {
            return Ok(false);
        }
        self.fetch_page(api, self.page - 1).await?;
        Ok(true)
    }

    /// Delete on the service, then drop the item locally
    pub async fn delete(&mut self, api: Option<&dyn QrApi>, id: &str) -> Result<(), DashboardError> {
        let api = require_api(api)?;
        api.delete_qr(id)
            .await
            .map_err(|e| DashboardError::request(e, DELETE_FALLBACK))?;

        let before = self.items.len();
        self.items.retain(|qr| qr.id != id);
        if self.items.len() < before {
            self.total = self.total.saturating_sub(1);
        }
        Ok(())
    }

    /// Update on the service, then replace the item locally
    pub async fn update(
        &mut self,
        api: Option<&dyn QrApi>,
        id: &str,
        update: &UpdateQrRequest,
    ) -> Result<QrCode, DashboardError> {
        let api = require_api(api)?;
        let updated = api
            .update_qr(id, update)
            .await
            .map_err(|e| DashboardError::request(e, UPDATE_FALLBACK))?;

        if let Some(slot) = self.items.iter_mut().find(|qr| qr.id == updated.id) {
            *slot = updated.clone();
        }
        Ok(updated)
    }

    /// Show a freshly created code at the top of the first page
    pub fn prepend(&mut self, qr: QrCode) {
        self.total += 1;
        if self.page == 1 {
            self.items.insert(0, qr);
            self.items.truncate(self.limit as usize);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{start_stub, TEST_KEY};
    use crate::client::{ClientConfig, QrApiClient};
    use crate::dashboard::fake::{sample, FakeApi};
    use crate::model::{CreateQrRequest, QrCodeType};

    #[tokio::test]
    async fn test_delete_without_refetch() {
        let api = FakeApi::with_codes(3);
        let mut view = QrListView::default();

        view.fetch_page(Some(&api), 1).await.unwrap();
        assert_eq!(api.list_calls(), 1);

        view.delete(Some(&api), "qr1").await.unwrap();
        assert_eq!(api.list_calls(), 1);
        assert!(view.items().iter().all(|q| q.id != "qr1"));
        assert_eq!(view.items().len(), 2);
        assert_eq!(view.total(), 2);
    }

    #[tokio::test]
    async fn test_update_replaces_item() {
        let api = FakeApi::with_codes(2);
        let mut view = QrListView::default();
        view.fetch_page(Some(&api), 1).await.unwrap();

        let update = UpdateQrRequest {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        view.update(Some(&api), "qr0", &update).await.unwrap();

        assert_eq!(view.items()[0].name, "Renamed");
        assert_eq!(api.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_prepend_keeps_page_size() {
        let api = FakeApi::with_codes(10);
        let mut view = QrListView::default();
        view.fetch_page(Some(&api), 1).await.unwrap();

        view.prepend(sample("fresh"));
        assert_eq!(view.items()[0].id, "fresh");
        assert_eq!(view.items().len(), 10);
        assert_eq!(view.total(), 11);
    }

    #[tokio::test]
    async fn test_paging_against_stub() {
        let base = start_stub().await;
        let client = QrApiClient::new(ClientConfig::new(&base, TEST_KEY)).unwrap();
        for i in 0..6 {
            client
                .create_qr(&CreateQrRequest::link(
                    format!("QR {}", i),
                    QrCodeType::Url,
                    "https://example.com",
                ))
                .await
                .unwrap();
        }

        let mut view = QrListView::new(5);
        view.fetch_page(Some(&client), 1).await.unwrap();
        let first: Vec<String> = view.items().iter().map(|q| q.id.clone()).collect();
        assert_eq!(first.len(), 5);
        // Newest first
        assert_eq!(view.items()[0].name, "QR 5");

        assert!(view.next_page(Some(&client)).await.unwrap());
        assert_eq!(view.items().len(), 1);
        assert!(view.items().iter().all(|q| !first.contains(&q.id)));
        assert!(!view.next_page(Some(&client)).await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_without_key() {
        let mut view = QrListView::default();
        let err = view.fetch_page(None, 1).await.unwrap_err();
        assert!(matches!(err, DashboardError::MissingApiKey));
    }
}
