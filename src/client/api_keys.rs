//! API key management endpoints (`/api-keys`)

use reqwest::Method;

use super::{ClientError, QrApiClient};
use crate::model::{ApiKey, ApiResponse, CreateApiKeyRequest, UpdateApiKeyRequest};

impl QrApiClient {
    fn api_key_url(&self, id: &str) -> String {
        self.url(&format!("/api-keys/{}", urlencoding::encode(id)))
    }

    /// Issue a new key; the response is the only place the full key appears
    pub async fn create_api_key(&self, request: &CreateApiKeyRequest) -> Result<ApiKey, ClientError> {
        let url = self.url("/api-keys");
        let resp: ApiResponse<ApiKey> = self
            .send(self.request(Method::POST, &url).json(request))
            .await?;
        Ok(resp.data)
    }

    pub async fn list_api_keys(&self) -> Result<Vec<ApiKey>, ClientError> {
        let url = self.url("/api-keys");
        let resp: ApiResponse<Vec<ApiKey>> = self.send(self.request(Method::GET, &url)).await?;
        Ok(resp.data)
    }

    pub async fn get_api_key(&self, id: &str) -> Result<ApiKey, ClientError> {
        let url = self.api_key_url(id);
        let resp: ApiResponse<ApiKey> = self.send(self.request(Method::GET, &url)).await?;
        Ok(resp.data)
    }

    pub async fn update_api_key(
        &self,
        id: &str,
        update: &UpdateApiKeyRequest,
    ) -> Result<ApiKey, ClientError> {
        let url = self.api_key_url(id);
        let resp: ApiResponse<ApiKey> = self
            .send(self.request(Method::PATCH, &url).json(update))
            .await?;
        Ok(resp.data)
    }

    /// Revoke a key; requests using it fail with 401 afterwards
    pub async fn revoke_api_key(&self, id: &str) -> Result<(), ClientError> {
        let url = self.api_key_url(id);
        self.execute(self.request(Method::DELETE, &url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{start_stub, TEST_KEY};
    use crate::client::{ClientConfig, ErrorKind, QrApi};
    use crate::model::ListParams;

    #[tokio::test]
    async fn test_key_lifecycle() {
        let base = start_stub().await;
        let admin = QrApiClient::new(ClientConfig::new(&base, TEST_KEY)).unwrap();

        let created = admin
            .create_api_key(&CreateApiKeyRequest {
                name: "CI".to_string(),
                expires_at: None,
            })
            .await
            .unwrap();
        assert!(created.key.starts_with("qr_live_"));
        assert!(created.is_active);

        let keys = admin.list_api_keys().await.unwrap();
        assert!(keys.iter().any(|k| k.id == created.id));

        let renamed = admin
            .update_api_key(
                &created.id,
                &UpdateApiKeyRequest {
                    name: Some("CI runner".to_string()),
                    expires_at: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "CI runner");

        // The new key works until revoked
        let ci = QrApiClient::new(ClientConfig::new(&base, &created.key)).unwrap();
        ci.list_qr(&ListParams::default()).await.unwrap();

        admin.revoke_api_key(&created.id).await.unwrap();
        let err = ci.list_qr(&ListParams::default()).await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Authentication));
        assert_eq!(err.server_message(), Some("Invalid API key"));
    }

    #[tokio::test]
    async fn test_unknown_key_id() {
        let base = start_stub().await;
        let admin = QrApiClient::new(ClientConfig::new(&base, TEST_KEY)).unwrap();

        let err = admin.get_api_key("missing").await.unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }
}
