use super::{ApiError, ArchiveApi, Paper, PaperId, RawResponse, Region, Stats, Subject, Year};
use async_trait::async_trait;
use reqwest::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// reqwest-backed client for the archive's `/api` endpoints.
pub struct ArchiveClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct DownloadMultipleRequest<'a> {
    paper_ids: &'a [PaperId],
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl ArchiveClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("paper-archive/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.client.get(self.url(path)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body: Option<ErrorBody> = resp.json().await.ok();
            let message = body
                .and_then(|b| b.error)
                .unwrap_or_else(|| format!("{} returned {}", path, status));
            return Err(ApiError::Api(message));
        }
        Ok(resp.json().await?)
    }

    async fn into_raw(resp: reqwest::Response) -> Result<RawResponse, ApiError> {
        let status = resp.status().as_u16();
        let content_type = header_value(&resp, CONTENT_TYPE);
        let content_disposition = header_value(&resp, CONTENT_DISPOSITION);
        let body = resp.bytes().await?.to_vec();
        Ok(RawResponse {
            status,
            content_type,
            content_disposition,
            body,
        })
    }
}

fn header_value(resp: &reqwest::Response, name: HeaderName) -> Option<String> {
    resp.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[async_trait]
impl ArchiveApi for ArchiveClient {
    async fn subjects(&self) -> Result<Vec<Subject>, ApiError> {
        self.get_json("subjects").await
    }

    async fn years(&self) -> Result<Vec<Year>, ApiError> {
        self.get_json("years").await
    }

    async fn regions(&self) -> Result<Vec<Region>, ApiError> {
        self.get_json("regions").await
    }

    async fn papers(&self, query: &[(&'static str, String)]) -> Result<Vec<Paper>, ApiError> {
        let resp = self
            .client
            .get(self.url("papers"))
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    async fn paper(&self, id: PaperId) -> Result<Option<Paper>, ApiError> {
        let resp = self
            .client
            .get(self.url(&format!("papers/{}", id)))
            .send()
            .await?;
        if resp.status() == 404 {
            return Ok(None);
        }
        Ok(Some(resp.error_for_status()?.json().await?))
    }

    async fn stats(&self) -> Result<Stats, ApiError> {
        self.get_json("stats").await
    }

    async fn download(&self, id: PaperId) -> Result<RawResponse, ApiError> {
        let resp = self
            .client
            .get(self.url(&format!("download/{}", id)))
            .send()
            .await?;
        Self::into_raw(resp).await
    }

    async fn download_multiple(&self, ids: &[PaperId]) -> Result<RawResponse, ApiError> {
        let resp = self
            .client
            .post(self.url("download-multiple"))
            .json(&DownloadMultipleRequest { paper_ids: ids })
            .send()
            .await?;
        Self::into_raw(resp).await
    }
}
