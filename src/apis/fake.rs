//! In-memory `ArchiveApi` used by the session and download tests.

use std::sync::Mutex;

use super::{
    ApiError, ArchiveApi, Paper, PaperId, PaperType, RawResponse, Region, Stats, Subject, Year,
};
use async_trait::async_trait;

pub fn paper(id: PaperId, title: &str, subject: &str, region: &str, year: u32) -> Paper {
    Paper {
        id,
        title: title.to_string(),
        subject_name: subject.to_string(),
        region_name: region.to_string(),
        year,
        paper_type: PaperType::QuestionPaper,
        set_code: None,
        pdf_url: None,
        subject_id: None,
        year_id: None,
        region_id: None,
        file_size: None,
    }
}

/// `count` papers with ids `1..=count`, all titled "Paper N".
pub fn numbered_papers(count: u64) -> Vec<Paper> {
    (1..=count)
        .map(|i| paper(i, &format!("Paper {}", i), "Economics", "Delhi", 2020))
        .collect()
}

pub fn pdf_response(disposition: Option<&str>, body: &[u8]) -> RawResponse {
    RawResponse {
        status: 200,
        content_type: Some("application/pdf".to_string()),
        content_disposition: disposition.map(str::to_string),
        body: body.to_vec(),
    }
}

pub fn zip_response(body: &[u8]) -> RawResponse {
    RawResponse {
        status: 200,
        content_type: Some("application/zip".to_string()),
        content_disposition: Some(r#"attachment; filename=cbse_papers.zip"#.to_string()),
        body: body.to_vec(),
    }
}

pub fn json_response(status: u16, body: serde_json::Value) -> RawResponse {
    RawResponse {
        status,
        content_type: Some("application/json".to_string()),
        content_disposition: None,
        body: body.to_string().into_bytes(),
    }
}

/// Canned responses plus a log of what was requested.
#[derive(Default)]
pub struct FakeArchive {
    pub subjects: Vec<Subject>,
    pub years: Vec<Year>,
    pub regions: Vec<Region>,
    pub papers: Vec<Paper>,
    pub stats: Option<Stats>,
    pub download: Option<RawResponse>,
    pub download_multiple: Option<RawResponse>,
    pub fail_transport: bool,
    pub listing_queries: Mutex<Vec<Vec<(&'static str, String)>>>,
    pub bulk_requests: Mutex<Vec<Vec<PaperId>>>,
}

impl FakeArchive {
    pub fn with_papers(papers: Vec<Paper>) -> Self {
        Self {
            papers,
            ..Default::default()
        }
    }

    fn check_transport(&self) -> Result<(), ApiError> {
        if self.fail_transport {
            Err(ApiError::Api("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn canned(resp: &Option<RawResponse>) -> Result<RawResponse, ApiError> {
        resp.clone()
            .ok_or_else(|| ApiError::Api("no canned response".to_string()))
    }
}

#[async_trait]
impl ArchiveApi for FakeArchive {
    async fn subjects(&self) -> Result<Vec<Subject>, ApiError> {
        self.check_transport()?;
        Ok(self.subjects.clone())
    }

    async fn years(&self) -> Result<Vec<Year>, ApiError> {
        self.check_transport()?;
        Ok(self.years.clone())
    }

    async fn regions(&self) -> Result<Vec<Region>, ApiError> {
        self.check_transport()?;
        Ok(self.regions.clone())
    }

    async fn papers(&self, query: &[(&'static str, String)]) -> Result<Vec<Paper>, ApiError> {
        self.check_transport()?;
        self.listing_queries.lock().unwrap().push(query.to_vec());
        Ok(self.papers.clone())
    }

    async fn paper(&self, id: PaperId) -> Result<Option<Paper>, ApiError> {
        self.check_transport()?;
        Ok(self.papers.iter().find(|p| p.id == id).cloned())
    }

    async fn stats(&self) -> Result<Stats, ApiError> {
        self.check_transport()?;
        self.stats
            .clone()
            .ok_or_else(|| ApiError::Api("stats unavailable".to_string()))
    }

    async fn download(&self, _id: PaperId) -> Result<RawResponse, ApiError> {
        self.check_transport()?;
        Self::canned(&self.download)
    }

    async fn download_multiple(&self, ids: &[PaperId]) -> Result<RawResponse, ApiError> {
        self.check_transport()?;
        self.bulk_requests.lock().unwrap().push(ids.to_vec());
        Self::canned(&self.download_multiple)
    }
}
