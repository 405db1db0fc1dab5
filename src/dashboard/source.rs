use async_trait::async_trait;
use derive_more::Display;

use crate::model::attendance::{AttendanceList, AttendanceRecord};

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[display(fmt = "request failed: {}", _0)]
    Transport(String),
    #[display(fmt = "unexpected status {}", _0)]
    Status(u16),
    #[display(fmt = "invalid body: {}", _0)]
    Decode(String),
}

impl std::error::Error for FetchError {}

/// Where the dashboard gets its rows from.
#[async_trait]
pub trait AttendanceSource {
    async fn fetch_attendance(&self) -> Result<Vec<AttendanceRecord>, FetchError>;
}

/// `GET {base}/api/attendance` over HTTP.
pub struct HttpAttendanceSource {
    client: reqwest::Client,
    url: String,
}

impl HttpAttendanceSource {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        HttpAttendanceSource {
            client,
            url: format!("{}/api/attendance", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl AttendanceSource for HttpAttendanceSource {
    async fn fetch_attendance(&self) -> Result<Vec<AttendanceRecord>, FetchError> {
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        parse_attendance(&body)
    }
}

/// Parses `{ "attendance": [...] }`; a body without the key is an empty list.
pub fn parse_attendance(body: &str) -> Result<Vec<AttendanceRecord>, FetchError> {
    serde_json::from_str::<AttendanceList>(body)
        .map(|list| list.attendance)
        .map_err(|e| FetchError::Decode(e.to_string()))
}
