use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::ErrorResponse;
use crate::models::meeting::{DeleteResponse, MeetingResponse};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to booking service failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("booking service rejected the request ({status}): {detail}")]
    Rejected { status: StatusCode, detail: String },
}

// Request body for scheduling; timestamps are sent as ISO-8601 strings
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleMeetingRequest {
    pub start_time: String,
    pub end_time: String,
    pub required_seats: u64,
}

/// Client for the room booking API
pub struct BookingClient {
    client: Client,
    endpoint: String,
}

impl BookingClient {
    /// Create a client for the service at `endpoint`, e.g. `http://localhost:3000`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn schedule_meeting(
        &self,
        request: &ScheduleMeetingRequest,
    ) -> Result<MeetingResponse, ClientError> {
        let url = format!("{}/schedule_meeting", self.endpoint);
        info!("Scheduling meeting {} - {}", request.start_time, request.end_time);
        debug!("API URL: {}", url);

        let res = self.client.post(&url).json(request).send().await?;
        Ok(check(res).await?.json::<MeetingResponse>().await?)
    }

    pub async fn list_meetings(&self) -> Result<Vec<MeetingResponse>, ClientError> {
        let url = format!("{}/meetings/", self.endpoint);
        debug!("API URL: {}", url);

        let res = self.client.get(&url).send().await?;
        Ok(check(res).await?.json::<Vec<MeetingResponse>>().await?)
    }

    pub async fn delete_meeting(&self, meeting_id: i64) -> Result<DeleteResponse, ClientError> {
        let url = format!("{}/meetings/{}", self.endpoint, meeting_id);
        info!("Deleting meeting {}", meeting_id);

        let res = self.client.delete(&url).send().await?;
        Ok(check(res).await?.json::<DeleteResponse>().await?)
    }
}

// Turn a non-success response into a Rejected error carrying the service's detail message
async fn check(res: Response) -> Result<Response, ClientError> {
    let status = res.status();
    debug!("Response received with status: {}", status);

    if status.is_success() {
        return Ok(res);
    }

    let body = res.text().await?;
    let detail = serde_json::from_str::<ErrorResponse>(&body)
        .map(|e| e.detail)
        .unwrap_or(body);

    Err(ClientError::Rejected { status, detail })
}
