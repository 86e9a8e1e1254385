use crate::config::Config;
use chrono::NaiveDate;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use url::Url;

use super::types::LeaveRecord;

/// Thin client over the managed backend's REST and function endpoints.
#[derive(Clone)]
pub struct BackendClient {
  http: reqwest::Client,
  base: Url,
}

impl BackendClient {
  pub fn new(config: &Config) -> Result<Self> {
    let token = Config::get_access_token()?;

    let base = Url::parse(&config.backend.url)
      .map_err(|e| eyre!("Invalid backend URL {}: {}", config.backend.url, e))?;

    let mut headers = HeaderMap::new();
    headers.insert(
      "apikey",
      HeaderValue::from_str(&config.backend.api_key)
        .map_err(|e| eyre!("Invalid backend API key: {}", e))?,
    );
    headers.insert(
      AUTHORIZATION,
      HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| eyre!("Invalid backend access token: {}", e))?,
    );

    let http = reqwest::Client::builder()
      .default_headers(headers)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { http, base })
  }

  /// Leave requests that are approved and cover `today`: started on or before
  /// it, and either open-ended or not yet over.
  pub async fn approved_leave(&self, today: NaiveDate) -> Result<Vec<LeaveRecord>> {
    let mut url = self.join("rest/v1/leave_requests")?;
    url
      .query_pairs_mut()
      .append_pair("select", "member_id")
      .append_pair("status", "eq.approved")
      .append_pair("start_date", &format!("lte.{}", today))
      .append_pair("or", &format!("(end_date.is.null,end_date.gte.{})", today));

    let records = self
      .http
      .get(url)
      .send()
      .await
      .map_err(|e| eyre!("Failed to query leave requests: {}", e))?
      .error_for_status()
      .map_err(|e| eyre!("Leave request query rejected: {}", e))?
      .json::<Vec<LeaveRecord>>()
      .await
      .map_err(|e| eyre!("Failed to parse leave requests: {}", e))?;

    Ok(records)
  }

  /// Count of unread notification rows for the signed-in member.
  pub async fn count_unread(&self) -> Result<u64> {
    let mut url = self.join("rest/v1/notifications")?;
    url
      .query_pairs_mut()
      .append_pair("select", "id")
      .append_pair("is_read", "eq.false");

    let response = self
      .http
      .get(url)
      .header("Prefer", "count=exact")
      .header("Range-Unit", "items")
      .header("Range", "0-0")
      .send()
      .await
      .map_err(|e| eyre!("Failed to count unread notifications: {}", e))?
      .error_for_status()
      .map_err(|e| eyre!("Unread count query rejected: {}", e))?;

    // The exact count comes back after the slash in Content-Range,
    // e.g. "0-0/42" ("*/0" when there are no rows).
    response
      .headers()
      .get("content-range")
      .and_then(|v| v.to_str().ok())
      .and_then(|v| v.rsplit('/').next())
      .and_then(|total| total.parse::<u64>().ok())
      .ok_or_else(|| eyre!("Unread count response is missing a usable Content-Range"))
  }

  /// Ask the backend to dispatch any notifications whose scheduled minute has
  /// arrived. Fire-and-forget: success or failure is all the caller learns.
  pub async fn dispatch_scheduled(&self) -> Result<()> {
    let url = self.join("functions/v1/dispatch-scheduled-notifications")?;

    self
      .http
      .post(url)
      .send()
      .await
      .map_err(|e| eyre!("Failed to reach dispatch function: {}", e))?
      .error_for_status()
      .map_err(|e| eyre!("Dispatch function failed: {}", e))?;

    Ok(())
  }

  fn join(&self, path: &str) -> Result<Url> {
    self
      .base
      .join(path)
      .map_err(|e| eyre!("Failed to build backend URL for {}: {}", path, e))
  }
}
