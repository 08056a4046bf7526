//! HTTP session handle for the Google Sheets API.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    Config, Error, Result,
    quota::QuotaLimiter,
    types::{
        BatchUpdateRequest, BatchUpdateResponse, ClearValuesResponse, CopySheetRequest,
        CreateSpreadsheetRequest, SheetProperties, SpreadsheetProperties, SpreadsheetResource,
        UpdateValuesResponse, ValueRange, ValueRangeInput,
    },
};

/// Base URL of the public Sheets v4 API.
pub const DEFAULT_SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4";

/// An authorized connection to Google Sheets.
///
/// Cloning is cheap: clones share the HTTP connection pool and the request
/// quota, so every spreadsheet and sheet opened through one client is
/// throttled together.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    limiter: QuotaLimiter,
}

impl SheetsClient {
    /// Creates a client for the public endpoint with the default quota.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_SHEETS_ENDPOINT.to_string(),
            access_token: access_token.into(),
            limiter: QuotaLimiter::default(),
        }
    }

    /// Creates a client using the endpoint and quota from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the configured endpoint is not
    /// an absolute URL.
    pub fn from_config(config: &Config, access_token: impl Into<String>) -> Result<Self> {
        let client = Self::new(access_token).with_limiter(config.quota.limiter());
        match &config.endpoint {
            Some(endpoint) => client.with_endpoint(endpoint),
            None => Ok(client),
        }
    }

    /// Points the client at another base URL, such as a test server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if `endpoint` is empty or not an
    /// absolute URL.
    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        self.base_url = normalize_base_url(endpoint)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_limiter(mut self, limiter: QuotaLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    pub fn limiter(&self) -> &QuotaLimiter {
        &self.limiter
    }

    /// Fetches spreadsheet metadata, including every sheet's properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<SpreadsheetResource> {
        let url = self.url_with_segments(&["spreadsheets", spreadsheet_id])?;
        self.get_json(url, &[]).await
    }

    /// Reads the values in an A1 range.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<ValueRange> {
        let url = self.url_with_segments(&["spreadsheets", spreadsheet_id, "values", range])?;
        self.get_json(url, &[]).await
    }

    /// Writes values as if typed into the UI, so formulas are evaluated.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn update_values(
        &self,
        spreadsheet_id: &str,
        input: &ValueRangeInput,
    ) -> Result<UpdateValuesResponse> {
        let url =
            self.url_with_segments(&["spreadsheets", spreadsheet_id, "values", &input.range])?;
        self.put_json(url, input, &[("valueInputOption", "USER_ENTERED")])
            .await
    }

    /// Clears every value in an A1 range, keeping formatting.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn clear_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<ClearValuesResponse> {
        let url = self.url_with_segments(&[
            "spreadsheets",
            spreadsheet_id,
            "values",
            &format!("{range}:clear"),
        ])?;
        self.post_json(url, &serde_json::json!({}), &[]).await
    }

    /// Applies one or more structural updates.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn batch_update(
        &self,
        spreadsheet_id: &str,
        request: &BatchUpdateRequest,
    ) -> Result<BatchUpdateResponse> {
        let url = self.url_with_segments(&[
            "spreadsheets",
            &format!("{spreadsheet_id}:batchUpdate"),
        ])?;
        self.post_json(url, request, &[]).await
    }

    /// Creates a new spreadsheet.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn create_spreadsheet(&self, title: &str) -> Result<SpreadsheetResource> {
        let url = self.url_with_segments(&["spreadsheets"])?;
        let body = CreateSpreadsheetRequest {
            properties: SpreadsheetProperties {
                title: title.to_string(),
            },
        };
        self.post_json(url, &body, &[]).await
    }

    /// Copies a sheet into another spreadsheet, returning the copy's
    /// properties.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be
    /// parsed.
    pub async fn copy_sheet(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        destination_spreadsheet_id: &str,
    ) -> Result<SheetProperties> {
        let url = self.url_with_segments(&[
            "spreadsheets",
            spreadsheet_id,
            "sheets",
            &format!("{sheet_id}:copyTo"),
        ])?;
        let body = CopySheetRequest {
            destination_spreadsheet_id: destination_spreadsheet_id.to_string(),
        };
        self.post_json(url, &body, &[]).await
    }

    fn url_with_segments(&self, segments: &[&str]) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|_| Error::InvalidEndpoint(self.base_url.clone()))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidEndpoint(self.base_url.clone()))?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: reqwest::Url,
        query: &[(&str, &str)],
    ) -> Result<T> {
        self.limiter.read().await;
        debug!(method = "GET", %url, "sheets request");

        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn put_json<TReq: Serialize, TRes: for<'de> Deserialize<'de>>(
        &self,
        url: reqwest::Url,
        body: &TReq,
        query: &[(&str, &str)],
    ) -> Result<TRes> {
        self.limiter.write().await;
        debug!(method = "PUT", %url, "sheets request");

        let response = self
            .http
            .put(url)
            .query(query)
            .json(body)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn post_json<TReq: Serialize, TRes: for<'de> Deserialize<'de>>(
        &self,
        url: reqwest::Url,
        body: &TReq,
        query: &[(&str, &str)],
    ) -> Result<TRes> {
        self.limiter.write().await;
        debug!(method = "POST", %url, "sheets request");

        let response = self
            .http
            .post(url)
            .query(query)
            .json(body)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        Self::handle_response(response).await
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json::<T>().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Api { status, body })
        }
    }
}

fn normalize_base_url(endpoint: &str) -> Result<String> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    let url = reqwest::Url::parse(trimmed).map_err(|_| Error::InvalidEndpoint(endpoint.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(Error::InvalidEndpoint(endpoint.to_string()));
    }
    Ok(trimmed.to_string())
}
