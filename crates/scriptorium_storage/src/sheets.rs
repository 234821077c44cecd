//! Google Sheets v4 `values` API store.

use async_trait::async_trait;
use derive_getters::Getters;
use reqwest::{Client, Url};
use scriptorium_core::{Destination, Table, cell_to_string};
use scriptorium_error::{ScriptoriumResult, StoreError, StoreErrorKind};
use scriptorium_interface::DestinationStore;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, error, info, instrument};

/// Environment variable holding the OAuth access token.
pub const SHEETS_TOKEN_VARIABLE: &str = "GOOGLE_SHEETS_ACCESS_TOKEN";

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// `[sheets]` configuration table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SheetsSettings {
    /// Spreadsheets collection endpoint
    #[serde(default = "default_base_url")]
    base_url: String,
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl SheetsSettings {
    /// Settings pointing at another endpoint.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<JsonValue>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeUpdate<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<Vec<String>>,
}

/// A1 notation for a whole sheet, quoting the sheet name.
fn sheet_range(collection: &str) -> String {
    format!("'{}'", collection.replace('\'', "''"))
}

/// A1 notation for everything from column A of `start_row` onwards.
fn anchored_range(collection: &str, start_row: usize) -> String {
    format!("{}!A{}", sheet_range(collection), start_row)
}

/// Google Sheets destination store.
///
/// Reads the full `values` grid of a sheet and writes with
/// `valueInputOption=RAW`, so cell text is stored verbatim.
#[derive(Debug, Clone)]
pub struct SheetsStore {
    client: Client,
    access_token: String,
    base_url: Url,
}

impl SheetsStore {
    /// Create a store with an OAuth access token.
    ///
    /// # Errors
    ///
    /// Fails when the token is blank or the base URL cannot hold path segments.
    pub fn new(
        access_token: impl Into<String>,
        settings: &SheetsSettings,
    ) -> Result<Self, StoreError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(StoreError::new(StoreErrorKind::MissingCredentials(
                SHEETS_TOKEN_VARIABLE.to_string(),
            )));
        }
        let base_url = Url::parse(settings.base_url())
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                StoreError::new(StoreErrorKind::InvalidDestination(format!(
                    "unusable sheets base URL: {}",
                    settings.base_url()
                )))
            })?;
        info!(base_url = %base_url, "Created Sheets store");
        Ok(Self {
            client: Client::new(),
            access_token,
            base_url,
        })
    }

    /// Create a store from `GOOGLE_SHEETS_ACCESS_TOKEN`.
    pub fn from_env(settings: &SheetsSettings) -> Result<Self, StoreError> {
        let token = std::env::var(SHEETS_TOKEN_VARIABLE).unwrap_or_default();
        Self::new(token, settings)
    }

    fn values_url(&self, destination: &Destination, range: &str) -> Result<Url, StoreError> {
        if destination.id().trim().is_empty() || destination.collection().trim().is_empty() {
            return Err(StoreError::new(StoreErrorKind::InvalidDestination(
                destination.to_string(),
            )));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                StoreError::new(StoreErrorKind::InvalidDestination(self.base_url.to_string()))
            })?
            .pop_if_empty()
            .push(destination.id())
            .push("values")
            .push(range);
        Ok(url)
    }
}

async fn error_body(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    error!(status, body = %message, "Sheets API returned error");
    StoreError::new(StoreErrorKind::Api { status, message })
}

#[async_trait]
impl DestinationStore for SheetsStore {
    #[instrument(skip(self), fields(destination = %destination))]
    async fn read(&self, destination: &Destination) -> ScriptoriumResult<Table> {
        let url = self.values_url(destination, &sheet_range(destination.collection()))?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| StoreError::new(StoreErrorKind::Read(e.to_string())))?;
        if !response.status().is_success() {
            return Err(error_body(response).await.into());
        }

        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| StoreError::new(StoreErrorKind::Read(e.to_string())))?;
        let grid: Vec<Vec<String>> = body
            .values
            .iter()
            .map(|line| line.iter().map(cell_to_string).collect())
            .collect();

        let table = Table::from_grid(&grid);
        debug!(rows = table.len(), columns = table.header().len(), "Read destination");
        Ok(table)
    }

    #[instrument(skip(self, table), fields(destination = %destination, rows = table.len()))]
    async fn write(
        &self,
        destination: &Destination,
        start_row: usize,
        table: &Table,
    ) -> ScriptoriumResult<()> {
        if start_row == 0 {
            return Err(StoreError::new(StoreErrorKind::InvalidDestination(
                "start row is 1-based".to_string(),
            ))
            .into());
        }
        let range = anchored_range(destination.collection(), start_row);
        let mut url = self.values_url(destination, &range)?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = ValueRangeUpdate {
            range: &range,
            major_dimension: "ROWS",
            values: table.to_grid(),
        };
        let response = self
            .client
            .put(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::new(StoreErrorKind::Write(e.to_string())))?;
        if !response.status().is_success() {
            return Err(error_body(response).await.into());
        }

        info!(range = %range, "Wrote destination");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_quote_sheet_names() {
        assert_eq!(sheet_range("UI"), "'UI'");
        assert_eq!(sheet_range("Iroha's Story"), "'Iroha''s Story'");
        assert_eq!(anchored_range("UI", 1), "'UI'!A1");
    }

    #[test]
    fn values_url_encodes_range() {
        let store = SheetsStore::new("token", &SheetsSettings::default()).unwrap();
        let url = store
            .values_url(&Destination::new("abc", "Main Story"), &anchored_range("Main Story", 1))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'Main%20Story'!A1"
        );
    }

    #[test]
    fn blank_destination_is_rejected() {
        let store = SheetsStore::new("token", &SheetsSettings::default()).unwrap();
        assert!(store.values_url(&Destination::new("", "UI"), "'UI'").is_err());
    }

    #[test]
    fn blank_token_is_missing_credentials() {
        let err = SheetsStore::new(" ", &SheetsSettings::default()).unwrap_err();
        assert!(matches!(err.kind, StoreErrorKind::MissingCredentials(_)));
    }
}
