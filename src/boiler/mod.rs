//! Client for the boiler's embedded web API.
//!
//! Every request is a GET to `cgi-bin/bc2-cgi` with a JSON request object in the
//! `json` query parameter. The response is a flat JSON object.

use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod data;
pub use data::*;

const CGI_PATH: &str = "cgi-bin/bc2-cgi";

/// Upper bound for a whole request, from connecting to reading the body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Every data request is addressed to object 100
const OBJECT_NO: u32 = 100;

/// Request numbers understood by the boiler's CGI endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[repr(u32)]
pub enum Request {
    MasterBoilerData = 2,
    BoilerStatusData = 3,
    BoilerRunProfileData = 5,
    BoilerLogData = 6,
    BoilerErrorLogData = 7,
    BoilerData = 11,
    BoilerStandardData = 13,
    BoilerSetbackData = 14,
    BoilerAdvSettingsData = 15,
    BoilerLoadSettingsData = 16,
    BoilerMultiSettingData = 17,
    BoilerCleaningSettingData = 18,
    BoilerExtDetailData = 19,
    BoilerFactoryData = 20,
    BoilerFactorySettingsData = 21,
    SiteLogData = 23,
    ClockData = 24,
    LoadPairingData = 25,
    BoilerCaptureData = 26,
    BoilerTempSensorData = 27,
    BoilerRestore = 29,
    AlertData = 31,
    LoadStatusData = 32,
    BoilerSiteData = 34,
    BoilerVersions = 35,
    NetworkBoilerData = 38,
    AdvancedOptionsData = 42,
    BoilerSimData = 44,
    SlaveMacAddrsData = 49,
    ProgSetbackData = 50,
    InternetUpdateData = 51,
    PasswordData = 99,
}

impl Request {
    pub fn number(&self) -> u32 {
        *self as u32
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestObject {
    #[serde(rename = "object_no")]
    pub object_num: u32,
    pub object_request: u32,
    #[serde(rename = "boiler_no")]
    pub boiler_num: u32,
    #[serde(rename = "load_no", skip_serializing_if = "is_zero")]
    pub load_num: u32,
    pub object_index: u32,
}

fn is_zero(v: &u32) -> bool {
    *v == 0
}

impl RequestObject {
    pub fn new(request: Request) -> Self {
        Self {
            object_num: OBJECT_NO,
            object_request: request.number(),
            boiler_num: 0,
            load_num: 0,
            object_index: 0,
        }
    }

    pub fn for_load(request: Request, load_num: u32) -> Self {
        Self {
            load_num,
            ..Self::new(request)
        }
    }

    pub fn with_index(request: Request, object_index: u32) -> Self {
        Self {
            object_index,
            ..Self::new(request)
        }
    }
}

#[derive(Error, Debug)]
pub enum BoilerError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("boiler answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to decode boiler response: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specific IBC boiler to interact with.
#[derive(Debug, Clone)]
pub struct Boiler {
    base_url: String,
    client: reqwest::Client,
}

impl Boiler {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BoilerError> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    /// Requests that take longer than `timeout` fail with [`BoilerError::Http`].
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, BoilerError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The CGI endpoint, tolerating base URLs with or without a trailing slash.
    pub fn endpoint(&self) -> String {
        let sep = if self.base_url.ends_with('/') { "" } else { "/" };
        format!("{}{}{}", self.base_url, sep, CGI_PATH)
    }

    /// Queries the boiler and returns the raw response.
    pub async fn get_data(&self, request: Request) -> Result<serde_json::Value, BoilerError> {
        self.fetch(RequestObject::new(request)).await
    }

    /// Queries the boiler about a specific load and returns the raw response.
    pub async fn get_data_for_load(
        &self,
        request: Request,
        load_num: u32,
    ) -> Result<serde_json::Value, BoilerError> {
        self.fetch(RequestObject::for_load(request, load_num)).await
    }

    pub async fn get_boiler_status_data(&self) -> Result<BoilerStatusData, BoilerError> {
        self.fetch(RequestObject::new(Request::BoilerStatusData))
            .await
    }

    pub async fn get_boiler_log_data(&self) -> Result<BoilerLogData, BoilerError> {
        self.fetch(RequestObject::new(Request::BoilerLogData)).await
    }

    /// Returns the error log entry at `log_entry`.
    pub async fn get_boiler_error_log_data(
        &self,
        log_entry: u32,
    ) -> Result<BoilerErrorLogData, BoilerError> {
        self.fetch(RequestObject::with_index(
            Request::BoilerErrorLogData,
            log_entry,
        ))
        .await
    }

    pub async fn get_boiler_data(&self) -> Result<BoilerData, BoilerError> {
        self.fetch(RequestObject::new(Request::BoilerData)).await
    }

    pub async fn get_boiler_standard_data(&self) -> Result<BoilerStandardData, BoilerError> {
        self.fetch(RequestObject::new(Request::BoilerStandardData))
            .await
    }

    pub async fn get_boiler_ext_detail_data(&self) -> Result<BoilerExtDetailData, BoilerError> {
        self.fetch(RequestObject::new(Request::BoilerExtDetailData))
            .await
    }

    pub async fn get_boiler_factory_data(&self) -> Result<BoilerFactoryData, BoilerError> {
        self.fetch(RequestObject::new(Request::BoilerFactoryData))
            .await
    }

    pub async fn get_load_status_data_for_load(
        &self,
        load_num: u32,
    ) -> Result<LoadStatusData, BoilerError> {
        self.fetch(RequestObject::for_load(Request::LoadStatusData, load_num))
            .await
    }

    /// Returns the status of every configured load, in load order.
    pub async fn get_load_status_data(&self) -> Result<Vec<LoadStatusData>, BoilerError> {
        let standard = self.get_boiler_standard_data().await?;

        let mut loads = Vec::with_capacity(4);
        for (load_num, load_type) in standard.load_types() {
            if load_type > 0 {
                loads.push(self.get_load_status_data_for_load(load_num as u32).await?);
            }
        }
        Ok(loads)
    }

    async fn fetch<T: DeserializeOwned>(&self, req: RequestObject) -> Result<T, BoilerError> {
        let query = serde_json::to_string(&req)?;
        debug!(request = req.object_request, json = %query, "querying boiler");

        let resp = self
            .client
            .get(self.endpoint())
            .query(&[("json", query)])
            .send()
            .await?;

        if !resp.status().is_success() {
            warn!(request = req.object_request, status = %resp.status(), "boiler request failed");
            return Err(BoilerError::Status(resp.status()));
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
