/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, instrument};

use super::error::{CoreError, CoreResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Work submitted to the executor for one CD runner or CI workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTemplate {
    /// Executor id requested for the workload; prefixed `cd` or `ci`.
    pub name: String,
    pub workflow_id: i32,
    pub pipeline_id: i32,
    pub app_id: i32,
    pub environment_id: Option<i32>,
    pub namespace: Option<String>,
    pub stage: String,
    pub image: String,
    pub config: String,
    pub config_maps: Map<String, Value>,
    pub secrets: Map<String, Value>,
    pub run_in_env: bool,
    pub git_triggers: BTreeMap<i32, String>,
    pub invalidate_cache: bool,
    pub triggered_by: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HelmHealth {
    Healthy,
    Progressing,
    Degraded,
    Failed,
    Missing,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmStatus {
    pub health: HelmHealth,
    pub last_revision_time: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgoSync {
    Synced,
    OutOfSync,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgoHealth {
    Healthy,
    Progressing,
    Degraded,
    Suspended,
    Missing,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgoResource {
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub health: Option<ArgoHealth>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgoStatus {
    pub sync: ArgoSync,
    pub health: ArgoHealth,
    #[serde(default)]
    pub resources: Vec<ArgoResource>,
}

impl ArgoStatus {
    pub fn missing() -> Self {
        ArgoStatus {
            sync: ArgoSync::Unknown,
            health: ArgoHealth::Missing,
            resources: Vec::new(),
        }
    }
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Executor: Send + Sync {
    /// Returns the executor id of the accepted workload.
    async fn submit(&self, template: &WorkflowTemplate) -> CoreResult<String>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait HelmAdapter: Send + Sync {
    async fn get_status(&self, app_name: &str, environment_id: i32) -> CoreResult<HelmStatus>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ArgoAdapter: Send + Sync {
    async fn get_status(&self, app_name: &str) -> CoreResult<ArgoStatus>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn check(&self, subject: i32, action: &str, resource: &str) -> CoreResult<bool>;
}

/// Stand-in for an adapter whose endpoint is not configured. Every call is `Unavailable`.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured(pub &'static str);

impl Unconfigured {
    fn error(&self) -> CoreError {
        CoreError::Unavailable(format!("{} endpoint is not configured", self.0))
    }
}

#[async_trait]
impl Executor for Unconfigured {
    async fn submit(&self, _template: &WorkflowTemplate) -> CoreResult<String> {
        Err(self.error())
    }
}

#[async_trait]
impl HelmAdapter for Unconfigured {
    async fn get_status(&self, _app_name: &str, _environment_id: i32) -> CoreResult<HelmStatus> {
        Err(self.error())
    }
}

#[async_trait]
impl ArgoAdapter for Unconfigured {
    async fn get_status(&self, _app_name: &str) -> CoreResult<ArgoStatus> {
        Err(self.error())
    }
}

#[async_trait]
impl Authorizer for Unconfigured {
    async fn check(&self, _subject: i32, _action: &str, _resource: &str) -> CoreResult<bool> {
        Err(self.error())
    }
}

fn client() -> CoreResult<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| CoreError::Internal(format!("Failed to build http client: {}", e)))
}

/// JSON-over-HTTP client shared by the production adapters.
#[derive(Debug, Clone)]
pub struct HttpAdapter {
    client: Client,
    base_url: String,
}

impl HttpAdapter {
    pub fn new(base_url: &str) -> CoreResult<Self> {
        Ok(HttpAdapter {
            client: client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[derive(Deserialize)]
struct SubmitResponse {
    name: String,
}

#[async_trait]
impl Executor for HttpAdapter {
    #[instrument(skip(self, template), fields(name = %template.name))]
    async fn submit(&self, template: &WorkflowTemplate) -> CoreResult<String> {
        let response = self
            .client
            .post(self.url("workflows"))
            .json(template)
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(CoreError::Unavailable(format!(
                "executor responded with {}",
                status
            )));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CoreError::PreconditionFailed(if message.is_empty() {
                format!("executor rejected workflow with {}", status)
            } else {
                message
            }));
        }

        let accepted: SubmitResponse = response.json().await?;
        debug!(executor_id = %accepted.name, "Workflow accepted");
        Ok(accepted.name)
    }
}

#[async_trait]
impl HelmAdapter for HttpAdapter {
    async fn get_status(&self, app_name: &str, environment_id: i32) -> CoreResult<HelmStatus> {
        let response = self
            .client
            .get(self.url(&format!("apps/{}/status", app_name)))
            .query(&[("environmentId", environment_id)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(HelmStatus {
                health: HelmHealth::Missing,
                last_revision_time: None,
            });
        }

        Ok(response.error_for_status()?.json().await?)
    }
}

#[async_trait]
impl ArgoAdapter for HttpAdapter {
    async fn get_status(&self, app_name: &str) -> CoreResult<ArgoStatus> {
        let response = self
            .client
            .get(self.url(&format!("applications/{}", app_name)))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(ArgoStatus::missing());
        }

        Ok(response.error_for_status()?.json().await?)
    }
}

#[derive(Serialize)]
struct CheckRequest<'a> {
    subject: i32,
    action: &'a str,
    resource: &'a str,
}

#[derive(Deserialize)]
struct CheckResponse {
    allowed: bool,
}

#[async_trait]
impl Authorizer for HttpAdapter {
    async fn check(&self, subject: i32, action: &str, resource: &str) -> CoreResult<bool> {
        let response: CheckResponse = self
            .client
            .post(self.url("check"))
            .json(&CheckRequest {
                subject,
                action,
                resource,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helm_health_tolerates_unknown_values() {
        let status: HelmStatus =
            serde_json::from_str(r#"{"health":"weird","lastRevisionTime":null}"#).unwrap();
        assert_eq!(status.health, HelmHealth::Unknown);
    }

    #[test]
    fn argo_status_decodes_without_resources() {
        let status: ArgoStatus =
            serde_json::from_str(r#"{"sync":"Synced","health":"Healthy"}"#).unwrap();
        assert_eq!(status.sync, ArgoSync::Synced);
        assert!(status.resources.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_adapter_is_unavailable() {
        let adapter = Unconfigured("helm");
        let err = HelmAdapter::get_status(&adapter, "app-env", 1)
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }
}
