//! AWS Cloud9 API client
//!
//! Speaks the Cloud9 JSON 1.1 protocol: every operation is a `POST /`
//! with an `X-Amz-Target` header naming the operation. Requests are not
//! signed; the endpoint is expected to be a signing proxy or gateway that
//! adds credentials.

use crate::error::{Cloud9Error, Result};
use async_trait::async_trait;
use envflow_cloud::{
    ApiResult, CreateEnvironmentRequest, EnvironmentApi, RemoteEnvironment, Tag,
    UpdateEnvironmentRequest,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const TARGET_PREFIX: &str = "AWSCloud9WorkspaceManagementService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const DEFAULT_REGION: &str = "us-east-1";

/// Configuration for the Cloud9 client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cloud9Config {
    /// Base URL requests are posted to
    pub endpoint: String,

    /// AWS region
    pub region: String,
}

impl Cloud9Config {
    /// Config for the public regional endpoint
    pub fn for_region(region: impl Into<String>) -> Self {
        let region = region.into();
        Self {
            endpoint: format!("https://cloud9.{}.amazonaws.com", region),
            region,
        }
    }

    /// Create Cloud9Config from environment variables
    ///
    /// `ENVFLOW_CLOUD9_ENDPOINT` overrides the regional endpoint derived
    /// from `AWS_REGION` (or `AWS_DEFAULT_REGION`).
    pub fn from_env() -> Result<Self> {
        let region = std::env::var("AWS_REGION")
            .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|_| DEFAULT_REGION.to_string());

        let mut config = Self::for_region(region);
        if let Ok(endpoint) = std::env::var("ENVFLOW_CLOUD9_ENDPOINT") {
            if endpoint.trim().is_empty() {
                return Err(Cloud9Error::InvalidConfig(
                    "ENVFLOW_CLOUD9_ENDPOINT is empty".to_string(),
                ));
            }
            config.endpoint = endpoint;
        }
        Ok(config)
    }
}

/// Cloud9 SSH environment client
pub struct Cloud9Client {
    client: reqwest::Client,
    config: Cloud9Config,
}

impl Cloud9Client {
    pub fn new(config: Cloud9Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &Cloud9Config {
        &self.config
    }

    async fn call<Req, Resp>(&self, operation: &str, body: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        tracing::debug!("Cloud9 {} -> {}", operation, self.config.endpoint);

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Content-Type", CONTENT_TYPE)
            .header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, operation))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(parse_error(status.as_u16(), &text));
        }

        let text = if text.trim().is_empty() { "{}" } else { &text };
        Ok(serde_json::from_str(text)?)
    }

    async fn describe(&self, id: &str) -> Result<Vec<ApiEnvironment>> {
        let request = DescribeEnvironmentsRequest {
            environment_ids: vec![id.to_string()],
        };
        match self
            .call::<_, DescribeEnvironmentsResponse>("DescribeEnvironments", &request)
            .await
        {
            Ok(response) => Ok(response.environments),
            Err(Cloud9Error::Api { code, .. }) if code == "NotFoundException" => {
                tracing::debug!("Environment {} not found", id);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    async fn list_tags(&self, arn: &str) -> Result<Vec<Tag>> {
        let request = ResourceArnRequest {
            resource_arn: arn.to_string(),
        };
        let response: ListTagsResponse = self.call("ListTagsForResource", &request).await?;
        Ok(response.tags)
    }
}

#[async_trait]
impl EnvironmentApi for Cloud9Client {
    async fn create_environment(&self, request: &CreateEnvironmentRequest) -> ApiResult<String> {
        let response: CreateEnvironmentResponse =
            self.call("CreateEnvironmentSSH", request).await?;
        tracing::debug!("Cloud9 assigned environment ID {}", response.environment_id);
        Ok(response.environment_id)
    }

    async fn list_environments_by_id(&self, id: &str) -> ApiResult<Vec<RemoteEnvironment>> {
        let mut result = Vec::new();
        for environment in self.describe(id).await? {
            let tags = if environment.arn.is_empty() {
                Vec::new()
            } else {
                self.list_tags(&environment.arn).await?
            };
            result.push(environment.into_remote(tags));
        }
        Ok(result)
    }

    async fn update_environment(&self, request: &UpdateEnvironmentRequest) -> ApiResult<()> {
        let _: Empty = self.call("UpdateEnvironment", request).await?;
        Ok(())
    }

    async fn tag_resource(&self, arn: &str, tags: &[Tag]) -> ApiResult<()> {
        let request = TagResourceRequest {
            resource_arn: arn,
            tags,
        };
        let _: Empty = self.call("TagResource", &request).await?;
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ApiResult<()> {
        let request = UntagResourceRequest {
            resource_arn: arn,
            tag_keys: keys,
        };
        let _: Empty = self.call("UntagResource", &request).await?;
        Ok(())
    }

    async fn delete_environment(&self, id: &str) -> ApiResult<()> {
        let request = DeleteEnvironmentRequest { environment_id: id };
        let _: Empty = self.call("DeleteEnvironment", &request).await?;
        Ok(())
    }
}

/// Parse a JSON 1.1 error body (`{"__type": "...#Code", "message": "..."}`)
fn parse_error(status: u16, body: &str) -> Cloud9Error {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(error) if error.error_type.is_some() => {
            let raw = error.error_type.unwrap_or_default();
            let code = raw.rsplit('#').next().unwrap_or(&raw).to_string();
            Cloud9Error::Api {
                code,
                message: error.message.unwrap_or_default(),
            }
        }
        _ => Cloud9Error::UnexpectedResponse {
            status,
            body: body.to_string(),
        },
    }
}

// ============ API Types ============

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Empty {}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateEnvironmentResponse {
    environment_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DescribeEnvironmentsRequest {
    environment_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DescribeEnvironmentsResponse {
    #[serde(default)]
    environments: Vec<ApiEnvironment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEnvironment {
    id: String,
    #[serde(default)]
    arn: String,
    name: String,
    description: Option<String>,
    #[serde(default)]
    login_name: String,
    #[serde(default)]
    hostname: String,
    port: Option<u16>,
    environment_path: Option<String>,
    node_path: Option<String>,
    bastion_host: Option<String>,
}

impl ApiEnvironment {
    fn into_remote(self, tags: Vec<Tag>) -> RemoteEnvironment {
        RemoteEnvironment {
            environment_id: self.id,
            arn: self.arn,
            name: self.name,
            description: self.description,
            login_name: self.login_name,
            hostname: self.hostname,
            port: self.port,
            environment_path: self.environment_path,
            node_path: self.node_path,
            bastion_host: self.bastion_host,
            tags,
        }
    }
}

#[derive(Debug, Serialize)]
struct ResourceArnRequest {
    #[serde(rename = "ResourceARN")]
    resource_arn: String,
}

#[derive(Debug, Deserialize)]
struct ListTagsResponse {
    #[serde(rename = "Tags", default)]
    tags: Vec<Tag>,
}

#[derive(Debug, Serialize)]
struct TagResourceRequest<'a> {
    #[serde(rename = "ResourceARN")]
    resource_arn: &'a str,
    #[serde(rename = "Tags")]
    tags: &'a [Tag],
}

#[derive(Debug, Serialize)]
struct UntagResourceRequest<'a> {
    #[serde(rename = "ResourceARN")]
    resource_arn: &'a str,
    #[serde(rename = "TagKeys")]
    tag_keys: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteEnvironmentRequest<'a> {
    environment_id: &'a str,
}
