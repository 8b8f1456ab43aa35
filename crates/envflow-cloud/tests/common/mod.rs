use async_trait::async_trait;
use envflow_cloud::{
    ApiError, ApiResult, CreateEnvironmentRequest, EnvironmentApi, RemoteEnvironment,
    RemoteOperation, Tag, UpdateEnvironmentRequest,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

/// Calls observed by the fake provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(String),
    List(String),
    Update(String),
    Tag(String, Vec<Tag>),
    Untag(String, Vec<String>),
    Delete(String),
}

/// In-memory provider with a call log and failure injection
#[derive(Default)]
pub struct FakeEnvironmentApi {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    environments: BTreeMap<String, RemoteEnvironment>,
    calls: Vec<Call>,
    failing: HashSet<RemoteOperation>,
    next_id: u32,
    default_node_path: Option<String>,
    echo_tags: bool,
    duplicate_listing: bool,
}

#[allow(dead_code)]
impl FakeEnvironmentApi {
    pub fn new() -> Self {
        let api = Self::default();
        api.inner.lock().unwrap().echo_tags = true;
        api
    }

    /// Provider that fills in `nodePath` when the request omits it
    pub fn with_default_node_path(path: &str) -> Self {
        let api = Self::new();
        api.inner.lock().unwrap().default_node_path = Some(path.to_string());
        api
    }

    /// Make every call of `operation` fail
    pub fn fail_on(&self, operation: RemoteOperation) {
        self.inner.lock().unwrap().failing.insert(operation);
    }

    /// Stop returning tags from list calls
    pub fn hide_tags(&self) {
        self.inner.lock().unwrap().echo_tags = false;
    }

    /// Return every environment twice from list calls
    pub fn duplicate_listing(&self) {
        self.inner.lock().unwrap().duplicate_listing = true;
    }

    /// Forget an environment without recording a call
    pub fn forget(&self, id: &str) {
        self.inner.lock().unwrap().environments.remove(id);
    }

    pub fn insert(&self, environment: RemoteEnvironment) {
        self.inner
            .lock()
            .unwrap()
            .environments
            .insert(environment.environment_id.clone(), environment);
    }

    pub fn get(&self, id: &str) -> Option<RemoteEnvironment> {
        self.inner.lock().unwrap().environments.get(id).cloned()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    fn record(&self, call: Call, operation: RemoteOperation) -> ApiResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        if inner.failing.contains(&operation) {
            return Err(ApiError::with_code(
                "InternalServerErrorException",
                format!("injected failure in {}", operation),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl EnvironmentApi for FakeEnvironmentApi {
    async fn create_environment(&self, request: &CreateEnvironmentRequest) -> ApiResult<String> {
        self.record(
            Call::Create(request.name.clone()),
            RemoteOperation::CreateEnvironment,
        )?;

        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = format!("env-{:04}", inner.next_id);
        let node_path = request
            .node_path
            .clone()
            .or_else(|| inner.default_node_path.clone());
        let environment = RemoteEnvironment {
            environment_id: id.clone(),
            arn: format!("arn:aws:cloud9:us-east-1:123456789012:environment:{}", id),
            name: request.name.clone(),
            description: request.description.clone(),
            login_name: request.login_name.clone(),
            hostname: request.hostname.clone(),
            port: Some(request.port),
            environment_path: Some(
                request
                    .environment_path
                    .clone()
                    .unwrap_or_else(|| format!("/home/{}", request.login_name)),
            ),
            node_path,
            bastion_host: request.bastion_host.clone(),
            tags: request.tags.clone(),
        };
        inner.environments.insert(id.clone(), environment);
        Ok(id)
    }

    async fn list_environments_by_id(&self, id: &str) -> ApiResult<Vec<RemoteEnvironment>> {
        self.record(Call::List(id.to_string()), RemoteOperation::ListEnvironments)?;

        let inner = self.inner.lock().unwrap();
        let mut result: Vec<RemoteEnvironment> = inner
            .environments
            .get(id)
            .cloned()
            .map(|mut env| {
                if !inner.echo_tags {
                    env.tags.clear();
                }
                env
            })
            .into_iter()
            .collect();
        if inner.duplicate_listing {
            result.extend(result.clone());
        }
        Ok(result)
    }

    async fn update_environment(&self, request: &UpdateEnvironmentRequest) -> ApiResult<()> {
        self.record(
            Call::Update(request.environment_id.clone()),
            RemoteOperation::UpdateEnvironment,
        )?;

        let mut inner = self.inner.lock().unwrap();
        let env = inner
            .environments
            .get_mut(&request.environment_id)
            .ok_or_else(|| ApiError::with_code("NotFoundException", "environment not found"))?;
        if let Some(name) = &request.name {
            env.name = name.clone();
        }
        if let Some(description) = &request.description {
            env.description = Some(description.clone());
        }
        if let Some(login_name) = &request.login_name {
            env.login_name = login_name.clone();
        }
        if let Some(hostname) = &request.hostname {
            env.hostname = hostname.clone();
        }
        if let Some(port) = request.port {
            env.port = Some(port);
        }
        if let Some(path) = &request.environment_path {
            env.environment_path = Some(path.clone());
        }
        if let Some(path) = &request.node_path {
            env.node_path = Some(path.clone());
        }
        if let Some(host) = &request.bastion_host {
            env.bastion_host = Some(host.clone());
        }
        Ok(())
    }

    async fn tag_resource(&self, arn: &str, tags: &[Tag]) -> ApiResult<()> {
        self.record(
            Call::Tag(arn.to_string(), tags.to_vec()),
            RemoteOperation::TagResource,
        )?;

        let mut inner = self.inner.lock().unwrap();
        let env = inner
            .environments
            .values_mut()
            .find(|e| e.arn == arn)
            .ok_or_else(|| ApiError::with_code("NotFoundException", "resource not found"))?;
        for tag in tags {
            env.tags.retain(|t| t.key != tag.key);
            env.tags.push(tag.clone());
        }
        Ok(())
    }

    async fn untag_resource(&self, arn: &str, keys: &[String]) -> ApiResult<()> {
        self.record(
            Call::Untag(arn.to_string(), keys.to_vec()),
            RemoteOperation::UntagResource,
        )?;

        let mut inner = self.inner.lock().unwrap();
        let env = inner
            .environments
            .values_mut()
            .find(|e| e.arn == arn)
            .ok_or_else(|| ApiError::with_code("NotFoundException", "resource not found"))?;
        env.tags.retain(|t| !keys.contains(&t.key));
        Ok(())
    }

    async fn delete_environment(&self, id: &str) -> ApiResult<()> {
        self.record(
            Call::Delete(id.to_string()),
            RemoteOperation::DeleteEnvironment,
        )?;

        let mut inner = self.inner.lock().unwrap();
        match inner.environments.remove(id) {
            Some(_) => Ok(()),
            None => Err(ApiError::with_code(
                "NotFoundException",
                format!("environment {} not found", id),
            )),
        }
    }
}
