//! Environment reconciler
//!
//! Composes the state mapper, the tag reconciler and a remote API client
//! into the create/read/update/delete lifecycle. Every operation is a
//! sequence of remote calls that stops at the first error; completed calls
//! are never rolled back.

use crate::action::{ApplyResult, StepKind, UpdatePlan};
use crate::client::{EnvironmentApi, RemoteOperation, Tag};
use crate::error::{CloudError, Result};
use crate::mapper;
use crate::model::EnvironmentRecord;
use crate::tags;
use std::sync::Arc;
use std::time::Instant;

/// Reconciles SSH environments through an injected API client
pub struct EnvironmentReconciler<C: EnvironmentApi + ?Sized> {
    client: Arc<C>,
}

impl<C: EnvironmentApi + ?Sized> Clone for EnvironmentReconciler<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
        }
    }
}

impl<C: EnvironmentApi + ?Sized> EnvironmentReconciler<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// Create an environment and read it back
    pub async fn create(&self, desired: &EnvironmentRecord) -> Result<EnvironmentRecord> {
        let mut log = ApplyResult::new();
        self.create_with_log(desired, &mut log).await
    }

    /// Create an environment, recording completed steps in `log`
    pub async fn create_with_log(
        &self,
        desired: &EnvironmentRecord,
        log: &mut ApplyResult,
    ) -> Result<EnvironmentRecord> {
        let start = Instant::now();
        let result = self.create_steps(desired, log).await;
        log.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    async fn create_steps(
        &self,
        desired: &EnvironmentRecord,
        log: &mut ApplyResult,
    ) -> Result<EnvironmentRecord> {
        let request = mapper::to_wire_create(desired)?;

        tracing::info!("Creating environment: {}", desired.name);
        let id = match self.client.create_environment(&request).await {
            Ok(id) => id,
            Err(e) => {
                log.add_failure(StepKind::Create, e.to_string());
                return Err(CloudError::remote(
                    RemoteOperation::CreateEnvironment,
                    &desired.name,
                    e,
                ));
            }
        };
        log.add_success(
            StepKind::Create,
            format!("Created environment {} (ID: {})", desired.name, id),
        );
        log.created_id = Some(id.clone());

        tracing::debug!("Reading back environment {}", id);
        let remote = match self.fetch(&id).await {
            Ok(remote) => remote,
            Err(e) => {
                log.add_failure(StepKind::ReadBack, e.to_string());
                return Err(e);
            }
        };
        log.add_success(StepKind::ReadBack, format!("Read back environment {}", id));

        let mut record = desired.clone();
        record.id = Some(id);
        record.arn = remote.arn;
        record.port = Some(desired.effective_port());
        if remote.node_path.is_some() {
            record.node_path = remote.node_path;
        }
        if remote.environment_path.is_some() {
            record.environment_path = remote.environment_path;
        }
        Ok(record)
    }

    /// Read an environment by ID
    pub async fn read(&self, id: &str) -> Result<EnvironmentRecord> {
        tracing::debug!("Reading environment {}", id);
        self.fetch(id).await
    }

    /// Adopt an existing environment by ID
    pub async fn import(&self, id: &str) -> Result<EnvironmentRecord> {
        tracing::info!("Importing environment {}", id);
        self.fetch(id).await
    }

    /// Refresh a held record in place. On error the record is untouched.
    pub async fn refresh(&self, held: &mut EnvironmentRecord) -> Result<()> {
        let id = held.id.clone().ok_or_else(|| CloudError::MissingIdentity {
            field: "id",
            name: held.name.clone(),
        })?;
        *held = self.read(&id).await?;
        Ok(())
    }

    /// Plan an update without issuing any remote call
    pub fn plan_update(
        &self,
        current: &EnvironmentRecord,
        desired: &EnvironmentRecord,
    ) -> Result<UpdatePlan> {
        let environment_id = current.id.clone().ok_or_else(|| CloudError::MissingIdentity {
            field: "id",
            name: current.name.clone(),
        })?;
        let arn = current.arn.clone().ok_or_else(|| CloudError::MissingIdentity {
            field: "arn",
            name: current.name.clone(),
        })?;

        let tags = tags::diff(&current.tags, &desired.tags);
        // Reject unrepresentable tags before anything is sent.
        mapper::tags_to_wire(&tags.to_add)?;

        let scalars = mapper::to_wire_update(&environment_id, desired);
        let target = merge_desired(current, desired);
        let changed_fields = changed_fields(current, &target);

        Ok(UpdatePlan {
            environment_id,
            arn,
            scalars,
            tags,
            changed_fields,
            target,
        })
    }

    /// Update an environment towards `desired`
    pub async fn update(
        &self,
        current: &EnvironmentRecord,
        desired: &EnvironmentRecord,
    ) -> Result<EnvironmentRecord> {
        let plan = self.plan_update(current, desired)?;
        let mut log = ApplyResult::new();
        self.apply_update(&plan, &mut log).await
    }

    /// Apply a planned update, recording completed steps in `log`
    ///
    /// If the scalar update succeeds and a tag call fails, the scalar change
    /// stays in place on the provider.
    pub async fn apply_update(
        &self,
        plan: &UpdatePlan,
        log: &mut ApplyResult,
    ) -> Result<EnvironmentRecord> {
        let start = Instant::now();
        let result = self.update_steps(plan, log).await;
        log.duration_ms = start.elapsed().as_millis() as u64;
        if result.is_err() && log.is_partial() {
            tracing::warn!(
                "Update of {} stopped after {:?}; provider state is partially updated",
                plan.environment_id,
                log.completed_steps()
            );
        }
        result
    }

    async fn update_steps(
        &self,
        plan: &UpdatePlan,
        log: &mut ApplyResult,
    ) -> Result<EnvironmentRecord> {
        tracing::info!("Updating environment: {}", plan.environment_id);
        if let Err(e) = self.client.update_environment(&plan.scalars).await {
            log.add_failure(StepKind::UpdateScalars, e.to_string());
            return Err(CloudError::remote(
                RemoteOperation::UpdateEnvironment,
                &plan.environment_id,
                e,
            ));
        }
        log.add_success(
            StepKind::UpdateScalars,
            format!("Updated environment {}", plan.environment_id),
        );

        if !plan.tags.to_remove.is_empty() {
            let keys = plan.tags.removed_keys();
            tracing::info!("Untagging {}: {:?}", plan.arn, keys);
            if let Err(e) = self.client.untag_resource(&plan.arn, &keys).await {
                log.add_failure(StepKind::Untag, e.to_string());
                return Err(CloudError::remote(
                    RemoteOperation::UntagResource,
                    &plan.arn,
                    e,
                ));
            }
            log.add_success(StepKind::Untag, format!("Removed {} tags", keys.len()));
        }

        if !plan.tags.to_add.is_empty() {
            let tags: Vec<Tag> = mapper::tags_to_wire(&plan.tags.to_add)?;
            tracing::info!("Tagging {}: {} tags", plan.arn, tags.len());
            if let Err(e) = self.client.tag_resource(&plan.arn, &tags).await {
                log.add_failure(StepKind::Tag, e.to_string());
                return Err(CloudError::remote(
                    RemoteOperation::TagResource,
                    &plan.arn,
                    e,
                ));
            }
            log.add_success(StepKind::Tag, format!("Applied {} tags", tags.len()));
        }

        Ok(plan.target.clone())
    }

    /// Delete an environment. No existence check is made first.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut log = ApplyResult::new();
        self.delete_with_log(id, &mut log).await
    }

    /// Delete an environment, recording the step in `log`
    pub async fn delete_with_log(&self, id: &str, log: &mut ApplyResult) -> Result<()> {
        let start = Instant::now();
        tracing::info!("Deleting environment: {}", id);
        let result = match self.client.delete_environment(id).await {
            Ok(()) => {
                log.add_success(StepKind::Delete, format!("Deleted environment {}", id));
                Ok(())
            }
            Err(e) => {
                log.add_failure(StepKind::Delete, e.to_string());
                Err(CloudError::remote(RemoteOperation::DeleteEnvironment, id, e))
            }
        };
        log.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    async fn fetch(&self, id: &str) -> Result<EnvironmentRecord> {
        let mut environments = self
            .client
            .list_environments_by_id(id)
            .await
            .map_err(|e| CloudError::remote(RemoteOperation::ListEnvironments, id, e))?;

        match environments.len() {
            0 => Err(CloudError::NotFound(id.to_string())),
            1 => mapper::from_wire(&environments.remove(0)),
            count => Err(CloudError::AmbiguousRecord {
                id: id.to_string(),
                count,
            }),
        }
    }
}

/// Overlay the fields present in `desired` onto `current`
fn merge_desired(current: &EnvironmentRecord, desired: &EnvironmentRecord) -> EnvironmentRecord {
    EnvironmentRecord {
        id: current.id.clone(),
        arn: current.arn.clone(),
        name: desired.name.clone(),
        description: desired.description.clone().or_else(|| current.description.clone()),
        login_name: desired.login_name.clone(),
        hostname: desired.hostname.clone(),
        port: desired
            .port
            .filter(|p| *p != 0)
            .or(current.port)
            .or(Some(desired.effective_port())),
        environment_path: desired
            .environment_path
            .clone()
            .or_else(|| current.environment_path.clone()),
        node_path: desired.node_path.clone().or_else(|| current.node_path.clone()),
        bastion_url: desired.bastion_url.clone().or_else(|| current.bastion_url.clone()),
        tags: desired.tags.clone(),
    }
}

fn changed_fields(current: &EnvironmentRecord, target: &EnvironmentRecord) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if current.name != target.name {
        fields.push("name");
    }
    if current.description != target.description {
        fields.push("description");
    }
    if current.login_name != target.login_name {
        fields.push("login_name");
    }
    if current.hostname != target.hostname {
        fields.push("hostname");
    }
    if current.port != target.port {
        fields.push("port");
    }
    if current.environment_path != target.environment_path {
        fields.push("environment_path");
    }
    if current.node_path != target.node_path {
        fields.push("node_path");
    }
    if current.bastion_url != target.bastion_url {
        fields.push("bastion_url");
    }
    fields
}
