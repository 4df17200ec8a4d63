//! Generic CRUD orchestration.
//!
//! `CrudService` runs every operation through the same pipeline: scope the
//! read, authorize, run the lifecycle hooks, persist, raise completion events,
//! and finally wrap the outcome in a `ResponseEnvelope`. Failures never escape
//! as `Err`; they come back as failed envelopes.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::envelope::ResponseEnvelope;
use crate::errors::{ErrorCode, ServiceError};
use crate::events::{DomainEvent, EventSink};
use crate::filter::FilterSet;
use crate::pagination::{Page, Pagination};
use crate::policy::{authorize, Action, Principal, Scope};
use crate::relation::RelationResolver;
use crate::repository::Repository;
use crate::resource::Resource;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Delete,
    Complete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
            Operation::Complete => "complete",
        }
    }
}

/// Per-resource hooks around the write path. Every hook defaults to a no-op.
#[async_trait]
pub trait Lifecycle<R: Resource>: Send + Sync {
    async fn before_create(&self, _principal: &Principal, _input: &mut R::Create) -> Result<(), ServiceError> { Ok(()) }

    async fn after_create(&self, _record: &R::Record) -> Result<(), ServiceError> { Ok(()) }

    async fn before_update(&self, _principal: &Principal, _current: &R::Record, _input: &mut R::Update) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn after_update(&self, _record: &R::Record) -> Result<(), ServiceError> { Ok(()) }

    async fn before_delete(&self, _principal: &Principal, _record: &R::Record) -> Result<(), ServiceError> { Ok(()) }

    /// Event for a record that just became terminal. Called at most once per
    /// transition, never for records that were already terminal.
    fn completed(&self, _record: &R::Record, _operation: Operation) -> Option<DomainEvent> { None }
}

pub struct NoHooks;

impl<R: Resource> Lifecycle<R> for NoHooks {}

/// A record with its requested relations inlined next to its own fields.
#[derive(Debug, Clone, Serialize)]
pub struct Hydrated<T> {
    #[serde(flatten)]
    pub record: T,
    #[serde(flatten)]
    pub relations: BTreeMap<String, Value>,
}

pub struct CrudService<R: Resource> {
    repo: Arc<dyn Repository<R>>,
    hooks: Arc<dyn Lifecycle<R>>,
    events: Arc<dyn EventSink>,
    relations: Option<Arc<RelationResolver>>,
}

impl<R: Resource> CrudService<R> {
    pub fn new(repo: Arc<dyn Repository<R>>, events: Arc<dyn EventSink>) -> Self {
        Self { repo, hooks: Arc::new(NoHooks), events, relations: None }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn Lifecycle<R>>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_relations(mut self, resolver: Arc<RelationResolver>) -> Self {
        self.relations = Some(resolver);
        self
    }

    pub fn repository(&self) -> &Arc<dyn Repository<R>> { &self.repo }

    #[instrument(skip(self, principal, filters, includes), fields(module = R::MODULE, principal = %principal.id))]
    pub async fn list(
        &self,
        principal: &Principal,
        filters: FilterSet,
        page: Pagination,
        includes: &[String],
    ) -> ResponseEnvelope<Page<Hydrated<R::Record>>> {
        let result = self.try_list(principal, &filters, page, includes).await;
        respond::<R, _>(Operation::List, &format!("filters={:?}", filters.conditions()), result, format!("{} list retrieved successfully", R::LABEL))
    }

    #[instrument(skip(self, principal, includes), fields(module = R::MODULE, principal = %principal.id))]
    pub async fn get(&self, principal: &Principal, id: Uuid, includes: &[String]) -> ResponseEnvelope<Hydrated<R::Record>> {
        let result = self.try_get(principal, id, includes).await;
        respond::<R, _>(Operation::Get, &format!("id={}", id), result, format!("{} retrieved successfully", R::LABEL))
    }

    #[instrument(skip(self, principal, input), fields(module = R::MODULE, principal = %principal.id))]
    pub async fn create(&self, principal: &Principal, input: R::Create) -> ResponseEnvelope<Hydrated<R::Record>> {
        let result = self.try_create(principal, input).await;
        respond::<R, _>(Operation::Create, "new", result, format!("{} created successfully", R::LABEL))
    }

    #[instrument(skip(self, principal, input), fields(module = R::MODULE, principal = %principal.id))]
    pub async fn update(&self, principal: &Principal, id: Uuid, input: R::Update) -> ResponseEnvelope<Hydrated<R::Record>> {
        let result = self.try_update(principal, id, input).await;
        respond::<R, _>(Operation::Update, &format!("id={}", id), result, format!("{} updated successfully", R::LABEL))
    }

    #[instrument(skip(self, principal), fields(module = R::MODULE, principal = %principal.id))]
    pub async fn delete(&self, principal: &Principal, id: Uuid) -> ResponseEnvelope<()> {
        let result = self.try_delete(principal, id).await;
        respond::<R, _>(Operation::Delete, &format!("id={}", id), result, format!("{} deleted successfully", R::LABEL))
    }

    /// Move a record to its terminal status. Elevated callers only.
    #[instrument(skip(self, principal), fields(module = R::MODULE, principal = %principal.id))]
    pub async fn complete(&self, principal: &Principal, id: Uuid) -> ResponseEnvelope<Hydrated<R::Record>> {
        let result = self.try_complete(principal, id).await;
        respond::<R, _>(Operation::Complete, &format!("id={}", id), result, format!("{} completed successfully", R::LABEL))
    }

    async fn try_list(
        &self,
        principal: &Principal,
        filters: &FilterSet,
        page: Pagination,
        includes: &[String],
    ) -> Result<Page<Hydrated<R::Record>>, ServiceError> {
        let scope = Scope::for_principal::<R>(principal);
        let page = self.repo.list(filters, page, scope).await?;
        let mut items = Vec::with_capacity(page.items.len());
        for record in page.items {
            items.push(self.hydrate(principal, record, includes).await?);
        }
        Ok(Page { items, meta: page.meta })
    }

    async fn try_get(&self, principal: &Principal, id: Uuid, includes: &[String]) -> Result<Hydrated<R::Record>, ServiceError> {
        let record = self.load(principal, id).await?;
        authorize::<R>(principal, Action::View, Some(&record))?;
        self.hydrate(principal, record, includes).await
    }

    async fn try_create(&self, principal: &Principal, mut input: R::Create) -> Result<Hydrated<R::Record>, ServiceError> {
        authorize::<R>(principal, Action::Create, None)?;
        self.hooks.before_create(principal, &mut input).await?;
        self.ensure_references_visible(principal, &input).await?;
        let record = self.repo.create(input).await?;
        info!(module = R::MODULE, id = %R::id(&record), "record_created");
        if let Err(e) = self.hooks.after_create(&record).await {
            warn_after_hook::<R>(Operation::Create, &record, &e);
        }
        if R::is_terminal(&record) {
            self.raise_completed(&record, Operation::Create);
        }
        self.hydrate(principal, record, &[]).await
    }

    async fn try_update(&self, principal: &Principal, id: Uuid, input: R::Update) -> Result<Hydrated<R::Record>, ServiceError> {
        let current = self.load(principal, id).await?;
        authorize::<R>(principal, Action::Update, Some(&current))?;
        let record = self.apply_update(principal, current, input, Operation::Update).await?;
        self.hydrate(principal, record, &[]).await
    }

    async fn try_delete(&self, principal: &Principal, id: Uuid) -> Result<(), ServiceError> {
        let current = self.load(principal, id).await?;
        authorize::<R>(principal, Action::Delete, Some(&current))?;
        self.hooks.before_delete(principal, &current).await?;
        if !self.repo.delete(id).await? {
            return Err(ServiceError::not_found(R::LABEL));
        }
        info!(module = R::MODULE, id = %id, "record_deleted");
        Ok(())
    }

    async fn try_complete(&self, principal: &Principal, id: Uuid) -> Result<Hydrated<R::Record>, ServiceError> {
        let current = self.load(principal, id).await?;
        authorize::<R>(principal, Action::Complete, Some(&current))?;
        let input = R::completion().ok_or_else(|| ServiceError::BusinessRule(format!("{} cannot be completed.", R::LABEL)))?;
        let record = self.apply_update(principal, current, input, Operation::Complete).await?;
        self.hydrate(principal, record, &[]).await
    }

    /// Scoped lookup; records outside the caller's scope read as missing.
    async fn load(&self, principal: &Principal, id: Uuid) -> Result<R::Record, ServiceError> {
        self.repo
            .find(id, Scope::for_principal::<R>(principal))
            .await?
            .ok_or_else(|| ServiceError::not_found(R::LABEL))
    }

    async fn apply_update(
        &self,
        principal: &Principal,
        current: R::Record,
        mut input: R::Update,
        operation: Operation,
    ) -> Result<R::Record, ServiceError> {
        if R::is_terminal(&current) {
            return Err(ServiceError::BusinessRule(format!(
                "{} has already reached a final status and can no longer be changed.",
                R::LABEL
            )));
        }
        self.hooks.before_update(principal, &current, &mut input).await?;
        let record = self.repo.update(R::id(&current), input).await?;
        info!(module = R::MODULE, id = %R::id(&record), operation = operation.as_str(), "record_updated");
        if let Err(e) = self.hooks.after_update(&record).await {
            warn_after_hook::<R>(operation, &record, &e);
        }
        if R::is_terminal(&record) {
            self.raise_completed(&record, operation);
        }
        Ok(record)
    }

    fn raise_completed(&self, record: &R::Record, operation: Operation) {
        let Some(event) = self.hooks.completed(record, operation) else { return };
        let kind = event.kind.clone();
        match self.events.publish(event) {
            Ok(()) => info!(module = R::MODULE, id = %R::id(record), kind = %kind, "domain_event_published"),
            Err(e) => error!(module = R::MODULE, id = %R::id(record), kind = %kind, error = %e, "domain_event_publish_failed"),
        }
    }

    /// Polymorphic ids on a create must name a record the caller can read.
    async fn ensure_references_visible(&self, principal: &Principal, input: &R::Create) -> Result<(), ServiceError> {
        let references = R::references(input)?;
        let Some(resolver) = &self.relations else { return Ok(()) };
        for (field, target) in references {
            if resolver.resolve(principal, target).await?.is_null() {
                return Err(ServiceError::validation_field(field, format!("The selected {} is invalid.", field)));
            }
        }
        Ok(())
    }

    async fn hydrate(&self, principal: &Principal, record: R::Record, includes: &[String]) -> Result<Hydrated<R::Record>, ServiceError> {
        let mut relations = BTreeMap::new();
        if let Some(resolver) = &self.relations {
            for (name, slot) in R::relations(&record) {
                if !R::WITH.contains(&name) && !includes.iter().any(|i| i == name) {
                    continue;
                }
                let value = match slot? {
                    Some(target) => resolver.resolve(principal, target).await?,
                    None => Value::Null,
                };
                relations.insert(name.to_string(), value);
            }
        }
        Ok(Hydrated { record, relations })
    }
}

/// The write already landed; an after-hook failure is logged, not returned.
fn warn_after_hook<R: Resource>(operation: Operation, record: &R::Record, err: &ServiceError) {
    warn!(
        module = R::MODULE,
        id = %R::id(record),
        operation = operation.as_str(),
        error = %err,
        "after_hook_failed_record_persisted"
    );
}

/// Wrap an operation outcome, logging unexpected failures with their context.
pub(crate) fn respond<R: Resource, T>(
    operation: Operation,
    context: &str,
    result: Result<T, ServiceError>,
    message: String,
) -> ResponseEnvelope<T> {
    match result {
        Ok(data) => ResponseEnvelope::success(data, message),
        Err(err) => {
            if err.code() == ErrorCode::Unexpected {
                error!(module = R::MODULE, operation = operation.as_str(), context, error = %err, "service_operation_failed");
            } else {
                debug!(module = R::MODULE, operation = operation.as_str(), context, code = err.code().as_str(), "service_operation_rejected");
            }
            ResponseEnvelope::from_error(&err)
        }
    }
}
