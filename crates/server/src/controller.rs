//! Generic HTTP handlers shared by every resource.
//!
//! Each handler extracts its input, calls the matching `CrudService`
//! operation, optionally reshapes a successful payload through the
//! registered `Transformer`, and renders the envelope.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Extension;
use serde::de::DeserializeOwned;
use serde_json::Value;
use service::filter::FilterSet;
use service::pagination::Pagination;
use service::{CrudService, Principal, Resource, ResponseEnvelope, ServiceError};
use uuid::Uuid;
use validator::Validate;

use crate::errors::envelope_response;
use crate::state::PageLimits;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControllerAction {
    Index,
    Show,
    Store,
    Update,
    Destroy,
    Complete,
}

/// Projection of a record to its external shape for one action.
pub trait Transformer: Send + Sync {
    fn transform(&self, action: ControllerAction, item: Value) -> Value;
}

pub struct Controller<R: Resource> {
    service: Arc<CrudService<R>>,
    transformer: Option<Arc<dyn Transformer>>,
    limits: PageLimits,
}

impl<R: Resource> Clone for Controller<R> {
    fn clone(&self) -> Self {
        Self { service: self.service.clone(), transformer: self.transformer.clone(), limits: self.limits }
    }
}

impl<R: Resource> Controller<R> {
    pub fn new(service: Arc<CrudService<R>>, limits: PageLimits) -> Self { Self { service, transformer: None, limits } }

    pub fn with_transformer(mut self, transformer: Arc<dyn Transformer>) -> Self {
        self.transformer = Some(transformer);
        self
    }

    fn render(&self, action: ControllerAction, mut envelope: ResponseEnvelope<Value>, ok: StatusCode) -> Response {
        if let (Some(transformer), true) = (&self.transformer, envelope.is_success()) {
            if let Some(data) = envelope.data().cloned() {
                envelope.set_data(transform(transformer.as_ref(), action, data));
            }
        }
        envelope_response(envelope, ok)
    }
}

/// Listings are transformed item by item; everything else as a whole.
fn transform(transformer: &dyn Transformer, action: ControllerAction, mut data: Value) -> Value {
    if action == ControllerAction::Index {
        if let Some(items) = data.get_mut("items").and_then(Value::as_array_mut) {
            for item in items.iter_mut() {
                *item = transformer.transform(action, item.take());
            }
        }
        return data;
    }
    transformer.transform(action, data)
}

fn failure(err: ServiceError) -> Response { envelope_response(ResponseEnvelope::from_error(&err), StatusCode::OK) }

fn decode<T: DeserializeOwned + Validate>(body: &[u8]) -> Result<T, ServiceError> {
    let input: T = serde_json::from_slice(body)
        .map_err(|e| ServiceError::validation(format!("The request body is invalid: {}", e)))?;
    input.validate()?;
    Ok(input)
}

/// Malformed ids cannot match anything, so they read as missing.
fn parse_id<R: Resource>(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::not_found(R::LABEL))
}

fn includes(query: &HashMap<String, String>) -> Vec<String> {
    query
        .get("include")
        .map(|raw| raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect())
        .unwrap_or_default()
}

pub async fn index<R: Resource>(
    State(ctl): State<Controller<R>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let filters = match FilterSet::from_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())), R::FILTERS) {
        Ok(filters) => filters,
        Err(e) => return failure(e),
    };
    let page = Pagination::from_query(
        query.get("page").map(String::as_str),
        query.get("per_page").map(String::as_str),
        ctl.limits.default_per_page,
        ctl.limits.max_per_page,
    );
    let envelope = ctl.service.list(&principal, filters, page, &includes(&query)).await;
    ctl.render(ControllerAction::Index, envelope.into_json(), StatusCode::OK)
}

pub async fn show<R: Resource>(
    State(ctl): State<Controller<R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let id = match parse_id::<R>(&id) {
        Ok(id) => id,
        Err(e) => return failure(e),
    };
    let envelope = ctl.service.get(&principal, id, &includes(&query)).await;
    ctl.render(ControllerAction::Show, envelope.into_json(), StatusCode::OK)
}

pub async fn store<R: Resource>(
    State(ctl): State<Controller<R>>,
    Extension(principal): Extension<Principal>,
    body: Bytes,
) -> Response {
    let mut input = match decode::<R::Create>(&body) {
        Ok(input) => input,
        Err(e) => return failure(e),
    };
    R::before_store(&mut input, &principal);
    let envelope = ctl.service.create(&principal, input).await;
    ctl.render(ControllerAction::Store, envelope.into_json(), StatusCode::CREATED)
}

pub async fn update<R: Resource>(
    State(ctl): State<Controller<R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let id = match parse_id::<R>(&id) {
        Ok(id) => id,
        Err(e) => return failure(e),
    };
    let input = match decode::<R::Update>(&body) {
        Ok(input) => input,
        Err(e) => return failure(e),
    };
    let envelope = ctl.service.update(&principal, id, input).await;
    ctl.render(ControllerAction::Update, envelope.into_json(), StatusCode::OK)
}

pub async fn destroy<R: Resource>(
    State(ctl): State<Controller<R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id::<R>(&id) {
        Ok(id) => id,
        Err(e) => return failure(e),
    };
    let envelope = ctl.service.delete(&principal, id).await;
    ctl.render(ControllerAction::Destroy, envelope.into_json(), StatusCode::OK)
}

pub async fn complete<R: Resource>(
    State(ctl): State<Controller<R>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id::<R>(&id) {
        Ok(id) => id,
        Err(e) => return failure(e),
    };
    let envelope = ctl.service.complete(&principal, id).await;
    ctl.render(ControllerAction::Complete, envelope.into_json(), StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use service::modules::funding::CreateFunding;

    struct Upper;

    impl Transformer for Upper {
        fn transform(&self, _action: ControllerAction, item: Value) -> Value {
            json!({ "name": item["name"].as_str().unwrap_or_default().to_uppercase() })
        }
    }

    #[test]
    fn index_transforms_each_item() {
        let page = json!({ "items": [{"name": "a"}, {"name": "b"}], "meta": {"total": 2} });
        let out = transform(&Upper, ControllerAction::Index, page);
        assert_eq!(out["items"][1]["name"], "B");
        assert_eq!(out["meta"]["total"], 2);
        let one = transform(&Upper, ControllerAction::Show, json!({"name": "c"}));
        assert_eq!(one["name"], "C");
    }

    #[test]
    fn decode_rejects_bad_json_and_invalid_fields() {
        assert!(decode::<CreateFunding>(b"{not json").is_err());
        let body = json!({ "currency_id": Uuid::new_v4(), "amount": "-1" }).to_string();
        let err = decode::<CreateFunding>(body.as_bytes()).unwrap_err();
        assert_eq!(err.code(), service::ErrorCode::ValidationFailed);
        let body = json!({ "currency_id": Uuid::new_v4(), "amount": "12.50" }).to_string();
        assert!(decode::<CreateFunding>(body.as_bytes()).is_ok());
    }

    #[test]
    fn include_list_is_split_and_trimmed() {
        let mut query = HashMap::new();
        query.insert("include".to_string(), "currency, fundable,,".to_string());
        assert_eq!(includes(&query), vec!["currency".to_string(), "fundable".to_string()]);
    }
}
