//! Allow-listed query filters.
//!
//! Only fields a resource declares filterable survive; anything else in the
//! query string is dropped silently. A comma-separated value matches any of
//! its parts.

use sea_orm::Value;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Query keys consumed by pagination and relation loading, never filters.
pub const RESERVED_KEYS: [&str; 3] = ["page", "per_page", "include"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Uuid,
    Bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterField {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FilterField {
    pub const fn text(name: &'static str) -> Self { Self { name, kind: FieldKind::Text } }
    pub const fn uuid(name: &'static str) -> Self { Self { name, kind: FieldKind::Uuid } }
    pub const fn bool(name: &'static str) -> Self { Self { name, kind: FieldKind::Bool } }

    fn parse(&self, raw: &str) -> Result<Value, ServiceError> {
        match self.kind {
            FieldKind::Text => Ok(Value::from(raw.to_string())),
            FieldKind::Uuid => Uuid::parse_str(raw)
                .map(Value::from)
                .map_err(|_| ServiceError::validation_field(self.name, format!("The {} must be a valid UUID.", self.name))),
            FieldKind::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::from(true)),
                "false" | "0" => Ok(Value::from(false)),
                _ => Err(ServiceError::validation_field(self.name, format!("The {} field must be true or false.", self.name))),
            },
        }
    }
}

/// One column constraint: the column must equal any of `values`.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterCondition {
    pub field: &'static str,
    pub values: Vec<Value>,
}

impl FilterCondition {
    pub fn matches(&self, actual: &Value) -> bool { self.values.iter().any(|v| v == actual) }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterSet {
    conditions: Vec<FilterCondition>,
}

impl FilterSet {
    pub fn new() -> Self { Self::default() }

    /// Keep the pairs whose key is in `allowed`, typed per the field's kind.
    /// Unknown and reserved keys are ignored; empty values are skipped.
    pub fn from_pairs<'a, I>(pairs: I, allowed: &[FilterField]) -> Result<Self, ServiceError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut set = FilterSet::default();
        let mut pairs: Vec<(&str, &str)> = pairs.into_iter().collect();
        pairs.sort_unstable();
        for (key, raw) in pairs {
            if RESERVED_KEYS.contains(&key) {
                continue;
            }
            let Some(field) = allowed.iter().find(|f| f.name == key) else { continue };
            let values = raw
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| field.parse(v))
                .collect::<Result<Vec<_>, _>>()?;
            if values.is_empty() {
                continue;
            }
            set.conditions.push(FilterCondition { field: field.name, values });
        }
        Ok(set)
    }

    /// Add a trusted equality constraint (internal callers only).
    pub fn eq(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.conditions.push(FilterCondition { field, values: vec![value.into()] });
        self
    }

    pub fn conditions(&self) -> &[FilterCondition] { &self.conditions }

    pub fn is_empty(&self) -> bool { self.conditions.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FilterField] = &[FilterField::text("status"), FilterField::uuid("user_id"), FilterField::bool("is_default")];

    #[test]
    fn drops_unknown_and_reserved_keys() {
        let set = FilterSet::from_pairs(
            vec![("status", "pending"), ("password", "x"), ("page", "2"), ("include", "currency")],
            FIELDS,
        )
        .unwrap();
        assert_eq!(set.conditions().len(), 1);
        assert_eq!(set.conditions()[0].field, "status");
    }

    #[test]
    fn comma_values_become_any_of() {
        let set = FilterSet::from_pairs(vec![("status", "pending, completed")], FIELDS).unwrap();
        let cond = &set.conditions()[0];
        assert_eq!(cond.values.len(), 2);
        assert!(cond.matches(&Value::from("completed".to_string())));
        assert!(!cond.matches(&Value::from("failed".to_string())));
    }

    #[test]
    fn typed_fields_are_parsed() {
        let id = Uuid::new_v4();
        let id_text = id.to_string();
        let set = FilterSet::from_pairs(vec![("user_id", id_text.as_str()), ("is_default", "true")], FIELDS).unwrap();
        assert_eq!(set.conditions().len(), 2);
        assert!(set.conditions().iter().any(|c| c.matches(&Value::from(id))));
        assert!(set.conditions().iter().any(|c| c.matches(&Value::from(true))));
    }

    #[test]
    fn bad_typed_value_is_a_validation_error() {
        let err = FilterSet::from_pairs(vec![("user_id", "not-a-uuid")], FIELDS).unwrap_err();
        assert_eq!(err.code(), crate::errors::ErrorCode::ValidationFailed);
        assert!(FilterSet::from_pairs(vec![("is_default", "maybe")], FIELDS).is_err());
    }

    #[test]
    fn empty_values_are_skipped() {
        let set = FilterSet::from_pairs(vec![("status", " , ")], FIELDS).unwrap();
        assert!(set.is_empty());
    }
}
