//! Declarative per-entity configuration consumed by the generic repository,
//! service and controller.

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, EntityTrait, FromQueryResult, IdenStatic, IntoActiveModel, Iterable,
    ModelTrait, Order, TryIntoModel,
};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    errors::ServiceError,
    filter::FilterField,
    policy::Principal,
    relation::Target,
};

pub type Column<R> = <<R as Resource>::Entity as EntityTrait>::Column;

/// A relation slot on a record. `Ok(None)` is a null reference; an error
/// means the stored reference could not be interpreted.
pub type RelationRef = Result<Option<Target>, ServiceError>;

pub trait Resource: Send + Sync + Sized + 'static {
    type Entity: EntityTrait<Model = Self::Record>;
    type Record: ModelTrait<Entity = Self::Entity>
        + FromQueryResult
        + IntoActiveModel<Self::Active>
        + Serialize
        + Clone
        + Send
        + Sync
        + 'static;
    type Active: ActiveModelTrait<Entity = Self::Entity>
        + ActiveModelBehavior
        + TryIntoModel<Self::Record>
        + Send
        + Sync
        + 'static;
    /// Mass-assignable fields accepted on create.
    type Create: DeserializeOwned + Validate + Send + Sync + 'static;
    /// Mass-assignable fields accepted on update.
    type Update: DeserializeOwned + Validate + Send + Sync + 'static;

    /// Module name used in routes, logs and events.
    const MODULE: &'static str;
    /// Human-facing name used in messages.
    const LABEL: &'static str;
    const FILTERS: &'static [FilterField];
    /// Relations loaded on every read.
    const WITH: &'static [&'static str] = &[];

    fn id_column() -> Column<Self>;

    /// `None` marks shared reference data with no per-user scoping.
    fn owner_column() -> Option<Column<Self>> { None }

    fn default_order() -> (Column<Self>, Order);

    fn id(record: &Self::Record) -> Uuid;

    fn owner(_record: &Self::Record) -> Option<Uuid> { None }

    /// Terminal records are immutable.
    fn is_terminal(_record: &Self::Record) -> bool { false }

    /// Turn a validated create input into a fully populated active model.
    fn build(input: Self::Create) -> Result<Self::Active, ServiceError>;

    fn apply(active: &mut Self::Active, input: Self::Update) -> Result<(), ServiceError>;

    /// Controller hook run before the create reaches the service.
    fn before_store(_input: &mut Self::Create, _principal: &Principal) {}

    /// Update applied by the `complete` operation; `None` if not completable.
    fn completion() -> Option<Self::Update> { None }

    fn relations(_record: &Self::Record) -> Vec<(&'static str, RelationRef)> { Vec::new() }

    /// Polymorphic targets named by a create input, keyed by their id field.
    fn references(_input: &Self::Create) -> Result<Vec<(&'static str, Target)>, ServiceError> { Ok(Vec::new()) }
}

/// Resolve a column by its snake_case name.
pub fn column_named<R: Resource>(name: &str) -> Option<Column<R>> {
    <Column<R> as Iterable>::iter().find(|c| c.as_str() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::funding::Funding;
    use models::funding;

    #[test]
    fn columns_resolve_by_name() {
        assert!(matches!(column_named::<Funding>("fundable_type"), Some(funding::Column::FundableType)));
        assert!(matches!(column_named::<Funding>("user_id"), Some(funding::Column::UserId)));
        assert!(column_named::<Funding>("password").is_none());
    }

    #[test]
    fn declared_filters_exist_as_columns() {
        use crate::modules::{
            currency::Currency, investment::Investment, payment::Payment, pricing::Pricing,
            transaction::Transaction, withdrawal::Withdrawal,
        };
        fn check<R: Resource>() {
            for field in R::FILTERS {
                assert!(column_named::<R>(field.name).is_some(), "{}.{}", R::MODULE, field.name);
            }
        }
        check::<Currency>();
        check::<Pricing>();
        check::<Investment>();
        check::<Funding>();
        check::<Payment>();
        check::<Withdrawal>();
        check::<Transaction>();
    }
}
