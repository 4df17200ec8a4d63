use std::marker::PhantomData;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Select,
};
use tracing::warn;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::filter::FilterSet;
use crate::pagination::{Page, Pagination};
use crate::policy::Scope;
use crate::repository::Repository;
use crate::resource::{column_named, Resource};

pub struct SeaOrmRepository<R: Resource> {
    pub db: DatabaseConnection,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> SeaOrmRepository<R> {
    pub fn new(db: DatabaseConnection) -> Self { Self { db, _resource: PhantomData } }

    fn filtered(filters: &FilterSet, scope: Scope) -> Select<R::Entity> {
        let mut select = R::Entity::find();
        for cond in filters.conditions() {
            let Some(col) = column_named::<R>(cond.field) else {
                warn!(module = R::MODULE, field = cond.field, "filter_column_unknown");
                continue;
            };
            select = match cond.values.as_slice() {
                [single] => select.filter(col.eq(single.clone())),
                many => select.filter(col.is_in(many.iter().cloned())),
            };
        }
        with_ownership_filter::<R>(select, scope)
    }
}

/// Restrict `select` to the scope's owner when the resource is owned.
pub fn with_ownership_filter<R: Resource>(select: Select<R::Entity>, scope: Scope) -> Select<R::Entity> {
    match (scope, R::owner_column()) {
        (Scope::Owner(owner), Some(col)) => select.filter(col.eq(owner)),
        _ => select,
    }
}

fn db_err(e: sea_orm::DbErr) -> ServiceError { ServiceError::Db(e.to_string()) }

#[async_trait::async_trait]
impl<R: Resource> Repository<R> for SeaOrmRepository<R> {
    async fn list(&self, filters: &FilterSet, page: Pagination, scope: Scope) -> Result<Page<R::Record>, ServiceError> {
        let (idx, per_page) = page.normalize();
        let (order_col, order) = R::default_order();
        let paginator = Self::filtered(filters, scope)
            .order_by(order_col, order)
            .order_by_asc(R::id_column())
            .paginate(&self.db, per_page);
        let total = paginator.num_items().await.map_err(db_err)?;
        let items = paginator.fetch_page(idx).await.map_err(db_err)?;
        Ok(Page::new(items, total, page))
    }

    async fn count(&self, filters: &FilterSet, scope: Scope) -> Result<u64, ServiceError> {
        Self::filtered(filters, scope).count(&self.db).await.map_err(db_err)
    }

    async fn find(&self, id: Uuid, scope: Scope) -> Result<Option<R::Record>, ServiceError> {
        Self::filtered(&FilterSet::new(), scope)
            .filter(R::id_column().eq(id))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    async fn create(&self, input: R::Create) -> Result<R::Record, ServiceError> {
        let active = R::build(input)?;
        active.insert(&self.db).await.map_err(db_err)
    }

    async fn update(&self, id: Uuid, input: R::Update) -> Result<R::Record, ServiceError> {
        let existing = self.find(id, Scope::All).await?.ok_or_else(|| ServiceError::not_found(R::LABEL))?;
        let mut active: R::Active = existing.into_active_model();
        R::apply(&mut active, input)?;
        active.update(&self.db).await.map_err(db_err)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = R::Entity::delete_many()
            .filter(R::id_column().eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected > 0)
    }
}
