use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::filter::FilterSet;
use crate::pagination::{Page, Pagination};
use crate::policy::Scope;
use crate::resource::Resource;

/// Persistence abstraction shared by every resource.
///
/// Reads take a `Scope`; writes assume the caller already checked ownership.
#[async_trait]
pub trait Repository<R: Resource>: Send + Sync {
    /// Filtered page in the resource's default order, newest first.
    async fn list(&self, filters: &FilterSet, page: Pagination, scope: Scope) -> Result<Page<R::Record>, ServiceError>;
    async fn count(&self, filters: &FilterSet, scope: Scope) -> Result<u64, ServiceError>;
    async fn find(&self, id: Uuid, scope: Scope) -> Result<Option<R::Record>, ServiceError>;
    async fn create(&self, input: R::Create) -> Result<R::Record, ServiceError>;
    /// Fails with `NotFound` when no record has `id`.
    async fn update(&self, id: Uuid, input: R::Update) -> Result<R::Record, ServiceError>;
    /// `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
}

/// In-memory repository used by tests and `memory://` deployments
pub mod mock {
    use super::*;
    use std::cmp::Ordering;

    use sea_orm::{IntoActiveModel, ModelTrait, Order, TryIntoModel, Value};
    use tokio::sync::RwLock;

    use crate::resource::column_named;

    pub struct InMemoryRepository<R: Resource> {
        rows: RwLock<Vec<R::Record>>, // insertion order, oldest first
    }

    impl<R: Resource> Default for InMemoryRepository<R> {
        fn default() -> Self { Self { rows: RwLock::new(Vec::new()) } }
    }

    impl<R: Resource> InMemoryRepository<R> {
        pub fn new() -> Self { Self::default() }

        pub async fn seed(&self, records: impl IntoIterator<Item = R::Record>) {
            self.rows.write().await.extend(records);
        }

        pub async fn len(&self) -> usize { self.rows.read().await.len() }

        pub async fn is_empty(&self) -> bool { self.rows.read().await.is_empty() }

        fn matches(record: &R::Record, filters: &FilterSet, scope: Scope) -> bool {
            scope.permits(R::owner(record))
                && filters.conditions().iter().all(|cond| match column_named::<R>(cond.field) {
                    Some(col) => cond.matches(&record.get(col)),
                    None => true,
                })
        }
    }

    /// Ordering for the column kinds used as sort keys. NULLs sort first,
    /// mismatched kinds compare equal.
    fn compare_values(a: &Value, b: &Value) -> Ordering {
        match (a, b) {
            (Value::ChronoDateTimeWithTimeZone(a), Value::ChronoDateTimeWithTimeZone(b)) => a.cmp(b),
            (Value::ChronoDateTimeUtc(a), Value::ChronoDateTimeUtc(b)) => a.cmp(b),
            (Value::ChronoDateTime(a), Value::ChronoDateTime(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Uuid(a), Value::Uuid(b)) => a.cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (Value::BigInt(a), Value::BigInt(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }

    #[async_trait]
    impl<R: Resource> Repository<R> for InMemoryRepository<R> {
        async fn list(&self, filters: &FilterSet, page: Pagination, scope: Scope) -> Result<Page<R::Record>, ServiceError> {
            let rows = self.rows.read().await;
            let (order_col, order) = R::default_order();
            // newest insert first, so ties keep the most recent record on top
            let mut matching: Vec<&R::Record> = rows.iter().rev().filter(|r| Self::matches(r, filters, scope)).collect();
            matching.sort_by(|a, b| {
                let ord = compare_values(&a.get(order_col), &b.get(order_col));
                if matches!(order, Order::Desc) { ord.reverse() } else { ord }
            });
            let (idx, per_page) = page.normalize();
            let items = matching
                .iter()
                .skip((idx * per_page) as usize)
                .take(per_page as usize)
                .map(|r| (*r).clone())
                .collect();
            Ok(Page::new(items, matching.len() as u64, page))
        }

        async fn count(&self, filters: &FilterSet, scope: Scope) -> Result<u64, ServiceError> {
            let rows = self.rows.read().await;
            Ok(rows.iter().filter(|r| Self::matches(r, filters, scope)).count() as u64)
        }

        async fn find(&self, id: Uuid, scope: Scope) -> Result<Option<R::Record>, ServiceError> {
            let rows = self.rows.read().await;
            Ok(rows.iter().find(|r| R::id(r) == id && scope.permits(R::owner(r))).cloned())
        }

        async fn create(&self, input: R::Create) -> Result<R::Record, ServiceError> {
            let record = R::build(input)?.try_into_model()?;
            let mut rows = self.rows.write().await;
            if rows.iter().any(|r| R::id(r) == R::id(&record)) {
                return Err(ServiceError::Db(format!("duplicate id {}", R::id(&record))));
            }
            rows.push(record.clone());
            Ok(record)
        }

        async fn update(&self, id: Uuid, input: R::Update) -> Result<R::Record, ServiceError> {
            let mut rows = self.rows.write().await;
            let slot = rows
                .iter_mut()
                .find(|r| R::id(r) == id)
                .ok_or_else(|| ServiceError::not_found(R::LABEL))?;
            let mut active: R::Active = slot.clone().into_active_model();
            R::apply(&mut active, input)?;
            let updated = active.try_into_model()?;
            *slot = updated.clone();
            Ok(updated)
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            let mut rows = self.rows.write().await;
            let before = rows.len();
            rows.retain(|r| R::id(r) != id);
            Ok(rows.len() != before)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::InMemoryRepository;
    use super::*;
    use crate::errors::ErrorCode;
    use crate::modules::withdrawal::{UpdateWithdrawal, Withdrawal};
    use crate::test_support::{create_withdrawal, withdrawal_record};

    #[tokio::test]
    async fn list_is_scoped_and_newest_first() {
        let repo = InMemoryRepository::<Withdrawal>::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let first = repo.create(create_withdrawal(alice)).await.unwrap();
        repo.create(create_withdrawal(bob)).await.unwrap();
        let last = repo.create(create_withdrawal(alice)).await.unwrap();

        let page = repo.list(&FilterSet::new(), Pagination::default(), Scope::Owner(alice)).await.unwrap();
        assert_eq!(page.meta.total, 2);
        assert_eq!(page.items[0].id, last.id);
        assert_eq!(page.items[1].id, first.id);

        let all = repo.list(&FilterSet::new(), Pagination::default(), Scope::All).await.unwrap();
        assert_eq!(all.meta.total, 3);
    }

    #[tokio::test]
    async fn list_follows_the_declared_order_not_insertion() {
        let repo = InMemoryRepository::<Withdrawal>::new();
        let owner = Uuid::new_v4();
        let mut old = withdrawal_record(owner, "pending");
        old.created_at = old.created_at - chrono::Duration::days(2);
        let mut newest = withdrawal_record(owner, "pending");
        newest.created_at = newest.created_at + chrono::Duration::days(1);
        let middle = withdrawal_record(owner, "pending");
        repo.seed([newest.clone(), old.clone(), middle.clone()]).await;

        let page = repo.list(&FilterSet::new(), Pagination::default(), Scope::All).await.unwrap();
        let ids: Vec<Uuid> = page.items.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![newest.id, middle.id, old.id]);
    }

    #[tokio::test]
    async fn list_applies_filters_and_pages() {
        let repo = InMemoryRepository::<Withdrawal>::new();
        let owner = Uuid::new_v4();
        repo.seed((0..5).map(|i| withdrawal_record(owner, if i % 2 == 0 { "pending" } else { "completed" }))).await;

        let pending = FilterSet::new().eq("status", "pending".to_string());
        assert_eq!(repo.count(&pending, Scope::All).await.unwrap(), 3);

        let page = repo.list(&FilterSet::new(), Pagination::new(2, 2), Scope::All).await.unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.meta.last_page, 3);
    }

    #[tokio::test]
    async fn find_hides_foreign_records() {
        let repo = InMemoryRepository::<Withdrawal>::new();
        let owner = Uuid::new_v4();
        let created = repo.create(create_withdrawal(owner)).await.unwrap();
        assert!(repo.find(created.id, Scope::Owner(owner)).await.unwrap().is_some());
        assert!(repo.find(created.id, Scope::Owner(Uuid::new_v4())).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_and_delete_missing_records() {
        let repo = InMemoryRepository::<Withdrawal>::new();
        let err = repo.update(Uuid::new_v4(), UpdateWithdrawal::default()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(!repo.delete(Uuid::new_v4()).await.unwrap());
    }

    #[tokio::test]
    async fn update_only_touches_supplied_fields() {
        let repo = InMemoryRepository::<Withdrawal>::new();
        let created = repo.create(create_withdrawal(Uuid::new_v4())).await.unwrap();
        let input = UpdateWithdrawal { note: Some("weekly payout".into()), ..Default::default() };
        let updated = repo.update(created.id, input).await.unwrap();
        assert_eq!(updated.note.as_deref(), Some("weekly payout"));
        assert_eq!(updated.destination, created.destination);
        assert_eq!(updated.amount, created.amount);
        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.is_empty().await);
    }
}
