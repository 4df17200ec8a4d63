//! Wiring of repositories and services, built once at startup and shared by
//! every request handler.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::crud::CrudService;
use crate::dashboard::DashboardService;
use crate::events::EventSink;
use crate::modules::{
    currency::{Currency, CurrencyHooks},
    funding::{Funding, FundingHooks},
    investment::{Investment, InvestmentHooks},
    payment::{Payment, PaymentHooks},
    pricing::Pricing,
    transaction::Transaction,
    withdrawal::{Withdrawal, WithdrawalHooks},
};
use crate::relation::RelationResolver;
use crate::repo::SeaOrmRepository;
use crate::repository::{mock::InMemoryRepository, Repository};

#[derive(Clone)]
pub struct Repositories {
    pub currencies: Arc<dyn Repository<Currency>>,
    pub pricings: Arc<dyn Repository<Pricing>>,
    pub investments: Arc<dyn Repository<Investment>>,
    pub fundings: Arc<dyn Repository<Funding>>,
    pub payments: Arc<dyn Repository<Payment>>,
    pub withdrawals: Arc<dyn Repository<Withdrawal>>,
    pub transactions: Arc<dyn Repository<Transaction>>,
}

impl Repositories {
    pub fn sea_orm(db: DatabaseConnection) -> Self {
        Self {
            currencies: Arc::new(SeaOrmRepository::<Currency>::new(db.clone())),
            pricings: Arc::new(SeaOrmRepository::<Pricing>::new(db.clone())),
            investments: Arc::new(SeaOrmRepository::<Investment>::new(db.clone())),
            fundings: Arc::new(SeaOrmRepository::<Funding>::new(db.clone())),
            payments: Arc::new(SeaOrmRepository::<Payment>::new(db.clone())),
            withdrawals: Arc::new(SeaOrmRepository::<Withdrawal>::new(db.clone())),
            transactions: Arc::new(SeaOrmRepository::<Transaction>::new(db)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            currencies: Arc::new(InMemoryRepository::<Currency>::new()),
            pricings: Arc::new(InMemoryRepository::<Pricing>::new()),
            investments: Arc::new(InMemoryRepository::<Investment>::new()),
            fundings: Arc::new(InMemoryRepository::<Funding>::new()),
            payments: Arc::new(InMemoryRepository::<Payment>::new()),
            withdrawals: Arc::new(InMemoryRepository::<Withdrawal>::new()),
            transactions: Arc::new(InMemoryRepository::<Transaction>::new()),
        }
    }
}

pub struct Services {
    pub currencies: Arc<CrudService<Currency>>,
    pub pricings: Arc<CrudService<Pricing>>,
    pub investments: Arc<CrudService<Investment>>,
    pub fundings: Arc<CrudService<Funding>>,
    pub payments: Arc<CrudService<Payment>>,
    pub withdrawals: Arc<CrudService<Withdrawal>>,
    pub transactions: Arc<CrudService<Transaction>>,
    pub dashboard: Arc<DashboardService>,
}

impl Services {
    pub fn build(repos: Repositories, events: Arc<dyn EventSink>) -> Self {
        let resolver = Arc::new(RelationResolver::new(
            repos.currencies.clone(),
            repos.pricings.clone(),
            repos.investments.clone(),
            repos.fundings.clone(),
            repos.payments.clone(),
            repos.withdrawals.clone(),
        ));
        Self {
            currencies: Arc::new(
                CrudService::new(repos.currencies.clone(), events.clone())
                    .with_hooks(Arc::new(CurrencyHooks::new(repos.currencies.clone()))),
            ),
            pricings: Arc::new(CrudService::new(repos.pricings.clone(), events.clone()).with_relations(resolver.clone())),
            investments: Arc::new(
                CrudService::new(repos.investments.clone(), events.clone())
                    .with_hooks(Arc::new(InvestmentHooks))
                    .with_relations(resolver.clone()),
            ),
            fundings: Arc::new(
                CrudService::new(repos.fundings.clone(), events.clone())
                    .with_hooks(Arc::new(FundingHooks))
                    .with_relations(resolver.clone()),
            ),
            payments: Arc::new(
                CrudService::new(repos.payments.clone(), events.clone())
                    .with_hooks(Arc::new(PaymentHooks))
                    .with_relations(resolver.clone()),
            ),
            withdrawals: Arc::new(
                CrudService::new(repos.withdrawals.clone(), events.clone())
                    .with_hooks(Arc::new(WithdrawalHooks))
                    .with_relations(resolver.clone()),
            ),
            transactions: Arc::new(CrudService::new(repos.transactions.clone(), events).with_relations(resolver)),
            dashboard: Arc::new(DashboardService::new(repos.fundings, repos.withdrawals, repos.payments, repos.investments)),
        }
    }
}
