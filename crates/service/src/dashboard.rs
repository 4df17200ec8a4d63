use std::sync::Arc;

use serde::Serialize;
use tracing::instrument;

use crate::crud::{respond, Operation};
use crate::envelope::ResponseEnvelope;
use crate::errors::ServiceError;
use crate::filter::FilterSet;
use crate::modules::{funding::Funding, investment::Investment, payment::Payment, withdrawal::Withdrawal};
use crate::policy::{Principal, Scope};
use crate::repository::Repository;
use crate::resource::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleStatistics {
    pub total: u64,
    pub completed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStatistics {
    pub fundings: ModuleStatistics,
    pub withdrawals: ModuleStatistics,
    pub payments: ModuleStatistics,
    pub investments: ModuleStatistics,
}

/// Per-module totals, scoped to the caller like any other read.
pub struct DashboardService {
    fundings: Arc<dyn Repository<Funding>>,
    withdrawals: Arc<dyn Repository<Withdrawal>>,
    payments: Arc<dyn Repository<Payment>>,
    investments: Arc<dyn Repository<Investment>>,
}

impl DashboardService {
    pub fn new(
        fundings: Arc<dyn Repository<Funding>>,
        withdrawals: Arc<dyn Repository<Withdrawal>>,
        payments: Arc<dyn Repository<Payment>>,
        investments: Arc<dyn Repository<Investment>>,
    ) -> Self {
        Self { fundings, withdrawals, payments, investments }
    }

    #[instrument(skip(self, principal), fields(principal = %principal.id))]
    pub async fn statistics(&self, principal: &Principal) -> ResponseEnvelope<DashboardStatistics> {
        let result = self.try_statistics(principal).await;
        respond::<Funding, _>(Operation::List, "dashboard", result, "Dashboard statistics retrieved successfully".into())
    }

    async fn try_statistics(&self, principal: &Principal) -> Result<DashboardStatistics, ServiceError> {
        Ok(DashboardStatistics {
            fundings: module_stats(self.fundings.as_ref(), principal, "completed").await?,
            withdrawals: module_stats(self.withdrawals.as_ref(), principal, "completed").await?,
            payments: module_stats(self.payments.as_ref(), principal, "successful").await?,
            investments: module_stats(self.investments.as_ref(), principal, "completed").await?,
        })
    }
}

async fn module_stats<R: Resource>(repo: &dyn Repository<R>, principal: &Principal, terminal: &str) -> Result<ModuleStatistics, ServiceError> {
    let scope = Scope::for_principal::<R>(principal);
    let total = repo.count(&FilterSet::new(), scope).await?;
    let completed = repo.count(&FilterSet::new().eq("status", terminal.to_string()), scope).await?;
    Ok(ModuleStatistics { total, completed })
}
