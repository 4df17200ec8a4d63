use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub module: Option<String>,
}

#[derive(ToSchema)]
pub struct EnvelopeDoc {
    pub message: String,
    #[schema(value_type = Object)]
    pub data: Option<serde_json::Value>,
}

#[derive(ToSchema)]
pub struct ErrorEnvelopeDoc {
    pub message: String,
    #[schema(value_type = Object)]
    pub errors: serde_json::Value,
    /// One of NOT_FOUND, VALIDATION_FAILED, AUTHORIZATION_DENIED, INVALID_TYPE,
    /// BUSINESS_RULE_VIOLATION, UNEXPECTED.
    pub code: String,
}

#[derive(ToSchema)]
pub struct ModuleStatisticsDoc {
    pub total: u64,
    pub completed: u64,
}

#[derive(ToSchema)]
pub struct DashboardStatisticsDoc {
    pub fundings: ModuleStatisticsDoc,
    pub withdrawals: ModuleStatisticsDoc,
    pub payments: ModuleStatisticsDoc,
    pub investments: ModuleStatisticsDoc,
}

#[derive(ToSchema)]
pub struct CreateFundingDoc {
    pub user_id: Option<Uuid>,
    pub currency_id: Uuid,
    pub amount: String,
    /// `investment` or `pricing`
    pub fundable_type: Option<String>,
    pub fundable_id: Option<Uuid>,
}

#[derive(ToSchema)]
pub struct CreatePaymentDoc {
    pub user_id: Option<Uuid>,
    pub currency_id: Uuid,
    pub amount: String,
    pub method: String,
    /// `funding`, `withdrawal` or `investment`
    pub payable_type: Option<String>,
    pub payable_id: Option<Uuid>,
}

#[derive(ToSchema)]
pub struct CreateWithdrawalDoc {
    pub user_id: Option<Uuid>,
    pub currency_id: Uuid,
    pub amount: String,
    pub destination: String,
    pub note: Option<String>,
}

#[derive(ToSchema)]
pub struct CreateCurrencyDoc {
    pub name: String,
    pub symbol: String,
    pub code: String,
    pub is_default: bool,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::extensions::default_currency,
        crate::extensions::dashboard_statistics,
    ),
    components(
        schemas(
            HealthResponse,
            EnvelopeDoc,
            ErrorEnvelopeDoc,
            ModuleStatisticsDoc,
            DashboardStatisticsDoc,
            CreateFundingDoc,
            CreatePaymentDoc,
            CreateWithdrawalDoc,
            CreateCurrencyDoc,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "currency"),
        (name = "dashboard")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/health"));
        assert!(doc.paths.paths.contains_key("/dashboard/statistics"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
