use uuid::Uuid;
use validator::Validate;

use crate::errors::ErrorCode;
use crate::filter::FilterSet;
use crate::modules::currency::{CreateCurrency, UpdateCurrency};
use crate::modules::funding::CreateFunding;
use crate::modules::investment::CreateInvestment;
use crate::modules::payment::CreatePayment;
use crate::modules::pricing::CreatePricing;
use crate::modules::transaction::CreateTransaction;
use crate::modules::withdrawal::UpdateWithdrawal;
use crate::pagination::Pagination;
use crate::policy::{Principal, Scope};
use crate::repository::Repository;
use crate::test_support::{amount, create_withdrawal, services};
use models::status::WithdrawalStatus;

fn currency(code: &str, is_default: bool) -> CreateCurrency {
    CreateCurrency { name: format!("{} currency", code), symbol: "$".into(), code: code.into(), is_default }
}

#[tokio::test]
async fn only_one_currency_stays_default() {
    let (svc, _) = services();
    let admin = Principal::admin(Uuid::new_v4());

    let none = svc.currencies.default_currency().await;
    assert_eq!(none.code(), Some(ErrorCode::NotFound));

    let usd = svc.currencies.create(&admin, currency("usd", true)).await.into_data().unwrap().record;
    assert_eq!(usd.code, "USD");
    let eur = svc.currencies.create(&admin, currency("EUR", true)).await.into_data().unwrap().record;

    let default = svc.currencies.default_currency().await.into_data().unwrap();
    assert_eq!(default.id, eur.id);
    let defaults = svc.currencies.repository().count(&FilterSet::new().eq("is_default", true), Scope::All).await.unwrap();
    assert_eq!(defaults, 1);

    let promote = UpdateCurrency { is_default: Some(true), ..Default::default() };
    assert!(svc.currencies.update(&admin, usd.id, promote).await.is_success());
    assert_eq!(svc.currencies.default_currency().await.into_data().unwrap().id, usd.id);
}

#[tokio::test]
async fn currency_codes_are_unique() {
    let (svc, _) = services();
    let admin = Principal::admin(Uuid::new_v4());
    assert!(svc.currencies.create(&admin, currency("GBP", false)).await.is_success());
    let dup = svc.currencies.create(&admin, currency("gbp", false)).await;
    assert_eq!(dup.code(), Some(ErrorCode::ValidationFailed));
    assert_eq!(dup.errors().unwrap()["code"][0], "The code has already been taken.");
}

#[tokio::test]
async fn shared_data_is_read_only_for_users() {
    let (svc, _) = services();
    let admin = Principal::admin(Uuid::new_v4());
    let user = Principal::user(Uuid::new_v4());
    let chf = svc.currencies.create(&admin, currency("CHF", false)).await.into_data().unwrap().record;

    assert_eq!(svc.currencies.create(&user, currency("JPY", false)).await.code(), Some(ErrorCode::AuthorizationDenied));
    assert_eq!(svc.currencies.delete(&user, chf.id).await.code(), Some(ErrorCode::AuthorizationDenied));
    let listed = svc.currencies.list(&user, FilterSet::new(), Pagination::default(), &[]).await;
    assert_eq!(listed.into_data().unwrap().meta.total, 1);
    assert!(svc.currencies.get(&user, chf.id, &[]).await.is_success());
}

#[tokio::test]
async fn unknown_payable_type_is_rejected_before_writing() {
    let (svc, _) = services();
    let user = Principal::user(Uuid::new_v4());
    let input = CreatePayment {
        user_id: Some(user.id),
        currency_id: Uuid::new_v4(),
        amount: amount("12.5"),
        method: "card".into(),
        payable_type: Some("bogus".into()),
        payable_id: Some(Uuid::new_v4()),
    };
    let env = svc.payments.create(&user, input).await;
    assert_eq!(env.code(), Some(ErrorCode::InvalidType));
    assert_eq!(env.message(), "The selected payable_type is invalid.");
    assert_eq!(svc.payments.repository().count(&FilterSet::new(), Scope::All).await.unwrap(), 0);
}

#[tokio::test]
async fn unknown_transactable_type_is_rejected() {
    let (svc, _) = services();
    let admin = Principal::admin(Uuid::new_v4());
    let input = CreateTransaction {
        user_id: Some(Uuid::new_v4()),
        amount: amount("1"),
        kind: None,
        description: None,
        transactable_type: "user".into(),
        transactable_id: Uuid::new_v4(),
    };
    assert_eq!(svc.transactions.create(&admin, input).await.code(), Some(ErrorCode::InvalidType));
}

#[tokio::test]
async fn relations_are_loaded_on_request() {
    let (svc, _) = services();
    let admin = Principal::admin(Uuid::new_v4());
    let user = Principal::user(Uuid::new_v4());
    let usd = svc.currencies.create(&admin, currency("USD", true)).await.into_data().unwrap().record;
    let pricing = svc
        .pricings
        .create(&admin, CreatePricing { name: "Gold".into(), currency_id: usd.id, amount: amount("500"), status: None })
        .await
        .into_data()
        .unwrap();
    assert_eq!(serde_json::to_value(&pricing).unwrap()["currency"]["code"], "USD");

    let investment = svc
        .investments
        .create(
            &user,
            CreateInvestment { user_id: Some(user.id), pricing_id: Some(pricing.record.id), currency_id: usd.id, amount: amount("500") },
        )
        .await
        .into_data()
        .unwrap()
        .record;

    let funding = svc
        .fundings
        .create(
            &user,
            CreateFunding {
                user_id: Some(user.id),
                currency_id: usd.id,
                amount: amount("500"),
                fundable_type: Some("investment".into()),
                fundable_id: Some(investment.id),
            },
        )
        .await
        .into_data()
        .unwrap()
        .record;

    let plain = serde_json::to_value(svc.fundings.get(&user, funding.id, &[]).await.into_data().unwrap()).unwrap();
    assert_eq!(plain["currency"]["code"], "USD");
    assert!(plain.get("fundable").is_none());

    let includes = vec!["fundable".to_string(), "unknown".to_string()];
    let full = serde_json::to_value(svc.fundings.get(&user, funding.id, &includes).await.into_data().unwrap()).unwrap();
    assert_eq!(full["fundable_type"], "investment");
    assert_eq!(full["fundable"]["id"], investment.id.to_string());
    assert!(full.get("unknown").is_none());
}

#[tokio::test]
async fn missing_relation_targets_are_null() {
    let (svc, _) = services();
    let user = Principal::user(Uuid::new_v4());
    let input = CreateFunding {
        user_id: Some(user.id),
        currency_id: Uuid::new_v4(),
        amount: amount("5"),
        fundable_type: None,
        fundable_id: None,
    };
    let id = svc.fundings.create(&user, input).await.into_data().unwrap().record.id;
    let includes = vec!["fundable".to_string()];
    let value = serde_json::to_value(svc.fundings.get(&user, id, &includes).await.into_data().unwrap()).unwrap();
    assert!(value["fundable"].is_null());
    assert!(value["currency"].is_null());
}

#[tokio::test]
async fn approved_withdrawals_cannot_be_deleted() {
    let (svc, _) = services();
    let admin = Principal::admin(Uuid::new_v4());
    let id = svc.withdrawals.create(&admin, create_withdrawal(Uuid::new_v4())).await.into_data().unwrap().record.id;
    let approve = UpdateWithdrawal { status: Some(WithdrawalStatus::Approved), ..Default::default() };
    assert!(svc.withdrawals.update(&admin, id, approve).await.is_success());
    assert_eq!(svc.withdrawals.delete(&admin, id).await.code(), Some(ErrorCode::BusinessRuleViolation));
}

#[tokio::test]
async fn dashboard_counts_are_scoped() {
    let (svc, _) = services();
    let admin = Principal::admin(Uuid::new_v4());
    let alice = Principal::user(Uuid::new_v4());
    let bob = Principal::user(Uuid::new_v4());
    let first = svc.withdrawals.create(&alice, create_withdrawal(alice.id)).await.into_data().unwrap().record.id;
    svc.withdrawals.create(&alice, create_withdrawal(alice.id)).await;
    svc.withdrawals.create(&bob, create_withdrawal(bob.id)).await;
    assert!(svc.withdrawals.complete(&admin, first).await.is_success());

    let mine = svc.dashboard.statistics(&alice).await.into_data().unwrap();
    assert_eq!(mine.withdrawals.total, 2);
    assert_eq!(mine.withdrawals.completed, 1);
    assert_eq!(mine.fundings.total, 0);

    let everything = svc.dashboard.statistics(&admin).await.into_data().unwrap();
    assert_eq!(everything.withdrawals.total, 3);
}

#[tokio::test]
async fn invalid_amounts_fail_validation() {
    let (svc, _) = services();
    let user = Principal::user(Uuid::new_v4());
    let mut input = create_withdrawal(user.id);
    input.amount = amount("-3");
    let env = svc.withdrawals.create(&user, input).await;
    assert_eq!(env.code(), Some(ErrorCode::ValidationFailed));
}

#[tokio::test]
async fn polymorphic_links_respect_ownership() {
    let (svc, _) = services();
    let alice = Principal::user(Uuid::new_v4());
    let mallory = Principal::user(Uuid::new_v4());
    let admin = Principal::admin(Uuid::new_v4());
    let withdrawal = svc.withdrawals.create(&alice, create_withdrawal(alice.id)).await.into_data().unwrap().record;
    assert_eq!(svc.withdrawals.get(&mallory, withdrawal.id, &[]).await.code(), Some(ErrorCode::NotFound));

    let link = |user_id: Uuid| CreateTransaction {
        user_id: Some(user_id),
        amount: amount("1"),
        kind: None,
        description: None,
        transactable_type: "withdrawal".into(),
        transactable_id: withdrawal.id,
    };
    let denied = svc.transactions.create(&mallory, link(mallory.id)).await;
    assert_eq!(denied.code(), Some(ErrorCode::ValidationFailed));
    assert!(denied.errors().unwrap().get("transactable_id").is_some());
    assert_eq!(svc.transactions.repository().count(&FilterSet::new(), Scope::All).await.unwrap(), 0);

    // an elevated caller may link it on mallory's behalf; mallory still cannot read through it
    let tx = svc.transactions.create(&admin, link(mallory.id)).await.into_data().unwrap().record;
    let includes = vec!["transactable".to_string()];
    let seen = serde_json::to_value(svc.transactions.get(&mallory, tx.id, &includes).await.into_data().unwrap()).unwrap();
    assert!(seen["transactable"].is_null());
    assert_eq!(seen["transactable_id"], withdrawal.id.to_string());

    let full = serde_json::to_value(svc.transactions.get(&admin, tx.id, &includes).await.into_data().unwrap()).unwrap();
    assert_eq!(full["transactable"]["destination"], "GB29NWBK60161331926819");
}

#[tokio::test]
async fn links_to_missing_records_are_rejected() {
    let (svc, _) = services();
    let user = Principal::user(Uuid::new_v4());
    let input = CreateFunding {
        user_id: Some(user.id),
        currency_id: Uuid::new_v4(),
        amount: amount("5"),
        fundable_type: Some("investment".into()),
        fundable_id: Some(Uuid::new_v4()),
    };
    let env = svc.fundings.create(&user, input).await;
    assert_eq!(env.code(), Some(ErrorCode::ValidationFailed));
    assert_eq!(env.message(), "The selected fundable_id is invalid.");
}

#[tokio::test]
async fn padded_currency_codes_are_normalised() {
    let (svc, _) = services();
    let admin = Principal::admin(Uuid::new_v4());
    let padded = currency(" usd ", false);
    assert!(padded.validate().is_ok());
    let created = svc.currencies.create(&admin, padded).await;
    assert!(created.is_success(), "{}", created.message());
    assert_eq!(created.into_data().unwrap().record.code, "USD");

    let dup = svc.currencies.create(&admin, currency("USD", false)).await;
    assert_eq!(dup.code(), Some(ErrorCode::ValidationFailed));
    assert!(currency("us", false).validate().is_ok());
    assert_eq!(svc.currencies.create(&admin, currency("us", false)).await.code(), Some(ErrorCode::ValidationFailed));
}
