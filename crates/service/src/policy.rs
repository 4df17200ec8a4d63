//! Ownership scoping and per-action authorization.
//!
//! Owned resources (those with an owner column) are visible only to their
//! owner unless the caller holds an elevated role. Shared resources are
//! readable by everyone and writable only by elevated callers.

use uuid::Uuid;

use crate::{errors::ServiceError, resource::Resource};

/// The authenticated caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub roles: Vec<String>,
    elevated: bool,
}

impl Principal {
    /// `elevated_roles` comes from `[auth] elevated_roles`.
    pub fn new(id: Uuid, roles: Vec<String>, elevated_roles: &[String]) -> Self {
        let elevated = roles.iter().any(|r| elevated_roles.iter().any(|e| e.eq_ignore_ascii_case(r)));
        Self { id, roles, elevated }
    }

    pub fn user(id: Uuid) -> Self { Self { id, roles: Vec::new(), elevated: false } }

    pub fn admin(id: Uuid) -> Self { Self { id, roles: vec!["admin".into()], elevated: true } }

    pub fn is_elevated(&self) -> bool { self.elevated }
}

/// Row visibility applied to every read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    All,
    Owner(Uuid),
}

impl Scope {
    pub fn for_principal<R: Resource>(principal: &Principal) -> Scope {
        if principal.is_elevated() || R::owner_column().is_none() {
            Scope::All
        } else {
            Scope::Owner(principal.id)
        }
    }

    pub fn permits(&self, owner: Option<Uuid>) -> bool {
        match self {
            Scope::All => true,
            Scope::Owner(id) => owner == Some(*id),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
    Complete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Complete => "complete",
        }
    }
}

pub fn authorize<R: Resource>(principal: &Principal, action: Action, record: Option<&R::Record>) -> Result<(), ServiceError> {
    if principal.is_elevated() {
        return Ok(());
    }
    let denied = || ServiceError::Forbidden(format!("You are not allowed to {} this {}.", action.as_str(), R::LABEL.to_lowercase()));
    let owned = R::owner_column().is_some();
    match action {
        Action::Complete => Err(denied()),
        Action::View if !owned => Ok(()),
        _ if !owned => Err(denied()),
        Action::Create => Ok(()),
        _ => match record.and_then(R::owner) {
            Some(owner) if owner == principal.id => Ok(()),
            _ => Err(denied()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;
    use crate::modules::{currency::Currency, withdrawal::Withdrawal};
    use crate::test_support::{currency_record, withdrawal_record};

    #[test]
    fn elevated_roles_are_configurable() {
        let id = Uuid::new_v4();
        let roles = vec!["super-admin".to_string()];
        assert!(Principal::new(id, roles.clone(), &["super-admin".into()]).is_elevated());
        assert!(!Principal::new(id, roles, &["admin".into()]).is_elevated());
        assert!(!Principal::user(id).is_elevated());
    }

    #[test]
    fn scope_follows_ownership() {
        let user = Principal::user(Uuid::new_v4());
        assert_eq!(Scope::for_principal::<Withdrawal>(&user), Scope::Owner(user.id));
        assert_eq!(Scope::for_principal::<Currency>(&user), Scope::All);
        assert_eq!(Scope::for_principal::<Withdrawal>(&Principal::admin(Uuid::new_v4())), Scope::All);
        assert!(Scope::Owner(user.id).permits(Some(user.id)));
        assert!(!Scope::Owner(user.id).permits(Some(Uuid::new_v4())));
        assert!(!Scope::Owner(user.id).permits(None));
    }

    #[test]
    fn owners_may_change_their_own_records() {
        let user = Principal::user(Uuid::new_v4());
        let mine = withdrawal_record(user.id, "pending");
        let theirs = withdrawal_record(Uuid::new_v4(), "pending");
        assert!(authorize::<Withdrawal>(&user, Action::Update, Some(&mine)).is_ok());
        assert!(authorize::<Withdrawal>(&user, Action::Create, None).is_ok());
        let err = authorize::<Withdrawal>(&user, Action::Delete, Some(&theirs)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AuthorizationDenied);
    }

    #[test]
    fn completion_requires_elevation() {
        let user = Principal::user(Uuid::new_v4());
        let mine = withdrawal_record(user.id, "pending");
        assert!(authorize::<Withdrawal>(&user, Action::Complete, Some(&mine)).is_err());
        assert!(authorize::<Withdrawal>(&Principal::admin(Uuid::new_v4()), Action::Complete, Some(&mine)).is_ok());
    }

    #[test]
    fn shared_resources_are_read_only_for_users() {
        let user = Principal::user(Uuid::new_v4());
        let usd = currency_record("USD", true);
        assert!(authorize::<Currency>(&user, Action::View, Some(&usd)).is_ok());
        assert!(authorize::<Currency>(&user, Action::Create, None).is_err());
        assert!(authorize::<Currency>(&user, Action::Update, Some(&usd)).is_err());
    }
}
