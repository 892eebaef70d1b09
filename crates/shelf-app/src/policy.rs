//! Capability checks keyed on resource kind, action and role of the acting user.
//!
//! Decisions are pure functions of their inputs, there is no state involved.

use shelf_types::claim::Role;
use tracing::debug;

use crate::{
    auth::token::Actor,
    error::{ApiError, ApiResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Anonymous,
    User,
    Admin,
}

impl From<Role> for ActorRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => ActorRole::User,
            Role::Admin => ActorRole::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    User,
    Author,
    AccessToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Index,
    Show,
    Update,
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permit,
    Deny,
}

fn admin_only(role: ActorRole) -> Decision {
    if role == ActorRole::Admin {
        Decision::Permit
    } else {
        Decision::Deny
    }
}

pub fn authorize(kind: ResourceKind, action: Action, role: ActorRole) -> Decision {
    use Action::*;
    match (kind, action) {
        (ResourceKind::User, Create) => Decision::Permit,
        (ResourceKind::User, Index | Show | Update | Destroy) => admin_only(role),

        (ResourceKind::Author, Create | Index | Show) => Decision::Permit,
        (ResourceKind::Author, Update | Destroy) => admin_only(role),

        (ResourceKind::AccessToken, Create) => Decision::Permit,
        (ResourceKind::AccessToken, Destroy) => admin_only(role),
        (ResourceKind::AccessToken, Index | Show | Update) => Decision::Deny,
    }
}

/// Fails with [`ApiError::Forbidden`] when actor is not permitted to perform action
pub fn require(kind: ResourceKind, action: Action, actor: &Actor) -> ApiResult<()> {
    let role = actor.role();
    match authorize(kind, action, role) {
        Decision::Permit => Ok(()),
        Decision::Deny => {
            debug!("Denied {action:?} on {kind:?} for {role:?}");
            Err(ApiError::Forbidden(
                "You are not authorized to perform this action".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: [ActorRole; 3] = [ActorRole::Anonymous, ActorRole::User, ActorRole::Admin];
    const ACTIONS: [Action; 5] = [
        Action::Create,
        Action::Index,
        Action::Show,
        Action::Update,
        Action::Destroy,
    ];

    #[test]
    fn test_create_is_open() {
        for role in ROLES {
            for kind in [
                ResourceKind::User,
                ResourceKind::Author,
                ResourceKind::AccessToken,
            ] {
                assert_eq!(authorize(kind, Action::Create, role), Decision::Permit);
            }
        }
    }

    #[test]
    fn test_user_management_admin_only() {
        for action in &ACTIONS[1..] {
            assert_eq!(
                authorize(ResourceKind::User, *action, ActorRole::Admin),
                Decision::Permit
            );
            assert_eq!(
                authorize(ResourceKind::User, *action, ActorRole::User),
                Decision::Deny
            );
            assert_eq!(
                authorize(ResourceKind::User, *action, ActorRole::Anonymous),
                Decision::Deny
            );
        }
    }

    #[test]
    fn test_author_policy() {
        for role in ROLES {
            assert_eq!(
                authorize(ResourceKind::Author, Action::Index, role),
                Decision::Permit
            );
            assert_eq!(
                authorize(ResourceKind::Author, Action::Show, role),
                Decision::Permit
            );
        }
        assert_eq!(
            authorize(ResourceKind::Author, Action::Update, ActorRole::User),
            Decision::Deny
        );
        assert_eq!(
            authorize(ResourceKind::Author, Action::Destroy, ActorRole::Admin),
            Decision::Permit
        );
    }

    #[test]
    fn test_access_token_policy() {
        assert_eq!(
            authorize(ResourceKind::AccessToken, Action::Destroy, ActorRole::User),
            Decision::Deny
        );
        assert_eq!(
            authorize(ResourceKind::AccessToken, Action::Destroy, ActorRole::Admin),
            Decision::Permit
        );
        assert_eq!(
            authorize(ResourceKind::AccessToken, Action::Index, ActorRole::Admin),
            Decision::Deny
        );
    }

    #[test]
    fn test_require() {
        assert!(require(ResourceKind::User, Action::Create, &Actor::Anonymous).is_ok());
        assert!(matches!(
            require(ResourceKind::User, Action::Index, &Actor::Anonymous),
            Err(ApiError::Forbidden(_))
        ));
    }
}
