//! # Authorization rules
//!
//! Pure functions deciding what a caller may do, based only on the caller's
//! id and role and the target's id and role. Handlers call the `authorize_*`
//! functions and convert [`AccessError`] into an HTTP response.

use thiserror::Error;
use uuid::Uuid;

use crate::models::Role;

/// The authenticated party performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

/// A user account being viewed, changed or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetUser {
    pub id: Uuid,
    pub role: Role,
}

/// Fields present in a user update request.
///
/// Presence matters, not value: a maker sending `role` equal to its current
/// role is still rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserChanges {
    pub username: bool,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

/// Denied operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Caller lacks the privilege for the operation (403).
    #[error("{0}")]
    Forbidden(&'static str),
    /// Operation aimed at the caller's own account that is never allowed (400).
    #[error("{0}")]
    SelfTarget(&'static str),
}

pub const INSUFFICIENT_PERMISSIONS: &str = "Insufficient permissions";

fn forbid(message: &'static str) -> Result<(), AccessError> {
    Err(AccessError::Forbidden(message))
}

pub fn can_manage_users(role: Role) -> bool {
    role >= Role::Checker
}

pub fn can_create_user(role: Role, new_role: Role) -> bool {
    match role {
        Role::Admin => true,
        Role::Checker => new_role == Role::Maker,
        Role::Maker => false,
    }
}

pub fn can_edit_user(actor: Actor, target: TargetUser) -> bool {
    match actor.role {
        Role::Admin => true,
        Role::Checker => target.role == Role::Maker || target.id == actor.id,
        Role::Maker => target.id == actor.id,
    }
}

pub fn can_delete_user(actor: Actor, target: TargetUser) -> bool {
    actor.role == Role::Admin && actor.id != target.id
}

pub fn can_change_role(role: Role, new_role: Role) -> bool {
    match role {
        Role::Admin => true,
        Role::Checker => new_role == Role::Maker,
        Role::Maker => false,
    }
}

pub fn can_deactivate_user(actor: Actor, target: TargetUser) -> bool {
    if actor.id == target.id {
        return false;
    }
    match actor.role {
        Role::Admin => true,
        Role::Checker => target.role == Role::Maker,
        Role::Maker => false,
    }
}

/// Reviewers see every comparison; everyone else only their own.
pub fn can_access_comparison(actor: Actor, created_by: Uuid) -> bool {
    actor.role.is_reviewer() || actor.id == created_by
}

pub fn can_submit_comparison(role: Role) -> bool {
    matches!(role, Role::Maker | Role::Admin)
}

pub fn can_review_comparison(role: Role) -> bool {
    role.is_reviewer()
}

pub fn can_edit_settings(role: Role) -> bool {
    role.is_reviewer()
}

pub fn authorize_user_management(role: Role) -> Result<(), AccessError> {
    if can_manage_users(role) {
        Ok(())
    } else {
        forbid(INSUFFICIENT_PERMISSIONS)
    }
}

pub fn authorize_user_creation(role: Role, new_role: Role) -> Result<(), AccessError> {
    if !can_manage_users(role) {
        return forbid(INSUFFICIENT_PERMISSIONS);
    }
    if !can_create_user(role, new_role) {
        return forbid("Checkers can only create maker accounts");
    }
    Ok(())
}

/// Makers may only look at their own account.
pub fn authorize_user_view(actor: Actor, target_id: Uuid) -> Result<(), AccessError> {
    if actor.role == Role::Maker && actor.id != target_id {
        return forbid(INSUFFICIENT_PERMISSIONS);
    }
    Ok(())
}

pub fn authorize_user_update(
    actor: Actor,
    target: TargetUser,
    changes: UserChanges,
) -> Result<(), AccessError> {
    if changes.is_active == Some(false) && target.id == actor.id {
        return Err(AccessError::SelfTarget("Cannot deactivate your own account"));
    }

    match actor.role {
        Role::Maker => {
            if target.id != actor.id {
                return forbid(INSUFFICIENT_PERMISSIONS);
            }
            if changes.username || changes.role.is_some() || changes.is_active.is_some() {
                return forbid("Makers can only update their own name");
            }
        }
        Role::Checker => {
            if !can_edit_user(actor, target) {
                return forbid("Checkers cannot modify admin or other checker accounts");
            }
            if changes
                .role
                .is_some_and(|new_role| !can_change_role(actor.role, new_role))
            {
                return forbid("Checkers cannot assign admin or checker roles");
            }
        }
        Role::Admin => {}
    }

    if changes.is_active == Some(false) && !can_deactivate_user(actor, target) {
        return forbid(INSUFFICIENT_PERMISSIONS);
    }

    Ok(())
}

pub fn authorize_user_deletion(actor: Actor, target_id: Uuid) -> Result<(), AccessError> {
    if actor.role != Role::Admin {
        return forbid(INSUFFICIENT_PERMISSIONS);
    }
    if actor.id == target_id {
        return Err(AccessError::SelfTarget("Cannot delete your own account"));
    }
    Ok(())
}

pub fn authorize_comparison_access(actor: Actor, created_by: Uuid) -> Result<(), AccessError> {
    if can_access_comparison(actor, created_by) {
        Ok(())
    } else {
        forbid("You do not have access to this comparison")
    }
}

pub fn authorize_settings_update(role: Role) -> Result<(), AccessError> {
    if can_edit_settings(role) {
        Ok(())
    } else {
        forbid("Only checkers and admins can update settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor {
            id: Uuid::new_v4(),
            role,
        }
    }

    fn target(role: Role) -> TargetUser {
        TargetUser {
            id: Uuid::new_v4(),
            role,
        }
    }

    fn itself(actor: Actor) -> TargetUser {
        TargetUser {
            id: actor.id,
            role: actor.role,
        }
    }

    const ROLES: [Role; 3] = [Role::Maker, Role::Checker, Role::Admin];

    #[test]
    fn role_hierarchy_is_ordered() {
        assert!(Role::Maker < Role::Checker);
        assert!(Role::Checker < Role::Admin);
        assert_eq!(ROLES.map(Role::level), [1, 2, 3]);
    }

    #[test]
    fn only_checkers_and_admins_manage_users() {
        assert!(authorize_user_management(Role::Maker).is_err());
        assert!(authorize_user_management(Role::Checker).is_ok());
        assert!(authorize_user_management(Role::Admin).is_ok());
    }

    #[test]
    fn checker_creates_only_makers() {
        assert!(authorize_user_creation(Role::Checker, Role::Maker).is_ok());
        assert_eq!(
            authorize_user_creation(Role::Checker, Role::Checker),
            Err(AccessError::Forbidden("Checkers can only create maker accounts"))
        );
        assert!(authorize_user_creation(Role::Checker, Role::Admin).is_err());
        for role in ROLES {
            assert!(authorize_user_creation(Role::Admin, role).is_ok());
            assert!(authorize_user_creation(Role::Maker, role).is_err());
        }
    }

    #[test]
    fn maker_cannot_edit_other_users() {
        let maker = actor(Role::Maker);
        for role in ROLES {
            let result = authorize_user_update(maker, target(role), UserChanges::default());
            assert_eq!(result, Err(AccessError::Forbidden(INSUFFICIENT_PERMISSIONS)));
        }
    }

    #[test]
    fn maker_self_edit_is_limited_to_name() {
        let maker = actor(Role::Maker);
        let me = itself(maker);
        assert!(authorize_user_update(maker, me, UserChanges::default()).is_ok());

        let attempts = [
            UserChanges {
                role: Some(Role::Maker),
                ..Default::default()
            },
            UserChanges {
                is_active: Some(true),
                ..Default::default()
            },
            UserChanges {
                username: true,
                ..Default::default()
            },
        ];
        for changes in attempts {
            assert_eq!(
                authorize_user_update(maker, me, changes),
                Err(AccessError::Forbidden("Makers can only update their own name"))
            );
        }
    }

    #[test]
    fn checker_edits_makers_and_self_only() {
        let checker = actor(Role::Checker);
        assert!(authorize_user_update(checker, target(Role::Maker), UserChanges::default()).is_ok());
        assert!(authorize_user_update(checker, itself(checker), UserChanges::default()).is_ok());
        assert!(
            authorize_user_update(checker, target(Role::Checker), UserChanges::default()).is_err()
        );
        assert!(authorize_user_update(checker, target(Role::Admin), UserChanges::default()).is_err());
    }

    #[test]
    fn checker_assigns_only_maker_role() {
        let checker = actor(Role::Checker);
        let maker = target(Role::Maker);
        let promote = UserChanges {
            role: Some(Role::Checker),
            ..Default::default()
        };
        assert_eq!(
            authorize_user_update(checker, maker, promote),
            Err(AccessError::Forbidden("Checkers cannot assign admin or checker roles"))
        );
        let keep = UserChanges {
            role: Some(Role::Maker),
            ..Default::default()
        };
        assert!(authorize_user_update(checker, maker, keep).is_ok());
    }

    #[test]
    fn nobody_deactivates_themselves() {
        let deactivate = UserChanges {
            is_active: Some(false),
            ..Default::default()
        };
        for role in ROLES {
            let me = actor(role);
            assert_eq!(
                authorize_user_update(me, itself(me), deactivate),
                Err(AccessError::SelfTarget("Cannot deactivate your own account"))
            );
            assert!(!can_deactivate_user(me, itself(me)));
        }
    }

    #[test]
    fn deactivation_targets_follow_role() {
        let admin = actor(Role::Admin);
        let checker = actor(Role::Checker);
        for role in ROLES {
            assert!(can_deactivate_user(admin, target(role)));
        }
        assert!(can_deactivate_user(checker, target(Role::Maker)));
        assert!(!can_deactivate_user(checker, target(Role::Checker)));
        assert!(!can_deactivate_user(checker, target(Role::Admin)));
    }

    #[test]
    fn only_admin_deletes_and_never_self() {
        let admin = actor(Role::Admin);
        assert!(authorize_user_deletion(admin, Uuid::new_v4()).is_ok());
        assert_eq!(
            authorize_user_deletion(admin, admin.id),
            Err(AccessError::SelfTarget("Cannot delete your own account"))
        );
        assert!(authorize_user_deletion(actor(Role::Checker), Uuid::new_v4()).is_err());
        assert!(authorize_user_deletion(actor(Role::Maker), Uuid::new_v4()).is_err());
        assert!(!can_delete_user(admin, itself(admin)));
    }

    #[test]
    fn maker_views_only_self() {
        let maker = actor(Role::Maker);
        assert!(authorize_user_view(maker, maker.id).is_ok());
        assert!(authorize_user_view(maker, Uuid::new_v4()).is_err());
        assert!(authorize_user_view(actor(Role::Checker), Uuid::new_v4()).is_ok());
    }

    #[test]
    fn comparison_visibility() {
        let maker = actor(Role::Maker);
        assert!(authorize_comparison_access(maker, maker.id).is_ok());
        assert!(authorize_comparison_access(maker, Uuid::new_v4()).is_err());
        assert!(authorize_comparison_access(actor(Role::Checker), Uuid::new_v4()).is_ok());
        assert!(authorize_comparison_access(actor(Role::Admin), Uuid::new_v4()).is_ok());
    }

    #[test]
    fn workflow_roles() {
        assert!(can_submit_comparison(Role::Maker));
        assert!(can_submit_comparison(Role::Admin));
        assert!(!can_submit_comparison(Role::Checker));
        assert!(!can_review_comparison(Role::Maker));
        assert!(can_review_comparison(Role::Checker));
        assert!(can_review_comparison(Role::Admin));
        assert!(authorize_settings_update(Role::Maker).is_err());
        assert!(authorize_settings_update(Role::Checker).is_ok());
    }
}
