use uuid::Uuid;

use crate::auth::extractors::CurrentUser;

/// Outcome of an authorization check. Every handler consumes these
/// directly; there is no role branching hidden in routing middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    ForbiddenRole,
    ForbiddenOwnership,
}

/// A user may cancel their own reservation; an admin may cancel anyone's.
pub fn cancel_own(requester: &CurrentUser, owner_id: Uuid) -> Decision {
    if requester.role.is_admin() || requester.id == owner_id {
        Decision::Allow
    } else {
        Decision::ForbiddenOwnership
    }
}

/// Gate for the admin cancellation surface.
pub fn admin_only(requester: &CurrentUser) -> Decision {
    if requester.role.is_admin() {
        Decision::Allow
    } else {
        Decision::ForbiddenRole
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;

    fn user_with(role: Role) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "maria".into(),
            name: "Maria Lima".into(),
            role,
        }
    }

    #[test]
    fn owner_may_cancel_own() {
        let owner = user_with(Role::User);
        assert_eq!(cancel_own(&owner, owner.id), Decision::Allow);
    }

    #[test]
    fn stranger_may_not_cancel() {
        let requester = user_with(Role::User);
        assert_eq!(
            cancel_own(&requester, Uuid::new_v4()),
            Decision::ForbiddenOwnership
        );
    }

    #[test]
    fn admin_may_cancel_anyones() {
        let admin = user_with(Role::Admin);
        assert_eq!(cancel_own(&admin, Uuid::new_v4()), Decision::Allow);
    }

    #[test]
    fn admin_surface_rejects_plain_users() {
        assert_eq!(admin_only(&user_with(Role::User)), Decision::ForbiddenRole);
        assert_eq!(admin_only(&user_with(Role::Admin)), Decision::Allow);
    }
}
