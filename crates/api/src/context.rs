use stockroom_auth::{Claims, Permission, PermissionSet, Role, SubjectId};
use stockroom_core::StaffId;

/// Claims of the authenticated caller, attached to the request by
/// [`crate::middleware::auth_middleware`].
///
/// Immutable for the lifetime of the request and rebuilt from the token on
/// every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsContext {
    claims: Claims,
}

impl ClaimsContext {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn subject(&self) -> &SubjectId {
        &self.claims.subject
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.claims.permissions
    }

    pub fn has_permission(&self, permission: &Permission) -> bool {
        self.claims.permissions.contains(permission)
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.claims.roles.iter()
    }

    pub fn staff_id(&self) -> Option<StaffId> {
        self.claims.staff_id
    }
}
