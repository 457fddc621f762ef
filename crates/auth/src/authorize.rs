use thiserror::Error;

use crate::{Claims, Permission};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Route-side authorization contract (checked before the handler runs).
///
/// `None` means the route only requires an authenticated caller.
pub trait RequiresPermission {
    fn required_permission(&self) -> Option<&Permission>;
}

/// Authorize the current request's claims against a required permission.
///
/// - No IO
/// - No caching: claims are per request, so the decision is too
/// - Fail-closed: an empty permission set never grants anything
pub fn authorize(claims: &Claims, required: Option<&Permission>) -> Result<(), AuthzError> {
    let Some(required) = required else {
        return Ok(());
    };

    if claims.permissions.contains(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::{PermissionSet, SubjectId};
    use proptest::prelude::*;

    fn claims_with(permissions: PermissionSet) -> Claims {
        Claims {
            subject: SubjectId::Number(1),
            permissions,
            roles: BTreeSet::new(),
            staff_id: None,
            issued_at: None,
            expires_at: None,
        }
    }

    #[test]
    fn missing_permission_is_forbidden() {
        let claims = claims_with(["view order"].into_iter().collect());
        let err = authorize(&claims, Some(&Permission::from("create order"))).unwrap_err();
        assert_eq!(err, AuthzError::Forbidden("create order".to_string()));
    }

    #[test]
    fn held_permission_is_allowed() {
        let claims = claims_with(["view order", "create order"].into_iter().collect());
        assert!(authorize(&claims, Some(&Permission::from("create order"))).is_ok());
    }

    #[test]
    fn empty_set_denies() {
        let claims = claims_with(PermissionSet::new());
        assert!(authorize(&claims, Some(&Permission::from("view order"))).is_err());
    }

    #[test]
    fn route_without_permission_only_needs_authentication() {
        let claims = claims_with(PermissionSet::new());
        assert!(authorize(&claims, None).is_ok());
    }

    proptest! {
        #[test]
        fn allowed_iff_member(
            held in prop::collection::btree_set("[a-c]{1,2} [a-c]{1,2}", 0..6),
            required in "[a-c]{1,2} [a-c]{1,2}",
        ) {
            let is_member = held.contains(&required);
            let claims = claims_with(held.into_iter().collect());
            let decision = authorize(&claims, Some(&Permission::from(required)));
            prop_assert_eq!(decision.is_ok(), is_member);
        }
    }
}
