//! Bearer token → claims decoding.
//!
//! # Trust boundary
//!
//! [`decode_bearer_token`] reads the payload segment of a three-segment token
//! and treats it as authoritative. The signature segment is **not** checked:
//! the gateway trusts whoever issued the token (issuer and gateway share a
//! network perimeter). A forged payload is accepted as-is. Callers that need
//! unforgeable tokens opt into [`crate::TokenVerification::Hs256`].

use std::collections::BTreeSet;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use stockroom_core::StaffId;

use crate::{Permission, PermissionSet, Role};

/// Subject identity carried by `sub` / `user_id`.
///
/// Issuers disagree on whether the subject is numeric, so both shapes are kept
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectId {
    Number(i64),
    Text(String),
}

impl core::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SubjectId::Number(n) => core::fmt::Display::fmt(n, f),
            SubjectId::Text(s) => f.write_str(s),
        }
    }
}

/// Numeric text becomes [`SubjectId::Number`], matching how `sub` is decoded.
impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        value
            .parse::<i64>()
            .map(SubjectId::Number)
            .unwrap_or_else(|_| SubjectId::Text(value.to_string()))
    }
}

/// Decoded identity/authorization payload for one request.
///
/// Rebuilt from the token on every request; never cached on a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub subject: SubjectId,
    pub permissions: PermissionSet,
    pub roles: BTreeSet<Role>,
    pub staff_id: Option<StaffId>,
    /// Issued-at, unix seconds.
    pub issued_at: Option<i64>,
    /// Expiry, unix seconds.
    pub expires_at: Option<i64>,
}

impl Claims {
    /// Whether `exp` lies at or before `now` (unix seconds). Tokens without
    /// `exp` never expire.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("no bearer token")]
    NoToken,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,
}

impl TokenError {
    fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Decode a bearer token into [`Claims`] without verifying its signature.
///
/// The token must have exactly three `.`-separated segments; the middle one is
/// base64url (padding optional) encoded JSON. Pure function of its input.
pub fn decode_bearer_token(token: &str) -> Result<Claims, TokenError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::NoToken);
    }

    let segments: Vec<&str> = token.split('.').collect();
    let [_header, payload, _signature] = segments.as_slice() else {
        return Err(TokenError::malformed(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| TokenError::malformed(format!("payload is not base64url: {e}")))?;

    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::malformed(format!("payload is not JSON: {e}")))?;

    let Value::Object(payload) = value else {
        return Err(TokenError::malformed("payload is not a JSON object"));
    };

    claims_from_payload(&payload)
}

fn claims_from_payload(payload: &Map<String, Value>) -> Result<Claims, TokenError> {
    let subject = first_present(payload, &["sub", "user_id"])
        .ok_or_else(|| TokenError::malformed("missing subject (sub / user_id)"))
        .and_then(subject_from)?;

    let permissions: PermissionSet = string_list(payload, &["permissions", "user_permission"])?
        .into_iter()
        .map(Permission::from)
        .collect();

    let roles = string_list(payload, &["roles", "user_roles"])?
        .into_iter()
        .map(Role::new)
        .collect();

    let staff_id = match payload.get("staff_id") {
        None | Some(Value::Null) => None,
        Some(v) => Some(StaffId::new(integer_from(v, "staff_id")?)),
    };

    let issued_at = optional_integer(payload, "iat")?;
    let expires_at = optional_integer(payload, "exp")?;

    Ok(Claims {
        subject,
        permissions,
        roles,
        staff_id,
        issued_at,
        expires_at,
    })
}

fn first_present<'a>(payload: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| payload.get(*k))
        .find(|v| !v.is_null())
}

fn subject_from(value: &Value) -> Result<SubjectId, TokenError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(SubjectId::Number)
            .ok_or_else(|| TokenError::malformed("subject is not an integer")),
        Value::String(s) if !s.is_empty() => Ok(SubjectId::from(s.as_str())),
        _ => Err(TokenError::malformed("subject must be an integer or string")),
    }
}

fn string_list(payload: &Map<String, Value>, keys: &[&str]) -> Result<Vec<String>, TokenError> {
    let Some(value) = first_present(payload, keys) else {
        return Ok(Vec::new());
    };

    let Value::Array(items) = value else {
        return Err(TokenError::malformed(format!("{} must be a list", keys[0])));
    };

    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.clone()),
            _ => Err(TokenError::malformed(format!(
                "{} must contain only strings",
                keys[0]
            ))),
        })
        .collect()
}

fn integer_from(value: &Value, field: &str) -> Result<i64, TokenError> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| TokenError::malformed(format!("{field} must be an integer")))
}

fn optional_integer(payload: &Map<String, Value>, field: &str) -> Result<Option<i64>, TokenError> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => integer_from(v, field).map(Some),
    }
}
