//! Session token verification.
//!
//! Tokens are HS256 JWTs carrying the principal id and role. The gatekeeper
//! only verifies them; issuance lives with the sign-in flow (and in tests).

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::principal::{Principal, Role};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role: Role,
    exp: u64,
}

/// Verify a token and resolve the principal it carries.
///
/// Any verification failure (bad signature, expired, malformed) yields
/// `None`; the caller treats the request as unauthenticated.
pub fn verify_token(token: &str, secret: &str) -> Option<Principal> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .ok()?;

    Some(Principal {
        id: data.claims.sub,
        role: data.claims.role,
    })
}

/// Issue a token for the given principal, valid for `ttl_secs`.
pub fn issue_token(
    id: &str,
    role: Role,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
        + ttl_secs;

    encode(
        &Header::new(Algorithm::HS256),
        &Claims {
            sub: id.to_string(),
            role,
            exp,
        },
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn round_trips_the_principal() {
        let token = issue_token("user-42", Role::Instructor, SECRET, 3600).unwrap();
        let principal = verify_token(&token, SECRET).unwrap();
        assert_eq!(principal.id, "user-42");
        assert_eq!(principal.role, Role::Instructor);
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = issue_token("user-42", Role::User, SECRET, 3600).unwrap();
        assert!(verify_token(&token, "other-secret").is_none());
    }

    #[test]
    fn rejects_expired_token() {
        let expired = encode(
            &Header::new(Algorithm::HS256),
            &Claims {
                sub: "user-42".to_string(),
                role: Role::User,
                // Well past the default validation leeway
                exp: 1_000_000,
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(verify_token(&expired, SECRET).is_none());
    }

    #[test]
    fn rejects_garbage() {
        assert!(verify_token("not-a-token", SECRET).is_none());
    }
}
