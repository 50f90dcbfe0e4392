// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session token issuing and verification.
//!
//! Tokens are HS256 JWTs signed with a process-wide secret that is loaded once
//! at startup and injected here. Verification pins the algorithm to HS256, so
//! tokens naming any other algorithm (including `none`) are rejected, and it
//! neither requires nor checks `exp`.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::{claims::SessionClaims, AuthError, AuthenticatedAccount};

const SESSION_ALGORITHM: Algorithm = Algorithm::HS256;

/// Signing and verification keys for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(SESSION_ALGORITHM);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Mint a token for `account`.
    pub fn issue(&self, account: &AuthenticatedAccount) -> Result<String, AuthError> {
        let claims = account.to_claims(chrono::Utc::now().timestamp());
        encode(&Header::new(SESSION_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("failed to sign session token: {e}")))
    }

    /// Check the signature and decode the claims.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedAccount, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    AuthError::UnsupportedAlgorithm
                }
                _ => AuthError::MalformedToken,
            },
        )?;

        Ok(AuthenticatedAccount::from_claims(data.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    fn keys() -> SessionKeys {
        SessionKeys::from_secret(b"test-signing-secret")
    }

    fn account() -> AuthenticatedAccount {
        AuthenticatedAccount {
            account_id: "acc-123".to_string(),
            is_business: true,
            is_admin: false,
        }
    }

    fn segments(token: &str) -> Vec<String> {
        token.split('.').map(str::to_string).collect()
    }

    #[test]
    fn issue_then_verify_round_trips() {
        let keys = keys();
        let token = keys.issue(&account()).unwrap();
        assert_eq!(keys.verify(&token).unwrap(), account());
    }

    #[test]
    fn token_has_no_expiry_claim() {
        let token = keys().issue(&account()).unwrap();
        let payload = URL_SAFE_NO_PAD.decode(&segments(&token)[1]).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert!(json.get("exp").is_none());
        assert_eq!(json["_id"], "acc-123");
    }

    #[test]
    fn rotated_key_rejects_old_tokens() {
        let token = keys().issue(&account()).unwrap();
        let rotated = SessionKeys::from_secret(b"another-secret");
        assert!(matches!(rotated.verify(&token), Err(AuthError::InvalidSignature)));
    }

    #[test]
    fn altered_signature_is_rejected() {
        let keys = keys();
        let token = keys.issue(&account()).unwrap();
        let mut parts = segments(&token);
        let mut sig = URL_SAFE_NO_PAD.decode(&parts[2]).unwrap();
        sig[0] ^= 0x01;
        parts[2] = URL_SAFE_NO_PAD.encode(sig);
        assert!(matches!(
            keys.verify(&parts.join(".")),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn altered_payload_is_rejected() {
        let keys = keys();
        let token = keys.issue(&account()).unwrap();
        let mut parts = segments(&token);
        let forged = r#"{"_id":"acc-123","isBusiness":true,"isAdmin":true,"iat":0}"#;
        parts[1] = URL_SAFE_NO_PAD.encode(forged);
        assert!(matches!(
            keys.verify(&parts.join(".")),
            Err(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn alg_none_is_rejected() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload =
            URL_SAFE_NO_PAD.encode(r#"{"_id":"acc-123","isBusiness":true,"isAdmin":true}"#);
        for token in [format!("{header}.{payload}."), format!("{header}.{payload}")] {
            let err = keys().verify(&token).unwrap_err();
            assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn other_algorithms_are_rejected() {
        let keys = keys();
        let claims = account().to_claims(0);
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-signing-secret"),
        )
        .unwrap();
        assert!(matches!(
            keys.verify(&token),
            Err(AuthError::UnsupportedAlgorithm)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(keys().verify("not.a.jwt"), Err(AuthError::MalformedToken)));
        assert!(matches!(keys().verify(""), Err(AuthError::MalformedToken)));
    }
}
