use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde_json::{Map, Value};
use storefront_core::{
    BearerToken, Identity, MalformedTokenError, Role, TokenDecoder, derive_display_name,
};

/// Every spelling of the role claim the backend has issued.
const ROLE_CLAIMS: [&str; 4] = ["role", "rol", "Role", "ROLE"];

type Claims = Map<String, Value>;

/// Reads JWT claims without verifying the signature.
///
/// Signature and expiry checks are disabled on purpose: the backend verifies
/// every call, and expiry is carried on the identity for the session store to
/// judge.
#[derive(Clone)]
pub struct JwtTokenDecoder {
    validation: Validation,
}

impl JwtTokenDecoder {
    pub fn new() -> Self {
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        Self { validation }
    }
}

impl Default for JwtTokenDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenDecoder for JwtTokenDecoder {
    fn decode(
        &self,
        token: &BearerToken,
        display_name_override: Option<&str>,
    ) -> Result<Identity, MalformedTokenError> {
        let claims = decode::<Claims>(
            token.expose(),
            &DecodingKey::from_secret(&[]),
            &self.validation,
        )
        .map_err(|e| MalformedTokenError::new(e.to_string()))?
        .claims;

        let subject = subject(&claims)?;
        let role_claim = ROLE_CLAIMS
            .iter()
            .find_map(|key| claims.get(*key).and_then(Value::as_str));
        let (role, role_source) = Role::resolve(role_claim);
        let email = claims
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let display_name = derive_display_name(&subject, display_name_override);

        Ok(Identity::new(
            subject,
            display_name,
            email,
            role,
            role_source,
            expiry(&claims),
        ))
    }
}

fn subject(claims: &Claims) -> Result<String, MalformedTokenError> {
    let subject = match claims.get("sub") {
        Some(Value::String(sub)) => sub.trim().to_string(),
        Some(Value::Number(sub)) => sub.to_string(),
        _ => String::new(),
    };
    if subject.is_empty() {
        return Err(MalformedTokenError::new("token has no subject"));
    }
    Ok(subject)
}

fn expiry(claims: &Claims) -> Option<DateTime<Utc>> {
    let seconds = match claims.get("exp")? {
        Value::Number(exp) => exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?,
        _ => return None,
    };
    DateTime::from_timestamp(seconds, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use quickcheck_macros::quickcheck;
    use serde_json::json;
    use storefront_core::RoleSource;

    fn token(claims: Value) -> BearerToken {
        let raw = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"backend-secret"),
        )
        .unwrap();
        BearerToken::parse(raw).unwrap()
    }

    #[test]
    fn test_decodes_claims_without_the_signing_key() {
        let exp = Utc::now().timestamp() + 3600;
        let identity = JwtTokenDecoder::new()
            .decode(
                &token(json!({
                    "sub": "alice@example.com",
                    "role": "ADMINISTRADOR",
                    "email": "alice@example.com",
                    "exp": exp
                })),
                None,
            )
            .unwrap();

        assert_eq!(identity.subject_id(), "alice@example.com");
        assert_eq!(identity.display_name(), "alice");
        assert_eq!(identity.email(), "alice@example.com");
        assert_eq!(identity.role(), Role::Administrator);
        assert_eq!(identity.role_source(), RoleSource::Claimed);
        assert_eq!(identity.expires_at().unwrap().timestamp(), exp);
    }

    #[test]
    fn test_expired_tokens_still_decode() {
        let identity = JwtTokenDecoder::new()
            .decode(&token(json!({"sub": "42", "rol": "USER", "exp": 1})), Some("bob"))
            .unwrap();

        assert!(identity.is_expired(Utc::now()));
        assert_eq!(identity.display_name(), "bob");
        assert_eq!(identity.role(), Role::NormalUser);
    }

    #[test]
    fn test_missing_or_unknown_role_is_defaulted() {
        let decoder = JwtTokenDecoder::new();
        for claims in [json!({"sub": "42"}), json!({"sub": "42", "ROLE": "SUPERADMIN"})] {
            let identity = decoder.decode(&token(claims), None).unwrap();
            assert_eq!(identity.role(), Role::LEAST_PRIVILEGED);
            assert_eq!(identity.trusted_role(), None);
        }
    }

    #[test]
    fn test_missing_subject_is_malformed() {
        let decoder = JwtTokenDecoder::new();
        assert!(decoder.decode(&token(json!({"role": "ADMIN"})), None).is_err());
        assert!(decoder.decode(&token(json!({"sub": "  "})), None).is_err());
    }

    #[test]
    fn test_garbage_is_malformed() {
        let decoder = JwtTokenDecoder::new();
        for raw in ["not-a-token", "a.b.c", "eyJhbGciOiJIUzI1NiJ9.bm90IGpzb24.sig"] {
            let token = BearerToken::parse(raw).unwrap();
            assert!(decoder.decode(&token, None).is_err(), "{raw} decoded");
        }
    }

    #[quickcheck]
    fn prop_decoded_role_is_always_known(role_claim: String) -> bool {
        let identity = JwtTokenDecoder::new()
            .decode(&token(json!({"sub": "42", "role": role_claim})), None)
            .unwrap();
        Role::ALL.contains(&identity.role())
            && (identity.role_source() == RoleSource::Claimed)
                == Role::from_claim(&role_claim).is_some()
    }
}
