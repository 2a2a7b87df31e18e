use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

/// Claims read from the JWT payload. The signature is not verified here;
/// the server does that on every request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Expiry as seconds since the Unix epoch. NumericDate may carry a
    /// fractional part, so integers and floats are both accepted.
    #[serde(default)]
    pub exp: Option<f64>,
}

impl Claims {
    /// Decode the payload segment of a JWT. Returns `None` for anything that
    /// is not a three-part token with a base64 JSON object in the middle.
    pub fn decode(token: &str) -> Option<Self> {
        let mut parts = token.split('.');
        let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let payload = payload.trim_end_matches('=');
        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .or_else(|_| STANDARD_NO_PAD.decode(payload))
            .ok()?;
        serde_json::from_slice(&bytes).ok()
    }

    /// A token without an `exp` claim never expires.
    pub fn is_expired_at(&self, now: i64) -> bool {
        matches!(self.exp, Some(exp) if exp < now as f64)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    pub fn identity(&self) -> Identity {
        Identity {
            display_name: self.name.clone(),
            email: self.sub.clone(),
        }
    }
}

/// Display attributes of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct Identity {
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    /// Best label for greeting the user
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or("there")
    }
}

#[cfg(test)]
pub(crate) mod test_tokens {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;

    /// Build an unsigned token around the given payload JSON
    pub fn token_with_payload(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload);
        format!("{}.{}.signature", header, body)
    }

    pub fn token_expiring_at(exp: i64) -> String {
        token_with_payload(&format!(
            r#"{{"sub":"a@b.com","name":"A","exp":{}}}"#,
            exp
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::test_tokens::*;
    use super::*;

    #[test]
    fn test_decode_valid_token() {
        let token = token_expiring_at(2_000_000_000);
        let claims = Claims::decode(&token).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("a@b.com"));
        assert_eq!(claims.name.as_deref(), Some("A"));
        assert_eq!(claims.exp, Some(2_000_000_000.0));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(Claims::decode("").is_none());
        assert!(Claims::decode("not-a-jwt").is_none());
        assert!(Claims::decode("a.b").is_none());
        assert!(Claims::decode("a.!!!.c").is_none());
        assert!(Claims::decode("a.b.c.d").is_none());
        // Decodes as base64 but is not JSON
        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode("hello"));
        assert!(Claims::decode(&not_json).is_none());
        // JSON but not an object
        let array = format!("h.{}.s", URL_SAFE_NO_PAD.encode("[1,2]"));
        assert!(Claims::decode(&array).is_none());
    }

    #[test]
    fn test_decode_accepts_padded_and_standard_alphabet() {
        let payload = r#"{"sub":"x@y.z","name":"Zoë ~?"}"#;
        let padded = format!(
            "h.{}.s",
            base64::engine::general_purpose::STANDARD.encode(payload)
        );
        let claims = Claims::decode(&padded).unwrap();
        assert_eq!(claims.name.as_deref(), Some("Zoë ~?"));
    }

    #[test]
    fn test_expiry_is_strict() {
        let claims = Claims::decode(&token_expiring_at(1_000)).unwrap();
        assert!(claims.is_expired_at(1_001));
        assert!(!claims.is_expired_at(1_000));
        assert!(!claims.is_expired_at(999));
    }

    #[test]
    fn test_fractional_exp() {
        let claims = Claims::decode(&token_with_payload(
            r#"{"sub":"a@b.com","name":"A","exp":4000000000.5}"#,
        ))
        .unwrap();
        assert_eq!(claims.exp, Some(4_000_000_000.5));
        assert!(!claims.is_expired_at(4_000_000_000));
        assert!(claims.is_expired_at(4_000_000_001));
    }

    #[test]
    fn test_missing_exp_never_expires() {
        let claims = Claims::decode(&token_with_payload(r#"{"sub":"a@b.com"}"#)).unwrap();
        assert!(!claims.is_expired_at(i64::MAX));
    }

    #[test]
    fn test_identity() {
        let claims = Claims::decode(&token_expiring_at(2_000_000_000)).unwrap();
        assert_eq!(
            claims.identity(),
            Identity {
                display_name: Some("A".to_string()),
                email: Some("a@b.com".to_string()),
            }
        );
        assert_eq!(claims.identity().label(), "A");

        let anonymous = Identity { display_name: None, email: None };
        assert_eq!(anonymous.label(), "there");
    }
}
