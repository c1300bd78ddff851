//! JSON Web Token decoder and HMAC signer.
//!
//! Decoding never verifies the signature; it only unpacks the segments and
//! annotates registered claims.
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::DateTime;
use hmac::Hmac;
use serde::Serialize;
use serde_json::{json, Value};
use sha2::{Sha256, Sha384, Sha512};

use crate::convert::json_utils::parse_json;
use crate::encoding::{decode_base64_bytes, Base64Options};
use crate::error::{Result, ToolError};
use crate::hashing::mac_bytes;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtClaim {
    pub section: &'static str,
    pub claim: String,
    pub value: String,
    pub friendly_name: Option<&'static str>,
    pub friendly_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedJwt {
    pub header: String,
    pub payload: String,
    pub algorithm: Option<String>,
    pub signature: Option<String>,
    pub claims: Vec<JwtClaim>,
}

const CLAIM_NAMES: &[(&str, &str)] = &[
    ("iss", "Issuer"),
    ("sub", "Subject"),
    ("aud", "Audience"),
    ("exp", "Expiration Time"),
    ("nbf", "Not Before"),
    ("iat", "Issued At"),
    ("jti", "JWT ID"),
    ("alg", "Algorithm"),
    ("typ", "Type"),
    ("cty", "Content Type"),
    ("kid", "Key ID"),
    ("name", "Full name"),
    ("email", "Preferred e-mail address"),
    ("scope", "Scope Values"),
];

const DATE_CLAIMS: [&str; 3] = ["exp", "nbf", "iat"];

pub fn jwt_decode(token: &str) -> Result<DecodedJwt> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(ToolError::EmptyInput("token"));
    }
    let segments: Vec<&str> = trimmed.split('.').collect();
    if !(2..=3).contains(&segments.len()) {
        return Err(ToolError::invalid(
            "JWT",
            "expected header.payload[.signature]",
        ));
    }
    let header = decode_segment("JWT header", segments[0])?;
    let payload = decode_segment("JWT payload", segments[1])?;
    let algorithm = header
        .get("alg")
        .and_then(Value::as_str)
        .map(str::to_string);
    let signature = segments
        .get(2)
        .filter(|sig| !sig.is_empty())
        .map(|sig| (*sig).to_string());

    let mut claims = collect_claims("header", &header);
    claims.extend(collect_claims("payload", &payload));
    log::debug!("decoded JWT with {} claims", claims.len());

    Ok(DecodedJwt {
        header: serde_json::to_string_pretty(&header)?,
        payload: serde_json::to_string_pretty(&payload)?,
        algorithm,
        signature,
        claims,
    })
}

fn decode_segment(what: &'static str, segment: &str) -> Result<Value> {
    if segment.trim().is_empty() {
        return Err(ToolError::EmptyInput(what));
    }
    let bytes = decode_base64_bytes(segment, Base64Options { url_safe: true })
        .map_err(|err| ToolError::invalid(what, err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| ToolError::invalid(what, err.to_string()))
}

fn collect_claims(section: &'static str, value: &Value) -> Vec<JwtClaim> {
    let Value::Object(map) = value else {
        return Vec::new();
    };
    map.iter()
        .map(|(claim, value)| JwtClaim {
            section,
            claim: claim.clone(),
            value: match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
            friendly_name: CLAIM_NAMES
                .iter()
                .find(|(name, _)| *name == claim.as_str())
                .map(|(_, friendly)| *friendly),
            friendly_value: friendly_value(claim, value),
        })
        .collect()
}

fn friendly_value(claim: &str, value: &Value) -> Option<String> {
    if !DATE_CLAIMS.contains(&claim) {
        return None;
    }
    let seconds = value.as_i64()?;
    DateTime::from_timestamp(seconds, 0).map(|date| date.to_rfc3339())
}

/// Signs `payload` (any JSON) with HS256, HS384 or HS512. An empty algorithm
/// means HS256.
pub fn jwt_encode(payload: &str, secret: &str, algorithm: &str) -> Result<String> {
    if secret.is_empty() {
        return Err(ToolError::EmptyInput("secret"));
    }
    let algorithm = match algorithm.trim() {
        "" => "HS256".to_string(),
        other => other.to_ascii_uppercase(),
    };
    let payload = parse_json(payload)?;
    let header = json!({ "alg": algorithm, "typ": "JWT" });
    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload)?)
    );
    let key = secret.as_bytes();
    let data = signing_input.as_bytes();
    let signature = match algorithm.as_str() {
        "HS256" => mac_bytes::<Hmac<Sha256>>(key, data)?,
        "HS384" => mac_bytes::<Hmac<Sha384>>(key, data)?,
        "HS512" => mac_bytes::<Hmac<Sha512>>(key, data)?,
        other => return Err(ToolError::unsupported("JWT algorithm", other)),
    };
    Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
}

#[cfg(test)]
mod tests {
    use super::*;

    // jwt.io sample token, signed with "your-256-bit-secret"
    const SAMPLE: &str = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.\
        eyJzdWIiOiIxMjM0NTY3ODkwIiwibmFtZSI6IkpvaG4gRG9lIiwiaWF0IjoxNTE2MjM5MDIyfQ.\
        SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c";

    #[test]
    fn decodes_the_reference_token() {
        let decoded = jwt_decode(SAMPLE).unwrap();
        assert_eq!(decoded.algorithm.as_deref(), Some("HS256"));
        assert_eq!(
            decoded.signature.as_deref(),
            Some("SflKxwRJSMeKKF2QT4fwpMeJf36POk6yJV_adQssw5c")
        );
        assert!(decoded.payload.contains("\"name\": \"John Doe\""));

        let iat = decoded
            .claims
            .iter()
            .find(|claim| claim.claim == "iat")
            .expect("iat claim");
        assert_eq!(iat.section, "payload");
        assert_eq!(iat.value, "1516239022");
        assert_eq!(iat.friendly_name, Some("Issued At"));
        assert_eq!(iat.friendly_value.as_deref(), Some("2018-01-18T01:30:22+00:00"));

        let alg = &decoded.claims[0];
        assert_eq!((alg.section, alg.claim.as_str()), ("header", "alg"));
    }

    #[test]
    fn encoding_reproduces_the_reference_signature() {
        let token = jwt_encode(
            r#"{"sub":"1234567890","name":"John Doe","iat":1516239022}"#,
            "your-256-bit-secret",
            "HS256",
        )
        .unwrap();
        assert_eq!(token, SAMPLE);
    }

    #[test]
    fn encode_supports_hs384_and_hs512() {
        for (alg, sig_len) in [("hs384", 64), ("HS512", 86)] {
            let token = jwt_encode("{}", "secret", alg).unwrap();
            let signature = token.rsplit('.').next().unwrap();
            assert_eq!(signature.len(), sig_len, "{alg}");
        }
        assert!(jwt_encode("{}", "secret", "RS256").is_err());
        assert!(jwt_encode("{}", "", "HS256").is_err());
        assert!(jwt_encode("not json", "secret", "HS256").is_err());
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(jwt_decode("").is_err());
        assert!(jwt_decode("abc").is_err());
        assert!(jwt_decode("a.b.c.d").is_err());
        assert!(jwt_decode("!!!.e30").is_err());
    }

    #[test]
    fn unsigned_tokens_have_no_signature() {
        let decoded = jwt_decode("eyJhbGciOiJub25lIn0.e30.").unwrap();
        assert_eq!(decoded.algorithm.as_deref(), Some("none"));
        assert!(decoded.signature.is_none());
        assert!(decoded.claims.iter().all(|claim| claim.section == "header"));
    }
}
