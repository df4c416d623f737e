//! Request authentication: bearer/cookie token extraction and user lookup.

use std::collections::BTreeMap;

use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::api::AppState;
use crate::supabase::SupabaseClient;

/// Legacy single-value session cookie.
const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";

/// An authenticated platform user, as reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Extract the access token from `Authorization: Bearer` or a session cookie.
///
/// The header wins over cookies.
pub fn access_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty())
    {
        return Some(token.to_string());
    }

    // The session cookie is either whole (`sb-<ref>-auth-token`) or split
    // into `sb-<ref>-auth-token.0`, `.1`, ... parts that concatenate in index order.
    let mut session_name: Option<String> = None;
    let mut whole = None;
    let mut parts: BTreeMap<u32, String> = BTreeMap::new();
    for header in headers.get_all(COOKIE) {
        let Ok(raw) = header.to_str() else {
            continue;
        };
        for cookie in raw.split(';') {
            let Some((name, value)) = cookie.trim().split_once('=') else {
                continue;
            };
            if name == ACCESS_TOKEN_COOKIE && !value.is_empty() {
                return Some(value.to_string());
            }
            let (base, index) = match name.rsplit_once('.') {
                Some((base, idx)) => match idx.parse::<u32>() {
                    Ok(index) => (base, Some(index)),
                    Err(_) => continue,
                },
                None => (name, None),
            };
            if !(base.starts_with("sb-") && base.ends_with("-auth-token")) {
                continue;
            }
            match session_name.as_deref() {
                Some(seen) if seen != base => continue,
                Some(_) => {}
                None => session_name = Some(base.to_string()),
            }
            match index {
                Some(index) => {
                    parts.insert(index, value.to_string());
                }
                None => whole = Some(value.to_string()),
            }
        }
    }

    if let Some(token) = whole.as_deref().and_then(token_from_session_cookie) {
        return Some(token);
    }
    if parts.is_empty() {
        return None;
    }
    let joined: String = parts.into_values().collect();
    token_from_session_cookie(&joined)
}

/// Decode a `sb-<ref>-auth-token` value.
///
/// Accepted shapes, optionally `base64-` prefixed and percent-encoded:
/// a JSON array whose first element is the access token, a JSON object with
/// `access_token`, or the bare token.
fn token_from_session_cookie(value: &str) -> Option<String> {
    let decoded = if value.contains('%') {
        url::form_urlencoded::parse(format!("v={value}").as_bytes())
            .next()
            .map(|(_, v)| v.into_owned())?
    } else {
        value.to_string()
    };

    let json_text = match decoded.strip_prefix("base64-") {
        Some(encoded) => {
            let bytes = URL_SAFE_NO_PAD
                .decode(encoded.trim_end_matches('='))
                .or_else(|_| STANDARD.decode(encoded))
                .ok()?;
            String::from_utf8(bytes).ok()?
        }
        None => decoded,
    };

    let token = match serde_json::from_str::<serde_json::Value>(&json_text) {
        Ok(serde_json::Value::Array(items)) => items.first()?.as_str().map(String::from),
        Ok(serde_json::Value::Object(map)) => {
            map.get("access_token")?.as_str().map(String::from)
        }
        Ok(serde_json::Value::String(s)) => Some(s),
        _ if !json_text.is_empty() && !json_text.starts_with(['[', '{']) => Some(json_text),
        _ => None,
    };
    token.filter(|t| !t.is_empty())
}

/// Resolve the current user for a request.
///
/// Returns `None` when no token is present, the auth backend is not
/// configured, or the token does not validate.
pub async fn current_user(state: &AppState, headers: &HeaderMap) -> Option<AuthUser> {
    let token = access_token(headers)?;

    let supabase = &state.config.supabase;
    let (Some(url), Some(anon_key)) = (supabase.url.as_deref(), supabase.anon_key.clone()) else {
        warn!("Auth lookup skipped: Supabase URL or anon key not configured");
        return None;
    };

    let client = SupabaseClient::new(state.http.clone(), url, anon_key);
    match client.get_user(&token).await {
        Ok(user) => {
            debug!(user_id = %user.id, "Resolved request user");
            Some(user)
        }
        Err(e) => {
            debug!(error = %e, "Token did not resolve to a user");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.append(
                axum::http::HeaderName::from_bytes(k.as_bytes()).unwrap(),
                HeaderValue::from_str(v).unwrap(),
            );
        }
        map
    }

    #[test]
    fn bearer_header() {
        let h = headers(&[("authorization", "Bearer abc.def.ghi")]);
        assert_eq!(access_token(&h).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let h = headers(&[
            ("authorization", "Bearer from-header"),
            ("cookie", "sb-access-token=from-cookie"),
        ]);
        assert_eq!(access_token(&h).as_deref(), Some("from-header"));
    }

    #[test]
    fn non_bearer_authorization_is_ignored() {
        let h = headers(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert!(access_token(&h).is_none());
    }

    #[test]
    fn legacy_cookie() {
        let h = headers(&[("cookie", "theme=dark; sb-access-token=tok123")]);
        assert_eq!(access_token(&h).as_deref(), Some("tok123"));
    }

    #[test]
    fn project_cookie_json_array() {
        let h = headers(&[(
            "cookie",
            "sb-abcd-auth-token=%5B%22tok-array%22%2C%22refresh%22%5D",
        )]);
        assert_eq!(access_token(&h).as_deref(), Some("tok-array"));
    }

    #[test]
    fn project_cookie_base64_object() {
        let encoded = URL_SAFE_NO_PAD.encode(r#"{"access_token":"tok-obj","refresh_token":"r"}"#);
        let cookie = format!("sb-abcd-auth-token=base64-{encoded}");
        let h = headers(&[("cookie", cookie.as_str())]);
        assert_eq!(access_token(&h).as_deref(), Some("tok-obj"));
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        for value in ["bearer tok", "BEARER tok", "Bearer   tok"] {
            let h = headers(&[("authorization", value)]);
            assert_eq!(access_token(&h).as_deref(), Some("tok"), "{value}");
        }
        let h = headers(&[("authorization", "Bearertok")]);
        assert!(access_token(&h).is_none());
    }

    #[test]
    fn project_cookie_split_into_chunks() {
        let encoded = URL_SAFE_NO_PAD.encode(
            r#"{"access_token":"tok-chunked","refresh_token":"r","user":{"id":"u"}}"#,
        );
        let value = format!("base64-{encoded}");
        let (first, second) = value.split_at(value.len() / 2);
        let cookie = format!(
            "theme=dark; sb-abcd-auth-token.1={second}; sb-abcd-auth-token.0={first}"
        );
        let h = headers(&[("cookie", cookie.as_str())]);
        assert_eq!(access_token(&h).as_deref(), Some("tok-chunked"));
    }

    #[test]
    fn chunks_from_other_projects_are_not_mixed() {
        let encoded = URL_SAFE_NO_PAD.encode(r#"["tok-a","r"]"#);
        let value = format!("base64-{encoded}");
        let (first, second) = value.split_at(value.len() / 2);
        let cookie = format!(
            "sb-aaaa-auth-token.0={first}; sb-bbbb-auth-token.0=junk; sb-aaaa-auth-token.1={second}"
        );
        let h = headers(&[("cookie", cookie.as_str())]);
        assert_eq!(access_token(&h).as_deref(), Some("tok-a"));
    }

    #[test]
    fn no_token() {
        let h = headers(&[("cookie", "theme=dark")]);
        assert!(access_token(&h).is_none());
        assert!(access_token(&HeaderMap::new()).is_none());
    }
}
