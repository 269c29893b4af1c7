use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Content the server puts in `decrypted` when the password is missing or wrong
pub const PASSWORD_SENTINEL: &str = "Password required or incorrect";

/// Sent to the server when creating a new snippet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnippetCreate {
    pub plain_text: String,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Passed through verbatim, the server owns the parsing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<String>,
    #[serde(default)]
    pub one_time_view: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Returned by the server after a snippet was stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedSnippet {
    pub slug: String,
}

/// Body of the view request. The `password` key is always present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewRequest {
    pub password: Option<String>,
}

/// Raw view response as it comes over the wire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnippetResponse {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub decrypted: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub expiry_time: Option<String>,
    #[serde(default)]
    pub one_time_view: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A snippet the viewer is authorized to read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snippet {
    /// Identifier the snippet was requested with
    pub slug: String,
    pub content: String,
    pub language: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub one_time_view: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Result of a view request, decoded once at the API boundary
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome {
    Ok(Snippet),
    /// Password missing or incorrect
    AuthRequired,
    /// Expired, or a one-time snippet that was already consumed
    Unavailable,
}

impl ViewOutcome {
    pub fn decode(slug: &str, response: SnippetResponse) -> Self {
        let content = match response.decrypted {
            Some(content) if content == PASSWORD_SENTINEL => return ViewOutcome::AuthRequired,
            Some(content) if !content.is_empty() => content,
            _ => return ViewOutcome::Unavailable,
        };

        ViewOutcome::Ok(Snippet {
            slug: slug.to_string(),
            content,
            language: response.language.filter(|l| !l.trim().is_empty()),
            expires_at: response.expiry_time.as_deref().and_then(parse_timestamp),
            one_time_view: response.one_time_view.unwrap_or(false),
            created_at: response.created_at.as_deref().and_then(parse_timestamp),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ViewOutcome::Ok(_) => "ok",
            ViewOutcome::AuthRequired => "auth_required",
            ViewOutcome::Unavailable => "unavailable",
        }
    }
}

/// Parse a server or user supplied timestamp.
///
/// RFC 3339 values keep their offset. Values without an offset (the shape a
/// `datetime-local` input produces) are read as local time.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];

    NAIVE_FORMATS.iter().find_map(|format| {
        let naive = NaiveDateTime::parse_from_str(value, format).ok()?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn response(decrypted: Option<&str>) -> SnippetResponse {
        SnippetResponse {
            slug: Some("abc123".to_string()),
            decrypted: decrypted.map(str::to_string),
            language: Some("rust".to_string()),
            expiry_time: Some("2030-01-01T12:00:00Z".to_string()),
            one_time_view: Some(true),
            created_at: Some("2029-12-31T12:00:00+02:00".to_string()),
        }
    }

    #[test]
    fn test_sentinel_decodes_to_auth_required() {
        let outcome = ViewOutcome::decode("abc123", response(Some(PASSWORD_SENTINEL)));
        assert_eq!(outcome, ViewOutcome::AuthRequired);
    }

    #[test]
    fn test_missing_or_empty_content_is_unavailable() {
        assert_eq!(ViewOutcome::decode("abc123", response(Some(""))), ViewOutcome::Unavailable);
        assert_eq!(ViewOutcome::decode("abc123", response(None)), ViewOutcome::Unavailable);
    }

    #[test]
    fn test_content_decodes_to_snippet() {
        let ViewOutcome::Ok(snippet) = ViewOutcome::decode("abc123", response(Some("fn main() {}"))) else {
            panic!("expected snippet");
        };

        assert_eq!(snippet.slug, "abc123");
        assert_eq!(snippet.content, "fn main() {}");
        assert_eq!(snippet.language.as_deref(), Some("rust"));
        assert!(snippet.one_time_view);
        assert_eq!(snippet.expires_at.map(|e| e.hour()), Some(12));
        assert_eq!(snippet.created_at.map(|c| c.hour()), Some(10));
    }

    #[test]
    fn test_blank_language_is_dropped() {
        let mut raw = response(Some("body"));
        raw.language = Some("  ".to_string());
        let ViewOutcome::Ok(snippet) = ViewOutcome::decode("abc123", raw) else {
            panic!("expected snippet");
        };
        assert_eq!(snippet.language, None);
    }

    #[test]
    fn test_create_payload_omits_unset_fields() {
        let payload = SnippetCreate {
            plain_text: "hello".to_string(),
            language: "plaintext".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&payload).unwrap();
        let object = json.as_object().unwrap();
        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("expiry_time"));
        assert!(!object.contains_key("created_at"));
        assert_eq!(object["one_time_view"], serde_json::Value::Bool(false));
    }

    #[test]
    fn test_view_request_always_carries_password_key() {
        let json = serde_json::to_string(&ViewRequest { password: None }).unwrap();
        assert_eq!(json, r#"{"password":null}"#);

        let json = serde_json::to_string(&ViewRequest {
            password: Some("hunter2".to_string()),
        })
        .unwrap();
        assert_eq!(json, r#"{"password":"hunter2"}"#);
    }

    #[test]
    fn test_response_tolerates_nulls_and_extra_fields() {
        let raw: SnippetResponse = serde_json::from_str(
            r#"{"decrypted":"x","language":null,"expiry_time":null,"one_time_view":null,"extra":1}"#,
        )
        .unwrap();
        assert_eq!(raw.decrypted.as_deref(), Some("x"));
        assert_eq!(raw.one_time_view, None);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2030-01-01T00:00:00.123456Z").is_some());
        assert!(parse_timestamp("2030-01-01T08:30").is_some());
        assert!(parse_timestamp("2030-01-01 08:30:15").is_some());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("tomorrow").is_none());
    }
}
