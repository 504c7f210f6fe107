//! Parse HTTP response header lines into an HttpOutcome.

use chrono::{DateTime, Utc};

use super::{HttpOutcome, TransportError};

/// Builds the outcome from the collected header lines and raw body.
///
/// When libcurl reports several header blocks (interim `1xx` responses),
/// only the last block counts.
pub(crate) fn parse_response(
    status: u16,
    lines: &[String],
    body: &[u8],
) -> Result<HttpOutcome, TransportError> {
    let mut status_text = String::new();
    let mut accepted_oauth_scopes = String::new();
    let mut oauth_scopes = String::new();
    let mut rate_limit_remaining = 0;
    let mut rate_limit_reset = DateTime::<Utc>::UNIX_EPOCH;
    let mut date_value: Option<String> = None;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            status_text = reason_phrase(line);
            accepted_oauth_scopes.clear();
            oauth_scopes.clear();
            rate_limit_remaining = 0;
            rate_limit_reset = DateTime::<Utc>::UNIX_EPOCH;
            date_value = None;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("x-accepted-oauth-scopes") {
                accepted_oauth_scopes = value.to_string();
            } else if name.eq_ignore_ascii_case("x-oauth-scopes") {
                oauth_scopes = value.to_string();
            } else if name.eq_ignore_ascii_case("x-ratelimit-remaining") {
                rate_limit_remaining = value.parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("x-ratelimit-reset") {
                rate_limit_reset = parse_unix_seconds(value);
            } else if name.eq_ignore_ascii_case("date") {
                date_value = Some(value.to_string());
            }
        }
    }

    if status_text.is_empty() {
        status_text = http::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
    }

    let date = parse_http_date(date_value.as_deref().ok_or(TransportError::MissingDate)?)?;

    Ok(HttpOutcome {
        status,
        status_text,
        body: String::from_utf8_lossy(body).trim().to_string(),
        accepted_oauth_scopes,
        oauth_scopes,
        rate_limit_remaining,
        rate_limit_reset,
        date,
    })
}

/// `HTTP/1.1 404 Not Found` -> `Not Found`; HTTP/2 status lines carry none.
fn reason_phrase(status_line: &str) -> String {
    let mut parts = status_line.splitn(3, ' ');
    parts.next();
    parts.next();
    parts.next().unwrap_or_default().trim().to_string()
}

/// Unix seconds; anything unparseable maps to the epoch.
fn parse_unix_seconds(value: &str) -> DateTime<Utc> {
    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// RFC 1123 date, e.g. `Mon, 02 Jan 2006 15:04:05 GMT`.
pub(crate) fn parse_http_date(value: &str) -> Result<DateTime<Utc>, TransportError> {
    DateTime::parse_from_rfc2822(value)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|source| TransportError::Date {
            value: value.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_rate_limit_and_scopes() {
        let l = lines(&[
            "HTTP/1.1 403 Forbidden",
            "Date: Mon, 02 Jan 2006 15:04:05 GMT",
            "X-RateLimit-Remaining: 0",
            "X-RateLimit-Reset: 1136214287",
            "X-Accepted-OAuth-Scopes: repo, repo:status",
            "X-OAuth-Scopes: public_repo",
        ]);
        let o = parse_response(403, &l, b"  {\"message\":\"API rate limit exceeded\"}\n").unwrap();
        assert_eq!(o.status, 403);
        assert_eq!(o.status_text, "Forbidden");
        assert_eq!(o.body, "{\"message\":\"API rate limit exceeded\"}");
        assert_eq!(o.rate_limit_remaining, 0);
        assert_eq!(o.rate_limit_reset.timestamp(), 1136214287);
        assert_eq!(o.date.timestamp(), 1136214245);
        assert_eq!(o.accepted_oauth_scopes, "repo, repo:status");
        assert_eq!(o.oauth_scopes, "public_repo");
        assert!(o.is_rate_limited());
    }

    #[test]
    fn unparseable_rate_limit_headers_fall_back() {
        let l = lines(&[
            "HTTP/1.1 201 Created",
            "Date: Mon, 02 Jan 2006 15:04:05 GMT",
            "X-RateLimit-Remaining: lots",
            "X-RateLimit-Reset: soon",
        ]);
        let o = parse_response(201, &l, b"").unwrap();
        assert_eq!(o.rate_limit_remaining, 0);
        assert_eq!(o.rate_limit_reset, DateTime::<Utc>::UNIX_EPOCH);
        assert!(o.is_success());
        assert!(!o.is_rate_limited());
    }

    #[test]
    fn missing_date_is_transport_error() {
        let l = lines(&["HTTP/1.1 201 Created"]);
        assert!(matches!(
            parse_response(201, &l, b""),
            Err(TransportError::MissingDate)
        ));
    }

    #[test]
    fn bad_date_is_transport_error() {
        let l = lines(&["HTTP/1.1 201 Created", "Date: yesterday"]);
        assert!(matches!(
            parse_response(201, &l, b""),
            Err(TransportError::Date { .. })
        ));
    }

    #[test]
    fn http2_status_line_uses_canonical_reason() {
        let l = lines(&["HTTP/2 404", "date: Mon, 02 Jan 2006 15:04:05 GMT"]);
        let o = parse_response(404, &l, b"").unwrap();
        assert_eq!(o.status_line(), "404 Not Found");
    }

    #[test]
    fn only_last_header_block_counts() {
        let l = lines(&[
            "HTTP/1.1 100 Continue",
            "X-RateLimit-Remaining: 7",
            "",
            "HTTP/1.1 500 Internal Server Error",
            "Date: Mon, 02 Jan 2006 15:04:05 GMT",
        ]);
        let o = parse_response(500, &l, b"").unwrap();
        assert_eq!(o.status_text, "Internal Server Error");
        assert_eq!(o.rate_limit_remaining, 0);
    }
}
