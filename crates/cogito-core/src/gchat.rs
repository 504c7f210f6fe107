//! Google Chat incoming-webhook sink.
//!
//! One POST per message, not retried. Messages for the same pipeline and
//! commit are grouped into one thread.

use http::Method;
use serde::Serialize;

use crate::transport::{self, Request, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("gchat webhook: invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("gchat webhook: http client Do: {0}")]
    Transport(TransportError),
    #[error("gchat webhook {webhook}: {status}\nBody: {body}")]
    Status {
        webhook: String,
        status: String,
        body: String,
    },
    #[error("gchat webhook: encoding message: {0}")]
    Encode(serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String,
    pub thread_key: String,
}

#[derive(Serialize)]
struct Payload<'a> {
    text: &'a str,
    thread: Thread<'a>,
}

#[derive(Serialize)]
struct Thread<'a> {
    #[serde(rename = "threadKey")]
    thread_key: &'a str,
}

/// Webhook URL without its credentials (query string), for logs and errors.
pub fn redact_webhook(webhook: &str) -> String {
    match url::Url::parse(webhook) {
        Ok(u) => format!(
            "{}://{}{}",
            u.scheme(),
            u.host_str().unwrap_or_default(),
            u.path()
        ),
        Err(_) => "<invalid webhook URL>".to_string(),
    }
}

/// Posts `msg` to the webhook, replying in its thread when one exists.
pub fn send(webhook: &str, msg: &ChatMessage) -> Result<(), ChatError> {
    let mut url = url::Url::parse(webhook)?;
    url.query_pairs_mut()
        .append_pair("messageReplyOption", "REPLY_MESSAGE_FALLBACK_TO_NEW_THREAD");

    let body = serde_json::to_vec(&Payload {
        text: &msg.text,
        thread: Thread {
            thread_key: &msg.thread_key,
        },
    })
    .map_err(ChatError::Encode)?;

    let req = Request::new(Method::POST, url.as_str())
        .header("Content-Type", "application/json; charset=UTF-8")
        .body(body);
    let outcome = transport::execute(&req).map_err(ChatError::Transport)?;
    if outcome.status != 200 {
        return Err(ChatError::Status {
            webhook: redact_webhook(webhook),
            status: outcome.status_line(),
            body: outcome.body,
        });
    }
    tracing::info!(webhook = %redact_webhook(webhook), "chat message sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_drops_query() {
        assert_eq!(
            redact_webhook("https://chat.googleapis.com/v1/spaces/AAA/messages?key=k&token=t"),
            "https://chat.googleapis.com/v1/spaces/AAA/messages"
        );
        assert_eq!(redact_webhook("::"), "<invalid webhook URL>");
    }

    #[test]
    fn payload_shape() {
        let s = serde_json::to_string(&Payload {
            text: "hi",
            thread: Thread { thread_key: "p abc" },
        })
        .unwrap();
        assert_eq!(s, r#"{"text":"hi","thread":{"threadKey":"p abc"}}"#);
    }
}
