//! Wire-protocol models for the OKX public WebSocket API.
//!
//! Contains the subscription request types and the `books` channel
//! messages in [`book`].

pub mod book;

use serde::Serialize;

/// A `subscribe` request sent to the OKX WebSocket API.
///
/// Wire shape: `{"op":"subscribe","args":[{"channel":"books","instId":…},…]}`.
#[derive(Debug, Serialize)]
pub struct SubscribeRequest {
    pub op: String,
    pub args: Vec<SubscribeArg>,
}

/// One channel/instrument pair inside a [`SubscribeRequest`].
#[derive(Debug, Serialize)]
pub struct SubscribeArg {
    pub channel: String,
    #[serde(rename = "instId")]
    pub inst_id: String,
}

impl SubscribeRequest {
    /// Builds a `books` channel subscription for the given instruments.
    #[must_use]
    pub fn books(instruments: &[String]) -> Self {
        Self {
            op: "subscribe".to_string(),
            args: instruments
                .iter()
                .map(|inst| SubscribeArg {
                    channel: book::BOOKS_CHANNEL.to_string(),
                    inst_id: inst.clone(),
                })
                .collect(),
        }
    }
}
