// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Stream-mode query responses
//!
//! The event feed is a sequence of lines. Lines starting with `data:` carry
//! either a JSON event or the `[DONE]` sentinel; every other line is padding.
//! [`StreamAggregator`] folds the events into one answer:
//!
//! - `fulfillment` events append their `answer` fragment in arrival order and
//!   overwrite the tracked session and message ids
//! - `metricsLog` events replace the tracked metrics wholesale
//! - any other event kind is ignored
//!
//! A malformed event line is skipped. The sentinel and plain end of feed both
//! finalize the answer. A transport error while reading discards everything.

use futures::{Stream, StreamExt};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;

use super::types::ContextField;
use crate::error::{ChatError, Result};

pub const EVENT_PREFIX: &str = "data:";
pub const DONE_SENTINEL: &str = "[DONE]";

/// `status` of every streamed result
pub const STREAM_COMPLETED_STATUS: &str = "completed";
/// `message` of every streamed result
pub const STREAM_RESULT_MESSAGE: &str = "Chat query submitted successfully";

/// Classification of one raw feed line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedLine<'a> {
    /// Keep-alive, comment or any line without the event prefix
    Skip,
    /// Explicit end of stream
    Sentinel,
    /// Trimmed event payload, not yet parsed
    Event(&'a str),
}

pub fn classify_line(line: &str) -> FeedLine<'_> {
    let Some(rest) = line.strip_prefix(EVENT_PREFIX) else {
        return FeedLine::Skip;
    };

    let payload = rest.trim();
    if payload == DONE_SENTINEL {
        FeedLine::Sentinel
    } else {
        FeedLine::Event(payload)
    }
}

/// Decoded feed event, dispatched on `eventType`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "eventType")]
pub enum StreamEvent {
    #[serde(rename = "fulfillment")]
    Fulfillment(FulfillmentEvent),
    #[serde(rename = "metricsLog")]
    MetricsLog(MetricsLogEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentEvent {
    #[serde(default, deserialize_with = "string_or_none")]
    pub answer: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub session_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_none")]
    pub message_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsLogEvent {
    #[serde(default, deserialize_with = "object_or_none")]
    pub public_metrics: Option<Map<String, Value>>,
}

// A field of the wrong JSON type is treated as absent rather than failing
// the whole event.
fn string_or_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn object_or_none<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Map<String, Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => Some(map),
        _ => None,
    })
}

/// Final result of a streamed query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamedResponse {
    pub message: String,
    pub data: StreamedAnswer,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamedAnswer {
    pub session_id: Option<String>,
    pub message_id: Option<String>,
    pub answer: String,
    pub metrics: Map<String, Value>,
    pub status: String,
    pub context_metadata: Vec<ContextField>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregatorState {
    #[default]
    Reading,
    Done,
    Failed,
}

/// Accumulates feed lines into a [`StreamedResponse`]
#[derive(Debug, Default)]
pub struct StreamAggregator {
    state: AggregatorState,
    answer: String,
    session_id: Option<String>,
    message_id: Option<String>,
    metrics: Map<String, Value>,
}

impl StreamAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> AggregatorState {
        self.state
    }

    /// Answer accumulated so far
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Feed one raw line and return the resulting state.
    /// Lines arriving after a terminal state are ignored.
    pub fn push_line(&mut self, line: &str) -> AggregatorState {
        if self.state != AggregatorState::Reading {
            return self.state;
        }

        match classify_line(line) {
            FeedLine::Skip => {}
            FeedLine::Sentinel => self.state = AggregatorState::Done,
            FeedLine::Event(payload) => match serde_json::from_str::<StreamEvent>(payload) {
                Ok(event) => self.apply(event),
                Err(e) => {
                    tracing::debug!(error = %e, payload, "skipping malformed stream event");
                }
            },
        }

        self.state
    }

    /// Fold one decoded event into the accumulated result
    pub fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Fulfillment(fulfillment) => {
                if let Some(text) = fulfillment.answer {
                    self.answer.push_str(&text);
                }
                if let Some(session_id) = fulfillment.session_id {
                    self.session_id = Some(session_id);
                }
                if let Some(message_id) = fulfillment.message_id {
                    self.message_id = Some(message_id);
                }
            }
            StreamEvent::MetricsLog(log) => {
                if let Some(metrics) = log.public_metrics {
                    self.metrics = metrics;
                }
            }
            StreamEvent::Other => tracing::trace!("ignoring unrecognized stream event"),
        }
    }

    /// Transport failure: drop everything accumulated so far.
    pub fn fail(&mut self) {
        self.state = AggregatorState::Failed;
        self.answer.clear();
        self.session_id = None;
        self.message_id = None;
        self.metrics.clear();
    }

    /// Finalize after the sentinel or the end of the feed.
    pub fn finish(self, context_metadata: &[ContextField]) -> Result<StreamedResponse> {
        if self.state == AggregatorState::Failed {
            return Err(ChatError::StreamRead(
                "stream failed before completion".to_string(),
            ));
        }

        Ok(StreamedResponse {
            message: STREAM_RESULT_MESSAGE.to_string(),
            data: StreamedAnswer {
                session_id: self.session_id,
                message_id: self.message_id,
                answer: self.answer,
                metrics: self.metrics,
                status: STREAM_COMPLETED_STATUS.to_string(),
                context_metadata: context_metadata.to_vec(),
            },
        })
    }
}

/// Split a chunked byte feed into lines.
///
/// Chunks may end mid-line or mid-character; bytes are buffered until a `\n`
/// arrives. A trailing line without a newline is emitted when the feed ends.
pub fn feed_lines<S, B, E>(feed: S) -> impl Stream<Item = Result<String>>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    async_stream::try_stream! {
        let mut buffer: Vec<u8> = Vec::new();
        // Bytes before this offset are known to hold no newline.
        let mut scanned = 0;

        for await chunk in feed {
            let chunk = chunk.map_err(|e| ChatError::StreamRead(e.to_string()))?;
            buffer.extend_from_slice(chunk.as_ref());

            while let Some(offset) = buffer[scanned..].iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=scanned + offset).collect();
                scanned = 0;
                yield decode_line(&line);
            }
            scanned = buffer.len();
        }

        if !buffer.is_empty() {
            yield decode_line(&buffer);
        }
    }
}

fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    while end > 0 && matches!(raw[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

/// Consume an event feed to completion and build the final result.
///
/// Stops reading at the sentinel; the rest of the feed is dropped unread.
pub async fn aggregate_stream<S, B, E>(
    feed: S,
    context_metadata: &[ContextField],
) -> Result<StreamedResponse>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let lines = feed_lines(feed);
    futures::pin_mut!(lines);

    let mut aggregator = StreamAggregator::new();
    while let Some(line) = lines.next().await {
        match line {
            Ok(line) => {
                if aggregator.push_line(&line) == AggregatorState::Done {
                    break;
                }
            }
            Err(err) => {
                aggregator.fail();
                tracing::warn!(error = %err, "event feed read failed");
                return Err(err);
            }
        }
    }

    aggregator.finish(context_metadata)
}
