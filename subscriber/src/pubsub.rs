/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use async_nats::jetstream::{
    self,
    consumer::{AckPolicy, DeliverPolicy, pull::Config as ConsumerConfig, pull::Stream},
    stream::Config as StreamConfig,
};
use async_trait::async_trait;
use cadence_core::consts::{STREAM_NAME, TOPIC_CD_WORKFLOW_STATUS, TOPIC_CI_COMPLETE};
use cadence_core::error::{CoreError, CoreResult};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[async_trait]
pub trait Acker: Send + Sync {
    async fn ack(&self) -> CoreResult<()>;
}

/// One received message. Acknowledging consumes it, so a delivery is acked at most once.
pub struct Delivery {
    pub topic: String,
    /// Broker-assigned identity, stable across redeliveries.
    pub id: String,
    pub payload: Vec<u8>,
    acker: Box<dyn Acker>,
}

impl Delivery {
    pub fn new(topic: String, id: String, payload: Vec<u8>, acker: Box<dyn Acker>) -> Self {
        Delivery {
            topic,
            id,
            payload,
            acker,
        }
    }

    pub async fn ack(self) -> CoreResult<()> {
        self.acker.ack().await
    }
}

impl std::fmt::Debug for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delivery")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

#[async_trait]
pub trait MessageSource: Send {
    /// Next delivery; `None` once the source is closed.
    async fn next(&mut self) -> Option<Delivery>;
}

#[derive(Debug, Clone)]
pub struct SubscriptionConfig {
    pub topic: &'static str,
    pub durable_name: &'static str,
    pub deliver_policy: DeliverPolicy,
    pub ack_wait: Duration,
}

impl SubscriptionConfig {
    pub fn ci_complete(ack_wait: Duration) -> Self {
        SubscriptionConfig {
            topic: TOPIC_CI_COMPLETE,
            durable_name: "cadence-ci-complete",
            deliver_policy: DeliverPolicy::Last,
            ack_wait,
        }
    }

    pub fn workflow_status(ack_wait: Duration) -> Self {
        SubscriptionConfig {
            topic: TOPIC_CD_WORKFLOW_STATUS,
            durable_name: "cadence-workflow-status",
            deliver_policy: DeliverPolicy::All,
            ack_wait,
        }
    }
}

fn nats_error(context: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::Unavailable(format!("{}: {}", context, e))
}

/// Durable JetStream pull consumer on one subject of the shared stream.
pub struct NatsSource {
    topic: &'static str,
    messages: Stream,
}

impl NatsSource {
    pub async fn subscribe(client: async_nats::Client, config: SubscriptionConfig) -> CoreResult<Self> {
        let jetstream = jetstream::new(client);

        let stream = jetstream
            .get_or_create_stream(StreamConfig {
                name: STREAM_NAME.to_string(),
                subjects: vec![
                    TOPIC_CI_COMPLETE.to_string(),
                    TOPIC_CD_WORKFLOW_STATUS.to_string(),
                ],
                ..Default::default()
            })
            .await
            .map_err(|e| nats_error("Failed to create stream", e))?;

        let consumer = stream
            .get_or_create_consumer(
                config.durable_name,
                ConsumerConfig {
                    durable_name: Some(config.durable_name.to_string()),
                    filter_subject: config.topic.to_string(),
                    deliver_policy: config.deliver_policy,
                    ack_policy: AckPolicy::Explicit,
                    ack_wait: config.ack_wait,
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| nats_error("Failed to create consumer", e))?;

        let messages = consumer
            .messages()
            .await
            .map_err(|e| nats_error("Failed to open message stream", e))?;

        info!(topic = config.topic, "Subscribed");
        Ok(NatsSource {
            topic: config.topic,
            messages,
        })
    }
}

struct NatsAck(jetstream::Message);

#[async_trait]
impl Acker for NatsAck {
    async fn ack(&self) -> CoreResult<()> {
        self.0.ack().await.map_err(|e| nats_error("Failed to ack", e))
    }
}

#[async_trait]
impl MessageSource for NatsSource {
    async fn next(&mut self) -> Option<Delivery> {
        loop {
            match self.messages.next().await? {
                Ok(message) => {
                    let id = match message.info() {
                        Ok(info) => format!("{}:{}", self.topic, info.stream_sequence),
                        Err(_) => format!("{}:unknown", self.topic),
                    };

                    return Some(Delivery::new(
                        message.subject.to_string(),
                        id,
                        message.payload.to_vec(),
                        Box::new(NatsAck(message)),
                    ));
                }
                Err(e) => {
                    error!(error = %e, topic = self.topic, "Failed to receive message");
                }
            }
        }
    }
}

/// In-process source fed by a [`ChannelPublisher`].
pub struct ChannelSource {
    rx: mpsc::Receiver<Delivery>,
}

#[async_trait]
impl MessageSource for ChannelSource {
    async fn next(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }
}

#[derive(Clone)]
pub struct ChannelPublisher {
    tx: mpsc::Sender<Delivery>,
    next_id: Arc<AtomicU64>,
    acked: Arc<Mutex<Vec<u64>>>,
}

impl ChannelPublisher {
    /// Returns the sequence number assigned to the message.
    pub async fn publish(&self, topic: &str, payload: impl Into<Vec<u8>>) -> CoreResult<u64> {
        let sequence = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;

        let delivery = Delivery::new(
            topic.to_string(),
            format!("{}:{}", topic, sequence),
            payload.into(),
            Box::new(ChannelAck {
                sequence,
                acked: self.acked.clone(),
            }),
        );

        self.tx
            .send(delivery)
            .await
            .map_err(|_| CoreError::Unavailable("channel source is closed".to_string()))?;

        Ok(sequence)
    }

    /// Sequence numbers acknowledged so far, in ack order.
    pub fn acked(&self) -> Vec<u64> {
        self.acked.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

struct ChannelAck {
    sequence: u64,
    acked: Arc<Mutex<Vec<u64>>>,
}

#[async_trait]
impl Acker for ChannelAck {
    async fn ack(&self) -> CoreResult<()> {
        debug!(sequence = self.sequence, "Ack");
        self.acked
            .lock()
            .map_err(|_| CoreError::Internal("ack registry poisoned".to_string()))?
            .push(self.sequence);
        Ok(())
    }
}

pub fn channel(buffer: usize) -> (ChannelPublisher, ChannelSource) {
    let (tx, rx) = mpsc::channel(buffer);
    (
        ChannelPublisher {
            tx,
            next_id: Arc::new(AtomicU64::new(0)),
            acked: Arc::new(Mutex::new(Vec::new())),
        },
        ChannelSource { rx },
    )
}
