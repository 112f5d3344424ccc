/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod handler;
pub mod pubsub;


pub use handler::{CiCompleteEvent, handle_ci_complete};
pub use pubsub::{Delivery, MessageSource, NatsSource, SubscriptionConfig};

use cadence_core::sentry_guard;
use cadence_core::types::ServerState;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// What happened to one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Processed {
    Acked,
    /// Left for redelivery after the ack-wait.
    Unacked,
}

/// Handles one delivery within `ack_wait` and acks it unless a dependency was unavailable.
///
/// Payloads that cannot be decoded or handled are acked; redelivering them would fail again.
#[instrument(skip(state, delivery), fields(topic = %delivery.topic, id = %delivery.id))]
pub async fn process(state: Arc<ServerState>, delivery: Delivery, ack_wait: Duration) -> Processed {
    let cancel = CancellationToken::new();
    let timer = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            tokio::time::sleep(ack_wait).await;
            cancel.cancel();
        }
    });

    let result = handler::handle_delivery(state, &delivery, cancel).await;
    timer.abort();

    match result {
        Err(e) if e.is_unavailable() => {
            warn!(error = %e, "Leaving message for redelivery");
            return Processed::Unacked;
        }
        Err(e) => error!(error = %e, "Failed to process message"),
        Ok(()) => debug!("Processed message"),
    }

    if let Err(e) = delivery.ack().await {
        error!(error = %e, "Failed to ack message");
        return Processed::Unacked;
    }

    Processed::Acked
}

/// Processes deliveries one at a time until the source closes.
pub async fn consume<S: MessageSource>(state: Arc<ServerState>, mut source: S, ack_wait: Duration) {
    while let Some(delivery) = source.next().await {
        process(Arc::clone(&state), delivery, ack_wait).await;
    }

    info!("Message source closed");
}

async fn subscribe_and_consume(
    state: Arc<ServerState>,
    client: async_nats::Client,
    config: SubscriptionConfig,
) {
    let _guard = sentry_guard(&state.cli);
    let ack_wait = config.ack_wait;
    let topic = config.topic;

    match NatsSource::subscribe(client, config).await {
        Ok(source) => consume(state, source, ack_wait).await,
        Err(e) => error!(error = %e, topic, "Failed to subscribe"),
    }
}

/// Connects to the broker and consumes both topics in their own tasks.
/// Without a configured broker URL the subscriber stays disabled.
pub async fn start_subscriber(state: Arc<ServerState>) -> std::io::Result<()> {
    let Some(url) = state.cli.nats_url.clone() else {
        info!("No broker configured, subscriber disabled");
        return Ok(());
    };

    let client = async_nats::connect(&url)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to {}: {}", url, e)))?;

    let ack_wait = Duration::from_secs(state.cli.auto_cd_trigger_ack_wait_in_secs);

    tokio::spawn(subscribe_and_consume(
        Arc::clone(&state),
        client.clone(),
        SubscriptionConfig::ci_complete(ack_wait),
    ));

    tokio::spawn(subscribe_and_consume(
        state,
        client,
        SubscriptionConfig::workflow_status(ack_wait),
    ));

    Ok(())
}
