//! The subscribing half of the broker.
//!
//! One subscriber runs per gateway process. It holds a dedicated pub/sub
//! connection, tracks the set of subscribed topics so they survive a
//! reconnect, and fans received messages out over a broadcast channel.

use blog_core::{StreamEvent, Topic};
use futures_util::StreamExt;
use redis::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, RwLock};

/// Errors from the subscribing side of the broker
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis connection failed: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Event payload did not parse: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Subscriber is gone")]
    ChannelClosed,
}

/// Result alias for subscriber operations
pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// A message lifted off the wire, pre-parsed for the dispatcher
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    /// Parsed topic, if the channel name is one of ours
    pub topic: Option<Topic>,
    /// Parsed event, when the payload is valid event JSON
    pub event: Option<StreamEvent>,
    /// Payload exactly as it arrived
    pub payload: String,
}

impl ReceivedMessage {
    fn from_redis(channel_name: &str, payload: String) -> Self {
        Self {
            topic: Topic::parse(channel_name),
            event: StreamEvent::from_json(&payload).ok(),
            payload,
        }
    }
}

/// Tunables for the subscriber
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Broker connection URL
    pub redis_url: String,
    /// Broadcast channel capacity
    pub broadcast_buffer: usize,
    /// Delay before retrying a failed connection, in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

/// Subscription management commands sent to the listener task
#[derive(Debug)]
enum SubscriberCommand {
    Subscribe(Vec<String>),
    Unsubscribe(Vec<String>),
    Shutdown,
}

/// What the listener should do after handling a command
enum ControlFlow {
    Continue,
    Stop,
}

/// Redis Pub/Sub subscriber handle
///
/// Cheap to share; the actual connection lives in a background task.
pub struct Subscriber {
    /// Topic names the listener is (or will be, after reconnect) subscribed to
    subscribed: Arc<RwLock<HashSet<String>>>,
    /// Fan-out to every `receiver()`
    broadcast_tx: broadcast::Sender<ReceivedMessage>,
    /// Commands for the listener task
    control_tx: mpsc::Sender<SubscriberCommand>,
}

impl Subscriber {
    /// Start the background listener and hand back a control handle
    pub fn new(config: SubscriberConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.broadcast_buffer);
        let (control_tx, control_rx) = mpsc::channel(32);
        let subscribed = Arc::new(RwLock::new(HashSet::new()));

        tokio::spawn(listener(
            config,
            subscribed.clone(),
            broadcast_tx.clone(),
            control_rx,
        ));

        Self {
            subscribed,
            broadcast_tx,
            control_tx,
        }
    }

    /// Ask the listener to join the given topics
    pub async fn subscribe(&self, topics: &[Topic]) -> SubscriberResult<()> {
        self.send_command(SubscriberCommand::Subscribe(topic_names(topics)))
            .await
    }

    /// Ask the listener to leave the given topics
    pub async fn unsubscribe(&self, topics: &[Topic]) -> SubscriberResult<()> {
        self.send_command(SubscriberCommand::Unsubscribe(topic_names(topics)))
            .await
    }

    /// A fresh receiver on the fan-out channel
    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<ReceivedMessage> {
        self.broadcast_tx.subscribe()
    }

    /// Topic names currently tracked for (re)subscription
    pub async fn subscribed_topics(&self) -> Vec<String> {
        self.subscribed.read().await.iter().cloned().collect()
    }

    /// Tell the listener to stop for good
    pub async fn shutdown(&self) -> SubscriberResult<()> {
        self.send_command(SubscriberCommand::Shutdown).await
    }

    async fn send_command(&self, command: SubscriberCommand) -> SubscriberResult<()> {
        self.control_tx
            .send(command)
            .await
            .map_err(|_| SubscriberError::ChannelClosed)
    }
}

fn topic_names(topics: &[Topic]) -> Vec<String> {
    topics.iter().map(Topic::name).collect()
}

/// Background task: connect, serve, reconnect on failure
async fn listener(
    config: SubscriberConfig,
    subscribed: Arc<RwLock<HashSet<String>>>,
    broadcast_tx: broadcast::Sender<ReceivedMessage>,
    mut control_rx: mpsc::Receiver<SubscriberCommand>,
) {
    loop {
        match serve(&config, &subscribed, &broadcast_tx, &mut control_rx).await {
            Ok(ControlFlow::Stop) => {
                tracing::info!("Subscriber shutting down");
                return;
            }
            Ok(ControlFlow::Continue) => {
                tracing::warn!("Pub/Sub stream ended, reconnecting");
            }
            Err(e) => {
                tracing::error!(error = %e, "Subscriber error, reconnecting");
            }
        }
        tokio::time::sleep(Duration::from_millis(config.reconnect_delay_ms)).await;
    }
}

/// One connection's lifetime: subscribe to the tracked set, then interleave
/// incoming messages with control commands until either ends
async fn serve(
    config: &SubscriberConfig,
    subscribed: &Arc<RwLock<HashSet<String>>>,
    broadcast_tx: &broadcast::Sender<ReceivedMessage>,
    control_rx: &mut mpsc::Receiver<SubscriberCommand>,
) -> SubscriberResult<ControlFlow> {
    let client = Client::open(config.redis_url.as_str())?;
    let mut pubsub = client.get_async_pubsub().await?;

    // Topics registered before (or across) this connection
    for topic in subscribed.read().await.iter() {
        pubsub.subscribe(topic).await?;
    }

    tracing::info!("Subscriber connected to Redis");

    loop {
        // `on_message` borrows the connection, so the stream is scoped to
        // one select round and rebuilt after any command touches `pubsub`
        let mut stream = pubsub.on_message();

        tokio::select! {
            msg = stream.next() => {
                drop(stream);
                let Some(msg) = msg else {
                    return Ok(ControlFlow::Continue);
                };

                let channel = msg.get_channel_name().to_string();
                let payload: String = msg.get_payload().unwrap_or_default();
                tracing::trace!(topic = %channel, "Received Pub/Sub message");

                // No receivers is fine; the gateway may not have started yet
                let _ = broadcast_tx.send(ReceivedMessage::from_redis(&channel, payload));
            }

            cmd = control_rx.recv() => {
                drop(stream);
                let outcome = apply_command(&mut pubsub, subscribed, cmd).await;
                if matches!(outcome, ControlFlow::Stop) {
                    return Ok(ControlFlow::Stop);
                }
            }
        }
    }
}

/// Apply one control command against the live connection and the tracked set
async fn apply_command(
    pubsub: &mut redis::aio::PubSub,
    subscribed: &Arc<RwLock<HashSet<String>>>,
    command: Option<SubscriberCommand>,
) -> ControlFlow {
    match command {
        Some(SubscriberCommand::Subscribe(topics)) => {
            for topic in topics {
                match pubsub.subscribe(&topic).await {
                    Ok(()) => {
                        subscribed.write().await.insert(topic.clone());
                        tracing::debug!(topic = %topic, "Subscribed to topic");
                    }
                    Err(e) => {
                        tracing::error!(topic = %topic, error = %e, "Failed to subscribe");
                    }
                }
            }
            ControlFlow::Continue
        }
        Some(SubscriberCommand::Unsubscribe(topics)) => {
            for topic in topics {
                match pubsub.unsubscribe(&topic).await {
                    Ok(()) => {
                        subscribed.write().await.remove(&topic);
                        tracing::debug!(topic = %topic, "Unsubscribed from topic");
                    }
                    Err(e) => {
                        tracing::error!(topic = %topic, error = %e, "Failed to unsubscribe");
                    }
                }
            }
            ControlFlow::Continue
        }
        // A closed control channel means every handle is gone
        Some(SubscriberCommand::Shutdown) | None => ControlFlow::Stop,
    }
}

/// Fluent construction of a subscriber, optionally pre-joined to topics
pub struct SubscriberBuilder {
    config: SubscriberConfig,
    initial_topics: Vec<Topic>,
}

impl SubscriberBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SubscriberConfig::default(),
            initial_topics: Vec::new(),
        }
    }

    /// Point the subscriber at a broker
    #[must_use]
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.config.redis_url = url.into();
        self
    }

    /// Capacity of the fan-out channel
    #[must_use]
    pub fn broadcast_buffer(mut self, size: usize) -> Self {
        self.config.broadcast_buffer = size;
        self
    }

    /// How long to wait before redialing a failed connection
    #[must_use]
    pub fn reconnect_delay_ms(mut self, delay: u64) -> Self {
        self.config.reconnect_delay_ms = delay;
        self
    }

    /// Join this topic as soon as the connection is up
    #[must_use]
    pub fn subscribe(mut self, topic: Topic) -> Self {
        self.initial_topics.push(topic);
        self
    }

    /// Start the subscriber and apply any initial subscriptions
    pub async fn build(self) -> SubscriberResult<Subscriber> {
        let subscriber = Subscriber::new(self.config);

        if !self.initial_topics.is_empty() {
            subscriber.subscribe(&self.initial_topics).await?;
        }

        Ok(subscriber)
    }
}

impl Default for SubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}
