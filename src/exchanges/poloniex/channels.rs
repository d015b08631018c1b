use crate::core::errors::ExchangeError;
use crate::core::kernel::WsSession;
use crate::exchanges::poloniex::codec::{ChannelCommand, PoloniexCodec, PoloniexMessage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::{Mutex, MutexGuard, Notify};
use tracing::{debug, instrument, trace, warn};

/// Lifecycle of one registry entry.
///
/// `Unconnected` is the absence of an entry; there is no reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connected,
    Subscribed,
    Closed,
}

struct ChannelInner<W> {
    session: Mutex<W>,
    state: StdMutex<ChannelState>,
    /// Wakes a reader parked on the socket so a writer can take the session
    interrupt: Notify,
    pending_writers: AtomicUsize,
}

/// Registers a waiting writer for as long as it is alive
struct PendingWriter<'a>(&'a AtomicUsize);

impl<'a> PendingWriter<'a> {
    fn register(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for PendingWriter<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Shared handle to the connection registered for one channel id.
///
/// A reader waiting in `next_message` gives the connection up whenever
/// `send` or `close` asks for it, then resumes reading. Closing ends any
/// pending read with `None`.
pub struct ChannelHandle<W> {
    channel_id: u64,
    inner: Arc<ChannelInner<W>>,
}

impl<W> Clone for ChannelHandle<W> {
    fn clone(&self) -> Self {
        Self {
            channel_id: self.channel_id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W> std::fmt::Debug for ChannelHandle<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("channel_id", &self.channel_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<W> ChannelHandle<W> {
    pub fn channel_id(&self) -> u64 {
        self.channel_id
    }

    /// True when both handles point at the same underlying connection
    pub fn same_connection(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn state(&self) -> ChannelState {
        *self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn replace_state(&self, state: ChannelState) -> ChannelState {
        std::mem::replace(
            &mut *self
                .inner
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
            state,
        )
    }

    /// Take the connection ahead of any reader
    async fn lock_for_write(&self) -> MutexGuard<'_, W> {
        let _pending = PendingWriter::register(&self.inner.pending_writers);
        self.inner.interrupt.notify_waiters();
        self.inner.session.lock().await
    }
}

impl<W: WsSession<PoloniexCodec>> ChannelHandle<W> {
    fn new(channel_id: u64, session: W) -> Self {
        Self {
            channel_id,
            inner: Arc::new(ChannelInner {
                session: Mutex::new(session),
                state: StdMutex::new(ChannelState::Connected),
                interrupt: Notify::new(),
                pending_writers: AtomicUsize::new(0),
            }),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.state() != ChannelState::Closed && self.lock_for_write().await.is_connected()
    }

    /// Send a command on this connection and advance the state accordingly
    pub async fn send(&self, command: &ChannelCommand) -> Result<(), ExchangeError> {
        let mut session = self.lock_for_write().await;
        if self.state() == ChannelState::Closed {
            return Err(ExchangeError::WebSocketError(format!(
                "Channel {} connection is closed",
                self.channel_id
            )));
        }

        session.send_command(command).await?;
        let next = match command {
            ChannelCommand::Subscribe { .. } | ChannelCommand::SubscribePrivate { .. } => {
                ChannelState::Subscribed
            }
            ChannelCommand::Unsubscribe { .. } => ChannelState::Connected,
        };
        // A close that raced this send wins
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if *state != ChannelState::Closed {
            *state = next;
        }
        Ok(())
    }

    /// Next decoded frame; `None` once the stream has ended or the channel is closed
    pub async fn next_message(&self) -> Option<Result<PoloniexMessage, ExchangeError>> {
        loop {
            if self.state() == ChannelState::Closed {
                return None;
            }

            // Armed before checking for writers so a notify in between is not lost
            let interrupted = self.inner.interrupt.notified();
            tokio::pin!(interrupted);
            interrupted.as_mut().enable();

            let mut session = self.inner.session.lock().await;
            if self.inner.pending_writers.load(Ordering::SeqCst) > 0 {
                drop(session);
                tokio::task::yield_now().await;
                continue;
            }
            if self.state() == ChannelState::Closed {
                return None;
            }

            tokio::select! {
                biased;
                () = interrupted.as_mut() => {
                    trace!("Read on channel {} yielded to a writer", self.channel_id);
                }
                message = session.next_message() => return message,
            }
        }
    }

    /// Mark the channel closed, then shut the connection down.
    ///
    /// The state flips before the first await, so a caller dropped mid-close
    /// still leaves the handle closed.
    pub async fn close(&self) -> Result<(), ExchangeError> {
        if self.replace_state(ChannelState::Closed) == ChannelState::Closed {
            return Ok(());
        }
        let mut session = self.lock_for_write().await;
        session.close().await
    }
}

type SessionFactory<W> = Box<dyn Fn() -> W + Send + Sync>;

/// One streaming connection per channel id, owned by a single client.
///
/// Connecting a channel id that already has an entry closes the old
/// connection and replaces it.
pub struct ChannelRegistry<W> {
    factory: SessionFactory<W>,
    channels: Mutex<HashMap<u64, ChannelHandle<W>>>,
}

impl<W> std::fmt::Debug for ChannelRegistry<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry").finish_non_exhaustive()
    }
}

impl<W: WsSession<PoloniexCodec>> ChannelRegistry<W> {
    /// `factory` yields a fresh, unconnected session per call
    pub fn new(factory: impl Fn() -> W + Send + Sync + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Open a new connection and register it under `channel_id`
    #[instrument(skip(self), fields(exchange = "poloniex"))]
    pub async fn connect_channel(&self, channel_id: u64) -> Result<ChannelHandle<W>, ExchangeError> {
        let mut session = (self.factory)();
        session.connect().await?;
        let handle = ChannelHandle::new(channel_id, session);

        let previous = self
            .channels
            .lock()
            .await
            .insert(channel_id, handle.clone());

        if let Some(previous) = previous {
            warn!("Replacing existing connection for channel {}", channel_id);
            if let Err(e) = previous.close().await {
                warn!("Failed to close replaced connection: {}", e);
            }
        }

        debug!("Channel {} connected", channel_id);
        Ok(handle)
    }

    /// Connect the command's channel and send the command on the new connection
    #[instrument(skip(self, command), fields(exchange = "poloniex", channel = command.channel()))]
    pub async fn subscribe(
        &self,
        command: ChannelCommand,
    ) -> Result<ChannelHandle<W>, ExchangeError> {
        let handle = self.connect_channel(command.channel()).await?;
        handle.send(&command).await?;
        Ok(handle)
    }

    pub async fn get_connection(&self, channel_id: u64) -> Option<ChannelHandle<W>> {
        self.channels.lock().await.get(&channel_id).cloned()
    }

    async fn require(&self, channel_id: u64) -> Result<ChannelHandle<W>, ExchangeError> {
        self.get_connection(channel_id)
            .await
            .ok_or(ExchangeError::ChannelNotFound(channel_id))
    }

    pub async fn send(&self, channel_id: u64, command: &ChannelCommand) -> Result<(), ExchangeError> {
        self.require(channel_id).await?.send(command).await
    }

    pub async fn receive(
        &self,
        channel_id: u64,
    ) -> Result<Option<Result<PoloniexMessage, ExchangeError>>, ExchangeError> {
        Ok(self.require(channel_id).await?.next_message().await)
    }

    /// Registered channel ids in ascending order
    pub async fn channel_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.channels.lock().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub async fn len(&self) -> usize {
        self.channels.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.channels.lock().await.is_empty()
    }

    /// Close the channel's connection and drop its entry
    #[instrument(skip(self), fields(exchange = "poloniex"))]
    pub async fn close_channel(&self, channel_id: u64) -> Result<(), ExchangeError> {
        let handle = self
            .channels
            .lock()
            .await
            .remove(&channel_id)
            .ok_or(ExchangeError::ChannelNotFound(channel_id))?;
        handle.close().await
    }

    /// Close every registered connection; the first failure is reported after all were attempted
    pub async fn close_all(&self) -> Result<(), ExchangeError> {
        let handles: Vec<ChannelHandle<W>> =
            self.channels.lock().await.drain().map(|(_, h)| h).collect();

        let mut first_error = None;
        for handle in handles {
            if let Err(e) = handle.close().await {
                warn!("Failed to close channel {}: {}", handle.channel_id(), e);
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
