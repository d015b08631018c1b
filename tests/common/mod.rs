//! Shared fixtures for the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use poloniex_connector::core::errors::ExchangeError;
use poloniex_connector::core::kernel::{WsCodec, WsSession};
use poloniex_connector::exchanges::poloniex::{PoloniexCodec, PoloniexMessage};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use wiremock::MockServer;

pub const TEST_KEY: &str = "test-public-key";
pub const TEST_SECRET: &str = "secret";

pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// What a mock session observed, tagged with the session number
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsEvent {
    Connected(usize),
    Sent(usize, String),
    Closed(usize),
}

/// Event log shared by every session a factory produces
#[derive(Debug, Clone, Default)]
pub struct WsLog {
    events: Arc<Mutex<Vec<WsEvent>>>,
    sessions: Arc<AtomicUsize>,
    inbound: Arc<Mutex<VecDeque<String>>>,
    silent: Arc<AtomicBool>,
}

impl WsLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions whose reads park forever once the inbound queue is empty,
    /// like a socket where the server never speaks
    pub fn silent() -> Self {
        let log = Self::default();
        log.silent.store(true, Ordering::SeqCst);
        log
    }

    pub fn events(&self) -> Vec<WsEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<(usize, serde_json::Value)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                WsEvent::Sent(id, text) => Some((id, serde_json::from_str(&text).unwrap())),
                _ => None,
            })
            .collect()
    }

    pub fn closed(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                WsEvent::Closed(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.load(Ordering::SeqCst)
    }

    /// Queue a text frame for the next session read
    pub fn push_inbound(&self, text: &str) {
        self.inbound.lock().unwrap().push_back(text.to_string());
    }

    pub fn factory(&self) -> impl Fn() -> MockWs + Send + Sync + 'static {
        let log = self.clone();
        move || MockWs::new(log.clone())
    }

    fn record(&self, event: WsEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// In-memory `WsSession` that records traffic instead of opening sockets
pub struct MockWs {
    id: usize,
    log: WsLog,
    connected: bool,
    codec: PoloniexCodec,
}

impl MockWs {
    pub fn new(log: WsLog) -> Self {
        let id = log.sessions.fetch_add(1, Ordering::SeqCst);
        Self {
            id,
            log,
            connected: false,
            codec: PoloniexCodec::new(),
        }
    }
}

#[async_trait]
impl WsSession<PoloniexCodec> for MockWs {
    async fn connect(&mut self) -> Result<(), ExchangeError> {
        self.connected = true;
        self.log.record(WsEvent::Connected(self.id));
        Ok(())
    }

    async fn send_raw(&mut self, msg: Message) -> Result<(), ExchangeError> {
        if !self.connected {
            return Err(ExchangeError::WebSocketError("not connected".to_string()));
        }
        let text = msg.into_text().unwrap();
        self.log.record(WsEvent::Sent(self.id, text));
        Ok(())
    }

    async fn next_raw(&mut self) -> Option<Result<Message, ExchangeError>> {
        let queued = self.log.inbound.lock().unwrap().pop_front();
        match queued {
            Some(text) => Some(Ok(Message::Text(text))),
            None if self.log.silent.load(Ordering::SeqCst) => std::future::pending().await,
            None => None,
        }
    }

    async fn close(&mut self) -> Result<(), ExchangeError> {
        self.connected = false;
        self.log.record(WsEvent::Closed(self.id));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn send_command(
        &mut self,
        command: &<PoloniexCodec as WsCodec>::Command,
    ) -> Result<(), ExchangeError> {
        let message = self.codec.encode_command(command)?;
        self.send_raw(message).await
    }

    async fn next_message(&mut self) -> Option<Result<PoloniexMessage, ExchangeError>> {
        let raw = self.next_raw().await?;
        match raw {
            Ok(message) => self.codec.decode_message(message).transpose(),
            Err(e) => Some(Err(e)),
        }
    }
}
