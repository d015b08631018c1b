use crate::core::{errors::ExchangeError, kernel::WsSession, traits::ChannelSubscriber};
use crate::exchanges::poloniex::{
    channels::{ChannelHandle, ChannelRegistry},
    codec::{ChannelCommand, PoloniexCodec},
    signer::PoloniexSigner,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;

/// Push API channels over the registry
pub struct Streaming<W> {
    registry: ChannelRegistry<W>,
    signer: Arc<PoloniexSigner>,
}

impl<W: WsSession<PoloniexCodec>> Streaming<W> {
    pub fn new(
        factory: impl Fn() -> W + Send + Sync + 'static,
        signer: Arc<PoloniexSigner>,
    ) -> Self {
        Self {
            registry: ChannelRegistry::new(factory),
            signer,
        }
    }

    pub fn registry(&self) -> &ChannelRegistry<W> {
        &self.registry
    }

    pub async fn get_connection(&self, channel_id: u64) -> Option<ChannelHandle<W>> {
        self.registry.get_connection(channel_id).await
    }

    pub async fn channel_ids(&self) -> Vec<u64> {
        self.registry.channel_ids().await
    }
}

#[async_trait]
impl<W: WsSession<PoloniexCodec>> ChannelSubscriber for Streaming<W> {
    type Handle = ChannelHandle<W>;

    async fn connect_channel(&self, channel_id: u64) -> Result<ChannelHandle<W>, ExchangeError> {
        self.registry.connect_channel(channel_id).await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn subscribe_public(&self, channel_id: u64) -> Result<ChannelHandle<W>, ExchangeError> {
        self.registry
            .subscribe(ChannelCommand::Subscribe {
                channel: channel_id,
            })
            .await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn subscribe_private(&self, channel_id: u64) -> Result<ChannelHandle<W>, ExchangeError> {
        // Fails before any connection is opened when credentials are missing
        let auth = self.signer.channel_auth()?;
        self.registry
            .subscribe(ChannelCommand::SubscribePrivate {
                channel: channel_id,
                auth,
            })
            .await
    }

    #[instrument(skip(self), fields(exchange = "poloniex"))]
    async fn unsubscribe(&self, channel_id: u64) -> Result<(), ExchangeError> {
        self.registry
            .send(
                channel_id,
                &ChannelCommand::Unsubscribe {
                    channel: channel_id,
                },
            )
            .await
    }

    async fn close_channel(&self, channel_id: u64) -> Result<(), ExchangeError> {
        self.registry.close_channel(channel_id).await
    }

    async fn close_all(&self) -> Result<(), ExchangeError> {
        self.registry.close_all().await
    }
}
