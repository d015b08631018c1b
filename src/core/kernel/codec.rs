use crate::core::errors::ExchangeError;
use tokio_tungstenite::tungstenite::Message;

/// Codec trait for handling exchange-specific WebSocket message encoding/decoding
///
/// This trait defines the contract for converting between raw WebSocket messages
/// and exchange-specific typed messages.
pub trait WsCodec: Send + Sync + 'static {
    /// Outbound commands (subscribe, unsubscribe, ...)
    type Command: Send + Sync;

    /// The type representing parsed messages from this exchange
    type Message: Send + Sync;

    /// Encode a command into a WebSocket message ready to be sent
    fn encode_command(&self, command: &Self::Command) -> Result<Message, ExchangeError>;

    /// Decode a raw WebSocket message into a typed message
    ///
    /// This method should only handle data messages. Control messages (ping, pong, close)
    /// are handled at the transport level.
    ///
    /// # Returns
    /// - `Ok(Some(message))` - Successfully decoded message
    /// - `Ok(None)` - Message was ignored/filtered by codec
    /// - `Err(error)` - Failed to decode message
    fn decode_message(&self, message: Message) -> Result<Option<Self::Message>, ExchangeError>;
}
