use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Simple WebSocket abstraction - all we care about is send/receive
#[async_trait]
pub trait SocketWrapper: Send {
    /// Send a text message to the client
    async fn send_message(&mut self, message: String) -> Result<(), SocketError>;

    /// Receive the next message from the client (None if connection closed)
    async fn receive_message(&mut self) -> Result<Option<String>, SocketError>;

    /// Close the connection
    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Handler for incoming WebSocket messages
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Handle an incoming message from the client
    async fn handle_message(&self, connection_id: &str, message: String);
}

#[derive(Debug)]
pub enum SocketError {
    SendFailed(String),
    ReceiveFailed(String),
}

/// Direct implementation on axum's WebSocket
#[async_trait]
impl SocketWrapper for WebSocket {
    async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
        self.send(Message::Text(message))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }

    async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
        loop {
            match self.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text)),
                Some(Ok(Message::Close(_))) => return Ok(None),
                Some(Ok(_)) => continue, // Ignore binary/ping/pong
                Some(Err(e)) => return Err(SocketError::ReceiveFailed(e.to_string())),
                None => return Ok(None), // Connection closed
            }
        }
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::SendFailed(e.to_string()))
    }
}

/// A managed WebSocket connection: pumps outbound messages from the
/// connection manager's channel and feeds inbound messages to the router.
pub struct Connection {
    pub connection_id: String,
    socket: Box<dyn SocketWrapper>,
    outbound_receiver: mpsc::UnboundedReceiver<String>,
    message_handler: Arc<dyn MessageHandler>,
}

impl Connection {
    pub fn new(
        connection_id: String,
        socket: Box<dyn SocketWrapper>,
        outbound_receiver: mpsc::UnboundedReceiver<String>,
        message_handler: Arc<dyn MessageHandler>,
    ) -> Self {
        Self {
            connection_id,
            socket,
            outbound_receiver,
            message_handler,
        }
    }

    /// Run the connection - handles both sending and receiving until disconnect
    pub async fn run(mut self) -> Result<(), SocketError> {
        loop {
            tokio::select! {
                // Outbound messages (from our app to the client)
                msg = self.outbound_receiver.recv() => {
                    match msg {
                        Some(message) => {
                            self.socket.send_message(message).await?
                        }
                        None => break, // Channel closed, disconnect
                    }
                }

                // Inbound messages (from the client to our app)
                msg = self.socket.receive_message() => {
                    match msg {
                        Ok(Some(message)) => {
                            self.message_handler
                                .handle_message(&self.connection_id, message)
                                .await;
                        }
                        Ok(None) => break, // Client disconnected
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        // Clean disconnect
        let _ = self.socket.close().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Socket fed from a fixed inbound script, recording everything sent.
    struct FakeSocket {
        inbound: Mutex<Vec<String>>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl SocketWrapper for FakeSocket {
        async fn send_message(&mut self, message: String) -> Result<(), SocketError> {
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn receive_message(&mut self) -> Result<Option<String>, SocketError> {
            let mut inbound = self.inbound.lock().unwrap();
            if inbound.is_empty() {
                Ok(None)
            } else {
                Ok(Some(inbound.remove(0)))
            }
        }

        async fn close(&mut self) -> Result<(), SocketError> {
            Ok(())
        }
    }

    struct CollectingHandler {
        received: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl MessageHandler for CollectingHandler {
        async fn handle_message(&self, _connection_id: &str, message: String) {
            self.received.lock().unwrap().push(message);
        }
    }

    #[tokio::test]
    async fn test_connection_feeds_inbound_messages_to_handler() {
        let received = Arc::new(Mutex::new(vec![]));
        let sent = Arc::new(Mutex::new(vec![]));
        let socket = FakeSocket {
            inbound: Mutex::new(vec!["one".to_string(), "two".to_string()]),
            sent: sent.clone(),
        };
        let (_outbound_sender, outbound_receiver) = mpsc::unbounded_channel();
        let handler = Arc::new(CollectingHandler {
            received: received.clone(),
        });

        let connection = Connection::new(
            "conn-1".to_string(),
            Box::new(socket),
            outbound_receiver,
            handler,
        );
        connection.run().await.unwrap();

        assert_eq!(*received.lock().unwrap(), vec!["one", "two"]);
    }
}
