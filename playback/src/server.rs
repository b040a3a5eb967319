use std::{net::SocketAddr, sync::Arc};

use futures::{SinkExt, StreamExt};
use maritime_core::ControlCommand;
use snafu::ResultExt;
use tokio::{
    net::{TcpListener, TcpStream},
    task::JoinSet,
};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    error::{
        Result,
        error::{IoSnafu, WebSocketSnafu},
    },
    publisher::Publisher,
};

/// Accepts websocket consumers, forwards published events to them and passes
/// their control commands on to `commands`.
pub struct Server {
    listener: TcpListener,
    publisher: Arc<Publisher>,
    commands: async_channel::Sender<ControlCommand>,
}

impl Server {
    pub fn new(
        listener: TcpListener,
        publisher: Arc<Publisher>,
        commands: async_channel::Sender<ControlCommand>,
    ) -> Server {
        Server {
            listener,
            publisher,
            commands,
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().context(IoSnafu)
    }

    /// Runs until `shutdown` is cancelled, then waits for every connection to
    /// deliver what it has queued.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let publisher = self.publisher.clone();
                        let commands = self.commands.clone();
                        connections.spawn(async move {
                            if let Err(e) = serve_consumer(stream, peer, publisher, commands).await {
                                warn!(%peer, "consumer connection failed: {e:?}");
                            }
                        });
                    }
                    Err(e) => error!("failed to accept connection: {e:?}"),
                },
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        self.publisher.shutdown();
        while connections.join_next().await.is_some() {}
        info!("publisher server stopped");
    }
}

#[instrument(skip(stream, publisher, commands))]
async fn serve_consumer(
    stream: TcpStream,
    peer: SocketAddr,
    publisher: Arc<Publisher>,
    commands: async_channel::Sender<ControlCommand>,
) -> Result<()> {
    let ws = accept_async(stream).await.context(WebSocketSnafu)?;
    let (mut sink, mut source) = ws.split();

    let (id, mut queue) = publisher.subscribe();

    let mut writer = tokio::spawn(async move {
        while let Some(message) = queue.recv().await {
            sink.send(Message::Text(message.to_string()))
                .await
                .context(WebSocketSnafu)?;
        }
        // The registry dropped our handle, either on shutdown or because we
        // fell behind.
        sink.close().await.context(WebSocketSnafu)
    });

    let result = loop {
        tokio::select! {
            written = &mut writer => {
                break match written {
                    Ok(r) => r,
                    Err(e) => {
                        error!("consumer writer panicked: {e:?}");
                        Ok(())
                    }
                };
            }
            incoming = source.next() => match incoming {
                Some(Ok(Message::Text(text))) => match text.parse::<ControlCommand>() {
                    Ok(command) => {
                        debug!(?command, "received control command");
                        if commands.send(command).await.is_err() {
                            warn!("command channel closed, ignoring command");
                        }
                    }
                    Err(e) => warn!("rejected control message: {e}"),
                },
                Some(Ok(Message::Close(_))) | None => break Ok(()),
                Some(Ok(_)) => {}
                Some(Err(e)) => break Err(e).context(WebSocketSnafu),
            }
        }
    };

    publisher.unsubscribe(id);
    writer.abort();

    result
}
