use futures::{StreamExt, stream::BoxStream};
use snafu::ResultExt;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message},
};
use tracing::info;

use crate::error::{Result, error::WebSocketSnafu};

pub type FeedStream = BoxStream<'static, std::result::Result<String, tungstenite::Error>>;

/// Websocket client for the live position stream.
#[derive(Debug, Clone)]
pub struct FeedClient {
    url: String,
}

impl FeedClient {
    pub fn new(url: impl Into<String>) -> FeedClient {
        FeedClient { url: url.into() }
    }

    /// Connects and returns the text frames of the feed. The stream ends
    /// when the server closes the connection.
    pub async fn connect(&self) -> Result<FeedStream> {
        let (ws, _) = connect_async(self.url.as_str())
            .await
            .context(WebSocketSnafu)?;

        info!(url = %self.url, "connected to position feed");

        Ok(ws
            .filter_map(|message| async move {
                match message {
                    Ok(Message::Text(text)) => Some(Ok(text)),
                    Ok(_) => None,
                    Err(e) => Some(Err(e)),
                }
            })
            .boxed())
    }
}
