use std::{sync::Arc, time::Duration};

use maritime_core::{Environment, IngestionStorage};
use postgres::PostgresAdapter;
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::{
    consumer::Consumer,
    counters::QualityCounters,
    error::{Result, error::PostgresSnafu},
    feed::FeedClient,
    pipeline::Ingestor,
    settings::Settings,
};

pub struct App {
    consumer: Consumer,
    ingestor: Arc<Ingestor>,
    feed: FeedClient,
    reconnect_delay: Duration,
}

impl App {
    pub async fn build(settings: Settings) -> Result<App> {
        let postgres = PostgresAdapter::new(&settings.postgres)
            .await
            .context(PostgresSnafu)?;

        if settings.environment == Environment::Local {
            postgres.do_migrations().await.context(PostgresSnafu)?;
        }

        App::with_storage(settings, Arc::new(postgres)).await
    }

    pub async fn with_storage(
        settings: Settings,
        storage: Arc<dyn IngestionStorage>,
    ) -> Result<App> {
        let ingestor = Arc::new(Ingestor::new(
            storage,
            Arc::new(QualityCounters::new()),
            settings.batch_size,
            settings.commit_retry,
        ));
        ingestor.restore().await?;

        Ok(App {
            consumer: Consumer::new(ingestor.clone(), settings.flush_interval),
            ingestor,
            feed: FeedClient::new(settings.feed_url),
            reconnect_delay: settings.reconnect_delay,
        })
    }

    pub fn ingestor(&self) -> Arc<Ingestor> {
        self.ingestor.clone()
    }

    /// Consumes the feed, reconnecting after a fixed delay whenever the
    /// connection fails, until `shutdown` is cancelled.
    pub async fn run(mut self, shutdown: CancellationToken) {
        self.consumer.set_shutdown(shutdown.clone());

        loop {
            self.run_impl(&shutdown).await;
            if shutdown.is_cancelled() {
                break;
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        if let Err(e) = self.ingestor.flush().await {
            error!("failed to flush on shutdown: {e:?}");
        }
        self.ingestor.log_counters();
        info!("ais consumer stopped");
    }

    #[instrument(skip_all)]
    async fn run_impl(&self, shutdown: &CancellationToken) {
        if let Err(e) = self.run_inner(shutdown).await {
            error!("consumer failed: {e:?}");
        }
    }

    async fn run_inner(&self, shutdown: &CancellationToken) -> Result<()> {
        let stream = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            stream = self.feed.connect() => stream?,
        };
        self.consumer.run(stream).await
    }
}
