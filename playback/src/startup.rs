use std::{net::SocketAddr, sync::Arc};

use maritime_core::ControlCommand;
use snafu::ResultExt;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::{
    engine::PlaybackEngine,
    error::{Result, error::BindSnafu},
    publisher::Publisher,
    route::{PortRoutes, RouteProvider},
    server::Server,
    settings::Settings,
};

pub struct App {
    engine: PlaybackEngine,
    server: Server,
    commands: async_channel::Receiver<ControlCommand>,
    settings: Settings,
    shutdown: CancellationToken,
}

impl App {
    pub async fn build(settings: Settings) -> Result<App> {
        Self::build_with_routes(settings, Arc::new(PortRoutes::default())).await
    }

    pub async fn build_with_routes(
        settings: Settings,
        routes: Arc<dyn RouteProvider>,
    ) -> Result<App> {
        let address = settings.address();
        let listener = TcpListener::bind(&address)
            .await
            .context(BindSnafu { address: &address })?;

        let publisher = Arc::new(Publisher::new(settings.consumer_queue_size));
        let engine = PlaybackEngine::new(publisher.clone(), routes, settings.navigation());

        let (sender, commands) = async_channel::bounded(settings.consumer_queue_size.max(1));
        let server = Server::new(listener, publisher, sender);

        Ok(App {
            engine,
            server,
            commands,
            settings,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.server.local_addr()
    }

    pub fn engine(&self) -> PlaybackEngine {
        self.engine.clone()
    }

    /// Cancelling the returned token stops the app.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn run(self) -> Result<()> {
        let App {
            engine,
            server,
            commands,
            settings,
            shutdown,
        } = self;

        engine
            .start(settings.message_interval, settings.speed_factor)
            .await?;

        for v in &settings.vessels {
            if let Err(e) = engine.spawn_vessel(v.mmsi, v.speed).await {
                warn!(mmsi = %v.mmsi, "failed to add initial vessel: {e:?}");
            }
        }

        let control = tokio::spawn(control_loop(engine.clone(), commands));

        info!("playback running");
        server.run(shutdown).await;

        engine.stop().await;
        control.abort();

        Ok(())
    }
}

/// Applies control commands from consumers to the engine, one at a time.
async fn control_loop(engine: PlaybackEngine, commands: async_channel::Receiver<ControlCommand>) {
    while let Ok(command) = commands.recv().await {
        apply_command(&engine, command).await;
    }
}

#[instrument(skip(engine))]
async fn apply_command(engine: &PlaybackEngine, command: ControlCommand) {
    let result = match command {
        ControlCommand::SetSpeed { speed } => engine.set_speed(speed).await,
        ControlCommand::AddVessel { mmsi, speed } => {
            engine.spawn_vessel(mmsi, speed).await.map(|added| {
                if !added {
                    info!(%mmsi, "ignored add_vessel for a vessel that is already tracked");
                }
            })
        }
    };

    if let Err(e) = result {
        error!("failed to apply control command: {e:?}");
    }
}
