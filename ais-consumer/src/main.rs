use ais_consumer::{settings::Settings, startup::App};
use maritime_core::init_tracing;
use tokio_util::sync::CancellationToken;
use tracing::error;

#[tokio::main]
async fn main() {
    let settings = Settings::new().unwrap();
    init_tracing("maritime-ais-consumer", settings.log_format);

    let app = App::build(settings).await.unwrap();

    let shutdown = CancellationToken::new();
    let token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {e:?}");
        }
        token.cancel();
    });

    app.run(shutdown).await;
}
