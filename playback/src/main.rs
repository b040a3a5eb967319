use maritime_core::init_tracing;
use playback::{settings::Settings, startup::App};
use tracing::error;

#[tokio::main]
async fn main() {
    let settings = Settings::new().unwrap();
    init_tracing("maritime-playback", settings.log_format);

    let app = App::build(settings).await.unwrap();

    let shutdown = app.shutdown_token();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {e:?}");
        }
        shutdown.cancel();
    });

    app.run().await.unwrap();
}
