/// loud - UDP-controlled background audio player
use loud_daemon::DaemonConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "loud=info,loud_daemon=info,loud_playback=info,loud_audio_desktop=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = DaemonConfig::load()?;
    tracing::debug!("Configuration: {:?}", config);

    loud_daemon::run(config).await
}
