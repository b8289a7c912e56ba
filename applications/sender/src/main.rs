/// q - send one command to the loud daemon
use clap::Parser;
use loud_daemon::DaemonConfig;
use loud_sender::{command_for, deliver};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "q")]
#[command(about = "Queue a file or directory in loud; no argument stops, `q` quits", long_about = None)]
struct Cli {
    /// File or directory to enqueue, or `q` to quit the daemon
    target: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loud_sender=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = DaemonConfig::load()?;
    let command = command_for(cli.target.as_deref());

    deliver(config.control.port, &command).await?;
    Ok(())
}
