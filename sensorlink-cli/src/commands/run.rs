//! Run command - serve the sensor channel over stdin/stdout.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use sensorlink::channel::ChannelId;
use sensorlink::service::SensorService;

use crate::error::CliError;
use crate::line_channel::StdioChannel;
use crate::runner::CliRunner;

/// Arguments for the run command.
#[derive(Default)]
pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub debug: bool,
}

/// Run the service until stdin closes or Ctrl-C.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.config.as_deref(), args.debug)?;
    runner.log_startup("run");

    let config = runner.service_config();
    info!(
        gpsd_host = %config.gpsd_host,
        gpsd_port = config.gpsd_port,
        marker = %config.night_mode_marker.display(),
        poll_ms = config.poll_interval.as_millis() as u64,
        rounding = %config.rounding,
        "Service configuration"
    );

    // Set up signal handler for graceful shutdown
    let shutdown = CancellationToken::new();
    let handler_token = shutdown.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .map_err(|e| CliError::SignalHandler(e.to_string()))?;

    let runtime = runner.runtime()?;
    runtime.block_on(async {
        let channel = Arc::new(StdioChannel::stdio(ChannelId::SENSOR));
        let service = SensorService::new(Arc::clone(&channel), config);
        service.start();

        tokio::select! {
            _ = shutdown.cancelled() => info!("Interrupted, shutting down"),
            _ = channel.closed() => info!("Input closed, shutting down"),
        }

        service.shutdown().await;
    });

    // A blocked stdin read would otherwise hold the runtime open
    runtime.shutdown_timeout(Duration::from_millis(500));

    info!("Shutdown complete");
    Ok(())
}
