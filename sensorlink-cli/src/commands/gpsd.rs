//! Gpsd command - watch the location daemon and print location events.
//!
//! Prints one JSON line per reportable fix, encoded exactly as the service
//! would send it. Useful for checking a receiver before running the service.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use sensorlink::channel::messages::SensorEventIndication;
use sensorlink::channel::OutboundMessage;
use sensorlink::location::{Fix, GpsdClient, LocationClient};
use sensorlink::service::{encode_location, ScaleRounding, SensorServiceConfig};

use crate::error::CliError;
use crate::runner::load_config;

/// Arguments for the gpsd command.
#[derive(Default)]
pub struct GpsdArgs {
    pub config: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub seconds: u64,
}

/// Run the gpsd command.
pub fn run(args: GpsdArgs) -> Result<(), CliError> {
    let config = SensorServiceConfig::from(&load_config(args.config.as_deref())?);
    let host = args.host.unwrap_or_else(|| config.gpsd_host.clone());
    let port = args.port.unwrap_or(config.gpsd_port);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    runtime.block_on(async {
        let mut client = GpsdClient::with_connect_timeout(config.gpsd_connect_timeout);
        client.connect(&host, port).await?;
        eprintln!("Connected to gpsd at {}:{}", host, port);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(args.seconds);
        let mut printed = 0usize;
        let result = watch(&mut client, deadline, &config, &mut printed).await;

        client.disconnect();
        eprintln!("{} location event(s)", printed);
        result
    })
}

/// Print events until `deadline` or until gpsd hangs up.
async fn watch(
    client: &mut GpsdClient,
    deadline: tokio::time::Instant,
    config: &SensorServiceConfig,
    printed: &mut usize,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    while tokio::time::Instant::now() < deadline {
        if client.data_ready() {
            if let Some(line) = client.read_fix()?.and_then(|fix| event_line(&fix, config.rounding)) {
                writeln!(stdout.lock(), "{}", line).map_err(CliError::Output)?;
                *printed += 1;
            }
        }
        if !client.is_connected() {
            eprintln!("gpsd closed the connection");
            break;
        }
        tokio::time::sleep(config.poll_interval).await;
    }
    Ok(())
}

/// JSON line for `fix`, or `None` when the fix is not reportable.
fn event_line(fix: &Fix, rounding: ScaleRounding) -> Option<String> {
    if !fix.is_reportable() {
        return None;
    }
    let event = SensorEventIndication::gps_location(encode_location(fix, rounding));
    serde_json::to_string(&OutboundMessage::from(event)).ok()
}
