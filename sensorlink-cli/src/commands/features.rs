//! Features command - print the service discovery entry.

use std::sync::Arc;

use sensorlink::channel::messages::ServiceDiscoveryResponse;
use sensorlink::channel::ChannelId;
use sensorlink::service::{SensorService, SensorServiceConfig};

use crate::error::CliError;
use crate::line_channel::StdioChannel;

/// Run the features command.
pub fn run() -> Result<(), CliError> {
    println!("{}", discovery_json()?);
    Ok(())
}

/// Discovery response holding only the sensor channel, as pretty JSON.
fn discovery_json() -> Result<String, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let response = runtime.block_on(async {
        let channel = Arc::new(StdioChannel::stdio(ChannelId::SENSOR));
        let service = SensorService::new(channel, SensorServiceConfig::default());

        let mut response = ServiceDiscoveryResponse::default();
        service.fill_features(&mut response);
        response
    });

    serde_json::to_string_pretty(&response).map_err(|e| CliError::Output(e.into()))
}
