//! gpsd client.
//!
//! Speaks the gpsd JSON protocol over a tokio `TcpStream`. Connecting is
//! async and bounded by the connect timeout; it covers name resolution, the
//! TCP handshake and the WATCH request. Once connected, every poll drains
//! whatever the daemon has sent into a line buffer through `try_read`,
//! so polling never waits.
//!
//! Only `TPV` (time-position-velocity) reports produce fixes. `VERSION`,
//! `DEVICES`, `WATCH`, `SKY` and any other class are consumed and ignored.

use std::io::{self, ErrorKind};
use std::time::Duration;

use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, trace};

use super::error::LocationError;
use super::fix::{Fix, FixMode, FixStatus};
use super::{ConnectFuture, LocationClient};

/// Default gpsd host.
pub const DEFAULT_GPSD_HOST: &str = "127.0.0.1";

/// Default gpsd port.
pub const DEFAULT_GPSD_PORT: u16 = 2947;

/// Default TCP connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

const WATCH_ENABLE: &[u8] = b"?WATCH={\"enable\":true,\"json\":true};\n";
const WATCH_DISABLE: &[u8] = b"?WATCH={\"enable\":false};\n";

/// Bytes requested per read.
const READ_CHUNK: usize = 4096;

/// Upper bound on unterminated data kept between polls.
const MAX_PENDING_BYTES: usize = 64 * 1024;

/// Polling client for a gpsd daemon.
pub struct GpsdClient {
    stream: Option<TcpStream>,
    buffer: Vec<u8>,
    connect_timeout: Duration,
}

impl GpsdClient {
    pub fn new() -> Self {
        Self::with_connect_timeout(DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn with_connect_timeout(connect_timeout: Duration) -> Self {
        Self {
            stream: None,
            buffer: Vec::new(),
            connect_timeout,
        }
    }

    /// Read everything currently available without waiting.
    fn fill_buffer(&mut self) -> Result<(), LocationError> {
        let Some(stream) = self.stream.as_ref() else {
            return Ok(());
        };

        let mut chunk = [0u8; READ_CHUNK];
        loop {
            match stream.try_read(&mut chunk) {
                Ok(0) => {
                    debug!("gpsd closed the connection");
                    self.stream = None;
                    return Ok(());
                }
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.stream = None;
                    return Err(LocationError::Io(e));
                }
            }
        }

        if self.buffer.len() > MAX_PENDING_BYTES && !self.buffer.contains(&b'\n') {
            debug!(
                pending = self.buffer.len(),
                "Discarding oversized unterminated gpsd data"
            );
            self.buffer.clear();
        }

        Ok(())
    }

    fn has_complete_line(&self) -> bool {
        self.buffer.contains(&b'\n')
    }

    fn take_line(&mut self) -> Option<String> {
        let end = self.buffer.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.buffer.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }
}

impl Default for GpsdClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve, connect and enable watch mode.
async fn open_watch(host: &str, port: u16) -> io::Result<TcpStream> {
    let mut stream = TcpStream::connect((host, port)).await?;
    stream.write_all(WATCH_ENABLE).await?;
    Ok(stream)
}

impl LocationClient for GpsdClient {
    fn connect<'a>(&'a mut self, host: &'a str, port: u16) -> ConnectFuture<'a> {
        Box::pin(async move {
            self.disconnect();

            let addr = format!("{}:{}", host, port);
            let stream = match tokio::time::timeout(self.connect_timeout, open_watch(host, port))
                .await
            {
                Ok(Ok(stream)) => stream,
                Ok(Err(source)) => return Err(LocationError::Connect { addr, source }),
                Err(_) => {
                    return Err(LocationError::Timeout {
                        addr,
                        timeout: self.connect_timeout,
                    })
                }
            };

            self.stream = Some(stream);
            self.buffer.clear();
            Ok(())
        })
    }

    fn disconnect(&mut self) {
        if let Some(stream) = self.stream.take() {
            match stream.try_write(WATCH_DISABLE) {
                Ok(n) if n < WATCH_DISABLE.len() => {
                    debug!(written = n, "gpsd WATCH disable only partly written")
                }
                Ok(_) => {}
                Err(e) => debug!(error = %e, "gpsd WATCH disable failed"),
            }
            // Dropping the stream closes the socket.
        }
        self.buffer.clear();
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn data_ready(&mut self) -> bool {
        if self.has_complete_line() {
            return true;
        }
        if let Err(e) = self.fill_buffer() {
            debug!(error = %e, "gpsd read failed");
        }
        self.has_complete_line()
    }

    fn read_fix(&mut self) -> Result<Option<Fix>, LocationError> {
        if self.stream.is_none() && !self.has_complete_line() {
            return Err(LocationError::NotConnected);
        }
        self.fill_buffer()?;

        let mut latest = None;
        while let Some(line) = self.take_line() {
            if line.is_empty() {
                continue;
            }
            match parse_report(&line) {
                Ok(Some(fix)) => latest = Some(fix),
                Ok(None) => {}
                Err(e) => trace!(error = %e, "Skipping gpsd line"),
            }
        }

        Ok(latest)
    }
}

/// One gpsd JSON report; only TPV is decoded.
#[derive(Deserialize)]
#[serde(tag = "class")]
enum Report {
    #[serde(rename = "TPV")]
    Tpv(TpvReport),
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Default)]
struct TpvReport {
    #[serde(default)]
    mode: u8,
    status: Option<i32>,
    time: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(rename = "altHAE")]
    alt_hae: Option<f64>,
    alt: Option<f64>,
    speed: Option<f64>,
    track: Option<f64>,
    epx: Option<f64>,
    epy: Option<f64>,
}

impl From<TpvReport> for Fix {
    fn from(tpv: TpvReport) -> Self {
        let mode = match tpv.mode {
            1 => FixMode::NoFix,
            2 => FixMode::TwoD,
            3 => FixMode::ThreeD,
            _ => FixMode::NotSeen,
        };

        // Older daemons omit `status` for an ordinary fix.
        let status = match tpv.status {
            Some(s) if s <= 0 => FixStatus::NoFix,
            Some(1) => FixStatus::Fix,
            Some(_) => FixStatus::Differential,
            None if matches!(mode, FixMode::TwoD | FixMode::ThreeD) => FixStatus::Fix,
            None => FixStatus::NoFix,
        };

        Fix {
            status,
            mode,
            time: tpv.time.as_deref().and_then(parse_time),
            latitude: tpv.lat,
            longitude: tpv.lon,
            epx: tpv.epx,
            epy: tpv.epy,
            altitude: tpv.alt_hae.or(tpv.alt),
            speed: tpv.speed,
            track: tpv.track,
        }
    }
}

/// Parse one line; `Ok(None)` for non-TPV classes.
fn parse_report(line: &str) -> Result<Option<Fix>, LocationError> {
    let report: Report =
        serde_json::from_str(line).map_err(|e| LocationError::MalformedReport(e.to_string()))?;

    Ok(match report {
        Report::Tpv(tpv) => Some(tpv.into()),
        Report::Other => None,
    })
}

/// RFC 3339 timestamp to fractional epoch seconds.
fn parse_time(text: &str) -> Option<f64> {
    match chrono::DateTime::parse_from_rfc3339(text) {
        Ok(t) => Some(t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) / 1e9),
        Err(e) => {
            trace!(time = text, error = %e, "Unparseable TPV time");
            None
        }
    }
}
