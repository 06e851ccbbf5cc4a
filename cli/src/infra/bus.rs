//! `BusPublisher` over a plain TCP connection: one message per connection,
//! newline terminated.

use std::time::Duration;

use anyhow::{Context, Result};
use hive_common::{BusEndpoint, BusMessage};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::application::ports::BusPublisher;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TcpBus {
    address: String,
}

impl TcpBus {
    #[must_use]
    pub fn new(endpoint: &BusEndpoint) -> Self {
        Self {
            address: endpoint.address(),
        }
    }
}

impl BusPublisher for TcpBus {
    async fn send(&self, message: &BusMessage) -> Result<()> {
        let mut stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(&self.address))
            .await
            .with_context(|| format!("connecting to bus at {} timed out", self.address))?
            .with_context(|| format!("connecting to bus at {}", self.address))?;
        let mut line = message.to_wire();
        line.push('\n');
        stream
            .write_all(line.as_bytes())
            .await
            .with_context(|| format!("writing to bus at {}", self.address))?;
        stream.shutdown().await.ok();
        tracing::debug!(address = %self.address, message = %line.trim_end(), "sent bus message");
        Ok(())
    }
}
