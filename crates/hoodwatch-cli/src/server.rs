//! Stdio server loop: one JSON-RPC request per stdin line, one reply per
//! stdout line.

use std::io;

use hoodwatch_agent::{NdjsonWriter, ProtocolHandler};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::error::CliError;

pub async fn serve(handler: &ProtocolHandler) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut writer = NdjsonWriter::new(io::stdout());
    info!("serving tools on stdio");

    while let Some(line) = lines.next_line().await? {
        if let Some(response) = handler.handle_line(&line).await {
            writer.write_message(&response)?;
        }
    }

    debug!(replies = writer.written(), "stdin closed");
    Ok(())
}
