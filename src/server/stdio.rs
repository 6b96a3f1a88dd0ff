use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::app::Result;
use crate::server::McpServer;

/// Newline-delimited JSON-RPC: one message per line in, one response per line out.
///
/// Messages are handled one at a time, in arrival order. A line that is not
/// UTF-8 gets a parse error like any other bad message. Returns when the
/// input is closed.
pub async fn run<R, W>(server: &McpServer, input: R, mut output: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(input);
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }

        let message = line.trim_ascii();
        if message.is_empty() {
            continue;
        }

        if let Some(response) = server.handle_bytes(message).await {
            let mut encoded = serde_json::to_vec(&response)?;
            encoded.push(b'\n');
            output.write_all(&encoded).await?;
            output.flush().await?;
        }
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
