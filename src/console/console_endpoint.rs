use super::ConsoleMessenger;
use crate::{info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Line-based transport for the console: reads commands until the input
/// closes and answers each with exactly one line.
pub struct ConsoleEndpoint<'a> {
    messenger: &'a ConsoleMessenger,
}

impl<'a> ConsoleEndpoint<'a> {
    pub fn new(messenger: &'a ConsoleMessenger) -> Self { Self { messenger } }

    /// Serves `input` until end of file. Blank lines are skipped. Returns
    /// the number of commands answered.
    ///
    /// # Errors
    /// Propagates read and write failures of the underlying streams.
    pub async fn serve<R, W>(&self, input: R, mut output: W) -> Result<usize, std::io::Error>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let mut answered = 0;
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let response = self.messenger.handle_line(&line).await;
            if let Some(e) = &response.error {
                warn!("Console command failed: {e}");
            }
            let mut encoded = serde_json::to_vec(&response).map_err(std::io::Error::other)?;
            encoded.push(b'\n');
            output.write_all(&encoded).await?;
            output.flush().await?;
            answered += 1;
        }
        info!("Console input closed after {answered} commands");
        Ok(answered)
    }
}
