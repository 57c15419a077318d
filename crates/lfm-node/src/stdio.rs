//! Newline-delimited JSON adapter between a byte stream and the node.
//!
//! One [`NodeInput`] per input line and one [`NodeOutput`] per output line.
//! Lines that do not decode are logged and skipped.

use lfm_types::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::{NodeInput, NodeOutput};

/// Decode `reader` line by line into `inputs` until EOF or the node stops.
///
/// Returns the number of inputs forwarded.
pub async fn read_inputs<R>(reader: R, inputs: mpsc::Sender<NodeInput>) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;
    let mut line_no: u64 = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let input = match serde_json::from_str::<NodeInput>(line) {
            Ok(input) => input,
            Err(err) => {
                tracing::warn!(line = line_no, error = %err, "Skipping undecodable input");
                continue;
            }
        };
        if inputs.send(input).await.is_err() {
            tracing::warn!(line = line_no, "Market node stopped, no longer reading input");
            break;
        }
        forwarded += 1;
    }
    Ok(forwarded)
}

/// Encode every output onto `writer` until the channel closes.
///
/// Returns the number of lines written.
pub async fn write_outputs<W>(
    mut outputs: mpsc::UnboundedReceiver<NodeOutput>,
    mut writer: W,
) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(output) = outputs.recv().await {
        let mut line = serde_json::to_vec(&output)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
        written += 1;
    }
    Ok(written)
}
