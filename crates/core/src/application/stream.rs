// Output streaming: stdout lines -> records -> channel, then exit/stderr aggregation

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace, warn};

use super::constants::LINE_BUFFER_CAPACITY;
use crate::domain::LineParser;
use crate::error::{ClassicError, Result};
use crate::port::LaunchedProcess;

/// Counters for one completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records handed to the channel
    pub records: usize,
    /// Lines that matched no pattern
    pub skipped: usize,
}

/// Drain a launched process.
///
/// Stdout is read to the end first and every matching line is sent in
/// order. The sender is dropped at end of stdout, so the receiver sees the
/// channel close before stderr is read and before the exit status is known.
/// A failed exit takes precedence over stderr text. The child is reaped on
/// every path, including a failed stdout read.
pub async fn drain<P: LineParser>(
    process: LaunchedProcess,
    parser: &P,
    tx: UnboundedSender<P::Record>,
) -> Result<RunSummary> {
    let LaunchedProcess {
        stdout,
        mut stderr,
        mut handle,
    } = process;

    let mut reader = BufReader::new(stdout);
    let summary = match forward_lines(&mut reader, parser, tx).await {
        Ok(summary) => summary,
        Err(e) => {
            // Close our pipe ends first so a child still writing cannot block
            drop(reader);
            drop(stderr);
            if let Err(wait_err) = handle.wait().await {
                warn!(error = %wait_err, "Failed to reap process after read error");
            }
            return Err(ClassicError::Read(e));
        }
    };

    let mut stderr_bytes = Vec::new();
    if let Err(e) = stderr.read_to_end(&mut stderr_bytes).await {
        warn!(error = %e, "Failed to read stderr, ignoring it");
        stderr_bytes.clear();
    }

    let exit = handle.wait().await.map_err(ClassicError::Wait)?;
    if !exit.success {
        return Err(ClassicError::ProcessExit { code: exit.code });
    }

    if !stderr_bytes.is_empty() {
        return Err(ClassicError::Stderr(
            String::from_utf8_lossy(&stderr_bytes).into_owned(),
        ));
    }

    Ok(summary)
}

/// Parse stdout line by line into `tx`. Consumes the sender so the channel
/// closes when this returns, whether or not the read succeeded.
async fn forward_lines<R, P>(
    reader: &mut R,
    parser: &P,
    tx: UnboundedSender<P::Record>,
) -> std::io::Result<RunSummary>
where
    R: AsyncBufRead + Unpin,
    P: LineParser,
{
    let mut summary = RunSummary::default();
    let mut buf = Vec::with_capacity(LINE_BUFFER_CAPACITY);
    let mut receiver_gone = false;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(summary);
        }

        let line = String::from_utf8_lossy(&buf);
        let Some(record) = parser.parse(&line) else {
            summary.skipped += 1;
            trace!(line = %line.trim_end(), "Skipping unrecognized line");
            continue;
        };

        if receiver_gone {
            continue;
        }
        if tx.send(record).is_err() {
            // Keep reading so the child never blocks on a full pipe
            debug!("Record receiver dropped, discarding remaining output");
            receiver_gone = true;
            continue;
        }
        summary.records += 1;
    }
}
