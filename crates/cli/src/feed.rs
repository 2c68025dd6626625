//! Newline-delimited JSON feed input.

use anyhow::{Context, Result};
use quill_core::FeedEvent;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub type FeedReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Open the feed source
///
/// An explicit path wins. Otherwise stdin is used, unless it is a terminal and
/// `allow_tty` is false (the TUI needs the terminal for keys).
pub async fn open(path: Option<&Path>, allow_tty: bool) -> Result<Option<FeedReader>> {
    if let Some(path) = path {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open feed {}", path.display()))?;
        return Ok(Some(Box::new(BufReader::new(file))));
    }

    if !allow_tty && atty::is(atty::Stream::Stdin) {
        tracing::info!("stdin is a terminal; running without a feed");
        return Ok(None);
    }

    Ok(Some(Box::new(BufReader::new(tokio::io::stdin()))))
}

/// Read the feed on its own task until it ends or `cancel` fires
pub fn spawn_reader(reader: FeedReader, cancel: CancellationToken) -> mpsc::UnboundedReceiver<FeedEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let result = tokio::select! {
            _ = cancel.cancelled() => return,
            result = read_feed(reader, &tx) => result,
        };

        match result {
            Ok(records) => tracing::debug!(records, "feed ended"),
            Err(e) => tracing::warn!(error = %e, "feed read failed"),
        }
    });

    rx
}

/// Forward every well-formed record; malformed lines are logged and skipped
pub async fn read_feed<R>(reader: R, tx: &mpsc::UnboundedSender<FeedEvent>) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut records = 0;
    let mut line_no = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        match FeedEvent::parse_line(&line) {
            Ok(Some(event)) => {
                records += 1;
                if tx.send(event).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(line = line_no, error = %e, "skipping malformed feed record"),
        }
    }

    Ok(records)
}
