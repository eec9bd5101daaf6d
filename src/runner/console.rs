use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Shared observation sink. Up to four routes write here concurrently; each
/// record goes out as a single write under the lock, so lines from different
/// routes interleave at record granularity and never splice.
pub struct Console<W = tokio::io::Stdout> {
    inner: Arc<Mutex<W>>,
}

impl<W> Clone for Console<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Console<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> Console<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// Write one prefixed record and flush.
    pub async fn write_record(&self, prefix: &[u8], record: &[u8]) -> std::io::Result<()> {
        let mut buf = Vec::with_capacity(prefix.len() + record.len());
        buf.extend_from_slice(prefix);
        buf.extend_from_slice(record);

        let mut w = self.inner.lock().await;
        w.write_all(&buf).await?;
        w.flush().await
    }
}
