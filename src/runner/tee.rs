use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;

use crate::error::RunnerError;

use super::console::Console;

/// Appended verbatim when a stream ends without a trailing newline. Every
/// sink in the route receives it, the cross-wired peer included.
pub const NO_NEWLINE_MARK: &[u8] = b" % No new line\n";

/// Copy task for a stdout route: every record goes to the peer's stdin
/// unprefixed, and to the console with a label unless echo is disabled.
pub fn tee_stdout<R, P, W>(
    rd: R,
    peer: P,
    echo: Option<(Console<W>, Vec<u8>)>,
    stream: &'static str,
    max_line_bytes: usize,
) -> JoinHandle<Result<u64, RunnerError>>
where
    R: AsyncRead + Unpin + Send + 'static,
    P: AsyncWrite + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tee(rd, Some(peer), echo, stream, max_line_bytes)
}

/// Copy task for a stderr route: console only, always labeled.
pub fn tee_stderr<R, W>(
    rd: R,
    console: Console<W>,
    prefix: Vec<u8>,
    stream: &'static str,
    max_line_bytes: usize,
) -> JoinHandle<Result<u64, RunnerError>>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tee(
        rd,
        None::<tokio::io::Sink>,
        Some((console, prefix)),
        stream,
        max_line_bytes,
    )
}

fn tee<R, P, W>(
    mut rd: R,
    mut peer: Option<P>,
    echo: Option<(Console<W>, Vec<u8>)>,
    stream: &'static str,
    max_line_bytes: usize,
) -> JoinHandle<Result<u64, RunnerError>>
where
    R: AsyncRead + Unpin + Send + 'static,
    P: AsyncWrite + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; 16 * 1024];
        let mut total = 0u64;
        let mut line_buf: Vec<u8> = Vec::with_capacity(8 * 1024);

        loop {
            let n = rd.read(&mut buf).await.map_err(|e| RunnerError::StreamIo {
                stream,
                source: e,
            })?;
            if n == 0 {
                break;
            }
            total += n as u64;

            line_buf.extend_from_slice(&buf[..n]);
            while let Some(pos) = line_buf.iter().position(|&b| b == b'\n') {
                let line = line_buf.drain(..=pos).collect::<Vec<u8>>();
                forward(&mut peer, &echo, stream, &line).await?;
            }

            // Whatever is left is one unterminated line still growing.
            if line_buf.len() > max_line_bytes {
                return Err(RunnerError::LineTooLong {
                    stream,
                    limit: max_line_bytes,
                });
            }
        }

        // EOF flush: the final partial line carries the no-newline mark.
        if !line_buf.is_empty() {
            line_buf.extend_from_slice(NO_NEWLINE_MARK);
            forward(&mut peer, &echo, stream, &line_buf).await?;
        }

        Ok(total)
    })
}

async fn forward<P, W>(
    peer: &mut Option<P>,
    echo: &Option<(Console<W>, Vec<u8>)>,
    stream: &'static str,
    record: &[u8],
) -> Result<(), RunnerError>
where
    P: AsyncWrite + Unpin,
    W: AsyncWrite + Unpin,
{
    if let Some(w) = peer.as_mut() {
        w.write_all(record)
            .await
            .map_err(|e| RunnerError::StreamIo { stream, source: e })?;
        w.flush()
            .await
            .map_err(|e| RunnerError::StreamIo { stream, source: e })?;
    }

    if let Some((console, prefix)) = echo {
        console
            .write_record(prefix, record)
            .await
            .map_err(|e| RunnerError::StreamIo { stream, source: e })?;
    }

    Ok(())
}
