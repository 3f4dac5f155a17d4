use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Lines are terminated with a bare `\n`, not `\r\n`. Existing CGI scripts
/// and clients of this server expect that framing.
const EOL: &[u8] = b"\n";

/// Serializes a response to wire bytes.
///
/// The blank separator line and the body are only written when the body is
/// non-empty.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + resp.body.len());

    // Status line
    let status_line = format!("{} {} {}", HTTP_VERSION, resp.status.as_u16(), resp.reason);
    buf.extend_from_slice(status_line.as_bytes());
    buf.extend_from_slice(EOL);

    // Headers
    for (k, v) in resp.headers.iter() {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(EOL);
    }

    if !resp.body.is_empty() {
        buf.extend_from_slice(EOL);
        buf.extend_from_slice(&resp.body);
    }

    buf
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            buffer: serialize_response(response),
            written: 0,
        }
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
