//! HTTP/1.1 response encoding onto an async byte stream.
//!
//! The status line and headers are buffered until the first body write, then sent
//! together with the body. A `content-length` header is added from the first body
//! chunk when the presenter did not set one, except for statuses that never carry a
//! body (`1xx`, `204`, `304`), whose body bytes are dropped.

use crate::error::WriteError;
use crate::writer::ResponseWriter;
use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use http::header::CONTENT_LENGTH;
use http::{HeaderMap, HeaderValue, StatusCode};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::warn;

/// Initial buffer size allocated for head serialization
const INIT_HEAD_SIZE: usize = 1024;

/// A [`ResponseWriter`] encoding an HTTP/1.1 response onto an [`AsyncWrite`].
///
/// Once a write to the stream failed the writer is closed: later body writes return
/// [`WriteError::Closed`] without touching the stream.
#[derive(Debug)]
pub struct StreamWriter<W> {
    io: W,
    headers: HeaderMap,
    status: Option<StatusCode>,
    head_sent: bool,
    omit_body: bool,
    closed: bool,
}

impl<W> StreamWriter<W> {
    pub fn new(io: W) -> Self {
        Self { io, headers: HeaderMap::new(), status: None, head_sent: false, omit_body: false, closed: false }
    }

    /// Sends the status line and headers but never the body bytes, as required for the
    /// response to a `HEAD` request. `content-length` still describes the body.
    #[must_use]
    pub fn omit_body(mut self) -> Self {
        self.omit_body = true;
        self
    }

    /// Returns true once the status line and headers were written to the stream.
    pub fn is_head_sent(&self) -> bool {
        self.head_sent
    }

    /// Returns true once a write to the stream failed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.io
    }

    pub fn into_inner(self) -> W {
        self.io
    }
}

impl<W> StreamWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, body: Bytes) -> Result<(), WriteError> {
        let status = *self.status.get_or_insert(StatusCode::OK);
        let bodiless = is_bodiless(status);

        if !self.head_sent {
            if !bodiless && !self.headers.contains_key(CONTENT_LENGTH) {
                self.headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
            }

            let mut head = BytesMut::with_capacity(INIT_HEAD_SIZE);
            encode_head(status, &self.headers, &mut head);
            self.head_sent = true;
            self.io.write_all(&head).await?;
        }

        if !bodiless && !self.omit_body {
            self.io.write_all(&body).await?;
        }
        self.io.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<W> ResponseWriter for StreamWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_head(&mut self, status: StatusCode) {
        if let Some(committed) = self.status {
            warn!(%committed, %status, "status already committed, ignore write_head");
            return;
        }
        self.status = Some(status);
    }

    async fn write_body(&mut self, body: Bytes) -> Result<(), WriteError> {
        if self.closed {
            return Err(WriteError::Closed);
        }

        let result = self.send(body).await;
        if result.is_err() {
            self.closed = true;
        }
        result
    }
}

fn is_bodiless(status: StatusCode) -> bool {
    status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED
}

fn encode_head(status: StatusCode, headers: &HeaderMap, dst: &mut BytesMut) {
    dst.put_slice(b"HTTP/1.1 ");
    dst.put_slice(status.as_str().as_bytes());
    dst.put_u8(b' ');
    // the reason phrase may be empty for codes without a canonical one
    dst.put_slice(status.canonical_reason().unwrap_or("").as_bytes());
    dst.put_slice(b"\r\n");

    for (name, value) in headers {
        dst.put_slice(name.as_ref());
        dst.put_slice(b": ");
        dst.put_slice(value.as_ref());
        dst.put_slice(b"\r\n");
    }
    dst.put_slice(b"\r\n");
}
