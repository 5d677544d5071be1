//! The I/O boundary: writing a presented response.
//!
//! [`Writer`] is the root of every handler built with this crate. It asks its presenter
//! for the response and writes it to a [`ResponseWriter`], the outbound half of
//! whatever HTTP server the handler is plugged into. It is the only component that
//! performs I/O.
//!
//! Two `ResponseWriter`s are provided:
//!
//! - [`ResponseRecorder`] keeps everything in memory, for tests and in-process use;
//! - [`StreamWriter`] encodes an HTTP/1.1 response onto any `AsyncWrite`.

mod recorder;
mod stream;

pub use recorder::ResponseRecorder;
pub use stream::StreamWriter;

use crate::error::WriteError;
use crate::presenter::Presenter;
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Request, StatusCode};
use http_body_util::Full;
use std::fmt;
use tracing::trace;

/// The outbound channel of a single response.
///
/// Headers may be changed until the status is committed. The status is committed by
/// the first [`write_head`](Self::write_head) call, or implicitly as `200 OK` by the
/// first body write. Later `write_head` calls are ignored.
#[async_trait]
pub trait ResponseWriter: Send {
    fn headers_mut(&mut self) -> &mut HeaderMap;

    fn write_head(&mut self, status: StatusCode);

    async fn write_body(&mut self, body: Bytes) -> Result<(), WriteError>;
}

/// Callback invoked with the request and the error when writing the body failed.
pub type WriteErrorCallback<B> = Box<dyn Fn(&Request<B>, &WriteError) + Send + Sync>;

/// Writes the response returned from a [`Presenter`].
///
/// Serving a request:
///
/// 1. asks the presenter for the response;
/// 2. appends every header value onto the outbound channel, multiple values of one
///    header stay separate values in their original order;
/// 3. commits the status, an unset status becomes `200 OK` just as it would if a plain
///    handler wrote a body without a status;
/// 4. writes the body. When that fails the write error callback is invoked; without
///    a callback the error is dropped, headers are already on their way by then and no
///    other response can be sent.
///
/// # Example
///
/// ```
/// use http::{Request, StatusCode};
/// use micro_presenter::{presenter_fn, Response, ResponseRecorder, Writer};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let writer = Writer::new(presenter_fn(|_req: &Request<()>| Response::new().with_body("hello world!")))
///     .on_write_error(|req, err| eprintln!("error on {} {} endpoint: {err}", req.method(), req.uri()));
///
/// let mut recorder = ResponseRecorder::new();
/// writer.serve(&Request::get("/w").body(()).unwrap(), &mut recorder).await;
///
/// assert_eq!(recorder.status(), Some(StatusCode::OK));
/// assert_eq!(recorder.body(), b"hello world!");
/// # }
/// ```
pub struct Writer<P, B = ()> {
    presenter: P,
    handle_err: Option<WriteErrorCallback<B>>,
}

impl<P, B> Writer<P, B>
where
    P: Presenter<B>,
{
    pub fn new(presenter: P) -> Self {
        Self { presenter, handle_err: None }
    }

    /// Sets the callback invoked when writing the body fails.
    #[must_use]
    pub fn on_write_error<F>(mut self, handle_err: F) -> Self
    where
        F: Fn(&Request<B>, &WriteError) + Send + Sync + 'static,
    {
        self.handle_err = Some(Box::new(handle_err));
        self
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Presents the response for `req` and writes it to `writer`.
    pub async fn serve<W>(&self, req: &Request<B>, writer: &mut W)
    where
        W: ResponseWriter + ?Sized,
    {
        let (status, headers, body) = self.presenter.present(req).into_parts();

        let outbound = writer.headers_mut();
        outbound.reserve(headers.len());
        for (name, value) in &headers {
            outbound.append(name.clone(), value.clone());
        }

        writer.write_head(status.unwrap_or(StatusCode::OK));

        if let Err(e) = writer.write_body(body).await {
            match &self.handle_err {
                Some(handle_err) => handle_err(req, &e),
                None => trace!(cause = %e, "write response body error dropped, no write error handler"),
            }
        }
    }

    /// Presents the response for `req` as an [`http::Response`], for servers that write
    /// `http` responses themselves. Write errors are then the server's to handle.
    pub fn respond(&self, req: &Request<B>) -> http::Response<Full<Bytes>> {
        self.presenter.present(req).into_http()
    }
}

impl<P: fmt::Debug, B> fmt::Debug for Writer<P, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("presenter", &self.presenter)
            .field("has_write_error_callback", &self.handle_err.is_some())
            .finish()
    }
}
