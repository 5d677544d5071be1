use crate::codec::RequestDecoder;
use crate::error::HttpError;
use crate::utils::ensure;
use bytes::Bytes;
use futures::StreamExt;
use http::header::CONNECTION;
use http::{HeaderValue, Method, Request, StatusCode, Version};
use micro_presenter::{Presenter, ResponseWriter, StreamWriter, WriteError, Writer};
use std::fmt;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::FramedRead;
use tracing::{error, info};

/// An HTTP/1.x connection serving every request it reads with one [`Writer`].
///
/// Requests are served one after the other until the peer closes the connection or a
/// request asks to close it. A malformed request is answered with `400 Bad Request`
/// and ends the connection, so does a response that could not be written.
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    writer: W,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        let framed_read = FramedRead::with_capacity(reader, RequestDecoder::new(), 8 * 1024);
        Self { framed_read, writer }
    }

    pub async fn process<P>(mut self, handler: Arc<Writer<P, Bytes>>) -> Result<(), HttpError>
    where
        P: Presenter<Bytes>,
    {
        loop {
            match self.framed_read.next().await {
                Some(Ok(request)) => {
                    let keep_alive = is_keep_alive(&request);
                    self.do_process(&request, &handler, keep_alive).await?;
                    if !keep_alive {
                        info!("request asked to close the connection");
                        return Ok(());
                    }
                }

                Some(Err(e)) => {
                    error!(cause = %e, "can't receive next request");
                    let mut stream = StreamWriter::new(&mut self.writer);
                    stream.headers_mut().insert(CONNECTION, HeaderValue::from_static("close"));
                    stream.write_head(StatusCode::BAD_REQUEST);
                    stream.write_body(Bytes::new()).await?;
                    return Err(e.into());
                }

                None => {
                    info!("cant read more request, break this connection down");
                    return Ok(());
                }
            }
        }
    }

    async fn do_process<P>(
        &mut self,
        request: &Request<Bytes>,
        handler: &Writer<P, Bytes>,
        keep_alive: bool,
    ) -> Result<(), HttpError>
    where
        P: Presenter<Bytes>,
    {
        let mut stream = StreamWriter::new(&mut self.writer);
        if request.method() == Method::HEAD {
            stream = stream.omit_body();
        }
        match (keep_alive, request.version()) {
            (false, _) => {
                stream.headers_mut().insert(CONNECTION, HeaderValue::from_static("close"));
            }
            (true, Version::HTTP_10) => {
                stream.headers_mut().insert(CONNECTION, HeaderValue::from_static("keep-alive"));
            }
            (true, _) => {}
        }
        handler.serve(request, &mut stream).await;

        // the write error went to the writer's callback, only the connection is left to close
        ensure!(!stream.is_closed(), WriteError::Closed.into());
        Ok(())
    }
}

impl<R, W> fmt::Debug for HttpConnection<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConnection").field("decoder", self.framed_read.decoder()).finish_non_exhaustive()
    }
}

/// HTTP/1.1 connections persist unless the request says `close`, HTTP/1.0 ones only
/// persist when the request says `keep-alive`.
fn is_keep_alive<B>(request: &Request<B>) -> bool {
    let has_token = |token: &str| {
        request
            .headers()
            .get_all(CONNECTION)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .any(|value| value.trim().eq_ignore_ascii_case(token))
    };

    match request.version() {
        Version::HTTP_10 => has_token("keep-alive"),
        _ => !has_token("close"),
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpConnection, is_keep_alive};
    use crate::error::HttpError;
    use bytes::Bytes;
    use http::{Request, StatusCode, Version};
    use micro_presenter::{Presenter, Response, WriteError, Writer, presenter_fn};
    use std::io;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};
    use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};

    /// A write half whose writes always fail.
    struct BrokenPipe;

    impl AsyncWrite for BrokenPipe {
        fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &[u8]) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::ErrorKind::BrokenPipe.into()))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    fn echo(req: &Request<Bytes>) -> Response {
        Response::from(StatusCode::OK).with_body(format!("{} {} {}", req.method(), req.uri().path(), req.body().len()))
    }

    fn echo_writer() -> Arc<Writer<impl Presenter<Bytes>, Bytes>> {
        Arc::new(Writer::new(presenter_fn(echo)))
    }

    async fn exchange(input: &[u8], close_input: bool) -> (Vec<u8>, Result<(), HttpError>) {
        let (mut client, server) = tokio::io::duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(server);
        let task = tokio::spawn(HttpConnection::new(reader, writer).process(echo_writer()));

        client.write_all(input).await.unwrap();
        if close_input {
            client.shutdown().await.unwrap();
        }

        let mut output = Vec::new();
        client.read_to_end(&mut output).await.unwrap();
        (output, task.await.unwrap())
    }

    #[tokio::test]
    async fn serves_requests_until_peer_closes() {
        let input = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\nPOST /items HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc";
        let (output, result) = exchange(input, true).await;

        assert!(result.is_ok());
        assert_eq!(
            output,
            b"HTTP/1.1 200 OK\r\ncontent-length: 7\r\n\r\nGET / 0\
              HTTP/1.1 200 OK\r\ncontent-length: 13\r\n\r\nPOST /items 3"
        );
    }

    #[tokio::test]
    async fn head_response_has_no_body() {
        let (output, result) = exchange(b"HEAD / HTTP/1.1\r\n\r\nGET / HTTP/1.1\r\n\r\n", true).await;

        assert!(result.is_ok());
        assert_eq!(
            output,
            b"HTTP/1.1 200 OK\r\ncontent-length: 8\r\n\r\n\
              HTTP/1.1 200 OK\r\ncontent-length: 7\r\n\r\nGET / 0"
        );
    }

    #[tokio::test]
    async fn connection_close_ends_after_response() {
        let (output, result) =
            exchange(b"GET / HTTP/1.1\r\nConnection: close\r\n\r\nGET /ignored HTTP/1.1\r\n\r\n", false).await;

        assert!(result.is_ok());
        assert_eq!(output, b"HTTP/1.1 200 OK\r\nconnection: close\r\ncontent-length: 7\r\n\r\nGET / 0");
    }

    #[tokio::test]
    async fn malformed_request_gets_bad_request() {
        let (output, result) = exchange(b"NOT A REQUEST\r\n\r\n", false).await;

        assert!(matches!(result, Err(HttpError::RequestError { .. })));
        assert_eq!(output, b"HTTP/1.1 400 Bad Request\r\nconnection: close\r\ncontent-length: 0\r\n\r\n");
    }

    #[tokio::test]
    async fn failed_write_closes_the_connection() {
        let served = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&served);
        let write_errors = Arc::new(AtomicUsize::new(0));
        let reported = Arc::clone(&write_errors);
        let writer = Writer::new(presenter_fn(move |req: &Request<Bytes>| {
            counter.fetch_add(1, Ordering::SeqCst);
            echo(req)
        }))
        .on_write_error(move |_req: &Request<Bytes>, _err| {
            reported.fetch_add(1, Ordering::SeqCst);
        });

        let input: &[u8] = b"GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n";
        let result = HttpConnection::new(input, BrokenPipe).process(Arc::new(writer)).await;

        assert!(matches!(result, Err(HttpError::ResponseError { source: WriteError::Closed })));
        assert_eq!(served.load(Ordering::SeqCst), 1);
        assert_eq!(write_errors.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn keep_alive_depends_on_version() {
        let http11 = Request::builder().version(Version::HTTP_11).body(()).unwrap();
        let http10 = Request::builder().version(Version::HTTP_10).body(()).unwrap();
        let http10_keep_alive =
            Request::builder().version(Version::HTTP_10).header("connection", "Keep-Alive").body(()).unwrap();
        let http11_close =
            Request::builder().version(Version::HTTP_11).header("connection", "upgrade, close").body(()).unwrap();

        assert!(is_keep_alive(&http11));
        assert!(!is_keep_alive(&http10));
        assert!(is_keep_alive(&http10_keep_alive));
        assert!(!is_keep_alive(&http11_close));
    }
}
