use crate::connection::HttpConnection;
use bytes::Bytes;
use micro_presenter::{Presenter, Writer};
use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

pub struct ServerBuilder<P> {
    writer: Option<Writer<P, Bytes>>,
    address: Option<io::Result<Vec<SocketAddr>>>,
}

impl<P> ServerBuilder<P>
where
    P: Presenter<Bytes> + 'static,
{
    fn new() -> Self {
        Self { writer: None, address: None }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(|addrs| addrs.collect::<Vec<_>>()));
        self
    }

    pub fn writer(mut self, writer: Writer<P, Bytes>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn build(self) -> Result<Server<P>, ServerBuildError> {
        let writer = self.writer.ok_or(ServerBuildError::MissingWriter)?;
        let address = match self.address {
            Some(Ok(address)) if !address.is_empty() => address,
            Some(Ok(_)) => {
                let source = io::Error::other("no socket address resolved");
                return Err(ServerBuildError::InvalidAddress { source });
            }
            Some(Err(source)) => return Err(ServerBuildError::InvalidAddress { source }),
            None => return Err(ServerBuildError::MissingAddress),
        };
        Ok(Server { writer: Arc::new(writer), address })
    }
}

/// Serves every accepted connection with a single shared [`Writer`].
pub struct Server<P> {
    writer: Arc<Writer<P, Bytes>>,
    address: Vec<SocketAddr>,
}

impl<P> fmt::Debug for ServerBuilder<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("has_writer", &self.writer.is_some())
            .field("address", &self.address)
            .finish()
    }
}

impl<P> fmt::Debug for Server<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server").field("address", &self.address).finish_non_exhaustive()
    }
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("writer must be set")]
    MissingWriter,
    #[error("address must be set")]
    MissingAddress,
    #[error("invalid address: {source}")]
    InvalidAddress { source: io::Error },
}

impl<P> Server<P>
where
    P: Presenter<Bytes> + 'static,
{
    pub fn builder() -> ServerBuilder<P> {
        ServerBuilder::new()
    }

    pub fn address(&self) -> &[SocketAddr] {
        &self.address
    }

    /// Binds the configured address and serves connections until the process ends.
    ///
    /// Only a bind failure is returned, connection failures are logged.
    pub async fn start(self) -> io::Result<()> {
        let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            debug!(cause = %e, "global subscriber already set");
        }

        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(e);
            }
        };

        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let writer = Arc::clone(&self.writer);

            tokio::spawn(async move {
                let (reader, writer_half) = tcp_stream.into_split();
                let connection = HttpConnection::new(reader, writer_half);
                match connection.process(writer).await {
                    Ok(_) => {
                        info!(%remote_addr, "finished process, connection shutdown");
                    }
                    Err(e) => {
                        error!(%remote_addr, cause = %e, "service has error, connection shutdown");
                    }
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Server, ServerBuildError};
    use bytes::Bytes;
    use http::Request;
    use micro_presenter::{PresenterFn, Response, Writer, presenter_fn};
    use std::net::SocketAddr;

    type Hello = PresenterFn<fn(&Request<Bytes>) -> Response, Bytes>;

    fn hello(_req: &Request<Bytes>) -> Response {
        Response::new().with_text("hello")
    }

    fn writer() -> Writer<Hello, Bytes> {
        Writer::new(presenter_fn(hello as fn(&Request<Bytes>) -> Response))
    }

    #[test]
    fn build_requires_writer() {
        let result = Server::<Hello>::builder().address("127.0.0.1:0").build();
        assert!(matches!(result, Err(ServerBuildError::MissingWriter)));
    }

    #[test]
    fn build_requires_address() {
        let result = Server::builder().writer(writer()).build();
        assert!(matches!(result, Err(ServerBuildError::MissingAddress)));
    }

    #[test]
    fn build_reports_invalid_address() {
        let result = Server::builder().address("not an address").writer(writer()).build();
        assert!(matches!(result, Err(ServerBuildError::InvalidAddress { .. })));
    }

    #[test]
    fn build_resolves_address() {
        let server = Server::builder().address("127.0.0.1:8080").writer(writer()).build().unwrap();
        assert_eq!(server.address(), &["127.0.0.1:8080".parse::<SocketAddr>().unwrap()]);
    }
}
