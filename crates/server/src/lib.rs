//! A small HTTP/1.x server for handlers built with `micro-presenter`.
//!
//! Every request is read completely, body included, then handed to one shared
//! [`Writer`](micro_presenter::Writer) which writes the presented response straight
//! onto the connection through a [`StreamWriter`](micro_presenter::StreamWriter).
//!
//! # Example
//!
//! ```no_run
//! use bytes::Bytes;
//! use http::{Request, StatusCode};
//! use micro_presenter::{presenter_fn, Response, Writer};
//! use micro_presenter_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let writer = Writer::new(presenter_fn(|req: &Request<Bytes>| {
//!         Response::from(StatusCode::OK).with_text(format!("hello {}", req.uri().path()))
//!     }));
//!
//!     let server = Server::builder().address("127.0.0.1:8080").writer(writer).build().unwrap();
//!     server.start().await
//! }
//! ```
//!
//! Not supported: request bodies without `content-length` (chunked transfer encoding),
//! `Expect: 100-continue`, TLS.

pub mod codec;
pub mod connection;
mod error;
mod server;
mod utils;

pub use error::HttpError;
pub use error::ParseError;
pub use server::Server;
pub use server::ServerBuildError;
pub use server::ServerBuilder;
