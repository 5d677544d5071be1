//! Compose HTTP handlers out of pure response presenters.
//!
//! Handlers are simpler to write and test when they return data instead of writing
//! it. This crate is built around that idea: a [`Presenter`] is the functional
//! counterpart of a request handler, it returns the [`Response`] to send. Everything a
//! typical handler repeats is a small presenter of its own:
//!
//! 1. [`Dispatcher`] dispatches on the request method;
//! 2. [`ErrHandler`] reports the error of an [`ErrPresenter`], for example by logging it;
//! 3. [`DefaultResp`] replaces a response without status by a default one, such as a
//!    generic "500 something went wrong";
//! 4. [`Writer`] writes the response, the only step that performs I/O.
//!
//! They compose into a tree that is built once and shared by every request: all
//! presenters are `Send + Sync` and none of them changes after construction.
//!
//! # Example
//!
//! ```
//! use http::{Method, Request, StatusCode};
//! use micro_presenter::{
//!     err_presenter_fn, presenter_fn, DefaultResp, Dispatcher, ErrHandler, PresentError, Presenter, Response,
//! };
//!
//! let get_some_data = ErrHandler::new(err_presenter_fn(|_req: &Request<()>| {
//!     Ok(Response::from((StatusCode::OK, "here is some data")))
//! }));
//! let create_some_data = ErrHandler::new(err_presenter_fn(|_req: &Request<()>| {
//!     Err(PresentError::new("some error occurred when creating data"))
//! }))
//! .on_error(|req, err| eprintln!("on {} {} endpoint error happened: {err}", req.method(), req.uri()));
//!
//! let handler = DefaultResp::new(
//!     Dispatcher::new(presenter_fn(|req: &Request<()>| {
//!         Response::from((StatusCode::METHOD_NOT_ALLOWED, format!("the method {} is not allowed", req.method())))
//!     }))
//!     .with_method(Method::GET, get_some_data)
//!     .with_method(Method::POST, create_some_data),
//!     Response::from((StatusCode::INTERNAL_SERVER_ERROR, "unexpected error")),
//! );
//!
//! let get = handler.present(&Request::get("/hello").body(()).unwrap());
//! assert_eq!(get.status(), Some(StatusCode::OK));
//!
//! let post = handler.present(&Request::post("/hello").body(()).unwrap());
//! assert_eq!(post.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
//!
//! let put = handler.present(&Request::put("/hello").body(()).unwrap());
//! assert_eq!(put.status(), Some(StatusCode::METHOD_NOT_ALLOWED));
//! ```
//!
//! # The unset status
//!
//! A [`Response`] without status means "no meaningful response was produced".
//! [`DefaultResp`] and [`ErrHandler`] fall back to another presenter for such a
//! response, and [`Writer`] writes it as `200 OK`.

mod default_resp;
mod dispatcher;
mod err_handler;
mod error;
mod presenter;
mod response;

pub mod writer;

pub use default_resp::DefaultResp;
pub use dispatcher::Dispatcher;
pub use dispatcher::DispatcherBuilder;
pub use err_handler::ErrHandler;
pub use err_handler::ErrorCallback;
pub use error::BoxError;
pub use error::BuildError;
pub use error::PresentError;
pub use error::WriteError;
pub use presenter::ErrPresenter;
pub use presenter::ErrPresenterFn;
pub use presenter::Presenter;
pub use presenter::PresenterFn;
pub use presenter::err_presenter_fn;
pub use presenter::presenter_fn;
pub use response::Response;
pub use writer::ResponseRecorder;
pub use writer::ResponseWriter;
pub use writer::StreamWriter;
pub use writer::WriteErrorCallback;
pub use writer::Writer;
