//! Dispatching on the request method.
//!
//! The [`Dispatcher`] only looks at the method, path matching is left to whatever router
//! sits in front of it. A method without a presenter is not an error: it is answered by
//! the "method not supported" presenter the caller configured, which usually presents a
//! `405 Method Not Allowed`.

use crate::error::BuildError;
use crate::presenter::Presenter;
use crate::response::Response;
use http::{Method, Request};
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

type BoxPresenter<B> = Box<dyn Presenter<B>>;

/// A [`Presenter`] that dispatches to another presenter based on the request method.
///
/// Lookup is an exact match on [`http::Method`], so it is case sensitive: a request
/// with the extension method `get` is not a `GET`.
///
/// # Example
///
/// ```
/// use http::{Method, Request, StatusCode};
/// use micro_presenter::{Dispatcher, Presenter, Response};
///
/// let dispatcher = Dispatcher::builder()
///     .get(Response::from((StatusCode::OK, "made it to a handler")))
///     .not_supported(Response::from((StatusCode::METHOD_NOT_ALLOWED, "unsupported method")))
///     .build()
///     .unwrap();
///
/// let get = Request::get("/d").body(()).unwrap();
/// assert_eq!(dispatcher.present(&get).status(), Some(StatusCode::OK));
///
/// let post = Request::post("/d").body(()).unwrap();
/// assert_eq!(dispatcher.present(&post).status(), Some(StatusCode::METHOD_NOT_ALLOWED));
/// ```
pub struct Dispatcher<B = ()> {
    method_to_presenter: HashMap<Method, BoxPresenter<B>>,
    not_supported: BoxPresenter<B>,
}

impl<B> Dispatcher<B> {
    /// Creates a dispatcher with an empty mapping: every method is answered by
    /// `not_supported` until presenters are added with [`with_method`](Self::with_method).
    pub fn new<P>(not_supported: P) -> Self
    where
        P: Presenter<B> + 'static,
    {
        Self { method_to_presenter: HashMap::new(), not_supported: Box::new(not_supported) }
    }

    pub fn builder() -> DispatcherBuilder<B> {
        DispatcherBuilder::new()
    }

    /// Maps `method` to `presenter`, replacing a previous presenter for the same method.
    #[must_use]
    pub fn with_method<P>(mut self, method: Method, presenter: P) -> Self
    where
        P: Presenter<B> + 'static,
    {
        self.method_to_presenter.insert(method, Box::new(presenter));
        self
    }

    /// Returns the methods that have a presenter, in no particular order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.method_to_presenter.keys()
    }

    /// Returns true if `method` has a presenter.
    pub fn supports(&self, method: &Method) -> bool {
        self.method_to_presenter.contains_key(method)
    }
}

impl<B> Presenter<B> for Dispatcher<B> {
    fn present(&self, req: &Request<B>) -> Response {
        match self.method_to_presenter.get(req.method()) {
            Some(presenter) => presenter.present(req),
            None => {
                trace!(method = %req.method(), "no presenter for method, using the not supported presenter");
                self.not_supported.present(req)
            }
        }
    }
}

impl<B> fmt::Debug for Dispatcher<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("methods", &self.method_to_presenter.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Builder for a [`Dispatcher`], the "method not supported" presenter is required.
pub struct DispatcherBuilder<B = ()> {
    method_to_presenter: HashMap<Method, BoxPresenter<B>>,
    not_supported: Option<BoxPresenter<B>>,
}

macro_rules! method_presenter {
    ($method:ident, $upper_case_method:ident) => {
        #[doc = concat!("Maps `", stringify!($upper_case_method), "` requests to `presenter`.")]
        #[must_use]
        pub fn $method<P: Presenter<B> + 'static>(self, presenter: P) -> Self {
            self.method(Method::$upper_case_method, presenter)
        }
    };
}

impl<B> DispatcherBuilder<B> {
    fn new() -> Self {
        Self { method_to_presenter: HashMap::new(), not_supported: None }
    }

    /// Maps `method` to `presenter`, replacing a previous presenter for the same method.
    #[must_use]
    pub fn method<P: Presenter<B> + 'static>(mut self, method: Method, presenter: P) -> Self {
        self.method_to_presenter.insert(method, Box::new(presenter));
        self
    }

    method_presenter!(get, GET);
    method_presenter!(post, POST);
    method_presenter!(put, PUT);
    method_presenter!(delete, DELETE);
    method_presenter!(head, HEAD);
    method_presenter!(options, OPTIONS);
    method_presenter!(connect, CONNECT);
    method_presenter!(patch, PATCH);
    method_presenter!(trace, TRACE);

    /// Sets the presenter answering methods without a presenter.
    #[must_use]
    pub fn not_supported<P: Presenter<B> + 'static>(mut self, presenter: P) -> Self {
        self.not_supported = Some(Box::new(presenter));
        self
    }

    pub fn build(self) -> Result<Dispatcher<B>, BuildError> {
        let not_supported = self.not_supported.ok_or(BuildError::MissingNotSupported)?;
        Ok(Dispatcher { method_to_presenter: self.method_to_presenter, not_supported })
    }
}

impl<B> fmt::Debug for DispatcherBuilder<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("methods", &self.method_to_presenter.keys().collect::<Vec<_>>())
            .field("has_not_supported", &self.not_supported.is_some())
            .finish()
    }
}
