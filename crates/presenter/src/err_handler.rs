use crate::error::PresentError;
use crate::presenter::{ErrPresenter, Presenter};
use crate::response::Response;
use http::Request;
use std::error::Error;
use std::fmt;

/// Callback invoked with the request and the error an [`ErrPresenter`] signalled.
pub type ErrorCallback<B> = Box<dyn Fn(&Request<B>, &(dyn Error + Send + Sync)) + Send + Sync>;

/// A [`Presenter`] that deals with the errors of an [`ErrPresenter`].
///
/// For every request:
///
/// 1. the wrapped `ErrPresenter` is called;
/// 2. if it failed, the error callback (when configured) is called once with the
///    request and the error;
/// 3. the presented response is returned when its status is set, even on error, so a
///    presenter can pick its own error response. An unset response is replaced by the
///    fallback presenter's output when a fallback is configured and returned as is
///    otherwise.
///
/// Keeping "log the error" apart from "decide the body" lets one callback be shared by
/// every endpoint of an API while each endpoint keeps its own response shape.
///
/// # Example
///
/// ```
/// use http::{Request, StatusCode};
/// use micro_presenter::{err_presenter_fn, ErrHandler, PresentError, Presenter, Response};
///
/// let handler = ErrHandler::new(err_presenter_fn(|_req: &Request<()>| {
///     Err(PresentError::new("database is down"))
/// }))
/// .on_error(|req, err| eprintln!("on {} {} got error: {err}", req.method(), req.uri()))
/// .fallback(Response::from((StatusCode::INTERNAL_SERVER_ERROR, "oops")));
///
/// let response = handler.present(&Request::new(()));
/// assert_eq!(response.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
/// ```
pub struct ErrHandler<E, B = ()> {
    err_presenter: E,
    handle_err: Option<ErrorCallback<B>>,
    fallback: Option<Box<dyn Presenter<B>>>,
}

impl<E, B> ErrHandler<E, B>
where
    E: ErrPresenter<B>,
{
    /// Wraps an `ErrPresenter` without error callback and without fallback.
    pub fn new(err_presenter: E) -> Self {
        Self { err_presenter, handle_err: None, fallback: None }
    }

    /// Sets the callback invoked whenever the wrapped presenter fails.
    ///
    /// The callback is expected to do observability work such as logging. A panic
    /// inside it is not handled here.
    #[must_use]
    pub fn on_error<F>(mut self, handle_err: F) -> Self
    where
        F: Fn(&Request<B>, &(dyn Error + Send + Sync)) + Send + Sync + 'static,
    {
        self.handle_err = Some(Box::new(handle_err));
        self
    }

    /// Sets the presenter used when the wrapped presenter leaves the status unset.
    #[must_use]
    pub fn fallback<P>(mut self, fallback: P) -> Self
    where
        P: Presenter<B> + 'static,
    {
        self.fallback = Some(Box::new(fallback));
        self
    }

    pub fn err_presenter(&self) -> &E {
        &self.err_presenter
    }

    fn report(&self, req: &Request<B>, e: PresentError) -> Response {
        let (response, source) = e.into_parts();
        if let Some(handle_err) = &self.handle_err {
            handle_err(req, source.as_ref());
        }
        response
    }
}

impl<E, B> Presenter<B> for ErrHandler<E, B>
where
    E: ErrPresenter<B>,
{
    fn present(&self, req: &Request<B>) -> Response {
        let response = match self.err_presenter.err_present(req) {
            Ok(response) => response,
            Err(e) => self.report(req, e),
        };

        if !response.is_unset() {
            return response;
        }

        match &self.fallback {
            Some(fallback) => fallback.present(req),
            None => response,
        }
    }
}

impl<E: fmt::Debug, B> fmt::Debug for ErrHandler<E, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrHandler")
            .field("err_presenter", &self.err_presenter)
            .field("has_error_callback", &self.handle_err.is_some())
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}
