//! The two presenter capabilities and their function adapters.
//!
//! A [`Presenter`] is the functional counterpart of a request handler: instead of
//! writing a response it returns one. An [`ErrPresenter`] does the same for
//! computations that can fail (data access, downstream calls) and is turned into a
//! `Presenter` by wrapping it in an [`ErrHandler`](crate::ErrHandler).
//!
//! Ordinary functions and closures become presenters through [`presenter_fn`] and
//! [`err_presenter_fn`], so trivial presenters don't need a named type.

use crate::error::PresentError;
use crate::response::Response;
use http::Request;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Presents the response for a request.
///
/// Implementations must not perform side effects that the caller relies on, must not
/// block indefinitely and cannot fail: a failure has to be encoded in the returned
/// [`Response`], typically as an error status with a body.
///
/// The `Send + Sync` bound lets one presenter tree be shared by every request a server
/// handles concurrently.
pub trait Presenter<B = ()>: Send + Sync {
    fn present(&self, req: &Request<B>) -> Response;
}

/// Presents the response for a request, or fails.
///
/// An `Err` still carries a response (see [`PresentError::with_response`]), so a
/// presenter can both explain a failure to the client and report it to whoever logs
/// errors.
pub trait ErrPresenter<B = ()>: Send + Sync {
    fn err_present(&self, req: &Request<B>) -> Result<Response, PresentError>;
}

/// a [`Presenter`] backed by a function, created by [`presenter_fn`]
pub struct PresenterFn<F, B> {
    f: F,
    _phantom: PhantomData<fn(B)>,
}

/// Uses an ordinary function or closure as a [`Presenter`].
///
/// ```
/// use http::{Request, StatusCode};
/// use micro_presenter::{presenter_fn, Presenter, Response};
///
/// let presenter = presenter_fn(|req: &Request<()>| {
///     Response::from(StatusCode::OK).with_text(format!("got {}", req.uri().path()))
/// });
///
/// let req = Request::get("/hello").body(()).unwrap();
/// assert_eq!(&presenter.present(&req).body()[..], b"got /hello");
/// ```
pub fn presenter_fn<F, B>(f: F) -> PresenterFn<F, B>
where
    F: Fn(&Request<B>) -> Response + Send + Sync,
{
    PresenterFn { f, _phantom: PhantomData }
}

impl<F, B> Presenter<B> for PresenterFn<F, B>
where
    F: Fn(&Request<B>) -> Response + Send + Sync,
{
    #[inline]
    fn present(&self, req: &Request<B>) -> Response {
        (self.f)(req)
    }
}

impl<F, B> fmt::Debug for PresenterFn<F, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresenterFn").finish_non_exhaustive()
    }
}

/// an [`ErrPresenter`] backed by a function, created by [`err_presenter_fn`]
pub struct ErrPresenterFn<F, B> {
    f: F,
    _phantom: PhantomData<fn(B)>,
}

/// Uses an ordinary function or closure as an [`ErrPresenter`].
pub fn err_presenter_fn<F, B>(f: F) -> ErrPresenterFn<F, B>
where
    F: Fn(&Request<B>) -> Result<Response, PresentError> + Send + Sync,
{
    ErrPresenterFn { f, _phantom: PhantomData }
}

impl<F, B> ErrPresenter<B> for ErrPresenterFn<F, B>
where
    F: Fn(&Request<B>) -> Result<Response, PresentError> + Send + Sync,
{
    #[inline]
    fn err_present(&self, req: &Request<B>) -> Result<Response, PresentError> {
        (self.f)(req)
    }
}

impl<F, B> fmt::Debug for ErrPresenterFn<F, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrPresenterFn").finish_non_exhaustive()
    }
}

/// A fixed response is a presenter that always presents a copy of itself.
impl<B> Presenter<B> for Response {
    #[inline]
    fn present(&self, _req: &Request<B>) -> Response {
        self.clone()
    }
}

macro_rules! impl_presenter_for_pointer {
    ($($pointer:ty),*) => {
        $(
            impl<B, P: Presenter<B> + ?Sized> Presenter<B> for $pointer {
                #[inline]
                fn present(&self, req: &Request<B>) -> Response {
                    (**self).present(req)
                }
            }

            impl<B, P: ErrPresenter<B> + ?Sized> ErrPresenter<B> for $pointer {
                #[inline]
                fn err_present(&self, req: &Request<B>) -> Result<Response, PresentError> {
                    (**self).err_present(req)
                }
            }
        )*
    };
}

impl_presenter_for_pointer!(Box<P>, Arc<P>, &P);

#[cfg(test)]
mockall::mock! {
    pub(crate) Pres {}

    impl Presenter<()> for Pres {
        fn present(&self, req: &Request<()>) -> Response;
    }
}

#[cfg(test)]
mockall::mock! {
    pub(crate) ErrPres {}

    impl ErrPresenter<()> for ErrPres {
        fn err_present(&self, req: &Request<()>) -> Result<Response, PresentError>;
    }
}
