use crate::presenter::Presenter;
use crate::response::Response;
use http::Request;

/// A [`Presenter`] which produces a response or a default response.
///
/// The primary presenter's response is returned when its status is set. When the
/// primary leaves the status unset, the default presenter is asked instead and its
/// response is returned untouched. Nothing but the status is inspected.
///
/// Wrapping a whole endpoint group this way centralizes the generic "unexpected error"
/// response: leaf presenters just leave the status unset when they have nothing to say.
///
/// # Example
///
/// ```
/// use http::{Request, StatusCode};
/// use micro_presenter::{presenter_fn, DefaultResp, Presenter, Response};
///
/// let default_resp = DefaultResp::new(
///     presenter_fn(|_req: &Request<()>| Response::new()),
///     Response::from((StatusCode::INTERNAL_SERVER_ERROR, "generating default response")),
/// );
///
/// let response = default_resp.present(&Request::post("/dr").body(()).unwrap());
/// assert_eq!(response.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
/// assert_eq!(&response.body()[..], b"generating default response");
/// ```
#[derive(Debug, Clone)]
pub struct DefaultResp<P, D> {
    presenter: P,
    default_presenter: D,
}

impl<P, D> DefaultResp<P, D> {
    pub fn new(presenter: P, default_presenter: D) -> Self {
        Self { presenter, default_presenter }
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn default_presenter(&self) -> &D {
        &self.default_presenter
    }
}

impl<B, P, D> Presenter<B> for DefaultResp<P, D>
where
    P: Presenter<B>,
    D: Presenter<B>,
{
    fn present(&self, req: &Request<B>) -> Response {
        let response = self.presenter.present(req);
        if !response.is_unset() {
            return response;
        }
        self.default_presenter.present(req)
    }
}

#[cfg(test)]
mod tests {
    use super::DefaultResp;
    use crate::presenter::MockPres;
    use crate::{Presenter, Response, presenter_fn};
    use http::header::CONTENT_TYPE;
    use http::{HeaderValue, Method, Request, StatusCode};

    fn request() -> Request<()> {
        Request::builder().method(Method::GET).uri("/whats-up-doc").body(()).unwrap()
    }

    fn echo_body(req: &Request<()>) -> Response {
        Response::new().with_body(format!("got request with method {} on path {}", req.method(), req.uri().path()))
    }

    #[test]
    fn response_comes_from_the_presenter() {
        let mut default_presenter = MockPres::new();
        default_presenter.expect_present().never();
        let sut = DefaultResp::new(
            presenter_fn(|req: &Request<()>| {
                Response::from(StatusCode::SWITCHING_PROTOCOLS).with_body(echo_body(req).body().clone())
            }),
            default_presenter,
        );

        let response = sut.present(&request());

        assert_eq!(response.status(), Some(StatusCode::SWITCHING_PROTOCOLS));
        assert!(response.headers().is_empty());
        assert_eq!(&response.body()[..], b"got request with method GET on path /whats-up-doc");
    }

    #[test]
    fn default_response_is_returned_when_status_unset() {
        let default = Response::from((StatusCode::INTERNAL_SERVER_ERROR, "default response!"))
            .with_header("x-default", HeaderValue::from_static("yes"));
        let sut = DefaultResp::new(presenter_fn(echo_body), default.clone());

        let response = sut.present(&request());

        // the default output is returned exactly, the primary's body is dropped
        assert_eq!(response, default);
    }

    #[test]
    fn only_the_status_is_inspected() {
        let sut = DefaultResp::new(
            presenter_fn(|_req: &Request<()>| {
                Response::new().with_header(CONTENT_TYPE, HeaderValue::from_static("text/html")).with_body("<p>")
            }),
            Response::from(StatusCode::SERVICE_UNAVAILABLE),
        );

        assert_eq!(sut.present(&request()), Response::from(StatusCode::SERVICE_UNAVAILABLE));
    }

    #[test]
    fn nested_defaults_fall_through() {
        let inner = DefaultResp::new(Response::new(), Response::new().with_body("still unset"));
        let sut = DefaultResp::new(inner, Response::from((StatusCode::INTERNAL_SERVER_ERROR, "outer")));

        let response = Presenter::<()>::present(&sut, &request());

        assert_eq!(response, Response::from((StatusCode::INTERNAL_SERVER_ERROR, "outer")));
    }
}
