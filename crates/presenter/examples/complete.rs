//! Builds every handler of a small API the same way: same 405 response for unsupported
//! methods, same generic 500 response when something goes wrong, and error logging in
//! a single place instead of in every handler.

use http::{Method, Request, StatusCode};
use micro_presenter::{
    DefaultResp, Dispatcher, ErrHandler, ErrPresenter, PresentError, Presenter, Response, ResponseRecorder, Writer,
    presenter_fn,
};
use std::collections::HashMap;
use tracing::{Level, error};
use tracing_subscriber::FmtSubscriber;

fn make_handler(method_to_err_presenter: HashMap<Method, Box<dyn ErrPresenter>>) -> Writer<impl Presenter> {
    let dispatcher = method_to_err_presenter.into_iter().fold(
        Dispatcher::new(presenter_fn(|req: &Request<()>| {
            let body = format!("the method {} is not allowed on this endpoint", req.method());
            Response::from((StatusCode::METHOD_NOT_ALLOWED, body))
        })),
        |dispatcher, (method, err_presenter)| {
            let err_handler = ErrHandler::new(err_presenter).on_error(|req: &Request<()>, err| {
                error!(method = %req.method(), uri = %req.uri(), cause = %err, "endpoint error happened");
            });
            dispatcher.with_method(method, err_handler)
        },
    );

    let default_resp = DefaultResp::new(
        dispatcher,
        presenter_fn(|req: &Request<()>| {
            let body = format!("unexpected error on the {} {} endpoint", req.method(), req.uri());
            Response::from((StatusCode::INTERNAL_SERVER_ERROR, body))
        }),
    );

    Writer::new(default_resp).on_write_error(|req: &Request<()>, err| {
        error!(method = %req.method(), uri = %req.uri(), cause = %err, "writing response failed");
    })
}

struct GetSomeData;

impl ErrPresenter for GetSomeData {
    fn err_present(&self, _req: &Request<()>) -> Result<Response, PresentError> {
        Ok(Response::from(StatusCode::OK).with_text("here is some data"))
    }
}

struct CreateSomeDataAndError;

impl ErrPresenter for CreateSomeDataAndError {
    fn err_present(&self, _req: &Request<()>) -> Result<Response, PresentError> {
        Err(PresentError::new("some error occurred when creating data"))
    }
}

struct UpdateSomeDataAndError;

impl ErrPresenter for UpdateSomeDataAndError {
    fn err_present(&self, _req: &Request<()>) -> Result<Response, PresentError> {
        Err(PresentError::new("some error occurred when updating data")
            .with_response(Response::from((StatusCode::BAD_REQUEST, "some custom error response"))))
    }
}

fn boxed(err_presenter: impl ErrPresenter + 'static) -> Box<dyn ErrPresenter> {
    Box::new(err_presenter)
}

async fn call(title: &str, handler: &Writer<impl Presenter>, method: Method, path: &str) {
    println!("{title}");
    let req = Request::builder().method(method).uri(path).body(()).expect("valid request");
    let mut recorder = ResponseRecorder::new();
    handler.serve(&req, &mut recorder).await;
    println!("status code: {}", recorder.status().unwrap_or(StatusCode::OK).as_u16());
    println!("body: {}", String::from_utf8_lossy(recorder.body()));
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let get_some_data = make_handler(HashMap::from([(Method::GET, boxed(GetSomeData))]));
    let create_some_data = make_handler(HashMap::from([(Method::POST, boxed(CreateSomeDataAndError))]));
    let update_some_data = make_handler(HashMap::from([(Method::PUT, boxed(UpdateSomeDataAndError))]));

    call("getting some data", &get_some_data, Method::GET, "/hello").await;
    call("getting some data with the wrong http method", &get_some_data, Method::POST, "/hello").await;
    call(
        "an error occurs when creating some data and a default error response is returned",
        &create_some_data,
        Method::POST,
        "/hello-world",
    )
    .await;
    call(
        "an error occurs when updating some data and a custom error response is returned",
        &update_some_data,
        Method::PUT,
        "/hello-world/1",
    )
    .await;
}
