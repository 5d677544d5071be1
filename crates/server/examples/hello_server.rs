//! Serves one endpoint composed of presenters.
//!
//! ```sh
//! curl -v http://127.0.0.1:8080/hello
//! curl -v -d 'some data' http://127.0.0.1:8080/hello
//! curl -v -X DELETE http://127.0.0.1:8080/hello
//! ```

use bytes::Bytes;
use http::{Request, StatusCode};
use micro_presenter::{
    DefaultResp, Dispatcher, ErrHandler, PresentError, Response, Writer, err_presenter_fn, presenter_fn,
};
use micro_presenter_server::Server;
use tracing::error;

fn get_data(req: &Request<Bytes>) -> Response {
    Response::from(StatusCode::OK).with_text(format!("here is some data for {}\r\n", req.uri().path()))
}

fn create_data(req: &Request<Bytes>) -> Result<Response, PresentError> {
    if req.body().is_empty() {
        return Err(PresentError::new("empty body")
            .with_response(Response::from((StatusCode::BAD_REQUEST, "a body is required\r\n"))));
    }
    Err(PresentError::new(format!("storage unavailable, {} bytes dropped", req.body().len())))
}

#[tokio::main]
async fn main() {
    let dispatcher = Dispatcher::builder()
        .get(presenter_fn(get_data))
        .post(ErrHandler::new(err_presenter_fn(create_data)).on_error(|req: &Request<Bytes>, err| {
            error!(method = %req.method(), uri = %req.uri(), cause = %err, "endpoint error happened");
        }))
        .not_supported(presenter_fn(|req: &Request<Bytes>| {
            Response::from((StatusCode::METHOD_NOT_ALLOWED, format!("the method {} is not allowed\r\n", req.method())))
        }))
        .build()
        .expect("not supported presenter is set");

    let writer = Writer::new(DefaultResp::new(
        dispatcher,
        Response::from((StatusCode::INTERNAL_SERVER_ERROR, "something went wrong\r\n")),
    ))
    .on_write_error(|req: &Request<Bytes>, err| {
        error!(method = %req.method(), uri = %req.uri(), cause = %err, "writing response failed");
    });

    let server = Server::builder().address("127.0.0.1:8080").writer(writer).build().unwrap();

    if let Err(e) = server.start().await {
        error!(cause = %e, "server stopped");
    }
}
