use crate::response::Response;
use std::error::Error;
use std::io;
use thiserror::Error;

/// The erased error type carried by [`PresentError`].
pub type BoxError = Box<dyn Error + Send + Sync>;

/// An error signalled by an [`ErrPresenter`](crate::ErrPresenter), together with the
/// response that goes with it.
///
/// The response is unset unless the presenter attaches one with
/// [`with_response`](Self::with_response), for example a `400` explaining what was wrong
/// with the request while the error itself is kept for logging.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct PresentError {
    response: Response,
    source: BoxError,
}

impl PresentError {
    pub fn new<E: Into<BoxError>>(source: E) -> Self {
        Self { response: Response::new(), source: source.into() }
    }

    #[must_use]
    pub fn with_response(mut self, response: Response) -> Self {
        self.response = response;
        self
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    /// The underlying error.
    pub fn error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.source.as_ref()
    }

    pub fn into_parts(self) -> (Response, BoxError) {
        (self.response, self.source)
    }
}

/// Failure to write a response body to the outbound channel.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// A previous write failed, nothing more can be sent on this channel.
    #[error("response writer is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("method not supported presenter must be set")]
    MissingNotSupported,
}
