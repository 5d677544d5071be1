use crate::error::WriteError;
use crate::writer::ResponseWriter;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, StatusCode};
use tracing::warn;

/// A [`ResponseWriter`] that records the response in memory.
///
/// Useful to test a [`Writer`](crate::Writer) end to end, or to run a handler in-process
/// and forward the result through another channel.
#[derive(Debug, Default)]
pub struct ResponseRecorder {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

impl ResponseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed status, `None` while nothing was committed.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Converts the recording into an [`http::Response`], `200 OK` if nothing was
    /// committed.
    pub fn into_response(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(self.body.freeze());
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}

#[async_trait]
impl ResponseWriter for ResponseRecorder {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_head(&mut self, status: StatusCode) {
        if let Some(committed) = self.status {
            warn!(%committed, %status, "status already committed, ignore write_head");
            return;
        }
        self.status = Some(status);
    }

    async fn write_body(&mut self, body: Bytes) -> Result<(), WriteError> {
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
        self.body.extend_from_slice(&body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ResponseRecorder;
    use crate::writer::ResponseWriter;
    use bytes::Bytes;
    use http::{HeaderValue, StatusCode};

    #[test]
    fn first_write_head_wins() {
        let mut recorder = ResponseRecorder::new();
        recorder.write_head(StatusCode::NOT_FOUND);
        recorder.write_head(StatusCode::OK);

        assert_eq!(recorder.status(), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn body_write_commits_ok() {
        let mut recorder = ResponseRecorder::new();
        recorder.write_body(Bytes::from_static(b"hello ")).await.unwrap();
        recorder.write_body(Bytes::from_static(b"world")).await.unwrap();
        recorder.write_head(StatusCode::NOT_FOUND);

        assert_eq!(recorder.status(), Some(StatusCode::OK));
        assert_eq!(recorder.body(), b"hello world");
    }

    #[test]
    fn into_response_defaults_to_ok() {
        let mut recorder = ResponseRecorder::new();
        recorder.headers_mut().insert("x-test", HeaderValue::from_static("1"));

        let response = recorder.into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-test").unwrap(), "1");
        assert!(response.body().is_empty());
    }
}
