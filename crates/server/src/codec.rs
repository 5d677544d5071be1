//! Request decoding.
//!
//! [`RequestDecoder`] turns raw bytes into a complete `http::Request<Bytes>`: the head is
//! parsed with `httparse`, the body is buffered according to `content-length`.
//! Presenters work on whole requests, so there is no body streaming here.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum head size: 8KB
//! - Maximum body size: 1MB
//! - HTTP/1.0 and HTTP/1.1 only, `transfer-encoding` request bodies are rejected

use crate::error::ParseError;
use crate::utils::ensure;
use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, Request, Version};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

/// Maximum number of headers allowed in a request
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire head section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Maximum size in bytes allowed for a request body
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Decoder for complete HTTP requests implementing the [`Decoder`] trait.
#[derive(Debug, Default)]
pub struct RequestDecoder {
    state: DecodeState,
}

#[derive(Debug, Default)]
enum DecodeState {
    #[default]
    Head,
    Body {
        head: Request<()>,
        length: usize,
    },
}

impl RequestDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for RequestDecoder {
    type Item = Request<Bytes>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let (head, length) = match std::mem::take(&mut self.state) {
            DecodeState::Head => match decode_head(src)? {
                Some(head_and_length) => head_and_length,
                None => return Ok(None),
            },
            DecodeState::Body { head, length } => (head, length),
        };

        if src.len() < length {
            src.reserve(length - src.len());
            self.state = DecodeState::Body { head, length };
            return Ok(None);
        }

        let body = src.split_to(length).freeze();
        Ok(Some(head.map(|()| body)))
    }
}

/// Parses the request head at the start of `src`, consuming it when complete.
///
/// Returns the head and the announced body length.
fn decode_head(src: &mut BytesMut) -> Result<Option<(Request<()>, usize)>, ParseError> {
    let (head, body_offset) = {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut req = httparse::Request::new(&mut headers);

        let parsed_result = req.parse(src).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            e => ParseError::invalid_header(e),
        });

        let body_offset = match parsed_result? {
            Status::Complete(body_offset) => body_offset,
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                return Ok(None);
            }
        };
        trace!(head_size = body_offset, "parsed request head");
        ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

        let version = match req.version {
            Some(0) => Version::HTTP_10,
            Some(1) => Version::HTTP_11,
            v => return Err(ParseError::InvalidVersion(v)),
        };

        let mut builder = Request::builder()
            .method(req.method.ok_or(ParseError::InvalidMethod)?)
            .uri(req.path.ok_or(ParseError::InvalidUri)?)
            .version(version);
        for header in req.headers.iter() {
            builder = builder.header(header.name, header.value);
        }

        (builder.body(()).map_err(ParseError::invalid_header)?, body_offset)
    };

    ensure!(!head.headers().contains_key(TRANSFER_ENCODING), ParseError::UnsupportedTransferEncoding);

    let length = content_length(head.headers())?.unwrap_or(0);
    ensure!(length <= MAX_BODY_BYTES, ParseError::too_large_body(length, MAX_BODY_BYTES));

    let _ = src.split_to(body_offset);
    Ok(Some((head, length)))
}

/// Reads the body length from every `content-length` value.
///
/// Repeated values, in separate headers or as a list, must all agree: a request with
/// differing lengths is rejected, or its body boundary would be ambiguous.
fn content_length(headers: &HeaderMap) -> Result<Option<usize>, ParseError> {
    let mut length = None;
    for value in headers.get_all(CONTENT_LENGTH) {
        let value = value.to_str().map_err(ParseError::invalid_content_length)?;
        for item in value.split(',') {
            let current = item.trim().parse::<usize>().map_err(ParseError::invalid_content_length)?;
            match length {
                Some(previous) if previous != current => {
                    return Err(ParseError::invalid_content_length(format!(
                        "conflicting values {previous} and {current}"
                    )));
                }
                _ => length = Some(current),
            }
        }
    }
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::RequestDecoder;
    use crate::error::ParseError;
    use bytes::BytesMut;
    use http::{Method, Version};
    use indoc::indoc;
    use tokio_util::codec::Decoder;

    #[test]
    fn from_curl() {
        let str = indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        "##};

        let mut buf = BytesMut::from(str);
        let req = RequestDecoder::new().decode(&mut buf).unwrap().unwrap();

        assert_eq!(req.method(), Method::GET);
        assert_eq!(req.uri().path(), "/index.html");
        assert_eq!(req.version(), Version::HTTP_11);
        assert_eq!(req.headers().len(), 3);
        assert_eq!(req.headers().get(http::header::HOST).unwrap(), "127.0.0.1:8080");
        assert!(req.body().is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn body_is_read_by_content_length() {
        let str = indoc! {r##"
        POST /items HTTP/1.1
        Content-Length: 5

        hello GET"##};

        let mut buf = BytesMut::from(str);
        let req = RequestDecoder::new().decode(&mut buf).unwrap().unwrap();

        assert_eq!(req.method(), Method::POST);
        assert_eq!(&req.body()[..], b"hello");
        assert_eq!(&buf[..], b" GET");
    }

    #[test]
    fn waits_for_the_whole_body() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("PUT /items/1 HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello");

        assert!(decoder.decode(&mut buf).unwrap().is_none());
        assert_eq!(&buf[..], b"hello");

        buf.extend_from_slice(b" world");
        let req = decoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(req.method(), Method::PUT);
        assert_eq!(&req.body()[..], b"hello world");
    }

    #[test]
    fn partial_head_needs_more_bytes() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nHost: exam");
        assert!(RequestDecoder::new().decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn pipelined_requests_decode_one_by_one() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("GET /a HTTP/1.1\r\n\r\nDELETE /b HTTP/1.1\r\n\r\n");

        let first = decoder.decode(&mut buf).unwrap().unwrap();
        let second = decoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(first.uri().path(), "/a");
        assert_eq!(second.method(), Method::DELETE);
        assert_eq!(second.uri().path(), "/b");
        assert!(decoder.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn chunked_body_is_rejected() {
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n");
        let result = RequestDecoder::new().decode(&mut buf);
        assert!(matches!(result, Err(ParseError::UnsupportedTransferEncoding)));
    }

    #[test]
    fn invalid_content_length_is_rejected() {
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: five\r\n\r\n");
        let result = RequestDecoder::new().decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })));
    }

    #[test]
    fn conflicting_content_lengths_are_rejected() {
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 0\r\nContent-Length: 5\r\n\r\nhello");
        let result = RequestDecoder::new().decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })));
    }

    #[test]
    fn conflicting_content_length_list_is_rejected() {
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 5, 3\r\n\r\nhello");
        let result = RequestDecoder::new().decode(&mut buf);
        assert!(matches!(result, Err(ParseError::InvalidContentLength { .. })));
    }

    #[test]
    fn repeated_equal_content_lengths_are_accepted() {
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 5\r\nContent-Length: 5\r\n\r\nhello");
        let req = RequestDecoder::new().decode(&mut buf).unwrap().unwrap();
        assert_eq!(&req.body()[..], b"hello");
        assert!(buf.is_empty());
    }

    #[test]
    fn too_large_head_is_rejected() {
        let mut buf = BytesMut::from(format!("GET / HTTP/1.1\r\nX-Big: {}", "a".repeat(9 * 1024)).as_str());
        let result = RequestDecoder::new().decode(&mut buf);
        assert!(matches!(result, Err(ParseError::TooLargeHeader { .. })));
    }
}
