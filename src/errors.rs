use crate::{query, Version};
use std::io;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub(crate) enum ErrorKind {
    #[error("invalid method")]
    InvalidMethod,
    #[error("method not acceptable for this route")]
    UnacceptableMethod,

    #[error("invalid url")]
    InvalidUrl,
    #[error("invalid query string: {0}")]
    Query(#[from] query::Error),

    #[error("invalid version")]
    InvalidVersion,
    #[error("unsupported version")]
    UnsupportedVersion,

    #[error("invalid header")]
    InvalidHeader,
    #[error("too many headers")]
    TooManyHeaders,
    #[error("invalid content-length")]
    InvalidContentLength,
    #[error("invalid connection header")]
    InvalidConnection,

    #[error("missing client address header")]
    MissingClientAddress,

    #[error("no acceptable content encoding")]
    NoAcceptableEncoding,
    #[error("invalid range")]
    InvalidRange,
    #[error("range not satisfiable")]
    RangeNotSatisfiable,

    #[error("body too large")]
    BodyTooLarge,
    #[error("body length mismatch: expected {expected}, available {available}")]
    BodyMismatch { expected: usize, available: usize },

    #[error("service unavailable")]
    ServiceUnavailable,
    #[error("I/O error: {0}")]
    Io(IoError),

    /// Not enough buffered data to finish parsing yet. Never reaches the wire:
    /// the connection loop catches it and retries after reading more bytes.
    #[error("incomplete request")]
    Incomplete,
}

impl From<io::Error> for ErrorKind {
    fn from(err: io::Error) -> Self {
        ErrorKind::Io(IoError(err))
    }
}

macro_rules! http_errors {
    ($($name:ident: $status_code:expr, $len:literal => $json:literal; )*) => {
        pub(crate) const fn as_http(
            &self,
            version: Version,
            json: bool,
        ) -> &'static [u8] {
            match (json, self, version) { $(
                (true, Self::$name { .. }, Version::Http11) => concat!(
                    "HTTP/1.1 ", $status_code, "\r\n",
                    "connection: close\r\n",
                    "content-length: ", $len, "\r\n",
                    "content-type: application/json\r\n",
                    "\r\n",
                    $json
                ),
                (false, Self::$name { .. }, Version::Http11) => concat!(
                    "HTTP/1.1 ", $status_code, "\r\n",
                    "connection: close\r\n",
                    "content-length: 0\r\n\r\n",
                ),
                (true, Self::$name { .. }, Version::Http10) => concat!(
                    "HTTP/1.0 ", $status_code, "\r\n",
                    "connection: close\r\n",
                    "content-length: ", $len, "\r\n",
                    "content-type: application/json\r\n",
                    "\r\n",
                    $json
                ),
                (false, Self::$name { .. }, Version::Http10) => concat!(
                    "HTTP/1.0 ", $status_code, "\r\n",
                    "connection: close\r\n",
                    "content-length: 0\r\n\r\n",
                ),
            )* }.as_bytes()
        }
    };
}

impl ErrorKind {
    http_errors! {
        InvalidMethod: "400 Bad Request", "55"
            => r#"{"error":"Invalid HTTP method","code":"INVALID_METHOD"}"#;
        UnacceptableMethod: "405 Method Not Allowed", "64"
            => r#"{"error":"Method not allowed for route","code":"UNACCEPTABLE_METHOD"}"#;

        InvalidUrl: "400 Bad Request", "51"
            => r#"{"error":"Invalid URL format","code":"INVALID_URL"}"#;
        Query: "400 Bad Request", "55"
            => r#"{"error":"Invalid query string","code":"INVALID_QUERY"}"#;

        InvalidVersion: "400 Bad Request", "57"
            => r#"{"error":"Invalid HTTP version","code":"INVALID_VERSION"}"#;
        UnsupportedVersion: "505 HTTP Version Not Supported", "67"
            => r#"{"error":"HTTP version not supported","code":"UNSUPPORTED_VERSION"}"#;

        InvalidHeader: "400 Bad Request", "57"
            => r#"{"error":"Invalid header format","code":"INVALID_HEADER"}"#;
        TooManyHeaders: "431 Request Header Fields Too Large", "54"
            => r#"{"error":"Too many headers","code":"TOO_MANY_HEADERS"}"#;
        InvalidContentLength: "400 Bad Request", "66"
            => r#"{"error":"Invalid Content-Length","code":"INVALID_CONTENT_LENGTH"}"#;
        InvalidConnection: "400 Bad Request", "65"
            => r#"{"error":"Invalid Connection header","code":"INVALID_CONNECTION"}"#;
        MissingClientAddress: "400 Bad Request", "73"
            => r#"{"error":"Missing client address header","code":"MISSING_CLIENT_ADDRESS"}"#;

        NoAcceptableEncoding: "406 Not Acceptable", "65"
            => r#"{"error":"No acceptable content encoding","code":"NO_ACCEPTABLE_ENCODING"}"#;
        InvalidRange: "400 Bad Request", "53"
            => r#"{"error":"Invalid Range header","code":"INVALID_RANGE"}"#;
        RangeNotSatisfiable: "416 Range Not Satisfiable", "58"
            => r#"{"error":"Range not satisfiable","code":"RANGE_NOT_SATISFIABLE"}"#;

        BodyTooLarge: "413 Payload Too Large", "58"
            => r#"{"error":"Request body too large","code":"BODY_TOO_LARGE"}"#;
        BodyMismatch: "400 Bad Request", "55"
            => r#"{"error":"Body length mismatch","code":"BODY_MISMATCH"}"#;

        ServiceUnavailable: "503 Service Unavailable", "72"
            => r#"{"error":"Service temporarily unavailable","code":"SERVICE_UNAVAILABLE"}"#;
        Io: "503 Service Unavailable", "48"
            => r#"{"error":"I/O error occurred","code":"IO_ERROR"}"#;

        // Never actually sent; the connection loop intercepts this before
        // it would reach as_http. Entry exists only so the macro's
        // exhaustive match compiles.
        Incomplete: "500 Internal Server Error", "21"
            => r#"{"error":"incomplete"}"#;
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub(crate) struct IoError(#[from] pub(crate) io::Error);

impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}
