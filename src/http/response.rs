//! A highly efficient, zero-allocation HTTP response builder for embedded web servers.

use crate::{
    http::{
        encoding::AcceptableEncodings,
        range,
        types::{CompressionType, StatusCode, Version},
    },
    limits::RespLimits,
    BodyWriter, WriteBuffer,
};
use std::{borrow::Cow, rc::Rc, sync::Arc};

#[derive(Debug)]
/// HTTP response builder for constructing server responses.
///
/// Provides a fluent interface for building HTTP responses with status codes,
/// headers, and body content. Automatically handles content-length calculation
/// and connection management.
///
/// Build responses by chaining methods in strict order:
/// [`status()`](Response::status) -> headers -> any body method.
///
/// Instances are created automatically by the server and passed to
/// the [`Handler::handle`](crate::Handler::handle).
///
/// # Examples
/// ```
/// use dispatch_http::{Handled, Request, Response, StatusCode};
///
/// // In your implementation `Handler`
/// async fn handle(_req: &Request, resp: &mut Response) -> Handled {
///     resp
///         .status(StatusCode::Ok)
///         .header("content-type", "text/html")
///         .body("<h1>Hello World</h1>")
/// }
/// ```
///
/// # Panics
/// All methods perform validity checks in `debug` mode that panic on violations.
/// In `release` mode, these checks are omitted for performance, which may
/// produce invalid HTTP responses. Before creating a release version, conduct tests.
pub struct Response {
    buffer: Vec<u8>,
    pub(crate) version: Version,
    pub(crate) keep_alive: bool,
    /// Set by the connection loop for HEAD requests. Body-writing methods
    /// still compute `content-length` from the would-be body but never put
    /// the bytes on the wire.
    pub(crate) headers_only: bool,
    posit_length: usize,
    start_body: usize,
    state: ResponseState,
    file_body: Option<tokio::fs::File>,
}

#[doc(hidden)]
pub struct Handled(());

#[derive(Debug, Clone, Copy, PartialEq)]
enum ResponseState {
    Clean,
    Headers,
    Complete,
}

impl Response {
    #[inline(always)]
    pub(crate) fn new(limits: &RespLimits) -> Self {
        Self {
            buffer: Vec::with_capacity(limits.default_capacity),
            version: Version::Http11,
            keep_alive: true,
            headers_only: false,
            posit_length: 0,
            start_body: 0,
            state: ResponseState::Clean,
            file_body: None,
        }
    }

    #[inline(always)]
    pub(crate) fn reset(&mut self, limits: &RespLimits) {
        if self.buffer.capacity() > limits.max_capacity {
            self.buffer = Vec::with_capacity(limits.default_capacity);
        } else {
            self.buffer.clear();
        }

        self.version = Version::Http11;
        self.keep_alive = true;
        self.headers_only = false;
        self.posit_length = 0;
        self.start_body = 0;
        self.state = ResponseState::Clean;
        self.file_body = None;
    }

    #[inline(always)]
    pub(crate) fn buffer(&self) -> &Vec<u8> {
        &self.buffer
    }

    /// Takes the pending file body set by [`send_file`](Response::send_file), if any.
    /// The connection loop streams it to the socket after flushing `buffer()`.
    #[inline(always)]
    pub(crate) fn take_file_body(&mut self) -> Option<tokio::fs::File> {
        self.file_body.take()
    }
}

/// Methods that work with all protocols
impl Response {
    /// Forces the connection to close after a response.
    ///
    /// # Examples
    /// ```
    /// # dispatch_http::run_test(|_, resp| {
    /// use dispatch_http::StatusCode;
    ///
    /// resp.status(StatusCode::Ok)
    ///     .close()  // Connection will close after this response
    ///     .body("Closing connection")
    /// # });
    /// ```
    ///
    /// # Panics
    /// Error messages:
    /// - `Must be called before any finalizing method`
    ///
    /// Panics in `debug` mode when:
    /// - Called after any finalizing method (method returning `Handler`)
    #[inline]
    #[track_caller]
    pub fn close(&mut self) -> &mut Self {
        debug_assert!(
            self.state != ResponseState::Complete,
            "Must be called before any finalizing method",
        );

        self.keep_alive = false;
        self
    }
}

/// Methods for working with `HTTP/1.X` (HTTP/1.1 or HTTP/1.1)
impl Response {
    /// Sets the HTTP status code for the response.
    ///
    /// # Examples
    /// ```
    /// # dispatch_http::run_test(|_, resp| {
    /// use dispatch_http::StatusCode;
    ///
    /// resp.status(StatusCode::NotFound)
    ///     .body(r#"{"status": "not found", "code": 404}"#)
    /// # });
    /// ```
    ///
    /// # Panics
    /// Error messages:
    /// - `Must be first and called only once`
    ///
    /// Panics in `debug` mode when:
    /// - Called multiple times
    /// - Called after any body method
    #[inline]
    #[track_caller]
    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        debug_assert!(
            self.state == ResponseState::Clean,
            "Must be first and called only once"
        );

        self.buffer
            .extend_from_slice(status.to_first_line(self.version));
        self.state = ResponseState::Headers;
        self
    }

    /// Adds a header to the response.
    ///
    /// PLEASE DO NOT ADD THE FOLLOWING HEADINGS:
    /// - `content-length` - calculated automatically
    /// - `connection` - use [`close()`](Response::close)
    ///
    /// # Examples
    /// ```
    /// # dispatch_http::run_test(|_, resp| {
    /// use dispatch_http::StatusCode;
    ///
    /// resp.status(StatusCode::Ok)
    ///     .header("content-type", "text/plain")        // &str, &str
    ///     .header("x-custom-id", 128)                  // &str, i32  
    ///     .header("x-cache-enabled", true)             // &str, bool
    ///     .body("Done")
    /// # });
    /// ```
    ///
    /// # Panics
    /// Error message: `Must be called after status() and before any body method`
    ///
    /// Panics in `debug` mode when:
    /// - Called before [`status()`](Response::status)
    /// - Called after [`body()`](Response::body) or [`body_with()`](Response::body_with)
    #[inline]
    #[track_caller]
    pub fn header<N: WriteBuffer, V: WriteBuffer>(&mut self, name: N, value: V) -> &mut Self {
        debug_assert!(
            self.state == ResponseState::Headers,
            "Must be called after status() and before any body method"
        );

        name.write_to(&mut self.buffer);
        self.buffer.extend_from_slice(b": ");
        value.write_to(&mut self.buffer);
        self.buffer.extend_from_slice(b"\r\n");
        self
    }

    /// Add a multi-value header to the response
    ///
    /// PLEASE DO NOT ADD THE FOLLOWING HEADINGS:
    /// - `content-length` - calculated automatically
    /// - `connection` - use [`close()`](Response::close)
    ///
    /// # Examples
    /// ```
    /// # dispatch_http::run_test(|_, resp| {
    /// use dispatch_http::StatusCode;
    ///
    /// resp.status(StatusCode::Ok)
    ///     .header_multi(b"x-tags", ", ", ["user"])
    ///     // x-tags: user
    ///     .header_multi("accept", "; ", ["text/html", "text/plain"])
    ///     // accept: text/html; text/plain
    ///     .header_multi("id-users", ", ", vec![123, 234, 345])
    ///     // id-users: 123, 234, 345
    ///     .body("Done")
    /// # });
    /// ```
    ///
    /// # Panics
    /// Error message: `Must be called after status() and before any body method`
    ///
    /// Panics in `debug` mode when:
    /// - Called before [`status()`](Response::status)
    /// - Called after [`body()`](Response::body) or [`body_with()`](Response::body_with)
    #[inline]
    #[track_caller]
    pub fn header_multi<N, S, I, V>(&mut self, name: N, split: S, values: I) -> &mut Self
    where
        N: WriteBuffer,
        S: WriteBuffer,
        I: IntoIterator<Item = V>,
        V: WriteBuffer,
    {
        debug_assert!(
            self.state == ResponseState::Headers,
            "Must be called after status() and before any body method"
        );

        name.write_to(&mut self.buffer);
        self.buffer.extend_from_slice(b": ");

        let mut iter = values.into_iter();
        if let Some(first) = iter.next() {
            first.write_to(&mut self.buffer);

            for value in iter {
                split.write_to(&mut self.buffer);
                value.write_to(&mut self.buffer);
            }
        }

        self.buffer.extend_from_slice(b"\r\n");
        self
    }

    /// Adds a header with parameters to the response.
    ///
    /// PLEASE DO NOT ADD THE FOLLOWING HEADINGS:
    /// - `content-length` - calculated automatically
    /// - `connection` - use [`close()`](Response::close)
    ///
    /// # Examples
    /// ```
    /// # dispatch_http::run_test(|_, resp| {
    /// use dispatch_http::StatusCode;
    ///
    /// resp.status(StatusCode::Ok)
    ///     .header_params("content-type", "; ", vec![
    ///         ("text/html", None),
    ///         ("charset", Some("utf-8")),
    ///     ])
    ///     // Content-Type: text/html; charset=utf-8
    ///     .header_params("cache-control", ", ", [
    ///         ("max-age", Some("3600")),
    ///         ("must-revalidate", None),
    ///     ])
    ///     // Cache-Control: max-age=3600, must-revalidate
    ///     .body("Done")
    /// # });
    /// ```
    ///
    /// # Panics
    /// Error message: `Must be called after status() and before any body method`
    ///
    /// Panics in `debug` mode when:
    /// - Called before [`status()`](Response::status)
    /// - Called after [`body()`](Response::body) or [`body_with()`](Response::body_with)
    #[inline]
    #[track_caller]
    pub fn header_params<N, S, I, K, V>(&mut self, name: N, split: S, params: I) -> &mut Self
    where
        N: WriteBuffer,
        S: WriteBuffer,
        I: IntoIterator<Item = (K, Option<V>)>,
        K: WriteBuffer,
        V: WriteBuffer,
    {
        debug_assert!(
            self.state == ResponseState::Headers,
            "Must be called after status() and before any body method"
        );

        name.write_to(&mut self.buffer);
        self.buffer.extend_from_slice(b": ");

        let mut iter = params.into_iter();
        if let Some((first_key, first_val)) = iter.next() {
            first_key.write_to(&mut self.buffer);
            if let Some(val) = first_val {
                self.buffer.extend_from_slice(b"=");
                val.write_to(&mut self.buffer);
            }

            for (key, value) in iter {
                split.write_to(&mut self.buffer);
                key.write_to(&mut self.buffer);
                if let Some(val) = value {
                    self.buffer.extend_from_slice(b"=");
                    val.write_to(&mut self.buffer);
                }
            }
        }

        self.buffer.extend_from_slice(b"\r\n");
        self
    }

    /// Adds a `Content-Encoding` header naming the compression applied to the body.
    ///
    /// Pairs with [`negotiate_encoding()`](Response::negotiate_encoding), which picks
    /// the value to pass here.
    ///
    /// # Panics
    /// Panics in `debug` mode under the same conditions as [`header()`](Response::header).
    #[inline]
    #[track_caller]
    pub fn add_encoding_header(&mut self, encoding: CompressionType) -> &mut Self {
        self.header("Content-Encoding", encoding.as_str())
    }

    /// Picks the best content encoding to use for this response out of `preferred`
    /// then `fallback`, given the request's `Accept-Encoding` header value.
    ///
    /// Returns `None` when the client accepts none of the candidates and `identity`
    /// itself is forbidden; callers typically respond with
    /// [`StatusCode::NotAcceptable`] in that case.
    #[inline]
    pub fn negotiate_encoding(
        accept_encoding: Option<&[u8]>,
        preferred: CompressionType,
        fallback: &[CompressionType],
    ) -> Option<CompressionType> {
        AcceptableEncodings::parse(accept_encoding.unwrap_or(b""))
            .negotiate(preferred, fallback)
            .ok()
    }

    /// Parses a `Range` header value against a resource of `total_len` bytes,
    /// clamping each range to the resource, sorting ascending by start, and
    /// merging touching ranges. Returned ranges are `(start, end)`, half-open.
    ///
    /// Returns `Err(StatusCode::RangeNotSatisfiable)` for a malformed header,
    /// for a set of ranges that all fall outside the resource, and for ranges
    /// that genuinely overlap (rather than merely touch) - callers should
    /// respond with that status and no body.
    #[inline]
    pub fn parse_ranges(range_header: &[u8], total_len: u64) -> Result<Vec<(u64, u64)>, StatusCode> {
        range::parse(range_header, total_len)
            .map(|ranges| ranges.into_iter().map(|r| (r.start, r.end)).collect())
            .map_err(|_| StatusCode::RangeNotSatisfiable)
    }

    /// Adds a `Set-Cookie` header.
    ///
    /// `value = None` emits an already-expired cookie (`Max-Age=0`) that clears the
    /// named cookie on the client. Cookies are always scoped `Path=<path>` and
    /// `SameSite=Strict`; pass `http_only = true` to additionally mark the cookie
    /// inaccessible to client-side scripts.
    ///
    /// # Panics
    /// Panics in `debug` mode under the same conditions as [`header()`](Response::header).
    #[inline]
    #[track_caller]
    pub fn add_cookie_header<N: WriteBuffer, V: WriteBuffer>(
        &mut self,
        path: &str,
        name: N,
        value: Option<V>,
        http_only: bool,
    ) -> &mut Self {
        debug_assert!(
            self.state == ResponseState::Headers,
            "Must be called after status() and before any body method"
        );

        let expired = value.is_none();

        self.buffer.extend_from_slice(b"Set-Cookie: ");
        name.write_to(&mut self.buffer);
        self.buffer.extend_from_slice(b"=");
        if let Some(value) = value {
            value.write_to(&mut self.buffer);
        }

        self.buffer.extend_from_slice(b"; Path=");
        self.buffer.extend_from_slice(path.as_bytes());
        self.buffer.extend_from_slice(b"; SameSite=Strict");

        if http_only {
            self.buffer.extend_from_slice(b"; HttpOnly");
        }
        if expired {
            self.buffer.extend_from_slice(b"; Max-Age=0");
        }

        self.buffer.extend_from_slice(b"\r\n");
        self
    }

    /// Adds `Cache-Control: max-age=<seconds>` and, when `etag` is given, an `ETag`
    /// header quoting it.
    ///
    /// `max_age_ms` is given in milliseconds and truncated down to whole seconds, as
    /// `Cache-Control`'s `max-age` directive has no sub-second resolution; negative
    /// values are clamped to zero.
    ///
    /// # Panics
    /// Panics in `debug` mode under the same conditions as [`header()`](Response::header).
    #[inline]
    #[track_caller]
    pub fn add_caching_headers<T: WriteBuffer>(&mut self, max_age_ms: i64, etag: Option<T>) -> &mut Self {
        let max_age_s = max_age_ms.max(0) as u64 / 1000;
        self.header_params("Cache-Control", ", ", [("max-age", Some(max_age_s))]);

        if let Some(etag) = etag {
            self.buffer.extend_from_slice(b"ETag: \"");
            etag.write_to(&mut self.buffer);
            self.buffer.extend_from_slice(b"\"\r\n");
        }

        self
    }

    /// Sets the response body and finalizes the response.
    ///
    /// # Side Effects
    /// - Adds a `connection` header if necessary
    /// - Calculates and sets the `content-length` header
    ///
    /// After calling this method, the response is considered complete
    /// and cannot be modified further.
    ///
    /// # Examples
    /// ```
    /// # dispatch_http::run_test(|_, resp| {
    /// use dispatch_http::StatusCode;
    //
    /// resp.status(StatusCode::Ok)
    ///     .header("content-type", "text/plain")
    ///     .body("Hello, World!")
    /// # });
    /// ```
    ///
    /// # Panics
    /// Error message: `Must be called after status() and any header methods`
    ///
    /// Panics in `debug` mode when:
    /// - Called before [`status()`](Response::status)
    /// - Called after [`body()`](Response::body) or [`body_with()`](Response::body_with)
    #[inline]
    #[track_caller]
    pub fn body<T: WriteBuffer>(&mut self, data: T) -> Handled {
        debug_assert!(
            self.state == ResponseState::Headers,
            "Must be called after status() and any header methods"
        );

        self.start_body();
        data.write_to(&mut self.buffer);
        self.end_body()
    }

    /// Writes the response body via closure and finalizes the response.
    ///
    /// # Side Effects
    /// - Adds a `connection` header if necessary
    /// - Calculates and sets the `content-length` header
    ///
    /// After calling this method, the response is considered complete
    /// and cannot be modified further.
    ///
    /// # Examples
    /// Using [`write!`]:
    /// ```
    /// # dispatch_http::run_test(|_, resp| {
    /// use dispatch_http::StatusCode;
    /// use std::io::Write;
    ///
    /// resp.status(StatusCode::Ok)
    ///     .header("content-type", "application/json")
    ///     .body_with(|writer| {
    ///         // Write JSON directly to the buffer
    ///         write!(writer, r#"{{"status": "ok", "message": "Hello"}}"#);
    ///     })
    /// # });
    /// ```
    /// Using [`WriteBuffer`]:
    /// ```rust
    /// # dispatch_http::run_test(|_, resp| {
    /// use dispatch_http::StatusCode;
    ///
    /// resp.status(StatusCode::Ok)
    ///     .header("content-type", "application/octet-stream")
    ///     .body_with(|writer| {
    ///         writer.write(b"lib: ");
    ///         writer.write("dispatch_http");
    ///         writer.write(b", love_is_lib: ");
    ///         writer.write(true);
    ///         writer.write(b", just_number: ");
    ///         writer.write(123456);
    ///     })
    /// # });
    /// ```
    ///
    /// # Panics
    /// Error message: `Must be called after status() and any header methods`
    ///
    /// Panics in `debug` mode when:
    /// - Called before [`status()`](Response::status)
    /// - Called after [`body()`](Response::body) or [`body_with()`](Response::body_with)
    #[inline]
    #[track_caller]
    pub fn body_with<F: FnOnce(&mut BodyWriter)>(&mut self, f: F) -> Handled {
        debug_assert!(
            self.state == ResponseState::Headers,
            "Must be called after status() and any header methods"
        );

        self.start_body();
        f(&mut BodyWriter(&mut self.buffer));
        self.end_body()
    }

    /// Streams a file as the response body without buffering its contents.
    ///
    /// `content-length` is set from the file's metadata. For HEAD requests
    /// (`headers_only`), the length is still reported but no file bytes are
    /// read onto the wire.
    ///
    /// # Errors
    /// Returns the `io::Error` from opening the file or reading its metadata.
    ///
    /// # Panics
    /// Panics in `debug` mode under the same conditions as [`body()`](Response::body).
    #[inline]
    #[track_caller]
    pub async fn send_file(&mut self, path: impl AsRef<std::path::Path>) -> std::io::Result<Handled> {
        debug_assert!(
            self.state == ResponseState::Headers,
            "Must be called after status() and any header methods"
        );

        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len() as usize;

        self.start_body();
        if !self.headers_only {
            self.file_body = Some(file);
        }
        Ok(self.end_body_with_len(len))
    }

    /// Writes the response body as `Transfer-Encoding: chunked`, framing each
    /// call to the writer's [`write`](write::ChunkedWriter::write) as its own
    /// `<hex-length>\r\n<data>\r\n` chunk, followed by the zero-length
    /// terminator.
    ///
    /// For HEAD requests (`headers_only`) the closure does not run and only
    /// the terminator's framing overhead is skipped; no body bytes are sent.
    ///
    /// # Panics
    /// Panics in `debug` mode under the same conditions as [`body()`](Response::body).
    #[inline]
    #[track_caller]
    pub fn send_chunked<F: FnOnce(&mut write::ChunkedWriter)>(&mut self, f: F) -> Handled {
        debug_assert!(
            self.state == ResponseState::Headers,
            "Must be called after status() and any header methods"
        );

        if let Some(value) = self.connection_header() {
            self.header("connection", value);
        }
        self.buffer.extend_from_slice(b"transfer-encoding: chunked\r\n\r\n");
        self.start_body = self.buffer.len();

        if !self.headers_only {
            f(&mut write::ChunkedWriter(&mut self.buffer));
            self.buffer.extend_from_slice(b"0\r\n\r\n");
        }

        self.state = ResponseState::Complete;
        Handled(())
    }
}

impl Response {
    #[inline(always)]
    #[track_caller]
    fn start_body(&mut self) -> &mut Self {
        if let Some(value) = self.connection_header() {
            self.header("connection", value);
        }

        self.buffer.extend_from_slice(b"content-length: ");
        self.posit_length = self.buffer.len();
        self.buffer.extend_from_slice(b"0000000000\r\n\r\n");
        self.start_body = self.buffer.len();
        self
    }

    #[inline(always)]
    fn end_body(&mut self) -> Handled {
        let body_len = self.buffer.len() - self.start_body;
        self.end_body_with_len(body_len)
    }

    // Patches in the real content-length and, for HEAD, drops the body bytes
    // that were already written - the length still reflects what a GET would
    // have sent.
    #[inline(always)]
    fn end_body_with_len(&mut self, body_len: usize) -> Handled {
        let (arr, _) = Response::number_to_bytes(body_len as u128);

        let target_range = self.posit_length..self.posit_length + 10;
        self.buffer[target_range].copy_from_slice(&arr[29..39]);

        if self.headers_only {
            self.buffer.truncate(self.start_body);
        }

        self.state = ResponseState::Complete;
        Handled(())
    }

    #[inline(always)]
    const fn connection_header(&self) -> Option<&'static [u8]> {
        match (self.version, self.keep_alive) {
            (Version::Http11, true) => None,
            (Version::Http11, false) => Some(b"close"),
            (Version::Http10, true) => Some(b"keep-alive"),
            (Version::Http10, false) => Some(b"close"),
        }
    }

    #[inline]
    const fn number_to_bytes(mut n: u128) -> ([u8; 39], usize) {
        let mut buffer = [b'0'; 39];
        let mut i = 39;

        if n == 0 {
            return (buffer, 38);
        }

        while n > 0 {
            i -= 1;
            buffer[i] = b'0' + (n % 10) as u8;
            n /= 10;
        }

        (buffer, i)
    }
}

pub mod write {
    use super::*;

    /// Writer for constructing the HTTP response body.
    /// Used in [body_with](Response::body_with).
    ///
    /// # Examples
    ///
    /// With [WriteBuffer]:
    /// ```
    /// # dispatch_http::run_test(|_, resp| {
    /// use dispatch_http::StatusCode;
    ///
    /// resp.status(StatusCode::Ok)
    ///     .body_with(|w| {
    ///         w.write("This goes in the response body");
    ///         w.write("<html>...</html>");
    ///         w.write(true);
    ///     })
    /// # });
    /// ```
    /// With [std::io::Write]:
    /// ```
    /// # dispatch_http::run_test(|_, resp| {
    /// use dispatch_http::StatusCode;
    /// use std::io::Write;
    ///
    /// resp.status(StatusCode::Ok)
    ///     .body_with(|w| {
    ///         write!(w, "This goes in the response body");
    ///         write!(w, "{} - {} = {}", 6, 2, 4);
    ///     })
    /// # });
    /// ```
    #[derive(Debug)]
    pub struct BodyWriter<'a>(pub(crate) &'a mut Vec<u8>);

    impl BodyWriter<'_> {
        /// Appends content to the response body.
        ///
        /// Adds data to the body section of the HTTP response. This method
        /// only affects the response body, not headers or status.
        ///
        /// # Examples
        /// ```
        /// # dispatch_http::run_test(|_, resp| {
        /// use dispatch_http::StatusCode;
        ///
        /// resp.status(StatusCode::Ok)
        ///     .body_with(|w| {
        ///         w.write("Hello");
        ///         w.write(123);
        ///         w.write(true);
        ///     })
        /// # });
        /// ```
        #[inline]
        pub fn write<T: WriteBuffer>(&mut self, value: T) {
            value.write_to(self.0);
        }
    }

    /// Writer for a [`Response::send_chunked`] body. Each `write` call frames
    /// its argument as one complete HTTP chunk.
    #[derive(Debug)]
    pub struct ChunkedWriter<'a>(pub(crate) &'a mut Vec<u8>);

    impl ChunkedWriter<'_> {
        /// Appends one chunk containing `value`'s bytes.
        ///
        /// A zero-length value still writes a (useless) empty chunk; callers
        /// that want to skip empty writes should check beforehand.
        #[inline]
        pub fn write<T: WriteBuffer>(&mut self, value: T) {
            let header_at = self.0.len();
            self.0.extend_from_slice(b"00000000\r\n");
            let body_at = self.0.len();

            value.write_to(self.0);

            let chunk_len = self.0.len() - body_at;
            let hex = hex_bytes(chunk_len as u32);
            self.0[header_at..header_at + 8].copy_from_slice(&hex);
        }
    }

    #[inline]
    fn hex_bytes(mut n: u32) -> [u8; 8] {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        let mut out = [b'0'; 8];

        let mut i = 8;
        while n > 0 {
            i -= 1;
            out[i] = DIGITS[(n & 0xf) as usize];
            n >>= 4;
        }

        out
    }

    impl std::io::Write for BodyWriter<'_> {
        #[inline]
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        #[inline]
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Trait for writing data to the [`Response`] buffer.
    ///
    /// Implemented for common types like strings, bytes, booleans
    /// and numeric types (excluding floating-point numbers)
    ///
    /// # Note on Floating-Point
    /// Floating-point numbers are not implemented to avoid locale-dependent
    /// formatting and precision issues in protocol headers.
    ///
    /// For explicit float serialization, consider using the
    /// [`ryu`](https://crates.io/crates/ryu)
    /// crate or formatting to string with controlled precision.
    ///
    /// # Example
    /// ```
    /// use dispatch_http::WriteBuffer;
    ///
    /// struct MyString(String);
    ///
    /// impl WriteBuffer for MyString {
    ///     fn write_to(&self, buffer: &mut Vec<u8>) {
    ///         buffer.extend_from_slice(self.0.as_bytes())
    ///     }
    /// }
    /// ```
    pub trait WriteBuffer {
        /// Writes the value's representation directly to the buffer.
        ///
        /// This should avoid intermediate allocations and write the
        /// most efficient representation possible.
        fn write_to(&self, buffer: &mut Vec<u8>);
    }

    macro_rules! impl_write_buffer {
        (bytes, $conn:expr => $($t:ty),*) => {
            $(impl WriteBuffer for $t {
                #[inline] fn write_to(&self, buffer: &mut Vec<u8>) {
                    let closure = $conn;
                    closure(self, buffer);
                }
            })*
        };
        (number($type:ty), $conn:expr => $($t:ty),*) => {
            $(impl WriteBuffer for $t {
                #[inline] fn write_to(&self, buffer: &mut Vec<u8>) {
                    $conn(*self as $type, buffer);
                }
            })*
        };
        (non_zero($type:ty), $conn:expr => $($t:ident),*) => {
            $(impl WriteBuffer for std::num::$t {
                #[inline] fn write_to(&self, buffer: &mut Vec<u8>) {
                    $conn(self.get() as $type, buffer);
                }
            })*
        };
    }

    impl<T: WriteBuffer> WriteBuffer for &T {
        #[inline]
        fn write_to(&self, buffer: &mut Vec<u8>) {
            T::write_to(*self, buffer);
        }
    }
    impl<T: WriteBuffer> WriteBuffer for &mut T {
        #[inline]
        fn write_to(&self, buffer: &mut Vec<u8>) {
            T::write_to(*self, buffer);
        }
    }
    impl_write_buffer! {
        bytes, |value: &str, buffer: &mut Vec<u8>| {
            buffer.extend_from_slice(value.as_bytes());
        } => &str, String, Box<str>, Cow<'_, str>,
        Arc<str>, Rc<str>, Arc<String>, Rc<String>
    }
    impl_write_buffer! {
        bytes, |value: &[u8], buffer: &mut Vec<u8>| {
            buffer.extend_from_slice(value);
        } => &[u8], Vec<u8>, Box<[u8]>, Cow<'_, [u8]>,
        Arc<[u8]>, Rc<[u8]>, Arc<Vec<u8>>, Rc<Vec<u8>>
    }
    impl<const N: usize> WriteBuffer for [u8; N] {
        #[inline]
        fn write_to(&self, buffer: &mut Vec<u8>) {
            buffer.extend_from_slice(self);
        }
    }
    impl_write_buffer! {
        number(u128), impl_write_buffer_u128 => u8, u16, u32, u64, u128, usize
    }
    impl_write_buffer! {
        non_zero(u128), impl_write_buffer_u128 => NonZeroU8,
        NonZeroU16, NonZeroU32, NonZeroU64, NonZeroU128, NonZeroUsize
    }
    impl_write_buffer! {
        number(i128), impl_write_buffer_i128 => i8, i16, i32, i64, i128, isize
    }
    impl_write_buffer! {
        non_zero(i128), impl_write_buffer_i128 => NonZeroI8,
        NonZeroI16, NonZeroI32, NonZeroI64, NonZeroI128, NonZeroIsize
    }
    impl WriteBuffer for bool {
        #[inline]
        fn write_to(&self, buffer: &mut Vec<u8>) {
            buffer.extend_from_slice(match self {
                true => b"true",
                false => b"false",
            });
        }
    }
    impl WriteBuffer for char {
        #[inline]
        fn write_to(&self, buffer: &mut Vec<u8>) {
            let mut buf = [0u8; 4];
            buffer.extend_from_slice(self.encode_utf8(&mut buf).as_bytes());
        }
    }

    #[inline(always)]
    fn impl_write_buffer_u128(value: u128, buffer: &mut Vec<u8>) {
        let (arr, start) = Response::number_to_bytes(value);
        buffer.extend_from_slice(&arr[start..]);
    }

    #[inline(always)]
    fn impl_write_buffer_i128(value: i128, buffer: &mut Vec<u8>) {
        if value < 0 {
            buffer.push(b'-');
        }
        let abs = value.unsigned_abs();

        let (arr, start) = Response::number_to_bytes(abs);
        buffer.extend_from_slice(&arr[start..]);
    }
}
