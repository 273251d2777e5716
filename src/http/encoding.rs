//! `Accept-Encoding` parsing and negotiation.

use crate::{errors::ErrorKind, http::types::CompressionType};

/// Bitmap of acceptable compression types, one bit per [`CompressionType`] variant.
///
/// Built from the `Accept-Encoding` request header; `identity` is implicitly
/// acceptable unless the header explicitly forbids it with `identity;q=0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct AcceptableEncodings(u8);

const IDENTITY_BIT: u8 = 1 << 0;
const DEFLATE_BIT: u8 = 1 << 1;
const GZIP_BIT: u8 = 1 << 2;
const BROTLI_BIT: u8 = 1 << 3;
const ZSTD_BIT: u8 = 1 << 4;

impl AcceptableEncodings {
    #[inline(always)]
    const fn bit_for(encoding: CompressionType) -> u8 {
        match encoding {
            CompressionType::Identity => IDENTITY_BIT,
            CompressionType::Deflate => DEFLATE_BIT,
            CompressionType::Gzip => GZIP_BIT,
            CompressionType::Brotli => BROTLI_BIT,
            CompressionType::Zstd => ZSTD_BIT,
        }
    }

    #[inline(always)]
    pub(crate) fn accepts(&self, encoding: CompressionType) -> bool {
        self.0 & Self::bit_for(encoding) != 0
    }

    /// Parses an `Accept-Encoding` header value into an acceptable-encodings bitmap.
    ///
    /// Each comma-separated token is `token[;q=value]`. A `q=0` token removes that
    /// encoding (or, for `*`, every encoding not named elsewhere) from the set.
    /// `identity` is implicitly present unless explicitly given `q=0`. No header at
    /// all (an empty `value`) means only `identity` is acceptable, per RFC 7231 §5.3.4.
    pub(crate) fn parse(value: &[u8]) -> Self {
        if value.is_empty() {
            return AcceptableEncodings(IDENTITY_BIT);
        }

        let mut set = 0u8;
        let mut star_seen = false;
        let mut star_forbidden = false;
        let mut identity_explicit = false;

        for token in value.split(|&b| b == b',') {
            let token = trim(token);
            if token.is_empty() {
                continue;
            }

            let mut parts = token.split(|&b| b == b';');
            let name = trim(parts.next().unwrap_or(b""));
            let forbidden = parts.any(|p| is_zero_q(trim(p)));

            match match_encoding_bit(name) {
                Some(bit) => {
                    if bit == IDENTITY_BIT {
                        identity_explicit = true;
                    }
                    if forbidden {
                        set &= !bit;
                    } else {
                        set |= bit;
                    }
                }
                None if name == b"*" => {
                    star_seen = true;
                    star_forbidden = forbidden;
                }
                None => {}
            }
        }

        if star_seen && !star_forbidden {
            set |= DEFLATE_BIT | GZIP_BIT | BROTLI_BIT | ZSTD_BIT;
        }

        // Identity is acceptable by default unless explicitly refused (`identity;q=0`)
        // or blanket-refused via `*;q=0` with no specific `identity` entry overriding it.
        if !identity_explicit {
            if star_seen && star_forbidden {
                set &= !IDENTITY_BIT;
            } else {
                set |= IDENTITY_BIT;
            }
        }

        AcceptableEncodings(set)
    }

    /// Picks the best encoding the client accepts out of `preferred` followed by
    /// `fallback`, in that priority order; when none of the caller's candidates are
    /// acceptable but `identity` is, falls back to `identity`; otherwise
    /// [`ErrorKind::NoAcceptableEncoding`].
    pub(crate) fn negotiate(
        &self,
        preferred: CompressionType,
        fallback: &[CompressionType],
    ) -> Result<CompressionType, ErrorKind> {
        if self.accepts(preferred) {
            return Ok(preferred);
        }

        for &candidate in fallback {
            if self.accepts(candidate) {
                return Ok(candidate);
            }
        }

        if self.accepts(CompressionType::Identity) {
            return Ok(CompressionType::Identity);
        }

        Err(ErrorKind::NoAcceptableEncoding)
    }
}

#[inline(always)]
fn match_encoding_bit(name: &[u8]) -> Option<u8> {
    match name {
        b"identity" => Some(IDENTITY_BIT),
        b"deflate" => Some(DEFLATE_BIT),
        b"gzip" | b"x-gzip" => Some(GZIP_BIT),
        b"br" => Some(BROTLI_BIT),
        b"zstd" => Some(ZSTD_BIT),
        _ => None,
    }
}

#[inline(always)]
fn is_zero_q(param: &[u8]) -> bool {
    let param = trim(param);
    param.starts_with(b"q=0") && !param.starts_with(b"q=0.") || param == b"q=0"
}

#[inline(always)]
fn trim(mut bytes: &[u8]) -> &[u8] {
    while let [first, rest @ ..] = bytes {
        if !first.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    while let [rest @ .., last] = bytes {
        if !last.is_ascii_whitespace() {
            break;
        }
        bytes = rest;
    }
    bytes
}
