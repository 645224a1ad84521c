// Copyright 2026 `multipart-params` Crate Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Boundary extraction and delimiter-based part splitting.
//!
//! The boundary token comes from the request's `Content-Type` header; the
//! body is then cut at every `--{boundary}` delimiter line. Producers vary
//! in line-ending discipline, so a bare `\n` is accepted wherever `\r\n`
//! is expected.

use log::debug;

/// Pull the boundary token out of a `Content-Type` header value.
///
/// Returns `None` unless the media type is `multipart/form-data` and a
/// non-empty `boundary` parameter is present. The token may be quoted;
/// any other parameters are ignored. `None` means "nothing to parse",
/// not an error.
pub fn extract(content_type: &str) -> Option<String> {
    let mut sections = content_type.split(';');
    let media_type = sections.next()?.trim();
    if !media_type.eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }

    for param in sections {
        if let Some((attr, value)) = param.split_once('=') {
            if attr.trim().eq_ignore_ascii_case("boundary") {
                let token = value.trim().trim_matches('"');
                if !token.is_empty() {
                    return Some(token.to_owned());
                }
            }
        }
    }

    None
}

/// Iterate the raw parts of `body`, delimited by `--{boundary}` lines.
///
/// The preamble before the first delimiter and the epilogue after the
/// closing `--{boundary}--` are discarded, as is anything after the last
/// delimiter when the closing one is missing. Each yielded slice still
/// contains the part's header block and requires [`crate::field::parse_part`].
pub fn parts<'a>(body: &'a [u8], boundary: &str) -> Parts<'a> {
    let delim = format!("--{}", boundary).into_bytes();

    match twoway::find_bytes(body, &delim) {
        Some(idx) => {
            let (rest, done) = after_delimiter(&body[idx + delim.len()..]);
            Parts { rest, delim, done }
        }
        None => {
            debug!("no {:?} delimiter found in body", boundary);
            Parts { rest: &[], delim, done: true }
        }
    }
}

/// Iterator over the raw part slices of one multipart body.
pub struct Parts<'a> {
    rest: &'a [u8],
    delim: Vec<u8>,
    done: bool,
}

impl<'a> Iterator for Parts<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.done {
            return None;
        }

        match twoway::find_bytes(self.rest, &self.delim) {
            Some(idx) => {
                let part = trim_trailing_newline(&self.rest[..idx]);
                let (rest, done) = after_delimiter(&self.rest[idx + self.delim.len()..]);
                self.rest = rest;
                self.done = done;
                Some(part)
            }
            None => {
                // No closing delimiter: the trailing segment is dropped.
                debug!("multipart body ended without closing delimiter");
                self.done = true;
                None
            }
        }
    }
}

/// Position `after` (the bytes following a delimiter) at the start of the
/// next part, detecting the `--` terminator.
fn after_delimiter(after: &[u8]) -> (&[u8], bool) {
    if after.starts_with(b"--") {
        return (&[], true);
    }

    let rest = after
        .strip_prefix(b"\r\n")
        .or_else(|| after.strip_prefix(b"\n"))
        .unwrap_or(after);

    (rest, false)
}

fn trim_trailing_newline(part: &[u8]) -> &[u8] {
    part.strip_suffix(b"\r\n")
        .or_else(|| part.strip_suffix(b"\n"))
        .unwrap_or(part)
}
