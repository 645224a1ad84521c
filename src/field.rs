// Copyright 2026 `multipart-params` Crate Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Per-part header parsing.

use httparse::{Status, EMPTY_HEADER};
use log::debug;
use mime::Mime;
use std::str;

/// More than enough for `Content-Disposition`, `Content-Type` and the odd
/// transfer-encoding header a client might add.
const MAX_PART_HEADERS: usize = 8;

/// The headers that (may) appear before a part's content.
pub struct FieldHeaders {
    /// The `Content-Disposition` header, required.
    pub cont_disp: ContentDisp,
    /// The part's own `Content-Type`, if declared and parseable.
    pub cont_type: Option<Mime>,
}

/// The `Content-Disposition` header of one part.
pub struct ContentDisp {
    /// The logical field name being uploaded under.
    pub field_name: String,
    /// The original filename, present only for file parts.
    pub filename: Option<String>,
}

/// Split a raw part into its parsed headers and its body slice.
///
/// Returns `None` when the part cannot contribute to either output tree:
/// no blank line, unparseable headers, no `Content-Disposition`, or a
/// disposition without a `name` attribute. Skipping a part is never fatal
/// to the surrounding parse.
pub fn parse_part(part: &[u8]) -> Option<(FieldHeaders, &[u8])> {
    let mut raw = [EMPTY_HEADER; MAX_PART_HEADERS];

    let (consumed, headers) = match httparse::parse_headers(part, &mut raw) {
        Ok(Status::Complete(done)) => done,
        Ok(Status::Partial) => {
            debug!("part has no blank line after its headers; skipping");
            return None;
        }
        Err(err) => {
            debug!("malformed part headers ({}); skipping", err);
            return None;
        }
    };

    let cont_disp = ContentDisp::read_from(headers)?;

    let cont_type = find_header(headers, "Content-Type")
        .and_then(|value| str::from_utf8(value).ok())
        .and_then(|value| value.trim().parse::<Mime>().ok());

    Some((FieldHeaders { cont_disp, cont_type }, &part[consumed..]))
}

impl ContentDisp {
    fn read_from(headers: &[httparse::Header<'_>]) -> Option<ContentDisp> {
        let value = find_header(headers, "Content-Disposition")?;
        let value = str::from_utf8(value).ok()?;

        let mut field_name = None;
        let mut filename = None;

        // The first `;`-segment is the disposition type; the rest are
        // `attr=value` pairs with optional quoting.
        for attr in value.split(';').skip(1) {
            let (attr_name, attr_value) = match attr.split_once('=') {
                Some(pair) => pair,
                None => continue,
            };
            let attr_value = trim_quotes(attr_value.trim());

            let attr_name = attr_name.trim();
            if attr_name.eq_ignore_ascii_case("name") {
                field_name = Some(attr_value.to_owned());
            } else if attr_name.eq_ignore_ascii_case("filename") {
                filename = Some(attr_value.to_owned());
            }
        }

        match field_name {
            Some(field_name) => Some(ContentDisp { field_name, filename }),
            None => {
                debug!("part disposition carries no name attribute; skipping");
                None
            }
        }
    }
}

fn find_header<'a>(headers: &[httparse::Header<'a>], name: &str) -> Option<&'a [u8]> {
    headers
        .iter()
        .find(|header| header.name.eq_ignore_ascii_case(name))
        .map(|header| header.value)
}

fn trim_quotes(s: &str) -> &str {
    s.trim_matches('"')
}

#[cfg(test)]
mod test {
    use super::parse_part;

    #[test]
    fn text_part() {
        let part = b"Content-Disposition: form-data; name=\"title\"\r\n\r\ntest-title";
        let (headers, body) = parse_part(part).unwrap();

        assert_eq!(headers.cont_disp.field_name, "title");
        assert_eq!(headers.cont_disp.filename, None);
        assert!(headers.cont_type.is_none());
        assert_eq!(body, b"test-title");
    }

    #[test]
    fn file_part_with_bare_lf_headers() {
        let part = b"Content-Disposition: form-data; name=\"someFile\"; filename=\"some-file.txt\"\nContent-Type: text/plain\r\n\r\nsome file content";
        let (headers, body) = parse_part(part).unwrap();

        assert_eq!(headers.cont_disp.field_name, "someFile");
        assert_eq!(headers.cont_disp.filename.as_deref(), Some("some-file.txt"));
        assert_eq!(headers.cont_type, Some(mime::TEXT_PLAIN));
        assert_eq!(body, b"some file content");
    }

    #[test]
    fn unquoted_attributes() {
        let part = b"Content-Disposition: form-data; name=plain\r\n\r\nvalue";
        let (headers, _) = parse_part(part).unwrap();
        assert_eq!(headers.cont_disp.field_name, "plain");
    }

    #[test]
    fn missing_name_is_skipped() {
        let part = b"Content-Disposition: form-data; filename=\"f.txt\"\r\n\r\ndata";
        assert!(parse_part(part).is_none());
    }

    #[test]
    fn missing_disposition_is_skipped() {
        let part = b"Content-Type: text/plain\r\n\r\ndata";
        assert!(parse_part(part).is_none());
    }

    #[test]
    fn empty_part_is_skipped() {
        assert!(parse_part(b"").is_none());
    }

    #[test]
    fn body_keeps_internal_line_breaks() {
        let part = b"Content-Disposition: form-data; name=\"multi\"\r\n\r\nline one\r\nline two";
        let (_, body) = parse_part(part).unwrap();
        assert_eq!(body, b"line one\r\nline two");
    }

    #[test]
    fn unparseable_content_type_is_dropped() {
        let part = b"Content-Disposition: form-data; name=\"f\"; filename=\"x\"\r\nContent-Type: not a mime\r\n\r\nd";
        let (headers, _) = parse_part(part).unwrap();
        assert!(headers.cont_type.is_none());
    }
}
