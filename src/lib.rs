// Copyright 2026 `multipart-params` Crate Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Decoding `multipart/form-data` request bodies into nested form
//! parameters and uploaded files.
//!
//! Most request-handling stacks decode multipart bodies natively for POST
//! only, leaving PUT, PATCH and DELETE with raw bytes. This crate parses
//! such an already-buffered body, given the request's `Content-Type`
//! header for the boundary, and reconstructs what the native decoder
//! would have produced: a tree of text parameters built from bracketed
//! field names (`Item[name]`, `Item[files][]`) and a matching tree of
//! file descriptors materialized to temporary storage.
//!
//! ```
//! use multipart_params::{FormData, MultipartParser};
//!
//! let body = b"--X\r\nContent-Disposition: form-data; name=\"Item[name]\"\r\n\r\ntest-name\r\n--X--";
//!
//! let mut form = FormData::default();
//! MultipartParser::new()
//!     .parse(body, Some("multipart/form-data; boundary=X"), &mut form)
//!     .unwrap();
//!
//! let item = form.params.get("Item").unwrap().as_map().unwrap();
//! assert_eq!(item.get("name").unwrap().as_value().unwrap(), "test-name");
//! ```
//!
//! Malformed input never fails the parse: an unusable boundary means
//! "nothing to parse", and individual broken parts are skipped. The only
//! hard error is an I/O failure while writing a file part to temporary
//! storage.

use log::debug;

pub mod boundary;
pub mod field;
pub mod params;
pub mod save;

pub use params::{field_path, Node, NodeMap, Params};
pub use save::{UploadError, UploadMap, UploadedFile};

use save::FileCollector;
use std::io;

/// The decoded outputs of one request body.
///
/// One instance belongs to one logical request; the two trees are the
/// request-scoped stand-in for what a native decoder would publish
/// process-wide. Concurrent requests must each get their own instance.
#[derive(Debug, Default)]
pub struct FormData {
    /// Text field values, nested per bracket notation.
    pub params: Params,
    /// File descriptors, mirroring the structure of `params`.
    pub files: UploadMap,
}

impl FormData {
    pub fn new() -> FormData {
        FormData::default()
    }

    /// Whether a decoder (native or this crate) has already populated
    /// either tree.
    pub fn is_decoded(&self) -> bool {
        !self.params.is_empty() || !self.files.is_empty()
    }
}

/// Parses multipart bodies into a [`FormData`].
///
/// Limits are unlimited by default; setters accept `Into<Option<_>>`, so
/// passing `None` clears a limit.
pub struct MultipartParser {
    size_limit: Option<u64>,
    count_limit: Option<u32>,
    force: bool,
}

impl Default for MultipartParser {
    fn default() -> MultipartParser {
        MultipartParser::new()
    }
}

impl MultipartParser {
    pub fn new() -> MultipartParser {
        MultipartParser { size_limit: None, count_limit: None, force: false }
    }

    /// Set the maximum number of bytes accepted *per file part*. Larger
    /// parts are recorded with [`UploadError::SizeExceeded`] and no file
    /// is written.
    pub fn size_limit<L: Into<Option<u64>>>(&mut self, limit: L) -> &mut Self {
        self.size_limit = limit.into();
        self
    }

    /// Set the maximum number of file parts kept per request. Parts past
    /// the limit are dropped as if they had not been sent.
    pub fn count_limit<L: Into<Option<u32>>>(&mut self, limit: L) -> &mut Self {
        self.count_limit = limit.into();
        self
    }

    /// When `true`, discard whatever `FormData` already holds and re-parse
    /// the raw body unconditionally. Defaults to `false`, which preserves
    /// output already produced by a native decoder.
    pub fn force(&mut self, force: bool) -> &mut Self {
        self.force = force;
        self
    }

    /// Decode `raw_body` into `form`.
    ///
    /// The call is a no-op when `form` is already populated (unless
    /// forced) or when `content_type` yields no multipart boundary. Parts
    /// are processed strictly in body order; a part carrying a `filename`
    /// feeds `form.files`, any other named part feeds `form.params`, and
    /// a given field name therefore lands in exactly one of the two.
    pub fn parse(
        &self,
        raw_body: &[u8],
        content_type: Option<&str>,
        form: &mut FormData,
    ) -> io::Result<()> {
        if self.force {
            form.params.clear();
            form.files.clear();
        } else if form.is_decoded() {
            debug!("form data already decoded; leaving it untouched");
            return Ok(());
        }

        let boundary = match content_type.and_then(boundary::extract) {
            Some(boundary) => boundary,
            None => return Ok(()),
        };
        debug!("parsing multipart body with boundary {:?}", boundary);

        let mut collector = FileCollector::new(self.size_limit, self.count_limit);

        for part in boundary::parts(raw_body, &boundary) {
            let (headers, body) = match field::parse_part(part) {
                Some(parsed) => parsed,
                None => continue,
            };

            let field::ContentDisp { field_name, filename } = headers.cont_disp;
            let path = params::field_path(&field_name);

            match filename {
                Some(filename) => {
                    collector.register(&mut form.files, &path, filename, headers.cont_type, body)?;
                }
                None => {
                    let value = String::from_utf8_lossy(body).into_owned();
                    form.params.assign(&path, value);
                }
            }
        }

        Ok(())
    }
}
