// Copyright 2026 `multipart-params` Crate Developers
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Materializing file parts to temporary storage under count/size limits.

use log::debug;
use mime::Mime;
use std::io;
use std::io::Write;
use std::path::PathBuf;

use crate::params::NodeMap;

/// Why a file part was or was not materialized.
///
/// A part past the file-count limit is dropped without any entry at all,
/// so no variant describes it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadError {
    /// The file was written to temporary storage.
    Ok,
    /// The part's content exceeded the per-file size limit; nothing was
    /// written and [`UploadedFile::path`] is `None`.
    SizeExceeded,
}

/// One decoded file part.
///
/// The temporary file behind [`path`](UploadedFile::path) is persisted on
/// disk; deleting or relocating it is the caller's responsibility.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadedFile {
    /// The original filename sent by the client. Untrustworthy: do not use
    /// it to build filesystem paths.
    pub filename: String,
    /// The media type declared by the part, or one guessed from the
    /// filename's extension, falling back to `application/octet-stream`.
    pub content_type: Mime,
    /// Where the content was written, when `error` is [`UploadError::Ok`].
    pub path: Option<PathBuf>,
    /// The content length in bytes, recorded even when over the limit.
    pub size: u64,
    /// The outcome of materializing this part.
    pub error: UploadError,
}

/// The decoded file parts of a request body, mirroring the shape of the
/// text-parameter tree.
pub type UploadMap = NodeMap<UploadedFile>;

/// Applies the upload limits and writes accepted file parts out, one parse
/// invocation at a time.
///
/// The running file count lives here rather than on the parser so that
/// concurrent requests, each with their own parse call, cannot interfere.
pub struct FileCollector {
    size_limit: Option<u64>,
    count_limit: Option<u32>,
    count: u32,
}

impl FileCollector {
    pub fn new(size_limit: Option<u64>, count_limit: Option<u32>) -> FileCollector {
        FileCollector { size_limit, count_limit, count: 0 }
    }

    /// Record one file part under `path` in `files`.
    ///
    /// Past the count limit the part vanishes silently, as if it had never
    /// been in the request. Past the size limit an entry is still recorded
    /// (and still counts toward the count limit) but no file is written.
    /// An I/O failure while writing is the only hard error.
    pub fn register(
        &mut self,
        files: &mut UploadMap,
        path: &[&str],
        filename: String,
        declared: Option<Mime>,
        body: &[u8],
    ) -> io::Result<()> {
        if let Some(limit) = self.count_limit {
            if self.count >= limit {
                debug!("dropping file part {:?}: count limit {} reached", filename, limit);
                return Ok(());
            }
        }
        self.count += 1;

        let content_type = declared
            .unwrap_or_else(|| mime_guess::from_path(&filename).first_or_octet_stream());
        let size = body.len() as u64;

        if let Some(limit) = self.size_limit {
            if size > limit {
                debug!("file part {:?} is {} bytes, over the {} byte limit", filename, size, limit);
                files.assign(
                    path,
                    UploadedFile {
                        filename,
                        content_type,
                        path: None,
                        size,
                        error: UploadError::SizeExceeded,
                    },
                );
                return Ok(());
            }
        }

        let temp_path = write_temp(body)?;
        files.assign(
            path,
            UploadedFile {
                filename,
                content_type,
                path: Some(temp_path),
                size,
                error: UploadError::Ok,
            },
        );
        Ok(())
    }
}

/// Write `body` verbatim to a fresh temporary file and persist it, handing
/// its lifetime over to the caller.
fn write_temp(body: &[u8]) -> io::Result<PathBuf> {
    let mut file = tempfile::Builder::new().prefix("multipart-params-").tempfile()?;
    file.write_all(body)?;
    let (_, path) = file.keep().map_err(|err| err.error)?;
    Ok(path)
}
