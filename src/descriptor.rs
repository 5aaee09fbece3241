// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Sample descriptors.
//!
//! A [SampleDescriptor] carries every per-sample field the pad-zone template
//! needs, derived from one catalog row. The path transformations mirror how
//! Live references files under a user's library folder and have to be
//! reproduced exactly, literal escape sequences included.

use std::fs;
use std::path::PathBuf;

use tracing::warn;

use crate::catalog::CatalogRow;
use crate::error::RackError;
use crate::probe;

/// The per-sample fields embedded into a pad zone. Immutable once built.
#[derive(Clone, Debug)]
pub struct SampleDescriptor {
    /// The sample's file name without its extension.
    pub display_name: String,
    /// An upward relative path used for document portability.
    pub relative_path: String,
    /// The absolute host path, with spaces percent-escaped.
    pub absolute_path: String,
    /// The `userfolder:` locator used by Live's browser.
    pub browser_uri: String,
    /// The duration of the sample in frames. Zero when unknown.
    pub duration_frames: u64,
    /// The size of the sample file in bytes, read at assembly time.
    pub file_size: u64,
}

impl SampleDescriptor {
    /// Builds a descriptor for the given catalog row.
    ///
    /// The file size is always read from the live filesystem so a stale
    /// catalog cannot produce a stale size. A missing file aborts the whole
    /// assembly; a failed duration probe only degrades the duration to zero.
    pub fn from_row(row: &CatalogRow) -> Result<SampleDescriptor, RackError> {
        let path = PathBuf::from(&row.full_file_path);
        if !path.exists() {
            return Err(RackError::MissingFile(path));
        }

        let duration_frames = match row.frames {
            Some(frames) => frames,
            None => match probe::frame_count(&path) {
                Ok(frames) => frames,
                Err(e) => {
                    warn!(
                        err = e.to_string(),
                        sample = row.sample_name,
                        "Unable to probe sample duration, defaulting to 0"
                    );
                    0
                }
            },
        };
        let file_size = fs::metadata(&path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => RackError::MissingFile(path.clone()),
                _ => RackError::Io(e),
            })?
            .len();

        Ok(SampleDescriptor {
            display_name: display_name(&row.sample_name),
            relative_path: relative_path(&row.full_file_path),
            absolute_path: row.full_file_path.replace(' ', "%20"),
            browser_uri: browser_uri(&row.full_file_path)?,
            duration_frames,
            file_size,
        })
    }
}

/// The file name without its extension.
fn display_name(sample_name: &str) -> String {
    sample_name
        .split('.')
        .next()
        .unwrap_or(sample_name)
        .to_string()
}

/// Derives the upward relative path: three levels up, with the drive letter
/// and separator prefix stripped. The fixed three-character prefix length is a
/// documented limitation of the format convention, not something to fix here.
fn relative_path(full_path: &str) -> String {
    format!("../../../{}", full_path.get(3..).unwrap_or_default())
}

/// Builds the `userfolder:` browser locator for the given path.
///
/// The path (spaces already escaped) is split on backslashes; the first two
/// segments are re-joined with literal `%5C` escapes, the third is prefixed
/// with `#`, and the remainder is colon-joined.
fn browser_uri(full_path: &str) -> Result<String, RackError> {
    let escaped = full_path.replace(' ', "%20");
    let segments: Vec<&str> = escaped.split('\\').collect();
    if segments.len() < 4 {
        return Err(RackError::InvalidConfiguration(format!(
            "sample path '{}' is too shallow to reference from the browser",
            full_path
        )));
    }
    Ok(format!(
        "userfolder:{}%5C{}%5C#{}:{}",
        segments[0],
        segments[1],
        segments[2],
        segments[3..].join(":")
    ))
}
