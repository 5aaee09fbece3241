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

//! The `.adg` container writer.
//!
//! A preset on disk is a gzip stream whose decompressed content is exactly one
//! XML declaration line followed by the serialized master document. The
//! declaration is prepended by hand because the XML writer does not emit it in
//! the exact form Live expects.

use std::fs::{self, File};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::RackError;
use crate::template::RackDocument;

/// The declaration Live expects as the first line of a decompressed preset.
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// The preset file extension.
const PRESET_EXTENSION: &str = "adg";

/// Serializes and compresses the document to `<destination>/<stem>.adg`.
///
/// The uncompressed text is staged in a temp file that is removed when this
/// function returns, error paths included. No partial compressed file is left
/// behind on failure.
pub fn write_adg(
    document: &RackDocument,
    stem: &str,
    destination: &Path,
) -> Result<PathBuf, RackError> {
    let body = format!("{}{}", XML_DECLARATION, document.to_xml()?);

    // Stage the uncompressed document. Dropping the handle removes it.
    let mut staging = NamedTempFile::new()?;
    staging.write_all(body.as_bytes())?;
    staging.seek(SeekFrom::Start(0))?;
    debug!(
        staging = staging.path().display().to_string(),
        "Staged uncompressed preset"
    );

    let out_path = destination.join(format!("{}.{}", stem, PRESET_EXTENSION));
    let out_file = File::create(&out_path).map_err(|e| RackError::OutputWrite {
        path: out_path.clone(),
        source: e,
    })?;

    let mut encoder = GzEncoder::new(out_file, Compression::default());
    if let Err(e) = io::copy(&mut staging, &mut encoder).and_then(|_| encoder.finish()) {
        // Never leave a partial preset behind.
        let _ = fs::remove_file(&out_path);
        return Err(RackError::OutputWrite {
            path: out_path,
            source: e,
        });
    }

    info!(preset = out_path.display().to_string(), "Wrote preset");
    Ok(out_path)
}

#[cfg(test)]
mod test {
    use std::error::Error;
    use std::fs::File;
    use std::io::Read;
    use std::path::Path;

    use flate2::read::GzDecoder;

    use crate::error::RackError;
    use crate::template::{Fragment, RackDocument};

    use super::{write_adg, XML_DECLARATION};

    fn decompress(path: &Path) -> Result<String, Box<dyn Error>> {
        let mut decoder = GzDecoder::new(File::open(path)?);
        let mut content = String::new();
        decoder.read_to_string(&mut content)?;
        Ok(content)
    }

    #[test]
    fn test_round_trip_is_byte_exact() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let mut doc = RackDocument::new()?;
        let mut fragment = Fragment::drum_branch()?;
        fragment.set_root_attribute("Id", "92")?;
        doc.append(fragment);

        let out = write_adg(&doc, "test_rack", dir.path())?;
        assert_eq!(dir.path().join("test_rack.adg"), out);
        assert_eq!(
            format!("{}{}", XML_DECLARATION, doc.to_xml()?),
            decompress(&out)?
        );
        Ok(())
    }

    #[test]
    fn test_declaration_is_first_line() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let doc = RackDocument::new()?;

        let out = write_adg(&doc, "blank", dir.path())?;
        let content = decompress(&out)?;
        assert!(content.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Ableton "));
        Ok(())
    }

    #[test]
    fn test_unwritable_destination_fails() -> Result<(), Box<dyn Error>> {
        let doc = RackDocument::new()?;
        let result = write_adg(&doc, "nope", Path::new("/nonexistent/destination"));
        assert!(matches!(result, Err(RackError::OutputWrite { .. })));
        Ok(())
    }
}
