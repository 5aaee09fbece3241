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

//! Test helpers: WAV fixtures and canned catalogs.

use std::{error::Error, path::Path};

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::catalog::{Catalog, CatalogRow};

/// Writes a mono 16-bit 44.1kHz WAV file with the given number of frames.
pub fn write_wav(path: &Path, frames: u32) -> Result<(), Box<dyn Error>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for i in 0..frames {
        // A quiet ramp; the content doesn't matter, the frame count does.
        writer.write_sample((i % 128) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

/// A catalog row for the given Windows-style path, with unknown length and
/// support status.
pub fn row(full_file_path: &str, frames: Option<u64>) -> CatalogRow {
    let sample_name = full_file_path
        .rsplit('\\')
        .next()
        .unwrap_or(full_file_path)
        .to_string();
    CatalogRow {
        full_file_path: full_file_path.to_string(),
        sample_name,
        frames,
        length: None,
        supported: None,
    }
}

/// Builds a catalog of real on-disk WAV files inside `dir`.
///
/// Each file is written under a backslash-bearing name such as
/// `C:\Users\me\kick.wav` (a single path component on unix), so descriptors
/// built from the rows produce well-formed browser URIs while still pointing
/// at readable files.
pub fn wav_catalog(dir: &Path, names: &[&str]) -> Result<Catalog, Box<dyn Error>> {
    let mut rows = Vec::new();
    for name in names {
        let full_path = dir.join(format!("C:\\Users\\me\\{}", name));
        write_wav(&full_path, 44100)?;
        rows.push(CatalogRow {
            full_file_path: full_path.display().to_string(),
            sample_name: name.to_string(),
            frames: Some(44100),
            length: None,
            supported: None,
        });
    }
    Ok(rows.into_iter().collect())
}
