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

//! The sample catalog.
//!
//! A catalog is a point-in-time snapshot of candidate sample files: the full
//! path, the file name, and (once probed) the frame count and length of each.
//! It is persisted as a YAML file, built by scanning a sample directory, and
//! queried with a [Filter]. The assembly engine only ever reads it.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::RackError;
use crate::probe;

/// The default catalog file name, placed in the user's home directory.
const DEFAULT_CATALOG_FILE: &str = "ableton_samples.yaml";

/// One candidate sample.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CatalogRow {
    /// The absolute path to the sample file, as the host sees it.
    pub full_file_path: String,
    /// The file name of the sample, extension included.
    pub sample_name: String,
    /// The frame count, if known.
    pub frames: Option<u64>,
    /// The length in seconds, if known.
    pub length: Option<f64>,
    /// Whether the sample decoded successfully. None means "not yet probed".
    pub supported: Option<bool>,
}

/// A filter over catalog rows. The default filter keeps every row that has not
/// been marked unsupported.
#[derive(Clone, Debug, Default)]
pub struct Filter {
    /// Case-insensitive substring match against the sample name.
    pub name_contains: Option<String>,
    /// Case-insensitive substring match against the full file path.
    pub path_contains: Option<String>,
    /// Include rows that failed a previous probe.
    pub include_unsupported: bool,
}

impl Filter {
    fn matches(&self, row: &CatalogRow) -> bool {
        if !self.include_unsupported && row.supported == Some(false) {
            return false;
        }
        if let Some(name) = &self.name_contains {
            if !row
                .sample_name
                .to_lowercase()
                .contains(&name.to_lowercase())
            {
                return false;
            }
        }
        if let Some(path) = &self.path_contains {
            if !row
                .full_file_path
                .to_lowercase()
                .contains(&path.to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

/// A catalog of candidate samples.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Catalog {
    rows: Vec<CatalogRow>,
}

impl Catalog {
    /// The default catalog location: `ableton_samples.yaml` in the home directory.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_CATALOG_FILE)
    }

    /// Builds a catalog by recursively scanning the given directory for WAV
    /// files. Dotfiles are skipped. Frames and length are left unknown; use
    /// [Catalog::update_details] to fill them in.
    pub fn scan(path: &Path) -> Result<Catalog, RackError> {
        let mut rows = Vec::new();
        scan_dir(path, &mut rows)?;
        info!(
            path = path.display().to_string(),
            samples = rows.len(),
            "Scanned sample directory"
        );
        Ok(Catalog { rows })
    }

    /// Loads a catalog from a YAML file.
    pub fn load(file: &Path) -> Result<Catalog, RackError> {
        Ok(serde_yml::from_str(&fs::read_to_string(file)?)?)
    }

    /// Serializes the catalog to a YAML file.
    pub fn save(&self, file: &Path) -> Result<(), RackError> {
        fs::write(file, serde_yml::to_string(self)?)?;
        Ok(())
    }

    /// Returns the rows matching the filter as a new snapshot. An empty result
    /// is an error, not an empty catalog.
    pub fn query(&self, filter: &Filter) -> Result<Catalog, RackError> {
        let rows: Vec<CatalogRow> = self
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        if rows.is_empty() {
            return Err(RackError::NoSamplesFound);
        }
        Ok(Catalog { rows })
    }

    /// Probes every row that is missing frame information and records the
    /// result. Rows that fail to decode are marked unsupported so later
    /// queries can exclude them.
    pub fn update_details(&mut self) {
        for row in self.rows.iter_mut().filter(|row| row.frames.is_none()) {
            match probe::characteristics(&row.full_file_path) {
                Ok(probed) => {
                    debug!(
                        sample = row.sample_name,
                        frames = probed.frames,
                        "Probed sample"
                    );
                    row.frames = Some(probed.frames);
                    row.length = Some(probed.length);
                    row.supported = Some(true);
                }
                Err(e) => {
                    warn!(err = e.to_string(), sample = row.sample_name, "Unable to probe sample");
                    row.supported = Some(false);
                }
            }
        }
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&CatalogRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<CatalogRow> for Catalog {
    fn from_iter<T: IntoIterator<Item = CatalogRow>>(iter: T) -> Catalog {
        Catalog {
            rows: iter.into_iter().collect(),
        }
    }
}

fn scan_dir(path: &Path, rows: &mut Vec<CatalogRow>) -> Result<(), RackError> {
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            scan_dir(&path, rows)?;
            continue;
        }

        let name = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if name.starts_with('.') || !name.to_lowercase().ends_with(".wav") {
            continue;
        }

        rows.push(CatalogRow {
            full_file_path: path.display().to_string(),
            sample_name: name.to_string(),
            frames: None,
            length: None,
            supported: None,
        });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::error::Error;
    use std::fs;

    use crate::error::RackError;
    use crate::testutil;

    use super::{Catalog, Filter};

    #[test]
    fn test_scan_finds_only_wav_files() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        testutil::write_wav(&dir.path().join("kick.wav"), 100)?;
        fs::create_dir(dir.path().join("snares"))?;
        testutil::write_wav(&dir.path().join("snares").join("snare.wav"), 100)?;
        fs::write(dir.path().join(".hidden.wav"), b"")?;
        fs::write(dir.path().join("notes.txt"), b"")?;

        let catalog = Catalog::scan(dir.path())?;
        let mut names: Vec<&str> = catalog
            .rows()
            .iter()
            .map(|row| row.sample_name.as_str())
            .collect();
        names.sort();
        assert_eq!(vec!["kick.wav", "snare.wav"], names);
        Ok(())
    }

    #[test]
    fn test_save_and_load_round_trip() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let catalog: Catalog = vec![testutil::row("C:\\Samples\\Drums\\kick.wav", Some(44100))]
            .into_iter()
            .collect();

        let file = dir.path().join("catalog.yaml");
        catalog.save(&file)?;
        let loaded = Catalog::load(&file)?;

        assert_eq!(1, loaded.len());
        assert_eq!("kick.wav", loaded.rows()[0].sample_name);
        assert_eq!(Some(44100), loaded.rows()[0].frames);
        Ok(())
    }

    #[test]
    fn test_query_filters_by_name() -> Result<(), Box<dyn Error>> {
        let catalog: Catalog = vec![
            testutil::row("C:\\Samples\\Drums\\Big Kick.wav", None),
            testutil::row("C:\\Samples\\Drums\\snare.wav", None),
        ]
        .into_iter()
        .collect();

        let result = catalog.query(&Filter {
            name_contains: Some("kick".to_string()),
            ..Filter::default()
        })?;
        assert_eq!(1, result.len());
        assert_eq!("Big Kick.wav", result.rows()[0].sample_name);
        Ok(())
    }

    #[test]
    fn test_query_excludes_unsupported_by_default() -> Result<(), Box<dyn Error>> {
        let mut unsupported = testutil::row("C:\\Samples\\Drums\\broken.wav", None);
        unsupported.supported = Some(false);
        let catalog: Catalog = vec![
            testutil::row("C:\\Samples\\Drums\\kick.wav", None),
            unsupported,
        ]
        .into_iter()
        .collect();

        let result = catalog.query(&Filter::default())?;
        assert_eq!(1, result.len());

        let all = catalog.query(&Filter {
            include_unsupported: true,
            ..Filter::default()
        })?;
        assert_eq!(2, all.len());
        Ok(())
    }

    #[test]
    fn test_empty_query_is_an_error() {
        let catalog: Catalog = vec![testutil::row("C:\\Samples\\Drums\\kick.wav", None)]
            .into_iter()
            .collect();

        let result = catalog.query(&Filter {
            name_contains: Some("nonexistent".to_string()),
            ..Filter::default()
        });
        assert!(matches!(result, Err(RackError::NoSamplesFound)));
    }

    #[test]
    fn test_update_details_marks_unsupported() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let good = dir.path().join("kick.wav");
        let bad = dir.path().join("broken.wav");
        testutil::write_wav(&good, 44100)?;
        fs::write(&bad, b"not really a wav")?;

        let mut catalog = Catalog::scan(dir.path())?;
        catalog.update_details();

        for row in catalog.rows() {
            if row.sample_name == "kick.wav" {
                assert_eq!(Some(44100), row.frames);
                assert_eq!(Some(true), row.supported);
            } else {
                assert_eq!(None, row.frames);
                assert_eq!(Some(false), row.supported);
            }
        }
        Ok(())
    }
}
