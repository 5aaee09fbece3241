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
use std::path::PathBuf;

/// Errors produced while assembling a drum rack preset.
#[derive(Debug, thiserror::Error)]
pub enum RackError {
    /// The requested slot or pad counts cannot be satisfied. Raised before any
    /// catalog or filesystem access.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A catalog query returned no rows. An empty candidate set is an error,
    /// never a silently empty preset.
    #[error("no samples found for query")]
    NoSamplesFound,

    /// A selected sample's file vanished between selection and the size probe.
    #[error("sample file is missing: {0}")]
    MissingFile(PathBuf),

    /// A field lookup into a shipped template matched nothing. The templates
    /// are fixed assets, so this is fatal rather than recoverable.
    #[error("drum rack template is corrupt: no element matched {0}")]
    TemplateCorruption(String),

    /// The destination for the compressed preset could not be written.
    #[error("unable to write preset {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("catalog error: {0}")]
    Catalog(#[from] serde_yml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
