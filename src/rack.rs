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

//! Drum rack assembly.
//!
//! Ties the pieces together: validate the configuration, select samples,
//! build descriptors, populate one pad-zone fragment per sample, and write
//! the compressed preset. Strictly sequential, one pad at a time, in
//! selection order.

use std::path::PathBuf;

use rand::Rng;
use tracing::{debug, info};

use crate::adg;
use crate::catalog::Catalog;
use crate::descriptor::SampleDescriptor;
use crate::error::RackError;
use crate::select::{self, Pick, RoleMap, DEFAULT_LAYOUT_TOP_PAD, MAX_PADS};
use crate::template::{Fragment, RackDocument};

/// The default file stem for uniform racks.
const DEFAULT_STEM: &str = "rust_drum_rack";

/// The default file stem for default-layout racks.
const DEFAULT_LAYOUT_STEM: &str = "rust_drum_rack_def";

/// Options for rack assembly.
#[derive(Clone, Debug)]
pub struct RackOptions {
    /// The number of pads to fill.
    pub slots: usize,
    /// The top pad; pad IDs count down from here. Also the slot cap.
    pub pads: u32,
    /// When set, every pad joins choke group 1 so pads cut each other off.
    /// When unset, every pad gets its own group.
    pub choke: bool,
    /// Randomize the pitch offset of each pad.
    pub random_transpose: bool,
    /// The output file stem.
    pub name: Option<String>,
    /// The output directory. Defaults to the user's home directory.
    pub save_path: Option<PathBuf>,
}

impl Default for RackOptions {
    fn default() -> RackOptions {
        RackOptions {
            slots: 16,
            pads: MAX_PADS,
            choke: false,
            random_transpose: false,
            name: None,
            save_path: None,
        }
    }
}

impl RackOptions {
    fn save_path(&self) -> PathBuf {
        self.save_path.clone().unwrap_or_else(|| {
            dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
        })
    }

    fn validate(&self) -> Result<(), RackError> {
        if self.pads > MAX_PADS {
            return Err(RackError::InvalidConfiguration(format!(
                "max pad number is {}",
                MAX_PADS
            )));
        }
        if self.slots as u32 > self.pads {
            return Err(RackError::InvalidConfiguration(format!(
                "not enough slots: max slots for {} pads is {}",
                self.pads, self.pads
            )));
        }
        Ok(())
    }
}

/// Makes a drum rack from uniformly-random samples and writes the preset.
/// Returns the path of the written file.
pub fn make_rack<R: Rng>(
    catalog: &Catalog,
    options: &RackOptions,
    rng: &mut R,
) -> Result<PathBuf, RackError> {
    options.validate()?;

    let picks = select::choose_uniform(rng, catalog.len(), options.slots, options.random_transpose)?;
    let stem = options.name.clone().unwrap_or_else(|| DEFAULT_STEM.to_string());
    assemble(catalog, &picks, options.pads, options.choke, &stem, options)
}

/// Makes a drum rack that mimics Live's default drum rack sample positions
/// using the given role map. Uses the fixed default layout of 92 pads.
pub fn make_default_rack<R: Rng>(
    catalog: &Catalog,
    roles: &RoleMap,
    options: &RackOptions,
    rng: &mut R,
) -> Result<PathBuf, RackError> {
    if roles.roles.is_empty() || roles.roles.len() as u32 > DEFAULT_LAYOUT_TOP_PAD {
        return Err(RackError::InvalidConfiguration(format!(
            "role count must be between 1 and {}",
            DEFAULT_LAYOUT_TOP_PAD
        )));
    }

    let picks = select::choose_by_role(rng, catalog, roles)?;
    let stem = options
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_LAYOUT_STEM.to_string());
    assemble(
        catalog,
        &picks,
        DEFAULT_LAYOUT_TOP_PAD,
        options.choke,
        &stem,
        options,
    )
}

/// Populates one pad-zone fragment per pick and writes the preset.
///
/// Pad IDs decrement from the top pad, one per sample in selection order; the
/// receiving note is kept numerically identical to the pad ID. With choke
/// enabled every pad shares group 1, otherwise the group increments per pad.
fn assemble(
    catalog: &Catalog,
    picks: &[Pick],
    top_pad: u32,
    choke: bool,
    stem: &str,
    options: &RackOptions,
) -> Result<PathBuf, RackError> {
    let mut document = RackDocument::new()?;
    let mut pad_id = top_pad;
    let mut choke_group: u32 = 1;

    for pick in picks {
        let row = catalog
            .row(pick.row)
            .ok_or(RackError::NoSamplesFound)?;
        let descriptor = SampleDescriptor::from_row(row)?;
        debug!(
            pad = pad_id,
            sample = descriptor.display_name,
            "Populating pad"
        );

        document.append(populate(
            pad_id,
            choke_group,
            &descriptor,
            pick.transpose_semitones,
        )?);

        pad_id -= 1;
        if !choke {
            choke_group += 1;
        }
    }

    let path = adg::write_adg(&document, stem, &options.save_path())?;
    info!(
        preset = path.display().to_string(),
        pads = picks.len(),
        "Created drum rack preset"
    );
    Ok(path)
}

/// Fills a fresh pad-zone fragment for one sample.
///
/// Every duplicated field is written through a single set-all call so no
/// position can be updated without its siblings. The loop end fields index the
/// last frame rather than the frame count, so they get `duration - 1`.
fn populate(
    pad_id: u32,
    choke_group: u32,
    descriptor: &SampleDescriptor,
    transpose_semitones: i32,
) -> Result<Fragment, RackError> {
    let mut fragment = Fragment::drum_branch()?;

    // The pad ID and the MIDI receiving note are separate fields that must be
    // kept numerically identical for the pad to behave correctly on load.
    fragment.set_root_attribute("Id", &pad_id.to_string())?;
    fragment.set_first(&["ZoneSettings"], "ReceivingNote", &pad_id.to_string())?;
    fragment.set_first(&["ZoneSettings"], "ChokeGroup", &choke_group.to_string())?;
    fragment.set_first(&["MultiSamplePart"], "Name", &descriptor.display_name)?;

    fragment.set_occurrences(&["FileRef"], "Path", &[1, 2, 5], &descriptor.absolute_path)?;
    fragment.set_all(
        &["SampleRef", "FileRef"],
        "RelativePath",
        &descriptor.relative_path,
    )?;
    fragment.set_all(
        &["SampleRef"],
        "OriginalFileSize",
        &descriptor.file_size.to_string(),
    )?;
    fragment.set_all(&[], "BrowserContentPath", &descriptor.browser_uri)?;

    let last_frame = descriptor.duration_frames as i64 - 1;
    fragment.set_first(&["SampleParts"], "SampleEnd", &last_frame.to_string())?;
    fragment.set_first(&["SustainLoop"], "End", &last_frame.to_string())?;
    fragment.set_first(&["ReleaseLoop"], "End", &last_frame.to_string())?;
    fragment.set_first(
        &["SampleRef"],
        "DefaultDuration",
        &descriptor.duration_frames.to_string(),
    )?;

    if transpose_semitones != 0 {
        fragment.set_first(
            &["TransposeKey"],
            "Manual",
            &transpose_semitones.to_string(),
        )?;
    }

    Ok(fragment)
}
