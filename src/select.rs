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

//! Pad selection.
//!
//! Decides which catalog rows fill which pad slots. Selection is pure: it
//! draws from an injected RNG and an in-memory catalog snapshot and performs
//! no I/O. Production callers pass [rand::rngs::OsRng]; reproducibility is
//! explicitly not a goal, unpredictability is.

use fancy_regex::Regex;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::RackError;

/// The hard upper bound on pad numbers in a drum rack.
pub const MAX_PADS: u32 = 128;

/// The top pad of the default 4x4 layout. Historical: Live's default drum
/// rack view starts its sixteen visible pads at pad 92.
pub const DEFAULT_LAYOUT_TOP_PAD: u32 = 92;

/// The semitone range for randomized pitch offsets.
const TRANSPOSE_RANGE: std::ops::RangeInclusive<i32> = -12..=12;

/// One selected sample: a catalog row index plus the pitch offset for its pad.
#[derive(Clone, Copy, Debug)]
pub struct Pick {
    pub row: usize,
    pub transpose_semitones: i32,
}

/// A named pad role: samples whose names match the pattern are candidates for
/// the role's pad.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Role {
    /// The name of the role, e.g. "kick".
    pub name: String,
    /// The pattern sample names are matched against, case-insensitively.
    pub pattern: String,
    /// A fixed pitch offset for the pad, in semitones.
    #[serde(default)]
    pub transpose: i32,
}

impl Role {
    /// Creates a role with no pitch offset.
    pub fn new(name: &str, pattern: &str) -> Role {
        Role {
            name: name.to_string(),
            pattern: pattern.to_string(),
            transpose: 0,
        }
    }
}

/// An ordered mapping of pad roles. Role order is pad order; overlapping
/// roles are resolved first-match-wins in declared order.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RoleMap {
    pub roles: Vec<Role>,
}

impl RoleMap {
    /// The role map that mimics Live's default drum rack sample positions.
    pub fn default_rack() -> RoleMap {
        RoleMap {
            roles: vec![
                Role::new("kick", "kick"),
                Role::new("percussion", "perc|clap|rim|snap"),
                Role::new("snare", "snare"),
                Role::new("percussion 2", "perc|clap|snare"),
                Role::new("snare 2", "snare"),
                Role::new("bass", "bass|808"),
                Role::new("hi hat", r"^(?=.*hi)(?=.*hat)"),
                Role::new("sub bass", "bass|808|sub"),
                Role::new("hi hat 2", r"^(?=.*hi)(?=.*hat)"),
                Role::new("fx", "fx|synth|stab"),
                Role::new("open hat", r"^(?=.*open)(?=.*hat)"),
                Role::new("tom", "tom"),
                Role::new("bass 2", "bass"),
                Role::new("fx 2", "fx|synth|stab"),
                Role::new("fx 3", "fx|synth|stab"),
                Role::new("fx 4", "fx|synth|stab"),
            ],
        }
    }
}

/// Draws `slots` independent uniformly-random row indices, duplicates
/// permitted. When `random_transpose` is set, each pick also gets a random
/// pitch offset.
pub fn choose_uniform<R: Rng>(
    rng: &mut R,
    catalog_len: usize,
    slots: usize,
    random_transpose: bool,
) -> Result<Vec<Pick>, RackError> {
    if catalog_len == 0 {
        return Err(RackError::NoSamplesFound);
    }
    Ok((0..slots)
        .map(|_| Pick {
            row: rng.gen_range(0..catalog_len),
            transpose_semitones: if random_transpose {
                rng.gen_range(TRANSPOSE_RANGE)
            } else {
                0
            },
        })
        .collect())
}

/// Chooses one row per role. A role whose pattern matches at least one sample
/// name draws uniformly among the matches; a role that matches nothing falls
/// back to a uniform draw over the entire candidate set.
pub fn choose_by_role<R: Rng>(
    rng: &mut R,
    catalog: &Catalog,
    roles: &RoleMap,
) -> Result<Vec<Pick>, RackError> {
    if catalog.is_empty() {
        return Err(RackError::NoSamplesFound);
    }

    let mut picks = Vec::with_capacity(roles.roles.len());
    for role in &roles.roles {
        let pattern = Regex::new(&format!("(?i){}", role.pattern)).map_err(|e| {
            RackError::InvalidConfiguration(format!(
                "role '{}' has an invalid pattern '{}': {}",
                role.name, role.pattern, e
            ))
        })?;

        let matches: Vec<usize> = catalog
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| pattern.is_match(&row.sample_name).unwrap_or(false))
            .map(|(index, _)| index)
            .collect();

        // No match is a documented fallback, not an error.
        let row = if matches.is_empty() {
            rng.gen_range(0..catalog.len())
        } else {
            matches[rng.gen_range(0..matches.len())]
        };
        picks.push(Pick {
            row,
            transpose_semitones: role.transpose,
        });
    }
    Ok(picks)
}
