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
mod adg;
mod catalog;
mod descriptor;
mod error;
mod probe;
mod rack;
mod select;
mod template;
#[cfg(test)]
mod testutil;

use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};
use config::{Config, File};
use rand::rngs::OsRng;

use crate::catalog::{Catalog, Filter};
use crate::rack::RackOptions;
use crate::select::RoleMap;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A drum rack preset generator for Ableton Live."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scans a directory for WAV samples and writes a catalog file.
    Scan {
        /// The path to the sample directory.
        path: String,
        /// The path of the catalog file to write. Defaults to
        /// ableton_samples.yaml in the home directory.
        #[arg(short, long)]
        catalog: Option<String>,
        /// Probe each sample for its frame count and length while scanning.
        /// May take a while on large collections.
        #[arg(short, long)]
        probe: bool,
    },
    /// Lists the samples in the catalog.
    Samples {
        /// The path of the catalog file to read.
        #[arg(short, long)]
        catalog: Option<String>,
        /// Only list samples whose name contains this text.
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Makes a drum rack from randomly chosen samples.
    Make {
        /// The path of the catalog file to read.
        #[arg(short, long)]
        catalog: Option<String>,
        /// The number of pads to fill.
        #[arg(short, long, default_value_t = 16)]
        slots: usize,
        /// The top pad; pad IDs count down from here.
        #[arg(short, long, default_value_t = 128)]
        pads: u32,
        /// Put every pad in choke group 1 so pads cut each other off.
        #[arg(long)]
        choke: bool,
        /// Give each pad a random pitch offset.
        #[arg(short, long)]
        transpose: bool,
        /// Only choose samples whose name contains this text.
        #[arg(short, long)]
        name: Option<String>,
        /// Only choose samples whose path contains this text.
        #[arg(long)]
        path: Option<String>,
        /// The output file name, without extension.
        #[arg(short, long)]
        output: Option<String>,
        /// The output directory. Defaults to the home directory.
        #[arg(short = 'd', long)]
        output_dir: Option<String>,
    },
    /// Makes a drum rack that mimics the default Ableton Drum Rack layout,
    /// matching samples to pads by role.
    MakeDefault {
        /// The path of the catalog file to read.
        #[arg(short, long)]
        catalog: Option<String>,
        /// A YAML file with a custom role map. Defaults to the built-in
        /// sixteen-role layout.
        #[arg(short, long)]
        roles: Option<String>,
        /// Put every pad in choke group 1 so pads cut each other off.
        #[arg(long)]
        choke: bool,
        /// Only choose samples whose name contains this text.
        #[arg(short, long)]
        name: Option<String>,
        /// Only choose samples whose path contains this text.
        #[arg(long)]
        path: Option<String>,
        /// The output file name, without extension.
        #[arg(short, long)]
        output: Option<String>,
        /// The output directory. Defaults to the home directory.
        #[arg(short = 'd', long)]
        output_dir: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            path,
            catalog,
            probe,
        } => {
            let mut scanned = Catalog::scan(&PathBuf::from(path))?;
            if probe {
                scanned.update_details();
            }
            let catalog_path = catalog_path(catalog);
            scanned.save(&catalog_path)?;
            println!(
                "Cataloged {} samples into {}.",
                scanned.len(),
                catalog_path.display()
            );
        }
        Commands::Samples { catalog, name } => {
            let filter = Filter {
                name_contains: name,
                ..Filter::default()
            };
            let result = Catalog::load(&catalog_path(catalog))?.query(&filter)?;

            println!("Samples (count: {}):", result.len());
            for row in result.rows() {
                match row.frames {
                    Some(frames) => println!("- {} ({} frames)", row.sample_name, frames),
                    None => println!("- {}", row.sample_name),
                }
            }
        }
        Commands::Make {
            catalog,
            slots,
            pads,
            choke,
            transpose,
            name,
            path,
            output,
            output_dir,
        } => {
            let options = RackOptions {
                slots,
                pads,
                choke,
                random_transpose: transpose,
                name: output,
                save_path: output_dir.map(PathBuf::from),
            };
            let candidates = load_candidates(catalog, name, path)?;
            let written = rack::make_rack(&candidates, &options, &mut OsRng)?;
            println!("Successfully created preset {}.", written.display());
        }
        Commands::MakeDefault {
            catalog,
            roles,
            choke,
            name,
            path,
            output,
            output_dir,
        } => {
            let role_map = match roles {
                Some(roles) => parse_roles(&PathBuf::from(roles))?,
                None => RoleMap::default_rack(),
            };
            let options = RackOptions {
                choke,
                name: output,
                save_path: output_dir.map(PathBuf::from),
                ..RackOptions::default()
            };
            let candidates = load_candidates(catalog, name, path)?;
            let written = rack::make_default_rack(&candidates, &role_map, &options, &mut OsRng)?;
            println!("Successfully created preset {}.", written.display());
        }
    }

    Ok(())
}

/// The catalog file to use: the given path, or the default location.
fn catalog_path(catalog: Option<String>) -> PathBuf {
    catalog.map(PathBuf::from).unwrap_or_else(Catalog::default_path)
}

/// Loads the catalog and narrows it to the candidate set for assembly.
fn load_candidates(
    catalog: Option<String>,
    name: Option<String>,
    path: Option<String>,
) -> Result<Catalog, Box<dyn Error>> {
    let filter = Filter {
        name_contains: name,
        path_contains: path,
        ..Filter::default()
    };
    Ok(Catalog::load(&catalog_path(catalog))?.query(&filter)?)
}

/// Deserializes a role map from a YAML file.
fn parse_roles(path: &PathBuf) -> Result<RoleMap, Box<dyn Error>> {
    Ok(Config::builder()
        .add_source(File::from(path.as_path()))
        .build()?
        .try_deserialize::<RoleMap>()?)
}
