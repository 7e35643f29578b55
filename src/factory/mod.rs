// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Building a configured gridder from a config file.
//!
//! The gridder type names form a static registry; optional layers (padding,
//! pointing rejection, PSF policy, per-sub-cell weight tracking, MFS
//! visibility weighting, the snapshot-imaging adapter) are applied on top.
//! An option that the chosen gridder type can't honour is a configuration
//! error, never a silent no-op.

mod error;

pub use error::FactoryError;

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::cf::{BoxFunction, ConvolutionFunction, SpheroidalFunction, WProjectionFunction};
use crate::constants::{DEFAULT_MFS_REFFREQ, DEFAULT_NWPLANES, DEFAULT_OVERSAMPLE};
use crate::gridder::{Gridder, SnapshotGridderAdapter, VisGridder};
use crate::unit_parsing::parse_angle;
use crate::weights::VisWeights;

/// All of the possible gridder types.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
pub enum GridderType {
    /// Nearest-neighbour gridding.
    #[strum(serialize = "Box")]
    Box,

    /// Prolate-spheroidal anti-aliasing gridding.
    #[strum(serialize = "SphFunc")]
    SphFunc,

    /// W-projection gridding.
    #[strum(serialize = "WProject")]
    WProject,
}

lazy_static::lazy_static! {
    pub(crate) static ref GRIDDER_TYPES_COMMA_SEPARATED: String = GridderType::iter().join(", ");
}

fn default_padding() -> f64 {
    1.0
}

fn default_oversample() -> usize {
    DEFAULT_OVERSAMPLE
}

fn default_nwplanes() -> usize {
    DEFAULT_NWPLANES
}

fn default_reffreq() -> f64 {
    DEFAULT_MFS_REFFREQ
}

/// The `[gridder]` section of a config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridderSettings {
    /// The gridder type name; one of the [`GridderType`] registry.
    pub name: String,

    /// The padding factor applied to the grid (and removed from the
    /// finalised image).
    #[serde(default = "default_padding")]
    pub padding: f64,

    /// An angle string (e.g. "1deg"); rows pointing further than this from
    /// the image centre are skipped. Disabled by default.
    #[serde(default)]
    pub max_pointing_separation: Option<String>,

    /// Build the PSF from all data rather than a representative feed/field.
    #[serde(default)]
    pub alldatapsf: bool,

    /// Track the sum of weights per oversampling sub-cell.
    #[serde(default)]
    pub oversampleweight: bool,

    /// Oversampling sub-cells per uv pixel.
    #[serde(default = "default_oversample")]
    pub oversample: usize,

    /// Kernel support (half width) for the kernel families that have one.
    #[serde(default)]
    pub support: Option<usize>,

    /// The largest |w| to plan for \[wavelengths\]; WProject only.
    #[serde(default)]
    pub wmax: Option<f64>,

    /// The number of w planes (odd); WProject only.
    #[serde(default)]
    pub nwplanes: Option<usize>,

    #[serde(default)]
    pub snapshotimaging: Option<SnapshotSettings>,
}

/// The `[gridder.snapshotimaging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotSettings {
    /// The largest acceptable residual w after the plane fit
    /// \[wavelengths\].
    pub wtolerance: f64,

    /// The fraction of the finalised image to zero at the edges.
    #[serde(default)]
    pub clipping: f64,
}

/// The `[visweights]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisWeightsSettings {
    /// The weighting scheme name; only "MFS" is recognised.
    pub name: String,

    /// The MFS reference frequency \[Hz\].
    #[serde(default = "default_reffreq")]
    pub reffreq: f64,

    /// The Taylor-term order; 0 gives unit weights.
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridderConfig {
    pub gridder: GridderSettings,

    #[serde(default)]
    pub visweights: Option<VisWeightsSettings>,
}

impl GridderConfig {
    /// Read a config from a TOML or JSON file, dispatching on the file
    /// extension.
    pub fn from_file(path: &Path) -> Result<GridderConfig, FactoryError> {
        let mut contents = String::new();
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => {
                debug!("Parsing toml file...");
                let mut fh = File::open(path).map_err(|err| FactoryError::Read {
                    file: path.display().to_string(),
                    err,
                })?;
                fh.read_to_string(&mut contents)
                    .map_err(|err| FactoryError::Read {
                        file: path.display().to_string(),
                        err,
                    })?;
                toml::from_str(&contents).map_err(|err| FactoryError::TomlDecode {
                    file: path.display().to_string(),
                    err,
                })
            }
            Some("json") => {
                debug!("Parsing json file...");
                let mut fh = File::open(path).map_err(|err| FactoryError::Read {
                    file: path.display().to_string(),
                    err,
                })?;
                fh.read_to_string(&mut contents)
                    .map_err(|err| FactoryError::Read {
                        file: path.display().to_string(),
                        err,
                    })?;
                serde_json::from_str(&contents).map_err(|err| FactoryError::JsonDecode {
                    file: path.display().to_string(),
                    err,
                })
            }
            _ => Err(FactoryError::UnhandledExtension(path.display().to_string())),
        }
    }
}

/// Build a gridder from a config, applying every optional layer or refusing
/// with a descriptive error.
pub fn create_gridder(config: &GridderConfig) -> Result<Box<dyn Gridder>, FactoryError> {
    let settings = &config.gridder;
    let gridder_type =
        GridderType::from_str(&settings.name).map_err(|_| FactoryError::UnknownGridderType {
            name: settings.name.clone(),
            types: GRIDDER_TYPES_COMMA_SEPARATED.clone(),
        })?;

    if settings.padding < 1.0 {
        return Err(FactoryError::BadPadding(settings.padding));
    }
    if settings.oversample == 0 {
        return Err(FactoryError::BadOversample);
    }
    let incompatible = |option: &'static str| FactoryError::IncompatibleOption {
        option,
        gridder: settings.name.clone(),
    };

    let max_pointing_separation = match settings.max_pointing_separation.as_deref() {
        None => None,
        Some(s) => Some(
            parse_angle(s).map_err(|e| FactoryError::BadMaxPointingSeparation(e.to_string()))?,
        ),
    };

    let vis_weights = match &config.visweights {
        None => VisWeights::Natural,
        Some(w) => {
            if w.name != "MFS" {
                return Err(FactoryError::UnknownVisWeights(w.name.clone()));
            }
            VisWeights::Mfs {
                reffreq: w.reffreq,
                order: w.order,
            }
        }
    };

    let cf: Box<dyn ConvolutionFunction> = match gridder_type {
        GridderType::Box => {
            if settings.support.is_some() {
                return Err(incompatible("support"));
            }
            if settings.wmax.is_some() {
                return Err(incompatible("wmax"));
            }
            if settings.nwplanes.is_some() {
                return Err(incompatible("nwplanes"));
            }
            Box::new(BoxFunction::new(settings.oversample))
        }

        GridderType::SphFunc => {
            if settings.wmax.is_some() {
                return Err(incompatible("wmax"));
            }
            if settings.nwplanes.is_some() {
                return Err(incompatible("nwplanes"));
            }
            let support = settings.support.unwrap_or(crate::constants::DEFAULT_SUPPORT);
            if support == 0 {
                return Err(FactoryError::BadSupport);
            }
            Box::new(SpheroidalFunction::new(support, settings.oversample))
        }

        GridderType::WProject => {
            let support = settings.support.unwrap_or(crate::constants::DEFAULT_SUPPORT);
            if support == 0 {
                return Err(FactoryError::BadSupport);
            }
            let wmax = settings.wmax.ok_or(FactoryError::MissingWmax)?;
            if wmax <= 0.0 {
                return Err(FactoryError::BadWmax(wmax));
            }
            let nwplanes = settings.nwplanes.unwrap_or_else(default_nwplanes);
            if nwplanes % 2 == 0 {
                return Err(FactoryError::EvenWPlanes(nwplanes));
            }
            Box::new(WProjectionFunction::new(
                support,
                settings.oversample,
                wmax,
                nwplanes,
            ))
        }
    };

    let gridder = VisGridder::new(
        cf,
        settings.padding,
        max_pointing_separation,
        settings.alldatapsf,
        settings.oversampleweight,
        vis_weights,
    );

    match &settings.snapshotimaging {
        None => {
            debug!("Using a {} gridder", settings.name);
            Ok(Box::new(gridder))
        }
        Some(snapshot) => {
            // The plane fit only helps a gridder that handles the residual w
            // terms.
            if gridder_type != GridderType::WProject {
                return Err(incompatible("snapshotimaging"));
            }
            if snapshot.wtolerance <= 0.0 {
                return Err(FactoryError::BadWTolerance(snapshot.wtolerance));
            }
            if !(0.0..1.0).contains(&snapshot.clipping) {
                return Err(FactoryError::BadClipping(snapshot.clipping));
            }
            debug!(
                "Using a {} gridder wrapped for snapshot imaging",
                settings.name
            );
            Ok(Box::new(SnapshotGridderAdapter::new(
                gridder,
                snapshot.wtolerance,
                snapshot.clipping,
            )))
        }
    }
}
