// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Unknown gridder type '{name}'. Supported types: {types}")]
    UnknownGridderType { name: String, types: String },

    #[error("gridder.{option} is not compatible with the '{gridder}' gridder type")]
    IncompatibleOption {
        option: &'static str,
        gridder: String,
    },

    #[error("gridder.padding must be at least 1.0 (got {0})")]
    BadPadding(f64),

    #[error("gridder.oversample must be positive")]
    BadOversample,

    #[error("gridder.support must be positive")]
    BadSupport,

    #[error("gridder.wmax is required for the WProject gridder")]
    MissingWmax,

    #[error("gridder.wmax must be positive (got {0})")]
    BadWmax(f64),

    #[error("gridder.nwplanes must be odd (got {0})")]
    EvenWPlanes(usize),

    #[error("gridder.snapshotimaging.wtolerance must be positive (got {0})")]
    BadWTolerance(f64),

    #[error("gridder.snapshotimaging.clipping must be in [0, 1) (got {0})")]
    BadClipping(f64),

    #[error("Unknown visweights scheme '{0}'; only 'MFS' is supported")]
    UnknownVisWeights(String),

    #[error("Couldn't parse gridder.max_pointing_separation: {0}")]
    BadMaxPointingSeparation(String),

    #[error("Couldn't read {file}: {err}")]
    Read { file: String, err: std::io::Error },

    #[error("Couldn't decode toml structure from {file}:\n{err}")]
    TomlDecode { file: String, err: toml::de::Error },

    #[error("Couldn't decode json structure from {file}:\n{err}")]
    JsonDecode {
        file: String,
        err: serde_json::Error,
    },

    #[error("Unrecognised config file extension on '{0}'; expected .toml or .json")]
    UnhandledExtension(String),
}
