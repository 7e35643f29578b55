// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. `hypergrid` should do as many
calculations as possible in double precision before converting to a lower
precision, if it is ever required.
 */

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

pub use marlu::constants::VEL_C;

/// The default reference frequency for multi-frequency-synthesis visibility
/// weighting \[Hz\].
pub const DEFAULT_MFS_REFFREQ: f64 = 1.405e9;

/// The default number of oversampling sub-cells per uv pixel.
pub const DEFAULT_OVERSAMPLE: usize = 8;

/// The default convolution-kernel support (half width) \[pixels\].
pub const DEFAULT_SUPPORT: usize = 3;

/// The default number of w-projection planes. Must be odd.
pub const DEFAULT_NWPLANES: usize = 33;

/// Channel frequencies outside this range trigger a (non-fatal) warning on
/// the first channel seen; anything out here is almost certainly a units or
/// configuration mistake rather than a radio observation \[Hz\].
pub const MIN_SANE_FREQ: f64 = 1e6;
pub const MAX_SANE_FREQ: f64 = 1e12;

/// Two pointing directions closer than this are considered the same field
/// when matching against the PSF representative \[radians\].
pub const POINTING_TOLERANCE: f64 = 1e-6;
