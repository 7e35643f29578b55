// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Visibility gridding and degridding for radio interferometric imaging.

The core of this crate is [`VisGridder`]: it accumulates calibrated
visibilities onto a padded Fourier-domain grid through oversampled
convolution kernels, or predicts visibilities back off a model grid. The
convolution-function family (nearest-neighbour, prolate spheroidal,
w-projection) is injected at construction; [`create_gridder`] builds a
configured gridder from a TOML or JSON config.

This is a computational core only: no I/O, no CLI, no internal threading.
 */

pub mod axes;
pub mod cf;
pub mod chunk;
pub mod constants;
mod error;
pub mod factory;
pub(crate) mod fft;
pub mod freq;
pub mod gridder;
pub mod kernel;
pub(crate) mod math;
pub mod pol;
pub(crate) mod unit_parsing;
pub mod weights;

// Re-exports.
pub use axes::{DirectionAxis, ImageAxes, SpectralAxis};
pub use chunk::VisChunk;
pub use error::HypergridError;
pub use factory::{create_gridder, GridderConfig, GridderType};
pub use gridder::{Gridder, GridderStats, SnapshotGridderAdapter, VisGridder};
pub use pol::{PolConverter, Polarisation};
pub use weights::VisWeights;

// External re-exports.
pub use marlu::{c64, RADec, UVW};
