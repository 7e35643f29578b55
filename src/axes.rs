// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Coordinate axes of the output image.
//!
//! A substitute for a full coordinate-system object: the gridder only needs
//! the image centre and cell sizes (to derive uv cell sizes), an optional
//! spectral axis (to map accessor channels onto image planes) and the
//! polarisation labelling of the image planes.

use marlu::RADec;
use vec1::Vec1;

use crate::pol::Polarisation;

/// The direction axis: where the image is centred and how big its pixels are.
#[derive(Debug, Clone, Copy)]
pub struct DirectionAxis {
    /// The image centre, which is also the tangent point the accessor's
    /// rotated UVWs are referenced to.
    pub centre: RADec,

    /// Pixel size along l \[radians\].
    pub cell_l: f64,

    /// Pixel size along m \[radians\].
    pub cell_m: f64,
}

/// The spectral axis of a multi-plane (cube) image.
#[derive(Debug, Clone, Copy)]
pub struct SpectralAxis {
    /// The centre frequency of the first image plane \[Hz\].
    pub start: f64,

    /// The frequency step between image planes \[Hz\].
    pub step: f64,

    /// The number of image planes.
    pub num_planes: usize,
}

/// Everything the gridder needs to know about the output image's coordinates.
#[derive(Debug, Clone)]
pub struct ImageAxes {
    pub direction: DirectionAxis,

    /// `None` collapses all channels onto a single plane (continuum
    /// imaging).
    pub spectral: Option<SpectralAxis>,

    /// The polarisation of each image plane.
    pub stokes: Vec1<Polarisation>,
}

impl ImageAxes {
    pub fn num_image_planes(&self) -> usize {
        self.spectral.map(|s| s.num_planes).unwrap_or(1)
    }

    pub fn num_pols(&self) -> usize {
        self.stokes.len()
    }
}
