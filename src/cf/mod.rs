// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Convolution-function providers.
//!
//! [`ConvolutionFunction`] is a trait detailing how a family of oversampled
//! gridding kernels is built and looked up. By making this trait, the core
//! gridder stays a single fixed orchestrator and the kernel family (simple
//! nearest-neighbour, anti-aliasing spheroidal, w-projection) is injected at
//! construction.
//!
//! The kernel table is ordered `[shape][fracv][fracu]`: a lookup combines a
//! per-sample shape index (`c_index`, e.g. the w-plane) with the two
//! oversampling sub-cell fractions as
//! `fracu + oversample * (fracv + oversample * c_index)`. An index at or past
//! `table_len` is a programming or configuration bug, not a recoverable
//! condition.

mod boxcar;
mod spheroidal;
mod wproject;

pub use boxcar::BoxFunction;
pub use spheroidal::SpheroidalFunction;
pub use wproject::WProjectionFunction;

use marlu::c64;
use ndarray::{ArrayView2, ArrayViewMut2};

use crate::chunk::VisChunk;

/// The uv geometry of the (padded) grid the kernels will be applied to.
#[derive(Debug, Clone, Copy)]
pub struct GridGeometry {
    /// uv cell size along u \[wavelengths\].
    pub uv_cell_u: f64,

    /// uv cell size along v \[wavelengths\].
    pub uv_cell_v: f64,
}

/// A family of oversampled gridding kernels.
pub trait ConvolutionFunction {
    /// The registry name of this kernel family.
    fn name(&self) -> &'static str;

    /// Supply the grid geometry. Called at grid/degrid initialisation,
    /// before any other method; kernel families that don't depend on the
    /// geometry ignore it.
    fn set_geometry(&mut self, _geometry: GridGeometry) {}

    /// Build or extend whatever kernels and per-sample indices this chunk
    /// needs. A no-op for families whose kernels don't depend on the data.
    fn init_chunk(&mut self, _chunk: &VisChunk) {}

    /// The shape index of a sample, before oversampling sub-cell selection.
    /// Only valid for the chunk most recently given to
    /// [`ConvolutionFunction::init_chunk`].
    fn c_index(&self, row: usize, pol: usize, chan: usize) -> usize;

    /// How many distinct kernel shapes (`c_index` values) exist.
    fn num_shapes(&self) -> usize;

    /// The full kernel-table length, including oversampling sub-cells.
    fn table_len(&self) -> usize {
        self.num_shapes() * self.oversample() * self.oversample()
    }

    /// Look up a kernel by its final table index.
    fn kernel(&self, index: usize) -> ArrayView2<c64>;

    /// The kernel half width \[pixels\].
    fn support(&self) -> usize;

    /// The number of oversampling sub-cells per uv pixel.
    fn oversample(&self) -> usize;

    /// Deconvolve this family's footprint from an image-domain plane (the
    /// "convolution correction"). A no-op for the nearest-neighbour kernel.
    fn correct_image(&self, plane: ArrayViewMut2<f64>);
}
