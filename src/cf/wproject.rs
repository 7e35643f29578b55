// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! W-projection: one kernel shape per w-plane.
//!
//! The w term turns the 2D Fourier relationship between sky and visibilities
//! into a Fresnel diffraction problem; w-projection absorbs it into the
//! gridding kernel by multiplying the anti-aliasing taper with the w screen
//! `exp(2πi·w(√(1-l²-m²)-1))` in the image domain and transforming to the uv
//! domain. Kernels are built lazily, one w-plane at a time, as chunks
//! needing them arrive.

use itertools::Itertools;
use log::debug;
use marlu::c64;
use ndarray::{Array2, ArrayView2, ArrayViewMut2};
use num_complex::Complex;

use super::spheroidal::{correct_with_grdsf, grdsf};
use super::{ConvolutionFunction, GridGeometry};
use crate::chunk::VisChunk;
use crate::constants::{TAU, VEL_C};
use crate::fft;
use crate::math::{cexp, nint};

pub struct WProjectionFunction {
    support: usize,
    oversample: usize,
    wmax: f64,
    nwplanes: usize,
    /// W-plane spacing \[wavelengths\]; infinite when there's only one
    /// plane.
    wscale: f64,
    geometry: Option<GridGeometry>,
    /// `table_len` entries, filled per w-plane on first use.
    kernels: Vec<Option<Array2<c64>>>,
    /// The per-chunk `(row, chan) -> w-plane` map.
    cmap: Array2<usize>,
}

impl WProjectionFunction {
    pub fn new(
        support: usize,
        oversample: usize,
        wmax: f64,
        nwplanes: usize,
    ) -> WProjectionFunction {
        assert!(support > 0, "support must be positive");
        assert!(oversample > 0, "oversample must be positive");
        assert!(wmax > 0.0, "wmax must be positive");
        assert!(nwplanes % 2 == 1, "the number of w planes must be odd");

        let wscale = if nwplanes > 1 {
            wmax / ((nwplanes - 1) / 2) as f64
        } else {
            f64::INFINITY
        };
        let table_len = nwplanes * oversample * oversample;
        WProjectionFunction {
            support,
            oversample,
            wmax,
            nwplanes,
            wscale,
            geometry: None,
            kernels: vec![None; table_len],
            cmap: Array2::zeros((0, 0)),
        }
    }

    /// The w coordinate at the centre of a plane \[wavelengths\].
    fn plane_w(&self, plane: usize) -> f64 {
        if self.nwplanes == 1 {
            0.0
        } else {
            (plane as f64 - (self.nwplanes / 2) as f64) * self.wscale
        }
    }

    /// Tabulate every oversampling sub-kernel of one w-plane: fill an
    /// image-domain screen (taper × w phase) whose central 1/oversample
    /// region is the primary field of view, transform to the uv domain, and
    /// decimate. The zero padding around the taper is what yields the
    /// sub-cell tabulation.
    fn build_plane(&mut self, plane: usize) {
        let geometry = self
            .geometry
            .expect("set_geometry must be called before kernels are built");
        let os = self.oversample;
        let s = self.support;
        let size = 2 * s + 1;
        let csize = os * (2 * s + 2);
        let cc = (os * (s + 1)) as i32;
        let w = self.plane_w(plane);

        let mut screen = Array2::from_elem((csize, csize), Complex::default());
        for ((y, x), v) in screen.indexed_iter_mut() {
            let nu_y = 2.0 * os as f64 * (y as i32 - cc) as f64 / csize as f64;
            let nu_x = 2.0 * os as f64 * (x as i32 - cc) as f64 / csize as f64;
            if nu_y.abs() > 1.0 || nu_x.abs() > 1.0 {
                continue;
            }
            let taper = grdsf(nu_x) * grdsf(nu_y);
            let l = nu_x / (2.0 * geometry.uv_cell_u);
            let m = nu_y / (2.0 * geometry.uv_cell_v);
            let r2 = l * l + m * m;
            let phase = if r2 < 1.0 {
                TAU * w * ((1.0 - r2).sqrt() - 1.0)
            } else {
                0.0
            };
            *v = cexp(phase) * taper;
        }

        let big = fft::image_to_uv(&screen);

        for fracv in 0..os {
            for fracu in 0..os {
                let mut sub = Array2::from_elem((size, size), c64::default());
                for dv in -(s as i32)..=(s as i32) {
                    for du in -(s as i32)..=(s as i32) {
                        let yy = (cc + os as i32 * dv - fracv as i32) as usize;
                        let xx = (cc + os as i32 * du - fracu as i32) as usize;
                        sub[[(dv + s as i32) as usize, (du + s as i32) as usize]] = big[[yy, xx]];
                    }
                }
                // The kernel integral is the screen's field-centre value,
                // which is real and positive, so this normalisation doesn't
                // twist the w phase.
                let sum: c64 = sub.iter().sum();
                assert!(sum.norm() > 0.0, "w-projection kernel has zero integral");
                sub.mapv_inplace(|v| v / sum);
                self.kernels[fracu + os * (fracv + os * plane)] = Some(sub);
            }
        }

        debug!("Built w-projection kernels for plane {plane} (w = {w:.1} wavelengths)");
    }
}

impl ConvolutionFunction for WProjectionFunction {
    fn name(&self) -> &'static str {
        "WProject"
    }

    fn set_geometry(&mut self, geometry: GridGeometry) {
        self.geometry = Some(geometry);
        // Kernels depend on the geometry; throw away any built for another
        // image.
        self.kernels = vec![None; self.table_len()];
    }

    fn init_chunk(&mut self, chunk: &VisChunk) {
        let mut cmap = Array2::zeros((chunk.num_rows(), chunk.num_chans()));
        for (row, uvw) in chunk.rotated_uvws.iter().enumerate() {
            for chan in 0..chunk.num_chans() {
                let w_lambda = uvw.w * chunk.freqs[chan] / VEL_C;
                let plane = nint(w_lambda / self.wscale) + (self.nwplanes / 2) as i32;
                assert!(
                    plane >= 0 && (plane as usize) < self.nwplanes,
                    "sample w of {w_lambda:.1} wavelengths lies outside the configured wmax of {:.1}",
                    self.wmax
                );
                cmap[[row, chan]] = plane as usize;
            }
        }

        let os2 = self.oversample * self.oversample;
        let planes_needed: Vec<usize> = cmap.iter().copied().sorted_unstable().dedup().collect();
        for plane in planes_needed {
            if self.kernels[os2 * plane].is_none() {
                self.build_plane(plane);
            }
        }

        self.cmap = cmap;
    }

    fn c_index(&self, row: usize, _pol: usize, chan: usize) -> usize {
        self.cmap[[row, chan]]
    }

    fn num_shapes(&self) -> usize {
        self.nwplanes
    }

    fn kernel(&self, index: usize) -> ArrayView2<c64> {
        assert!(
            index < self.table_len(),
            "convolution-function index {index} is out of range (table has {} entries)",
            self.table_len()
        );
        self.kernels[index]
            .as_ref()
            .expect("kernel plane was not built for this chunk")
            .view()
    }

    fn support(&self) -> usize {
        self.support
    }

    fn oversample(&self) -> usize {
        self.oversample
    }

    fn correct_image(&self, plane: ArrayViewMut2<f64>) {
        // The image-domain taper in the kernel screens is the same
        // spheroidal the SphFunc gridder uses.
        correct_with_grdsf(plane);
    }
}
