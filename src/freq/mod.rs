// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mapping accessor channels onto image spectral planes.
//!
//! The image's spectral axis is fixed for a whole imaging run, but the
//! accessor's channel frequencies can drift between chunks (e.g. Doppler
//! tracking), so the channel map is rebuilt once per chunk. A channel whose
//! frequency falls outside the image's coverage is simply not mapped; the
//! gridder skips it.


use crate::axes::SpectralAxis;
use crate::math::nint;

#[derive(Debug, Clone, Copy)]
enum ImageSpectrum {
    /// Every channel lands on plane 0.
    SinglePlane,
    Planes(SpectralAxis),
}

#[derive(Debug, Clone)]
pub struct FrequencyMapper {
    spectrum: ImageSpectrum,
    map: Vec<Option<usize>>,
}

impl Default for FrequencyMapper {
    fn default() -> Self {
        FrequencyMapper {
            spectrum: ImageSpectrum::SinglePlane,
            map: vec![],
        }
    }
}

impl FrequencyMapper {
    /// Map channels onto the planes of the given spectral axis.
    pub fn setup_image(&mut self, spectral: SpectralAxis) {
        assert!(spectral.num_planes > 0, "image has no spectral planes");
        assert!(spectral.step != 0.0, "image spectral step is zero");
        self.spectrum = ImageSpectrum::Planes(spectral);
        self.map.clear();
    }

    /// Degenerate mapping: the image has no frequency axis, all channels land
    /// on plane 0.
    pub fn setup_single_plane(&mut self) {
        self.spectrum = ImageSpectrum::SinglePlane;
        self.map.clear();
    }

    /// Rebuild the channel map for a chunk's frequencies. Call once per
    /// chunk.
    pub fn setup_mapping(&mut self, freqs: &[f64]) {
        self.map.clear();
        match self.spectrum {
            ImageSpectrum::SinglePlane => self.map.extend(freqs.iter().map(|_| Some(0))),
            ImageSpectrum::Planes(s) => self.map.extend(freqs.iter().map(|&f| {
                let plane = nint((f - s.start) / s.step);
                if plane >= 0 && (plane as usize) < s.num_planes {
                    Some(plane as usize)
                } else {
                    None
                }
            })),
        }
    }

    /// Does this accessor channel fall inside the image's frequency
    /// coverage? `false` means "skip the channel", not an error.
    pub fn is_mapped(&self, chan: usize) -> bool {
        self.map[chan].is_some()
    }

    /// The image plane for an accessor channel. Valid only if
    /// [`FrequencyMapper::is_mapped`] returned true for the channel.
    pub fn plane(&self, chan: usize) -> usize {
        self.map[chan].expect("channel is not mapped onto an image plane")
    }
}
