// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to parse strings into plain numbers or some quantity with a unit.

mod error;

pub(crate) use error::*;

use std::f64::consts::PI;

use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, EnumIter, EnumString, IntoStaticStr)]
pub(crate) enum AngleFormat {
    /// Degrees
    Deg,

    /// Minutes of arc
    Arcmin,

    /// Seconds of arc
    Arcsec,

    /// Radians
    Rad,

    NoUnit,
}

impl AngleFormat {
    fn to_radians(self, value: f64) -> f64 {
        match self {
            AngleFormat::Deg => value * PI / 180.0,
            AngleFormat::Arcmin => value * PI / 180.0 / 60.0,
            AngleFormat::Arcsec => value * PI / 180.0 / 3600.0,
            AngleFormat::Rad | AngleFormat::NoUnit => value,
        }
    }
}

/// Parse a string that may have a unit of angle attached to it (e.g. "1deg",
/// "30arcsec"). The result is always in radians; a naked number is taken to
/// already be radians.
pub(crate) fn parse_angle(s: &str) -> Result<f64, UnitParseError> {
    // Try to parse a naked number.
    let maybe_number: Option<f64> = s.trim().parse().ok();
    if let Some(number) = maybe_number {
        return Ok(AngleFormat::NoUnit.to_radians(number));
    };

    // That didn't work; let's search over our supported formats.
    for angle_format in AngleFormat::iter().filter(|&af| af != AngleFormat::NoUnit) {
        let angle_format_str: &'static str = angle_format.into();
        let suffix = s
            .trim()
            .trim_start_matches(|c| char::is_numeric(c) || c == '.' || c == '-')
            .trim();
        if suffix.to_uppercase() == angle_format_str.to_uppercase() {
            let prefix = s.trim().trim_end_matches(char::is_alphabetic).trim();
            let number: f64 = match prefix.parse() {
                Ok(n) => n,
                Err(_) => {
                    return Err(UnitParseError::GotAngleUnitButCantParse {
                        input: s.to_string(),
                        unit: angle_format_str,
                    })
                }
            };
            return Ok(angle_format.to_radians(number));
        }
    }

    // If we made it this far, we don't know how to parse the string.
    Err(UnitParseError::Unknown {
        input: s.to_string(),
        unit_type: "angle",
    })
}
