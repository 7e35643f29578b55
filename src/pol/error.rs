// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use super::Polarisation;

#[derive(Debug, Error)]
pub enum PolError {
    #[error("Can't form {target}: the input basis doesn't provide {needed}")]
    MissingInput {
        target: Polarisation,
        needed: Polarisation,
    },
}
