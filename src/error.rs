// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all hypergrid-related errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HypergridError {
    #[error("{0}")]
    Factory(#[from] crate::factory::FactoryError),

    #[error("{0}")]
    Pol(#[from] crate::pol::PolError),
}
