// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid address length {0}, expected 4 or 16 bytes")]
    InvalidAddressLength(usize),

    #[error("invalid prefix {0}")]
    InvalidPrefix(String),

    #[error("invalid aggregate {0}")]
    InvalidAggregate(String),

    #[error("serialization error {0}")]
    Serialization(#[from] serde_json::Error),
}
