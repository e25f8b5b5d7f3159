// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("route data error {0}")]
    Rdb(#[from] rdb::error::Error),

    #[error("output error {0}")]
    Io(#[from] std::io::Error),

    #[error("output encoding error {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
