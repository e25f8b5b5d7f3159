// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Route data shared by the prefix inspection tools: prefixes, advertised
//! route records with their selection outcome, and forwarding table entries.

pub mod error;
pub mod types;

pub use types::*;

#[cfg(test)]
mod proptest;
