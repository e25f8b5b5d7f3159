// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operator views of advertised prefixes and the forwarding table.

pub mod advertised;
pub mod config;
pub mod error;
pub mod fib;
mod log;
pub mod tags;


pub const COMPONENT_PREFIXADM: &str = "prefixadm";
pub const MOD_RENDER: &str = "render";
