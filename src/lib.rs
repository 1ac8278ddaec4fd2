/*
 * This file is part of Envprint.
 *
 * Copyright (C) 2025 Envprint contributors
 *
 * Envprint is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Envprint is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Envprint. If not, see <https://www.gnu.org/licenses/>.
 */

//! Envprint - environment fingerprinting from the command line
//!
//! The library half of the binary exposes the CLI so it can be driven from
//! integration tests. Fingerprinting itself lives in `ep-core`.

pub mod cli;

pub use ep_core::{Fingerprint, FingerprintOutput, Options, SnapshotEnvironment};
