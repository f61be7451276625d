// SPDX-License-Identifier: Apache-2.0

//! Offline generators for the lookup tables used by switch-resident traffic
//! control: approximate division for AFD, and the RED drop-probability and
//! EWMA decay-factor tables.

pub mod afd;
pub mod commands;
pub mod division;
pub mod ewma;
pub mod p4tables_error;
pub mod red;

pub use p4tables_error::P4TablesError;
