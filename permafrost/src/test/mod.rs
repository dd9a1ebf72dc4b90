// Permafrost: Local Search Metaheuristics for Combinatorial Optimization
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Test modules, all built around the sequence-fitting toy problem defined in [`fit`]:
//! minimize the squared distance of a bounded integer sequence to the identity profile, with a
//! one-position reassignment neighborhood.

#[cfg(test)]
pub mod fit;

#[cfg(test)]
mod test_explorer;
#[cfg(test)]
mod test_kicker;
#[cfg(test)]
mod test_multimodal;

#[cfg(test)]
pub fn init_logger() {
    let _ = pretty_env_logger::try_init();
}
