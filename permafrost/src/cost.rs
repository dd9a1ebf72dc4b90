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

//! # Cost structure
//!
//! This module contains the hierarchical cost representation used throughout the framework. A
//! [`CostStructure`] carries the aggregated `total` cost, the `hard` (violations) and `soft`
//! (objective) aggregates, a client-weighted variant, and the unaggregated per-component values,
//! one entry per cost component registered at the state manager, in registration order.
//!
//! The cost codomain is a numeric type parameter implementing [`CostValue`] (typically a signed
//! integer). The hard aggregate takes precedence over the total in the hierarchical comparison
//! used to update the best state, see [`CostStructure::improves`]. Everywhere else, costs compare
//! by their `total` field.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use itertools::Itertools;

/// Numeric codomain of the cost function.
///
/// Implemented for `i64` and `f64`. The `INFINITY` marker denotes "no valid result"; for integers
/// it is the maximum representable value.
pub trait CostValue:
    Copy
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + Send
    + Sync
    + 'static
{
    /// The neutral cost.
    const ZERO: Self;

    /// Marker value denoting "no valid result".
    const INFINITY: Self;

    /// Convert a plain integer (used for weights such as the hard weight).
    fn from_i64(value: i64) -> Self;

    /// Convert to a float, for weighted aggregation and threshold arithmetic.
    fn to_f64(self) -> f64;

    /// Whether this value is the "no valid result" marker.
    fn is_infinite_cost(self) -> bool {
        self == Self::INFINITY
    }
}

impl CostValue for i64 {
    const ZERO: i64 = 0;
    const INFINITY: i64 = i64::MAX;

    fn from_i64(value: i64) -> i64 {
        value
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl CostValue for f64 {
    const ZERO: f64 = 0.0;
    const INFINITY: f64 = f64::INFINITY;

    fn from_i64(value: i64) -> f64 {
        value as f64
    }

    fn to_f64(self) -> f64 {
        self
    }
}

/// Hierarchical cost vector.
///
/// Addition and subtraction are component-wise, with the aggregates kept consistent. The
/// invariant `total == hard_weight * hard + soft` holds for every value produced by the
/// framework.
///
/// Two cost structures compare equal when their `total` fields are equal; the order between cost
/// structures is likewise the order of the totals. Use [`CostStructure::improves`] for the
/// hierarchical comparison that gives the hard aggregate precedence.
#[derive(Clone, Debug)]
pub struct CostStructure<CF: CostValue> {
    /// Aggregated cost: `hard_weight * hard + soft`.
    pub total: CF,
    /// Client-weighted aggregate, used by adaptive weighting schemes. Equal to `total` when no
    /// weights are supplied.
    pub weighted: f64,
    /// Aggregate of the hard (violations) components.
    pub hard: CF,
    /// Aggregate of the soft (objective) components.
    pub soft: CF,
    /// Unaggregated per-component values, indexed by component registration order.
    pub components: Vec<CF>,
}

impl<CF: CostValue> CostStructure<CF> {
    /// Build a cost structure from all of its fields.
    pub fn new(total: CF, weighted: f64, hard: CF, soft: CF, components: Vec<CF>) -> Self {
        Self { total, weighted, hard, soft, components }
    }

    /// The neutral cost over `components` registered components.
    pub fn zero(components: usize) -> Self {
        Self {
            total: CF::ZERO,
            weighted: 0.0,
            hard: CF::ZERO,
            soft: CF::ZERO,
            components: vec![CF::ZERO; components],
        }
    }

    /// The "no valid result" marker over `components` registered components.
    pub fn infinity(components: usize) -> Self {
        Self {
            total: CF::INFINITY,
            weighted: f64::INFINITY,
            hard: CF::INFINITY,
            soft: CF::INFINITY,
            components: vec![CF::INFINITY; components],
        }
    }

    /// Whether this cost is the "no valid result" marker.
    pub fn is_infinite(&self) -> bool {
        self.total.is_infinite_cost()
    }

    /// Hierarchical comparison used when promoting the current state into the best one: the hard
    /// aggregate takes precedence, the total breaks ties.
    pub fn improves(&self, incumbent: &Self) -> bool {
        self.hard < incumbent.hard || (self.hard == incumbent.hard && self.total < incumbent.total)
    }
}

impl<CF: CostValue> AddAssign<&CostStructure<CF>> for CostStructure<CF> {
    fn add_assign(&mut self, rhs: &CostStructure<CF>) {
        self.total += rhs.total;
        self.weighted += rhs.weighted;
        self.hard += rhs.hard;
        self.soft += rhs.soft;
        if self.components.len() < rhs.components.len() {
            self.components.resize(rhs.components.len(), CF::ZERO);
        }
        for (c, r) in self.components.iter_mut().zip(rhs.components.iter()) {
            *c += *r;
        }
    }
}

impl<CF: CostValue> AddAssign<CostStructure<CF>> for CostStructure<CF> {
    fn add_assign(&mut self, rhs: CostStructure<CF>) {
        *self += &rhs;
    }
}

impl<CF: CostValue> SubAssign<&CostStructure<CF>> for CostStructure<CF> {
    fn sub_assign(&mut self, rhs: &CostStructure<CF>) {
        self.total -= rhs.total;
        self.weighted -= rhs.weighted;
        self.hard -= rhs.hard;
        self.soft -= rhs.soft;
        if self.components.len() < rhs.components.len() {
            self.components.resize(rhs.components.len(), CF::ZERO);
        }
        for (c, r) in self.components.iter_mut().zip(rhs.components.iter()) {
            *c -= *r;
        }
    }
}

impl<CF: CostValue> SubAssign<CostStructure<CF>> for CostStructure<CF> {
    fn sub_assign(&mut self, rhs: CostStructure<CF>) {
        *self -= &rhs;
    }
}

impl<CF: CostValue> Add for CostStructure<CF> {
    type Output = CostStructure<CF>;

    fn add(mut self, rhs: CostStructure<CF>) -> Self::Output {
        self += &rhs;
        self
    }
}

impl<CF: CostValue> Sub for CostStructure<CF> {
    type Output = CostStructure<CF>;

    fn sub(mut self, rhs: CostStructure<CF>) -> Self::Output {
        self -= &rhs;
        self
    }
}

impl<CF: CostValue> PartialEq for CostStructure<CF> {
    fn eq(&self, other: &Self) -> bool {
        self.total == other.total
    }
}

impl<CF: CostValue> PartialOrd for CostStructure<CF> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.total.partial_cmp(&other.total)
    }
}

impl<CF: CostValue> PartialEq<CF> for CostStructure<CF> {
    fn eq(&self, other: &CF) -> bool {
        self.total == *other
    }
}

impl<CF: CostValue> PartialOrd<CF> for CostStructure<CF> {
    fn partial_cmp(&self, other: &CF) -> Option<std::cmp::Ordering> {
        self.total.partial_cmp(other)
    }
}

impl<CF: CostValue> fmt::Display for CostStructure<CF> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (hard: {}, soft: {}) [{}]",
            self.total,
            self.hard,
            self.soft,
            self.components.iter().map(|c| c.to_string()).join(", ")
        )
    }
}
