// Copyright 2026 The Apz Developers
//
//    Licensed under the Apache License, Version 2.0 (the "License");
//    you may not use this file except in compliance with the License.
//    You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
//    Unless required by applicable law or agreed to in writing, software
//    distributed under the License is distributed on an "AS IS" BASIS,
//    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//    See the License for the specific language governing permissions and
//    limitations under the License.

use std::fmt;
use std::ops::{Add, Not, Sub};

/**
 * A single 64-bit digit of a multi-precision integer.
 *
 * The carry-chain helpers return carries and borrows as limbs in `{0, 1}` so
 * they can be folded straight back into the chain. `Add` and `Sub` on limbs
 * wrap, matching the modular arithmetic the kernels are written in.
 */
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Limb(pub u64);

impl Limb {
    pub const ZERO: Limb = Limb(0);
    pub const ONE: Limb = Limb(1);
    pub const MAX: Limb = Limb(u64::MAX);

    /// Number of bits in a limb.
    pub const BITS: usize = 64;

    /**
     * Adds `other` to the value, returning the result and a carry limb in
     * `{0, 1}`.
     */
    #[inline(always)]
    pub fn add_overflow(self, other: Limb) -> (Limb, Limb) {
        let (sum, carry) = self.0.overflowing_add(other.0);
        (Limb(sum), Limb(carry as u64))
    }

    /**
     * Subtracts `other` from the value, returning the result and a borrow
     * limb in `{0, 1}`.
     */
    #[inline(always)]
    pub fn sub_overflow(self, other: Limb) -> (Limb, Limb) {
        let (diff, borrow) = self.0.overflowing_sub(other.0);
        (Limb(diff), Limb(borrow as u64))
    }

    /**
     * Multiplies the value by `other`, returning the high and low limbs of
     * the 128-bit product.
     */
    #[inline(always)]
    pub fn mul_hilo(self, other: Limb) -> (Limb, Limb) {
        let wide = (self.0 as u128) * (other.0 as u128);
        (Limb((wide >> Limb::BITS) as u64), Limb(wide as u64))
    }
}

impl Add for Limb {
    type Output = Limb;

    #[inline(always)]
    fn add(self, other: Limb) -> Limb {
        Limb(self.0.wrapping_add(other.0))
    }
}

impl Sub for Limb {
    type Output = Limb;

    #[inline(always)]
    fn sub(self, other: Limb) -> Limb {
        Limb(self.0.wrapping_sub(other.0))
    }
}

impl Not for Limb {
    type Output = Limb;

    #[inline(always)]
    fn not(self) -> Limb {
        Limb(!self.0)
    }
}

impl From<u64> for Limb {
    #[inline]
    fn from(v: u64) -> Limb {
        Limb(v)
    }
}

impl fmt::Debug for Limb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

impl fmt::Display for Limb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
