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

//! Low-level kernels over borrowed limb slices.
//!
//! Functions here work on raw magnitudes in little-endian limb order and know
//! nothing about signs or allocation. Carries and borrows are explicit limbs
//! in `{0, 1}`; 64×64→128 products go through `Limb::mul_hilo`.

use std::cmp::Ordering;

pub mod addsub;
pub mod limb;
pub mod mul;

pub use self::addsub::{
    add, add_1, add_1_in_place, add_in_place, add_n, add_n_in_place, neg_in_place, sub, sub_1,
    sub_in_place, sub_n,
};
pub use self::mul::{
    kara_scratch_len, mul, mul_1, mul_1_in_place, mul_basecase, mul_kara, KARATSUBA_THRESHOLD,
};

use self::limb::Limb;

/**
 * Compares the magnitudes `a` and `b`. Both must be trimmed; the longer
 * operand wins, equal lengths are scanned from the most significant limb
 * down.
 */
pub fn cmp(a: &[Limb], b: &[Limb]) -> Ordering {
    debug_assert!(a.last() != Some(&Limb::ZERO));
    debug_assert!(b.last() != Some(&Limb::ZERO));

    if a.len() != b.len() {
        return a.len().cmp(&b.len());
    }
    for (x, y) in a.iter().rev().zip(b.iter().rev()) {
        if x != y {
            return x.cmp(y);
        }
    }
    Ordering::Equal
}

/**
 * Returns the number of significant limbs in `x`, discarding leading zeros.
 */
#[inline]
pub fn trim(x: &[Limb]) -> usize {
    let mut n = x.len();
    while n > 0 && x[n - 1] == Limb::ZERO {
        n -= 1;
    }
    n
}

/// View of `x` with leading zero limbs discarded.
#[inline]
pub fn trimmed(x: &[Limb]) -> &[Limb] {
    &x[..trim(x)]
}

#[inline]
pub fn is_zero(x: &[Limb]) -> bool {
    x.iter().all(|&l| l == Limb::ZERO)
}

#[inline]
pub fn zero(x: &mut [Limb]) {
    for l in x.iter_mut() {
        *l = Limb::ZERO;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn cmp_orders_by_length_then_limbs() {
        assert_eq!(cmp(&[Limb(1), Limb(1)], &[Limb(9)]), Ordering::Greater);
        assert_eq!(cmp(&[Limb(9)], &[Limb(1), Limb(1)]), Ordering::Less);
        assert_eq!(cmp(&[Limb(3), Limb(5)], &[Limb(4), Limb(5)]), Ordering::Less);
        assert_eq!(cmp(&[Limb(3), Limb(5)], &[Limb(3), Limb(5)]), Ordering::Equal);
        assert_eq!(cmp(&[], &[]), Ordering::Equal);
        assert_eq!(cmp(&[], &[Limb(1)]), Ordering::Less);
    }

    #[test]
    fn cmp_is_antisymmetric() {
        let pairs: &[(&[Limb], &[Limb])] = &[
            (&[Limb(1)], &[Limb(2)]),
            (&[Limb(7), Limb(1)], &[Limb(7), Limb(1)]),
            (&[], &[Limb(5), Limb(5)]),
        ];
        for &(a, b) in pairs {
            assert_eq!(cmp(a, b), cmp(b, a).reverse());
        }
    }

    #[test]
    fn trim_drops_leading_zeros() {
        assert_eq!(trim(&[Limb(1), Limb(0), Limb(0)]), 1);
        assert_eq!(trim(&[Limb(0), Limb(2), Limb(0)]), 2);
        assert_eq!(trim(&[Limb(0), Limb(0)]), 0);
        assert_eq!(trim(&[]), 0);
        assert_eq!(trimmed(&[Limb(0), Limb(2), Limb(0)]), &[Limb(0), Limb(2)]);
    }
}
