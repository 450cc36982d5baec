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

use std::cmp::Ordering;

use super::addsub::{add_1_in_place, add_in_place, add_n_in_place, neg_in_place, sub, sub_in_place};
use super::limb::Limb;
use super::{cmp, is_zero, trimmed, zero};
use crate::mem;

/// Operand size below which the schoolbook multiplier beats Karatsuba.
/// Chosen by benchmark; the recursive worker takes it as a parameter so the
/// crossover can be tuned without touching the algorithm.
pub const KARATSUBA_THRESHOLD: usize = 32;

/**
 * Multiplies the magnitude `a` by the single limb `v`, accumulating the
 * product into `r`. `r` must hold `a.len() + 1` limbs; the final high word
 * lands in the extra limb. Callers computing a plain product zero `r` first.
 */
pub fn mul_1(r: &mut [Limb], a: &[Limb], v: Limb) {
    debug_assert!(r.len() == a.len() + 1);

    let mut cl = Limb::ZERO;
    for (i, &al) in a.iter().enumerate() {
        let (hpl, lpl) = al.mul_hilo(v);
        let (lpl, carry) = lpl.add_overflow(cl);
        let hpl = hpl + carry;
        let (sum, carry) = r[i].add_overflow(lpl);
        r[i] = sum;
        cl = hpl + carry;
    }

    let (top, carry) = r[a.len()].add_overflow(cl);
    r[a.len()] = top;
    debug_assert_eq!(carry, Limb::ZERO);
}

/**
 * Scales `x` by the single limb `v` in place, returning the high limb of the
 * product.
 */
pub fn mul_1_in_place(x: &mut [Limb], v: Limb) -> Limb {
    let mut cl = Limb::ZERO;
    for xl in x.iter_mut() {
        let (hpl, lpl) = xl.mul_hilo(v);
        let (lpl, carry) = lpl.add_overflow(cl);
        *xl = lpl;
        cl = hpl + carry;
    }
    cl
}

/**
 * Schoolbook multiply of `a` by `b` into `r`, which must hold
 * `a.len() + b.len()` zero-initialised limbs.
 *
 * Each row accumulates `a[i] * b[j]` into `r[i + j]` with three carry
 * sources merged per limb: the low word of the widening multiply, the high
 * word propagated from the previous column, and the addend already in `r`.
 * The merged carry never exceeds one limb, so the chain needs no wider state.
 */
pub fn mul_basecase(r: &mut [Limb], a: &[Limb], b: &[Limb]) {
    debug_assert!(r.len() == a.len() + b.len());

    for (i, &al) in a.iter().enumerate() {
        let mut cl = Limb::ZERO;
        for (j, &bl) in b.iter().enumerate() {
            let (hpl, lpl) = al.mul_hilo(bl);
            let (lpl, carry) = lpl.add_overflow(cl);
            let hpl = hpl + carry;
            let (sum, carry) = r[i + j].add_overflow(lpl);
            r[i + j] = sum;
            cl = hpl + carry;
        }
        let (top, carry) = r[i + b.len()].add_overflow(cl);
        r[i + b.len()] = top;
        debug_assert_eq!(carry, Limb::ZERO);
    }
}

/**
 * Scratch limbs `mul_kara` needs for equal-size-`n` operands: `4 * ceil(n/2)`
 * per recursion level above the threshold. Bounded by `8 * ceil(n/2)` overall.
 */
pub fn kara_scratch_len(n: usize) -> usize {
    scratch_len(n, KARATSUBA_THRESHOLD)
}

fn scratch_len(n: usize, threshold: usize) -> usize {
    let threshold = threshold.max(1);
    if n <= threshold {
        0
    } else {
        let low = (n + 1) / 2;
        4 * low + scratch_len(low, threshold)
    }
}

/**
 * Karatsuba multiply of the equal-size magnitudes `a` and `b` into `r`.
 *
 * `r` must hold `2 * a.len()` zero-initialised limbs and must not overlap the
 * operands (guaranteed by the borrows). `ws` must hold at least
 * `kara_scratch_len(a.len())` limbs; the recursion hands suffixes of the same
 * buffer down and never allocates. `ws` content on entry is irrelevant.
 */
pub fn mul_kara(r: &mut [Limb], a: &[Limb], b: &[Limb], ws: &mut [Limb]) {
    debug_assert!(ws.len() >= kara_scratch_len(a.len()));
    mul_kara_rec(r, a, b, ws, KARATSUBA_THRESHOLD);
}

/// Writes `|x - y|` into `dst`, zero-padding above the difference. `x` and
/// `y` are trimmed; `ord` is their magnitude ordering.
fn abs_diff(dst: &mut [Limb], x: &[Limb], y: &[Limb], ord: Ordering) {
    let (big, small) = if ord == Ordering::Less { (y, x) } else { (x, y) };
    let borrow = sub(&mut dst[..big.len()], big, small);
    debug_assert_eq!(borrow, Limb::ZERO);
    zero(&mut dst[big.len()..]);
}

fn mul_kara_rec(r: &mut [Limb], a: &[Limb], b: &[Limb], ws: &mut [Limb], threshold: usize) {
    let n = a.len();
    let threshold = threshold.max(1);
    debug_assert!(n > 0 && b.len() == n && r.len() == 2 * n);

    if n <= threshold {
        mul_basecase(r, a, b);
        return;
    }

    debug_assert!(is_zero(r));

    // Split at the low-half size L = ceil(n/2); the high halves hold
    // H = n - L <= L limbs.
    let low = (n + 1) / 2;
    let high = n - low;

    let (a0, a1) = a.split_at(low);
    let (b0, b1) = b.split_at(low);

    // P0 = a0*b0 and P2 = a1*b1 land directly in the result. Both recursions
    // run before the workspace regions below are written, so they may clobber
    // all of `ws`.
    {
        let (r_lo, r_hi) = r.split_at_mut(2 * low);
        mul_kara_rec(r_lo, a0, b0, ws, threshold);
        mul_kara_rec(&mut r_hi[..2 * high], a1, b1, ws, threshold);
    }

    let (da, rest) = ws.split_at_mut(low);
    let (db, rest) = rest.split_at_mut(low);
    let (mid, ws_rest) = rest.split_at_mut(2 * low);

    // |a0 - a1| and |b0 - b1|, each compared on the trimmed halves of its own
    // operand.
    let a0t = trimmed(a0);
    let a1t = trimmed(a1);
    let b0t = trimmed(b0);
    let b1t = trimmed(b1);
    let cmp_a = cmp(a0t, a1t);
    let cmp_b = cmp(b0t, b1t);
    abs_diff(da, a0t, a1t, cmp_a);
    abs_diff(db, b0t, b1t, cmp_b);

    // P1 = |a0 - a1| * |b0 - b1| into the middle region, which doubles as
    // the accumulator for M = P0 + P2 - signed_P1 below.
    zero(mid);
    mul_kara_rec(mid, da, db, ws_rest, threshold);

    // M is kept in two's-complement form at modulus β^{2L}. The true M can
    // reach one limb past that modulus; `overflow` recovers the dropped limb
    // from the carry/borrow counts so it can be re-applied at r[3L].
    let p0 = &r[..2 * low];
    let p2 = &r[2 * low..2 * (low + high)];
    let overflow: u64;
    if cmp_a.is_lt() == cmp_b.is_lt() {
        // The difference directions agree, so P1 >= 0 and must be
        // subtracted: M = -(P1 - P0 - P2) under the shared modulus.
        let borrows = sub_in_place(mid, p0).0 + sub_in_place(mid, p2).0;
        neg_in_place(mid);
        let wrapped = if is_zero(mid) { 0 } else { 1 };
        debug_assert!(borrows >= wrapped);
        overflow = borrows - wrapped;
    } else {
        // P1 < 0: M = P1 + P0 + P2.
        overflow = add_in_place(mid, p0).0 + add_in_place(mid, p2).0;
    }
    debug_assert!(overflow <= 1);

    // r += M * β^L, with the overflow limb and the add carry propagated into
    // r[3L..2n]. That tail is empty only when n == 3, where both are
    // provably zero because the full product fits in 2n limbs.
    let carry = add_n_in_place(&mut r[low..3 * low], mid);
    let tail = carry.0 + overflow;
    if tail > 0 {
        let c = add_1_in_place(&mut r[3 * low..], Limb(tail));
        debug_assert_eq!(c, Limb::ZERO);
    }
}

/**
 * Multiplies `a` by `b` into `r`, which must hold `a.len() + b.len()`
 * zero-initialised limbs. Equal sizes above `KARATSUBA_THRESHOLD` go through
 * Karatsuba with lazily allocated scratch (aborting on allocation failure;
 * the fallible path lives in the signed dispatch, which allocates the
 * scratch itself). Everything else goes through the schoolbook kernel with
 * the longer operand driving the inner loop.
 */
pub fn mul(r: &mut [Limb], a: &[Limb], b: &[Limb]) {
    debug_assert!(r.len() == a.len() + b.len());
    debug_assert!(!a.is_empty() && !b.is_empty());

    if a.len() == b.len() && a.len() > KARATSUBA_THRESHOLD {
        let mut ws = mem::Scratch::new(kara_scratch_len(a.len()));
        mul_kara(r, a, b, ws.as_mut_slice());
    } else if a.len() <= b.len() {
        mul_basecase(r, a, b);
    } else {
        mul_basecase(r, b, a);
    }
}

#[cfg(test)]
fn parse_hex(mut s: &str) -> Vec<Limb> {
    let group = Limb::BITS / 4; // 4 bits per hex figure
    let mut res = vec![];
    if s.len() % group != 0 {
        res.push(Limb(u64::from_str_radix(&s[0..(s.len() % group)], 16).unwrap()));
        s = &s[s.len() % group..];
    }
    while !s.is_empty() {
        res.push(Limb(u64::from_str_radix(&s[0..group], 16).unwrap()));
        s = &s[group..];
    }
    res.reverse();
    res
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const M: u64 = u64::MAX;

    fn limbs(xs: &[u64]) -> Vec<Limb> {
        xs.iter().map(|&x| Limb(x)).collect()
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(super::parse_hex("0"), [Limb(0)]);
        assert_eq!(
            super::parse_hex("bfffffffffffffffffffffffffffffc743cd1000000b4fffff"),
            [
                Limb(0xcd1000000b4fffff),
                Limb(0xffffffffffffc743),
                Limb(0xffffffffffffffff),
                Limb(0xbf)
            ]
        );
    }

    #[test]
    fn test_mul_1() {
        for &(a_str, v, x_str) in &[
            ("1", 2, "2"),
            ("10000000000000001", 2, "20000000000000002"),
            ("8000000000000000", 2, "10000000000000000"),
            ("80000000000000008000000000000000", 2, "100000000000000010000000000000000"),
            ("ffffffffffffffff", M, "fffffffffffffffe0000000000000001"),
            (
                "bfffffffffffffffffffffffffffffc743cd1000000b4fffff",
                2,
                "17fffffffffffffffffffffffffffff8e879a200000169ffffe",
            ),
            ("f6baa12c9000000000", 2, "1ed7542592000000000"),
        ] {
            let a = super::parse_hex(a_str);
            let mut r = vec![Limb::ZERO; a.len() + 1];
            mul_1(&mut r, &a, Limb(v));

            let mut expected = super::parse_hex(x_str);
            expected.resize(r.len(), Limb::ZERO);
            assert_eq!(r, expected, "wrong result testing {} * {}", a_str, v);
        }
    }

    #[test]
    fn test_mul_1_accumulates() {
        // r starts at [5, 0]; adding 3 * 4 gives [17, 0].
        let mut r = limbs(&[5, 0]);
        mul_1(&mut r, &[Limb(3)], Limb(4));
        assert_eq!(r, limbs(&[17, 0]));

        // Accumulation carries into the extra limb.
        let mut r = limbs(&[M, 0]);
        mul_1(&mut r, &[Limb(M)], Limb(1));
        assert_eq!(r, limbs(&[M - 1, 1]));
    }

    #[test]
    fn test_mul_1_in_place_matches() {
        let a = super::parse_hex("f6baa12c90000000001234");
        let mut r = vec![Limb::ZERO; a.len() + 1];
        mul_1(&mut r, &a, Limb(0xdead_beef));

        let mut x = a.clone();
        let carry = mul_1_in_place(&mut x, Limb(0xdead_beef));
        x.push(carry);
        assert_eq!(x, r);
    }

    #[test]
    fn test_mul_basecase() {
        for &(x, y, exp) in &[
            (&[0u64, 0] as &[u64], &[0u64, 0] as &[u64], &[0u64, 0, 0, 0] as &[u64]),
            (&[1, 0], &[1, 0], &[1, 0, 0, 0]),
            (&[M, M], &[1, 0], &[M, M, 0, 0]),
            (&[M, M], &[M, M], &[1, 0, M - 1, M]),
            (&[M, M, M], &[M, M, M], &[1, 0, 0, M - 1, M, M]),
            (&[1], &[1, 2, 3], &[1, 2, 3, 0]),
            (&[1], &[1, 2, 3, 4], &[1, 2, 3, 4, 0]),
            (&[0, 2], &[1, 2, 3, 4], &[0, 2, 4, 6, 8, 0]),
        ] {
            let xv = limbs(x);
            let yv = limbs(y);
            let mut r = vec![Limb::ZERO; x.len() + y.len()];
            mul_basecase(&mut r, &xv, &yv);
            assert_eq!(r, limbs(exp), "wrong result testing {:?}*{:?}", x, y);
        }
    }

    #[test]
    fn test_scratch_len() {
        assert_eq!(scratch_len(1, 1), 0);
        assert_eq!(scratch_len(2, 1), 4);
        assert_eq!(scratch_len(3, 1), 12);
        assert_eq!(scratch_len(32, KARATSUBA_THRESHOLD), 0);
        assert_eq!(scratch_len(64, KARATSUBA_THRESHOLD), 128);
        // Stays within the classical 8 * ceil(n/2) bound.
        for n in 1..200 {
            assert!(kara_scratch_len(n) <= 8 * ((n + 1) / 2));
        }
    }

    fn check_kara(a: &[Limb], b: &[Limb], threshold: usize) {
        let n = a.len();
        let mut expected = vec![Limb::ZERO; 2 * n];
        mul_basecase(&mut expected, a, b);

        let mut r = vec![Limb::ZERO; 2 * n];
        let mut ws = vec![Limb(0xa5a5_a5a5_a5a5_a5a5); scratch_len(n, threshold)];
        mul_kara_rec(&mut r, a, b, &mut ws, threshold);
        assert_eq!(
            r, expected,
            "kara mismatch for n={} threshold={} a={:?} b={:?}",
            n, threshold, a, b
        );
    }

    #[test]
    fn test_mul_kara_two_limbs_threshold_one() {
        // (2^128 - 1)^2: exercises the middle-term overflow limb.
        check_kara(&limbs(&[M, M]), &limbs(&[M, M]), 1);
    }

    #[test]
    fn test_mul_kara_fixed_patterns() {
        for thresh in [1, 2, 3, 5] {
            check_kara(&limbs(&[M, M]), &limbs(&[M, M]), thresh);
            check_kara(&limbs(&[M, M, M]), &limbs(&[M, M, M]), thresh);
            check_kara(&limbs(&[0, 0, 1]), &limbs(&[1, 0, 1]), thresh);
            check_kara(&limbs(&[1, 0, 0, 0, 5]), &limbs(&[0, 0, 0, 0, 5]), thresh);
            check_kara(&limbs(&[M, 0, 0, 1]), &limbs(&[0, M, 0, M]), thresh);
            check_kara(
                &limbs(&[0, 0, 0, 0, 0, 0, 0, 1]),
                &limbs(&[1, 0, 0, 0, 0, 0, 0, 0]),
                thresh,
            );
        }
    }

    #[test]
    fn test_mul_kara_matches_basecase_random() {
        let mut rng = StdRng::seed_from_u64(0x5eed_ca5e);
        for n in 1..=24 {
            for thresh in [1, 2, 3, 5] {
                for _ in 0..8 {
                    let a: Vec<Limb> = (0..n).map(|_| Limb(rng.gen())).collect();
                    let b: Vec<Limb> = (0..n).map(|_| Limb(rng.gen())).collect();
                    check_kara(&a, &b, thresh);
                }
            }
        }
    }

    #[test]
    fn test_mul_routes_large_equal_sizes_through_kara() {
        let mut rng = StdRng::seed_from_u64(0xfeed);
        let n = KARATSUBA_THRESHOLD + 9;
        let a: Vec<Limb> = (0..n).map(|_| Limb(rng.gen())).collect();
        let b: Vec<Limb> = (0..n).map(|_| Limb(rng.gen())).collect();

        let mut expected = vec![Limb::ZERO; 2 * n];
        mul_basecase(&mut expected, &a, &b);

        let mut r = vec![Limb::ZERO; 2 * n];
        mul(&mut r, &a, &b);
        assert_eq!(r, expected);
    }

    #[test]
    fn test_mul_unequal_sizes() {
        let a = super::parse_hex("26a00000000000000000000000000000000000000000000b95500009dfffffffffff");
        let b = super::parse_hex("4d4000000000000000172aa00013bffffffffffe");

        let mut wide = vec![Limb::ZERO; a.len() + b.len()];
        mul(&mut wide, &a, &b);
        let mut swapped = vec![Limb::ZERO; a.len() + b.len()];
        mul(&mut swapped, &b, &a);
        assert_eq!(wide, swapped);
    }
}
