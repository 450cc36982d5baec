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

//! The owning signed integer and its arithmetic dispatch.
//!
//! `Apz` owns a buffer of limbs together with the allocator hooks the buffer
//! came from. The signed operations order operands by magnitude, grow the
//! destination, run the matching absolute kernel from `ll` and then fix up
//! length and sign, keeping the representation trimmed and zero positive.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::ptr::NonNull;
use std::slice;

use num_traits::{One, Zero};
use rand::Rng;

use crate::error::{Error, Result};
use crate::ll::{self, limb::Limb};
use crate::mem::{self, AllocHooks, Scratch};

/// Largest power of ten below `2^64`; decimal assignment folds digits in
/// chunks of this size.
const POW_10_19: u64 = 10_000_000_000_000_000_000;
const DEC_CHUNK: usize = 19;

/// A signed arbitrary-precision integer.
///
/// Stored as little-endian 64-bit limbs with a separate sign flag. The
/// representation is kept trimmed: `len == 0` exactly for zero (always
/// positive), otherwise the top limb in use is non-zero. Limbs between `len`
/// and `cap` are scratch.
pub struct Apz {
    ptr: NonNull<Limb>,
    cap: usize,
    len: usize,
    neg: bool,
    hooks: AllocHooks,
}

// The buffer is exclusively owned and the hooks are plain function pointers,
// so distinct instances can move between and be shared across threads.
unsafe impl Send for Apz {}
unsafe impl Sync for Apz {}

impl Apz {
    /// Creates a non-negative integer with `cap >= 1` limbs of storage and
    /// `v` in the least-significant limb.
    pub fn init_pos(cap: usize, v: u64) -> Result<Apz> {
        Apz::init_in(AllocHooks::system(), cap, v, false)
    }

    /// Creates `-v` with `cap >= 1` limbs of storage. A zero `v` still
    /// produces positive zero.
    pub fn init_neg(cap: usize, v: u64) -> Result<Apz> {
        Apz::init_in(AllocHooks::system(), cap, v, true)
    }

    /// `init_pos` through a custom allocator triple; the hooks are remembered
    /// for every later grow and for release.
    pub fn init_pos_in(hooks: AllocHooks, cap: usize, v: u64) -> Result<Apz> {
        Apz::init_in(hooks, cap, v, false)
    }

    /// `init_neg` through a custom allocator triple.
    pub fn init_neg_in(hooks: AllocHooks, cap: usize, v: u64) -> Result<Apz> {
        Apz::init_in(hooks, cap, v, true)
    }

    fn init_in(hooks: AllocHooks, cap: usize, v: u64, neg: bool) -> Result<Apz> {
        assert!(cap >= 1, "capacity must be at least one limb");

        let ptr = hooks.alloc_limbs(cap)?;
        unsafe { ptr.as_ptr().write(Limb(v)) };
        Ok(Apz {
            ptr,
            cap,
            len: (v != 0) as usize,
            neg: neg && v != 0,
            hooks,
        })
    }

    /// Limbs currently in use.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Limbs allocated.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.neg
    }

    /// The significant limbs, least significant first.
    #[inline]
    pub fn limbs(&self) -> &[Limb] {
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// The full allocated storage.
    #[inline]
    fn storage_mut(&mut self) -> &mut [Limb] {
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.cap) }
    }

    /// Ensures at least `new_cap` limbs of storage. Growth reallocates to
    /// `max(new_cap, cap * 3/2 + 8)` and zero-fills the new tail; the value
    /// is untouched either way. On `Oom` the integer keeps its prior state.
    pub fn grow(&mut self, new_cap: usize) -> Result<()> {
        if self.cap >= new_cap {
            return Ok(());
        }
        let target = new_cap.max(self.cap * 3 / 2 + 8);
        let ptr = self.hooks.realloc_limbs(self.ptr, self.cap, target)?;
        unsafe { ptr.as_ptr().add(self.cap).write_bytes(0, target - self.cap) };
        self.ptr = ptr;
        self.cap = target;
        Ok(())
    }

    /// Shrinks the storage to the limbs in use (at least one limb).
    pub fn shrink_fit(&mut self) -> Result<()> {
        let target = self.len.max(1);
        if target == self.cap {
            return Ok(());
        }
        let ptr = self.hooks.realloc_limbs(self.ptr, self.cap, target)?;
        self.ptr = ptr;
        self.cap = target;
        Ok(())
    }

    /// Sets the value to zero, keeping the storage.
    pub fn reset(&mut self) {
        ll::zero(self.storage_mut());
        self.len = 0;
        self.neg = false;
    }

    /// `self = src`, growing if needed.
    pub fn copy_from(&mut self, src: &Apz) -> Result<()> {
        self.grow(src.len)?;
        self.reset();
        let len = src.len;
        self.storage_mut()[..len].copy_from_slice(src.limbs());
        self.len = len;
        self.neg = src.neg;
        Ok(())
    }

    /// Compares magnitudes, ignoring signs.
    #[inline]
    pub fn cmp_abs(&self, other: &Apz) -> Ordering {
        ll::cmp(self.limbs(), other.limbs())
    }

    /// Upper bound on the result limbs of an addition or subtraction.
    #[inline]
    pub fn limit_add(&self, other: &Apz) -> usize {
        self.len.max(other.len) + 1
    }

    /// Upper bound on the result limbs of a multiplication.
    #[inline]
    pub fn limit_mul(&self, other: &Apz) -> usize {
        self.len + other.len
    }

    /// Upper bound on the result limbs of a squaring.
    #[inline]
    pub fn limit_sqr(&self) -> usize {
        2 * self.len
    }

    /// Upper bound on the result limbs of `self` raised to `other`.
    #[inline]
    pub fn limit_exp(&self, other: &Apz) -> usize {
        self.len * other.len
    }

    /// `self = a + b`.
    pub fn add(&mut self, a: &Apz, b: &Apz) -> Result<()> {
        self.addsub_signed(a, a.neg, b, b.neg)
    }

    /// `self = a - b`, which is signed addition with `b`'s sign flipped.
    pub fn sub(&mut self, a: &Apz, b: &Apz) -> Result<()> {
        self.addsub_signed(a, a.neg, b, b.len != 0 && !b.neg)
    }

    fn addsub_signed(&mut self, a: &Apz, a_neg: bool, b: &Apz, b_neg: bool) -> Result<()> {
        let ord = ll::cmp(a.limbs(), b.limbs());
        let (mx, mx_neg, mn, mn_neg) = if ord == Ordering::Less {
            (b.limbs(), b_neg, a.limbs(), a_neg)
        } else {
            (a.limbs(), a_neg, b.limbs(), b_neg)
        };
        let n = mx.len();

        if mx_neg == mn_neg {
            self.grow(n + 1)?;
            self.reset();
            let mut len = n;
            {
                let storage = self.storage_mut();
                let carry = ll::add(&mut storage[..n], mx, mn);
                if carry != Limb::ZERO {
                    storage[n] = carry;
                    len += 1;
                }
            }
            self.len = len;
            self.neg = mx_neg && len != 0;
        } else {
            self.grow(n)?;
            self.reset();
            let len = {
                let storage = self.storage_mut();
                let borrow = ll::sub(&mut storage[..n], mx, mn);
                debug_assert_eq!(borrow, Limb::ZERO);
                ll::trim(&storage[..n])
            };
            self.len = len;
            self.neg = mx_neg && len != 0;
        }
        Ok(())
    }

    /// `self = a + v`.
    pub fn add_u64(&mut self, a: &Apz, v: u64) -> Result<()> {
        self.scalar_combine(a, a.neg, v, false)
    }

    /// `self = a - v`.
    pub fn sub_u64(&mut self, a: &Apz, v: u64) -> Result<()> {
        self.scalar_combine(a, a.neg, v, true)
    }

    /// `self = v - a`.
    pub fn u64_sub(&mut self, v: u64, a: &Apz) -> Result<()> {
        self.scalar_combine(a, !a.neg, v, false)
    }

    /// Combines `a` (with its sign overridden to `a_neg`) and the scalar
    /// `±v`. The four public scalar operations are sign arrangements of this.
    fn scalar_combine(&mut self, a: &Apz, a_neg: bool, v: u64, v_neg: bool) -> Result<()> {
        let a_neg = a.len != 0 && a_neg;
        let v_neg = v != 0 && v_neg;

        if a.len == 0 {
            self.grow(1)?;
            self.reset();
            self.storage_mut()[0] = Limb(v);
            self.len = (v != 0) as usize;
            self.neg = v_neg;
            return Ok(());
        }

        if a_neg == v_neg {
            self.grow(a.len + 1)?;
            self.reset();
            let n = a.len;
            let mut len = n;
            {
                let storage = self.storage_mut();
                let carry = ll::add_1(&mut storage[..n], a.limbs(), Limb(v));
                if carry != Limb::ZERO {
                    storage[n] = carry;
                    len += 1;
                }
            }
            self.len = len;
            self.neg = a_neg;
        } else if a.len == 1 && a.limbs()[0].0 < v {
            // The scalar dominates a single-limb magnitude; the result flips
            // to the scalar's side.
            self.grow(1)?;
            self.reset();
            let diff = v - a.limbs()[0].0;
            self.storage_mut()[0] = Limb(diff);
            self.len = 1;
            self.neg = v_neg;
        } else {
            self.grow(a.len)?;
            self.reset();
            let n = a.len;
            let len = {
                let storage = self.storage_mut();
                let borrow = ll::sub_1(&mut storage[..n], a.limbs(), Limb(v));
                debug_assert_eq!(borrow, Limb::ZERO);
                ll::trim(&storage[..n])
            };
            self.len = len;
            self.neg = a_neg && len != 0;
        }
        Ok(())
    }

    /// `self = a * b`. Equal operand sizes above `KARATSUBA_THRESHOLD` route
    /// through the Karatsuba kernel with scratch allocated from this
    /// integer's hooks; everything else goes through the schoolbook kernel.
    pub fn mul(&mut self, a: &Apz, b: &Apz) -> Result<()> {
        if a.len == 0 || b.len == 0 {
            self.reset();
            return Ok(());
        }
        let need = a.len + b.len;
        self.grow(need)?;
        let neg = a.neg != b.neg;

        let len = if a.len == b.len && a.len > ll::KARATSUBA_THRESHOLD {
            // Allocate before mutating so an Oom leaves the value intact.
            let mut ws = Scratch::new_in(self.hooks, ll::kara_scratch_len(a.len()))?;
            self.reset();
            let storage = self.storage_mut();
            ll::mul_kara(&mut storage[..need], a.limbs(), b.limbs(), ws.as_mut_slice());
            ll::trim(&storage[..need])
        } else {
            self.reset();
            let storage = self.storage_mut();
            if a.len <= b.len {
                ll::mul_basecase(&mut storage[..need], a.limbs(), b.limbs());
            } else {
                ll::mul_basecase(&mut storage[..need], b.limbs(), a.limbs());
            }
            ll::trim(&storage[..need])
        };
        self.len = len;
        self.neg = neg && len != 0;
        Ok(())
    }

    /// `self = a * v`.
    pub fn mul_u64_pos(&mut self, a: &Apz, v: u64) -> Result<()> {
        self.scalar_mul(a, v, false)
    }

    /// `self = a * -v`.
    pub fn mul_u64_neg(&mut self, a: &Apz, v: u64) -> Result<()> {
        self.scalar_mul(a, v, true)
    }

    fn scalar_mul(&mut self, a: &Apz, v: u64, v_neg: bool) -> Result<()> {
        if a.len == 0 || v == 0 {
            self.reset();
            return Ok(());
        }
        self.grow(a.len + 1)?;
        self.reset();
        let n = a.len;
        let len = {
            let storage = self.storage_mut();
            ll::mul_1(&mut storage[..n + 1], a.limbs(), Limb(v));
            ll::trim(&storage[..n + 1])
        };
        self.len = len;
        self.neg = (a.neg != v_neg) && len != 0;
        Ok(())
    }

    /// Assigns from ASCII hex digits with an optional leading `-`. Sixteen
    /// digits pack into each limb from the least-significant end. Malformed
    /// or empty input leaves the value untouched and reports `Math`.
    pub fn set_from_hex(&mut self, s: &[u8]) -> Result<()> {
        let (neg, digits) = match s.split_first() {
            Some((&b'-', rest)) => (true, rest),
            _ => (false, s),
        };
        if digits.is_empty() || !digits.iter().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::Math);
        }

        let nlimbs = (digits.len() + 15) / 16;
        self.grow(nlimbs)?;
        self.reset();
        let len = {
            let storage = self.storage_mut();
            for (i, chunk) in digits.rchunks(16).enumerate() {
                let chunk = std::str::from_utf8(chunk).map_err(|_| Error::Math)?;
                storage[i] = Limb(u64::from_str_radix(chunk, 16).map_err(|_| Error::Math)?);
            }
            ll::trim(&storage[..nlimbs])
        };
        self.len = len;
        self.neg = neg && len != 0;
        Ok(())
    }

    /// Assigns from ASCII decimal digits with an optional leading `-`.
    /// Digits fold left to right in chunks of up to nineteen:
    /// `value = value * 10^k + chunk`.
    pub fn set_from_dec(&mut self, s: &[u8]) -> Result<()> {
        let (neg, digits) = match s.split_first() {
            Some((&b'-', rest)) => (true, rest),
            _ => (false, s),
        };
        if digits.is_empty() || !digits.iter().all(|b| b.is_ascii_digit()) {
            return Err(Error::Math);
        }

        self.grow(digits.len() / DEC_CHUNK + 2)?;
        self.reset();
        let mut used = 0;
        {
            let storage = self.storage_mut();
            let head = digits.len() % DEC_CHUNK;
            let (first, tail) = digits.split_at(head);
            let chunks = (!first.is_empty())
                .then_some(first)
                .into_iter()
                .chain(tail.chunks(DEC_CHUNK));
            for chunk in chunks {
                let text = std::str::from_utf8(chunk).map_err(|_| Error::Math)?;
                let val: u64 = text.parse().map_err(|_| Error::Math)?;
                let scale = if chunk.len() == DEC_CHUNK {
                    POW_10_19
                } else {
                    10u64.pow(chunk.len() as u32)
                };

                let carry = ll::mul_1_in_place(&mut storage[..used], Limb(scale));
                if carry != Limb::ZERO {
                    storage[used] = carry;
                    used += 1;
                }
                let carry = ll::add_1_in_place(&mut storage[..used], Limb(val));
                if carry != Limb::ZERO {
                    storage[used] = carry;
                    used += 1;
                }
            }
            used = ll::trim(&storage[..used]);
        }
        self.len = used;
        self.neg = neg && used != 0;
        Ok(())
    }
}

impl Drop for Apz {
    fn drop(&mut self) {
        self.hooks.free_limbs(self.ptr, self.cap);
    }
}

impl Clone for Apz {
    fn clone(&self) -> Apz {
        let cap = self.len.max(1);
        let ptr = match self.hooks.alloc_limbs(cap) {
            Ok(ptr) => ptr,
            Err(_) => mem::alloc_failure(),
        };
        unsafe {
            std::ptr::copy_nonoverlapping(self.ptr.as_ptr(), ptr.as_ptr(), self.len);
        }
        Apz {
            ptr,
            cap,
            len: self.len,
            neg: self.neg,
            hooks: self.hooks,
        }
    }
}

impl PartialEq for Apz {
    fn eq(&self, other: &Apz) -> bool {
        self.neg == other.neg && self.limbs() == other.limbs()
    }
}

impl Eq for Apz {}

impl PartialOrd for Apz {
    fn partial_cmp(&self, other: &Apz) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Apz {
    fn cmp(&self, other: &Apz) -> Ordering {
        match (self.neg, other.neg) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.cmp_abs(other),
            (true, true) => other.cmp_abs(self),
        }
    }
}

impl fmt::Debug for Apz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Apz")
            .field("neg", &self.neg)
            .field("limbs", &self.limbs())
            .finish()
    }
}

impl fmt::LowerHex for Apz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.neg {
            write!(f, "-")?;
        }
        match self.limbs().split_last() {
            None => write!(f, "0"),
            Some((top, rest)) => {
                write!(f, "{:x}", top.0)?;
                for l in rest.iter().rev() {
                    write!(f, "{:016x}", l.0)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::UpperHex for Apz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.neg {
            write!(f, "-")?;
        }
        match self.limbs().split_last() {
            None => write!(f, "0"),
            Some((top, rest)) => {
                write!(f, "{:X}", top.0)?;
                for l in rest.iter().rev() {
                    write!(f, "{:016X}", l.0)?;
                }
                Ok(())
            }
        }
    }
}

impl From<u64> for Apz {
    fn from(v: u64) -> Apz {
        match Apz::init_pos(1, v) {
            Ok(z) => z,
            Err(_) => mem::alloc_failure(),
        }
    }
}

impl From<i64> for Apz {
    fn from(v: i64) -> Apz {
        let r = if v < 0 {
            Apz::init_neg(1, v.unsigned_abs())
        } else {
            Apz::init_pos(1, v as u64)
        };
        match r {
            Ok(z) => z,
            Err(_) => mem::alloc_failure(),
        }
    }
}

impl Neg for Apz {
    type Output = Apz;

    fn neg(mut self) -> Apz {
        self.neg = self.len != 0 && !self.neg;
        self
    }
}

impl Neg for &Apz {
    type Output = Apz;

    fn neg(self) -> Apz {
        -self.clone()
    }
}

impl Add<&Apz> for &Apz {
    type Output = Apz;

    fn add(self, other: &Apz) -> Apz {
        let mut r = match Apz::init_pos_in(self.hooks, self.limit_add(other), 0) {
            Ok(r) => r,
            Err(_) => mem::alloc_failure(),
        };
        match Apz::add(&mut r, self, other) {
            Ok(()) => r,
            Err(_) => mem::alloc_failure(),
        }
    }
}

impl Add for Apz {
    type Output = Apz;

    fn add(self, other: Apz) -> Apz {
        &self + &other
    }
}

impl Sub<&Apz> for &Apz {
    type Output = Apz;

    fn sub(self, other: &Apz) -> Apz {
        let mut r = match Apz::init_pos_in(self.hooks, self.limit_add(other), 0) {
            Ok(r) => r,
            Err(_) => mem::alloc_failure(),
        };
        match Apz::sub(&mut r, self, other) {
            Ok(()) => r,
            Err(_) => mem::alloc_failure(),
        }
    }
}

impl Sub for Apz {
    type Output = Apz;

    fn sub(self, other: Apz) -> Apz {
        &self - &other
    }
}

impl Mul<&Apz> for &Apz {
    type Output = Apz;

    fn mul(self, other: &Apz) -> Apz {
        let mut r = match Apz::init_pos_in(self.hooks, self.limit_mul(other).max(1), 0) {
            Ok(r) => r,
            Err(_) => mem::alloc_failure(),
        };
        match Apz::mul(&mut r, self, other) {
            Ok(()) => r,
            Err(_) => mem::alloc_failure(),
        }
    }
}

impl Mul for Apz {
    type Output = Apz;

    fn mul(self, other: Apz) -> Apz {
        &self * &other
    }
}

impl Zero for Apz {
    fn zero() -> Apz {
        Apz::from(0u64)
    }

    fn is_zero(&self) -> bool {
        self.len == 0
    }
}

impl One for Apz {
    fn one() -> Apz {
        Apz::from(1u64)
    }
}

/// Extension trait for drawing random integers from any [`rand::Rng`].
pub trait RandomApz {
    /// A uniform magnitude of up to `limbs` limbs with a random sign. The
    /// result is trimmed, so the actual length can be smaller.
    fn gen_apz(&mut self, limbs: usize) -> Apz;
}

impl<R: Rng + ?Sized> RandomApz for R {
    fn gen_apz(&mut self, limbs: usize) -> Apz {
        let mut z = match Apz::init_pos(limbs.max(1), 0) {
            Ok(z) => z,
            Err(_) => mem::alloc_failure(),
        };
        let len = {
            let storage = z.storage_mut();
            for l in storage[..limbs].iter_mut() {
                *l = Limb(self.gen());
            }
            ll::trim(&storage[..limbs])
        };
        z.len = len;
        z.neg = len != 0 && self.gen::<bool>();
        z
    }
}
