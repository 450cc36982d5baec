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

//! Arbitrary-precision signed integers over 64-bit limbs.
//!
//! The limb-level kernels (carry-chained add/subtract, schoolbook and
//! Karatsuba multiplication) live in [`ll`] and operate on borrowed slices;
//! [`int::Apz`] owns a limb buffer, dispatches signed arithmetic onto those
//! kernels and reports allocation failures as [`Error::Oom`] instead of
//! aborting.

pub mod error;
pub mod int;
pub mod ll;
pub mod mem;

// Re-exports

pub use error::{Error, Result};
pub use int::{Apz, RandomApz};
pub use ll::limb::Limb;
pub use mem::{AllocFn, AllocHooks, FreeFn, ReallocFn};
