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

//! Memory plumbing: the allocator hook triple and a temporary limb buffer.
//!
//! Every `Apz` records the hooks its buffer was allocated with and releases
//! through the same triple, so custom allocators never see foreign pointers.

use std::alloc::{self, Layout};
use std::mem::{align_of, size_of};
use std::ptr::NonNull;
use std::slice;

use crate::error::{Error, Result};
use crate::ll::limb::Limb;

/// Allocates `bytes` bytes aligned for limbs. Returns null on failure.
pub type AllocFn = unsafe fn(bytes: usize) -> *mut u8;

/// Reallocates a buffer previously produced by the paired alloc/realloc hook.
/// Unlike C `realloc`, the old size is passed in (Rust's allocator requires
/// it). Returns null on failure, leaving the old buffer valid.
pub type ReallocFn = unsafe fn(ptr: *mut u8, old_bytes: usize, new_bytes: usize) -> *mut u8;

/// Releases a buffer previously produced by the paired alloc/realloc hook.
pub type FreeFn = unsafe fn(ptr: *mut u8, bytes: usize);

#[inline]
fn limb_layout(bytes: usize) -> Layout {
    debug_assert!(bytes > 0 && bytes % size_of::<Limb>() == 0);
    // Size and alignment are valid by construction: callers only pass
    // non-zero multiples of the limb size.
    unsafe { Layout::from_size_align_unchecked(bytes, align_of::<Limb>()) }
}

unsafe fn heap_alloc(bytes: usize) -> *mut u8 {
    alloc::alloc(limb_layout(bytes))
}

unsafe fn heap_realloc(ptr: *mut u8, old_bytes: usize, new_bytes: usize) -> *mut u8 {
    alloc::realloc(ptr, limb_layout(old_bytes), new_bytes)
}

unsafe fn heap_free(ptr: *mut u8, bytes: usize) {
    alloc::dealloc(ptr, limb_layout(bytes))
}

/**
 * The allocate/reallocate/release triple backing a bignum's limb buffer.
 *
 * Either all three hooks are defaulted (process heap) or all three are
 * supplied; a mixed install is a programming error and panics.
 */
#[derive(Clone, Copy)]
pub struct AllocHooks {
    alloc: AllocFn,
    realloc: ReallocFn,
    free: FreeFn,
}

impl AllocHooks {
    /// The process-heap triple.
    pub const fn system() -> AllocHooks {
        AllocHooks {
            alloc: heap_alloc,
            realloc: heap_realloc,
            free: heap_free,
        }
    }

    /// Builds a triple from optional hooks: all `None` binds the defaults,
    /// all `Some` installs the custom triple, anything else panics.
    pub fn new(alloc: Option<AllocFn>, realloc: Option<ReallocFn>, free: Option<FreeFn>) -> AllocHooks {
        match (alloc, realloc, free) {
            (None, None, None) => AllocHooks::system(),
            (Some(alloc), Some(realloc), Some(free)) => AllocHooks { alloc, realloc, free },
            _ => panic!("allocator hooks must be installed all together or not at all"),
        }
    }

    /// Allocates `n` zero-filled limbs.
    pub(crate) fn alloc_limbs(&self, n: usize) -> Result<NonNull<Limb>> {
        debug_assert!(n > 0);
        let bytes = n * size_of::<Limb>();
        let ptr = unsafe { (self.alloc)(bytes) };
        match NonNull::new(ptr as *mut Limb) {
            Some(ptr) => {
                unsafe { ptr.as_ptr().write_bytes(0, n) };
                Ok(ptr)
            }
            None => {
                log::error!("allocation of {} limbs failed", n);
                Err(Error::Oom)
            }
        }
    }

    /// Reallocates a limb buffer from `old_n` to `new_n` limbs. The tail is
    /// left uninitialised when growing; callers zero it.
    pub(crate) fn realloc_limbs(
        &self,
        ptr: NonNull<Limb>,
        old_n: usize,
        new_n: usize,
    ) -> Result<NonNull<Limb>> {
        debug_assert!(old_n > 0 && new_n > 0);
        let ptr = unsafe {
            (self.realloc)(
                ptr.as_ptr() as *mut u8,
                old_n * size_of::<Limb>(),
                new_n * size_of::<Limb>(),
            )
        };
        match NonNull::new(ptr as *mut Limb) {
            Some(ptr) => Ok(ptr),
            None => {
                log::error!("reallocation to {} limbs failed", new_n);
                Err(Error::Oom)
            }
        }
    }

    pub(crate) fn free_limbs(&self, ptr: NonNull<Limb>, n: usize) {
        debug_assert!(n > 0);
        unsafe { (self.free)(ptr.as_ptr() as *mut u8, n * size_of::<Limb>()) };
    }
}

impl Default for AllocHooks {
    fn default() -> AllocHooks {
        AllocHooks::system()
    }
}

/// Diverges on an allocation failure in a context that cannot report `Oom`
/// (`Clone`, operator sugar, trait constructors).
pub(crate) fn alloc_failure() -> ! {
    alloc::handle_alloc_error(Layout::new::<Limb>())
}

/**
 * A temporary, zero-filled limb buffer released on drop. Used for the
 * Karatsuba scratch region.
 */
pub struct Scratch {
    ptr: NonNull<Limb>,
    len: usize,
    hooks: AllocHooks,
}

impl Scratch {
    /// Allocates `len` limbs from the process heap, aborting on failure.
    pub fn new(len: usize) -> Scratch {
        match Scratch::new_in(AllocHooks::system(), len) {
            Ok(ws) => ws,
            Err(_) => alloc_failure(),
        }
    }

    /// Allocates `len` limbs through `hooks`.
    pub fn new_in(hooks: AllocHooks, len: usize) -> Result<Scratch> {
        let ptr = if len == 0 {
            NonNull::dangling()
        } else {
            hooks.alloc_limbs(len)?
        };
        Ok(Scratch { ptr, len, hooks })
    }

    pub fn as_mut_slice(&mut self) -> &mut [Limb] {
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        if self.len > 0 {
            self.hooks.free_limbs(self.ptr, self.len);
        }
    }
}
