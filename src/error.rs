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

//! Status codes returned by fallible operations.

/// Errors a bignum operation can report.
///
/// Precondition violations (zero capacity, mixed allocator install, absolute
/// subtraction of a larger magnitude) are programming errors and panic instead
/// of returning a value of this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The allocator hooks reported an allocation or reallocation failure.
    /// The destination is left in a documented, valid state.
    #[error("out of memory")]
    Oom,
    /// Arithmetic domain error; currently produced only by malformed string
    /// assignment.
    #[error("math domain error")]
    Math,
}

pub type Result<T> = std::result::Result<T, Error>;
