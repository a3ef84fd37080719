// Copyright 2025 Granite Labs
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;

pub type Result<T, E = AuthError> = std::result::Result<T, E>;

/// Errors surfaced by the authorization graph.
///
/// All of them are raised synchronously at the call site and abort only
/// the failing operation; a failing step never commits partial state.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),
    #[error("{0} with name {1} exists")]
    Duplicated(&'static str, String),
    #[error("{grantee} has no privileges on {object}")]
    NoPrivileges { grantee: String, object: String },
    #[error("role {role} has already been granted to {grantee}")]
    AlreadyGranted { role: String, grantee: String },
    #[error("role {role} has not been granted to {grantee}")]
    NotGranted { role: String, grantee: String },
    #[error("granting role {role} to {grantee} creates a cycle in the grantee graph")]
    CycleDetected { role: String, grantee: String },
    #[error("authorization graph invariant violated: {0}")]
    InvariantViolated(String),
}
