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

//! The in-memory authorization graph of the GraniteDB catalog.
//!
//! Principals (users and roles) form a DAG connected by role grants.
//! Each principal carries object-level privilege records; a principal's
//! *effective* privileges are always the union of its *direct*
//! privileges and the effective privileges of every role granted to it.
//! Mutations restore this invariant eagerly and push the change through
//! the downstream subgraph, so privilege checks are single-map lookups.
//!
//! Object keys address three scopes: a specific object, all objects of a
//! type in one database, and all objects of a type everywhere. The
//! scoping is asymmetric on purpose: **queries** promote from the
//! specific key towards the wildcards, but **grants** never cross
//! scopes — granting at `(db, -1, TABLE)` stores exactly that key and
//! nothing else. Forgetting this asymmetry is the most common source of
//! confusion around wildcard privileges.

pub mod error;
pub mod grantee;
pub mod manager;
pub mod object;
pub mod service;

pub use error::{AuthError, Result};
pub use grantee::{DbObjectMap, Grantee, GranteeId, GranteeKind};
pub use manager::GranteeManager;
pub use object::{DbObject, DbObjectKey, DbObjectType};
pub use service::{AuthManagerRef, AuthManagerService};
