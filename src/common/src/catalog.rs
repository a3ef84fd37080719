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

//! Identifiers shared across the catalog.

/// Identifies a database in the catalog.
pub type DatabaseId = i32;
/// Identifies an object within a database.
pub type ObjectId = i32;
/// Identifies the owning principal of a catalog object.
pub type OwnerId = i32;

/// Sentinel meaning "all objects at this level" when it appears in an
/// object key. Grants made at a wildcard scope never materialize at a
/// narrower one; only the query path promotes across scopes.
pub const WILDCARD_ID: i32 = -1;

pub const DEFAULT_SUPER_USER: &str = "root";
pub const DEFAULT_SUPER_USER_ID: OwnerId = 1;
