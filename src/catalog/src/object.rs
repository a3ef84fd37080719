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

use granite_common::acl::AclModeSet;
use granite_common::catalog::{DatabaseId, ObjectId, OwnerId, WILDCARD_ID};

/// The kind of catalog object a privilege record refers to.
#[derive(
    Clone, Copy, Debug, parse_display::Display, Hash, PartialEq, Eq, PartialOrd, Ord,
)]
#[display(style = "UPPERCASE")]
pub enum DbObjectType {
    Database,
    Table,
    View,
    Source,
    Function,
}

/// Identity of a protected object, addressable at three granularities:
///
/// - `(d, o, t)` — a specific object of type `t` in database `d`;
/// - `(d, -1, t)` — all objects of type `t` in database `d`;
/// - `(-1, -1, t)` — all objects of type `t` across all databases.
///
/// A grant made at one scope never materializes at another; only the
/// query path promotes from the specific key towards the wildcards.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct DbObjectKey {
    pub db_id: DatabaseId,
    pub object_id: ObjectId,
    pub object_type: DbObjectType,
}

impl DbObjectKey {
    /// Key for a specific object.
    pub fn for_object(db_id: DatabaseId, object_id: ObjectId, object_type: DbObjectType) -> Self {
        Self {
            db_id,
            object_id,
            object_type,
        }
    }

    /// Key for all objects of `object_type` in one database.
    pub fn for_database(db_id: DatabaseId, object_type: DbObjectType) -> Self {
        Self {
            db_id,
            object_id: WILDCARD_ID,
            object_type,
        }
    }

    /// Key for all objects of `object_type` across all databases.
    pub fn for_all_databases(object_type: DbObjectType) -> Self {
        Self {
            db_id: WILDCARD_ID,
            object_id: WILDCARD_ID,
            object_type,
        }
    }
}

/// A claim of rights on an addressable catalog object: the key, the
/// object's display name, its owner and the privilege bits held on it.
///
/// `name` and `owner` are metadata; they are not governed by the
/// privilege algebra.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DbObject {
    key: DbObjectKey,
    name: String,
    owner: OwnerId,
    privileges: AclModeSet,
}

impl DbObject {
    pub fn new(
        key: DbObjectKey,
        name: impl Into<String>,
        owner: OwnerId,
        privileges: AclModeSet,
    ) -> Self {
        Self {
            key,
            name: name.into(),
            owner,
            privileges,
        }
    }

    pub fn key(&self) -> DbObjectKey {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn set_owner(&mut self, owner: OwnerId) {
        self.owner = owner;
    }

    pub fn privileges(&self) -> &AclModeSet {
        &self.privileges
    }

    /// Merges `other`'s privileges into this record.
    pub fn grant_privileges(&mut self, other: &DbObject) {
        self.privileges.union_with(other.privileges());
    }

    /// Subtracts `other`'s privileges from this record.
    pub fn revoke_privileges(&mut self, other: &DbObject) {
        self.privileges.subtract(other.privileges());
    }

    /// Same merge as [`DbObject::grant_privileges`]; used while
    /// re-aggregating effective privileges.
    pub fn update_privileges(&mut self, other: &DbObject) {
        self.privileges.union_with(other.privileges());
    }

    pub fn reset_privileges(&mut self) {
        self.privileges.clear();
    }
}

#[cfg(test)]
mod tests {
    use granite_common::acl::AclMode;

    use super::*;

    fn table_obj(db_id: i32, object_id: i32, modes: &[AclMode]) -> DbObject {
        DbObject::new(
            DbObjectKey::for_object(db_id, object_id, DbObjectType::Table),
            "t",
            1,
            modes.iter().copied().collect(),
        )
    }

    #[test]
    fn test_key_ordering_is_lexicographic() {
        let a = DbObjectKey::for_object(1, 5, DbObjectType::Table);
        let b = DbObjectKey::for_object(1, 6, DbObjectType::Table);
        let c = DbObjectKey::for_object(2, 0, DbObjectType::Table);
        assert!(a < b);
        assert!(b < c);
        // The wildcard sentinel sorts before any concrete id.
        assert!(DbObjectKey::for_database(1, DbObjectType::Table) < a);
        assert!(
            DbObjectKey::for_all_databases(DbObjectType::Table)
                < DbObjectKey::for_database(1, DbObjectType::Table)
        );
    }

    #[test]
    fn test_keys_equal_only_on_exact_match() {
        let exact = DbObjectKey::for_object(1, 5, DbObjectType::Table);
        assert_ne!(exact, DbObjectKey::for_database(1, DbObjectType::Table));
        assert_ne!(
            exact,
            DbObjectKey::for_object(1, 5, DbObjectType::View)
        );
        assert_eq!(exact, DbObjectKey::for_object(1, 5, DbObjectType::Table));
    }

    #[test]
    fn test_grant_then_revoke_roundtrip() {
        let mut obj = table_obj(1, 5, &[AclMode::Select]);
        let extra = table_obj(1, 5, &[AclMode::Insert, AclMode::Delete]);
        obj.grant_privileges(&extra);
        assert!(obj.privileges().has_all(extra.privileges()));
        obj.revoke_privileges(&extra);
        assert_eq!(
            *obj.privileges(),
            [AclMode::Select].into_iter().collect::<AclModeSet>()
        );
    }

    #[test]
    fn test_metadata_not_governed_by_privilege_bits() {
        let mut obj = table_obj(1, 5, &[AclMode::Select]);
        obj.set_name("renamed");
        obj.set_owner(42);
        obj.reset_privileges();
        assert_eq!(obj.name(), "renamed");
        assert_eq!(obj.owner(), 42);
        assert!(!obj.privileges().has_any());
    }
}
