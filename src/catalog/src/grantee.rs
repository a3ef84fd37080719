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

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};

use granite_common::catalog::{DatabaseId, OwnerId, WILDCARD_ID};

use crate::error::{AuthError, Result};
use crate::object::{DbObject, DbObjectKey};

/// Handle of a principal inside [`crate::manager::GranteeManager`]'s arena.
pub type GranteeId = u32;

/// Privilege records held by one principal, keyed by object.
pub type DbObjectMap = BTreeMap<DbObjectKey, DbObject>;

#[derive(Clone, Copy, Debug, parse_display::Display, PartialEq, Eq)]
#[display(style = "UPPERCASE")]
pub enum GranteeKind {
    User,
    Role,
}

/// A principal that can hold privileges: a user or a role.
///
/// `direct_privileges` tracks only privileges granted to this principal
/// by name. `effective_privileges` additionally folds in everything
/// inherited through `roles`, recursively; it is kept eagerly consistent
/// by the manager so that privilege checks never walk the graph.
///
/// Edges are symmetric pairs of arena ids: `r ∈ roles` on a grantee iff
/// its id is in `r`'s `grantees`. Users never appear downstream of
/// anything, so their `grantees` set stays empty.
#[derive(Clone, Debug)]
pub struct Grantee {
    id: GranteeId,
    name: String,
    kind: GranteeKind,
    /// Upstream edges: roles granted to this grantee.
    pub(crate) roles: HashSet<GranteeId>,
    /// Downstream edges: principals this role has been granted to.
    pub(crate) grantees: HashSet<GranteeId>,
    pub(crate) direct_privileges: DbObjectMap,
    pub(crate) effective_privileges: DbObjectMap,
}

impl Grantee {
    pub(crate) fn new(id: GranteeId, name: impl Into<String>, kind: GranteeKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            roles: HashSet::new(),
            grantees: HashSet::new(),
            direct_privileges: DbObjectMap::new(),
            effective_privileges: DbObjectMap::new(),
        }
    }

    pub fn id(&self) -> GranteeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> GranteeKind {
        self.kind
    }

    pub fn is_user(&self) -> bool {
        self.kind == GranteeKind::User
    }

    /// Looks up the privilege record at exactly `key`, with no wildcard
    /// promotion.
    pub fn find_db_object(&self, key: &DbObjectKey, only_direct: bool) -> Option<&DbObject> {
        self.db_objects(only_direct).get(key)
    }

    pub fn db_objects(&self, only_direct: bool) -> &DbObjectMap {
        if only_direct {
            &self.direct_privileges
        } else {
            &self.effective_privileges
        }
    }

    /// Returns true iff the effective privileges on the requested key
    /// dominate the requested set, probing the specific key first, then
    /// the database-wide wildcard, then the global one.
    pub fn check_privileges(&self, requested: &DbObject) -> bool {
        self.probe(requested.key(), false, |held| {
            held.privileges().has_all(requested.privileges())
        })
    }

    /// Same promotion order as [`Grantee::check_privileges`], but any
    /// privilege at a level satisfies the probe.
    pub fn has_any_privileges(&self, requested: &DbObject, only_direct: bool) -> bool {
        self.probe(requested.key(), only_direct, |held| {
            held.privileges().has_any()
        })
    }

    /// Whether any held record is scoped to `db_id`.
    pub fn has_any_privileges_on_db(&self, db_id: DatabaseId, only_direct: bool) -> bool {
        self.db_objects(only_direct)
            .keys()
            .any(|key| key.db_id == db_id)
    }

    /// Fills `object` with the privileges recorded at its exact key.
    pub fn get_privileges(&self, object: &mut DbObject, only_direct: bool) -> Result<()> {
        let held = self
            .find_db_object(&object.key(), only_direct)
            .ok_or_else(|| AuthError::NoPrivileges {
                grantee: self.name.clone(),
                object: object.name().to_owned(),
            })?;
        object.grant_privileges(held);
        Ok(())
    }

    fn probe(
        &self,
        mut key: DbObjectKey,
        only_direct: bool,
        pred: impl Fn(&DbObject) -> bool,
    ) -> bool {
        if self.find_db_object(&key, only_direct).is_some_and(&pred) {
            return true;
        }
        if key.object_id != WILDCARD_ID {
            key.object_id = WILDCARD_ID;
            if self.find_db_object(&key, only_direct).is_some_and(&pred) {
                return true;
            }
        }
        if key.db_id != WILDCARD_ID {
            key.db_id = WILDCARD_ID;
            if self.find_db_object(&key, only_direct).is_some_and(&pred) {
                return true;
            }
        }
        false
    }

    /// Merges `object` into both maps, creating records as needed. The
    /// caller is responsible for recomputing afterwards.
    pub(crate) fn merge_privileges(&mut self, object: &DbObject) {
        if !object.privileges().has_any() {
            return;
        }
        for map in [&mut self.effective_privileges, &mut self.direct_privileges] {
            match map.entry(object.key()) {
                Entry::Occupied(mut entry) => entry.get_mut().grant_privileges(object),
                Entry::Vacant(entry) => {
                    entry.insert(object.clone());
                }
            }
        }
    }

    /// Subtracts `object` from the direct record, erasing it when it
    /// empties out, and mirrors the subtraction on the effective record.
    ///
    /// The effective-side subtraction is scaffolding, not authority: the
    /// same bits may also be supplied by an upstream role, and the
    /// recompute that follows re-aggregates them.
    ///
    /// Returns `None` when the direct record was removed, otherwise the
    /// still-live record.
    pub(crate) fn revoke_direct(&mut self, object: &DbObject) -> Result<Option<DbObject>> {
        let key = object.key();
        let (removed, remaining) = match self.direct_privileges.get_mut(&key) {
            Some(held) if held.privileges().has_any() => {
                held.revoke_privileges(object);
                if held.privileges().has_any() {
                    (false, Some(held.clone()))
                } else {
                    (true, None)
                }
            }
            _ => {
                return Err(AuthError::NoPrivileges {
                    grantee: self.name.clone(),
                    object: object.name().to_owned(),
                });
            }
        };
        if removed {
            self.direct_privileges.remove(&key);
        }

        if let Some(cached) = self.effective_privileges.get_mut(&key) {
            if cached.privileges().has_any() {
                cached.revoke_privileges(object);
                if !cached.privileges().has_any() {
                    self.effective_privileges.remove(&key);
                }
            }
        }

        Ok(remaining)
    }

    /// Step 1 of the recompute: zero out every effective record.
    pub(crate) fn reset_effective(&mut self) {
        for object in self.effective_privileges.values_mut() {
            object.reset_privileges();
        }
    }

    /// Step 2 of the recompute: re-seed effective from direct. The
    /// effective entry is created when absent, so direct contributions
    /// survive even when no upstream role shares the key.
    pub(crate) fn reseed_from_direct(&mut self) {
        for (key, direct) in &self.direct_privileges {
            match self.effective_privileges.entry(*key) {
                Entry::Occupied(mut entry) => entry.get_mut().update_privileges(direct),
                Entry::Vacant(entry) => {
                    entry.insert(direct.clone());
                }
            }
        }
    }

    /// Step 3 of the recompute: union one upstream role's effective
    /// records into this grantee's.
    pub(crate) fn merge_role_effective(&mut self, role: &Grantee) {
        for (key, object) in &role.effective_privileges {
            match self.effective_privileges.entry(*key) {
                Entry::Occupied(mut entry) => entry.get_mut().update_privileges(object),
                Entry::Vacant(entry) => {
                    entry.insert(object.clone());
                }
            }
        }
    }

    /// Step 4 of the recompute: no record may survive with an empty set.
    pub(crate) fn drop_empty_effective(&mut self) {
        self.effective_privileges
            .retain(|_, object| object.privileges().has_any());
    }

    /// Rewrites the display name of the record at `object`'s key in both
    /// maps, if present.
    pub(crate) fn rename_db_object(&mut self, object: &DbObject) {
        for map in [&mut self.direct_privileges, &mut self.effective_privileges] {
            if let Some(held) = map.get_mut(&object.key()) {
                held.set_name(object.name());
            }
        }
    }

    /// Erases every record scoped to `db_id` from both maps.
    pub(crate) fn purge_database(&mut self, db_id: DatabaseId) {
        for map in [&mut self.direct_privileges, &mut self.effective_privileges] {
            map.retain(|key, _| key.db_id != db_id);
        }
    }

    /// Rewrites ownership of every specific-object record in `db_id`
    /// whose owner is in `old_owner_ids`. Privilege bits are untouched.
    pub(crate) fn reassign_object_owners(
        &mut self,
        old_owner_ids: &HashSet<OwnerId>,
        new_owner_id: OwnerId,
        db_id: DatabaseId,
    ) {
        for map in [&mut self.direct_privileges, &mut self.effective_privileges] {
            for (key, object) in map.iter_mut() {
                if key.object_id != WILDCARD_ID
                    && key.db_id == db_id
                    && old_owner_ids.contains(&object.owner())
                {
                    object.set_owner(new_owner_id);
                }
            }
        }
    }

    /// Rewrites ownership of the records matching `object_key` exactly.
    pub(crate) fn reassign_object_owner(&mut self, object_key: &DbObjectKey, new_owner_id: OwnerId) {
        for map in [&mut self.direct_privileges, &mut self.effective_privileges] {
            if let Some(object) = map.get_mut(object_key) {
                object.set_owner(new_owner_id);
            }
        }
    }
}
