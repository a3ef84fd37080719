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

use std::collections::{BTreeSet, HashMap, HashSet};

use granite_common::catalog::{DatabaseId, OwnerId};
use itertools::Itertools;
use tracing::debug;

use crate::error::{AuthError, Result};
use crate::grantee::{Grantee, GranteeId, GranteeKind};
use crate::object::{DbObject, DbObjectKey};

/// The authorization graph: principals in an arena keyed by id, plus a
/// name index. Edges between grantees and roles are symmetric pairs of
/// ids held in both endpoints' sets.
///
/// Every mutation restores the central invariant before returning: a
/// grantee's effective privileges equal its direct privileges unioned
/// with the effective privileges of every role granted to it.
/// Propagation is eager, so privilege checks read a single map and never
/// walk the graph.
///
/// The manager performs no synchronization. The owning catalog serializes
/// access: exclusive for mutations, shared for queries.
#[derive(Debug, Default)]
pub struct GranteeManager {
    grantees: HashMap<GranteeId, Grantee>,
    grantee_by_name: HashMap<String, GranteeId>,
    next_grantee_id: GranteeId,
}

impl GranteeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_user(&mut self, name: impl Into<String>) -> Result<GranteeId> {
        self.create_grantee(name.into(), GranteeKind::User)
    }

    pub fn create_role(&mut self, name: impl Into<String>) -> Result<GranteeId> {
        self.create_grantee(name.into(), GranteeKind::Role)
    }

    fn create_grantee(&mut self, name: String, kind: GranteeKind) -> Result<GranteeId> {
        let kind_str = match kind {
            GranteeKind::User => "user",
            GranteeKind::Role => "role",
        };
        // Users and roles share one namespace.
        if self.grantee_by_name.contains_key(&name) {
            return Err(AuthError::Duplicated(kind_str, name));
        }
        let id = self.next_grantee_id;
        self.next_grantee_id += 1;
        debug!(kind = kind_str, name = %name, id, "create grantee");
        self.grantee_by_name.insert(name.clone(), id);
        self.grantees.insert(id, Grantee::new(id, name, kind));
        Ok(id)
    }

    /// Destroys a principal. The node detaches itself from every upstream
    /// role; a role additionally revokes itself from every downstream
    /// grantee, each of which recomputes.
    pub fn drop_grantee(&mut self, name: &str) -> Result<()> {
        let id = self.id_of(name)?;
        let node = self
            .grantees
            .remove(&id)
            .ok_or_else(|| AuthError::NotFound("grantee", name.to_owned()))?;
        self.grantee_by_name.remove(node.name());
        debug!(name, "drop grantee");

        for &role_id in &node.roles {
            self.unlink_downstream(role_id, id, node.name())?;
        }
        for &grantee_id in &node.grantees {
            let Some(grantee) = self.grantees.get_mut(&grantee_id) else {
                continue;
            };
            if !grantee.roles.remove(&id) {
                return Err(AuthError::InvariantViolated(format!(
                    "edge from {} to dropped role {} was not symmetric",
                    grantee.name(),
                    node.name(),
                )));
            }
        }
        for &grantee_id in &node.grantees {
            self.update_privileges(grantee_id);
        }
        Ok(())
    }

    /// Grants the privileges carried by `object` directly to `name` and
    /// recomputes, propagating downstream when `name` is a role.
    pub fn grant_privileges(&mut self, name: &str, object: &DbObject) -> Result<()> {
        let id = self.id_of(name)?;
        if let Some(node) = self.grantees.get_mut(&id) {
            node.merge_privileges(object);
        }
        debug!(
            grantee = name,
            object = object.name(),
            privileges = %object.privileges(),
            "grant privileges"
        );
        self.update_privileges(id);
        Ok(())
    }

    /// Revokes the privileges carried by `object` from `name`'s direct
    /// record. Fails with [`AuthError::NoPrivileges`] when there is no
    /// direct record to revoke from.
    ///
    /// Returns `Ok(None)` when the record emptied out and was removed,
    /// otherwise the still-live direct record.
    pub fn revoke_privileges(&mut self, name: &str, object: &DbObject) -> Result<Option<DbObject>> {
        let id = self.id_of(name)?;
        let remaining = match self.grantees.get_mut(&id) {
            Some(node) => node.revoke_direct(object)?,
            None => return Err(AuthError::NotFound("grantee", name.to_owned())),
        };
        debug!(
            grantee = name,
            object = object.name(),
            privileges = %object.privileges(),
            "revoke privileges"
        );
        self.update_privileges(id);
        Ok(remaining)
    }

    /// Grants `role_name` to `grantee_name`, rejecting duplicate edges
    /// and edges that would close a cycle.
    pub fn grant_role(&mut self, grantee_name: &str, role_name: &str) -> Result<()> {
        let grantee_id = self.id_of(grantee_name)?;
        let role_id = self.role_id_of(role_name)?;
        if self
            .grantees
            .get(&grantee_id)
            .is_some_and(|g| g.roles.contains(&role_id))
        {
            return Err(AuthError::AlreadyGranted {
                role: role_name.to_owned(),
                grantee: grantee_name.to_owned(),
            });
        }
        // The new edge goes from the grantee upward to the role. It closes
        // a cycle iff the role is already reachable downward from the
        // grantee.
        if self.reachable_downstream(grantee_id, role_id) {
            return Err(AuthError::CycleDetected {
                role: role_name.to_owned(),
                grantee: grantee_name.to_owned(),
            });
        }
        self.link_downstream(role_id, grantee_id, grantee_name)?;
        if let Some(grantee) = self.grantees.get_mut(&grantee_id) {
            grantee.roles.insert(role_id);
        }
        debug!(grantee = grantee_name, role = role_name, "grant role");
        self.update_privileges(grantee_id);
        Ok(())
    }

    /// Severs the `grantee_name` → `role_name` edge and recomputes.
    /// Teardown is idempotent: absent edges are not an error.
    pub fn revoke_role(&mut self, grantee_name: &str, role_name: &str) -> Result<()> {
        let grantee_id = self.id_of(grantee_name)?;
        let role_id = self.role_id_of(role_name)?;
        if let Some(grantee) = self.grantees.get_mut(&grantee_id) {
            grantee.roles.remove(&role_id);
        }
        if let Some(role) = self.grantees.get_mut(&role_id) {
            role.grantees.remove(&grantee_id);
        }
        debug!(grantee = grantee_name, role = role_name, "revoke role");
        self.update_privileges(grantee_id);
        Ok(())
    }

    /// Erases every privilege record scoped to `db_id` from `name` and,
    /// when `name` is a role, from its whole downstream subgraph, then
    /// recomputes from `name` down.
    pub fn revoke_all_on_database(&mut self, name: &str, db_id: DatabaseId) -> Result<()> {
        let root = self.id_of(name)?;
        for id in self.downstream_closure(root) {
            if let Some(node) = self.grantees.get_mut(&id) {
                node.purge_database(db_id);
            }
        }
        debug!(grantee = name, db_id, "revoke all on database");
        self.update_privileges(root);
        Ok(())
    }

    /// Rewrites the display name of the record at `object`'s key for
    /// `name` and, when `name` is a role, for every downstream grantee
    /// caching the record.
    pub fn rename_db_object(&mut self, name: &str, object: &DbObject) -> Result<()> {
        let root = self.id_of(name)?;
        for id in self.downstream_closure(root) {
            if let Some(node) = self.grantees.get_mut(&id) {
                node.rename_db_object(object);
            }
        }
        Ok(())
    }

    /// Applies the rename to every principal in the catalog. This is what
    /// the surrounding catalog calls on `ALTER ... RENAME`.
    pub fn rename_db_object_everywhere(&mut self, object: &DbObject) {
        for node in self.grantees.values_mut() {
            node.rename_db_object(object);
        }
    }

    /// Rewrites ownership of `name`'s specific-object records in `db_id`
    /// whose current owner is in `old_owner_ids`.
    pub fn reassign_object_owners(
        &mut self,
        name: &str,
        old_owner_ids: &HashSet<OwnerId>,
        new_owner_id: OwnerId,
        db_id: DatabaseId,
    ) -> Result<()> {
        let id = self.id_of(name)?;
        if let Some(node) = self.grantees.get_mut(&id) {
            node.reassign_object_owners(old_owner_ids, new_owner_id, db_id);
        }
        Ok(())
    }

    /// Rewrites ownership of `name`'s records matching `object_key`
    /// exactly.
    pub fn reassign_object_owner(
        &mut self,
        name: &str,
        object_key: &DbObjectKey,
        new_owner_id: OwnerId,
    ) -> Result<()> {
        let id = self.id_of(name)?;
        if let Some(node) = self.grantees.get_mut(&id) {
            node.reassign_object_owner(object_key, new_owner_id);
        }
        Ok(())
    }

    pub fn get_grantee(&self, name: &str) -> Option<&Grantee> {
        let id = self.grantee_by_name.get(name)?;
        self.grantees.get(id)
    }

    pub fn check_privileges(&self, name: &str, requested: &DbObject) -> Result<bool> {
        Ok(self.grantee_of(name)?.check_privileges(requested))
    }

    pub fn has_any_privileges(
        &self,
        name: &str,
        requested: &DbObject,
        only_direct: bool,
    ) -> Result<bool> {
        Ok(self
            .grantee_of(name)?
            .has_any_privileges(requested, only_direct))
    }

    pub fn has_any_privileges_on_db(
        &self,
        name: &str,
        db_id: DatabaseId,
        only_direct: bool,
    ) -> Result<bool> {
        Ok(self
            .grantee_of(name)?
            .has_any_privileges_on_db(db_id, only_direct))
    }

    pub fn get_privileges(
        &self,
        name: &str,
        object: &mut DbObject,
        only_direct: bool,
    ) -> Result<()> {
        self.grantee_of(name)?.get_privileges(object, only_direct)
    }

    /// Role names visible from `name`: the direct roles, or the whole
    /// upstream closure. Sorted for human readers.
    pub fn get_roles(&self, name: &str, only_direct: bool) -> Result<Vec<String>> {
        let id = self.id_of(name)?;
        let mut names = BTreeSet::new();
        let mut visited = HashSet::from([id]);
        let mut worklist = vec![id];
        while let Some(current) = worklist.pop() {
            let Some(node) = self.grantees.get(&current) else {
                continue;
            };
            for &role_id in &node.roles {
                if let Some(role) = self.grantees.get(&role_id) {
                    names.insert(role.name().to_owned());
                }
                if !only_direct && visited.insert(role_id) {
                    worklist.push(role_id);
                }
            }
            if only_direct {
                break;
            }
        }
        Ok(names.into_iter().collect())
    }

    /// Membership test: direct, or reachable through the upstream
    /// closure. A role is considered a member of itself on the closure
    /// path.
    pub fn has_role(&self, grantee_name: &str, role_name: &str, only_direct: bool) -> Result<bool> {
        let id = self.id_of(grantee_name)?;
        let role_id = self.role_id_of(role_name)?;
        if only_direct {
            return Ok(self
                .grantees
                .get(&id)
                .is_some_and(|g| g.roles.contains(&role_id)));
        }
        let mut visited = HashSet::from([id]);
        let mut worklist = vec![id];
        while let Some(current) = worklist.pop() {
            if current == role_id {
                return Ok(true);
            }
            let Some(node) = self.grantees.get(&current) else {
                continue;
            };
            for &upstream in &node.roles {
                if visited.insert(upstream) {
                    worklist.push(upstream);
                }
            }
        }
        Ok(false)
    }

    /// The principals `role_name` has been granted to, sorted.
    pub fn get_grantees_of(&self, role_name: &str) -> Result<Vec<String>> {
        let role_id = self.role_id_of(role_name)?;
        let Some(role) = self.grantees.get(&role_id) else {
            return Err(AuthError::NotFound("role", role_name.to_owned()));
        };
        Ok(role
            .grantees
            .iter()
            .filter_map(|id| self.grantees.get(id).map(|g| g.name().to_owned()))
            .sorted()
            .collect_vec())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Grantee> {
        self.grantees.values()
    }

    pub fn len(&self) -> usize {
        self.grantees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grantees.is_empty()
    }

    /// Recomputes every principal following a topological order of the
    /// role graph, upstream before downstream. The surrounding catalog
    /// calls this at load time, after nodes, edges and direct privileges
    /// have been re-created from durable state.
    pub fn rebuild_effective_privileges(&mut self) -> Result<()> {
        let mut indegree: HashMap<GranteeId, usize> = self
            .grantees
            .iter()
            .map(|(&id, node)| (id, node.roles.len()))
            .collect();
        let mut ready = indegree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&id, _)| id)
            .collect_vec();
        let mut processed = 0;
        while let Some(id) = ready.pop() {
            processed += 1;
            for downstream in self.recompute_node(id) {
                if let Some(degree) = indegree.get_mut(&downstream) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(downstream);
                    }
                }
            }
        }
        if processed != self.grantees.len() {
            return Err(AuthError::InvariantViolated(
                "role graph contains a cycle".to_owned(),
            ));
        }
        Ok(())
    }

    fn id_of(&self, name: &str) -> Result<GranteeId> {
        self.grantee_by_name
            .get(name)
            .copied()
            .ok_or_else(|| AuthError::NotFound("grantee", name.to_owned()))
    }

    fn role_id_of(&self, name: &str) -> Result<GranteeId> {
        let id = self
            .grantee_by_name
            .get(name)
            .copied()
            .ok_or_else(|| AuthError::NotFound("role", name.to_owned()))?;
        match self.grantees.get(&id) {
            Some(node) if !node.is_user() => Ok(id),
            _ => Err(AuthError::NotFound("role", name.to_owned())),
        }
    }

    fn grantee_of(&self, name: &str) -> Result<&Grantee> {
        self.get_grantee(name)
            .ok_or_else(|| AuthError::NotFound("grantee", name.to_owned()))
    }

    /// Whether `target` is reachable from `start` following downstream
    /// edges. Users contribute no edges, so the worklist visits every
    /// transitive downstream node at most once.
    fn reachable_downstream(&self, start: GranteeId, target: GranteeId) -> bool {
        let mut visited = HashSet::from([start]);
        let mut worklist = vec![start];
        while let Some(id) = worklist.pop() {
            if id == target {
                return true;
            }
            let Some(node) = self.grantees.get(&id) else {
                continue;
            };
            for &downstream in &node.grantees {
                if visited.insert(downstream) {
                    worklist.push(downstream);
                }
            }
        }
        false
    }

    /// Every node reachable from `root` (inclusive) along downstream
    /// edges.
    fn downstream_closure(&self, root: GranteeId) -> Vec<GranteeId> {
        let mut visited = HashSet::from([root]);
        let mut worklist = vec![root];
        let mut closure = Vec::new();
        while let Some(id) = worklist.pop() {
            closure.push(id);
            let Some(node) = self.grantees.get(&id) else {
                continue;
            };
            for &downstream in &node.grantees {
                if visited.insert(downstream) {
                    worklist.push(downstream);
                }
            }
        }
        closure
    }

    fn link_downstream(
        &mut self,
        role_id: GranteeId,
        grantee_id: GranteeId,
        grantee_name: &str,
    ) -> Result<()> {
        let Some(role) = self.grantees.get_mut(&role_id) else {
            return Err(AuthError::InvariantViolated(format!(
                "role granted to {grantee_name} is gone from the arena"
            )));
        };
        if !role.grantees.insert(grantee_id) {
            return Err(AuthError::AlreadyGranted {
                role: role.name().to_owned(),
                grantee: grantee_name.to_owned(),
            });
        }
        Ok(())
    }

    fn unlink_downstream(
        &mut self,
        role_id: GranteeId,
        grantee_id: GranteeId,
        grantee_name: &str,
    ) -> Result<()> {
        let Some(role) = self.grantees.get_mut(&role_id) else {
            // The role was already dropped; nothing to sever.
            return Ok(());
        };
        if !role.grantees.remove(&grantee_id) {
            return Err(AuthError::NotGranted {
                role: role.name().to_owned(),
                grantee: grantee_name.to_owned(),
            });
        }
        Ok(())
    }

    /// Restores the effective = direct ∪ upstream invariant on one node:
    /// clear, re-seed from direct, union every upstream role's effective
    /// records, drop emptied records. Returns the node's downstream ids
    /// so the caller can propagate.
    fn recompute_node(&mut self, id: GranteeId) -> Vec<GranteeId> {
        let Some(mut node) = self.grantees.remove(&id) else {
            return Vec::new();
        };
        node.reset_effective();
        node.reseed_from_direct();
        for role_id in node.roles.iter().copied().collect_vec() {
            if let Some(role) = self.grantees.get(&role_id) {
                node.merge_role_effective(role);
            }
        }
        node.drop_empty_effective();
        let downstream = node.grantees.iter().copied().collect_vec();
        self.grantees.insert(id, node);
        downstream
    }

    /// The recompute entry point: restores the invariant locally, then
    /// propagates through the downstream subgraph. Termination is
    /// guaranteed by acyclicity; the recursion depth is the longest role
    /// chain below the changed node.
    fn update_privileges(&mut self, id: GranteeId) {
        for grantee_id in self.recompute_node(id) {
            self.update_privileges(grantee_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use granite_common::acl::AclMode;

    use super::*;
    use crate::object::DbObjectType;

    fn table_obj(db_id: i32, object_id: i32, modes: &[AclMode]) -> DbObject {
        DbObject::new(
            DbObjectKey::for_object(db_id, object_id, DbObjectType::Table),
            format!("table_{object_id}"),
            1,
            modes.iter().copied().collect(),
        )
    }

    #[test]
    fn test_names_are_unique_across_kinds() {
        let mut mgr = GranteeManager::new();
        mgr.create_user("alice").unwrap();
        assert!(matches!(
            mgr.create_role("alice"),
            Err(AuthError::Duplicated("role", _))
        ));
        assert!(matches!(
            mgr.create_user("alice"),
            Err(AuthError::Duplicated("user", _))
        ));
    }

    #[test]
    fn test_users_cannot_be_granted() {
        let mut mgr = GranteeManager::new();
        mgr.create_user("alice").unwrap();
        mgr.create_user("bob").unwrap();
        assert!(matches!(
            mgr.grant_role("alice", "bob"),
            Err(AuthError::NotFound("role", _))
        ));
    }

    #[test]
    fn test_duplicate_role_grant_fails() {
        let mut mgr = GranteeManager::new();
        mgr.create_user("alice").unwrap();
        mgr.create_role("reader").unwrap();
        mgr.grant_role("alice", "reader").unwrap();
        assert!(matches!(
            mgr.grant_role("alice", "reader"),
            Err(AuthError::AlreadyGranted { .. })
        ));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut mgr = GranteeManager::new();
        for role in ["r1", "r2", "r3"] {
            mgr.create_role(role).unwrap();
        }
        mgr.grant_role("r2", "r1").unwrap();
        mgr.grant_role("r3", "r2").unwrap();
        assert!(matches!(
            mgr.grant_role("r1", "r3"),
            Err(AuthError::CycleDetected { .. })
        ));
        // Self-grants are the degenerate cycle.
        assert!(matches!(
            mgr.grant_role("r1", "r1"),
            Err(AuthError::CycleDetected { .. })
        ));
        // The rejected edge must not have been half-inserted.
        assert!(!mgr.has_role("r1", "r3", true).unwrap());
        assert!(mgr.get_roles("r1", true).unwrap().is_empty());
    }

    #[test]
    fn test_role_chain_propagates_and_unwinds() {
        let mut mgr = GranteeManager::new();
        for role in ["r1", "r2", "r3"] {
            mgr.create_role(role).unwrap();
        }
        mgr.create_user("u").unwrap();
        mgr.grant_role("r2", "r1").unwrap();
        mgr.grant_role("r3", "r2").unwrap();
        mgr.grant_role("u", "r3").unwrap();
        mgr.grant_privileges("r1", &table_obj(1, 50, &[AclMode::Select]))
            .unwrap();
        assert!(mgr
            .check_privileges("u", &table_obj(1, 50, &[AclMode::Select]))
            .unwrap());
        mgr.revoke_role("u", "r3").unwrap();
        assert!(!mgr
            .check_privileges("u", &table_obj(1, 50, &[AclMode::Select]))
            .unwrap());
    }

    #[test]
    fn test_revoke_role_is_idempotent() {
        let mut mgr = GranteeManager::new();
        mgr.create_user("alice").unwrap();
        mgr.create_role("reader").unwrap();
        mgr.revoke_role("alice", "reader").unwrap();
        mgr.grant_role("alice", "reader").unwrap();
        mgr.revoke_role("alice", "reader").unwrap();
        mgr.revoke_role("alice", "reader").unwrap();
        assert!(mgr.get_roles("alice", true).unwrap().is_empty());
    }

    #[test]
    fn test_drop_role_detaches_downstream() {
        let mut mgr = GranteeManager::new();
        mgr.create_role("reader").unwrap();
        mgr.create_user("alice").unwrap();
        mgr.grant_role("alice", "reader").unwrap();
        mgr.grant_privileges("reader", &table_obj(1, 7, &[AclMode::Select]))
            .unwrap();
        assert!(mgr
            .check_privileges("alice", &table_obj(1, 7, &[AclMode::Select]))
            .unwrap());

        mgr.drop_grantee("reader").unwrap();
        assert!(mgr.get_grantee("reader").is_none());
        assert!(mgr.get_roles("alice", false).unwrap().is_empty());
        assert!(!mgr
            .check_privileges("alice", &table_obj(1, 7, &[AclMode::Select]))
            .unwrap());
        // The name is free again.
        mgr.create_role("reader").unwrap();
    }

    #[test]
    fn test_drop_user_detaches_from_roles() {
        let mut mgr = GranteeManager::new();
        mgr.create_role("reader").unwrap();
        mgr.create_user("alice").unwrap();
        mgr.grant_role("alice", "reader").unwrap();
        mgr.drop_grantee("alice").unwrap();
        assert!(mgr.get_grantees_of("reader").unwrap().is_empty());
    }

    #[test]
    fn test_get_roles_transitive_is_sorted() {
        let mut mgr = GranteeManager::new();
        for role in ["zeta", "alpha", "mid"] {
            mgr.create_role(role).unwrap();
        }
        mgr.create_user("u").unwrap();
        mgr.grant_role("mid", "zeta").unwrap();
        mgr.grant_role("mid", "alpha").unwrap();
        mgr.grant_role("u", "mid").unwrap();
        assert_eq!(mgr.get_roles("u", true).unwrap(), vec!["mid"]);
        assert_eq!(
            mgr.get_roles("u", false).unwrap(),
            vec!["alpha", "mid", "zeta"]
        );
    }

    #[test]
    fn test_has_role_transitive() {
        let mut mgr = GranteeManager::new();
        mgr.create_role("r1").unwrap();
        mgr.create_role("r2").unwrap();
        mgr.create_user("u").unwrap();
        mgr.grant_role("r2", "r1").unwrap();
        mgr.grant_role("u", "r2").unwrap();
        assert!(mgr.has_role("u", "r2", true).unwrap());
        assert!(!mgr.has_role("u", "r1", true).unwrap());
        assert!(mgr.has_role("u", "r1", false).unwrap());
        // A role reaches itself on the closure path.
        assert!(mgr.has_role("r1", "r1", false).unwrap());
    }

    #[test]
    fn test_rebuild_matches_incremental_state() {
        let mut mgr = GranteeManager::new();
        mgr.create_role("r1").unwrap();
        mgr.create_role("r2").unwrap();
        mgr.create_user("u").unwrap();
        mgr.grant_role("r2", "r1").unwrap();
        mgr.grant_role("u", "r2").unwrap();
        mgr.grant_privileges("r1", &table_obj(1, 5, &[AclMode::Select]))
            .unwrap();
        mgr.grant_privileges("u", &table_obj(1, 5, &[AclMode::Insert]))
            .unwrap();

        let before: Vec<_> = {
            let u = mgr.get_grantee("u").unwrap();
            u.db_objects(false).clone().into_iter().collect()
        };
        mgr.rebuild_effective_privileges().unwrap();
        let after: Vec<_> = {
            let u = mgr.get_grantee("u").unwrap();
            u.db_objects(false).clone().into_iter().collect()
        };
        assert_eq!(before, after);
    }

    #[test]
    fn test_reassign_object_owners() {
        let mut mgr = GranteeManager::new();
        mgr.create_user("alice").unwrap();
        let mut obj = table_obj(2, 10, &[AclMode::Select]);
        obj.set_owner(5);
        mgr.grant_privileges("alice", &obj).unwrap();

        let olds = HashSet::from([5]);
        // Wrong database: untouched.
        mgr.reassign_object_owners("alice", &olds, 9, 3).unwrap();
        assert_eq!(
            mgr.get_grantee("alice")
                .unwrap()
                .find_db_object(&obj.key(), true)
                .unwrap()
                .owner(),
            5
        );
        mgr.reassign_object_owners("alice", &olds, 9, 2).unwrap();
        for only_direct in [true, false] {
            assert_eq!(
                mgr.get_grantee("alice")
                    .unwrap()
                    .find_db_object(&obj.key(), only_direct)
                    .unwrap()
                    .owner(),
                9
            );
        }
    }

    #[test]
    fn test_rename_cascades_to_downstream_caches() {
        let mut mgr = GranteeManager::new();
        mgr.create_role("reader").unwrap();
        mgr.create_user("alice").unwrap();
        mgr.grant_role("alice", "reader").unwrap();
        let obj = table_obj(1, 7, &[AclMode::Select]);
        mgr.grant_privileges("reader", &obj).unwrap();

        let mut renamed = obj.clone();
        renamed.set_name("fresh_name");
        mgr.rename_db_object("reader", &renamed).unwrap();
        assert_eq!(
            mgr.get_grantee("alice")
                .unwrap()
                .find_db_object(&obj.key(), false)
                .unwrap()
                .name(),
            "fresh_name"
        );
    }
}
