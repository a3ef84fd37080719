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

use std::sync::Arc;

use parking_lot::lock_api::{ArcRwLockReadGuard, ArcRwLockWriteGuard};
use parking_lot::{RawRwLock, RwLock};

use crate::manager::GranteeManager;

pub type AuthManagerRef = Arc<RwLock<GranteeManager>>;
pub type AuthReadGuard = ArcRwLockReadGuard<RawRwLock, GranteeManager>;
pub type AuthWriteGuard = ArcRwLockWriteGuard<RawRwLock, GranteeManager>;

/// The catalog-boundary lock around the authorization graph.
///
/// The graph itself is free of synchronization; request-serving threads
/// go through this service instead. Queries take the shared guard,
/// mutations the exclusive one, so that every mutation (recompute and
/// downstream propagation included) appears atomic to observers.
#[derive(Clone)]
pub struct AuthManagerService(AuthManagerRef);

impl AuthManagerService {
    pub fn new(manager: GranteeManager) -> Self {
        Self(Arc::new(RwLock::new(manager)))
    }

    pub fn read_guard(&self) -> AuthReadGuard {
        self.0.read_arc()
    }

    pub fn write_guard(&self) -> AuthWriteGuard {
        self.0.write_arc()
    }
}

impl Default for AuthManagerService {
    fn default() -> Self {
        Self::new(GranteeManager::new())
    }
}

#[cfg(test)]
mod tests {
    use granite_common::acl::AclMode;

    use super::*;
    use crate::object::{DbObject, DbObjectKey, DbObjectType};

    #[test]
    fn test_guards_serialize_access() {
        let service = AuthManagerService::default();
        let obj = DbObject::new(
            DbObjectKey::for_object(1, 1, DbObjectType::Table),
            "t",
            1,
            [AclMode::Select].into_iter().collect(),
        );
        {
            let mut mgr = service.write_guard();
            mgr.create_user("alice").unwrap();
            mgr.grant_privileges("alice", &obj).unwrap();
        }
        let reader = service.clone();
        let mgr = reader.read_guard();
        assert!(mgr.check_privileges("alice", &obj).unwrap());
    }
}
