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

//! `Acl` defines all grantable privileges.

use std::fmt::{self, Display, Formatter};
use std::sync::LazyLock;

use enumflags2::{bitflags, make_bitflags, BitFlags};
use itertools::Itertools;

/// A single grantable privilege. The display forms follow the PostgreSQL
/// `aclitem` letter convention where one exists.
#[bitflags]
#[repr(u64)]
#[derive(Clone, Copy, Debug, parse_display::Display, Eq, PartialEq)]
pub enum AclMode {
    #[display("a")]
    Insert = 1 << 0,
    #[display("r")]
    Select = 1 << 1,
    #[display("w")]
    Update = 1 << 2,
    #[display("d")]
    Delete = 1 << 3,
    #[display("C")]
    Create = 1 << 4,
    #[display("D")]
    Drop = 1 << 5,
    #[display("A")]
    Alter = 1 << 6,
    #[display("U")]
    Usage = 1 << 7,
    #[display("X")]
    Execute = 1 << 8,
    #[display("c")]
    Connect = 1 << 9,
}

/// A bitset of [`AclMode`]s.
///
/// Grant merges are unions and therefore commutative and idempotent;
/// revokes subtract and only ever shrink the set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AclModeSet {
    pub modes: BitFlags<AclMode>,
}

impl AclModeSet {
    pub fn empty() -> Self {
        Self {
            modes: BitFlags::empty(),
        }
    }

    pub fn insert(&mut self, mode: AclMode) {
        self.modes |= mode;
    }

    /// Bitwise OR with `other`.
    pub fn union_with(&mut self, other: &AclModeSet) {
        self.modes |= other.modes;
    }

    /// `self AND NOT other`.
    pub fn subtract(&mut self, other: &AclModeSet) {
        self.modes &= !other.modes;
    }

    pub fn clear(&mut self) {
        self.modes = BitFlags::empty();
    }

    pub fn has_mode(&self, mode: AclMode) -> bool {
        self.modes.contains(mode)
    }

    /// `(self AND other) == other`, i.e. every mode in `other` is present.
    pub fn has_all(&self, other: &AclModeSet) -> bool {
        self.modes.contains(other.modes)
    }

    pub fn has_any(&self) -> bool {
        !self.modes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = AclMode> + '_ {
        self.modes.iter()
    }
}

impl From<BitFlags<AclMode>> for AclModeSet {
    fn from(modes: BitFlags<AclMode>) -> Self {
        Self { modes }
    }
}

impl From<AclMode> for AclModeSet {
    fn from(mode: AclMode) -> Self {
        Self { modes: mode.into() }
    }
}

impl FromIterator<AclMode> for AclModeSet {
    fn from_iter<T: IntoIterator<Item = AclMode>>(iter: T) -> Self {
        Self {
            modes: iter.into_iter().collect(),
        }
    }
}

impl Display for AclModeSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.modes.iter().map(|m| m.to_string()).join(""))
    }
}

pub static ALL_AVAILABLE_DATABASE_MODES: LazyLock<AclModeSet> =
    LazyLock::new(|| make_bitflags!(AclMode::{Create | Connect | Drop | Alter}).into());
pub static ALL_AVAILABLE_TABLE_MODES: LazyLock<AclModeSet> = LazyLock::new(|| {
    make_bitflags!(AclMode::{Select | Insert | Update | Delete | Drop | Alter}).into()
});
pub static ALL_AVAILABLE_VIEW_MODES: LazyLock<AclModeSet> =
    LazyLock::new(|| make_bitflags!(AclMode::{Select | Drop | Alter}).into());
pub static ALL_AVAILABLE_SOURCE_MODES: LazyLock<AclModeSet> =
    LazyLock::new(|| make_bitflags!(AclMode::{Select | Usage | Drop | Alter}).into());
pub static ALL_AVAILABLE_FUNCTION_MODES: LazyLock<AclModeSet> =
    LazyLock::new(|| make_bitflags!(AclMode::{Execute | Drop | Alter}).into());

#[cfg(test)]
mod tests {
    use super::*;

    fn modes(flags: BitFlags<AclMode>) -> AclModeSet {
        AclModeSet { modes: flags }
    }

    #[test]
    fn test_union_is_idempotent() {
        let mut a = modes(make_bitflags!(AclMode::{Select | Insert}));
        let b = modes(make_bitflags!(AclMode::{Insert | Delete}));
        a.union_with(&b);
        let first = a;
        a.union_with(&b);
        assert_eq!(a, first);
        assert!(a.has_mode(AclMode::Select));
        assert!(a.has_mode(AclMode::Insert));
        assert!(a.has_mode(AclMode::Delete));
    }

    #[test]
    fn test_subtract_only_shrinks() {
        let mut a = modes(make_bitflags!(AclMode::{Select | Insert | Update}));
        a.subtract(&AclMode::Insert.into());
        assert_eq!(a, modes(make_bitflags!(AclMode::{Select | Update})));
        // Subtracting modes that are absent is a no-op.
        a.subtract(&AclMode::Delete.into());
        assert_eq!(a, modes(make_bitflags!(AclMode::{Select | Update})));
    }

    #[test]
    fn test_has_all_and_has_any() {
        let set = modes(make_bitflags!(AclMode::{Select | Insert}));
        assert!(set.has_all(&AclMode::Select.into()));
        assert!(set.has_all(&set));
        assert!(!set.has_all(&modes(make_bitflags!(AclMode::{Select | Delete}))));
        assert!(set.has_any());
        assert!(AclModeSet::empty().has_all(&AclModeSet::empty()));
        assert!(!AclModeSet::empty().has_any());
    }

    #[test]
    fn test_display() {
        let set = modes(make_bitflags!(AclMode::{Select | Insert | Update | Delete}));
        assert_eq!(set.to_string(), "arwd");
        assert_eq!(AclModeSet::empty().to_string(), "");
    }

    #[test]
    fn test_available_modes() {
        assert!(ALL_AVAILABLE_TABLE_MODES.has_mode(AclMode::Select));
        assert!(!ALL_AVAILABLE_TABLE_MODES.has_mode(AclMode::Connect));
        assert!(ALL_AVAILABLE_DATABASE_MODES.has_mode(AclMode::Connect));
        assert!(ALL_AVAILABLE_FUNCTION_MODES.has_mode(AclMode::Execute));
    }
}
