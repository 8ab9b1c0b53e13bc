//! The openness index: fragments still waiting for a neighbor.
//!
//! Always a function of the fragment store. It is kept incrementally for
//! speed and recomputed from scratch on restore as a cross-check.

use std::collections::HashSet;

use crate::error::{CorpseError, CorpseResult};
use crate::fragment::{Fragment, FragmentId};
use crate::preview::Direction;

/// An insertion-ordered set of fragment IDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct OpenSet {
    order: Vec<FragmentId>,
    members: HashSet<FragmentId>,
}

impl OpenSet {
    pub(crate) fn insert(&mut self, id: &FragmentId) {
        if self.members.insert(id.clone()) {
            self.order.push(id.clone());
        }
    }

    pub(crate) fn remove(&mut self, id: &FragmentId) {
        if self.members.remove(id) {
            self.order.retain(|member| member != id);
        }
    }

    pub(crate) fn set(&mut self, id: &FragmentId, open: bool) {
        if open {
            self.insert(id);
        } else {
            self.remove(id);
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &FragmentId> {
        self.order.iter()
    }

    pub(crate) fn to_vec(&self) -> Vec<FragmentId> {
        self.order.clone()
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    /// Compare against a persisted list as sets.
    ///
    /// A list that repeats an ID is reported as a duplicate even if the
    /// distinct members would match.
    pub(crate) fn check_matches(&self, persisted: &[FragmentId], side: Direction) -> CorpseResult<()> {
        let expected: HashSet<&FragmentId> = persisted.iter().collect();
        if expected.len() != persisted.len() {
            return Err(CorpseError::OpennessDuplicate { side });
        }
        if expected.len() != self.members.len()
            || !self.members.iter().all(|id| expected.contains(id))
        {
            return Err(CorpseError::OpennessMismatch { side });
        }
        Ok(())
    }
}

impl FromIterator<FragmentId> for OpenSet {
    fn from_iter<I: IntoIterator<Item = FragmentId>>(iter: I) -> Self {
        let mut set = Self::default();
        for id in iter {
            set.insert(&id);
        }
        set
    }
}

/// Fragments open on their preceding and following sides.
#[derive(Debug, Clone, Default)]
pub(crate) struct OpennessIndex {
    pub(crate) preceding: OpenSet,
    pub(crate) following: OpenSet,
}

impl OpennessIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Bring both sets in line with the fragment's current links.
    pub(crate) fn refresh(&mut self, fragment: &Fragment) {
        self.preceding
            .set(&fragment.id, fragment.is_preceding_open());
        self.following
            .set(&fragment.id, fragment.is_following_open());
    }

    pub(crate) fn clear(&mut self) {
        self.preceding.clear();
        self.following.clear();
    }
}
