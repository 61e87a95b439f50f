//! Group membership (spec.md §3): the set of sync groups a device
//! participates in. Mutated only by the IPC `sync.join` / `sync.leave`
//! commands — nothing else in the daemon writes to it.

use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct GroupMembership {
    groups: BTreeSet<String>,
}

impl GroupMembership {
    pub fn new(initial: impl IntoIterator<Item = String>) -> Self {
        Self {
            groups: initial.into_iter().collect(),
        }
    }

    pub fn join(&mut self, group: String) -> bool {
        self.groups.insert(group)
    }

    pub fn leave(&mut self, group: &str) -> bool {
        self.groups.remove(group)
    }

    pub fn contains(&self, group: &str) -> bool {
        self.groups.contains(group)
    }

    pub fn list(&self) -> Vec<String> {
        self.groups.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_then_leave_round_trips() {
        let mut m = GroupMembership::default();
        assert!(m.join("team".into()));
        assert!(m.contains("team"));
        assert!(m.leave("team"));
        assert!(!m.contains("team"));
    }

    #[test]
    fn joining_twice_is_idempotent() {
        let mut m = GroupMembership::default();
        assert!(m.join("team".into()));
        assert!(!m.join("team".into()));
        assert_eq!(m.list(), vec!["team".to_string()]);
    }
}
