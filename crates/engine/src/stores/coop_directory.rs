//! Coop membership table.

use dashmap::DashMap;
use skyisle_domain::{Coop, IslandId};

/// Coops keyed by the island they share.
#[derive(Default)]
pub struct CoopDirectory {
    coops: DashMap<IslandId, Coop>,
}

impl CoopDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a coop, replacing any previous coop on the same island.
    pub fn register(&self, coop: Coop) -> Option<Coop> {
        tracing::info!(
            island_id = %coop.island_id(),
            members = coop.members().len(),
            "Coop registered"
        );
        self.coops.insert(coop.island_id(), coop)
    }

    pub fn remove(&self, island_id: IslandId) -> Option<Coop> {
        self.coops.remove(&island_id).map(|(_, coop)| coop)
    }

    pub fn get(&self, island_id: IslandId) -> Option<Coop> {
        self.coops.get(&island_id).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyisle_domain::ProfileId;

    #[test]
    fn register_get_and_remove() {
        let directory = CoopDirectory::new();
        let island = IslandId::new();
        let owner = ProfileId::new();
        let friend = ProfileId::new();
        let coop = Coop::new(island, owner, [friend]).unwrap();

        assert!(directory.register(coop.clone()).is_none());
        assert_eq!(directory.get(island), Some(coop.clone()));
        assert!(directory.get(island).is_some_and(|c| c.is_member(friend)));

        assert_eq!(directory.remove(island), Some(coop));
        assert!(directory.get(island).is_none());
    }
}
