use std::sync::Arc;

use crate::stores::IslandRegistry;

/// Tally of a whole-registry save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveReport {
    pub saved: usize,
    pub failed: usize,
}

/// Use case for persisting every loaded island without unloading it.
///
/// Run on shutdown so worlds still held by viewers are not lost.
pub struct SaveAllIslands {
    registry: Arc<IslandRegistry>,
}

impl SaveAllIslands {
    pub fn new(registry: Arc<IslandRegistry>) -> Self {
        Self { registry }
    }

    pub async fn execute(&self) -> SaveReport {
        let mut report = SaveReport::default();
        for island in self.registry.islands() {
            match island.save().await {
                Ok(true) => report.saved += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(island_id = %island.id(), error = %e, "Failed to save island");
                    report.failed += 1;
                }
            }
        }
        tracing::info!(saved = report.saved, failed = report.failed, "Saved loaded islands");
        report
    }
}
