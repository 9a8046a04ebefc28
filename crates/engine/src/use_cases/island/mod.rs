//! Island use cases.
//!
//! Orchestrates island-level flows (entering, vacancy sweeps, shutdown save).

use std::sync::Arc;

mod enter_island;
mod save_all;
mod vacancy_sweep;

pub use enter_island::{EnterIsland, EnterIslandError};
pub use save_all::{SaveAllIslands, SaveReport};
pub use vacancy_sweep::{run_vacancy_sweeper, SweepReport, VacancySweep};

/// Container for island use cases.
pub struct IslandUseCases {
    pub enter: Arc<EnterIsland>,
    pub sweep: Arc<VacancySweep>,
    pub save_all: Arc<SaveAllIslands>,
}

impl IslandUseCases {
    pub fn new(
        enter: Arc<EnterIsland>,
        sweep: Arc<VacancySweep>,
        save_all: Arc<SaveAllIslands>,
    ) -> Self {
        Self {
            enter,
            sweep,
            save_all,
        }
    }
}
