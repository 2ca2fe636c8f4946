pub use self::engine::{ReconcileEngine, ReconcileError, ReconcileOutcome};
pub use self::factory::{KubeObserverFactory, ObserverFactory};
pub use self::matcher::{matches_categories, select_targets};
pub use self::registry::{WatchEntry, WatchRegistry};
pub use self::shared_watch::{Removal, SharedWatch};

mod engine;
mod factory;
mod matcher;
mod registry;
mod shared_watch;

#[cfg(test)]
mod test_utils;
