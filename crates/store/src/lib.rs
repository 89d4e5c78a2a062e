pub mod ledger;
pub mod memory;
pub mod preferences;
pub mod seed;

pub use ledger::{FavoriteLedger, FAVORITES_KEY};
pub use memory::MemorySignalStore;
pub use preferences::{MemoryPreferences, SqlitePreferences};
pub use seed::seed_demo_signals;
