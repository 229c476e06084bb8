pub mod dependency_extractor;
pub mod go_execution;
pub mod manifest_locator;
pub mod manifest_sorter;
pub mod selection;
pub mod selector;

pub use dependency_extractor::extract;
pub use go_execution::{GoGetAgent, ModuleUpdater, UpdateDispatcher};
pub use manifest_locator::ManifestLocatorAgent;
pub use manifest_sorter::ManifestSorter;
pub use selection::{SelectOptions, SelectionPolicy, Selector};
pub use selector::TerminalSelector;
