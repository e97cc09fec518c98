//! Loading and saving a journey against the remote store.

pub mod autosave;
pub mod bootstrap;

pub use autosave::{debounce_stream, AutoSave, AutoSaveHandle, SaveStream};
pub use bootstrap::{
    resolve_inventory, resolve_quests, resolve_templates, BootOutcome, Bootstrap, DataSource,
    LoadSources, LoadedJourney, ResolvedTemplates,
};
