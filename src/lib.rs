//! # Soulbound - a narrative-gated quest journal
//!
//! Soulbound keeps a traveler's quest log, inventory and currencies in a per-user
//! cloud record. Completing the last task of a quest pays out its rewards exactly once;
//! every change is saved in the background after a short quiet period.
//!
//! ## Features
//!
//! - **Reward engine**: `"Mora x20,000"` style rewards are parsed and routed to the
//!   currency ledger and the inventory.
//! - **Progress tracking**: progress is always derived from the task checklist and
//!   completion is detected by quest id, so reordering never misattributes rewards.
//! - **Reconciliation on load**: saved progress is layered over admin-authored
//!   templates, with compiled-in content when the service is unreachable.
//! - **Debounced auto-save**: one single-flight write stream per record.
//! - **Admin tools**: quest, item and message editing, JSON export/import and template
//!   publishing for accounts with the admin role.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use soulbound::config::Config;
//! use soulbound::remote::{HttpAuthProvider, HttpRemoteStore};
//! use soulbound::sync::{AutoSave, BootOutcome, Bootstrap};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("soulbound.toml").await?;
//!     let store = Arc::new(HttpRemoteStore::new(&config.service));
//!     let auth = Arc::new(HttpAuthProvider::new(&config.auth, &config.service));
//!
//!     let boot = Bootstrap::new(auth, store.clone(), config.currencies.clone());
//!     if let BootOutcome::Ready(loaded) = boot.initialize().await {
//!         let mut loaded = *loaded;
//!         let events = loaded.state.subscribe();
//!         let saver = AutoSave::spawn(store, Arc::new(loaded.session), &config.autosave, events);
//!         loaded.state.toggle_task(1, 4);
//!         saver.shutdown().await;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`journey`] - quests, rewards, inventory, currencies and the root state holder
//! - [`sync`] - startup reconciliation and the auto-save scheduler
//! - [`remote`] - remote store and auth provider seams with HTTP and in-memory backends
//! - [`session`] - signed-in user and role
//! - [`config`] - TOML configuration
//!
//! ```text
//! ┌──────────────┐  StateEvent  ┌──────────────┐
//! │ JourneyState │ ───────────▶ │   AutoSave   │
//! └──────────────┘              └──────────────┘
//!        ▲                             │
//! ┌──────────────┐              ┌──────────────┐
//! │  Bootstrap   │ ◀─────────── │ RemoteStore  │
//! └──────────────┘              └──────────────┘
//! ```

pub mod config;
pub mod journey;
pub mod logutil;
pub mod metrics;
pub mod remote;
pub mod session;
pub mod sync;
