//! Startup reconciliation: merge the global templates and the user's saved record
//! into the initial [`JourneyState`].
//!
//! Each fetch fails on its own. A missing global record falls back to compiled-in
//! content and a missing user record falls back to the templates, so the only way
//! to not end up with a usable journey is to have no session. A session whose saved
//! record could not be read keeps its progress local instead of overwriting it.
use log::{info, warn};
use std::collections::HashMap;
use std::sync::Arc;

use crate::journey::currency::{CurrencyConfig, CurrencyLedger};
use crate::journey::seed;
use crate::journey::state::{JourneyData, JourneyState};
use crate::journey::types::{Item, Narratives, Quest};
use crate::remote::{AuthProvider, GlobalConfigRecord, RemoteStore, UserDataRecord};
use crate::session::Session;

/// Where a collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    UserRecord,
    RemoteTemplate,
    CompiledIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSources {
    pub quests: DataSource,
    pub inventory: DataSource,
    pub narratives: DataSource,
    pub global_fetch_failed: bool,
    pub user_fetch_failed: bool,
}

pub struct LoadedJourney {
    pub session: Session,
    pub state: JourneyState,
    pub sources: LoadSources,
}

pub enum BootOutcome {
    Unauthenticated,
    Ready(Box<LoadedJourney>),
}

/// Templates after null/empty fields have been replaced by compiled-in content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplates {
    pub quests: Vec<Quest>,
    pub quests_source: DataSource,
    pub inventory: Vec<Item>,
    pub inventory_source: DataSource,
    pub narratives: Narratives,
    pub narratives_source: DataSource,
}

fn non_empty_text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

pub fn resolve_templates(global: Option<GlobalConfigRecord>) -> ResolvedTemplates {
    let global = global.unwrap_or_default();

    let (quests, quests_source) = match global.quest_templates {
        Some(quests) if !quests.is_empty() => (quests, DataSource::RemoteTemplate),
        _ => (seed::quest_templates(), DataSource::CompiledIn),
    };
    let (inventory, inventory_source) = match global.inventory_templates {
        Some(items) if !items.is_empty() => (items, DataSource::RemoteTemplate),
        _ => (seed::inventory_templates(), DataSource::CompiledIn),
    };

    let defaults = seed::default_narratives();
    let record = global.narratives.unwrap_or_default();
    let prologue = non_empty_text(record.prologue);
    let epilogue = non_empty_text(record.epilogue);
    let narratives_source = if prologue.is_some() || epilogue.is_some() {
        DataSource::RemoteTemplate
    } else {
        DataSource::CompiledIn
    };
    let narratives = Narratives {
        prologue: prologue.unwrap_or(defaults.prologue),
        epilogue: epilogue.unwrap_or(defaults.epilogue),
    };

    ResolvedTemplates {
        quests,
        quests_source,
        inventory,
        inventory_source,
        narratives,
        narratives_source,
    }
}

/// Saved quests win on every field except a missing `lore`, which is filled from the
/// template quest with the same id. Without saved quests the templates are used as is.
pub fn resolve_quests(saved: Option<Vec<Quest>>, templates: &[Quest]) -> (Vec<Quest>, DataSource) {
    match saved {
        Some(saved) if !saved.is_empty() => {
            let lore_by_id: HashMap<u32, &String> = templates
                .iter()
                .filter_map(|t| t.lore.as_ref().map(|lore| (t.id, lore)))
                .collect();
            let quests = saved
                .into_iter()
                .map(|mut quest| {
                    if quest.lore.is_none() {
                        quest.lore = lore_by_id.get(&quest.id).map(|l| (*l).clone());
                    }
                    quest
                })
                .collect();
            (quests, DataSource::UserRecord)
        }
        _ => (templates.to_vec(), DataSource::RemoteTemplate),
    }
}

pub fn resolve_inventory(saved: Option<Vec<Item>>, templates: &[Item]) -> (Vec<Item>, DataSource) {
    match saved {
        Some(saved) if !saved.is_empty() => (saved, DataSource::UserRecord),
        _ => (templates.to_vec(), DataSource::RemoteTemplate),
    }
}

pub struct Bootstrap {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn RemoteStore>,
    currency: CurrencyConfig,
}

impl Bootstrap {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn RemoteStore>,
        currency: CurrencyConfig,
    ) -> Self {
        Self {
            auth,
            store,
            currency,
        }
    }

    /// Resolve the session, then load. Auth errors degrade to unauthenticated.
    pub async fn initialize(&self) -> BootOutcome {
        let session = match self.auth.check_session().await {
            Ok(Some(session)) => session,
            Ok(None) => {
                info!("no active session");
                return BootOutcome::Unauthenticated;
            }
            Err(e) => {
                warn!("session check failed: {}", e);
                return BootOutcome::Unauthenticated;
            }
        };
        BootOutcome::Ready(Box::new(self.load(session).await))
    }

    /// Build the journey for an already resolved session.
    pub async fn load(&self, session: Session) -> LoadedJourney {
        let (global, user) = tokio::join!(
            self.store.fetch_global_config(Some(&session)),
            self.store.fetch_user_data(&session)
        );

        let global_fetch_failed = global.is_err();
        let global = global
            .map_err(|e| warn!("global config unavailable, using built-in templates: {}", e))
            .ok();
        let user_fetch_failed = user.is_err();
        let user: UserDataRecord = user
            .map_err(|e| warn!("user data unavailable, starting from templates: {}", e))
            .unwrap_or_default();

        let templates = resolve_templates(global);
        let (quests, mut quests_source) = resolve_quests(user.quests, &templates.quests);
        if quests_source == DataSource::RemoteTemplate {
            quests_source = templates.quests_source;
        }
        let (inventory, mut inventory_source) = resolve_inventory(user.inventory, &templates.inventory);
        if inventory_source == DataSource::RemoteTemplate {
            inventory_source = templates.inventory_source;
        }

        let data = JourneyData {
            quests,
            inventory,
            currencies: CurrencyLedger::resolve(user.currencies.as_ref(), &self.currency.defaults),
            messages: user.messages.unwrap_or_default(),
            narratives: templates.narratives,
            // only ever from the user record
            flags: user.flags.unwrap_or_default(),
        };
        let sources = LoadSources {
            quests: quests_source,
            inventory: inventory_source,
            narratives: templates.narratives_source,
            global_fetch_failed,
            user_fetch_failed,
        };
        info!(
            "journey loaded for {}: {} quests ({:?}), {} items ({:?})",
            session.username,
            data.quests.len(),
            sources.quests,
            data.inventory.len(),
            sources.inventory
        );

        let mut state = JourneyState::new(data, session.role, self.currency.clone());
        if user_fetch_failed {
            state.hold_progress_saves();
        }
        LoadedJourney {
            session,
            state,
            sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::types::QuestType;
    use crate::remote::NarrativesRecord;

    #[test]
    fn lore_is_backfilled_only_when_missing() {
        let templates = vec![
            Quest::new(1, "A", QuestType::Main).with_lore("template lore"),
            Quest::new(2, "B", QuestType::Main).with_lore("other"),
        ];
        let saved = vec![
            Quest::new(1, "A (saved)", QuestType::Main),
            Quest::new(2, "B", QuestType::Main).with_lore("mine"),
            Quest::new(9, "Orphan", QuestType::Side),
        ];
        let (quests, source) = resolve_quests(Some(saved), &templates);
        assert_eq!(source, DataSource::UserRecord);
        assert_eq!(quests[0].lore.as_deref(), Some("template lore"));
        assert_eq!(quests[0].title, "A (saved)");
        assert_eq!(quests[1].lore.as_deref(), Some("mine"));
        assert_eq!(quests[2].lore, None);
    }

    #[test]
    fn empty_saved_collections_use_templates() {
        let templates = seed::quest_templates();
        let (quests, source) = resolve_quests(Some(Vec::new()), &templates);
        assert_eq!(quests, templates);
        assert_eq!(source, DataSource::RemoteTemplate);

        let items = seed::inventory_templates();
        assert_eq!(resolve_inventory(None, &items).0, items);
    }

    #[test]
    fn null_or_blank_template_fields_fall_back() {
        let record = GlobalConfigRecord {
            narratives: Some(NarrativesRecord {
                prologue: Some("   ".into()),
                epilogue: Some("The end".into()),
            }),
            quest_templates: Some(Vec::new()),
            inventory_templates: None,
        };
        let resolved = resolve_templates(Some(record));
        assert_eq!(resolved.quests_source, DataSource::CompiledIn);
        assert_eq!(resolved.inventory_source, DataSource::CompiledIn);
        assert_eq!(resolved.narratives.prologue, seed::DEFAULT_PROLOGUE);
        assert_eq!(resolved.narratives.epilogue, "The end");
        assert_eq!(resolved.narratives_source, DataSource::RemoteTemplate);
    }
}
