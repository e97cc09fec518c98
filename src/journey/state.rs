//! Root state holder for one traveler's journey.
//!
//! [`JourneyState`] owns every collection and is the only place they change. Each
//! mutation that should be persisted emits a [`StateEvent`] to subscribers; the
//! auto-save scheduler is the usual subscriber. Construction never emits.
use log::{debug, info, warn};
use rand::Rng;
use tokio::sync::mpsc;

use crate::logutil::escape_log;
use crate::session::Role;

use super::admin::{self, ExportBundle, Upsert};
use super::currency::{CurrencyConfig, CurrencyDefaults, CurrencyLedger, CurrencyNames};
use super::errors::JourneyError;
use super::inbox;
use super::quest::{self, RewardReport};
use super::seed;
use super::types::{Item, Message, MessagePriority, Narratives, Quest, UserFlags};
use super::wish::{self, WishKind, WishOutcome};

/// Which surface the traveler is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Loading,
    Auth,
    Cutscene,
    Selection,
    Public,
    Admin,
}

/// Everything saved under the user's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub quests: Vec<Quest>,
    pub inventory: Vec<Item>,
    pub currencies: CurrencyLedger,
    pub messages: Vec<Message>,
    pub flags: UserFlags,
}

/// Global templates published from the admin surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSnapshot {
    pub quests: Vec<Quest>,
    pub inventory: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    Narratives(Narratives),
    Progress(ProgressSnapshot),
    Templates(TemplateSnapshot),
}

/// Initial collections handed to [`JourneyState::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyData {
    pub quests: Vec<Quest>,
    pub inventory: Vec<Item>,
    pub currencies: CurrencyLedger,
    pub messages: Vec<Message>,
    pub narratives: Narratives,
    pub flags: UserFlags,
}

impl JourneyData {
    /// Compiled-in content with baseline balances.
    pub fn defaults(currencies: &CurrencyDefaults) -> Self {
        Self {
            quests: seed::quest_templates(),
            inventory: seed::inventory_templates(),
            currencies: currencies.ledger(),
            messages: Vec::new(),
            narratives: seed::default_narratives(),
            flags: UserFlags::default(),
        }
    }
}

pub struct JourneyState {
    mode: AppMode,
    role: Role,
    quests: Vec<Quest>,
    inventory: Vec<Item>,
    ledger: CurrencyLedger,
    messages: Vec<Message>,
    narratives: Narratives,
    flags: UserFlags,
    currency: CurrencyConfig,
    subscribers: Vec<mpsc::UnboundedSender<StateEvent>>,
    // set when the saved record could not be read, so it must not be overwritten
    progress_held: bool,
}

impl JourneyState {
    pub fn new(data: JourneyData, role: Role, currency: CurrencyConfig) -> Self {
        let mode = if data.flags.prologue_watched {
            AppMode::Selection
        } else {
            AppMode::Cutscene
        };
        Self {
            mode,
            role,
            quests: quest::normalize_quests(data.quests),
            inventory: data.inventory,
            ledger: data.currencies,
            messages: data.messages,
            narratives: data.narratives,
            flags: data.flags,
            currency,
            subscribers: Vec::new(),
            progress_held: false,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn quest(&self, id: u32) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn inventory(&self) -> &[Item] {
        &self.inventory
    }

    pub fn ledger(&self) -> &CurrencyLedger {
        &self.ledger
    }

    pub fn currency_names(&self) -> &CurrencyNames {
        &self.currency.names
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn narratives(&self) -> &Narratives {
        &self.narratives
    }

    pub fn flags(&self) -> UserFlags {
        self.flags
    }

    pub fn progress_saves_held(&self) -> bool {
        self.progress_held
    }

    pub fn progress_snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            quests: self.quests.clone(),
            inventory: self.inventory.clone(),
            currencies: self.ledger,
            messages: self.messages.clone(),
            flags: self.flags,
        }
    }

    pub fn template_snapshot(&self) -> TemplateSnapshot {
        TemplateSnapshot {
            quests: self.quests.clone(),
            inventory: self.inventory.clone(),
        }
    }

    // ------------------------------------------------------------------
    // Change events
    // ------------------------------------------------------------------

    /// Register a listener for change events. Only changes made after this call are
    /// delivered.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<StateEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: StateEvent) {
        // drop listeners whose receiver is gone
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Stop emitting [`StateEvent::Progress`] for the rest of the session. Used when the
    /// user's saved record could not be fetched: local changes still apply, but saving
    /// them would replace the real record with one built from templates.
    pub fn hold_progress_saves(&mut self) {
        if !self.progress_held {
            warn!("progress saves held for this session; the saved record was not loaded");
            self.progress_held = true;
        }
    }

    fn emit_progress(&mut self) {
        if self.progress_held {
            debug!("progress change kept local");
            return;
        }
        self.emit(StateEvent::Progress(self.progress_snapshot()));
    }

    /// Quests or inventory changed: persist the user record, and republish templates
    /// while an admin is on the admin surface.
    fn collections_changed(&mut self) {
        self.emit_progress();
        if self.mode == AppMode::Admin && self.role == Role::Admin {
            self.emit(StateEvent::Templates(self.template_snapshot()));
        }
    }

    fn progress_changed(&mut self) {
        self.emit_progress();
    }

    fn require_admin_surface(&self) -> Result<(), JourneyError> {
        if self.role != Role::Admin {
            return Err(JourneyError::PermissionDenied(
                "admin role required".to_string(),
            ));
        }
        if self.mode != AppMode::Admin {
            return Err(JourneyError::PermissionDenied(
                "admin tools are only available on the admin surface".to_string(),
            ));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Quest progress
    // ------------------------------------------------------------------

    /// Toggle one task and pay out any quest that just completed.
    pub fn toggle_task(&mut self, quest_id: u32, task_id: u32) -> Vec<RewardReport> {
        let next = quest::toggle_task(&self.quests, quest_id, task_id);
        if next == self.quests {
            debug!("toggle ignored: quest {} task {}", quest_id, task_id);
            return Vec::new();
        }

        let completed = quest::detect_completions(&self.quests, &next);
        self.quests = next;
        let reports = quest::grant_completion_rewards(
            &mut self.quests,
            &completed,
            &mut self.ledger,
            &mut self.inventory,
            &self.currency.names,
        );
        for report in &reports {
            info!(
                "quest {} completed: {} currency credits, {} inventory updates",
                report.quest_id,
                report.currency.len(),
                report.items.len()
            );
            for skipped in &report.skipped {
                debug!("unparseable reward skipped: {}", escape_log(skipped));
            }
        }
        self.collections_changed();
        reports
    }

    /// Add a quest unless one with the same id already exists.
    pub fn unlock_quest(&mut self, quest: Quest) -> bool {
        if self.quests.iter().any(|q| q.id == quest.id) {
            return false;
        }
        info!("quest unlocked: {} ({})", quest.title, quest.id);
        self.quests.extend(quest::normalize_quests(vec![quest]));
        self.collections_changed();
        true
    }

    pub fn make_wish<R: Rng + ?Sized>(&mut self, kind: WishKind, rng: &mut R) -> WishOutcome {
        let outcome = wish::make_wish(kind, &self.quests, rng);
        if let Some(quest) = &outcome.unlocked {
            self.unlock_quest(quest.clone());
        }
        outcome
    }

    pub fn all_quests_complete(&self) -> bool {
        !self.quests.is_empty() && self.quests.iter().all(|q| q.completed)
    }

    // ------------------------------------------------------------------
    // Inbox
    // ------------------------------------------------------------------

    pub fn open_message(&mut self, id: u32) -> Result<Message, JourneyError> {
        let was_unread = self.messages.iter().any(|m| m.id == id && !m.read);
        let message = inbox::open_message(&mut self.messages, id)?;
        if was_unread {
            self.progress_changed();
        }
        Ok(message)
    }

    pub fn delete_message(&mut self, id: u32) -> Result<Message, JourneyError> {
        let removed = inbox::delete_message(&mut self.messages, id)?;
        self.progress_changed();
        Ok(removed)
    }

    pub fn mark_all_read(&mut self) -> usize {
        let changed = inbox::mark_all_read(&mut self.messages);
        if changed > 0 {
            self.progress_changed();
        }
        changed
    }

    // ------------------------------------------------------------------
    // Mode transitions
    // ------------------------------------------------------------------

    pub fn finish_prologue(&mut self) -> Result<(), JourneyError> {
        if self.mode != AppMode::Cutscene {
            return Err(JourneyError::InvalidTransition(format!(
                "prologue is not playing ({:?})",
                self.mode
            )));
        }
        self.mode = AppMode::Selection;
        if !self.flags.prologue_watched {
            self.flags.prologue_watched = true;
            self.progress_changed();
        }
        Ok(())
    }

    /// Watch the prologue again; the watched flag stays set.
    pub fn replay_prologue(&mut self) -> Result<(), JourneyError> {
        match self.mode {
            AppMode::Selection | AppMode::Public | AppMode::Admin => {
                self.mode = AppMode::Cutscene;
                Ok(())
            }
            other => Err(JourneyError::InvalidTransition(format!(
                "cannot replay prologue from {:?}",
                other
            ))),
        }
    }

    pub fn enter_public(&mut self) -> Result<(), JourneyError> {
        if self.mode != AppMode::Selection {
            return Err(JourneyError::InvalidTransition(format!(
                "cannot open the quest log from {:?}",
                self.mode
            )));
        }
        self.mode = AppMode::Public;
        Ok(())
    }

    pub fn enter_admin(&mut self) -> Result<(), JourneyError> {
        if self.role != Role::Admin {
            warn!("admin surface refused for non-admin session");
            return Err(JourneyError::PermissionDenied(
                "admin role required".to_string(),
            ));
        }
        match self.mode {
            AppMode::Selection | AppMode::Public => {
                self.mode = AppMode::Admin;
                Ok(())
            }
            other => Err(JourneyError::InvalidTransition(format!(
                "cannot open admin tools from {:?}",
                other
            ))),
        }
    }

    /// Leave the public or admin surface for the selection screen.
    pub fn back_to_selection(&mut self) -> Result<(), JourneyError> {
        match self.mode {
            AppMode::Public | AppMode::Admin => {
                self.mode = AppMode::Selection;
                Ok(())
            }
            other => Err(JourneyError::InvalidTransition(format!(
                "nothing to leave from {:?}",
                other
            ))),
        }
    }

    /// Restore compiled-in quests and inventory, baseline balances and an empty inbox.
    /// The prologue flag is kept.
    pub fn factory_reset(&mut self) {
        let defaults = JourneyData::defaults(&self.currency.defaults);
        self.quests = defaults.quests;
        self.inventory = defaults.inventory;
        self.ledger = defaults.currencies;
        self.messages.clear();
        info!("journey reset to defaults");
        self.progress_changed();
    }

    // ------------------------------------------------------------------
    // Admin authoring
    // ------------------------------------------------------------------

    pub fn admin_upsert_quest(&mut self, quest: Quest) -> Result<Upsert, JourneyError> {
        self.require_admin_surface()?;
        let result = admin::upsert_quest(&mut self.quests, quest)?;
        self.collections_changed();
        Ok(result)
    }

    pub fn admin_delete_quest(&mut self, id: u32) -> Result<Quest, JourneyError> {
        self.require_admin_surface()?;
        let removed = admin::delete_quest(&mut self.quests, id)?;
        self.collections_changed();
        Ok(removed)
    }

    pub fn admin_upsert_item(&mut self, item: Item) -> Result<Upsert, JourneyError> {
        self.require_admin_surface()?;
        let result = admin::upsert_item(&mut self.inventory, item)?;
        self.collections_changed();
        Ok(result)
    }

    pub fn admin_delete_item(&mut self, id: u32) -> Result<Item, JourneyError> {
        self.require_admin_surface()?;
        let removed = admin::delete_item(&mut self.inventory, id)?;
        self.collections_changed();
        Ok(removed)
    }

    pub fn admin_compose_message(
        &mut self,
        title: &str,
        content: &str,
        priority: MessagePriority,
    ) -> Result<u32, JourneyError> {
        self.require_admin_surface()?;
        let message = inbox::compose(&self.messages, title, content, priority);
        let id = message.id;
        admin::upsert_message(&mut self.messages, message)?;
        self.progress_changed();
        Ok(id)
    }

    pub fn admin_upsert_message(&mut self, message: Message) -> Result<Upsert, JourneyError> {
        self.require_admin_surface()?;
        let result = admin::upsert_message(&mut self.messages, message)?;
        self.progress_changed();
        Ok(result)
    }

    pub fn admin_delete_message(&mut self, id: u32) -> Result<Message, JourneyError> {
        self.require_admin_surface()?;
        self.delete_message(id)
    }

    pub fn set_narratives(&mut self, narratives: Narratives) -> Result<(), JourneyError> {
        self.require_admin_surface()?;
        if narratives == self.narratives {
            return Ok(());
        }
        debug!("narratives updated: {}", escape_log(&narratives.prologue));
        self.narratives = narratives;
        self.emit(StateEvent::Narratives(self.narratives.clone()));
        Ok(())
    }

    pub fn export_bundle(&self) -> ExportBundle {
        ExportBundle::capture(&self.quests, &self.inventory, &self.narratives, &self.messages)
    }

    /// Replace the sections present in the bundle.
    pub fn import_bundle(&mut self, bundle: ExportBundle) -> Result<(), JourneyError> {
        self.require_admin_surface()?;
        if bundle.is_empty() {
            return Err(JourneyError::InvalidInput("bundle has no sections".to_string()));
        }
        if let Some(inventory) = &bundle.inventory {
            admin::check_unique_names(inventory)?;
        }

        let mut narratives = self.narratives.clone();
        if let Some(prologue) = bundle.prologue_text {
            narratives.prologue = prologue;
        }
        if let Some(epilogue) = bundle.epilogue_text {
            narratives.epilogue = epilogue;
        }
        if narratives != self.narratives {
            self.narratives = narratives;
            self.emit(StateEvent::Narratives(self.narratives.clone()));
        }

        let touches_collections =
            bundle.quests.is_some() || bundle.inventory.is_some() || bundle.messages.is_some();
        if let Some(quests) = bundle.quests {
            self.quests = quest::normalize_quests(quests);
        }
        if let Some(inventory) = bundle.inventory {
            self.inventory = inventory;
        }
        if let Some(messages) = bundle.messages {
            self.messages = messages;
        }
        if touches_collections {
            self.collections_changed();
        }
        info!("bundle imported");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn state(role: Role) -> JourneyState {
        let config = CurrencyConfig::default();
        let mut data = JourneyData::defaults(&config.defaults);
        data.flags.prologue_watched = true;
        JourneyState::new(data, role, config)
    }

    #[test]
    fn starts_in_cutscene_until_prologue_watched() {
        let config = CurrencyConfig::default();
        let mut s = JourneyState::new(JourneyData::defaults(&config.defaults), Role::Player, config);
        assert_eq!(s.mode(), AppMode::Cutscene);
        let mut rx = s.subscribe();
        s.finish_prologue().unwrap();
        assert_eq!(s.mode(), AppMode::Selection);
        assert!(s.flags().prologue_watched);
        assert!(matches!(rx.try_recv(), Ok(StateEvent::Progress(_))));
        assert!(s.finish_prologue().is_err());
    }

    #[test]
    fn toggle_emits_progress_and_pays_once() {
        let mut s = state(Role::Player);
        let mut rx = s.subscribe();
        let reports = s.toggle_task(1, 4);
        assert_eq!(reports.len(), 1);
        assert_eq!(s.ledger().primogems, 1280 + 60);
        assert!(matches!(rx.try_recv(), Ok(StateEvent::Progress(_))));
        assert!(rx.try_recv().is_err());

        s.toggle_task(1, 4);
        assert!(s.toggle_task(1, 4).is_empty());
        assert_eq!(s.ledger().primogems, 1280 + 60);
    }

    #[test]
    fn unknown_toggle_emits_nothing() {
        let mut s = state(Role::Player);
        let mut rx = s.subscribe();
        assert!(s.toggle_task(99, 1).is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn admin_gating() {
        let mut player = state(Role::Player);
        assert!(matches!(player.enter_admin(), Err(JourneyError::PermissionDenied(_))));
        assert!(player.admin_delete_quest(1).is_err());

        let mut keeper = state(Role::Admin);
        assert!(keeper.admin_delete_quest(1).is_err());
        keeper.enter_admin().unwrap();
        let mut rx = keeper.subscribe();
        keeper.admin_delete_quest(1).unwrap();
        assert!(matches!(rx.try_recv(), Ok(StateEvent::Progress(_))));
        assert!(matches!(rx.try_recv(), Ok(StateEvent::Templates(_))));
    }

    #[test]
    fn wish_unlocks_quest_once() {
        let mut s = state(Role::Player);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(s.make_wish(WishKind::Single, &mut rng).unlocked.is_some());
        assert!(s.make_wish(WishKind::Ten, &mut rng).unlocked.is_none());
        assert_eq!(s.quests().len(), 5);
        assert_eq!(s.ledger().primogems, 1280);
    }

    #[test]
    fn held_progress_stays_local() {
        let mut keeper = state(Role::Admin);
        keeper.hold_progress_saves();
        assert!(keeper.progress_saves_held());
        let mut rx = keeper.subscribe();

        keeper.toggle_task(1, 4);
        assert_eq!(keeper.ledger().primogems, 1280 + 60);
        assert!(rx.try_recv().is_err());

        // templates are not part of the user record
        keeper.enter_admin().unwrap();
        keeper.admin_delete_quest(2).unwrap();
        assert!(matches!(rx.try_recv(), Ok(StateEvent::Templates(_))));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dropped_subscriber_is_pruned() {
        let mut s = state(Role::Player);
        let rx = s.subscribe();
        drop(rx);
        s.toggle_task(1, 4);
        assert!(s.subscribers.is_empty());
    }
}
