//! Journey engine: quests, rewards, inventory, currencies and the state holder that
//! ties them together.
//!
//! Everything in this module is synchronous and free of I/O. Persistence is driven
//! from the outside by subscribing to [`StateEvent`]s.

pub mod achievement;
pub mod admin;
pub mod currency;
pub mod errors;
pub mod inbox;
pub mod inventory;
pub mod quest;
pub mod reward;
pub mod seed;
pub mod state;
pub mod types;
pub mod wish;

pub use achievement::{evaluate_achievements, quest_stats, Achievement, AchievementCategory, QuestStats};
pub use admin::{ExportBundle, Upsert};
pub use currency::{
    format_ledger, CurrencyConfig, CurrencyDefaults, CurrencyKind, CurrencyLedger, CurrencyNames,
    PartialLedger,
};
pub use errors::JourneyError;
pub use inventory::{apply_reward, apply_rewards, MergeOutcome, RewardGrant};
pub use quest::{
    compute_progress, detect_completions, grant_completion_rewards, recompute_progress,
    toggle_task, RewardReport,
};
pub use reward::{format_quantity, parse_reward, ParsedReward};
pub use state::{
    AppMode, JourneyData, JourneyState, ProgressSnapshot, StateEvent, TemplateSnapshot,
};
pub use types::{
    Item, ItemType, Message, MessagePriority, Narratives, Quest, QuestTask, QuestType, UserFlags,
};
pub use wish::{WishKind, WishOutcome};
