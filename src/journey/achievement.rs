/// Achievements derived from the quest log.
///
/// Nothing here is stored: every achievement is recomputed from the current quest
/// collection whenever it is shown. Achievement rewards are display text only and are
/// never applied to the ledger or inventory.
use super::types::{Quest, QuestType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementCategory {
    Quests,
    Exploration,
    Combat,
    Collection,
}

impl AchievementCategory {
    pub fn label(&self) -> &'static str {
        match self {
            AchievementCategory::Quests => "Quests",
            AchievementCategory::Exploration => "Exploration",
            AchievementCategory::Combat => "Combat",
            AchievementCategory::Collection => "Collection",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub category: AchievementCategory,
    pub progress: usize,
    pub max_progress: usize,
    pub rewards: &'static [&'static str],
    pub unlocked: bool,
}

/// Aggregate numbers for the achievements header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuestStats {
    pub total: usize,
    pub completed: usize,
    /// Reward strings attached to completed quests.
    pub rewards_earned: usize,
    /// Mean progress, rounded; 0 for an empty log.
    pub average_progress: u8,
}

pub fn quest_stats(quests: &[Quest]) -> QuestStats {
    let total = quests.len();
    let completed: Vec<&Quest> = quests.iter().filter(|q| q.completed).collect();
    let average_progress = if total == 0 {
        0
    } else {
        let sum: usize = quests.iter().map(|q| q.progress as usize).sum();
        ((sum + total / 2) / total) as u8
    };
    QuestStats {
        total,
        completed: completed.len(),
        rewards_earned: completed.iter().map(|q| q.rewards.len()).sum(),
        average_progress,
    }
}

fn count_of(quests: &[Quest], kind: QuestType) -> (usize, usize) {
    let of_kind: Vec<&Quest> = quests.iter().filter(|q| q.kind == kind).collect();
    let done = of_kind.iter().filter(|q| q.completed).count();
    (done, of_kind.len())
}

fn threshold(
    id: u32,
    title: &'static str,
    description: &'static str,
    category: AchievementCategory,
    count: usize,
    target: usize,
    rewards: &'static [&'static str],
) -> Achievement {
    Achievement {
        id,
        title,
        description,
        category,
        progress: count.min(target),
        max_progress: target,
        rewards,
        unlocked: count >= target,
    }
}

fn complete_all(
    id: u32,
    title: &'static str,
    description: &'static str,
    (done, total): (usize, usize),
    rewards: &'static [&'static str],
) -> Achievement {
    Achievement {
        id,
        title,
        description,
        category: AchievementCategory::Quests,
        progress: done,
        max_progress: total,
        rewards,
        // an empty category is never "all complete"
        unlocked: total > 0 && done == total,
    }
}

/// Evaluate the fixed achievement list against the quest log.
pub fn evaluate_achievements(quests: &[Quest]) -> Vec<Achievement> {
    let completed = quests.iter().filter(|q| q.completed).count();
    let (side_done, _) = count_of(quests, QuestType::Side);
    let perfect = quests.iter().filter(|q| q.progress == 100).count();

    vec![
        threshold(
            1,
            "First Steps",
            "Complete your first quest in Teyvat",
            AchievementCategory::Quests,
            completed,
            1,
            &["Primogems x20", "Adventure EXP x100"],
        ),
        threshold(
            2,
            "Quest Hunter",
            "Complete 3 quests",
            AchievementCategory::Quests,
            completed,
            3,
            &["Primogems x50", "Hero's Wit x3"],
        ),
        threshold(
            3,
            "Master Adventurer",
            "Complete 5 quests",
            AchievementCategory::Quests,
            completed,
            5,
            &["Primogems x100", "Mystic Enhancement Ore x5"],
        ),
        complete_all(
            4,
            "Main Story Progress",
            "Complete all main quests",
            count_of(quests, QuestType::Main),
            &["Primogems x200", "Intertwined Fate x3"],
        ),
        threshold(
            5,
            "Side Quest Enthusiast",
            "Complete 3 side quests",
            AchievementCategory::Exploration,
            side_done,
            3,
            &["Primogems x60", "Mora x50,000"],
        ),
        complete_all(
            6,
            "Daily Dedication",
            "Complete all commission quests",
            count_of(quests, QuestType::Commission),
            &["Primogems x40", "Mora x20,000"],
        ),
        threshold(
            7,
            "Perfect Execution",
            "Complete a quest with 100% progress",
            AchievementCategory::Combat,
            perfect,
            1,
            &["Primogems x30"],
        ),
    ]
}

/// Filter evaluated achievements; `None` means all categories.
pub fn achievements_by_category(
    achievements: &[Achievement],
    category: Option<AchievementCategory>,
) -> Vec<&Achievement> {
    achievements
        .iter()
        .filter(|a| category.map_or(true, |c| a.category == c))
        .collect()
}

pub fn format_achievement(achievement: &Achievement) -> String {
    let mark = if achievement.unlocked { "*" } else { " " };
    format!(
        "[{}] {} ({}/{}) - {} [{}]",
        mark,
        achievement.title,
        achievement.progress,
        achievement.max_progress,
        achievement.description,
        achievement.category.label()
    )
}
