/// Quest progress tracking and completion rewards.
///
/// Progress is always derived from the task checklist. Toggling a task produces a new
/// quest collection; comparing the old and new collections by quest id finds the quests
/// that just crossed into completion, and only those have their rewards applied.
use std::collections::HashMap;

use super::currency::{CurrencyKind, CurrencyLedger, CurrencyNames};
use super::inventory::{apply_reward, MergeOutcome, RewardGrant};
use super::reward::parse_reward;
use super::types::{Item, Quest, QuestTask};

/// Percentage of completed tasks, rounded half up. A quest without tasks is at 0%.
pub fn compute_progress(tasks: &[QuestTask]) -> u8 {
    let total = tasks.len();
    if total == 0 {
        return 0;
    }
    let done = tasks.iter().filter(|t| t.completed).count();
    ((100 * done + total / 2) / total) as u8
}

/// Re-derive `progress` and `completed` from the checklist.
pub fn recompute_progress(quest: &mut Quest) {
    quest.progress = compute_progress(&quest.tasks);
    quest.completed = !quest.tasks.is_empty() && quest.progress == 100;
}

/// Bring loaded or authored quests in line with their checklists. A quest that is
/// already complete when it arrives counts as claimed, so loading never pays out.
pub fn normalize_quests(mut quests: Vec<Quest>) -> Vec<Quest> {
    for quest in quests.iter_mut() {
        recompute_progress(quest);
        quest.rewards_claimed |= quest.completed;
    }
    quests
}

/// Flip one task and return the updated collection. Unknown ids leave it unchanged.
pub fn toggle_task(quests: &[Quest], quest_id: u32, task_id: u32) -> Vec<Quest> {
    quests
        .iter()
        .map(|quest| {
            if quest.id != quest_id || quest.task(task_id).is_none() {
                return quest.clone();
            }
            let mut updated = quest.clone();
            for task in updated.tasks.iter_mut().filter(|t| t.id == task_id) {
                task.completed = !task.completed;
            }
            recompute_progress(&mut updated);
            updated
        })
        .collect()
}

/// Ids of quests present in both collections whose `completed` went false -> true.
pub fn detect_completions(previous: &[Quest], next: &[Quest]) -> Vec<u32> {
    let before: HashMap<u32, bool> = previous.iter().map(|q| (q.id, q.completed)).collect();
    next.iter()
        .filter(|q| q.completed && before.get(&q.id) == Some(&false))
        .map(|q| q.id)
        .collect()
}

/// Parse a quest's rewards, pairing each with its positional `rewardTypes` entry.
/// Unparseable rewards are returned separately so callers can log them.
pub fn reward_grants(quest: &Quest) -> (Vec<RewardGrant>, Vec<String>) {
    let mut grants = Vec::new();
    let mut skipped = Vec::new();
    for (idx, raw) in quest.rewards.iter().enumerate() {
        match parse_reward(raw) {
            Some(parsed) => {
                let mut grant = RewardGrant::from(parsed);
                grant.kind = quest
                    .reward_types
                    .as_ref()
                    .and_then(|types| types.get(idx).copied());
                grants.push(grant);
            }
            None => skipped.push(raw.clone()),
        }
    }
    (grants, skipped)
}

/// What one completion paid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardReport {
    pub quest_id: u32,
    /// (counter, amount credited, new total)
    pub currency: Vec<(CurrencyKind, u64, u64)>,
    pub items: Vec<MergeOutcome>,
    pub skipped: Vec<String>,
}

/// Apply completion rewards for the given quest ids.
///
/// Each reward credits the ledger when its name is a reserved currency and is always
/// merged into the inventory as well. Quests whose rewards were already claimed are
/// skipped, and every paid quest is marked claimed.
pub fn grant_completion_rewards(
    quests: &mut [Quest],
    completed_ids: &[u32],
    ledger: &mut CurrencyLedger,
    inventory: &mut Vec<Item>,
    names: &CurrencyNames,
) -> Vec<RewardReport> {
    let mut reports = Vec::new();
    for quest in quests.iter_mut() {
        if !completed_ids.contains(&quest.id) || quest.rewards_claimed {
            continue;
        }

        let (grants, skipped) = reward_grants(quest);
        let mut report = RewardReport {
            quest_id: quest.id,
            currency: Vec::new(),
            items: Vec::new(),
            skipped,
        };
        for grant in &grants {
            if let Some(kind) = names.classify(&grant.name) {
                let total = ledger.credit(kind, grant.quantity);
                report.currency.push((kind, grant.quantity, total));
            }
            report.items.push(apply_reward(inventory, grant));
        }
        quest.rewards_claimed = true;
        reports.push(report);
    }
    reports
}

/// Detailed quest card for the terminal.
pub fn format_quest_status(quest: &Quest) -> String {
    let mut output = format!("=== {} ===\n", quest.title);
    output.push_str(&format!(
        "{} | {} | Difficulty: {}/5\n",
        quest.kind.label(),
        quest.location,
        quest.difficulty
    ));
    output.push_str(&format!("Progress: {}%\n", quest.progress));

    for task in &quest.tasks {
        let status = if task.completed { "x" } else { " " };
        output.push_str(&format!("[{}] {}. {}\n", status, task.id, task.description));
    }

    if !quest.rewards.is_empty() {
        output.push_str(&format!("Rewards: {}\n", quest.rewards.join(", ")));
    }
    if let Some(lore) = &quest.lore {
        output.push_str(&format!("Lore: {}\n", lore));
    }
    output
}

/// One line per quest, active first then completed.
pub fn format_quest_list(quests: &[Quest]) -> Vec<String> {
    if quests.is_empty() {
        return vec!["No quests yet.".to_string()];
    }
    let mut lines = Vec::new();
    for quest in quests.iter().filter(|q| !q.completed) {
        lines.push(format!(
            "{}. {} [{}] {}%",
            quest.id,
            quest.title,
            quest.kind.label(),
            quest.progress
        ));
    }
    for quest in quests.iter().filter(|q| q.completed) {
        lines.push(format!("{}. {} [{}] done", quest.id, quest.title, quest.kind.label()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::currency::CurrencyDefaults;
    use crate::journey::types::{ItemType, QuestType};

    fn four_task_quest() -> Quest {
        Quest::new(1, "The Outlander Who Caught the Wind", QuestType::Main)
            .with_reward("Primogems x60")
            .with_reward("Mora x20,000")
            .with_task("Talk to the Knights of Favonius")
            .with_task("Investigate the Statue of The Seven")
            .with_task("Defeat the Ruin Guard")
            .with_task("Return to Jean")
    }

    #[test]
    fn progress_rounds_half_up() {
        let mut tasks: Vec<QuestTask> = (1..=8).map(|i| QuestTask::new(i, "t")).collect();
        tasks[0].completed = true;
        assert_eq!(compute_progress(&tasks), 13); // 12.5
        let mut three: Vec<QuestTask> = (1..=3).map(|i| QuestTask::new(i, "t")).collect();
        three[0].completed = true;
        assert_eq!(compute_progress(&three), 33);
        three[1].completed = true;
        assert_eq!(compute_progress(&three), 67);
    }

    #[test]
    fn zero_task_quest_is_never_complete() {
        let mut quest = Quest::new(9, "Empty", QuestType::Side);
        quest.completed = true;
        quest.progress = 100;
        recompute_progress(&mut quest);
        assert_eq!(quest.progress, 0);
        assert!(!quest.completed);

        let toggled = toggle_task(&[quest.clone()], 9, 1);
        assert_eq!(toggled[0], quest);
    }

    #[test]
    fn toggle_touches_only_target() {
        let other = Quest::new(2, "Other", QuestType::Side).with_task("a");
        let quests = vec![four_task_quest(), other.clone()];
        let next = toggle_task(&quests, 1, 2);

        assert!(next[0].tasks[1].completed);
        assert_eq!(next[0].progress, 25);
        assert_eq!(next[1], other);
        // input untouched
        assert!(!quests[0].tasks[1].completed);
    }

    #[test]
    fn toggle_is_reversible() {
        let mut quests = vec![four_task_quest()];
        for task in 1..=4 {
            quests = toggle_task(&quests, 1, task);
        }
        assert!(quests[0].completed);
        quests = toggle_task(&quests, 1, 4);
        assert_eq!(quests[0].progress, 75);
        assert!(!quests[0].completed);
    }

    #[test]
    fn unknown_ids_are_noops() {
        let quests = vec![four_task_quest()];
        assert_eq!(toggle_task(&quests, 42, 1), quests);
        assert_eq!(toggle_task(&quests, 1, 42), quests);
    }

    #[test]
    fn detects_completion_by_id_after_reordering() {
        let mut q1 = Quest::new(1, "One", QuestType::Main);
        let mut q2 = Quest::new(2, "Two", QuestType::Main);
        q2.completed = true;
        let previous = vec![q1.clone(), q2.clone()];
        q1.completed = true;
        let next = vec![q2, q1];
        assert_eq!(detect_completions(&previous, &next), vec![1]);
    }

    #[test]
    fn new_quests_do_not_count_as_transitions() {
        let mut fresh = Quest::new(5, "Unlocked", QuestType::Main);
        fresh.completed = true;
        assert!(detect_completions(&[], &[fresh]).is_empty());
    }

    #[test]
    fn reward_grants_pair_types_by_position() {
        let quest = Quest::new(1, "Q", QuestType::Main)
            .with_typed_reward("Skyward Blade x1", ItemType::Weapon)
            .with_typed_reward("a song", ItemType::Material)
            .with_reward("Mora x5");
        let (grants, skipped) = reward_grants(&quest);
        assert_eq!(grants.len(), 2);
        assert_eq!(grants[0].kind, Some(ItemType::Weapon));
        assert_eq!(grants[1].kind, None);
        assert_eq!(skipped, vec!["a song".to_string()]);
    }

    #[test]
    fn grants_once_and_marks_claimed() {
        let names = CurrencyNames::default();
        let mut ledger = CurrencyDefaults::default().ledger();
        let mut inventory = Vec::new();
        let mut quests = vec![four_task_quest()];

        let reports =
            grant_completion_rewards(&mut quests, &[1], &mut ledger, &mut inventory, &names);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].currency.len(), 2);
        assert!(quests[0].rewards_claimed);
        assert_eq!(ledger.primogems, 1280 + 60);

        let again =
            grant_completion_rewards(&mut quests, &[1], &mut ledger, &mut inventory, &names);
        assert!(again.is_empty());
        assert_eq!(ledger.primogems, 1280 + 60);
        assert_eq!(inventory.len(), 2);
    }

    #[test]
    fn formats_quest_views() {
        let quest = four_task_quest().with_location("Mondstadt").with_difficulty(5);
        let card = format_quest_status(&quest);
        assert!(card.contains("=== The Outlander Who Caught the Wind ==="));
        assert!(card.contains("Difficulty: 5/5"));
        assert!(card.contains("[ ] 4. Return to Jean"));

        let lines = format_quest_list(&[quest]);
        assert_eq!(lines, vec!["1. The Outlander Who Caught the Wind [Main] 0%".to_string()]);
    }
}
