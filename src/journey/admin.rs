/// Admin authoring tools: quest, item and message editing plus the JSON export bundle.
///
/// These functions operate on plain collections. Permission checks and change events
/// live in [`JourneyState`](super::state::JourneyState).
use serde::{Deserialize, Serialize};

use super::errors::JourneyError;
use super::inventory::{find_by_name, next_item_id, PLACEHOLDER_IMAGE};
use super::quest::recompute_progress;
use super::types::{Item, ItemType, Message, Narratives, Quest, QuestTask, QuestType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created(u32),
    Updated(u32),
}

// ============================================================================
// Quests
// ============================================================================

pub fn next_quest_id(quests: &[Quest]) -> u32 {
    quests.iter().map(|q| q.id).max().unwrap_or(0) + 1
}

/// Starting point for a new quest in the editor.
pub fn new_quest_draft(quests: &[Quest]) -> Quest {
    Quest::new(next_quest_id(quests), "New Quest", QuestType::Side)
        .with_description("Quest description")
        .with_location("Location")
        .with_difficulty(3)
        .with_typed_reward("Primogems x50", ItemType::Currency)
        .with_task("Task 1")
}

fn validate_quest(quest: &Quest) -> Result<(), JourneyError> {
    if quest.title.trim().is_empty() {
        return Err(JourneyError::InvalidInput("quest title is empty".into()));
    }
    if !(1..=5).contains(&quest.difficulty) {
        return Err(JourneyError::InvalidInput(format!(
            "difficulty {} outside 1-5",
            quest.difficulty
        )));
    }
    Ok(())
}

/// Insert or replace a quest by id. Progress is re-derived from the edited tasks and
/// an existing claim marker is kept.
pub fn upsert_quest(quests: &mut Vec<Quest>, mut quest: Quest) -> Result<Upsert, JourneyError> {
    validate_quest(&quest)?;
    recompute_progress(&mut quest);

    match quests.iter_mut().find(|q| q.id == quest.id) {
        Some(existing) => {
            quest.rewards_claimed |= existing.rewards_claimed || quest.completed;
            *existing = quest;
            Ok(Upsert::Updated(existing.id))
        }
        None => {
            quest.rewards_claimed |= quest.completed;
            let id = quest.id;
            quests.push(quest);
            Ok(Upsert::Created(id))
        }
    }
}

pub fn delete_quest(quests: &mut Vec<Quest>, id: u32) -> Result<Quest, JourneyError> {
    let idx = quests
        .iter()
        .position(|q| q.id == id)
        .ok_or_else(|| JourneyError::NotFound(format!("quest {}", id)))?;
    Ok(quests.remove(idx))
}

/// Append a task to a quest, returning the new task id.
pub fn add_task(quest: &mut Quest, description: &str) -> u32 {
    let id = quest.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
    quest.tasks.push(QuestTask::new(id, description));
    recompute_progress(quest);
    id
}

pub fn remove_task(quest: &mut Quest, task_id: u32) -> Result<(), JourneyError> {
    let before = quest.tasks.len();
    quest.tasks.retain(|t| t.id != task_id);
    if quest.tasks.len() == before {
        return Err(JourneyError::NotFound(format!(
            "task {} in quest {}",
            task_id, quest.id
        )));
    }
    recompute_progress(quest);
    Ok(())
}

// ============================================================================
// Items
// ============================================================================

pub fn new_item_draft(items: &[Item]) -> Item {
    Item::new(next_item_id(items), "New Item", ItemType::Material, 3)
        .with_quantity(1)
        .with_description("Item description")
        .with_image(PLACEHOLDER_IMAGE)
}

/// Reject an inventory holding two spellings of one name.
pub fn check_unique_names(items: &[Item]) -> Result<(), JourneyError> {
    for (idx, item) in items.iter().enumerate() {
        if let Some(clash) = find_by_name(&items[..idx], &item.name) {
            return Err(JourneyError::InvalidInput(format!(
                "items {} and {} share the name {}",
                clash.id, item.id, item.name
            )));
        }
    }
    Ok(())
}

pub fn upsert_item(items: &mut Vec<Item>, item: Item) -> Result<Upsert, JourneyError> {
    if item.name.trim().is_empty() {
        return Err(JourneyError::InvalidInput("item name is empty".into()));
    }
    if !(1..=5).contains(&item.rarity) {
        return Err(JourneyError::InvalidInput(format!(
            "rarity {} outside 1-5",
            item.rarity
        )));
    }
    // names are the reward merge key
    if let Some(clash) = find_by_name(items, &item.name).filter(|i| i.id != item.id) {
        return Err(JourneyError::InvalidInput(format!(
            "item {} is already named {}",
            clash.id, clash.name
        )));
    }
    match items.iter_mut().find(|i| i.id == item.id) {
        Some(existing) => {
            *existing = item;
            Ok(Upsert::Updated(existing.id))
        }
        None => {
            let id = item.id;
            items.push(item);
            Ok(Upsert::Created(id))
        }
    }
}

pub fn delete_item(items: &mut Vec<Item>, id: u32) -> Result<Item, JourneyError> {
    let idx = items
        .iter()
        .position(|i| i.id == id)
        .ok_or_else(|| JourneyError::NotFound(format!("item {}", id)))?;
    Ok(items.remove(idx))
}

// ============================================================================
// Messages
// ============================================================================

pub fn upsert_message(messages: &mut Vec<Message>, message: Message) -> Result<Upsert, JourneyError> {
    if message.title.trim().is_empty() {
        return Err(JourneyError::InvalidInput("message title is empty".into()));
    }
    match messages.iter_mut().find(|m| m.id == message.id) {
        Some(existing) => {
            *existing = message;
            Ok(Upsert::Updated(existing.id))
        }
        None => {
            let id = message.id;
            messages.push(message);
            Ok(Upsert::Created(id))
        }
    }
}

// ============================================================================
// Export / import
// ============================================================================

/// Portable dump of authored content. On import every section is optional and only
/// the sections present replace local data.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quests: Option<Vec<Quest>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Vec<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prologue_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epilogue_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
}

impl ExportBundle {
    pub fn capture(
        quests: &[Quest],
        inventory: &[Item],
        narratives: &Narratives,
        messages: &[Message],
    ) -> Self {
        Self {
            quests: Some(quests.to_vec()),
            inventory: Some(inventory.to_vec()),
            prologue_text: Some(narratives.prologue.clone()),
            epilogue_text: Some(narratives.epilogue.clone()),
            messages: Some(messages.to_vec()),
        }
    }

    pub fn to_json(&self) -> Result<String, JourneyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, JourneyError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_none()
            && self.inventory.is_none()
            && self.prologue_text.is_none()
            && self.epilogue_text.is_none()
            && self.messages.is_none()
    }
}
