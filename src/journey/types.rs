use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestType {
    #[default]
    Main,
    Side,
    Commission,
}

impl QuestType {
    pub fn label(&self) -> &'static str {
        match self {
            QuestType::Main => "Main",
            QuestType::Side => "Side",
            QuestType::Commission => "Commission",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Weapon,
    Artifact,
    Currency,
    #[default]
    Material,
}

/// One checklist line of a quest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestTask {
    pub id: u32,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

impl QuestTask {
    pub fn new(id: u32, description: &str) -> Self {
        Self {
            id,
            description: description.to_string(),
            completed: false,
        }
    }
}

/// A trackable objective. `progress` and `completed` are derived from `tasks`;
/// see [`crate::journey::quest::recompute_progress`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lore: Option<String>,
    #[serde(default)]
    pub rewards: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_types: Option<Vec<ItemType>>,
    #[serde(default)]
    pub progress: u8,
    #[serde(default = "default_difficulty")]
    pub difficulty: u8,
    #[serde(rename = "type", default)]
    pub kind: QuestType,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub tasks: Vec<QuestTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_quests: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_rewards: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_reward_types: Option<Vec<ItemType>>,
    /// Set once the completion rewards have been granted; never cleared by task toggles.
    #[serde(default)]
    pub rewards_claimed: bool,
}

fn default_difficulty() -> u8 {
    1
}

impl Quest {
    pub fn new(id: u32, title: &str, kind: QuestType) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: String::new(),
            location: String::new(),
            lore: None,
            rewards: Vec::new(),
            reward_types: None,
            progress: 0,
            difficulty: 1,
            kind,
            completed: false,
            tasks: Vec::new(),
            sub_quests: None,
            bonus_rewards: None,
            bonus_reward_types: None,
            rewards_claimed: false,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = location.to_string();
        self
    }

    pub fn with_lore(mut self, lore: &str) -> Self {
        self.lore = Some(lore.to_string());
        self
    }

    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = difficulty.clamp(1, 5);
        self
    }

    pub fn with_reward(mut self, reward: &str) -> Self {
        self.rewards.push(reward.to_string());
        self
    }

    /// Append a reward with an explicit item classification.
    pub fn with_typed_reward(mut self, reward: &str, kind: ItemType) -> Self {
        let mut types = self.reward_types.take().unwrap_or_default();
        // keep the parallel list aligned with rewards pushed untyped earlier
        types.resize(self.rewards.len(), ItemType::Currency);
        types.push(kind);
        self.rewards.push(reward.to_string());
        self.reward_types = Some(types);
        self
    }

    /// Append a task; ids are assigned sequentially starting at 1.
    pub fn with_task(mut self, description: &str) -> Self {
        let id = self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        self.tasks.push(QuestTask::new(id, description));
        self
    }

    pub fn with_completed_task(mut self, description: &str) -> Self {
        self = self.with_task(description);
        if let Some(task) = self.tasks.last_mut() {
            task.completed = true;
        }
        self
    }

    pub fn completed_task_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn task(&self, task_id: u32) -> Option<&QuestTask> {
        self.tasks.iter().find(|t| t.id == task_id)
    }
}

/// One inventory entry. `name` is the merge key for reward stacking (case-insensitive).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ItemType,
    #[serde(default = "default_rarity")]
    pub rarity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
}

fn default_rarity() -> u8 {
    3
}

impl Item {
    pub fn new(id: u32, name: &str, kind: ItemType, rarity: u8) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            rarity: rarity.clamp(1, 5),
            level: None,
            quantity: None,
            description: String::new(),
            image: String::new(),
            element: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_image(mut self, image: &str) -> Self {
        self.image = image.to_string();
        self
    }

    pub fn with_element(mut self, element: &str) -> Self {
        self.element = Some(element.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessagePriority {
    Low,
    #[default]
    Normal,
    High,
}

/// Admin-authored inbox entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub priority: MessagePriority,
}

/// Prologue and epilogue text shown by the cutscene screens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Narratives {
    pub prologue: String,
    pub epilogue: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserFlags {
    #[serde(default)]
    pub prologue_watched: bool,
}
