//! Wire records exchanged with the service. Every field the server may return as
//! `null` is optional here.
use serde::{Deserialize, Serialize};

use crate::journey::currency::{CurrencyLedger, PartialLedger};
use crate::journey::state::ProgressSnapshot;
use crate::journey::types::{Item, Message, Narratives, Quest, UserFlags};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NarrativesRecord {
    #[serde(default)]
    pub prologue: Option<String>,
    #[serde(default)]
    pub epilogue: Option<String>,
}

impl From<&Narratives> for NarrativesRecord {
    fn from(n: &Narratives) -> Self {
        Self {
            prologue: Some(n.prologue.clone()),
            epilogue: Some(n.epilogue.clone()),
        }
    }
}

/// `GET global/config`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfigRecord {
    #[serde(default)]
    pub narratives: Option<NarrativesRecord>,
    #[serde(default)]
    pub quest_templates: Option<Vec<Quest>>,
    #[serde(default)]
    pub inventory_templates: Option<Vec<Item>>,
}

/// `GET user/data?userId=`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserDataRecord {
    #[serde(default)]
    pub quests: Option<Vec<Quest>>,
    #[serde(default)]
    pub inventory: Option<Vec<Item>>,
    #[serde(default)]
    pub currencies: Option<PartialLedger>,
    #[serde(default)]
    pub messages: Option<Vec<Message>>,
    #[serde(default)]
    pub flags: Option<UserFlags>,
}

/// `POST user/save`. Absent sections are left untouched by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSave {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quests: Option<Vec<Quest>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<Vec<Item>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currencies: Option<CurrencyLedger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<UserFlags>,
}

impl ProgressSave {
    pub fn from_snapshot(user_id: &str, snapshot: &ProgressSnapshot) -> Self {
        Self {
            user_id: user_id.to_string(),
            quests: Some(snapshot.quests.clone()),
            inventory: Some(snapshot.inventory.clone()),
            currencies: Some(snapshot.currencies),
            messages: Some(snapshot.messages.clone()),
            flags: Some(snapshot.flags),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sections_decode_as_none() {
        let raw = r#"{"narratives":null,"questTemplates":null,"inventoryTemplates":[]}"#;
        let record: GlobalConfigRecord = serde_json::from_str(raw).unwrap();
        assert!(record.narratives.is_none());
        assert!(record.quest_templates.is_none());
        assert_eq!(record.inventory_templates, Some(Vec::new()));

        let user: UserDataRecord = serde_json::from_str(
            r#"{"quests":null,"inventory":null,"currencies":{"mora":3},"messages":null,"flags":{"prologueWatched":true}}"#,
        )
        .unwrap();
        assert_eq!(user.currencies.unwrap().mora, Some(3));
        assert!(user.flags.unwrap().prologue_watched);
    }

    #[test]
    fn save_body_uses_user_id_key() {
        let save = ProgressSave {
            user_id: "u-1".into(),
            quests: None,
            inventory: None,
            currencies: None,
            messages: None,
            flags: Some(UserFlags {
                prologue_watched: true,
            }),
        };
        let json = serde_json::to_value(&save).unwrap();
        assert_eq!(json["userId"], "u-1");
        assert!(json.get("quests").is_none());
        assert_eq!(json["flags"]["prologueWatched"], true);
    }
}
