/// Inventory merging for quest rewards.
use super::reward::{format_quantity, ParsedReward};
use super::types::{Item, ItemType};

/// Rarity given to items synthesized from rewards.
pub const REWARD_ITEM_RARITY: u8 = 3;
pub const REWARD_ITEM_DESCRIPTION: &str = "Obtained from completing quests.";
pub const PLACEHOLDER_IMAGE: &str = "https://images.unsplash.com/photo-1743448111530-3654e7b66f26?crop=entropy&cs=tinysrgb&fit=max&fm=jpg&q=80&w=1080";

/// A reward ready to be merged: parsed name and quantity plus an optional explicit type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardGrant {
    pub name: String,
    pub quantity: u64,
    pub kind: Option<ItemType>,
}

impl RewardGrant {
    pub fn new(name: &str, quantity: u64) -> Self {
        Self {
            name: name.to_string(),
            quantity,
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: ItemType) -> Self {
        self.kind = Some(kind);
        self
    }
}

impl From<ParsedReward> for RewardGrant {
    fn from(parsed: ParsedReward) -> Self {
        Self {
            name: parsed.name,
            quantity: parsed.quantity,
            kind: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// An existing stack grew to `quantity`.
    Stacked { item_id: u32, quantity: u64 },
    /// A new entry was appended.
    Created { item_id: u32, quantity: u64 },
}

impl MergeOutcome {
    pub fn item_id(&self) -> u32 {
        match self {
            MergeOutcome::Stacked { item_id, .. } | MergeOutcome::Created { item_id, .. } => {
                *item_id
            }
        }
    }
}

// ============================================================================
// Inventory Operations
// ============================================================================

/// Classify a reward name when the quest did not say what it is.
pub fn infer_item_type(name: &str) -> ItemType {
    if name.contains("EXP") || name.contains("Mora") || name.contains("Primogems") {
        ItemType::Currency
    } else {
        // "Ore", "Wit", "Fate" and everything else are materials
        ItemType::Material
    }
}

/// Next id for a new entry: one past the current maximum.
pub fn next_item_id(items: &[Item]) -> u32 {
    items.iter().map(|i| i.id).max().unwrap_or(0) + 1
}

/// Case-insensitive lookup by name.
pub fn find_by_name<'a>(items: &'a [Item], name: &str) -> Option<&'a Item> {
    let needle = name.trim().to_lowercase();
    items.iter().find(|i| i.name.to_lowercase() == needle)
}

/// Quantity held under `name` (0 when absent or unquantified).
pub fn item_quantity(items: &[Item], name: &str) -> u64 {
    find_by_name(items, name)
        .and_then(|i| i.quantity)
        .unwrap_or(0)
}

/// Merge one reward into the inventory: grow the matching stack or append a new entry.
pub fn apply_reward(items: &mut Vec<Item>, grant: &RewardGrant) -> MergeOutcome {
    let needle = grant.name.trim().to_lowercase();
    if let Some(item) = items.iter_mut().find(|i| i.name.to_lowercase() == needle) {
        let quantity = item.quantity.unwrap_or(0).saturating_add(grant.quantity);
        item.quantity = Some(quantity);
        return MergeOutcome::Stacked {
            item_id: item.id,
            quantity,
        };
    }

    let item_id = next_item_id(items);
    let kind = grant.kind.unwrap_or_else(|| infer_item_type(&grant.name));
    items.push(
        Item::new(item_id, grant.name.trim(), kind, REWARD_ITEM_RARITY)
            .with_quantity(grant.quantity)
            .with_description(REWARD_ITEM_DESCRIPTION)
            .with_image(PLACEHOLDER_IMAGE),
    );
    MergeOutcome::Created {
        item_id,
        quantity: grant.quantity,
    }
}

/// Apply a batch of rewards to a copy of `items`. Each grant sees the effect of the
/// grants before it, so two rewards for the same new item produce one stack.
pub fn apply_rewards(items: &[Item], grants: &[RewardGrant]) -> Vec<Item> {
    let mut working = items.to_vec();
    for grant in grants {
        apply_reward(&mut working, grant);
    }
    working
}

/// Compact inventory listing for the terminal.
pub fn format_inventory_compact(items: &[Item]) -> Vec<String> {
    if items.is_empty() {
        return vec!["Empty".to_string()];
    }

    let mut lines = Vec::new();
    for item in items {
        let stars = "*".repeat(item.rarity as usize);
        let qty = match item.quantity {
            Some(q) => format!(" x{}", format_quantity(q)),
            None => String::new(),
        };
        let level = match item.level {
            Some(l) => format!(" Lv{}", l),
            None => String::new(),
        };
        lines.push(format!("{}. {}{}{} [{}]", item.id, item.name, qty, level, stars));
    }
    lines.push(format!("Total: {} entries", items.len()));
    lines
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn primogem_stack() -> Vec<Item> {
        vec![
            Item::new(1, "Skyward Blade", ItemType::Weapon, 5).with_level(70),
            Item::new(3, "Primogems", ItemType::Currency, 5).with_quantity(1280),
        ]
    }

    #[test]
    fn stacks_existing_case_insensitively() {
        let mut items = primogem_stack();
        let outcome = apply_reward(&mut items, &RewardGrant::new("primogems", 60));
        assert_eq!(
            outcome,
            MergeOutcome::Stacked {
                item_id: 3,
                quantity: 1340
            }
        );
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].rarity, 5);
    }

    #[test]
    fn stacking_onto_unquantified_item_starts_from_zero() {
        let mut items = primogem_stack();
        apply_reward(&mut items, &RewardGrant::new("Skyward Blade", 1));
        assert_eq!(items[0].quantity, Some(1));
        assert_eq!(items[0].level, Some(70));
    }

    #[test]
    fn creates_new_entry_with_fresh_id_and_defaults() {
        let mut items = primogem_stack();
        let outcome = apply_reward(&mut items, &RewardGrant::new("Hero's Wit", 3));
        assert_eq!(outcome.item_id(), 4);

        let wit = find_by_name(&items, "hero's wit").unwrap();
        assert_eq!(wit.kind, ItemType::Material);
        assert_eq!(wit.rarity, REWARD_ITEM_RARITY);
        assert_eq!(wit.quantity, Some(3));
        assert_eq!(wit.description, REWARD_ITEM_DESCRIPTION);
        assert_eq!(wit.image, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn explicit_kind_overrides_inference() {
        let mut items = Vec::new();
        apply_reward(
            &mut items,
            &RewardGrant::new("Mora Pouch", 1).with_kind(ItemType::Artifact),
        );
        assert_eq!(items[0].kind, ItemType::Artifact);
        assert_eq!(items[0].id, 1);
    }

    #[test]
    fn infers_types() {
        assert_eq!(infer_item_type("Adventure EXP"), ItemType::Currency);
        assert_eq!(infer_item_type("Mora"), ItemType::Currency);
        assert_eq!(infer_item_type("Primogems"), ItemType::Currency);
        assert_eq!(infer_item_type("Mystic Enhancement Ore"), ItemType::Material);
        assert_eq!(infer_item_type("Intertwined Fate"), ItemType::Material);
        assert_eq!(infer_item_type("Sweet Flower"), ItemType::Material);
    }

    #[test]
    fn batch_accumulates_without_losing_updates() {
        let items = primogem_stack();
        let grants = vec![
            RewardGrant::new("Mora", 100),
            RewardGrant::new("Primogems", 40),
            RewardGrant::new("MORA", 50),
            RewardGrant::new("Hero's Wit", 2),
        ];
        let merged = apply_rewards(&items, &grants);

        assert_eq!(merged.len(), 4);
        assert_eq!(item_quantity(&merged, "Mora"), 150);
        assert_eq!(item_quantity(&merged, "Primogems"), 1320);
        assert_eq!(find_by_name(&merged, "Hero's Wit").unwrap().id, 5);
        // source untouched
        assert_eq!(item_quantity(&items, "Primogems"), 1280);
    }

    #[test]
    fn next_id_on_empty_is_one() {
        assert_eq!(next_item_id(&[]), 1);
    }

    #[test]
    fn formats_compact_listing() {
        let lines = format_inventory_compact(&primogem_stack());
        assert_eq!(lines[0], "1. Skyward Blade Lv70 [*****]");
        assert_eq!(lines[1], "3. Primogems x1,280 [*****]");
        assert_eq!(lines[2], "Total: 2 entries");
        assert_eq!(format_inventory_compact(&[]), vec!["Empty".to_string()]);
    }
}
