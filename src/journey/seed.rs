//! Compiled-in content used when the remote store has no templates, and after a
//! factory reset.
use super::quest::normalize_quests;
use super::types::{Item, ItemType, Narratives, Quest, QuestType};

const CRYSTAL_IMAGE: &str = "https://images.unsplash.com/photo-1743448111530-3654e7b66f26?crop=entropy&cs=tinysrgb&fit=max&fm=jpg&q=80&w=1080";
const SWORD_IMAGE: &str = "https://images.unsplash.com/photo-1757083840090-17a7bfca08c0?crop=entropy&cs=tinysrgb&fit=max&fm=jpg&q=80&w=1080";

pub const DEFAULT_PROLOGUE: &str = "Welcome to a Co-Op Journey Written in the Language of Stars.

In a quiet corner of the world, two travelers meet, not at the end of a quest, but at the beginning of one. The path ahead is stitched with lanternlight cafes, hidden bookshops, neon arcades, and the quiet hush of forest trails.

This record is not a duty, nor a binding oath,
but a remembrance of shared wonder.

Let the journey begin.";

pub const DEFAULT_EPILOGUE: &str = "EPILOGUE: SOULBOUND

There are meetings that feel like accident,
and there are the ones that carry the quiet weight of orchestration.

The quests were never the goal,
only the scaffolding that allowed you to witness each other: unhurried, unperformed, alive.

All achievements now complete, all maps inked to their edges, and yet the horizon has only just opened.

Soulbound is not finality.
It is the doorway.

So close the log, not because adventure has ended, but because the world has widened.

A lifetime of quests remains:
holy, ordinary, luminous.";

/// Id reserved for the quest unlocked by the first wish.
pub const WISH_QUEST_ID: u32 = 5;

pub fn default_narratives() -> Narratives {
    Narratives {
        prologue: DEFAULT_PROLOGUE.to_string(),
        epilogue: DEFAULT_EPILOGUE.to_string(),
    }
}

/// The starter quest log. Progress is derived from the task lists, and quests that
/// start completed are already marked claimed.
pub fn quest_templates() -> Vec<Quest> {
    let quests = vec![
        Quest::new(1, "The Outlander Who Caught the Wind", QuestType::Main)
            .with_description("Search for answers about your lost sibling in the vast world of Teyvat.")
            .with_location("Mondstadt")
            .with_difficulty(5)
            .with_reward("Adventure EXP x500")
            .with_reward("Primogems x60")
            .with_reward("Mora x20,000")
            .with_completed_task("Talk to the Knights of Favonius")
            .with_completed_task("Investigate the Statue of The Seven")
            .with_completed_task("Defeat the Ruin Guard")
            .with_task("Return to Jean"),
        Quest::new(2, "Dragon Storm", QuestType::Main)
            .with_description("Investigate the strange disturbances affecting Stormterror's Lair.")
            .with_location("Stormterror's Lair")
            .with_difficulty(4)
            .with_reward("Adventure EXP x300")
            .with_reward("Primogems x40")
            .with_completed_task("Enter Stormterror's Lair")
            .with_completed_task("Clear the area of monsters")
            .with_task("Activate the wind current")
            .with_task("Reach the summit")
            .with_task("Confront Stormterror"),
        Quest::new(3, "Mondstadt's Vigilant Protector", QuestType::Commission)
            .with_description("Help the Knights of Favonius patrol the city perimeter.")
            .with_location("Mondstadt City")
            .with_difficulty(2)
            .with_reward("Adventure EXP x100")
            .with_reward("Mora x10,000")
            .with_completed_task("Patrol the city gates")
            .with_completed_task("Defeat slimes near the bridge")
            .with_completed_task("Report back to Huffman"),
        Quest::new(4, "Lost Treasures of the Vale", QuestType::Side)
            .with_description("Discover ancient artifacts hidden throughout Brightcrown Canyon.")
            .with_location("Brightcrown Canyon")
            .with_difficulty(3)
            .with_reward("Adventure EXP x200")
            .with_reward("Hero's Wit x3")
            .with_completed_task("Find the first treasure chest")
            .with_completed_task("Solve the elemental puzzle")
            .with_completed_task("Defeat the treasure hoarders")
            .with_task("Locate the ancient ruins")
            .with_task("Unlock the sealed door")
            .with_task("Claim the treasure")
            .with_task("Return the artifact to Lisa"),
    ];
    normalize_quests(quests)
}

pub fn inventory_templates() -> Vec<Item> {
    vec![
        Item::new(1, "Skyward Blade", ItemType::Weapon, 5)
            .with_level(70)
            .with_description("A sword that symbolizes the noble Anemo winds.")
            .with_image(SWORD_IMAGE)
            .with_element("anemo"),
        Item::new(2, "Gladiator's Finale", ItemType::Artifact, 5)
            .with_description("A circlet that once belonged to a legendary gladiator.")
            .with_image(CRYSTAL_IMAGE),
        Item::new(3, "Primogems", ItemType::Currency, 5)
            .with_quantity(1280)
            .with_description(
                "A primordial crystalline gem that's beyond the understanding of the mortal realm.",
            )
            .with_image(CRYSTAL_IMAGE),
    ]
}

/// Quest granted by the first wish.
pub fn wish_quest() -> Quest {
    Quest::new(WISH_QUEST_ID, "Archon's Blessing", QuestType::Main)
        .with_description("A mysterious voice calls to you from beyond the stars. Seek out the forgotten shrine and uncover its ancient secrets.")
        .with_location("Starfell Valley")
        .with_difficulty(4)
        .with_reward("Adventure EXP x400")
        .with_reward("Primogems x50")
        .with_reward("Mystic Enhancement Ore x5")
        .with_lore("In the age before the Archon War, when the gods walked freely upon Teyvat, certain places were blessed with divine resonance. Starfell Valley holds one such shrine, hidden from mortal eyes by layers of time and elemental energy. The voice that calls to you is neither threat nor simple invitation; it is recognition. What awaits at the shrine may change the course of your journey forever.")
        .with_task("Find the hidden shrine in Starfell Valley")
        .with_task("Activate the elemental monuments")
        .with_task("Defeat the Abyss Mage")
        .with_task("Claim the Archon's blessing")
}
