//! Wishes: a cosmetic star roll that unlocks the wish-gated quest the first time.
//!
//! Wishing never debits the ledger; the banner prices are display text.
use rand::Rng;

use super::seed::{wish_quest, WISH_QUEST_ID};
use super::types::Quest;

/// Price labels shown on the banner, in premium currency.
pub const SINGLE_WISH_PRICE: u64 = 160;
pub const TEN_WISH_PRICE: u64 = 1600;

// Out of 1000 rolls.
const FIVE_STAR_ODDS: u32 = 6;
const FOUR_STAR_ODDS: u32 = 51;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishKind {
    Single,
    Ten,
}

impl WishKind {
    pub fn pulls(&self) -> usize {
        match self {
            WishKind::Single => 1,
            WishKind::Ten => 10,
        }
    }

    pub fn price(&self) -> u64 {
        match self {
            WishKind::Single => SINGLE_WISH_PRICE,
            WishKind::Ten => TEN_WISH_PRICE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishOutcome {
    pub kind: WishKind,
    /// Star rarity of each pull, 3 to 5.
    pub stars: Vec<u8>,
    /// Set when this wish unlocked a new quest.
    pub unlocked: Option<Quest>,
}

fn roll_star<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    let roll = rng.gen_range(0..1000);
    if roll < FIVE_STAR_ODDS {
        5
    } else if roll < FIVE_STAR_ODDS + FOUR_STAR_ODDS {
        4
    } else {
        3
    }
}

/// Roll the stars for one wish. A ten-pull always contains at least one 4-star.
pub fn roll_stars<R: Rng + ?Sized>(kind: WishKind, rng: &mut R) -> Vec<u8> {
    let mut stars: Vec<u8> = (0..kind.pulls()).map(|_| roll_star(rng)).collect();
    if kind == WishKind::Ten && stars.iter().all(|s| *s < 4) {
        if let Some(last) = stars.last_mut() {
            *last = 4;
        }
    }
    stars
}

/// Resolve a wish against the quest log. The wish quest is returned only when no
/// quest with its id exists yet.
pub fn make_wish<R: Rng + ?Sized>(kind: WishKind, quests: &[Quest], rng: &mut R) -> WishOutcome {
    let stars = roll_stars(kind, rng);
    let unlocked = if quests.iter().any(|q| q.id == WISH_QUEST_ID) {
        None
    } else {
        Some(wish_quest())
    };
    WishOutcome {
        kind,
        stars,
        unlocked,
    }
}

pub fn format_stars(stars: &[u8]) -> String {
    stars
        .iter()
        .map(|s| format!("{}*", s))
        .collect::<Vec<_>>()
        .join(" ")
}
