/// Wishes, the inbox and achievement evaluation on a live journey.
mod common;

use rand::rngs::StdRng;
use rand::SeedableRng;

use soulbound::journey::achievement::achievements_by_category;
use soulbound::journey::inbox::{format_inbox, unread_count};
use soulbound::journey::seed::WISH_QUEST_ID;
use soulbound::journey::{
    evaluate_achievements, quest_stats, AchievementCategory, JourneyError, MessagePriority,
    StateEvent, WishKind,
};
use soulbound::session::Role;

#[test]
fn test_first_wish_unlocks_quest_once() {
    let mut state = common::fresh_state(Role::Player);
    state.enter_public().unwrap();
    let ledger = *state.ledger();
    let mut events = state.subscribe();
    let mut rng = StdRng::seed_from_u64(7);

    let first = state.make_wish(WishKind::Single, &mut rng);
    assert_eq!(first.stars.len(), 1);
    let unlocked = first.unlocked.expect("first wish unlocks a quest");
    assert_eq!(unlocked.id, WISH_QUEST_ID);
    assert_eq!(state.quests().len(), 5);
    assert_eq!(state.quest(WISH_QUEST_ID).unwrap().progress, 0);
    assert!(matches!(events.try_recv(), Ok(StateEvent::Progress(_))));

    let second = state.make_wish(WishKind::Ten, &mut rng);
    assert_eq!(second.stars.len(), 10);
    assert!(second.unlocked.is_none());
    assert_eq!(state.quests().len(), 5);
    assert!(events.try_recv().is_err());

    // wishes are cosmetic
    assert_eq!(*state.ledger(), ledger);
}

#[test]
fn test_wish_quest_pays_its_rewards() {
    let mut state = common::fresh_state(Role::Player);
    state.make_wish(WishKind::Single, &mut StdRng::seed_from_u64(1));
    let before = *state.ledger();
    for task in 1..=4 {
        state.toggle_task(WISH_QUEST_ID, task);
    }
    assert_eq!(state.ledger().adventure_exp, before.adventure_exp + 400);
    assert_eq!(state.ledger().primogems, before.primogems + 50);
}

#[test]
fn test_inbox_flow() {
    let mut state = common::fresh_state(Role::Admin);
    state.enter_admin().unwrap();
    state
        .admin_compose_message("Welcome", "Your journey begins.", MessagePriority::High)
        .unwrap();
    state
        .admin_compose_message("Maintenance", "Servers down at noon.", MessagePriority::Low)
        .unwrap();
    state.back_to_selection().unwrap();
    state.enter_public().unwrap();

    assert_eq!(unread_count(state.messages()), 2);
    let opened = state.open_message(1).unwrap();
    assert!(opened.read);
    assert_eq!(opened.sender, "System Admin");
    assert_eq!(unread_count(state.messages()), 1);

    let mut events = state.subscribe();
    // opening an already read message saves nothing
    state.open_message(1).unwrap();
    assert!(events.try_recv().is_err());

    assert_eq!(state.mark_all_read(), 1);
    assert_eq!(state.mark_all_read(), 0);
    assert_eq!(state.delete_message(2).unwrap().title, "Maintenance");
    assert!(matches!(
        state.open_message(2),
        Err(JourneyError::NotFound(_))
    ));
    assert_eq!(format_inbox(state.messages()).len(), 1);
}

#[test]
fn test_achievements_follow_quest_log() {
    let mut state = common::fresh_state(Role::Player);
    let initial = evaluate_achievements(state.quests());
    assert_eq!(initial.len(), 7);
    let unlocked: Vec<&str> = initial
        .iter()
        .filter(|a| a.unlocked)
        .map(|a| a.title)
        .collect();
    // the starter commission ships complete
    assert_eq!(
        unlocked,
        vec!["First Steps", "Daily Dedication", "Perfect Execution"]
    );

    state.toggle_task(1, 4);
    for task in 3..=5 {
        state.toggle_task(2, task);
    }
    let after = evaluate_achievements(state.quests());
    let hunter = after.iter().find(|a| a.title == "Quest Hunter").unwrap();
    assert!(hunter.unlocked);
    assert_eq!(hunter.progress, 3);
    let main = after
        .iter()
        .find(|a| a.title == "Main Story Progress")
        .unwrap();
    assert!(main.unlocked);

    let combat = achievements_by_category(&after, Some(AchievementCategory::Combat));
    assert_eq!(combat.len(), 1);
    assert_eq!(achievements_by_category(&after, None).len(), 7);

    let stats = quest_stats(state.quests());
    assert_eq!(stats.total, 4);
    assert_eq!(stats.completed, 3);
}
