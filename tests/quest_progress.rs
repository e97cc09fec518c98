/// Task toggling, completion detection and one-time reward payout through the state holder.
mod common;

use soulbound::journey::inventory::{find_by_name, item_quantity};
use soulbound::journey::{
    CurrencyConfig, CurrencyKind, JourneyData, JourneyState, MergeOutcome, Quest, QuestType,
    StateEvent,
};
use soulbound::session::Role;

fn state_with(quests: Vec<Quest>) -> JourneyState {
    let config = CurrencyConfig::default();
    let mut data = JourneyData::defaults(&config.defaults);
    data.flags.prologue_watched = true;
    data.quests = quests;
    JourneyState::new(data, Role::Player, config)
}

#[test]
fn test_finishing_last_task_pays_rewards() {
    let mut state = common::fresh_state(Role::Player);
    state.enter_public().unwrap();

    let reports = state.toggle_task(1, 4);
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.quest_id, 1);
    assert!(report.skipped.is_empty());
    assert_eq!(
        report.currency,
        vec![
            (CurrencyKind::Experience, 500, 1_750),
            (CurrencyKind::Premium, 60, 1_340),
            (CurrencyKind::Soft, 20_000, 70_000),
        ]
    );

    let ledger = state.ledger();
    assert_eq!(ledger.adventure_exp, 1_750);
    assert_eq!(ledger.primogems, 1_340);
    assert_eq!(ledger.mora, 70_000);

    // the existing Primogems stack grows, the other rewards become new entries
    let inventory = state.inventory();
    assert_eq!(item_quantity(inventory, "Primogems"), 1_340);
    assert_eq!(find_by_name(inventory, "Adventure EXP").unwrap().id, 4);
    assert_eq!(find_by_name(inventory, "Mora").unwrap().id, 5);
    assert!(matches!(report.items[1], MergeOutcome::Stacked { item_id: 3, .. }));

    let quest = state.quest(1).unwrap();
    assert!(quest.completed);
    assert!(quest.rewards_claimed);
    assert_eq!(quest.progress, 100);
}

#[test]
fn test_rewards_are_paid_once() {
    let mut state = common::fresh_state(Role::Player);
    state.toggle_task(1, 4);
    let ledger = *state.ledger();
    let inventory = state.inventory().to_vec();

    // uncheck and check again
    assert!(state.toggle_task(1, 4).is_empty());
    assert_eq!(state.quest(1).unwrap().progress, 75);
    assert!(!state.quest(1).unwrap().completed);
    assert!(state.toggle_task(1, 4).is_empty());
    assert!(state.quest(1).unwrap().completed);

    assert_eq!(*state.ledger(), ledger);
    assert_eq!(state.inventory(), inventory.as_slice());
}

#[test]
fn test_loaded_complete_quest_never_pays() {
    // quest 3 ships complete: reopening and finishing it again pays nothing
    let mut state = common::fresh_state(Role::Player);
    let before = *state.ledger();
    assert!(state.toggle_task(3, 1).is_empty());
    assert!(state.toggle_task(3, 1).is_empty());
    assert!(state.quest(3).unwrap().completed);
    assert_eq!(*state.ledger(), before);
}

#[test]
fn test_completion_is_matched_by_id_not_position() {
    let quests = vec![
        Quest::new(20, "Second", QuestType::Side)
            .with_reward("Primogems x7")
            .with_task("only"),
        Quest::new(10, "First", QuestType::Side)
            .with_reward("Mora x5")
            .with_task("only"),
    ];
    let mut state = state_with(quests);
    let before = *state.ledger();

    let reports = state.toggle_task(10, 1);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].quest_id, 10);
    assert_eq!(state.ledger().mora, before.mora + 5);
    assert_eq!(state.ledger().primogems, before.primogems);
    assert!(!state.quest(20).unwrap().rewards_claimed);
}

#[test]
fn test_unparseable_rewards_are_skipped() {
    let quests = vec![Quest::new(1, "Odd", QuestType::Side)
        .with_reward("A warm feeling")
        .with_reward("Hero's Wit x2")
        .with_task("only")];
    let mut state = state_with(quests);
    let reports = state.toggle_task(1, 1);
    assert_eq!(reports[0].skipped, vec!["A warm feeling".to_string()]);
    assert_eq!(reports[0].items.len(), 1);
    assert_eq!(item_quantity(state.inventory(), "Hero's Wit"), 2);
}

#[test]
fn test_zero_task_quest_stays_open() {
    let empty = Quest::new(1, "Empty", QuestType::Commission).with_reward("Mora x1");
    let mut state = state_with(vec![empty]);
    let mut events = state.subscribe();
    let quest = state.quest(1).unwrap();
    assert_eq!(quest.progress, 0);
    assert!(!quest.completed);

    assert!(state.toggle_task(1, 1).is_empty());
    assert!(events.try_recv().is_err());
    assert!(!state.all_quests_complete());
}

#[test]
fn test_unknown_ids_do_not_emit() {
    let mut state = common::fresh_state(Role::Player);
    let mut events = state.subscribe();
    assert!(state.toggle_task(99, 1).is_empty());
    assert!(state.toggle_task(1, 99).is_empty());
    assert!(events.try_recv().is_err());
}

#[test]
fn test_toggle_emits_progress_snapshot() {
    let mut state = common::fresh_state(Role::Player);
    state.enter_public().unwrap();
    let mut events = state.subscribe();
    state.toggle_task(2, 3);

    match events.try_recv().unwrap() {
        StateEvent::Progress(snapshot) => {
            let quest = snapshot.quests.iter().find(|q| q.id == 2).unwrap();
            assert_eq!(quest.progress, 60);
            assert_eq!(snapshot.currencies, *state.ledger());
        }
        other => panic!("unexpected event {other:?}"),
    }
    // players never publish templates
    assert!(events.try_recv().is_err());
}

#[test]
fn test_epilogue_gate() {
    let mut state = common::fresh_state(Role::Player);
    assert!(!state.all_quests_complete());
    state.toggle_task(1, 4);
    for task in 3..=5 {
        state.toggle_task(2, task);
    }
    for task in 4..=7 {
        state.toggle_task(4, task);
    }
    assert!(state.all_quests_complete());
}

#[test]
fn test_four_task_quest_from_empty_inventory() {
    let quest = Quest::new(1, "Four Steps", QuestType::Main)
        .with_reward("Primogems x60")
        .with_reward("Mora x20,000")
        .with_completed_task("one")
        .with_completed_task("two")
        .with_completed_task("three")
        .with_task("four");
    let config = CurrencyConfig::default();
    let mut data = JourneyData::defaults(&config.defaults);
    data.flags.prologue_watched = true;
    data.quests = vec![quest];
    data.inventory.clear();
    let mut state = JourneyState::new(data, Role::Player, config);
    assert_eq!(state.quest(1).unwrap().progress, 75);
    let before = *state.ledger();

    state.toggle_task(1, 4);
    assert_eq!(state.quest(1).unwrap().progress, 100);
    assert_eq!(state.ledger().primogems, before.primogems + 60);
    assert_eq!(state.ledger().mora, before.mora + 20_000);

    let rows: Vec<(&str, Option<u64>)> = state
        .inventory()
        .iter()
        .map(|i| (i.name.as_str(), i.quantity))
        .collect();
    assert_eq!(rows, vec![("Primogems", Some(60)), ("Mora", Some(20_000))]);
}

#[test]
fn test_progress_invariant_over_toggle_sequence() {
    let mut state = common::fresh_state(Role::Player);
    let sequence = [(1, 1), (2, 5), (4, 2), (1, 1), (4, 7), (2, 1), (3, 3), (4, 2), (2, 5)];
    for (quest_id, task_id) in sequence.iter().cycle().take(40) {
        state.toggle_task(*quest_id, *task_id);
        for quest in state.quests() {
            let done = quest.tasks.iter().filter(|t| t.completed).count();
            let total = quest.tasks.len();
            let expected = ((100 * done + total / 2) / total) as u8;
            assert_eq!(quest.progress, expected, "quest {}", quest.id);
            assert_eq!(quest.completed, expected == 100, "quest {}", quest.id);
        }
    }
}
