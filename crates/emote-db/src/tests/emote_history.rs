use super::test_db;
use crate::{EmoteChangeType, RewardType};

const CHANNEL: &str = "77829817";

#[test]
fn test_query_recent_returns_latest_add_first() {
    let db = test_db();
    for i in 0..5 {
        db.create_emote_add(CHANNEL, RewardType::Seventv, &format!("emote{i}"), EmoteChangeType::Add)
            .unwrap();
    }

    let latest = db.get_emote_added(CHANNEL, RewardType::Seventv, 1).unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].emote_id, "emote4");

    let all = db.get_emote_added(CHANNEL, RewardType::Seventv, 10).unwrap();
    let ids: Vec<_> = all.iter().map(|e| e.emote_id.as_str()).collect();
    assert_eq!(ids, vec!["emote4", "emote3", "emote2", "emote1", "emote0"]);
}

#[test]
fn test_query_recent_filters_channel_type_and_change() {
    let db = test_db();
    db.create_emote_add(CHANNEL, RewardType::Bttv, "b1", EmoteChangeType::Add).unwrap();
    db.create_emote_add(CHANNEL, RewardType::Seventv, "s1", EmoteChangeType::Add).unwrap();
    db.create_emote_add(CHANNEL, RewardType::Bttv, "b1", EmoteChangeType::Remove).unwrap();
    db.create_emote_add("other", RewardType::Bttv, "b2", EmoteChangeType::Add).unwrap();

    let added = db.get_emote_added(CHANNEL, RewardType::Bttv, 10).unwrap();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].emote_id, "b1");
    assert_eq!(added[0].change_type, EmoteChangeType::Add);

    let removed = db
        .get_emote_changes(CHANNEL, RewardType::Bttv, EmoteChangeType::Remove, 10)
        .unwrap();
    assert_eq!(removed.len(), 1);
}

#[test]
fn test_active_count_ignores_removed_emotes() {
    let db = test_db();
    db.create_emote_add(CHANNEL, RewardType::Seventv, "a", EmoteChangeType::Add).unwrap();
    db.create_emote_add(CHANNEL, RewardType::Seventv, "b", EmoteChangeType::Add).unwrap();
    assert_eq!(db.count_active_emotes(CHANNEL, RewardType::Seventv).unwrap(), 2);
    assert!(db.is_emote_active(CHANNEL, RewardType::Seventv, "a").unwrap());

    db.create_emote_add(CHANNEL, RewardType::Seventv, "a", EmoteChangeType::Remove).unwrap();
    assert_eq!(db.count_active_emotes(CHANNEL, RewardType::Seventv).unwrap(), 1);
    assert!(!db.is_emote_active(CHANNEL, RewardType::Seventv, "a").unwrap());

    // re-adding after a removal counts again
    db.create_emote_add(CHANNEL, RewardType::Seventv, "a", EmoteChangeType::Add).unwrap();
    assert_eq!(db.count_active_emotes(CHANNEL, RewardType::Seventv).unwrap(), 2);
    assert_eq!(db.count_active_emotes(CHANNEL, RewardType::Bttv).unwrap(), 0);
}

#[test]
fn test_pagination_pages_are_disjoint_and_ordered() {
    let db = test_db();
    for i in 0..25 {
        db.create_emote_add(CHANNEL, RewardType::Bttv, &format!("e{i:02}"), EmoteChangeType::Add)
            .unwrap();
    }
    db.create_emote_add(CHANNEL, RewardType::Bttv, "gone", EmoteChangeType::Remove).unwrap();

    let page1 = db.get_emote_history(CHANNEL, 1, 10, true).unwrap();
    let page2 = db.get_emote_history(CHANNEL, 2, 10, true).unwrap();
    assert_eq!(page1.len(), 10);
    assert_eq!(page2.len(), 10);
    assert!(page1.iter().all(|a| page2.iter().all(|b| a.id != b.id)));

    let first_twenty = db.get_emote_added(CHANNEL, RewardType::Bttv, 20).unwrap();
    let joined: Vec<_> = page1.into_iter().chain(page2).collect();
    assert_eq!(joined, first_twenty);
    assert_eq!(joined[0].emote_id, "e24");
    assert_eq!(joined[19].emote_id, "e05");

    let page3 = db.get_emote_history(CHANNEL, 3, 10, true).unwrap();
    assert_eq!(page3.len(), 5);

    let others = db.get_emote_history(CHANNEL, 1, 10, false).unwrap();
    assert_eq!(others.len(), 1);
    assert_eq!(others[0].emote_id, "gone");
}

#[test]
fn test_pagination_clamps_page_below_one() {
    let db = test_db();
    db.create_emote_add(CHANNEL, RewardType::Bttv, "only", EmoteChangeType::Add).unwrap();

    let page0 = db.get_emote_history(CHANNEL, 0, 10, true).unwrap();
    assert_eq!(page0.len(), 1);
    assert_eq!(page0[0].emote_id, "only");
}

#[test]
fn test_pagination_far_past_the_end_is_empty() {
    let db = test_db();
    db.create_emote_add(CHANNEL, RewardType::Bttv, "only", EmoteChangeType::Add).unwrap();

    assert!(db.get_emote_history(CHANNEL, i64::MAX, 20, true).unwrap().is_empty());
    assert!(db.get_emote_history(CHANNEL, i64::MAX / 10, 20, false).unwrap().is_empty());
    assert!(db.get_emote_history(CHANNEL, 2, 20, true).unwrap().is_empty());
}
