//! Conversation and message storage test functions

use std::collections::BTreeSet;

use souk_storage_traits::conversations::types::{ChangeKind, ConversationPatch};
use souk_storage_traits::conversations::ConversationStorage;
use souk_storage_traits::messages::types::NewChatMessage;
use souk_storage_traits::messages::MessageStorage;
use souk_storage_traits::{ConversationId, ListingId, Timestamp};

use super::{alice, bob, create_test_conversation};

/// Basic conversation save and lookup, by id and by key
pub fn test_save_and_find_conversation<S>(storage: S)
where
    S: ConversationStorage,
{
    let conversation = create_test_conversation("post-1");
    storage.save_conversation(conversation.clone()).unwrap();

    let found = storage
        .find_conversation_by_id(&conversation.id)
        .unwrap()
        .unwrap();
    assert_eq!(found.participants, conversation.participants);
    assert_eq!(found.listing.title, conversation.listing.title);

    let by_key = storage
        .find_conversation_by_key(&bob(), &alice(), &ListingId::new("post-1"))
        .unwrap()
        .unwrap();
    assert_eq!(by_key.id, conversation.id);

    let missing = storage
        .find_conversation_by_id(&ConversationId::new("missing"))
        .unwrap();
    assert!(missing.is_none());
}

/// The append-then-merge convention keeps the summary equal to the log tail
pub fn test_send_convention_keeps_summary_current<S>(storage: S)
where
    S: ConversationStorage + MessageStorage,
{
    let conversation = create_test_conversation("post-1");
    storage.save_conversation(conversation.clone()).unwrap();

    let message = storage
        .append_message(&conversation.id, NewChatMessage::text(alice(), "hello"))
        .unwrap();
    storage
        .merge_conversation(
            &conversation.id,
            ConversationPatch::message_sent("hello", alice(), message.sent_at),
        )
        .unwrap();

    let updated = storage
        .find_conversation_by_id(&conversation.id)
        .unwrap()
        .unwrap();
    assert_eq!(updated.last_message_text.as_deref(), Some("hello"));
    assert_eq!(updated.last_message_at, message.sent_at);
    assert_eq!(updated.read_by, BTreeSet::from([alice()]));
    assert!(!updated.notified);

    let log = storage.messages(&conversation.id).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].sent_at, updated.last_message_at);
}

/// Read-marker union is idempotent
pub fn test_read_marker_idempotence<S>(storage: S)
where
    S: ConversationStorage,
{
    let conversation = create_test_conversation("post-1");
    storage.save_conversation(conversation.clone()).unwrap();

    storage.add_read_participant(&conversation.id, &bob()).unwrap();
    storage.add_read_participant(&conversation.id, &bob()).unwrap();

    let read_by = storage
        .find_conversation_by_id(&conversation.id)
        .unwrap()
        .unwrap()
        .read_by;
    assert_eq!(read_by, BTreeSet::from([alice(), bob()]));
}

/// The notified CAS admits one winner per last-message timestamp
pub fn test_notified_cas_single_winner<S>(storage: S)
where
    S: ConversationStorage,
{
    let conversation = create_test_conversation("post-1");
    storage.save_conversation(conversation.clone()).unwrap();
    let at = conversation.last_message_at;

    assert!(storage.mark_notified_if_current(&conversation.id, at).unwrap());
    assert!(!storage.mark_notified_if_current(&conversation.id, at).unwrap());

    // A newer message re-arms the flag; the stale expectation keeps losing
    let newer = Timestamp::from_millis(at.as_millis() + 500);
    storage
        .merge_conversation(
            &conversation.id,
            ConversationPatch::message_sent("again", bob(), newer),
        )
        .unwrap();
    assert!(!storage.mark_notified_if_current(&conversation.id, at).unwrap());
    assert!(storage.mark_notified_if_current(&conversation.id, newer).unwrap());
}

/// Feeds replay current state and then deliver live changes in order
pub fn test_feed_replay_and_tail<S>(storage: S)
where
    S: ConversationStorage,
{
    let conversation = create_test_conversation("post-1");
    storage.save_conversation(conversation.clone()).unwrap();

    let feed = storage.subscribe_conversations_for_user(&bob()).unwrap();
    let replay = feed.drain();
    assert_eq!(replay.len(), 1);
    assert_eq!(replay[0].kind, ChangeKind::Added);

    storage.add_read_participant(&conversation.id, &bob()).unwrap();
    storage
        .merge_conversation(
            &conversation.id,
            ConversationPatch {
                notified: Some(true),
                ..Default::default()
            },
        )
        .unwrap();

    let tail = feed.drain();
    assert_eq!(tail.len(), 2);
    assert!(tail.iter().all(|c| c.kind == ChangeKind::Modified));
    assert!(tail[0].conversation.read_by.contains(&bob()));
    assert!(tail[1].conversation.notified);
}
