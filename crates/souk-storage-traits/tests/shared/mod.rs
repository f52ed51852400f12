//! Shared test functions exercised against any `SoukStorageProvider`

pub mod conversation_tests;
pub mod notification_tests;

use std::collections::BTreeSet;

use souk_storage_traits::conversations::types::{Conversation, ListingSummary};
use souk_storage_traits::{ConversationId, ListingId, Timestamp, UserId};

pub fn alice() -> UserId {
    UserId::new("alice@example.com")
}

pub fn bob() -> UserId {
    UserId::new("bob@example.com")
}

/// A fresh conversation between alice and bob about the given listing
pub fn create_test_conversation(listing: &str) -> Conversation {
    let listing_id = ListingId::new(listing);
    Conversation {
        id: ConversationId::derive(&alice(), &bob(), &listing_id),
        participants: [alice(), bob()],
        listing_id,
        listing: ListingSummary {
            title: "Mountain bike".to_string(),
            image_url: Some("https://img.example.com/bike.jpg".to_string()),
            price: 250.0,
        },
        last_message_text: None,
        last_message_sender: None,
        last_message_at: Timestamp::from_millis(1_000),
        read_by: BTreeSet::from([alice()]),
        notified: false,
        created_at: Timestamp::from_millis(1_000),
    }
}
