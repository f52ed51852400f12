//! Opaque identifier newtypes
//!
//! User and listing identifiers come from the identity provider and the
//! listing catalog respectively; message, notification and alert ids are
//! assigned by the backend store on creation. All of them are opaque strings
//! as far as this crate is concerned.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create from any string-like value
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(
    /// A user account identifier, as issued by the identity provider.
    UserId
);

opaque_id!(
    /// Identifier of a marketplace listing.
    ListingId
);

opaque_id!(
    /// Server-assigned identifier of a chat message.
    MessageId
);

opaque_id!(
    /// Server-assigned identifier of a notification record.
    NotificationId
);

opaque_id!(
    /// Server-assigned identifier of a price alert.
    AlertId
);
