//! Type-safe identifiers for the engine's entities.
//!
//! Each identifier is a newtype wrapper around [`uuid::Uuid`] (v4) so
//! that, for example, an RSVP id can never be passed where an event id
//! is expected. All four wrappers share one declarative macro.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Creates an identifier from an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for an event.
    ///
    /// Used as the subscription key for the WebSocket live feed and as
    /// the scanning context for ticket validation.
    EventId
}

uuid_id! {
    /// Unique identifier for an attendee record.
    AttendeeId
}

uuid_id! {
    /// Unique identifier for an RSVP.
    ///
    /// Embedded in every ticket payload; the check-in CAS keys on it.
    RsvpId
}

uuid_id! {
    /// Unique identifier for an attendance record.
    AttendanceId
}
