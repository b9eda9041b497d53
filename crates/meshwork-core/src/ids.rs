//! Strongly Typed Identifiers
//!
//! Type-safe identifier types for the meshwork platform. Using the newtype
//! pattern, these types prevent accidental misuse of different ID kinds at
//! compile time: a `NodeId` cannot be passed where a `NetworkId` is expected,
//! even though both wrap controller-issued strings.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Error type for ID parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// The underlying parse error message
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed UUID-backed ID type
macro_rules! define_uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

/// Macro to define a strongly-typed ID wrapping a controller-issued string key.
///
/// The keys are opaque by contract: parsing rejects only empty/blank input.
macro_rules! define_string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from a controller-issued key.
            ///
            /// Returns an error if the key is empty or blank; the key is
            /// otherwise treated as opaque.
            pub fn new(key: impl Into<String>) -> std::result::Result<Self, ParseIdError> {
                let key = key.into();
                if key.trim().is_empty() {
                    return Err(ParseIdError {
                        id_type: stringify!($name),
                        message: "key must not be empty".to_string(),
                    });
                }
                Ok(Self(key))
            }

            /// Returns the underlying key.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_uuid_id!(
    /// Strongly typed identifier for users.
    ///
    /// Users own networks and are the expiry sweep's unit of work.
    /// Provides compile-time type safety to prevent confusion with other ID types.
    ///
    /// # Example
    ///
    /// ```
    /// use meshwork_core::UserId;
    ///
    /// let user_id = UserId::new();
    /// println!("User: {}", user_id);
    /// ```
    UserId
);

define_string_id!(
    /// Strongly typed identifier for networks (`nwid`).
    ///
    /// The key is issued by the network controller and treated as opaque.
    ///
    /// # Example
    ///
    /// ```
    /// use meshwork_core::NetworkId;
    ///
    /// let nwid = NetworkId::new("8056c2e21c000001").unwrap();
    /// assert_eq!(nwid.as_str(), "8056c2e21c000001");
    /// ```
    NetworkId
);

define_string_id!(
    /// Strongly typed identifier for member devices (nodes).
    ///
    /// Together with a [`NetworkId`] it forms the composite member key.
    NodeId
);
