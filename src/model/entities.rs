use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Closed Enumerations
// ============================================================================

/// A stored or submitted string that names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed enum whose wire and column representation is the
/// snake_case name of each variant.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Editorial category of a news article.
    NewsCategory ("news category") {
        News => "news",
        Announcement => "announcement",
        Regulation => "regulation",
        ServiceUpdate => "service_update",
    }
}

wire_enum! {
    /// Kind of information page. Clients group the page list by this value.
    PageType ("page type") {
        Service => "service",
        Regulation => "regulation",
        About => "about",
        General => "general",
    }
}

wire_enum! {
    /// What the `value` of a contact record holds.
    ContactType ("contact type") {
        Phone => "phone",
        Email => "email",
        Address => "address",
        Hours => "hours",
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A published news item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub summary: Option<String>,
    pub published_at: DateTime<Utc>,
    pub is_featured: bool,
    pub category: NewsCategory,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A photo in the public gallery. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub image_url: String,
    pub thumbnail_url: Option<String>,
    pub category: Option<String>,
    pub taken_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A static informational page addressed by its unique `slug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationPage {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub page_type: PageType,
    pub is_published: bool,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One contact channel of a department. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub id: i64,
    pub department: String,
    pub contact_type: ContactType,
    pub label: String,
    pub value: String,
    pub is_primary: bool,
    pub display_order: u32,
    pub created_at: DateTime<Utc>,
}
