//! Item identifiers and content types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::error::ParseError;

/// Stable item identifier.
///
/// Backends hand out either numeric or string ids. Both forms serialize
/// untagged so persisted selections read back exactly as they were written.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl ItemId {
    /// Parse user input, preferring the numeric form when it fits.
    ///
    /// Only canonical integers become numbers, so `"007"` and `"+5"` stay
    /// text and print back exactly as typed.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(n) if n.to_string() == raw => Self::Number(n),
            _ => Self::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

/// The kind of content a bulk action operates on.
///
/// Each content type gets its own engine, selection and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    BlogPost,
    Sermon,
    Event,
    User,
}

impl ContentType {
    /// All content types, in display order.
    pub const ALL: [ContentType; 4] = [
        ContentType::BlogPost,
        ContentType::Sermon,
        ContentType::Event,
        ContentType::User,
    ];

    /// Stable snake_case name, used for storage keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BlogPost => "blog_post",
            Self::Sermon => "sermon",
            Self::Event => "event",
            Self::User => "user",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "blog_post" | "blog_posts" | "blog" | "post" | "posts" => Ok(Self::BlogPost),
            "sermon" | "sermons" => Ok(Self::Sermon),
            "event" | "events" => Ok(Self::Event),
            "user" | "users" => Ok(Self::User),
            _ => Err(ParseError::UnknownContentType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_parse_prefers_number() {
        assert_eq!(ItemId::parse("42"), ItemId::Number(42));
        assert_eq!(ItemId::parse(" post-7 "), ItemId::Text("post-7".to_string()));
        assert_eq!(ItemId::parse("-3"), ItemId::Number(-3));
    }

    #[test]
    fn test_item_id_parse_keeps_non_canonical_digits_as_text() {
        assert_eq!(ItemId::parse("007"), ItemId::Text("007".to_string()));
        assert_eq!(ItemId::parse("+5"), ItemId::Text("+5".to_string()));
        assert_eq!(ItemId::parse("007").to_string(), "007");
    }

    #[test]
    fn test_item_id_serializes_untagged() {
        let ids = vec![ItemId::Number(3), ItemId::from("abc")];
        let json = serde_json::to_string(&ids).unwrap();
        assert_eq!(json, r#"[3,"abc"]"#);

        let back: Vec<ItemId> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ids);
    }

    #[test]
    fn test_content_type_aliases() {
        assert_eq!("blog".parse::<ContentType>().unwrap(), ContentType::BlogPost);
        assert_eq!("Blog-Post".parse::<ContentType>().unwrap(), ContentType::BlogPost);
        assert_eq!("users".parse::<ContentType>().unwrap(), ContentType::User);
        assert!("podcast".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_content_type_display_matches_serde() {
        for ct in ContentType::ALL {
            let json = serde_json::to_string(&ct).unwrap();
            assert_eq!(json, format!("\"{}\"", ct));
        }
    }
}
