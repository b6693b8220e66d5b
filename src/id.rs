/// Contains the implementation for API object IDs, which are composed of a short type prefix and an
/// opaque token joined by an underscore (e.g. `prcl_0f8e3ab1` or `adr_123`)
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid ID: {0:?}")]
    InvalidId(String),
    #[error("ID {0:?} is missing a type prefix")]
    MissingPrefix(String),
}

type Result<T> = std::result::Result<T, ParseError>;

/// A parsed representation of an object ID. The prefix identifies the kind of object the ID
/// belongs to and the token is treated as opaque. Examples of valid ID strings include:
/// `prcl_123`
/// `adr_e31fb8b2c6a511ed9b2bac1f6bc539ae`
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectId {
    prefix: String,
    token: String,
}

impl ObjectId {
    /// Returns the type prefix of the ID (the part before the first underscore)
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the opaque token part of the ID
    pub fn token(&self) -> &str {
        &self.token
    }

    fn parse_str(raw: &str) -> Result<Self> {
        let (prefix, token) = match raw.split_once('_') {
            Some(parts) => parts,
            None => return Err(ParseError::MissingPrefix(raw.to_owned())),
        };

        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(ParseError::MissingPrefix(raw.to_owned()));
        }

        if token.is_empty() || !token.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ParseError::InvalidId(raw.to_owned()));
        }

        Ok(ObjectId {
            prefix: prefix.to_owned(),
            token: token.to_owned(),
        })
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.prefix, self.token)
    }
}

impl FromStr for ObjectId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_str(s)
    }
}

impl From<&ObjectId> for ObjectId {
    fn from(id: &ObjectId) -> Self {
        id.clone()
    }
}

impl From<ObjectId> for String {
    fn from(id: ObjectId) -> Self {
        id.to_string()
    }
}

// No blanket implementation over AsRef<str> because it would conflict with the reflexive
// `TryFrom<T> for T`, so each string type gets its own
impl TryFrom<String> for ObjectId {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl TryFrom<&String> for ObjectId {
    type Error = ParseError;

    fn try_from(value: &String) -> Result<Self> {
        value.parse()
    }
}

impl TryFrom<&str> for ObjectId {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self> {
        value.parse()
    }
}
