//! The registry of resource types the client knows about. Generic code goes through
//! [`ResourceKind`] to resolve a type by name or ID prefix, and through [`ApiObject`] to decode
//! responses whose type is only known at runtime.

use std::convert::{TryFrom, TryInto};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::{Address, ListOptions, ListResponse, Parcel, Resource};
use crate::client::{Client, ClientError, Result};
use crate::{Object, ObjectId};

/// Every resource type known to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Address,
    Parcel,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Address, ResourceKind::Parcel];

    /// The type name, matching the `object` tag the API puts on every object
    pub const fn name(self) -> &'static str {
        match self {
            ResourceKind::Address => "Address",
            ResourceKind::Parcel => "Parcel",
        }
    }

    /// The collection endpoint, relative to the API base URL
    pub const fn collection(self) -> &'static str {
        match self {
            ResourceKind::Address => "addresses",
            ResourceKind::Parcel => "parcels",
        }
    }

    /// The key request bodies are wrapped in (e.g. `{"parcel": {...}}`)
    pub const fn key(self) -> &'static str {
        match self {
            ResourceKind::Address => "address",
            ResourceKind::Parcel => "parcel",
        }
    }

    /// The prefix of every ID the API hands out for this type
    pub const fn id_prefix(self) -> &'static str {
        match self {
            ResourceKind::Address => "adr",
            ResourceKind::Parcel => "prcl",
        }
    }

    /// Resolves the kind an ID belongs to from its prefix
    pub fn from_id(id: &ObjectId) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.id_prefix() == id.prefix())
    }

    pub(crate) fn member_path(self, id: &ObjectId) -> String {
        format!("{}/{}", self.collection(), id)
    }

    pub(crate) fn wrap(self, params: Object) -> Result<Value> {
        let mut body = Map::new();
        body.insert(self.key().to_owned(), serde_json::to_value(params)?);
        Ok(Value::Object(body))
    }

    /// Retrieves an object of this kind, dispatching to the concrete type's implementation
    pub async fn retrieve(self, client: &Client, id: &ObjectId) -> Result<ApiObject> {
        Ok(match self {
            ResourceKind::Address => ApiObject::Address(Address::retrieve(client, id).await?),
            ResourceKind::Parcel => ApiObject::Parcel(Parcel::retrieve(client, id).await?),
        })
    }

    /// Creates an object of this kind, dispatching to the concrete type's implementation
    pub async fn create(self, client: &Client, params: Object) -> Result<ApiObject> {
        Ok(match self {
            ResourceKind::Address => ApiObject::Address(Address::create(client, params).await?),
            ResourceKind::Parcel => ApiObject::Parcel(Parcel::create(client, params).await?),
        })
    }

    /// Updates an object of this kind, dispatching to the concrete type's implementation
    pub async fn update(
        self,
        client: &Client,
        id: &ObjectId,
        params: Object,
    ) -> Result<ApiObject> {
        Ok(match self {
            ResourceKind::Address => {
                ApiObject::Address(Address::update(client, id, params).await?)
            }
            ResourceKind::Parcel => ApiObject::Parcel(Parcel::update(client, id, params).await?),
        })
    }

    /// Lists objects of this kind, dispatching to the concrete type's implementation. Kinds that
    /// cannot be listed fail here exactly as they do when called directly
    pub async fn list(
        self,
        client: &Client,
        opts: ListOptions,
    ) -> Result<ListResponse<ApiObject>> {
        Ok(match self {
            ResourceKind::Address => Address::all(client, opts).await?.map(ApiObject::Address),
            ResourceKind::Parcel => Parcel::all(client, opts).await?.map(ApiObject::Parcel),
        })
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = ClientError;

    /// Accepts the type name or the collection name, ignoring case
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| s.eq_ignore_ascii_case(k.name()) || s.eq_ignore_ascii_case(k.collection()))
            .ok_or_else(|| ClientError::UnknownResource(s.to_owned()))
    }
}

/// An object of any registered type, resolved from its `object` tag (or, failing that, its ID
/// prefix)
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ApiObject {
    Address(Address),
    Parcel(Parcel),
}

impl ApiObject {
    /// Retrieves any object by ID, picking the resource type from the ID prefix
    pub async fn retrieve<I>(client: &Client, id: I) -> Result<ApiObject>
    where
        I: TryInto<ObjectId>,
        I::Error: Into<ClientError>,
    {
        let parsed_id = id.try_into().map_err(|e| e.into())?;
        let kind = ResourceKind::from_id(&parsed_id)
            .ok_or_else(|| ClientError::UnknownResource(parsed_id.prefix().to_owned()))?;
        kind.retrieve(client, &parsed_id).await
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            ApiObject::Address(_) => ResourceKind::Address,
            ApiObject::Parcel(_) => ResourceKind::Parcel,
        }
    }

    pub fn object(&self) -> &Object {
        match self {
            ApiObject::Address(a) => a.object(),
            ApiObject::Parcel(p) => p.object(),
        }
    }

    pub fn as_parcel(&self) -> Option<&Parcel> {
        match self {
            ApiObject::Parcel(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            ApiObject::Address(a) => Some(a),
            _ => None,
        }
    }
}

impl TryFrom<Object> for ApiObject {
    type Error = ClientError;

    fn try_from(obj: Object) -> Result<Self> {
        let kind: ResourceKind = match (&obj.object, &obj.id) {
            (Some(tag), _) => tag.parse()?,
            (None, Some(id)) => {
                let parsed: ObjectId = id.parse()?;
                ResourceKind::from_id(&parsed)
                    .ok_or_else(|| ClientError::UnknownResource(parsed.prefix().to_owned()))?
            }
            (None, None) => {
                return Err(ClientError::Other(
                    "Object has neither a type tag nor an ID".into(),
                ))
            }
        };
        Ok(match kind {
            ResourceKind::Address => ApiObject::Address(obj.into()),
            ResourceKind::Parcel => ApiObject::Parcel(obj.into()),
        })
    }
}

impl<'de> Deserialize<'de> for ApiObject {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let obj = Object::deserialize(deserializer)?;
        ApiObject::try_from(obj).map_err(serde::de::Error::custom)
    }
}
