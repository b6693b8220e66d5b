//! The generic resource abstraction and the resource types built on it.
//!
//! [`Resource`] plays the role of a base class: implementors supply their [`ResourceKind`] and
//! access to their underlying [`Object`], and get retrieve, create, update, save and list for
//! free. A type restricts its capability set by overriding an operation with one that fails with
//! [`ClientError::UnsupportedOperation`](crate::client::ClientError::UnsupportedOperation), the way
//! [`Parcel`] does for listing.

mod address;
mod parcel;
mod registry;

pub use address::Address;
pub use parcel::Parcel;
pub use registry::{ApiObject, ResourceKind};

use std::convert::TryInto;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{Client, ClientError, Result};
use crate::{Object, ObjectId};

/// The basic functionality of an API resource.
///
/// Please note that due to this being an `async_trait`, the types might look complicated. Look at
/// the code directly to see the simpler function signatures for implementation.
#[async_trait::async_trait]
pub trait Resource:
    From<Object> + Serialize + DeserializeOwned + Send + Sync + Sized + 'static
{
    /// The entry for this type in the resource registry
    const KIND: ResourceKind;

    /// Returns the underlying generic object
    fn object(&self) -> &Object;

    /// Consumes the resource, returning the underlying generic object
    fn into_object(self) -> Object;

    fn id(&self) -> Option<&str> {
        self.object().id.as_deref()
    }

    /// Fetches a single object by its ID
    async fn retrieve<I>(client: &Client, id: I) -> Result<Self>
    where
        I: TryInto<ObjectId> + Send,
        I::Error: Into<ClientError>,
    {
        let parsed_id = id.try_into().map_err(|e| e.into())?;
        debug!(resource = Self::KIND.name(), id = %parsed_id, "Retrieving object");
        client.get(&Self::KIND.member_path(&parsed_id)).await
    }

    /// Creates a new object from the given fields. Any ID or type tag set on `params` is ignored
    async fn create(client: &Client, params: Object) -> Result<Self> {
        debug!(resource = Self::KIND.name(), "Creating object");
        let body = Self::KIND.wrap(params.params())?;
        client.post(Self::KIND.collection(), &body).await
    }

    /// Updates the object with the given ID, setting the given fields
    async fn update<I>(client: &Client, id: I, params: Object) -> Result<Self>
    where
        I: TryInto<ObjectId> + Send,
        I::Error: Into<ClientError>,
    {
        let parsed_id = id.try_into().map_err(|e| e.into())?;
        debug!(resource = Self::KIND.name(), id = %parsed_id, "Updating object");
        let body = Self::KIND.wrap(params.params())?;
        client.put(&Self::KIND.member_path(&parsed_id), &body).await
    }

    /// Sends the current fields of this object to the API and replaces `self` with the stored
    /// result. The object must already have been created
    async fn save(&mut self, client: &Client) -> Result<()> {
        let id = self.id().ok_or(ClientError::MissingId)?.to_owned();
        let saved = Self::update(client, id.as_str(), self.object().params()).await?;
        *self = saved;
        Ok(())
    }

    /// Lists objects of this type, one page at a time
    async fn all(client: &Client, opts: ListOptions) -> Result<ListResponse<Self>> {
        debug!(resource = Self::KIND.name(), ?opts, "Listing objects");
        let page = client
            .get_with_query::<Map<String, Value>, _>(Self::KIND.collection(), &opts)
            .await?;
        ListResponse::from_page(Self::KIND, page)
    }
}

/// Paging options for list operations. All fields are optional and unset fields are not sent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Only return objects created before the object with this ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_id: Option<String>,
    /// Only return objects created after the object with this ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_datetime: Option<String>,
}

/// A single page of a list operation
#[derive(Debug, Clone)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T: DeserializeOwned> ListResponse<T> {
    /// Decodes a raw list page. The API keys the items by the collection name (e.g.
    /// `{"addresses": [...], "has_more": false}`)
    pub(crate) fn from_page(kind: ResourceKind, mut page: Map<String, Value>) -> Result<Self> {
        let raw_items = page.remove(kind.collection()).ok_or_else(|| {
            ClientError::Other(format!(
                "List response is missing the {:?} key",
                kind.collection()
            ))
        })?;
        Ok(ListResponse {
            items: serde_json::from_value(raw_items)?,
            has_more: page
                .get("has_more")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }
}

impl<T> ListResponse<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ListResponse<U> {
        ListResponse {
            items: self.items.into_iter().map(f).collect(),
            has_more: self.has_more,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_list_options_only_send_set_fields() {
        let opts = ListOptions {
            page_size: Some(20),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&opts).unwrap(),
            serde_json::json!({ "page_size": 20 })
        );
    }

    #[test]
    fn test_list_response_from_page() {
        let page = serde_json::json!({
            "addresses": [{"id": "adr_1", "object": "Address", "city": "Boston"}],
            "has_more": true,
        });
        let page = match page {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        let resp = ListResponse::<Address>::from_page(ResourceKind::Address, page)
            .expect("Should decode page");
        assert!(resp.has_more);
        assert_eq!(resp.items.len(), 1);
        assert_eq!(resp.items[0].id(), Some("adr_1"));
        assert_eq!(resp.items[0].city(), Some("Boston"));
    }

    #[test]
    fn test_list_response_missing_key() {
        let res = ListResponse::<Address>::from_page(ResourceKind::Address, Map::new());
        assert!(matches!(res, Err(ClientError::Other(_))));
    }
}
