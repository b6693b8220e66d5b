use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ListOptions, ListResponse, Resource, ResourceKind};
use crate::client::{Client, ClientError, Result};
use crate::Object;

/// The physical container being shipped. Dimensions are in inches and weight in ounces.
///
/// Parcels support every generic resource operation except listing: the API has no endpoint for
/// listing parcels, so [`Parcel::all`](Resource::all) always fails with
/// [`ClientError::UnsupportedOperation`] without contacting the API.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Parcel(Object);

impl Parcel {
    pub fn length(&self) -> Option<f64> {
        self.0.get_f64("length")
    }

    pub fn width(&self) -> Option<f64> {
        self.0.get_f64("width")
    }

    pub fn height(&self) -> Option<f64> {
        self.0.get_f64("height")
    }

    pub fn weight(&self) -> Option<f64> {
        self.0.get_f64("weight")
    }

    /// A carrier specific package name (e.g. `FlatRateEnvelope`) used instead of dimensions
    pub fn predefined_package(&self) -> Option<&str> {
        self.0.get_str("predefined_package")
    }

    pub fn object_mut(&mut self) -> &mut Object {
        &mut self.0
    }
}

impl From<Object> for Parcel {
    fn from(obj: Object) -> Self {
        Parcel(obj)
    }
}

#[async_trait::async_trait]
impl Resource for Parcel {
    const KIND: ResourceKind = ResourceKind::Parcel;

    fn object(&self) -> &Object {
        &self.0
    }

    fn into_object(self) -> Object {
        self.0
    }

    async fn all(_client: &Client, _opts: ListOptions) -> Result<ListResponse<Self>> {
        debug!("Refusing to list parcels, the API does not support it");
        Err(ClientError::UnsupportedOperation {
            resource: Self::KIND.name(),
            operation: "all",
        })
    }
}
