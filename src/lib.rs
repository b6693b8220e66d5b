//! An async client for the EasyPost shipping API.
//!
//! Every API object is a [`Resource`](resource::Resource). The trait carries default
//! implementations of the generic operations (retrieve, create, update, save and list) and each
//! resource type opts out of whatever the API does not offer for it. For example, parcels cannot
//! be listed:
//!
//! ```rust,no_run
//! use easypost::client::{Client, ClientError};
//! use easypost::resource::{ListOptions, Parcel, Resource};
//!
//! # async fn run() -> easypost::client::Result<()> {
//! let client = Client::new("EZTK...")?;
//! let parcel = Parcel::retrieve(&client, "prcl_123").await?;
//! println!("{:?}", parcel.weight());
//!
//! match Parcel::all(&client, ListOptions::default()).await {
//!     Err(ClientError::UnsupportedOperation { .. }) => (),
//!     _ => unreachable!(),
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod id;
pub mod object;
pub mod resource;

pub use id::ObjectId;
pub use object::Object;
pub use resource::{Address, ApiObject, Parcel, Resource, ResourceKind};

use serde::{Deserialize, Serialize};

/// The error body returned by the API for any non-success response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    /// Per field validation errors, passed through untouched
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
}
