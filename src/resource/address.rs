use serde::{Deserialize, Serialize};

use super::{Resource, ResourceKind};
use crate::Object;

/// A postal address. Uses every generic resource operation as is, including listing
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Address(Object);

impl Address {
    pub fn street1(&self) -> Option<&str> {
        self.0.get_str("street1")
    }

    pub fn city(&self) -> Option<&str> {
        self.0.get_str("city")
    }

    pub fn state(&self) -> Option<&str> {
        self.0.get_str("state")
    }

    pub fn zip(&self) -> Option<&str> {
        self.0.get_str("zip")
    }

    pub fn country(&self) -> Option<&str> {
        self.0.get_str("country")
    }

    pub fn object_mut(&mut self) -> &mut Object {
        &mut self.0
    }
}

impl From<Object> for Address {
    fn from(obj: Object) -> Self {
        Address(obj)
    }
}

impl Resource for Address {
    const KIND: ResourceKind = ResourceKind::Address;

    fn object(&self) -> &Object {
        &self.0
    }

    fn into_object(self) -> Object {
        self.0
    }
}
