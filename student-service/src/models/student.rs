use mongodb::bson::{self, doc, Document};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    pub city: String,
    pub country: String,
}

/// A student record as stored in the `students` collection.
///
/// `id` is the public identifier. MongoDB adds its own `_id` on insert,
/// which is not modelled here and is dropped on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub age: i32,
    pub address: Address,
}

impl Student {
    pub fn new(name: String, age: i32, address: Address) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            age,
            address,
        }
    }
}

/// Criteria for listing students. Absent fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub country: Option<String>,
    pub min_age: Option<i32>,
}

impl StudentFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();

        if let Some(country) = &self.country {
            filter.insert("address.country", country.as_str());
        }

        if let Some(min_age) = self.min_age {
            filter.insert("age", doc! { "$gte": min_age });
        }

        filter
    }

    pub fn matches(&self, student: &Student) -> bool {
        let country_ok = self
            .country
            .as_deref()
            .map_or(true, |country| student.address.country == country);
        let age_ok = self.min_age.map_or(true, |min_age| student.age >= min_age);

        country_ok && age_ok
    }
}

/// The fields a partial update sets. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StudentChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl StudentChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.age.is_none() && self.address.is_none()
    }

    /// Body of the `$set` operator: only the supplied fields.
    pub fn to_set_document(&self) -> Result<Document, AppError> {
        Ok(bson::to_document(self)?)
    }

    pub fn apply_to(&self, student: &mut Student) {
        if let Some(name) = &self.name {
            student.name = name.clone();
        }
        if let Some(age) = self.age {
            student.age = age;
        }
        if let Some(address) = &self.address {
            student.address = address.clone();
        }
    }
}
