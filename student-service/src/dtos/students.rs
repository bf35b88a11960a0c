use crate::models::{Address, Student, StudentChanges, StudentFilter};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AddressDto {
    pub city: String,
    pub country: String,
}

impl From<AddressDto> for Address {
    fn from(dto: AddressDto) -> Self {
        Self {
            city: dto.city,
            country: dto.country,
        }
    }
}

impl From<Address> for AddressDto {
    fn from(address: Address) -> Self {
        Self {
            city: address.city,
            country: address.country,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    pub name: String,
    pub age: i32,

    #[validate(nested)]
    pub address: AddressDto,
}

impl From<CreateStudentRequest> for Student {
    fn from(req: CreateStudentRequest) -> Self {
        Student::new(req.name, req.age, req.address.into())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateStudentResponse {
    pub id: String,
}

/// PATCH body. Omitted and `null` fields are both left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub age: Option<i32>,

    #[validate(nested)]
    pub address: Option<AddressDto>,
}

impl From<UpdateStudentRequest> for StudentChanges {
    fn from(req: UpdateStudentRequest) -> Self {
        Self {
            name: req.name,
            age: req.age,
            address: req.address.map(Address::from),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudentResponse {
    pub id: String,
    pub name: String,
    pub age: i32,
    pub address: AddressDto,
}

impl From<Student> for StudentResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            name: student.name,
            age: student.age,
            address: student.address.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteStudentResponse {
    pub detail: String,
}

/// Query string for `GET /students`. `age` is a lower bound, inclusive.
#[derive(Debug, Default, Deserialize)]
pub struct ListStudentsParams {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub age: Option<i32>,
}

impl From<ListStudentsParams> for StudentFilter {
    fn from(params: ListStudentsParams) -> Self {
        Self {
            country: params.country,
            min_age: params.age,
        }
    }
}

// `?country=&age=` means "no filter", not "country equals the empty string".
fn empty_string_as_none<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => FromStr::from_str(s).map_err(de::Error::custom).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_accepts_any_string_and_integer() {
        let req: CreateStudentRequest = serde_json::from_value(serde_json::json!({
            "name": "",
            "age": -1,
            "address": { "city": "", "country": "France" }
        }))
        .unwrap();

        assert!(req.validate().is_ok());
        let student = Student::from(req);
        assert_eq!(student.name, "");
        assert_eq!(student.age, -1);
    }

    #[test]
    fn create_request_requires_full_address() {
        let result = serde_json::from_value::<CreateStudentRequest>(serde_json::json!({
            "name": "Ana",
            "age": 22,
            "address": { "city": "Paris" }
        }));

        assert!(result.is_err());
    }

    #[test]
    fn update_request_nulls_are_unset() {
        let req: UpdateStudentRequest =
            serde_json::from_value(serde_json::json!({ "name": null, "age": 30 })).unwrap();
        assert!(req.validate().is_ok());

        let changes = StudentChanges::from(req);
        assert_eq!(changes.name, None);
        assert_eq!(changes.age, Some(30));
        assert!(!changes.is_empty());
    }

    #[test]
    fn update_request_ignores_unknown_fields() {
        let req: UpdateStudentRequest =
            serde_json::from_value(serde_json::json!({ "id": "other" })).unwrap();
        assert!(StudentChanges::from(req).is_empty());
    }

    #[test]
    fn response_has_no_store_key() {
        let student = Student::new(
            "Ana".to_string(),
            22,
            Address {
                city: "Paris".to_string(),
                country: "France".to_string(),
            },
        );
        let value = serde_json::to_value(StudentResponse::from(student.clone())).unwrap();

        assert_eq!(value["id"], student.id);
        assert_eq!(value["address"]["country"], "France");
        assert!(value.get("_id").is_none());
    }
}
