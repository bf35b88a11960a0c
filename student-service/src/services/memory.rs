use crate::models::{Student, StudentChanges, StudentFilter};
use crate::services::StudentRepository;
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use service_core::error::AppError;

/// Process-local store keyed by student id. Selected with
/// `STORE_BACKEND=memory`; contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    students: DashMap<String, Student>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }
}

#[async_trait]
impl StudentRepository for InMemoryStore {
    async fn initialize_indexes(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn insert(&self, student: &Student) -> Result<(), AppError> {
        match self.students.entry(student.id.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(anyhow::anyhow!(
                "Student {} already exists",
                student.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(student.clone());
                Ok(())
            }
        }
    }

    async fn find(&self, filter: &StudentFilter) -> Result<Vec<Student>, AppError> {
        Ok(self
            .students
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Student>, AppError> {
        Ok(self.students.get(id).map(|entry| entry.value().clone()))
    }

    async fn update_by_id(&self, id: &str, changes: &StudentChanges) -> Result<bool, AppError> {
        match self.students.get_mut(id) {
            Some(mut entry) => {
                changes.apply_to(entry.value_mut());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.students.remove(id).is_some())
    }
}
