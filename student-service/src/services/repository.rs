use crate::models::{Student, StudentChanges, StudentFilter};
use async_trait::async_trait;
use service_core::error::AppError;

/// Persistence for student records. Every method is a single store call.
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn initialize_indexes(&self) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;

    async fn insert(&self, student: &Student) -> Result<(), AppError>;

    async fn find(&self, filter: &StudentFilter) -> Result<Vec<Student>, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Student>, AppError>;

    /// Returns `false` when no record has `id`.
    async fn update_by_id(&self, id: &str, changes: &StudentChanges) -> Result<bool, AppError>;

    /// Returns `false` when no record has `id`.
    async fn delete_by_id(&self, id: &str) -> Result<bool, AppError>;
}
