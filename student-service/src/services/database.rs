use crate::models::{Student, StudentChanges, StudentFilter};
use crate::services::StudentRepository;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions,
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub fn students(&self) -> Collection<Student> {
        self.db.collection("students")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl StudentRepository for MongoDb {
    async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for student-service");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .name("student_id_unique".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.students()
            .create_index(id_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create unique id index on students collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created unique index on students.id");

        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn insert(&self, student: &Student) -> Result<(), AppError> {
        self.students()
            .insert_one(student, None)
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    return AppError::Conflict(anyhow::anyhow!(
                        "Student {} already exists",
                        student.id
                    ));
                }
                tracing::error!(student_id = %student.id, "Failed to insert student: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn find(&self, filter: &StudentFilter) -> Result<Vec<Student>, AppError> {
        let mut cursor = self
            .students()
            .find(filter.to_document(), None)
            .await
            .map_err(AppError::from)?;

        let mut students = Vec::new();
        while let Some(student) = cursor.try_next().await.map_err(AppError::from)? {
            students.push(student);
        }

        Ok(students)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Student>, AppError> {
        self.students()
            .find_one(doc! { "id": id }, None)
            .await
            .map_err(AppError::from)
    }

    async fn update_by_id(&self, id: &str, changes: &StudentChanges) -> Result<bool, AppError> {
        let update = doc! { "$set": changes.to_set_document()? };
        let result = self
            .students()
            .update_one(doc! { "id": id }, update, None)
            .await
            .map_err(|e| {
                tracing::error!(student_id = %id, "Failed to update student: {}", e);
                AppError::from(e)
            })?;

        Ok(result.matched_count > 0)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, AppError> {
        let result = self
            .students()
            .delete_one(doc! { "id": id }, None)
            .await
            .map_err(|e| {
                tracing::error!(student_id = %id, "Failed to delete student: {}", e);
                AppError::from(e)
            })?;

        Ok(result.deleted_count > 0)
    }
}
