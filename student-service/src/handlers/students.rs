use crate::dtos::{
    CreateStudentRequest, CreateStudentResponse, DeleteStudentResponse, ListStudentsParams,
    StudentResponse, UpdateStudentRequest,
};
use crate::models::{Student, StudentChanges, StudentFilter};
use crate::startup::AppState;
use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use metrics::counter;
use service_core::error::AppError;
use service_core::utils::ValidatedJson;

fn student_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Student not found"))
}

pub async fn create_student(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateStudentRequest>,
) -> Result<(StatusCode, Json<CreateStudentResponse>), AppError> {
    let student = Student::from(payload);

    state.repository.insert(&student).await?;

    counter!("students_created_total").increment(1);
    tracing::info!(student_id = %student.id, "Student created");

    Ok((
        StatusCode::CREATED,
        Json(CreateStudentResponse { id: student.id }),
    ))
}

pub async fn list_students(
    State(state): State<AppState>,
    query: Result<Query<ListStudentsParams>, QueryRejection>,
) -> Result<Json<Vec<StudentResponse>>, AppError> {
    let Query(params) = query?;
    let filter = StudentFilter::from(params);

    let students = state.repository.find(&filter).await?;

    tracing::info!(
        country = ?filter.country,
        min_age = ?filter.min_age,
        count = students.len(),
        "Listed students"
    );

    Ok(Json(
        students.into_iter().map(StudentResponse::from).collect(),
    ))
}

pub async fn fetch_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<StudentResponse>, AppError> {
    let student = state
        .repository
        .find_by_id(&student_id)
        .await?
        .ok_or_else(student_not_found)?;

    Ok(Json(StudentResponse::from(student)))
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateStudentRequest>,
) -> Result<StatusCode, AppError> {
    let changes = StudentChanges::from(payload);
    if changes.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("No fields to update")));
    }

    let matched = state.repository.update_by_id(&student_id, &changes).await?;
    if !matched {
        return Err(student_not_found());
    }

    tracing::info!(student_id = %student_id, "Student updated");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<DeleteStudentResponse>, AppError> {
    let deleted = state.repository.delete_by_id(&student_id).await?;
    if !deleted {
        return Err(student_not_found());
    }

    counter!("students_deleted_total").increment(1);
    tracing::info!(student_id = %student_id, "Student deleted");

    Ok(Json(DeleteStudentResponse {
        detail: "Student deleted successfully".to_string(),
    }))
}
