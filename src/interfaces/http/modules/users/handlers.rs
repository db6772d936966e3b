//! User management API handlers
//!
//! Thin wrappers that delegate to `UserService` from the application/identity layer.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::application::{
    PaginatedRequestDto, PaginatedResponseDto, UserDto, UserService,
};
use crate::domain::DomainError;
use crate::interfaces::http::common::{
    ApiError, ApiPath, ApiQuery, GenericResponseDto, ValidatedJson,
};

#[derive(Clone)]
pub struct UserHandlerState {
    pub user_service: Arc<UserService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(PaginatedRequestDto),
    responses(
        (status = 200, description = "Page of users ordered by id", body = PaginatedResponseDto<UserDto>),
        (status = 400, description = "Invalid offset/limit", body = GenericResponseDto<bool>)
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    ApiQuery(params): ApiQuery<PaginatedRequestDto>,
) -> Result<Json<PaginatedResponseDto<UserDto>>, ApiError> {
    let page = state.user_service.find_users(params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = GenericResponseDto<UserDto>),
        (status = 400, description = "Malformed id", body = GenericResponseDto<bool>),
        (status = 404, description = "Not found", body = GenericResponseDto<bool>)
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<GenericResponseDto<UserDto>>, ApiError> {
    match state.user_service.find(id).await? {
        Some(user) => Ok(Json(GenericResponseDto::success(user))),
        None => Err(DomainError::user_not_found(id).into()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = UserDto,
    responses(
        (status = 201, description = "User created", body = GenericResponseDto<UserDto>),
        (status = 409, description = "Username or email already exists", body = GenericResponseDto<bool>),
        (status = 422, description = "Validation error or unknown roles", body = GenericResponseDto<bool>)
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    ValidatedJson(request): ValidatedJson<UserDto>,
) -> Result<(StatusCode, Json<GenericResponseDto<UserDto>>), ApiError> {
    let created = state.user_service.create(request).await?;
    Ok((StatusCode::CREATED, Json(GenericResponseDto::success(created))))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UserDto,
    responses(
        (status = 200, description = "User updated", body = GenericResponseDto<bool>),
        (status = 404, description = "Not found", body = GenericResponseDto<bool>),
        (status = 409, description = "Username or email already exists", body = GenericResponseDto<bool>)
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    ApiPath(id): ApiPath<i32>,
    ValidatedJson(mut request): ValidatedJson<UserDto>,
) -> Result<Json<GenericResponseDto<bool>>, ApiError> {
    // The path id wins over any id in the body
    request.id = Some(id);
    let updated = state.user_service.update(request).await?;
    Ok(Json(GenericResponseDto::success(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 501, description = "Deleting users is not supported", body = GenericResponseDto<bool>)
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<GenericResponseDto<bool>>, ApiError> {
    let deleted = state.user_service.delete(id).await?;
    Ok(Json(GenericResponseDto::success(deleted)))
}
