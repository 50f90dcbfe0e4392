// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::service::{LoginError, RegisterError};
use crate::auth::AuthError;
use crate::storage::StoreError;
use crate::validation::ValidationError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub code: &'static str,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            error_code: self.code,
        });
        (self.status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        if let AuthError::Internal(detail) = &e {
            tracing::error!(error = %detail, "authentication internal error");
        }
        Self::new(e.status_code(), e.error_code(), e.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_body", e.body_text())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => Self::not_found(format!("{what} not found")),
            StoreError::EmailTaken => Self::new(
                StatusCode::BAD_REQUEST,
                "email_taken",
                "User already registered.",
            ),
            StoreError::BizNumberTaken(number) => Self::new(
                StatusCode::BAD_REQUEST,
                "biz_number_taken",
                format!("bizNumber {number} is already taken"),
            ),
            other => {
                tracing::error!(error = %other, "store failure");
                Self::internal("Internal server error")
            }
        }
    }
}

impl From<RegisterError> for ApiError {
    fn from(e: RegisterError) -> Self {
        match e {
            RegisterError::EmailTaken => StoreError::EmailTaken.into(),
            RegisterError::Store(e) => e.into(),
            RegisterError::Password(e) => {
                tracing::error!(error = %e, "password hashing failed");
                Self::internal("Internal server error")
            }
        }
    }
}

impl From<LoginError> for ApiError {
    fn from(e: LoginError) -> Self {
        match e {
            LoginError::InvalidCredentials => Self::new(
                StatusCode::BAD_REQUEST,
                "invalid_credentials",
                e.to_string(),
            ),
            LoginError::Locked { .. } => {
                Self::new(StatusCode::FORBIDDEN, "account_locked", e.to_string())
            }
            LoginError::Store(e) => e.into(),
            LoginError::Session(e) => e.into(),
        }
    }
}
