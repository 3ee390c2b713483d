use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::auth::jwt::TokenError;
use crate::auth::password::CredentialError;
use crate::images::store::StorageError;
use crate::inference::ClassifierError;

/// Every user-visible failure of the API, with its fixed message and status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // auth
    #[error("Login credentials provided have already expired.")]
    TokenExpired,
    #[error("The login token sent is malformed and cannot be used to verify your identity.")]
    TokenMalformed,
    #[error("JWT signature does not match locally computed signature. JWT validity cannot be asserted and should not be trusted.")]
    TokenSignature,
    #[error("Request blocked due to attempting to access a secured endpoint with no credentials or invalid credentials.")]
    Blocked,

    // registration / login
    #[error("{0}")]
    UncompletedFields(&'static str),
    #[error("{0} must not exceed 50 characters.")]
    FieldLengthExceeded(&'static str),
    #[error("Username already taken.")]
    UsernameTaken,
    #[error("Email already taken.")]
    EmailTaken,
    #[error("No user found with the given credentials.")]
    InvalidCredentials,

    // classification
    #[error("You must provide an image of the mushroom.")]
    ImageMissing,
    #[error("Only PNG and JPG images are supported.")]
    ImageTypeNotSupported,
    #[error("The date provided is not in the correct format. Please provide a date in the format yyyy-MM-dd-HH-mm-ss-SSS.")]
    InvalidDate,
    #[error("The multipart request is missing one or more parts.")]
    MissingPart,
    #[error("There was a problem processing the image of the mushroom. Please try again later.")]
    ImageProcessing(#[source] StorageError),
    #[error("There was a problem retrieving the image of the mushroom. Please try again later.")]
    ImageRetrieval(#[source] StorageError),
    #[error("Your account does not appear to have a mushroom classification job with the given ID.")]
    MushroomNotFound,
    #[error("The server is currently unavailable for classification jobs. Please try again later.")]
    ClassifierUnavailable,
    #[error("There was a problem accessing the desired resource. Please try again later.")]
    ClassifierFailed,

    #[error("An unknown exception occurred")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        use ApiError::*;
        match self {
            TokenExpired | Blocked => StatusCode::UNAUTHORIZED,
            TokenMalformed
            | TokenSignature
            | UncompletedFields(_)
            | FieldLengthExceeded(_)
            | ImageMissing
            | ImageTypeNotSupported
            | InvalidDate
            | MissingPart => StatusCode::BAD_REQUEST,
            UsernameTaken | EmailTaken => StatusCode::CONFLICT,
            InvalidCredentials | MushroomNotFound => StatusCode::NOT_FOUND,
            ClassifierUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ImageProcessing(_) | ImageRetrieval(_) | ClassifierFailed | Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = ?self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => ApiError::TokenExpired,
            TokenError::Malformed => ApiError::TokenMalformed,
            TokenError::Signature => ApiError::TokenSignature,
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(e: CredentialError) -> Self {
        match e {
            CredentialError::TooLong => ApiError::FieldLengthExceeded("Password"),
            CredentialError::Hash(msg) => ApiError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<ClassifierError> for ApiError {
    fn from(e: ClassifierError) -> Self {
        match e {
            ClassifierError::Unavailable(_) => ApiError::ClassifierUnavailable,
            ClassifierError::Failed(_) => ApiError::ClassifierFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_taxonomy() {
        assert_eq!(ApiError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenMalformed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::TokenSignature.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::UsernameTaken.status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::MushroomNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::ClassifierUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn field_length_message_names_the_field() {
        let msg = ApiError::FieldLengthExceeded("Username").to_string();
        assert_eq!(msg, "Username must not exceed 50 characters.");
    }
}
