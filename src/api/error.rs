//! HTTP mapping of crate errors

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use crate::api::types::ErrorBody;
use crate::errors::{ErrorKind, LinkpulseError};

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        // 正常情况下不会到达 HTTP 层
        ErrorKind::AlreadyExists => StatusCode::CONFLICT,
        ErrorKind::Timeout => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::CodeSpaceExhausted
        | ErrorKind::GeneratorUnavailable
        | ErrorKind::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for LinkpulseError {
    fn status_code(&self) -> StatusCode {
        status_for(self.kind())
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            code: self.kind(),
            message: self.message().to_string(),
        })
    }
}
