use std::sync::Arc;

use actix_web::http::header::{self, HeaderValue};
use actix_web::{HttpResponse, web};
use tracing::{error, trace};

use super::ApiSettings;
use crate::errors::{LinkpulseError, Result};
use crate::services::ResolutionService;
use crate::utils::is_valid_short_code;

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        path: web::Path<String>,
        service: web::Data<Arc<ResolutionService>>,
        settings: web::Data<ApiSettings>,
    ) -> Result<HttpResponse> {
        let code = path.into_inner();

        // 非法短码直接 404，不访问存储
        if !is_valid_short_code(&code) {
            trace!("Invalid short code rejected: {}", code);
            return Err(LinkpulseError::not_found(format!(
                "no record for short code '{}'",
                code
            )));
        }

        let outcome = settings
            .with_deadline("redirect", service.redirect(&code))
            .await?;

        let location = HeaderValue::from_str(&outcome.original_url).map_err(|e| {
            error!("Stored URL for '{}' is not a valid header value: {}", code, e);
            LinkpulseError::server_error(format!("cannot redirect '{}': {}", code, e))
        })?;

        Ok(HttpResponse::TemporaryRedirect()
            .insert_header((header::LOCATION, location))
            .insert_header(("Cache-Control", "no-store"))
            .finish())
    }
}
