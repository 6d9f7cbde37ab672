//! Catalog Write Bodies
//!
//! Create and update endpoints take either a JSON body or a
//! `multipart/form-data` form carrying the same text fields plus an optional
//! inline image file.

use axum::Json;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{StatusCode, header};
use serde::de::DeserializeOwned;

use crate::application::images::ImageUpload;
use crate::error::{CatalogError, CatalogResult};
use crate::presentation::handlers::{CatalogAppState, CatalogBackend};

/// Text fields of a multipart catalog form
pub trait FormFields: Default {
    /// Name of the file part holding the inline image
    const IMAGE_FIELD: &'static str;

    /// Assign one text part; unknown names are ignored
    fn set_field(&mut self, name: &str, value: String);
}

/// Decoded write body, plus the inline image of a multipart form
#[derive(Debug)]
pub struct CatalogBody<T> {
    pub fields: T,
    pub image: Option<ImageUpload>,
}

/// A missing body reads as all-default fields
pub(crate) fn body_or_default<T: Default>(
    body: Result<Json<T>, JsonRejection>,
) -> CatalogResult<T> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(T::default()),
        Err(rejection) => Err(CatalogError::InvalidBody(rejection.body_text())),
    }
}

pub(crate) fn field_error(e: MultipartError, max_mb: usize) -> CatalogError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        CatalogError::ImageTooLarge { max_mb }
    } else {
        CatalogError::InvalidBody(e.body_text())
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().starts_with("multipart/form-data"))
}

impl<C, T> FromRequest<CatalogAppState<C>> for CatalogBody<T>
where
    C: CatalogBackend,
    T: FormFields + DeserializeOwned + Send,
{
    type Rejection = CatalogError;

    async fn from_request(
        req: Request,
        state: &CatalogAppState<C>,
    ) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let fields = body_or_default(Json::<T>::from_request(req, state).await)?;
            return Ok(Self {
                fields,
                image: None,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| CatalogError::InvalidBody(e.body_text()))?;
        let max_mb = state.config.max_image_mb();

        let mut fields = T::default();
        let mut image = None;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| field_error(e, max_mb))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == T::IMAGE_FIELD {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|e| field_error(e, max_mb))?;
                // An empty file part means no file was picked
                if !bytes.is_empty() {
                    image = Some(ImageUpload {
                        bytes: bytes.to_vec(),
                        content_type,
                        file_name,
                        path: None,
                    });
                }
            } else {
                let value = field.text().await.map_err(|e| field_error(e, max_mb))?;
                fields.set_field(&name, value);
            }
        }

        Ok(Self { fields, image })
    }
}
