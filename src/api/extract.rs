use std::collections::HashMap;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Multipart, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::{ApiError, Result};

/// `Json` whose rejections use the API error body instead of axum's plain text.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
    }
}

/// `Path` with the API error body on a malformed segment.
pub struct PathParam<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| Self(value))
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
    }
}

/// `Query` with the API error body on a malformed query string.
pub struct QueryParams<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| Self(value))
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
    }
}

/// Trimmed, non-empty value of an optional text field.
pub fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Like [`required`] but owned, for columns that store `NULL` when blank.
pub fn optional(value: Option<&str>) -> Option<String> {
    required(value).map(ToString::to_string)
}

#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Buffered multipart form: text fields by name plus at most one file.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl FormData {
    /// Reads every part. The part named `file_field` is kept as the file when it
    /// carries a filename and a non-empty body.
    ///
    /// # Errors
    /// Returns `BadRequest` if the body is not valid multipart data.
    pub async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?
        {
            let Some(name) = field.name().map(ToString::to_string) else {
                continue;
            };

            if name == file_field {
                let filename = field.file_name().map(ToString::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                if let Some(filename) = filename.filter(|_| !bytes.is_empty()) {
                    form.file = Some(UploadedFile { filename, bytes });
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    #[cfg(test)]
    pub fn from_fields(fields: &[(&str, &str)]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            file: None,
        }
    }

    /// Trimmed value, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<&str> {
        required(self.fields.get(name).map(String::as_str))
    }

    /// # Errors
    /// Returns `BadRequest` when the value is present but not a number.
    pub fn number(&self, name: &str) -> Result<Option<f64>> {
        self.text(name)
            .map(|raw| {
                raw.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .ok_or_else(|| ApiError::bad_request(format!("{name} must be a non-negative number")))
            })
            .transpose()
    }

    /// # Errors
    /// Returns `BadRequest` when the value is present but not an integer id.
    pub fn id(&self, name: &str) -> Result<Option<i32>> {
        self.text(name)
            .map(|raw| {
                raw.parse::<i32>()
                    .map_err(|_| ApiError::bad_request(format!("{name} must be an integer")))
            })
            .transpose()
    }

    /// Only `"true"` and `"1"` count as set.
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.text(name), Some("true" | "1"))
    }
}

#[cfg(test)]
mod tests {
    use super::{optional, required, FormData};

    #[test]
    fn blank_values_are_treated_as_missing() {
        assert_eq!(required(Some("  ")), None);
        assert_eq!(required(Some(" Center ")), Some("Center"));
        assert_eq!(optional(Some("")), None);
        assert_eq!(optional(None), None);
    }

    #[test]
    fn form_parses_prices_ids_and_flags() {
        let form = FormData::from_fields(&[
            ("priceSmall", "450.5"),
            ("priceLarge", ""),
            ("branchId", "3"),
            ("isPizza", "1"),
            ("other", "yes"),
        ]);
        assert!(matches!(form.number("priceSmall"), Ok(Some(p)) if (p - 450.5).abs() < f64::EPSILON));
        assert!(matches!(form.number("priceLarge"), Ok(None)));
        assert!(matches!(form.id("branchId"), Ok(Some(3))));
        assert!(form.flag("isPizza"));
        assert!(!form.flag("other"));
        assert!(!form.flag("missing"));
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let form = FormData::from_fields(&[("priceSmall", "cheap"), ("branchId", "1.5")]);
        assert!(form.number("priceSmall").is_err());
        assert!(form.id("branchId").is_err());

        let negative = FormData::from_fields(&[("priceSmall", "-1")]);
        assert!(negative.number("priceSmall").is_err());
    }
}
