//! Price submissions ("logging a beer").

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::IntoResponse,
};
use bytes::Bytes;
use tracing::{info, warn};

use olradar_core::cities::{DEFAULT_CITY, city_center};
use olradar_types::{GeoPoint, NewObservation};

use crate::error::{ApiError, blocking};
use crate::photos::MAX_PHOTO_SIZE;
use crate::state::AppState;

pub const DEFAULT_CURRENCY: &str = "SEK";

/// Raw form fields, as submitted.
#[derive(Debug, Default)]
pub struct LogForm {
    pub venue_name: Option<String>,
    pub beer_name: Option<String>,
    pub beer_style: Option<String>,
    pub price: Option<String>,
    pub currency: Option<String>,
    pub rating: Option<String>,
    pub city: Option<String>,
    pub user_id: Option<String>,
    pub photo: Option<PhotoUpload>,
}

#[derive(Debug)]
pub struct PhotoUpload {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl LogForm {
    /// Record a text field. Unknown fields are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "venue_name" => &mut self.venue_name,
            "beer_name" => &mut self.beer_name,
            "beer_style" => &mut self.beer_style,
            "price" | "price_sek" => &mut self.price,
            "currency" => &mut self.currency,
            "rating" => &mut self.rating,
            "city" => &mut self.city,
            "user_id" => &mut self.user_id,
            _ => return,
        };
        *slot = Some(value);
    }

    /// Check presence and types and build the store command. The photo is
    /// handled separately.
    pub fn validate(self) -> Result<NewObservation, ApiError> {
        let venue_name =
            non_empty(self.venue_name).ok_or_else(|| ApiError::bad_request("venue_name is required"))?;
        let beer_name =
            non_empty(self.beer_name).ok_or_else(|| ApiError::bad_request("beer_name is required"))?;

        let price: f64 = non_empty(self.price)
            .ok_or_else(|| ApiError::bad_request("price is required"))?
            .parse()
            .map_err(|_| ApiError::bad_request("price must be a number"))?;
        if !price.is_finite() || price <= 0.0 {
            return Err(ApiError::bad_request("price must be positive"));
        }

        let rating = match non_empty(self.rating) {
            Some(raw) => {
                let rating: f64 = raw
                    .parse()
                    .map_err(|_| ApiError::bad_request("rating must be a number"))?;
                if !(0.0..=5.0).contains(&rating) {
                    return Err(ApiError::bad_request("rating must be between 0 and 5"));
                }
                Some(rating)
            }
            None => None,
        };

        let city = non_empty(self.city);
        let fallback_position = fallback_position(city.as_deref());

        Ok(NewObservation {
            venue_name,
            beer_name,
            beer_style: non_empty(self.beer_style),
            price,
            currency: non_empty(self.currency)
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            rating,
            city,
            user_id: non_empty(self.user_id),
            photo_url: None,
            fallback_position,
        })
    }
}

/// Where a venue created by a submission is placed until someone fixes it.
fn fallback_position(city: Option<&str>) -> GeoPoint {
    city.and_then(city_center)
        .or_else(|| city_center(DEFAULT_CITY))
        .unwrap_or(GeoPoint::new(59.33, 18.07))
}

/// Map a multipart failure; a body over the route limit is a 413, not a
/// malformed form.
fn multipart_error(e: MultipartError, what: &str) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(MAX_PHOTO_SIZE)
    } else {
        ApiError::bad_request(format!("{what}: {e}"))
    }
}

async fn read_form(mut multipart: Multipart) -> Result<LogForm, ApiError> {
    let mut form = LogForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, "malformed form"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "photo" {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| multipart_error(e, "unreadable photo"))?;
            if bytes.len() > MAX_PHOTO_SIZE {
                return Err(ApiError::PayloadTooLarge(MAX_PHOTO_SIZE));
            }
            if !bytes.is_empty() {
                form.photo = Some(PhotoUpload { content_type, bytes });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| multipart_error(e, &format!("unreadable field {name}")))?;
            form.set(&name, value);
        }
    }

    Ok(form)
}

/// POST /api/log: multipart form, returns the stored observation.
///
/// A photo that cannot be stored is dropped; the price still counts.
pub async fn submit_log(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = read_form(multipart).await?;
    let photo = form.photo.take();
    let mut new = form.validate()?;

    let mut stored_photo = None;
    if let Some(photo) = photo {
        match state.photos.save(&photo.bytes, photo.content_type.as_deref()).await {
            Ok(file_name) => {
                new.photo_url = Some(format!("{}/photos/{}", state.public_url, file_name));
                stored_photo = Some(file_name);
            }
            Err(e) => warn!("Failed to store photo, saving price without it: {}", e),
        }
    }

    let store = state.store.clone();
    let observation = match blocking(move || store.submit_observation(&new)).await {
        Ok(observation) => observation,
        Err(e) => {
            // Nothing references the photo if the price was not stored.
            if let Some(file_name) = stored_photo {
                state.photos.delete(&file_name).await.ok();
            }
            return Err(e);
        }
    };

    info!(
        "Logged {} {} at venue {} (observation {})",
        observation.price, observation.currency, observation.venue_id, observation.id
    );
    Ok((StatusCode::CREATED, Json(observation)))
}
