//! Car catalogue handlers.
//!
//! ```text
//! POST   /api/v1/cars
//! GET    /api/v1/cars?location=lisbon
//! GET    /api/v1/cars/{id}
//! GET    /api/v1/my-cars
//! PUT    /api/v1/cars/{id}
//! DELETE /api/v1/cars/{id}
//! ```

use actix_web::{delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::CarId;
use crate::domain::CarDetailsDraft;
use crate::domain::ports::{
    CarDetailsResponse, CarPayload, CarRemoval, CreateCarRequest, GetCarRequest, ListCarsRequest,
    ListMyCarsRequest, RemoveCarRequest, UpdateCarRequest,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{CarDetailsSchema, CarSchema, ErrorSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_id};

/// Listing attributes accepted on create and update.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarBody {
    #[schema(example = "Toyota")]
    pub make: String,
    #[schema(example = "Corolla")]
    pub model: String,
    #[schema(example = 2021)]
    pub year: i32,
    pub color: String,
    #[schema(example = 45.0)]
    pub price_per_day: f64,
    #[serde(default)]
    pub description: String,
    pub image_url: Option<String>,
    #[schema(example = "Lisbon")]
    pub location: String,
    #[serde(default)]
    pub features: Vec<String>,
}

impl From<CarBody> for CarDetailsDraft {
    fn from(value: CarBody) -> Self {
        Self {
            make: value.make,
            model: value.model,
            year: value.year,
            color: value.color,
            price_per_day: value.price_per_day,
            description: value.description,
            image_url: value.image_url.filter(|url| !url.trim().is_empty()),
            location: value.location,
            features: value.features,
        }
    }
}

/// Query string for `GET /api/v1/cars`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListCarsQuery {
    /// Case-insensitive substring of the car's location.
    pub location: Option<String>,
}

/// Outcome of `DELETE /api/v1/cars/{id}`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarRemovalResponse {
    pub message: String,
    #[schema(value_type = String, example = "deleted")]
    pub outcome: CarRemoval,
}

impl From<CarRemoval> for CarRemovalResponse {
    fn from(value: CarRemoval) -> Self {
        Self {
            message: value.message().to_owned(),
            outcome: value,
        }
    }
}

fn car_id_from_path(raw: &str) -> ApiResult<CarId> {
    parse_id(raw, FieldName::new("carId"), |value| CarId::new(value))
}

/// List a car for the calling host.
#[utoipa::path(
    post,
    path = "/api/v1/cars",
    request_body = CarBody,
    responses(
        (status = 200, description = "Created car", body = CarSchema),
        (status = 400, description = "Invalid listing", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Only hosts can list cars", body = ErrorSchema)
    ),
    tags = ["cars"],
    operation_id = "createCar"
)]
#[post("/cars")]
pub async fn create_car(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CarBody>,
) -> ApiResult<web::Json<CarPayload>> {
    let actor = session.require_user_id()?;
    let car = state
        .cars
        .create_car(CreateCarRequest {
            actor,
            details: payload.into_inner().into(),
        })
        .await?;
    Ok(web::Json(car))
}

/// Bookable cars, optionally filtered by location.
#[utoipa::path(
    get,
    path = "/api/v1/cars",
    params(ListCarsQuery),
    responses(
        (status = 200, description = "Available cars", body = [CarSchema]),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["cars"],
    operation_id = "listCars",
    security([])
)]
#[get("/cars")]
pub async fn list_cars(
    state: web::Data<HttpState>,
    query: web::Query<ListCarsQuery>,
) -> ApiResult<web::Json<Vec<CarPayload>>> {
    let location = query
        .into_inner()
        .location
        .filter(|value| !value.trim().is_empty());
    let cars = state
        .cars_query
        .list_available(ListCarsRequest { location })
        .await?;
    Ok(web::Json(cars))
}

/// One car with its reviews.
#[utoipa::path(
    get,
    path = "/api/v1/cars/{id}",
    params(("id" = String, Path, description = "Car identifier")),
    responses(
        (status = 200, description = "Car details", body = CarDetailsSchema),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 404, description = "Car not found", body = ErrorSchema)
    ),
    tags = ["cars"],
    operation_id = "getCar",
    security([])
)]
#[get("/cars/{id}")]
pub async fn get_car(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CarDetailsResponse>> {
    let car_id = car_id_from_path(&path.into_inner())?;
    let car = state.cars_query.get_car(GetCarRequest { car_id }).await?;
    Ok(web::Json(car))
}

/// Every car the calling host owns, withdrawn ones included.
#[utoipa::path(
    get,
    path = "/api/v1/my-cars",
    responses(
        (status = 200, description = "Host's cars", body = [CarSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Only hosts own cars", body = ErrorSchema)
    ),
    tags = ["cars"],
    operation_id = "listMyCars"
)]
#[get("/my-cars")]
pub async fn list_my_cars(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CarPayload>>> {
    let actor = session.require_user_id()?;
    let cars = state
        .cars_query
        .list_my_cars(ListMyCarsRequest { actor })
        .await?;
    Ok(web::Json(cars))
}

/// Replace a car's listing attributes.
#[utoipa::path(
    put,
    path = "/api/v1/cars/{id}",
    params(("id" = String, Path, description = "Car identifier")),
    request_body = CarBody,
    responses(
        (status = 200, description = "Updated car", body = CarSchema),
        (status = 400, description = "Invalid listing or car has bookings in progress", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Car belongs to another host", body = ErrorSchema),
        (status = 404, description = "Car not found", body = ErrorSchema)
    ),
    tags = ["cars"],
    operation_id = "updateCar"
)]
#[put("/cars/{id}")]
pub async fn update_car(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<CarBody>,
) -> ApiResult<web::Json<CarPayload>> {
    let actor = session.require_user_id()?;
    let car_id = car_id_from_path(&path.into_inner())?;
    let car = state
        .cars
        .update_car(UpdateCarRequest {
            actor,
            car_id,
            details: payload.into_inner().into(),
        })
        .await?;
    Ok(web::Json(car))
}

/// Remove a car, or withdraw it when it has booking history.
#[utoipa::path(
    delete,
    path = "/api/v1/cars/{id}",
    params(("id" = String, Path, description = "Car identifier")),
    responses(
        (status = 200, description = "Removal outcome", body = CarRemovalResponse),
        (status = 400, description = "Car has bookings in progress", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Car belongs to another host", body = ErrorSchema),
        (status = 404, description = "Car not found", body = ErrorSchema)
    ),
    tags = ["cars"],
    operation_id = "deleteCar"
)]
#[delete("/cars/{id}")]
pub async fn delete_car(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CarRemovalResponse>> {
    let actor = session.require_user_id()?;
    let car_id = car_id_from_path(&path.into_inner())?;
    let removal = state
        .cars
        .remove_car(RemoveCarRequest { actor, car_id })
        .await?;
    Ok(web::Json(removal.into()))
}

#[cfg(test)]
#[path = "cars_tests.rs"]
mod tests;
