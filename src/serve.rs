//! Online prediction service and its HTTP surface.
//!
//! [`PredictionService`] wraps a shared fitted pipeline and answers one
//! request at a time. Requests arrive in the serving schema; the only
//! divergence from the training schema is the `Year_Built` field, renamed to
//! `Year Built` while the request is shaped into a single-row table. Errors
//! split into client faults ([`PredictError::Validation`]) and server faults
//! ([`PredictError::Inference`]) so the HTTP layer can map them to 4xx and
//! 5xx without inspecting messages.
//!
//! [`routes`] builds the warp filter the `serve` binary mounts; keeping it
//! here lets the whole request path run under `warp::test`.

use crate::pipeline::{PipelineError, PricePipeline};
use crate::table::{Column, DataTable};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// A single house in the serving schema.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct PredictRequest {
    pub Location: String,
    pub Size: f64,
    pub Bedrooms: i64,
    pub Bathrooms: i64,
    pub Year_Built: i64,
    pub Condition: String,
    pub Type: String,
    pub sold_year: i64,
    pub sold_month: i64,
}

/// A priced response, rounded to two decimals.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_price: f64,
}

#[derive(Debug, Error)]
pub enum PredictError {
    /// The request itself is at fault. Client fault; malformed bodies and
    /// missing fields are already rejected at the HTTP boundary before the
    /// service runs.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The pipeline failed on a well-formed request. Server fault.
    #[error("inference failed: {0}")]
    Inference(String),
}

impl From<PipelineError> for PredictError {
    fn from(e: PipelineError) -> Self {
        // The request type statically carries every serving field, so a
        // pipeline failure here means the loaded model's frozen schema
        // disagrees with the serving schema. That is a server fault.
        PredictError::Inference(e.to_string())
    }
}

impl PredictRequest {
    /// Shape the request into a one-row table in the training schema. This is
    /// where `Year_Built` becomes `Year Built`.
    pub fn to_table(&self) -> DataTable {
        // Column construction from fixed-width vectors cannot be ragged.
        DataTable::new()
            .with_column("Location", Column::Text(vec![Some(self.Location.clone())]))
            .and_then(|t| t.with_column("Size", Column::Float(vec![Some(self.Size)])))
            .and_then(|t| t.with_column("Bedrooms", Column::Int(vec![Some(self.Bedrooms)])))
            .and_then(|t| t.with_column("Bathrooms", Column::Int(vec![Some(self.Bathrooms)])))
            .and_then(|t| t.with_column("Year Built", Column::Int(vec![Some(self.Year_Built)])))
            .and_then(|t| t.with_column("Condition", Column::Text(vec![Some(self.Condition.clone())])))
            .and_then(|t| t.with_column("Type", Column::Text(vec![Some(self.Type.clone())])))
            .and_then(|t| t.with_column("sold_year", Column::Int(vec![Some(self.sold_year)])))
            .and_then(|t| t.with_column("sold_month", Column::Int(vec![Some(self.sold_month)])))
            .unwrap_or_default()
    }
}

/// Read-only prediction front end over a shared pipeline.
#[derive(Clone)]
pub struct PredictionService {
    pipeline: Arc<PricePipeline>,
}

impl PredictionService {
    pub fn new(pipeline: Arc<PricePipeline>) -> Self {
        Self { pipeline }
    }

    /// Price one house.
    pub fn predict(&self, request: &PredictRequest) -> Result<Prediction, PredictError> {
        let table = request.to_table();
        let raw = self.pipeline.predict_one(&table)?;
        if !raw.is_finite() {
            return Err(PredictError::Inference(format!(
                "non-finite prediction: {raw}"
            )));
        }
        let predicted_price = round_price(raw);
        debug!(predicted_price, "served prediction");
        Ok(Prediction { predicted_price })
    }
}

/// Round to exactly two decimals.
fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `POST /predict` over a shared service. Mount with
/// [`handle_rejection`] so body failures surface as 400s.
pub fn routes(
    service: PredictionService,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    warp::path("predict")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .map(move |request: PredictRequest| handle_predict(&service, &request))
}

/// Status class per fault type.
pub fn error_status(e: &PredictError) -> StatusCode {
    match e {
        PredictError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PredictError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn handle_predict(service: &PredictionService, request: &PredictRequest) -> warp::reply::Response {
    match service.predict(request) {
        Ok(prediction) => warp::reply::json(&prediction).into_response(),
        Err(e) => {
            let status = error_status(&e);
            if status.is_server_error() {
                error!(error = %e, "prediction failed");
            }
            error_reply(status, &e.to_string())
        }
    }
}

/// Rejections from the body filter carry the deserializer's field-level
/// message; surface it as a 400.
pub async fn handle_rejection(err: Rejection) -> Result<warp::reply::Response, Infallible> {
    if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        return Ok(error_reply(StatusCode::BAD_REQUEST, &e.to_string()));
    }
    if err.is_not_found() {
        return Ok(error_reply(StatusCode::NOT_FOUND, "not found"));
    }
    if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(error_reply(
            StatusCode::METHOD_NOT_ALLOWED,
            "method not allowed",
        ));
    }
    error!(?err, "unhandled rejection");
    Ok(error_reply(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal error",
    ))
}

fn error_reply(status: StatusCode, message: &str) -> warp::reply::Response {
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({ "error": message })),
        status,
    )
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FittedEstimator, LinearRegression};
    use crate::preprocess::ColumnTransformer;
    use ndarray::Array1;

    fn sample_request() -> PredictRequest {
        PredictRequest {
            Location: "Downtown".to_string(),
            Size: 120.5,
            Bedrooms: 3,
            Bathrooms: 2,
            Year_Built: 1998,
            Condition: "Good".to_string(),
            Type: "House".to_string(),
            sold_year: 2021,
            sold_month: 6,
        }
    }

    const TRAINING_ROWS: [(f64, i64, &str); 4] = [
        (100.0, 2, "Downtown"),
        (150.0, 3, "Suburb"),
        (200.0, 4, "Downtown"),
        (250.0, 5, "Suburb"),
    ];

    fn training_table(rows: &[(f64, i64, &str)]) -> DataTable {
        DataTable::new()
            .with_column(
                "Location",
                Column::Text(rows.iter().map(|r| Some(r.2.to_string())).collect()),
            )
            .unwrap()
            .with_column("Size", Column::Float(rows.iter().map(|r| Some(r.0)).collect()))
            .unwrap()
            .with_column("Bedrooms", Column::Int(rows.iter().map(|r| Some(r.1)).collect()))
            .unwrap()
            .with_column("Bathrooms", Column::Int(rows.iter().map(|_| Some(2)).collect()))
            .unwrap()
            .with_column("Year Built", Column::Int(rows.iter().map(|_| Some(2000)).collect()))
            .unwrap()
            .with_column(
                "Condition",
                Column::Text(rows.iter().map(|_| Some("Good".to_string())).collect()),
            )
            .unwrap()
            .with_column(
                "Type",
                Column::Text(rows.iter().map(|_| Some("House".to_string())).collect()),
            )
            .unwrap()
            .with_column("sold_year", Column::Int(rows.iter().map(|_| Some(2021)).collect()))
            .unwrap()
            .with_column("sold_month", Column::Int(rows.iter().map(|_| Some(6)).collect()))
            .unwrap()
    }

    fn service_over(table: DataTable) -> PredictionService {
        let target = Array1::from_vec(vec![100_000.0, 150_000.0, 200_000.0, 250_000.0]);
        let pre = ColumnTransformer::new().fit(&table).unwrap();
        let x = pre.transform(&table).unwrap();
        let est = LinearRegression::new().fit(&x, &target).unwrap();
        PredictionService::new(Arc::new(PricePipeline::new(
            pre,
            FittedEstimator::Linear(est),
        )))
    }

    fn service() -> PredictionService {
        service_over(training_table(&TRAINING_ROWS))
    }

    /// A pipeline whose frozen schema carries a feature the serving schema
    /// does not.
    fn mismatched_service() -> PredictionService {
        let table = training_table(&TRAINING_ROWS)
            .with_column("Garage", Column::Int(vec![Some(1), Some(2), Some(1), Some(2)]))
            .unwrap();
        service_over(table)
    }

    #[test]
    fn test_request_table_uses_training_field_names() {
        let table = sample_request().to_table();
        assert_eq!(table.n_rows(), 1);
        assert!(table.column("Year Built").is_some());
        assert!(table.column("Year_Built").is_none());
    }

    #[test]
    fn test_prediction_has_two_decimals() {
        let svc = service();
        let prediction = svc.predict(&sample_request()).unwrap();
        let scaled = prediction.predicted_price * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-6);
    }

    #[test]
    fn test_unseen_location_is_still_priced() {
        let svc = service();
        let mut request = sample_request();
        request.Location = "Lakeside".to_string();
        assert!(svc.predict(&request).is_ok());
    }

    #[test]
    fn test_schema_disagreement_is_inference_fault() {
        // The request carries every serving field, so a model expecting an
        // extra column is the server's problem, not the client's.
        let err = mismatched_service()
            .predict(&sample_request())
            .unwrap_err();
        assert!(matches!(err, PredictError::Inference(_)));
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            error_status(&PredictError::Validation("bad".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            error_status(&PredictError::Inference("down".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_round_price() {
        assert_eq!(round_price(123.456), 123.46);
        assert_eq!(round_price(123.454), 123.45);
        assert_eq!(round_price(100.0), 100.0);
    }

    #[tokio::test]
    async fn test_predict_route_prices_a_house() {
        let api = routes(service()).recover(handle_rejection);
        let res = warp::test::request()
            .method("POST")
            .path("/predict")
            .json(&sample_request())
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert!(body["predicted_price"].is_number());
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request_with_detail() {
        let api = routes(service()).recover(handle_rejection);
        let res = warp::test::request()
            .method("POST")
            .path("/predict")
            .header("content-type", "application/json")
            .body(r#"{"Location": "Downtown"}"#)
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = String::from_utf8_lossy(res.body());
        assert!(body.contains("Size"), "body lacks field detail: {body}");
    }

    #[tokio::test]
    async fn test_wrong_field_type_is_bad_request() {
        let api = routes(service()).recover(handle_rejection);
        let mut value = serde_json::to_value(sample_request()).unwrap();
        value["Size"] = serde_json::Value::String("big".to_string());

        let res = warp::test::request()
            .method("POST")
            .path("/predict")
            .header("content-type", "application/json")
            .body(value.to_string())
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = String::from_utf8_lossy(res.body());
        assert!(body.contains("invalid type"), "body: {body}");
    }

    #[tokio::test]
    async fn test_schema_disagreement_maps_to_500() {
        let api = routes(mismatched_service()).recover(handle_rejection);
        let res = warp::test::request()
            .method("POST")
            .path("/predict")
            .json(&sample_request())
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_get_is_method_not_allowed() {
        let api = routes(service()).recover(handle_rejection);
        let res = warp::test::request()
            .method("GET")
            .path("/predict")
            .reply(&api)
            .await;

        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
