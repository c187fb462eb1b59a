use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use validator::Validate;

use crate::config::MatchingSettings;
use crate::core::{MatchError, MatchOptions, Matcher};
use crate::models::{ErrorResponse, FindMatchesRequest, FindMatchesResponse, HealthResponse};
use crate::services::Catalog;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub matcher: Matcher,
    pub matching: MatchingSettings,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches));
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.catalog.is_empty() { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        catalog_size: state.catalog.len(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "profile": { "academicLevel": "undergraduate", "goals": ["scholarships"] },
///   "opportunities": [],
///   "topN": 10,
///   "minConfidence": 50.0
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: field_errors={:?}", errors);
        return bad_request("Invalid profile", errors.to_string());
    }

    let request = req.into_inner();
    let settings = &state.matching;

    // Cap the result count for HTTP callers
    let top_n = request
        .top_n
        .map(usize::from)
        .or(settings.default_top_n)
        .unwrap_or(settings.max_top_n)
        .min(settings.max_top_n);

    let options = MatchOptions {
        top_n: Some(top_n),
        min_confidence: request.min_confidence.or(settings.min_confidence),
    };

    // Caller-supplied catalogs get expired flags the same way the loaded one does
    let catalog = match request.opportunities {
        Some(opportunities) => Catalog::from_opportunities(opportunities, Utc::now()),
        None => state.catalog.clone(),
    };
    let opportunities = catalog.snapshot();

    tracing::info!(
        "Finding matches for student {:?} across {} opportunities, topN: {}",
        request.profile.student_id,
        opportunities.len(),
        top_n
    );

    match state.matcher.find_matches(&request.profile, &opportunities, options) {
        Ok(report) => HttpResponse::Ok().json(FindMatchesResponse {
            matches: report.matches,
            total_candidates: report.total_candidates,
            expired: report.expired,
            skipped: report.skipped,
            below_confidence: report.below_confidence,
            insight: report.insight,
        }),
        Err(e @ MatchError::InvalidProfile(_)) => {
            tracing::info!("Rejected profile: {}", e);
            bad_request("Invalid profile", e.to_string())
        }
        Err(e) => {
            tracing::error!("Matching failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Matching failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::json;

    fn create_state() -> AppState {
        AppState {
            catalog: Catalog::default(),
            matcher: Matcher::with_defaults(),
            matching: MatchingSettings::default(),
        }
    }

    #[actix_web::test]
    async fn test_health_reports_empty_catalog() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.status, "degraded");
        assert_eq!(body.catalog_size, 0);
    }

    #[actix_web::test]
    async fn test_find_matches_with_inline_catalog() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let payload = json!({
            "profile": {
                "academicLevel": "undergraduate",
                "gpa": 8.5,
                "skills": ["python"],
                "background": ["rural"],
                "goals": ["scholarships"],
                "priorMiss": true
            },
            "opportunities": [
                {
                    "id": "hidden",
                    "title": "Hidden Scholarship",
                    "type": "scholarship",
                    "deadline": "2099-01-01T00:00:00Z",
                    "visibility": "low",
                    "eligibility": { "minGpa": 7.0, "maxGpa": 10.0, "requiredSkills": ["python"] }
                },
                {
                    "id": "closed",
                    "title": "Closed Scholarship",
                    "type": "scholarship",
                    "deadline": "2000-01-01T00:00:00Z",
                    "visibility": "high"
                }
            ],
            "topN": 5
        });

        let req = test::TestRequest::post()
            .uri("/api/v1/matches/find")
            .set_json(&payload)
            .to_request();
        let body: FindMatchesResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body.total_candidates, 2);
        assert_eq!(body.expired, 1);
        assert_eq!(body.matches.len(), 1);
        assert_eq!(body.matches[0].opportunity.id, "hidden");
        assert!(body.matches[0].explanation.goal_aligned);
        assert!(body.insight.contains("mostly scholarships"));
    }

    #[actix_web::test]
    async fn test_missing_goals_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(create_state()))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let payload = json!({ "profile": { "academicLevel": "graduate" } });
        let req = test::TestRequest::post()
            .uri("/api/v1/matches/find")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
