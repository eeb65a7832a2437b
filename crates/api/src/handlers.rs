use crate::session::{session_id, FlashCategory};
use crate::views::form::index_page;
use crate::views::projections::{projections_page, ProjectionView};
use crate::views::recommendations::recommendations_page;
use crate::AppState;
use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::{CookieJar, Form};
use chrono::Utc;
use stockpick_core::analytics::forecast::{ForecastConfig, PricePredictor};
use stockpick_core::analytics::indicators::technical_indicators;
use stockpick_core::domain::preferences::{InvestmentForm, InvestmentPreferences};
use stockpick_core::domain::recommendation::{
    Recommendation, RecommendationRun, RunKind, ShuffleResponse,
};
use stockpick_core::domain::series::{HistoricalBar, PredictionPoint};
use stockpick_core::storage;
use uuid::Uuid;

pub const PROFILE_REQUIRED: &str = "Please fill out the investment profile form first.";
pub const NO_RESULTS: &str =
    "No investments found that match your criteria. Try adjusting your preferences for more options.";

pub async fn index(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let (jar, sid) = session_id(jar);
    let flashes = state.sessions.take_flashes(sid);
    (jar, Html(index_page(&InvestmentForm::default(), &flashes)))
}

pub async fn submit_profile(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<InvestmentForm>,
) -> Response {
    let (jar, sid) = session_id(jar);
    match form.validate() {
        Ok(prefs) => {
            tracing::info!(
                session_id = %sid,
                risk_level = prefs.risk_level.as_str(),
                sectors = ?prefs.sectors,
                "investment profile submitted"
            );
            if let Some(pool) = &state.pool {
                if let Err(e) = storage::profiles::save_profile(pool, sid, &prefs).await {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::warn!(error = %e, "failed to persist investment profile");
                }
            }
            state.sessions.set_preferences(sid, prefs);
            (jar, Redirect::to("/recommendations")).into_response()
        }
        Err(errors) => {
            for e in &errors {
                state.sessions.flash(sid, FlashCategory::Error, e.to_string());
            }
            let flashes = state.sessions.take_flashes(sid);
            (jar, Html(index_page(&form, &flashes))).into_response()
        }
    }
}

pub async fn recommendations(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, sid) = session_id(jar);
    let Some(prefs) = load_preferences(&state, sid).await else {
        state.sessions.flash(sid, FlashCategory::Error, PROFILE_REQUIRED);
        return (jar, Redirect::to("/")).into_response();
    };

    let recs = match state.engine.recommend(&prefs).await {
        Some(recs) => recs,
        None => {
            state.sessions.flash(sid, FlashCategory::Warning, NO_RESULTS);
            Vec::new()
        }
    };
    let run = record_run(&state, sid, RunKind::Initial, recs).await;

    let flashes = state.sessions.take_flashes(sid);
    (jar, Html(recommendations_page(&prefs, &run.items, &flashes))).into_response()
}

pub async fn shuffle(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, sid) = session_id(jar);
    let Some(prefs) = load_preferences(&state, sid).await else {
        return (jar, Redirect::to("/")).into_response();
    };

    match state.engine.shuffle(&prefs).await {
        Some(recs) => {
            let run = record_run(&state, sid, RunKind::Shuffle, recs).await;
            (jar, Json(ShuffleResponse::found(run.items))).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            jar,
            Json(ShuffleResponse::not_found()),
        )
            .into_response(),
    }
}

pub async fn projections(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(symbol): Path<String>,
) -> Response {
    let (jar, sid) = session_id(jar);
    let symbol = symbol.trim().to_string();

    let Some(history) = state.engine.historical_data(&symbol).await else {
        state.sessions.flash(
            sid,
            FlashCategory::Error,
            format!("Unable to fetch data for {symbol}"),
        );
        return (jar, Redirect::to("/recommendations")).into_response();
    };

    let (info, piotroski) = tokio::join!(
        state.engine.stock_info(&symbol),
        state.engine.piotroski(&symbol)
    );
    let closes: Vec<f64> = history.iter().map(|b| b.close).collect();
    let indicators = technical_indicators(&closes);

    let predictions = match forecast(state.forecast, history.clone()).await {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(%symbol, error = %e, "forecast failed");
            state.sessions.flash(
                sid,
                FlashCategory::Error,
                format!("Error generating predictions: {e}"),
            );
            Vec::new()
        }
    };

    let flashes = state.sessions.take_flashes(sid);
    let view = ProjectionView {
        symbol: &symbol,
        info: info.as_ref(),
        piotroski,
        indicators: &indicators,
        history: &history,
        predictions: &predictions,
    };
    (jar, Html(projections_page(&view, &flashes))).into_response()
}

/// Session preferences, falling back to the stored profile.
async fn load_preferences(state: &AppState, sid: Uuid) -> Option<InvestmentPreferences> {
    if let Some(prefs) = state.sessions.preferences(sid) {
        return Some(prefs);
    }
    let pool = state.pool.as_ref()?;
    match storage::profiles::load_profile(pool, sid).await {
        Ok(Some(prefs)) => {
            state.sessions.set_preferences(sid, prefs.clone());
            Some(prefs)
        }
        Ok(None) => None,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::warn!(error = %e, "failed to load investment profile");
            None
        }
    }
}

async fn record_run(
    state: &AppState,
    sid: Uuid,
    kind: RunKind,
    items: Vec<Recommendation>,
) -> RecommendationRun {
    let run = RecommendationRun {
        kind,
        generated_at: Utc::now(),
        items,
    };
    if let Some(pool) = &state.pool {
        if let Err(e) = storage::runs::persist_run(pool, sid, &run).await {
            sentry_anyhow::capture_anyhow(&e);
            tracing::warn!(error = %e, kind = kind.as_str(), "failed to record recommendation run");
        }
    }
    run
}

async fn forecast(
    config: ForecastConfig,
    history: Vec<HistoricalBar>,
) -> anyhow::Result<Vec<PredictionPoint>> {
    tokio::task::spawn_blocking(move || {
        let mut predictor = PricePredictor::new(config);
        let report = predictor.train(&history)?;
        tracing::debug!(
            train_samples = report.train_samples,
            validation_samples = report.validation_samples,
            validation_rmse = ?report.validation_rmse,
            "forecast model trained"
        );
        predictor.predict_future(&history)
    })
    .await
    .context("forecast task failed")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionStore, SESSION_COOKIE};
    use axum::body::Body;
    use axum::http::{header, Request};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use stockpick_core::market::fixture::{bars_from_closes, InMemoryMarketData};
    use stockpick_core::market::types::TickerInfo;
    use stockpick_core::recommend::{EngineOptions, RecommendationEngine};
    use tower::ServiceExt;

    const VALID_FORM: &str = "risk_level=medium&desired_return=10&duration=5&sectors=utilities\
        &budget=10000&dividend_priority=0&investment_types=stocks";

    fn info(name: &str, beta: f64) -> TickerInfo {
        TickerInfo {
            long_name: Some(name.to_string()),
            sector: Some("Utilities".to_string()),
            quote_type: Some("EQUITY".to_string()),
            beta: Some(beta),
            market_cap: Some(5e9),
            dividend_yield: Some(0.03),
            ..TickerInfo::default()
        }
    }

    fn state() -> AppState {
        let start = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
        let provider = InMemoryMarketData::new()
            .with_history("NEE", bars_from_closes(start, &[50.0, 55.0, 60.0]))
            .with_info("NEE", info("NextEra Energy", 1.0))
            .with_history("DUK", bars_from_closes(start, &[100.0, 104.0, 108.0]))
            .with_info("DUK", info("Duke Energy", 0.9));
        AppState {
            engine: Arc::new(RecommendationEngine::new(
                Arc::new(provider),
                None,
                EngineOptions::default(),
            )),
            sessions: SessionStore::new(),
            pool: None,
            forecast: ForecastConfig::default(),
        }
    }

    fn get(uri: &str, sid: Uuid) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, format!("{SESSION_COOKIE}={sid}"))
            .body(Body::empty())
            .unwrap()
    }

    fn post_form(body: &str, sid: Uuid) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::COOKIE, format!("{SESSION_COOKIE}={sid}"))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(resp: &Response) -> &str {
        resp.headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let resp = crate::router(state())
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_text(resp).await, "ok");
    }

    #[tokio::test]
    async fn first_visit_sets_session_cookie() {
        let resp = crate::router(state())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("stockpick_session="));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn invalid_form_flashes_labelled_errors() {
        let sid = Uuid::new_v4();
        let body = VALID_FORM.replace("budget=10000", "budget=500");
        let resp = crate::router(state())
            .oneshot(post_form(&body, sid))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("Investment Budget ($): Number must be at least 1000."));
        assert!(html.contains(r#"value="500""#));
    }

    #[tokio::test]
    async fn valid_form_leads_to_recommendations() {
        let st = state();
        let sid = Uuid::new_v4();

        let resp = crate::router(st.clone())
            .oneshot(post_form(VALID_FORM, sid))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/recommendations");

        let resp = crate::router(st.clone())
            .oneshot(get("/recommendations", sid))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("<h3>NextEra Energy</h3>"));
        assert!(html.find(r#"data-symbol="NEE""#) < html.find(r#"data-symbol="DUK""#));

        let resp = crate::router(st)
            .oneshot(get("/shuffle", sid))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: ShuffleResponse = serde_json::from_str(&body_text(resp).await).unwrap();
        assert!(body.error.is_none());
        let symbols: Vec<_> = body.recommendations.iter().map(|r| r.stock.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["NEE", "DUK"]);
    }

    #[tokio::test]
    async fn recommendations_show_submitted_preferences() {
        let st = state();
        let sid = Uuid::new_v4();
        let form = "risk_level=low&desired_return=37.5&duration=3&sectors=energy&sectors=utilities\
                    &budget=5000&dividend_priority=1&ethical_considerations=social";

        let resp = crate::router(st.clone())
            .oneshot(post_form(form, sid))
            .await
            .unwrap();
        assert_eq!(location(&resp), "/recommendations");

        let resp = crate::router(st)
            .oneshot(get("/recommendations", sid))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("Your Preferences"));
        assert!(html.contains("<dd>Low Risk</dd>"));
        assert!(html.contains("<dd>37.5%</dd>"));
        assert!(html.contains("<dd>Energy, Utilities</dd>"));
        assert!(html.contains("<dd>Somewhat Important</dd>"));
        assert!(html.contains("<dd>Social Impact</dd>"));
    }

    #[tokio::test]
    async fn missing_profile_redirects_home() {
        let st = state();
        let sid = Uuid::new_v4();

        let resp = crate::router(st.clone())
            .oneshot(get("/shuffle", sid))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");

        let resp = crate::router(st.clone())
            .oneshot(get("/recommendations", sid))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/");

        let html = body_text(crate::router(st).oneshot(get("/", sid)).await.unwrap()).await;
        assert!(html.contains(PROFILE_REQUIRED));
    }

    #[tokio::test]
    async fn no_matches_gives_warning_and_404_shuffle() {
        let st = state();
        let sid = Uuid::new_v4();
        let body = VALID_FORM.replace("desired_return=10", "desired_return=100");
        crate::router(st.clone())
            .oneshot(post_form(&body, sid))
            .await
            .unwrap();

        let resp = crate::router(st.clone())
            .oneshot(get("/recommendations", sid))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains(NO_RESULTS));
        assert!(html.contains(r#"<div id="recommendations-grid" class="grid" style="display:none">"#));

        let resp = crate::router(st)
            .oneshot(get("/shuffle", sid))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(body["error"], "No matching investments found");
        assert_eq!(body["recommendations"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn unknown_symbol_redirects_back_with_flash() {
        let st = state();
        let sid = Uuid::new_v4();
        let resp = crate::router(st.clone())
            .oneshot(get("/projections/ZZZZ", sid))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/recommendations");

        let flashes = st.sessions.take_flashes(sid);
        assert_eq!(flashes.len(), 1);
        assert_eq!(flashes[0].message, "Unable to fetch data for ZZZZ");
    }

    #[tokio::test]
    async fn short_history_renders_without_predictions() {
        let resp = crate::router(state())
            .oneshot(get("/projections/NEE", Uuid::new_v4()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains("Error generating predictions: "));
        assert!(html.contains("NextEra Energy"));
        assert!(html.contains(r#"id="price-chart""#));
        assert!(!html.contains("Predicted Prices"));
    }
}
