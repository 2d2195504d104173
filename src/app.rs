use std::net::SocketAddr;

use axum::{response::Html, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{meals, products};

const MEALS_DASHBOARD: &str = include_str!("../static/meals.html");
const PRODUCTS_DASHBOARD: &str = include_str!("../static/productos.html");

pub fn build_meals_app(state: AppState) -> Router {
    with_layers(
        Router::new()
            .merge(meals::router())
            .route("/", get(|| async { Html(MEALS_DASHBOARD) }))
            .route("/health", get(|| async { "ok" }))
            .with_state(state),
    )
}

pub fn build_products_app(state: AppState) -> Router {
    with_layers(
        Router::new()
            .merge(products::router())
            .route("/", get(|| async { Html(PRODUCTS_DASHBOARD) }))
            .route("/health", get(|| async { "ok" }))
            .with_state(state),
    )
}

fn with_layers(router: Router) -> Router {
    router.layer(CorsLayer::permissive()).layer(
        TraceLayer::new_for_http()
            .make_span_with(|req: &axum::http::Request<_>| {
                let method = req.method().clone();
                let uri = req.uri().clone();
                tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
            })
            .on_response(
                |res: &axum::http::Response<_>,
                 _latency: std::time::Duration,
                 span: &tracing::Span| {
                    let status = res.status();
                    span.record("status", tracing::field::display(status));
                    if status.is_server_error() {
                        tracing::error!(%status, "response");
                    } else {
                        tracing::info!(%status, "response");
                    }
                },
            ),
    )
}

pub async fn serve(name: &'static str, host: &str, port: u16, app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    tracing::info!(service = name, "listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    async fn fetch(app: Router, uri: &str) -> (StatusCode, String) {
        let res = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn each_service_serves_health_and_dashboard() {
        let (status, body) = fetch(build_meals_app(testing::offline(None)), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");

        let (status, body) = fetch(build_meals_app(testing::offline(None)), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/meals"));

        let (status, body) = fetch(build_products_app(testing::offline(None)), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/api/productos/"));
    }

    #[tokio::test]
    async fn services_do_not_share_routes() {
        let (status, _) = fetch(build_products_app(testing::offline(None)), "/meals").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = fetch(build_meals_app(testing::offline(None)), "/api/productos/1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
