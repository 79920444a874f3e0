//! Minimal methodmux example: per-method routes, global middleware and an
//! embedded API router.
//!
//! Run with:
//!   RUST_LOG=methodmux=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/api/users/42
//!   curl -X POST http://localhost:3000/api/users -d '{"name":"alice"}'
//!   curl -X DELETE http://localhost:3000/api/users/42
//!   curl -X PUT http://localhost:3000/api/users/42     # 405, Allow: GET, DELETE
//!   curl -i http://localhost:3000/api                  # 301 to /api/
//!   curl http://localhost:3000/stats

use http::StatusCode;
use http::header::{HeaderValue, LOCATION};
use methodmux::middleware::{ElapsedTime, RequestCounter};
use methodmux::{Request, Response, Router, Server};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), methodmux::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr = std::env::var("METHODMUX_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_owned());
    let counter = RequestCounter::new();

    let api = Router::new()
        .get("/users/{id}", get_user)
        .delete("/users/{id}", delete_user)
        .post("/users", create_user);

    let app = Router::new()
        .push(ElapsedTime::new())
        .push(counter.clone())
        .embed("/api/", api)
        .get("/stats", move |_req: Request| {
            let body = format!("in_flight={} total={}\n", counter.in_flight(), counter.total());
            async move { body }
        });

    Server::bind(&addr)?.serve(app).await
}

// GET /api/users/{id}
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#))
}

// POST /api/users
async fn create_user(req: Request) -> Response {
    if req.body().is_empty() {
        return Response::status(StatusCode::BAD_REQUEST);
    }

    Response::builder()
        .status(StatusCode::CREATED)
        .header(LOCATION, HeaderValue::from_static("/api/users/99"))
        .json(r#"{"id":"99","name":"new_user"}"#)
}

// DELETE /api/users/{id}
async fn delete_user(_req: Request) -> StatusCode {
    StatusCode::NO_CONTENT
}
