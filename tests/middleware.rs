use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use methodmux::middleware::{ElapsedTime, Next, RequestCounter, StrictMethod};
use methodmux::{Method, Request, RequestLine, Response, Router};

fn request(method: &str, uri: &str) -> Request {
    http::Request::builder()
        .method(method)
        .uri(uri)
        .body(Bytes::new())
        .unwrap()
        .into()
}

async fn sleepy(_req: Request) -> &'static str {
    tokio::time::sleep(Duration::from_millis(50)).await;
    "slept"
}

fn explode() -> Response {
    panic!("handler failed")
}

// --- elapsed time ---

type Report = Arc<Mutex<Option<(StatusCode, String, Duration)>>>;

fn reporting(report: Report) -> ElapsedTime<impl Fn(&Response, &RequestLine, Duration) + Send + Sync + 'static> {
    ElapsedTime::with_callback(move |res: &Response, line: &RequestLine, elapsed: Duration| {
        *report.lock().unwrap() = Some((res.status_code(), line.path().to_owned(), elapsed));
    })
}

#[tokio::test]
async fn elapsed_time_covers_the_handler() {
    let report: Report = Arc::default();
    let app = Router::new()
        .push(reporting(Arc::clone(&report)))
        .get("/slow", sleepy);

    let res = app.serve(request("GET", "/slow")).await;
    assert_eq!(res.body(), b"slept");

    let (status, path, elapsed) = report.lock().unwrap().clone().unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(path, "/slow");
    assert!(elapsed >= Duration::from_millis(50), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(1000), "{elapsed:?}");
}

#[tokio::test]
async fn elapsed_time_includes_nested_middleware() {
    let report: Report = Arc::default();
    let app = Router::new()
        .push(reporting(Arc::clone(&report)))
        .push(|next: Next| {
            move |req: Request| {
                let next = next.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    next.run(req).await
                }
            }
        })
        .get("/slow", sleepy);

    app.serve(request("GET", "/slow")).await;

    let (_, _, elapsed) = report.lock().unwrap().clone().unwrap();
    assert!(elapsed >= Duration::from_millis(80), "{elapsed:?}");
}

#[tokio::test]
async fn elapsed_time_reports_rejections_too() {
    let report: Report = Arc::default();
    let app = Router::new()
        .push(reporting(Arc::clone(&report)))
        .get("/slow", sleepy);

    app.serve(request("PUT", "/slow")).await;

    let (status, _, _) = report.lock().unwrap().clone().unwrap();
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn default_elapsed_time_passes_response_through() {
    let app = Router::new()
        .push(ElapsedTime::new())
        .get("/", |_req: Request| async { "unchanged" });

    let res = app.serve(request("GET", "/")).await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(res.body(), b"unchanged");
}

// --- request counter ---

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn counter_stays_bounded_and_returns_to_zero() {
    const N: usize = 16;

    let counter = RequestCounter::new();
    let peak = Arc::new(AtomicUsize::new(0));

    let handler = {
        let counter = counter.clone();
        let peak = Arc::clone(&peak);
        move |_req: Request| {
            peak.fetch_max(counter.in_flight(), Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                "done"
            }
        }
    };
    let app = Arc::new(Router::new().push(counter.clone()).get("/work", handler));

    let tasks: Vec<_> = (0..N)
        .map(|_| {
            let app = Arc::clone(&app);
            tokio::spawn(async move { app.serve(request("GET", "/work")).await })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap().status_code(), StatusCode::OK);
    }

    let peak = peak.load(Ordering::SeqCst);
    assert!((1..=N).contains(&peak), "peak {peak}");
    assert_eq!(counter.in_flight(), 0);
    assert_eq!(counter.total(), N as u64);
}

#[tokio::test]
async fn counter_releases_when_request_is_dropped() {
    let counter = RequestCounter::new();
    let app = Router::new().push(counter.clone()).get("/slow", sleepy);

    let pending = app.serve(request("GET", "/slow"));
    assert_eq!(counter.in_flight(), 1);

    drop(pending);
    assert_eq!(counter.in_flight(), 0);
}

#[tokio::test]
async fn counter_releases_when_handler_panics() {
    let counter = RequestCounter::new();
    let app = Arc::new(
        Router::new()
            .push(counter.clone())
            .get("/boom", |_req: Request| async { explode() }),
    );

    let task = tokio::spawn({
        let app = Arc::clone(&app);
        async move { app.serve(request("GET", "/boom")).await }
    });

    assert!(task.await.unwrap_err().is_panic());
    assert_eq!(counter.in_flight(), 0);
    assert_eq!(counter.total(), 1);
}

// --- strict method as a standalone middleware ---

#[tokio::test]
async fn strict_method_with_several_methods() {
    let app = Router::new()
        .push(StrictMethod::new([Method::Get, Method::Head]))
        .handle("/", |_req: Request| async { "ok" });

    for (method, expected) in [
        ("GET", StatusCode::OK),
        ("HEAD", StatusCode::OK),
        ("POST", StatusCode::METHOD_NOT_ALLOWED),
        ("DELETE", StatusCode::METHOD_NOT_ALLOWED),
    ] {
        assert_eq!(app.serve(request(method, "/")).await.status_code(), expected, "{method}");
    }
}

#[tokio::test]
async fn strict_method_with_no_methods_rejects_all() {
    let app = Router::new()
        .push(StrictMethod::new(std::iter::empty()))
        .handle("/", |_req: Request| async { "never" });

    for method in Method::ALL {
        let res = app.serve(request(method.as_str(), "/")).await;
        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(res.body().is_empty());
    }
}
