use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use easypost::client::Client;
use serde_json::{json, Value};
use warp::http::{Method, StatusCode};
use warp::hyper::body::Bytes;
use warp::path::FullPath;
use warp::Filter;

pub const API_KEY: &str = "EZTK_test_key";

/// A request as seen by the mock API
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json_body(&self) -> Value {
        serde_json::from_slice(&self.body).expect("Request body should be JSON")
    }
}

/// An in process stand in for the API. It serves a fixed set of canned responses under `/v2/`
/// and records every request it receives so tests can assert on what did (or did not) go over
/// the wire
pub struct MockApi {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockApi {
    /// Starts the mock API on a random local port. Must be called from within a tokio runtime
    pub async fn start() -> MockApi {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorder = requests.clone();

        let query = warp::query::raw()
            .or(warp::any().map(String::new))
            .unify();
        let route = warp::method()
            .and(warp::path::full())
            .and(query)
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::body::bytes())
            .and_then(
                move |method: Method,
                      path: FullPath,
                      query: String,
                      authorization: Option<String>,
                      body: Bytes| {
                    let recorder = recorder.clone();
                    async move {
                        let req = RecordedRequest {
                            method,
                            path: path.as_str().to_owned(),
                            query,
                            authorization,
                            body: body.to_vec(),
                        };
                        let (status, reply) = {
                            let mut seen = recorder.lock().unwrap();
                            seen.push(req.clone());
                            let attempt = seen.iter().filter(|r| r.path == req.path).count();
                            respond(&req, attempt)
                        };
                        Ok::<_, Infallible>(warp::reply::with_status(
                            warp::reply::json(&reply),
                            status,
                        ))
                    }
                },
            );

        let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        MockApi {
            base_url: format!("http://{}/v2/", addr),
            requests,
        }
    }

    /// Returns a client pointed at this mock API with retries disabled
    pub fn client(&self) -> Client {
        Client::builder()
            .api_key(API_KEY)
            .base_url(&self.base_url)
            .build()
            .expect("Unable to build client")
    }

    /// Same as `client`, but retrying transient failures quickly
    pub fn retrying_client(&self, max_retries: u32) -> Client {
        Client::builder()
            .api_key(API_KEY)
            .base_url(&self.base_url)
            .max_retries(max_retries)
            .retry_backoff(Duration::from_millis(5))
            .build()
            .expect("Unable to build client")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

pub fn parcel_json(id: &str) -> Value {
    json!({
        "id": id,
        "object": "Parcel",
        "mode": "test",
        "length": 20.2,
        "width": 10.9,
        "height": 5.0,
        "weight": 65.9,
        "predefined_package": null,
    })
}

fn not_found() -> (StatusCode, Value) {
    (
        StatusCode::NOT_FOUND,
        json!({"error": {"code": "NOT_FOUND", "message": "The requested resource could not be found."}}),
    )
}

/// Echoes the wrapped fields of a create/update body back as a stored object
fn stored(req: &RecordedRequest, key: &str, tag: &str, id: &str) -> Value {
    let mut body = req.json_body();
    let mut obj = body
        .get_mut(key)
        .map(Value::take)
        .unwrap_or_else(|| json!({}));
    obj["id"] = json!(id);
    obj["object"] = json!(tag);
    obj
}

fn city(req: &RecordedRequest) -> Option<String> {
    serde_json::from_slice::<Value>(&req.body)
        .ok()?
        .pointer("/address/city")?
        .as_str()
        .map(str::to_owned)
}

fn respond(req: &RecordedRequest, attempt: usize) -> (StatusCode, Value) {
    let segments: Vec<&str> = req.path.trim_start_matches('/').split('/').collect();
    match (req.method.as_str(), segments.as_slice()) {
        (_, ["v2", "parcels", "prcl_missing"]) => not_found(),
        ("GET", ["v2", "parcels", id]) => (StatusCode::OK, parcel_json(id)),
        ("PUT", ["v2", "parcels", id]) => {
            let mut obj = parcel_json(id);
            if let Value::Object(fields) = stored(req, "parcel", "Parcel", id) {
                for (k, v) in fields {
                    obj[k.as_str()] = v;
                }
            }
            (StatusCode::OK, obj)
        }
        ("POST", ["v2", "parcels"]) => {
            let obj = stored(req, "parcel", "Parcel", "prcl_new");
            match obj.get("weight").and_then(Value::as_f64) {
                Some(w) if w > 0.0 => (StatusCode::CREATED, obj),
                _ => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({"error": {"code": "PARCEL.WEIGHT.INVALID", "message": "Invalid weight", "errors": []}}),
                ),
            }
        }
        // The real API has no such endpoint. It answers here so a stray request would show up as
        // a success instead of an error
        ("GET", ["v2", "parcels"]) => (
            StatusCode::OK,
            json!({"parcels": [parcel_json("prcl_listed")], "has_more": false}),
        ),
        ("GET", ["v2", "addresses"]) => (
            StatusCode::OK,
            json!({
                "addresses": [
                    {"id": "adr_1", "object": "Address", "city": "Boston", "zip": "02108"},
                    {"id": "adr_2", "object": "Address", "city": "Denver", "zip": "80202"},
                ],
                "has_more": true,
            }),
        ),
        ("GET", ["v2", "addresses", "adr_flaky"]) if attempt < 3 => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({"error": {"code": "INTERNAL_SERVER_ERROR", "message": "Try again"}}),
        ),
        ("GET", ["v2", "addresses", "adr_limited"]) => (
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"code": "RATE_LIMITED", "message": "Slow down"}}),
        ),
        ("GET", ["v2", "addresses", "adr_accepted"]) => (
            StatusCode::ACCEPTED,
            json!({"id": "adr_accepted", "object": "Address", "city": "Boston"}),
        ),
        ("GET", ["v2", "addresses", id]) => (
            StatusCode::OK,
            json!({"id": id, "object": "Address", "city": "Boston"}),
        ),
        ("POST", ["v2", "addresses"]) if city(req).as_deref() == Some("Unavailable") => (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({"error": {"code": "INTERNAL_SERVER_ERROR", "message": "Try again"}}),
        ),
        ("POST", ["v2", "addresses"]) if city(req).as_deref() == Some("Limited") && attempt < 3 => (
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"code": "RATE_LIMITED", "message": "Slow down"}}),
        ),
        ("POST", ["v2", "addresses"]) => (
            StatusCode::CREATED,
            stored(req, "address", "Address", "adr_new"),
        ),
        _ => not_found(),
    }
}
