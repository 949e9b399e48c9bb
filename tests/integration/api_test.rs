// Request/response layer over a live monitor

use super::support::*;
use pidpatrol::api::{Api, Reply};
use serde_json::{json, Value};
use std::time::Duration;

fn api() -> Api {
    Api::new(monitor_with(alpha_beta_probe()))
}

fn post(api: &Api, path: &str, body: Value) -> Reply {
    api.handle("POST", path, &body)
}

fn get(api: &Api, path: &str) -> Reply {
    api.handle("GET", path, &Value::Null)
}

fn body(reply: &Reply) -> &Value {
    reply.body.as_ref().expect("reply has a body")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_configure_validation() {
    let api = api();

    let reply = post(&api, "/ui/configure", json!({}));
    assert_eq!(reply.status, 409);
    assert_eq!(body(&reply)["ok"], false);
    assert_eq!(body(&reply)["error"], "missing processes");

    let reply = post(&api, "/ui/configure", json!({"processes": "  ,; "}));
    assert_eq!(reply.status, 409);

    let reply = post(&api, "/ui/configure", json!({"processes": "alpha; Beta,ALPHA"}));
    assert_eq!(reply.status, 200);
    assert_eq!(
        body(&reply)["processes"],
        json!([{"name": "alpha"}, {"name": "Beta"}])
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_interval_endpoint() {
    let api = api();

    let reply = post(&api, "/ui/interval", json!({}));
    assert_eq!(reply.status, 409);
    assert_eq!(body(&reply)["error"], "invalid interval");

    let reply = post(&api, "/ui/interval", json!({"interval": 0.2}));
    assert_eq!(reply.status, 409);

    let reply = post(&api, "/ui/interval", json!({"update_interval": "3"}));
    assert_eq!(reply.status, 200);
    assert_eq!(body(&reply)["interval"], 3.0);

    assert_eq!(body(&get(&api, "/ui/status"))["interval"], 3.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_results_follow_lifecycle() {
    let api = api();

    let reply = get(&api, "/ui/results");
    assert_eq!(reply.status, 204);
    assert!(reply.body.is_none());

    let reply = post(&api, "/ui/start", json!({"processes": ["alpha", "beta"]}));
    assert_eq!(reply.status, 200);
    assert_eq!(body(&reply)["running"], true);

    let results = tokio::time::timeout(WAIT, async {
        loop {
            if let Some(results) = api.query_results() {
                return results;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(results.count, 2);
    assert_eq!(results.results[0].name, "alpha");
    assert_eq!(results.results[0].status, "running");
    assert_eq!(results.results[0].pids, vec![10, 11]);

    let reply = get(&api, "/ui/results");
    assert_eq!(reply.status, 200);
    assert_eq!(body(&reply)["results"][1]["name"], "beta");

    let reply = post(&api, "/ui/stop", Value::Null);
    assert_eq!(reply.status, 200);
    assert_eq!(body(&reply)["running"], false);
    assert_eq!(get(&api, "/ui/results").status, 204);

    let reply = post(&api, "/ui/stop", Value::Null);
    assert_eq!(reply.status, 409);
    assert_eq!(body(&reply)["error"], "not running");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_add_and_remove() {
    let api = api();
    post(&api, "/ui/configure", json!({"processes": ["alpha"]}));

    let reply = post(&api, "/ui/add", json!({}));
    assert_eq!(reply.status, 409);
    assert_eq!(body(&reply)["error"], "missing 'names' or 'processes'");

    let reply = post(&api, "/ui/add", json!({"names": ["Alpha"]}));
    assert_eq!(reply.status, 409);

    let reply = post(&api, "/ui/add", json!({"processes": "beta, gamma"}));
    assert_eq!(reply.status, 200);
    assert_eq!(body(&reply)["processes"].as_array().unwrap().len(), 3);

    let reply = post(&api, "/ui/remove", json!({}));
    assert_eq!(reply.status, 409);
    assert_eq!(body(&reply)["error"], "missing name");

    let reply = post(&api, "/ui/remove", json!({"name": "delta"}));
    assert_eq!(reply.status, 404);

    let reply = post(&api, "/ui/remove", json!({"name": "GAMMA"}));
    assert_eq!(reply.status, 200);
    assert_eq!(
        body(&reply)["processes"],
        json!([{"name": "alpha"}, {"name": "beta"}])
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_subscribe_bootstrap_body() {
    let api = api();
    let (_subscription, bootstrap) = api.subscribe();
    assert!(bootstrap.is_none());

    api.start(&json!({"processes": ["beta"]})).unwrap();
    let (mut subscription, _) = api.subscribe();
    let snapshot = next_snapshot(&mut subscription).await;
    assert_eq!(row_names(&snapshot), ["beta"]);

    let (_late, bootstrap) = api.subscribe();
    let bootstrap = bootstrap.unwrap();
    assert_eq!(bootstrap.count, 1);
    assert!(bootstrap.ok);
    api.stop().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_unknown_route() {
    let api = api();
    let reply = api.handle("DELETE", "/ui/everything", &Value::Null);
    assert_eq!(reply.status, 404);
    assert!(!reply.is_success());
}
