//! Transport-facing API.
//!
//! A web or socket front end calls these methods with the decoded JSON body
//! and turns the result into a reply. [`Reply`] carries the HTTP status a
//! front end should use: 200 with a body, 204 without one, 404 or 409 with
//! an [`ErrorResponse`].

pub mod payload;
pub mod response;

use serde::Serialize;
use serde_json::Value;

use crate::core::monitor::{Monitor, SubscriberId, Subscription};
use crate::error::{PatrolError, Result};
use crate::utils::time_stamp;

pub use response::{
    push_message, ErrorResponse, IntervalResponse, ProcessesResponse, ResultRow, ResultsResponse,
    StartResponse, StatusResponse, StopResponse,
};

/// Status code plus optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Option<Value>,
}

impl Reply {
    pub fn ok<T: Serialize>(body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => Self {
                status: 200,
                body: Some(value),
            },
            Err(e) => Self::error(&PatrolError::from(e)),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: 204,
            body: None,
        }
    }

    pub fn error(err: &PatrolError) -> Self {
        Self {
            status: err.status_code(),
            body: serde_json::to_value(ErrorResponse::from(err)).ok(),
        }
    }

    pub fn from_result<T: Serialize>(result: Result<T>) -> Self {
        match result {
            Ok(body) => Self::ok(&body),
            Err(e) => Self::error(&e),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Engine operations in request/response form.
#[derive(Clone)]
pub struct Api {
    monitor: Monitor,
}

impl Api {
    pub fn new(monitor: Monitor) -> Self {
        Self { monitor }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    /// Replace the watch list with `processes`.
    pub fn configure(&self, body: &Value) -> Result<ProcessesResponse> {
        let names = payload::processes(body)
            .ok_or_else(|| PatrolError::invalid_config("missing processes"))?;
        let names = self.monitor.configure(names)?;
        Ok(ProcessesResponse::new(&names))
    }

    pub fn set_interval(&self, body: &Value) -> Result<IntervalResponse> {
        let value = payload::interval(body).ok_or(PatrolError::InvalidInterval)?;
        let interval = self.monitor.set_interval(value)?;
        Ok(IntervalResponse {
            ok: true,
            interval,
            timestamp: time_stamp(),
        })
    }

    /// Start monitoring with optional `processes` and `interval` overrides.
    pub fn start(&self, body: &Value) -> Result<StartResponse> {
        let config = self
            .monitor
            .start(payload::processes(body), payload::interval(body));
        Ok(StartResponse::from(config))
    }

    pub fn stop(&self) -> Result<StopResponse> {
        let config = self.monitor.stop()?;
        Ok(StopResponse {
            ok: true,
            running: config.running,
            timestamp: time_stamp(),
        })
    }

    /// Merge `names` (or `processes`) into the watch list.
    pub fn add(&self, body: &Value) -> Result<ProcessesResponse> {
        let names = payload::names_or_processes(body)
            .ok_or_else(|| PatrolError::invalid_config("missing 'names' or 'processes'"))?;
        let names = self.monitor.add(names)?;
        Ok(ProcessesResponse::new(&names))
    }

    pub fn remove(&self, body: &Value) -> Result<ProcessesResponse> {
        let name =
            payload::name(body).ok_or_else(|| PatrolError::invalid_config("missing name"))?;
        let names = self.monitor.remove(&name)?;
        Ok(ProcessesResponse::new(&names))
    }

    pub fn query_status(&self) -> StatusResponse {
        StatusResponse::from(self.monitor.status())
    }

    /// `None` means "no content": stopped, nothing watched, or no tick yet.
    pub fn query_results(&self) -> Option<ResultsResponse> {
        self.monitor
            .results()
            .as_ref()
            .map(ResultsResponse::from)
    }

    /// Register a push observer; the bootstrap body is what
    /// [`Api::query_results`] would return right now.
    pub fn subscribe(&self) -> (Subscription, Option<ResultsResponse>) {
        let (subscription, snapshot) = self.monitor.subscribe();
        (subscription, snapshot.as_ref().map(ResultsResponse::from))
    }

    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.monitor.unsubscribe(id)
    }

    /// Route a request the way the web dashboard lays out its endpoints.
    pub fn handle(&self, method: &str, path: &str, body: &Value) -> Reply {
        match (method, path) {
            ("POST", "/ui/configure") => Reply::from_result(self.configure(body)),
            ("POST", "/ui/interval") => Reply::from_result(self.set_interval(body)),
            ("POST", "/ui/start") => Reply::from_result(self.start(body)),
            ("POST", "/ui/stop") => Reply::from_result(self.stop()),
            ("POST", "/ui/add") => Reply::from_result(self.add(body)),
            ("POST", "/ui/remove") => Reply::from_result(self.remove(body)),
            ("GET", "/ui/status") => Reply::ok(&self.query_status()),
            ("GET", "/ui/results") => match self.query_results() {
                Some(results) => Reply::ok(&results),
                None => Reply::no_content(),
            },
            _ => Reply {
                status: 404,
                body: serde_json::to_value(ErrorResponse {
                    ok: false,
                    error: format!("no route for {} {}", method, path),
                })
                .ok(),
            },
        }
    }
}
