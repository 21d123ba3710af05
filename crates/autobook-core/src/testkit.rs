//! Test doubles: scripted transport, manual clock, recording observer, and
//! candidate fixtures.

use chrono::{DateTime, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

use crate::api::{ApiSettings, Credentials};
use crate::clock::{Clock, Wake};
use crate::config::{RunSettings, Settings};
use crate::control::CancelToken;
use crate::events::{RunEvent, RunObserver};
use crate::http::{
    HttpRequest, HttpResponse, Method, Transport, TransportError, TransportErrorKind,
};
use crate::filter::FilterCriteria;
use crate::model::{CandidateItem, ItemId, StartTime};
use crate::retry::RetryPolicy;
use crate::schedule::ScheduleSpec;

type Scripted = Result<HttpResponse, TransportError>;

struct Route {
    method: Method,
    path_suffix: String,
    queue: VecDeque<Scripted>,
    /// Served once the queue is empty.
    fallback: Option<Scripted>,
}

/// Transport that replays scripted responses per (method, path suffix) and
/// records every request it sees.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Mutex<Vec<Route>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn route_mut<R>(&self, method: Method, suffix: &str, f: impl FnOnce(&mut Route) -> R) -> R {
        let mut routes = self.routes.lock().unwrap();
        if let Some(i) = routes
            .iter()
            .position(|r| r.method == method && r.path_suffix == suffix)
        {
            return f(&mut routes[i]);
        }
        routes.push(Route {
            method,
            path_suffix: suffix.to_string(),
            queue: VecDeque::new(),
            fallback: None,
        });
        let last = routes.len() - 1;
        f(&mut routes[last])
    }

    /// Queue one response for the next matching request.
    pub(crate) fn push(&self, method: Method, suffix: &str, response: Scripted) -> &Self {
        self.route_mut(method, suffix, |r| r.queue.push_back(response));
        self
    }

    pub(crate) fn respond(&self, method: Method, suffix: &str, status: u16, body: &str) -> &Self {
        self.push(method, suffix, Ok(HttpResponse::new(status, body)))
    }

    /// Response served for every request after the queue is drained.
    pub(crate) fn always(&self, method: Method, suffix: &str, response: Scripted) -> &Self {
        self.route_mut(method, suffix, |r| r.fallback = Some(response));
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, method: Method, suffix: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path().ends_with(suffix))
            .count()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.log.lock().unwrap().push(request.clone());
        let mut routes = self.routes.lock().unwrap();
        let route = routes
            .iter_mut()
            .find(|r| r.method == request.method && request.path().ends_with(&r.path_suffix));
        match route {
            Some(r) => match r.queue.pop_front() {
                Some(resp) => resp,
                None => r.fallback.clone().unwrap_or_else(|| {
                    Err(TransportError::new(
                        TransportErrorKind::Other,
                        format!("no scripted response left for {} {}", request.method, request.path()),
                    ))
                }),
            },
            None => Err(TransportError::new(
                TransportErrorKind::Other,
                format!("no route for {} {}", request.method, request.path()),
            )),
        }
    }
}

pub(crate) fn timeout_error() -> Scripted {
    Err(TransportError::new(TransportErrorKind::Timeout, "operation timed out"))
}

/// Clock whose sleeps advance a fake "now" and are recorded instead of waited.
pub(crate) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
    cancel_on_sleep: Option<usize>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap())
    }
}

impl ManualClock {
    pub(crate) fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
            sleeps: Mutex::new(Vec::new()),
            cancel_on_sleep: None,
        }
    }

    /// Fire the cancel token during the `n`th sleep (1-based), simulating a
    /// Ctrl-C that arrives mid-wait.
    pub(crate) fn cancel_on_sleep(mut self, n: usize) -> Self {
        self.cancel_on_sleep = Some(n);
        self
    }

    pub(crate) fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> Wake {
        if cancel.is_cancelled() {
            return Wake::Cancelled;
        }
        let mut sleeps = self.sleeps.lock().unwrap();
        sleeps.push(duration);
        if self.cancel_on_sleep == Some(sleeps.len()) {
            cancel.cancel();
            return Wake::Cancelled;
        }
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(duration).unwrap();
        Wake::Elapsed
    }
}

/// Observer that keeps every event for later assertions.
#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<RunEvent>>,
}

impl RecordingObserver {
    pub(crate) fn events(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl RunObserver for RecordingObserver {
    fn on_event(&self, event: &RunEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub(crate) fn candidate(id: &str, title: &str, free_spots: i64, bookable: bool) -> CandidateItem {
    CandidateItem {
        id: ItemId(id.to_string()),
        title: title.to_string(),
        instructor_name: None,
        start_time: StartTime::Missing,
        capacity: 20,
        free_spots,
        bookable,
    }
}

pub(crate) fn with_instructor(mut item: CandidateItem, name: &str) -> CandidateItem {
    item.instructor_name = Some(name.to_string());
    item
}

pub(crate) fn starting_at(mut item: CandidateItem, rfc3339: &str) -> CandidateItem {
    let t = DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc);
    item.start_time = StartTime::At(t);
    item
}

pub(crate) const TOKEN_OK: &str = r#"{"data":{"access_token":"token-xyz"}}"#;

/// Settings for a run against `https://api.example.test/api/v5`: location
/// 15238, two weeks ahead, 30-minute polls, no filters, default retries.
pub(crate) fn settings() -> Settings {
    Settings {
        credentials: Credentials {
            email: "me@example.test".into(),
            password: "hunter2".into(),
        },
        api: ApiSettings {
            base_url: Url::parse("https://api.example.test/api/v5").unwrap(),
            client_id: "client-1".into(),
            client_secret: "s3cret".into(),
            default_headers: Vec::new(),
        },
        connect_timeout: Duration::from_secs(15),
        request_timeout: Duration::from_secs(30),
        run: RunSettings {
            schedule: ScheduleSpec {
                location_id: 15238,
                advance_days: 14,
                align_to_monday: false,
            },
            poll_interval: Duration::from_secs(1800),
            page_size: 100,
        },
        criteria: FilterCriteria::default(),
        read_retry: RetryPolicy::read(),
        write_retry: RetryPolicy::write(),
    }
}
