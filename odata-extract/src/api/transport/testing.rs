//! Scripted executor for transport-level tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use super::{HttpExecutor, HttpRequest, RawResponse, TransportError};

/// Replays queued outcomes in order and records every request it receives
#[derive(Default)]
pub struct ScriptedExecutor {
    script: Mutex<VecDeque<Result<RawResponse, String>>>,
    requests: Mutex<Vec<HttpRequest>>,
    calls: AtomicU32,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: Option<&str>) -> Self {
        self.respond_with_version(status, body, Some("2.0"))
    }

    pub fn respond_with_version(self, status: u16, body: Option<&str>, version: Option<&str>) -> Self {
        let mut headers = HashMap::new();
        if let Some(version) = version {
            headers.insert("dataserviceversion".to_string(), version.to_string());
        }
        self.script.lock().unwrap().push_back(Ok(RawResponse {
            status,
            reason: reason(status).to_string(),
            headers,
            body: body.map(|b| b.as_bytes().to_vec()),
        }));
        self
    }

    pub fn respond_times(mut self, times: usize, status: u16) -> Self {
        for _ in 0..times {
            self = self.respond(status, Some("gateway error"));
        }
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    }
}

#[async_trait]
impl HttpExecutor for ScriptedExecutor {
    async fn get(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::Call {
                url: request.url.clone(),
                source: message.into(),
            }),
            None => panic!("scripted executor ran out of responses for {}", request.url),
        }
    }
}
