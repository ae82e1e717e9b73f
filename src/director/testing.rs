//
//  bosh-cli
//  director/testing.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/04.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Test doubles shared by the director unit tests.

use std::collections::VecDeque;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Method, Response};
use url::Url;

use super::client::Director;
use super::error::Result;
use super::executor::RequestExecutor;
use super::reporter::{NoopFileReporter, NoopTaskReporter, TaskReporter};
use super::request::DirectorRequest;
use super::task_client::{TaskClient, TaskState};
use super::transport::Transport;

/// Builds a `reqwest::Response` with the given status and body.
pub fn response(status: u16, body: &str) -> Response {
    response_with_headers(status, body, &[])
}

/// Builds a `reqwest::Response` with extra headers.
pub fn response_with_headers(status: u16, body: &str, headers: &[(&str, &str)]) -> Response {
    let mut builder = http::Response::builder().status(status);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    Response::from(builder.body(body.to_string()).unwrap())
}

/// A URL on localhost where nothing is listening.
pub fn closed_port_url(path: &str) -> Url {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    Url::parse(&format!("http://127.0.0.1:{port}{path}")).unwrap()
}

/// What a [`ScriptedTransport`] saw for one dispatch.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// A transport answering from a fixed script and recording every request.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<Response>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<Response>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: &mut DirectorRequest) -> Result<Response> {
        let recorded = RecordedRequest {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
            body: request.read_body().await,
        };
        self.requests.lock().unwrap().push(recorded);

        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request to {}", request.url()))
    }
}

/// An executor for `https://director.test:25555` over `transport`.
pub fn executor_over(transport: Arc<dyn Transport>) -> RequestExecutor {
    RequestExecutor::new(
        Url::parse("https://director.test:25555").unwrap(),
        transport,
        Arc::new(NoopFileReporter),
    )
}

/// A [`Director`] over `transport` that polls tasks without pausing.
pub fn director_over(transport: Arc<dyn Transport>) -> Director {
    let executor = executor_over(transport);
    let task_client =
        TaskClient::new(executor.clone(), Arc::new(NoopTaskReporter)).with_poll_interval(Duration::ZERO);
    Director::new(executor, task_client)
}

/// One event observed by a [`RecordingTaskReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReporterEvent {
    Started(u64),
    Chunk(u64, Vec<u8>),
    Finished(u64, Option<TaskState>),
}

/// A task reporter that remembers everything it was told.
#[derive(Default)]
pub struct RecordingTaskReporter {
    events: Mutex<Vec<ReporterEvent>>,
}

impl RecordingTaskReporter {
    pub fn events(&self) -> Vec<ReporterEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn chunks(&self) -> Vec<Vec<u8>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ReporterEvent::Chunk(_, chunk) => Some(chunk),
                _ => None,
            })
            .collect()
    }
}

impl TaskReporter for RecordingTaskReporter {
    fn task_started(&self, id: u64) {
        self.events.lock().unwrap().push(ReporterEvent::Started(id));
    }

    fn task_finished(&self, id: u64, state: Option<&TaskState>) {
        self.events
            .lock()
            .unwrap()
            .push(ReporterEvent::Finished(id, state.cloned()));
    }

    fn task_output_chunk(&self, id: u64, chunk: &[u8]) {
        self.events
            .lock()
            .unwrap()
            .push(ReporterEvent::Chunk(id, chunk.to_vec()));
    }
}
