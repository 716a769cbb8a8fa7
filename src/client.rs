use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use serde_json::Value;

use crate::config::InterviewApiConfig;
use crate::error::{parse_error_message, InterviewApiError};
use crate::events::{map_agent_event, synthesize_id, AgentEvent};
use crate::headers::build_headers;
use crate::payload::{
    ChatMessage, FeedbackPayload, RunOptions, RunPayload, SpecPreviewPayload, TestAgentRequest,
};
use crate::sessions::{
    feedback_entry_from_json, session_detail_from_json, session_list_from_json,
    spec_preview_from_json, SessionDetail, SessionSummary, SpecFeedbackEntry, SpecPreview,
};
use crate::sse::SseStreamParser;
use crate::test_events::{map_test_event, map_test_result, TestAgentStreamEvent, TestRunResult};
use crate::url;

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How a consumed event stream ended. Cancellation is intentional and is
/// never reported as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The transport closed naturally.
    Closed,
    /// The caller's cancellation signal fired mid-stream.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct StreamResult {
    pub events: Vec<AgentEvent>,
    pub end: StreamEnd,
}

#[derive(Debug, Clone)]
pub struct TestStreamResult {
    pub events: Vec<TestAgentStreamEvent>,
    pub end: StreamEnd,
}

/// Session-scoped protocol client.
///
/// Owns the thread identity and run counter for one conversation. Streaming
/// operations take `&mut self`: at most one event-consuming loop is active
/// per client, and the thread id is only ever written by that loop.
#[derive(Debug)]
pub struct InterviewApiClient {
    http: Client,
    config: InterviewApiConfig,
    thread_id: String,
    run_counter: u64,
}

impl InterviewApiClient {
    pub fn new(config: InterviewApiConfig) -> Result<Self, InterviewApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(InterviewApiError::from)?;

        Ok(Self {
            http,
            config,
            thread_id: synthesize_id("thread-local"),
            run_counter: 0,
        })
    }

    pub fn config(&self) -> &InterviewApiConfig {
        &self.config
    }

    /// Current conversation identity. Starts as a locally minted id and is
    /// replaced when the server announces one on run start.
    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    /// Discard the current conversation identity and mint a fresh local one.
    pub fn reset_thread(&mut self) {
        self.thread_id = synthesize_id("thread-local");
    }

    fn next_run_id(&mut self) -> String {
        self.run_counter += 1;
        format!("run-{}", self.run_counter)
    }

    fn header_map(&self, accept_event_stream: bool) -> Result<HeaderMap, InterviewApiError> {
        let mut out = HeaderMap::new();
        for (key, value) in build_headers(&self.config, accept_event_stream) {
            out.insert(
                HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                    InterviewApiError::InvalidHeader(format!("invalid header key: {key}"))
                })?,
                HeaderValue::from_str(&value).map_err(|_| {
                    InterviewApiError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    /// Stream one conversational run, invoking `on_event` per normalized
    /// event in strict arrival order.
    ///
    /// Fails before any event is delivered when the response is non-2xx
    /// (carrying the server's `detail` when present) or has no readable
    /// body. A `RunStarted` event carrying a non-empty thread id replaces
    /// this client's thread id. A mid-stream `RunError` is delivered like
    /// any other event and consumption continues to natural close.
    pub async fn stream_with_handler<F>(
        &mut self,
        history: &[ChatMessage],
        opts: RunOptions,
        cancellation: Option<&CancellationSignal>,
        mut on_event: F,
    ) -> Result<StreamEnd, InterviewApiError>
    where
        F: FnMut(AgentEvent),
    {
        let payload = RunPayload {
            thread_id: self.thread_id.clone(),
            run_id: self.next_run_id(),
            messages: history.to_vec(),
            state: opts.state,
            tools: opts.tools,
        };
        let request = self
            .http
            .post(url::scope_endpoint(&self.config.base_url, self.config.scope))
            .headers(self.header_map(true)?)
            .json(&payload);

        let Some(response) = open_stream_response(request, cancellation).await? else {
            return Ok(StreamEnd::Cancelled);
        };

        let thread_id = &mut self.thread_id;
        consume_event_stream(response, cancellation, |record| {
            if let Some(event) = map_agent_event(&record) {
                if let AgentEvent::RunStarted {
                    thread_id: Some(new_thread),
                    ..
                } = &event
                {
                    if *new_thread != *thread_id {
                        tracing::debug!(from = %thread_id, to = %new_thread, "adopting server thread id");
                        *thread_id = new_thread.clone();
                    }
                }
                on_event(event);
            }
        })
        .await
    }

    /// Buffered variant of [`Self::stream_with_handler`].
    pub async fn stream(
        &mut self,
        history: &[ChatMessage],
        opts: RunOptions,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<StreamResult, InterviewApiError> {
        let mut events = Vec::new();
        let end = self
            .stream_with_handler(history, opts, cancellation, |event| events.push(event))
            .await?;
        Ok(StreamResult { events, end })
    }

    /// Stream a test-agent simulation. Thread identity is untouched.
    pub async fn stream_test_agent_with_handler<F>(
        &mut self,
        request: &TestAgentRequest,
        cancellation: Option<&CancellationSignal>,
        mut on_event: F,
    ) -> Result<StreamEnd, InterviewApiError>
    where
        F: FnMut(TestAgentStreamEvent),
    {
        let request = self
            .http
            .post(url::test_agent_stream_endpoint(
                &self.config.base_url,
                self.config.scope,
            ))
            .headers(self.header_map(true)?)
            .json(&self.test_agent_payload(request));

        let Some(response) = open_stream_response(request, cancellation).await? else {
            return Ok(StreamEnd::Cancelled);
        };

        consume_event_stream(response, cancellation, |record| {
            if let Some(event) = map_test_event(&record) {
                on_event(event);
            }
        })
        .await
    }

    /// Buffered variant of [`Self::stream_test_agent_with_handler`].
    pub async fn stream_test_agent(
        &mut self,
        request: &TestAgentRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<TestStreamResult, InterviewApiError> {
        let mut events = Vec::new();
        let end = self
            .stream_test_agent_with_handler(request, cancellation, |event| events.push(event))
            .await?;
        Ok(TestStreamResult { events, end })
    }

    /// Run a test-agent simulation without streaming; the full response body
    /// is buffered and normalized into exactly one result record.
    pub async fn run_test_agent(
        &self,
        request: &TestAgentRequest,
    ) -> Result<TestRunResult, InterviewApiError> {
        let response = self
            .http
            .post(url::test_agent_endpoint(
                &self.config.base_url,
                self.config.scope,
            ))
            .headers(self.header_map(false)?)
            .json(&self.test_agent_payload(request))
            .send()
            .await
            .map_err(InterviewApiError::from)?;

        let body = read_success_body(response).await?;
        let value: Value = serde_json::from_str(&body)?;
        Ok(map_test_result(&value))
    }

    /// Fetch the current spec preview for a thread.
    pub async fn fetch_spec_preview(
        &self,
        thread_id: &str,
        refresh: bool,
    ) -> Result<SpecPreview, InterviewApiError> {
        let payload = SpecPreviewPayload {
            thread_id: thread_id.to_owned(),
            refresh,
        };
        let response = self
            .http
            .post(url::spec_preview_endpoint(&self.config.base_url))
            .headers(self.header_map(false)?)
            .json(&payload)
            .send()
            .await
            .map_err(InterviewApiError::from)?;

        let body = read_success_body(response).await?;
        let value: Value = serde_json::from_str(&body)?;
        Ok(spec_preview_from_json(&value))
    }

    /// Pure URL construction for the spec PDF download; no network call.
    pub fn build_spec_pdf_url(&self, thread_id: &str) -> String {
        url::spec_pdf_url(&self.config.base_url, thread_id, current_epoch_ms())
    }

    /// List stored sessions for this client's scope, newest first.
    pub async fn list_sessions(
        &self,
        limit: u32,
    ) -> Result<Vec<SessionSummary>, InterviewApiError> {
        let response = self
            .http
            .get(url::sessions_endpoint(&self.config.base_url))
            .headers(self.header_map(false)?)
            .query(&[
                ("scope", self.config.scope.as_str().to_owned()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(InterviewApiError::from)?;

        let body = read_success_body(response).await?;
        let value: Value = serde_json::from_str(&body)?;
        Ok(session_list_from_json(&value, self.config.scope))
    }

    /// Fetch one stored session by id.
    pub async fn get_session_detail(
        &self,
        session_id: &str,
    ) -> Result<SessionDetail, InterviewApiError> {
        let response = self
            .http
            .get(url::session_detail_endpoint(
                &self.config.base_url,
                session_id,
            ))
            .headers(self.header_map(false)?)
            .send()
            .await
            .map_err(InterviewApiError::from)?;

        let body = read_success_body(response).await?;
        let value: Value = serde_json::from_str(&body)?;
        Ok(session_detail_from_json(&value, session_id, self.config.scope))
    }

    /// Submit feedback against a stored session's spec.
    ///
    /// A non-2xx response fails with the server's error text. A 2xx body
    /// that does not parse as a feedback record yields a locally synthesized
    /// one instead: the server-side write already succeeded, so the caller
    /// is not failed over a cosmetic decode problem.
    pub async fn submit_spec_feedback(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<SpecFeedbackEntry, InterviewApiError> {
        let payload = FeedbackPayload {
            message: message.to_owned(),
        };
        let response = self
            .http
            .post(url::session_feedback_endpoint(
                &self.config.base_url,
                session_id,
            ))
            .headers(self.header_map(false)?)
            .json(&payload)
            .send()
            .await
            .map_err(InterviewApiError::from)?;

        let body = read_success_body(response).await?;
        let entry = serde_json::from_str::<Value>(&body)
            .ok()
            .as_ref()
            .and_then(feedback_entry_from_json);

        Ok(entry.unwrap_or_else(|| {
            tracing::debug!("feedback response did not parse; synthesizing local record");
            SpecFeedbackEntry {
                id: synthesize_id("local-feedback"),
                message: message.to_owned(),
                created_at: String::new(),
            }
        }))
    }

    fn test_agent_payload(&self, request: &TestAgentRequest) -> TestAgentRequest {
        let mut payload = request.clone();
        if payload.language.is_none() {
            payload.language = self.config.language.clone();
        }
        payload
    }
}

/// Send a streaming request and validate the response before any event is
/// yielded. Returns `None` when the cancellation signal fired first.
async fn open_stream_response(
    request: reqwest::RequestBuilder,
    cancellation: Option<&CancellationSignal>,
) -> Result<Option<Response>, InterviewApiError> {
    let response = match await_or_cancel(request.send(), cancellation).await {
        Ok(sent) => sent.map_err(InterviewApiError::from)?,
        Err(Interrupted) => return Ok(None),
    };

    let status = response.status();
    if !status.is_success() {
        let body = match await_or_cancel(response.text(), cancellation).await {
            Ok(read) => read.unwrap_or_default(),
            Err(Interrupted) => return Ok(None),
        };
        return Err(InterviewApiError::Status(
            status,
            parse_error_message(status, &body),
        ));
    }

    // reqwest always exposes a body stream on success, so "no readable
    // body" reduces to an explicitly empty one.
    if response.content_length() == Some(0) {
        return Err(InterviewApiError::StreamUnavailable);
    }

    Ok(Some(response))
}

/// Drive the frame decoder over a validated response body.
///
/// The response (and with it the connection reader) is dropped on every
/// exit path, including cancellation and transport errors.
async fn consume_event_stream<F>(
    response: Response,
    cancellation: Option<&CancellationSignal>,
    mut on_record: F,
) -> Result<StreamEnd, InterviewApiError>
where
    F: FnMut(Value),
{
    let mut bytes = response.bytes_stream();
    let mut parser = SseStreamParser::default();

    loop {
        let chunk = match await_or_cancel(bytes.next(), cancellation).await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(Interrupted) => return Ok(StreamEnd::Cancelled),
        };
        let chunk = chunk.map_err(InterviewApiError::from)?;
        for record in parser.feed(&chunk) {
            on_record(record);
        }
    }

    // Any non-blank trailing buffer is parsed as a final frame.
    if let Some(record) = parser.finish() {
        on_record(record);
    }

    Ok(StreamEnd::Closed)
}

struct Interrupted;

fn is_cancelled(cancellation: Option<&CancellationSignal>) -> bool {
    cancellation.is_some_and(|token| token.load(Ordering::Acquire))
}

/// Race a future against the cancellation signal so a pending read never
/// outlives the caller's intent to stop.
async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, Interrupted>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(Interrupted);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            return Ok(output);
        }
    }
}

async fn read_success_body(response: Response) -> Result<String, InterviewApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(InterviewApiError::Status(
            status,
            parse_error_message(status, &body),
        ));
    }

    response.text().await.map_err(InterviewApiError::from)
}

fn current_epoch_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    u64::try_from(now.as_millis()).unwrap_or(u64::MAX)
}
