//! Backend transport trait and reqwest-based HTTP implementation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_stream::try_stream;
use futures_util::StreamExt;
use pcommon::BoxFuture;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::adapters::{self, ReplyNormalizer, ollama};
use crate::frame::{FrameStream, decode_document, decode_frames};
use crate::{
    BackendConfig, BackendRequest, FramingMode, NoopTransportHooks, ProviderError, Reply,
    ReplyStream, TransportHooks, collect_reply,
};

pub type ProviderFuture<'a, T> = BoxFuture<'a, T>;

const PAYLOAD_LIMIT: usize = 4096;

/// Sends one chat-completion request to the backend named by the request's
/// config. Implementations never retry and never switch backends.
pub trait BackendTransport: Send + Sync {
    fn complete<'a>(
        &'a self,
        request: BackendRequest,
        cancel: CancellationToken,
    ) -> ProviderFuture<'a, Result<Reply, ProviderError>>;

    fn stream<'a>(
        &'a self,
        request: BackendRequest,
        cancel: CancellationToken,
    ) -> ProviderFuture<'a, Result<ReplyStream<'a>, ProviderError>>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    hooks: Arc<dyn TransportHooks>,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            hooks: Arc::new(NoopTransportHooks),
        }
    }

    /// Builds a client whose requests, body reads included, fail after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProviderError::invalid_request(format!("http client: {err}")))?;
        Ok(Self::new(client))
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn TransportHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub async fn list_models(&self, config: &BackendConfig) -> Result<Vec<String>, ProviderError> {
        let url = adapters::models_endpoint(config)?;
        let mut builder = self.client.get(url);
        if let Some(api_key) = &config.api_key {
            builder = builder.bearer_auth(api_key.expose());
        }

        let response = builder
            .send()
            .await
            .map_err(|err| request_error(&config.selector, &err))?;
        if !response.status().is_success() {
            return Err(status_error(&config.selector, response, &CancellationToken::new()).await);
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| request_error(&config.selector, &err))?;
        let document = decode_document(&body)?;
        adapters::parse_model_list(config, &document.value)
    }

    /// Runs a one-shot prompt through Ollama's `/api/generate` and joins the
    /// `response` text of every streamed record.
    pub async fn generate(
        &self,
        config: &BackendConfig,
        prompt: &str,
        cancel: CancellationToken,
    ) -> Result<String, ProviderError> {
        let url = adapters::generate_endpoint(config)?;
        let body = ollama::generate_body(&config.default_model, prompt)?;
        let response = self.post(config, url, &body, &cancel).await?;

        let selector = config.selector.clone();
        let chunks = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|err| request_error(&selector, &err)));
        let mut frames = decode_frames(chunks, FramingMode::Ndjson);

        let mut text = String::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
                next = frames.next() => next,
            };
            let Some(frame) = next else {
                break;
            };
            let frame = frame?;
            text.push_str(ollama::generated_text(&config.selector, &frame.value)?);
        }
        Ok(text)
    }

    /// Fetches Ollama's `/api/show` document for `model`, or for the backend's
    /// default model when `None`.
    pub async fn show_model(
        &self,
        config: &BackendConfig,
        model: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<Value, ProviderError> {
        let url = adapters::show_endpoint(config)?;
        let body = ollama::show_body(model.unwrap_or(&config.default_model));
        let response = self.post(config, url, &body, &cancel).await?;

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            body = response.bytes() => body.map_err(|err| request_error(&config.selector, &err))?,
        };
        Ok(decode_document(&body)?.value)
    }

    async fn open(
        &self,
        request: BackendRequest,
        cancel: CancellationToken,
    ) -> Result<ReplyStream<'static>, ProviderError> {
        request.validate()?;

        let kind = request.config.kind;
        let model = request.model().to_string();
        self.hooks.on_request_start(kind, &model, request.stream);
        let started = Instant::now();

        let response = match self.send(&request, &cancel).await {
            Ok(response) => response,
            Err(err) => {
                self.hooks
                    .on_request_failure(kind, &model, request.stream, &err, started.elapsed());
                return Err(err);
            }
        };

        self.reply_stream(response, &request, cancel, started)
    }

    async fn send(
        &self,
        request: &BackendRequest,
        cancel: &CancellationToken,
    ) -> Result<Response, ProviderError> {
        let url = adapters::chat_endpoint(&request.config)?;
        let body = adapters::request_body(request)?;
        self.post(&request.config, url, &body, cancel).await
    }

    async fn post(
        &self,
        config: &BackendConfig,
        url: String,
        body: &Value,
        cancel: &CancellationToken,
    ) -> Result<Response, ProviderError> {
        let mut builder = self.client.post(url).json(body);
        if let Some(api_key) = &config.api_key {
            builder = builder.bearer_auth(api_key.expose());
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
            sent = builder.send() => sent.map_err(|err| request_error(&config.selector, &err))?,
        };

        if !response.status().is_success() {
            return Err(status_error(&config.selector, response, cancel).await);
        }

        Ok(response)
    }

    fn reply_stream(
        &self,
        response: Response,
        request: &BackendRequest,
        cancel: CancellationToken,
        started: Instant,
    ) -> Result<ReplyStream<'static>, ProviderError> {
        let mut normalizer = ReplyNormalizer::for_backend(&request.config)?;
        let selector = request.config.selector.clone();

        // Streaming requests always use the backend's framing; a non-streaming
        // body is one document unless the server says otherwise.
        let framing = if request.stream {
            request.config.framing
        } else {
            framing_from_headers(&response)
        };

        let mut frames: FrameStream<'static> = match framing {
            Some(framing) => {
                let chunks = response
                    .bytes_stream()
                    .map(move |chunk| chunk.map_err(|err| request_error(&selector, &err)));
                decode_frames(chunks, framing)
            }
            None => document_frames(response, selector),
        };

        let hooks = Arc::clone(&self.hooks);
        let kind = request.config.kind;
        let model = request.model().to_string();
        let streaming = request.stream;

        let stream = try_stream! {
            loop {
                let next = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Some(Err(ProviderError::Cancelled)),
                    next = frames.next() => next,
                };
                let Some(next) = next else {
                    break;
                };

                let outcome = next.and_then(|frame| normalizer.normalize(&frame));
                if let Err(err) = &outcome {
                    hooks.on_request_failure(kind, &model, streaming, err, started.elapsed());
                }
                for delta in outcome? {
                    yield delta;
                }
            }

            for delta in normalizer.finish() {
                yield delta;
            }
            hooks.on_request_success(kind, &model, streaming, started.elapsed());
        };

        Ok(Box::pin(stream) as ReplyStream<'static>)
    }
}

impl BackendTransport for HttpTransport {
    fn complete<'a>(
        &'a self,
        mut request: BackendRequest,
        cancel: CancellationToken,
    ) -> ProviderFuture<'a, Result<Reply, ProviderError>> {
        Box::pin(async move {
            request.stream = false;
            let deltas = self.open(request, cancel).await?;
            collect_reply(deltas).await
        })
    }

    fn stream<'a>(
        &'a self,
        mut request: BackendRequest,
        cancel: CancellationToken,
    ) -> ProviderFuture<'a, Result<ReplyStream<'a>, ProviderError>> {
        Box::pin(async move {
            request.stream = true;
            let deltas: ReplyStream<'a> = self.open(request, cancel).await?;
            Ok(deltas)
        })
    }
}

fn document_frames(response: Response, selector: String) -> FrameStream<'static> {
    let stream = try_stream! {
        let body = response
            .bytes()
            .await
            .map_err(|err| request_error(&selector, &err))?;
        yield decode_document(&body)?;
    };

    Box::pin(stream) as FrameStream<'static>
}

fn framing_from_headers(response: &Response) -> Option<FramingMode> {
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())?
        .to_ascii_lowercase();

    if content_type.contains("text/event-stream") {
        Some(FramingMode::EventStream)
    } else if content_type.contains("ndjson") {
        Some(FramingMode::Ndjson)
    } else {
        None
    }
}

fn request_error(selector: &str, err: &reqwest::Error) -> ProviderError {
    let detail = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    ProviderError::transport(selector, detail)
}

async fn status_error(
    selector: &str,
    response: Response,
    cancel: &CancellationToken,
) -> ProviderError {
    let status = response.status();
    let body = tokio::select! {
        biased;
        _ = cancel.cancelled() => return ProviderError::Cancelled,
        body = response.text() => body.unwrap_or_default(),
    };
    let detail = adapters::error_body_message(&body)
        .unwrap_or_else(|| format!("backend returned status {status}"));

    ProviderError::http_status(
        selector,
        status.as_u16(),
        detail,
        (!body.is_empty()).then(|| truncate(&body, PAYLOAD_LIMIT)),
    )
}

fn truncate(input: &str, max: usize) -> String {
    if input.len() <= max {
        return input.to_string();
    }

    let mut end = max;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    let mut output = input[..end].to_string();
    output.push_str("...");
    output
}
