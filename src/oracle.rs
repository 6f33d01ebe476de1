//! Language-model fallback for segment boundaries the keyword heuristics cannot find.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info};

use crate::segments::SegmentKind;
use crate::transcript::TranscriptChunk;
use crate::{Error, Result};

/// Instructions sent with every boundary question.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant designed to output JSON. \
The user will provide you with a section of transcript from an episode of The Skeptics' Guide to the Universe. \
The diarization is a best-effort and may contain errors, indicating the incorrect speaker. \
The user will also ask you to identify the start time of a segment. \
Your objective is to provide the time when the transition occurs. \
The transitions are usually performed by Steve. \
You must reply with a json object like this: {\"start_time\": 123.45} \
If you cannot identify the transition, provide null as the start time. \
You should provide the start of the transition. \
Ex. If the transcript is: 'All right, well, let's go on with our interview. We are joined now by Forrest Valkai.' \
You should return the timestamp for the beginning of 'All right, well, let's go on with our interview.'";

/// One boundary question.
#[derive(Debug, Clone, Copy)]
pub struct OracleRequest<'a> {
    pub kind: SegmentKind,
    pub prompt: &'a str,
    /// The window the answer must come from. Never empty.
    pub transcript: &'a [TranscriptChunk],
}

impl OracleRequest<'_> {
    fn window_start(&self) -> f64 {
        self.transcript.first().map_or(0.0, |chunk| chunk.start)
    }
}

/// Something that can locate a segment transition in a transcript window.
///
/// `Ok(None)` means "could not tell"; errors are reserved for transport and protocol
/// failures.
pub trait StartTimeOracle {
    fn find_start_time(&mut self, request: &OracleRequest<'_>) -> Result<Option<f64>>;
}

impl<O: StartTimeOracle + ?Sized> StartTimeOracle for &mut O {
    fn find_start_time(&mut self, request: &OracleRequest<'_>) -> Result<Option<f64>> {
        (**self).find_start_time(request)
    }
}

impl<O: StartTimeOracle + ?Sized> StartTimeOracle for Box<O> {
    fn find_start_time(&mut self, request: &OracleRequest<'_>) -> Result<Option<f64>> {
        (**self).find_start_time(request)
    }
}

/// Never knows. Boundaries the heuristics miss stay unresolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOracle;

impl StartTimeOracle for NullOracle {
    fn find_start_time(&mut self, request: &OracleRequest<'_>) -> Result<Option<f64>> {
        debug!(kind = %request.kind, "no oracle configured");
        Ok(None)
    }
}

/// Memoizes answers by `(segment kind, window start)`, optionally persisted per episode.
///
/// Only definite answers are cached so a later run can retry the unknowns.
#[derive(Debug)]
pub struct CachedOracle<O> {
    inner: O,
    path: Option<PathBuf>,
    entries: BTreeMap<String, f64>,
}

impl<O: StartTimeOracle> CachedOracle<O> {
    /// A cache that lives only as long as this value.
    pub fn in_memory(inner: O) -> Self {
        Self {
            inner,
            path: None,
            entries: BTreeMap::new(),
        }
    }

    /// A cache backed by `<cache_dir>/<episode>.json`, loading any previous answers.
    pub fn open(inner: O, cache_dir: &Path, episode: u32) -> Result<Self> {
        fs::create_dir_all(cache_dir)?;
        let path = cache_dir.join(format!("{episode}.json"));

        let entries = if path.exists() {
            serde_json::from_slice(&fs::read(&path)?)?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            inner,
            path: Some(path),
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_inner(self) -> O {
        self.inner
    }

    fn key(kind: SegmentKind, window_start: f64) -> String {
        format!("{kind}@{window_start}")
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        fs::write(path, serde_json::to_vec_pretty(&self.entries)?)?;
        Ok(())
    }
}

impl<O: StartTimeOracle> StartTimeOracle for CachedOracle<O> {
    fn find_start_time(&mut self, request: &OracleRequest<'_>) -> Result<Option<f64>> {
        let window_start = request.window_start();
        let key = Self::key(request.kind, window_start);

        if let Some(&start_time) = self.entries.get(&key) {
            info!(kind = %request.kind, window_start, start_time, "using cached oracle answer");
            return Ok(Some(start_time));
        }

        let answer = self.inner.find_start_time(request)?;
        if let Some(start_time) = answer {
            self.entries.insert(key, start_time);
            self.save()?;
        }

        Ok(answer)
    }
}

/// Connection settings for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub api_key: String,
    pub model: String,
    /// Base URL without the `/chat/completions` suffix.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// User message: the segment prompt followed by the window as fenced JSON.
pub fn user_prompt(request: &OracleRequest<'_>) -> Result<String> {
    let transcript = serde_json::to_string(request.transcript)?;
    Ok(format!("{}\n\ntranscript:\n\n````{transcript}````", request.prompt))
}

#[derive(Deserialize)]
struct StartTimeReply {
    #[serde(default)]
    start_time: Option<f64>,
}

/// Decode the model's JSON reply. Empty or malformed replies are errors.
pub fn parse_reply(content: &str) -> Result<Option<f64>> {
    if content.trim().is_empty() {
        return Err(Error::Oracle("language model returned an empty response".to_string()));
    }

    let reply: StartTimeReply = serde_json::from_str(content)
        .map_err(|err| Error::Oracle(format!("malformed language model response {content:?}: {err}")))?;

    Ok(reply.start_time)
}

#[cfg(feature = "llm")]
#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
}

#[cfg(feature = "llm")]
#[derive(serde::Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[cfg(feature = "llm")]
#[derive(serde::Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[cfg(feature = "llm")]
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[cfg(feature = "llm")]
#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[cfg(feature = "llm")]
#[derive(Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking client for an OpenAI-compatible chat-completions API.
#[cfg(feature = "llm")]
#[derive(Debug)]
pub struct OpenAiOracle {
    client: reqwest::blocking::Client,
    config: OracleConfig,
}

#[cfg(feature = "llm")]
impl OpenAiOracle {
    pub fn new(config: OracleConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("showscribe")
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    fn request_body<'a>(&'a self, user: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            response_format: ResponseFormat { kind: "json_object" },
        }
    }
}

#[cfg(feature = "llm")]
impl StartTimeOracle for OpenAiOracle {
    fn find_start_time(&mut self, request: &OracleRequest<'_>) -> Result<Option<f64>> {
        let user = user_prompt(request)?;
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        debug!(kind = %request.kind, chunks = request.transcript.len(), "asking language model for segment start");

        let response: ChatResponse = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&self.request_body(&user))
            .send()?
            .error_for_status()?
            .json()?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        let start_time = parse_reply(&content)?;
        debug!(kind = %request.kind, ?start_time, "language model answered");
        Ok(start_time)
    }
}
