use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::de::DeserializeOwned;
use tracing::info;

use showscribe::oracle::{NullOracle, OpenAiOracle, OracleConfig, StartTimeOracle};
use showscribe::output_type::OutputType;
use showscribe::transcript::{DiarizationInterval, TranscriptionEntry};
use showscribe::{EpisodeSources, Opts, Segmenter, logging};

fn main() -> Result<()> {
    logging::init();
    let params = Params::parse();

    let sources = EpisodeSources {
        lyrics: read_text(&params.lyrics_path)?,
        show_notes: fs::read(&params.show_notes_path)
            .with_context(|| format!("failed to read show notes from '{}'", params.show_notes_path.display()))?,
        summary: read_text(&params.summary_path)?,
    };
    let transcription: Vec<TranscriptionEntry> = read_json(&params.transcription_path)?;
    let diarization: Vec<DiarizationInterval> = read_json(&params.diarization_path)?;

    let oracle: Box<dyn StartTimeOracle> = match &params.api_key {
        Some(api_key) => Box::new(OpenAiOracle::new(OracleConfig {
            api_key: api_key.clone(),
            model: params.llm_model.clone(),
            base_url: params.llm_base_url.clone(),
            timeout: Duration::from_secs(params.llm_timeout_secs),
        })?),
        None => Box::new(NullOracle),
    };

    let opts = Opts {
        window_seconds: params.window_minutes * 60.0,
        output_type: params.output_type,
        episode_number: params.episode,
        cache_dir: params.cache_dir.clone(),
        ..Opts::default()
    };

    let mut segmenter = Segmenter::new(oracle, opts)?;
    let stdout = io::stdout();
    let report = segmenter.process_to_writer(&sources, &transcription, &diarization, stdout.lock())?;

    info!(
        episode = params.episode,
        resolved = report.resolved(),
        failed = report.failed(),
        "episode segmented"
    );
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "showscribe")]
#[command(about = "Split a podcast episode into timed, transcribed segments")]
struct Params {
    /// Episode outline from the MP3 lyrics tag.
    #[arg(long = "lyrics")]
    pub lyrics_path: PathBuf,

    /// Episode page HTML.
    #[arg(long = "show-notes")]
    pub show_notes_path: PathBuf,

    /// RSS item summary text.
    #[arg(long = "summary")]
    pub summary_path: PathBuf,

    /// Transcription JSON: `[{"start", "end", "text"}]`.
    #[arg(long = "transcription")]
    pub transcription_path: PathBuf,

    /// Diarization JSON: `[{"start", "end", "speaker"}]`.
    #[arg(long = "diarization")]
    pub diarization_path: PathBuf,

    /// Episode number, used to partition the oracle cache.
    #[arg(short = 'e', long = "episode")]
    pub episode: u32,

    #[arg(
        short = 'o',
        long = "output-type",
        value_enum,
        default_value_t = OutputType::Json
    )]
    pub output_type: OutputType,

    /// Directory for cached oracle answers.
    #[arg(long = "cache-dir")]
    pub cache_dir: Option<PathBuf>,

    /// How far past a segment's start to search for the next one.
    #[arg(long = "window-minutes", default_value_t = 30.0)]
    pub window_minutes: f64,

    #[arg(long = "llm-model", default_value = "gpt-4o")]
    pub llm_model: String,

    #[arg(long = "llm-base-url", default_value = "https://api.openai.com/v1")]
    pub llm_base_url: String,

    #[arg(long = "llm-timeout-secs", default_value_t = 120)]
    pub llm_timeout_secs: u64,

    /// Without a key, boundaries the heuristics miss stay unresolved.
    #[arg(long = "api-key", env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = read_text(path)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON from '{}'", path.display()))
}
