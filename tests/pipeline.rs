use showscribe::oracle::{OracleRequest, StartTimeOracle};
use showscribe::segments::{NewsItem, NoisySegment, QuoteSegment};
use showscribe::transcript::{DiarizationInterval, TranscriptionEntry};
use showscribe::{EpisodeSources, Opts, OutputType, Segment, SegmentData, SegmentKind, Segmenter};

const LYRICS: &str = "Segment #1\nNews Item #1 - Foo\nhttp://x.test\nSegment #2\nSkeptical Quote of the Week\nA quote\nSomeone";

const SHOW_NOTES: &str = r#"<html><body>
<main class="podcast-main">
  <h3>News Items</h3><p>Foo</p>
  <h3>Skeptical Quote of the Week</h3><p>A quote</p>
</main>
</body></html>"#;

/// Answers news boundaries only, and remembers what it was asked.
#[derive(Default)]
struct NewsOracle {
    asked: Vec<SegmentKind>,
}

impl StartTimeOracle for NewsOracle {
    fn find_start_time(&mut self, request: &OracleRequest<'_>) -> showscribe::Result<Option<f64>> {
        self.asked.push(request.kind);
        let answer = request
            .transcript
            .iter()
            .find(|chunk| chunk.text.contains("news item"))
            .map(|chunk| chunk.start);
        Ok(answer)
    }
}

fn sources() -> EpisodeSources {
    EpisodeSources {
        lyrics: LYRICS.to_string(),
        show_notes: SHOW_NOTES.as_bytes().to_vec(),
        summary: "Guest Rogue: Someone; News Items: Foo".to_string(),
    }
}

fn recording() -> (Vec<TranscriptionEntry>, Vec<DiarizationInterval>) {
    let lines = [
        ("Steve", "Hello and welcome to the show"),
        ("Bob", "Hi everyone"),
        ("Cara", "Great to be here"),
        ("Steve", "Our first news item is about foo"),
        ("Jay", "Foo is fascinating"),
        ("Evan", "Indeed it is"),
        ("Steve", "Evan, give us the quote"),
        ("Evan", "Here is a quote from someone"),
        ("Steve", "Thanks everyone"),
        ("Steve", "The Skeptics' Guide to the Universe is produced by SGU Productions"),
    ];

    let mut transcription = Vec::new();
    let mut diarization = Vec::new();
    for (idx, (speaker, text)) in lines.iter().enumerate() {
        let start = idx as f64 * 10.0;
        transcription.push(TranscriptionEntry {
            start,
            end: start + 10.0,
            text: text.to_string(),
        });
        diarization.push(DiarizationInterval {
            start,
            end: start + 10.0,
            speaker: speaker.to_string(),
        });
    }

    (transcription, diarization)
}

fn assert_partitions(segments: &[Segment], episode_end: f64) {
    assert_eq!(segments.first().and_then(|s| s.start_time), Some(0.0));
    assert_eq!(segments.last().map(|s| s.end_time), Some(episode_end));

    for pair in segments.windows(2) {
        assert_eq!(Some(pair[0].end_time), pair[1].start_time, "{pair:?}");
    }
    for segment in segments {
        let start = segment.start_time.unwrap_or_default();
        assert!(segment.end_time >= start, "{segment:?}");
    }
}

#[test]
fn end_to_end_episode_is_partitioned() -> anyhow::Result<()> {
    let (transcription, diarization) = recording();
    let mut segmenter = Segmenter::new(NewsOracle::default(), Opts::default())?;

    let aligned = segmenter.process(&sources(), &transcription, &diarization)?;

    let data: Vec<_> = aligned.segments.iter().map(|s| s.data.clone()).collect();
    assert_eq!(
        data,
        vec![
            SegmentData::Intro(Default::default()),
            SegmentData::NewsItem(NewsItem {
                item_number: 1,
                topic: "Foo".to_string(),
                url: Some("http://x.test".to_string()),
            }),
            SegmentData::Quote(QuoteSegment {
                quote: "A quote".to_string(),
                attribution: "Someone".to_string(),
            }),
            SegmentData::Outro(Default::default()),
        ]
    );

    assert_partitions(&aligned.segments, 100.0);

    let starts: Vec<_> = aligned.segments.iter().map(|s| s.start_time).collect();
    assert_eq!(starts, [Some(0.0), Some(30.0), Some(60.0), Some(90.0)]);

    let chunk_count: usize = aligned.segments.iter().map(|s| s.transcript.len()).sum();
    assert_eq!(chunk_count, transcription.len());
    assert_eq!(aligned.segments[2].transcript[0].speaker, "Steve");
    assert_eq!(aligned.report.failed(), 0);
    Ok(())
}

#[test]
fn oracle_is_only_asked_about_heuristic_misses() -> anyhow::Result<()> {
    let (transcription, diarization) = recording();
    let mut oracle = NewsOracle::default();

    {
        let mut segmenter = Segmenter::new(&mut oracle, Opts::default())?;
        segmenter.process(&sources(), &transcription, &diarization)?;
    }

    assert_eq!(oracle.asked, [SegmentKind::NewsItem]);
    Ok(())
}

#[test]
fn cached_answers_are_reused_across_runs() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (transcription, diarization) = recording();
    let opts = Opts {
        episode_number: 42,
        cache_dir: Some(dir.path().to_path_buf()),
        ..Opts::default()
    };

    let mut first = NewsOracle::default();
    Segmenter::new(&mut first, opts.clone())?.process(&sources(), &transcription, &diarization)?;
    assert_eq!(first.asked.len(), 1);

    let mut second = NewsOracle::default();
    let aligned = Segmenter::new(&mut second, opts)?.process(&sources(), &transcription, &diarization)?;
    assert!(second.asked.is_empty());
    assert_eq!(aligned.segments[1].start_time, Some(30.0));
    Ok(())
}

#[test]
fn noisy_answer_is_merged_from_show_notes() -> anyhow::Result<()> {
    let sources = EpisodeSources {
        lyrics: "Segment #1\nWho's That Noisy?\nSegment #2\nSkeptical Quote of the Week\nA quote\nSomeone".to_string(),
        show_notes: br#"<main class="podcast-main"><h3>Who's That Noisy</h3><p>Answer: a humpback whale</p></main>"#
            .to_vec(),
        summary: String::new(),
    };

    let segmenter = Segmenter::heuristics_only(Opts::default())?;
    let segments = segmenter.extract_segments(&sources)?;

    let noisy: Vec<_> = segments
        .iter()
        .filter_map(|s| match &s.data {
            SegmentData::Noisy(noisy) => Some(noisy.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        noisy,
        [NoisySegment {
            last_week_answer: "a humpback whale".to_string()
        }]
    );
    assert_eq!(segments.len(), 2);
    Ok(())
}

#[test]
fn show_notes_without_main_region_abort_the_run() -> anyhow::Result<()> {
    let sources = EpisodeSources {
        show_notes: b"<html><body><h3>Heading</h3></body></html>".to_vec(),
        ..sources()
    };
    let segmenter = Segmenter::heuristics_only(Opts::default())?;

    let err = segmenter.extract_segments(&sources).unwrap_err();
    assert!(matches!(err, showscribe::Error::MissingStructure(_)));
    Ok(())
}

#[test]
fn process_to_writer_emits_json_records() -> anyhow::Result<()> {
    let (transcription, diarization) = recording();
    let opts = Opts {
        output_type: OutputType::Json,
        ..Opts::default()
    };
    let mut segmenter = Segmenter::new(NewsOracle::default(), opts)?;

    let mut out = Vec::new();
    let report = segmenter.process_to_writer(&sources(), &transcription, &diarization, &mut out)?;
    assert_eq!(report.resolved(), 3);

    let parsed: serde_json::Value = serde_json::from_slice(&out)?;
    let records = parsed.as_array().ok_or_else(|| anyhow::anyhow!("expected JSON array"))?;
    let types: Vec<_> = records.iter().map(|r| r["type"].as_str().unwrap_or_default()).collect();
    assert_eq!(types, ["intro", "news_item", "quote", "outro"]);
    assert_eq!(records[1]["topic"], "Foo");
    assert_eq!(records[1]["duration"], 0.5);
    Ok(())
}

#[test]
fn process_to_writer_emits_vtt_cues() -> anyhow::Result<()> {
    let (transcription, diarization) = recording();
    let opts = Opts {
        output_type: OutputType::Vtt,
        ..Opts::default()
    };
    let mut segmenter = Segmenter::new(NewsOracle::default(), opts)?;

    let mut out = Vec::new();
    segmenter.process_to_writer(&sources(), &transcription, &diarization, &mut out)?;

    let vtt = String::from_utf8(out)?;
    assert!(vtt.starts_with("WEBVTT\n\nintro\n00:00:00.000 --> 00:00:30.000\n<v Steve>Hello and welcome to the show\n"));
    assert!(vtt.contains("qow\n00:01:00.000 --> 00:01:30.000\n<v Steve>Evan, give us the quote\n"));
    Ok(())
}
