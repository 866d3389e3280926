use crate::pad::export::encode_png;
use crate::pad::DrawingSnapshot;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Every label a stand-in recognizer may return.
pub const VOCABULARY: &[&str] = &[
    "Paracetamol",
    "Aspirin",
    "Ibuprofen",
    "Amoxicillin",
    "Metformin",
    "Lisinopril",
    "Atorvastatin",
    "Omeprazole",
    "Amlodipine",
    "Metoprolol",
    "Ciprofloxacin",
    "Doxycycline",
    "Azithromycin",
    "Ceftriaxone",
    "Vancomycin",
    "Insulin",
];

const SHORT_NAMES: &[&str] = &["Aspirin", "Ibuprofen", "Insulin"];
const MEDIUM_NAMES: &[&str] = &["Metformin", "Lisinopril", "Omeprazole"];
const LONG_NAMES: &[&str] = &["Paracetamol", "Amoxicillin", "Ciprofloxacin", "Atorvastatin"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub label: String,
    pub confidence: f32,
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    /// Nothing has been written on the pad.
    EmptyInput,
    /// A substituted backend failed.
    Backend(String),
    /// The worker running the request went away without answering.
    Disconnected,
}

impl std::fmt::Display for RecognitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecognitionError::EmptyInput => write!(f, "Please write something first!"),
            RecognitionError::Backend(msg) => write!(f, "recognition backend failed: {msg}"),
            RecognitionError::Disconnected => write!(f, "recognition worker disconnected"),
        }
    }
}

impl std::error::Error for RecognitionError {}

/// Turns a finished drawing into a label.
///
/// Implementations are synchronous; [`RecognitionJob`] moves them off the
/// UI thread.
pub trait Recognizer: Send + Sync {
    fn recognize(&self, snapshot: &DrawingSnapshot) -> Result<RecognitionResult, RecognitionError>;
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    Short,
    Medium,
    Long,
}

impl Complexity {
    fn candidates(self) -> &'static [&'static str] {
        match self {
            Complexity::Short => SHORT_NAMES,
            Complexity::Medium => MEDIUM_NAMES,
            Complexity::Long => LONG_NAMES,
        }
    }
}

/// Bucket limits are placeholders, not tuned values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketLimits {
    pub short_max_strokes: usize,
    pub short_max_points: usize,
    pub medium_max_strokes: usize,
    pub medium_max_points: usize,
}

impl Default for BucketLimits {
    fn default() -> Self {
        Self {
            short_max_strokes: 3,
            short_max_points: 50,
            medium_max_strokes: 6,
            medium_max_points: 100,
        }
    }
}

impl BucketLimits {
    /// `None` when no stroke has been committed yet.
    pub fn classify(&self, strokes: usize, points: usize) -> Option<Complexity> {
        if strokes == 0 {
            return None;
        }
        if strokes <= self.short_max_strokes && points < self.short_max_points {
            Some(Complexity::Short)
        } else if strokes <= self.medium_max_strokes && points < self.medium_max_points {
            Some(Complexity::Medium)
        } else {
            Some(Complexity::Long)
        }
    }
}

/// Guesses from stroke and point counts.
///
/// A matched bucket answers with its first candidate and lists the rest as
/// alternatives. Without committed strokes the label is drawn at random
/// from [`VOCABULARY`].
pub struct HeuristicRecognizer {
    limits: BucketLimits,
    rng: Mutex<StdRng>,
}

impl Default for HeuristicRecognizer {
    fn default() -> Self {
        Self::new(BucketLimits::default(), StdRng::from_entropy())
    }
}

impl HeuristicRecognizer {
    pub fn new(limits: BucketLimits, rng: StdRng) -> Self {
        Self {
            limits,
            rng: Mutex::new(rng),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(BucketLimits::default(), StdRng::seed_from_u64(seed))
    }

    fn random_label(&self) -> &'static str {
        let idx = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..VOCABULARY.len()),
            Err(poisoned) => poisoned.into_inner().gen_range(0..VOCABULARY.len()),
        };
        VOCABULARY[idx]
    }
}

impl Recognizer for HeuristicRecognizer {
    fn recognize(&self, snapshot: &DrawingSnapshot) -> Result<RecognitionResult, RecognitionError> {
        let drawing = &snapshot.drawing;
        if !drawing.has_content() {
            return Err(RecognitionError::EmptyInput);
        }
        let strokes = drawing.stroke_count();
        let points = drawing.total_points();
        let result = match self.limits.classify(strokes, points) {
            Some(bucket) => {
                let candidates = bucket.candidates();
                RecognitionResult {
                    label: candidates[0].to_string(),
                    confidence: 1.0 / candidates.len() as f32,
                    alternatives: candidates[1..].iter().map(|s| s.to_string()).collect(),
                }
            }
            None => RecognitionResult {
                label: self.random_label().to_string(),
                confidence: 1.0 / VOCABULARY.len() as f32,
                alternatives: Vec::new(),
            },
        };
        tracing::debug!(strokes, points, label = %result.label, "heuristic recognition");
        Ok(result)
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// Stands in for a remote recognition API: uploads nothing, but encodes
/// the pad image the way a real client would and returns a canned answer.
#[derive(Debug, Default, Clone)]
pub struct MockApiRecognizer;

impl Recognizer for MockApiRecognizer {
    fn recognize(&self, snapshot: &DrawingSnapshot) -> Result<RecognitionResult, RecognitionError> {
        if !snapshot.has_content() {
            return Err(RecognitionError::EmptyInput);
        }
        let png = encode_png(&snapshot.image)
            .map_err(|e| RecognitionError::Backend(format!("{e:#}")))?;
        tracing::debug!(bytes = png.len(), "mock recognition upload prepared");
        Ok(RecognitionResult {
            label: "Paracetamol".into(),
            confidence: 0.85,
            alternatives: vec!["Aspirin".into(), "Ibuprofen".into()],
        })
    }

    fn name(&self) -> &str {
        "mock_api"
    }
}

/// Build the recognizer named in settings. Unknown names fall back to the
/// heuristic one.
pub fn recognizer_from_name(name: &str) -> Arc<dyn Recognizer> {
    match name {
        "mock_api" => Arc::new(MockApiRecognizer),
        "heuristic" => Arc::new(HeuristicRecognizer::default()),
        other => {
            tracing::warn!(recognizer = other, "unknown recognizer; using heuristic");
            Arc::new(HeuristicRecognizer::default())
        }
    }
}

/// One in-flight recognition request.
///
/// The strategy runs on a worker thread after `latency`; the owner polls
/// [`RecognitionJob::try_result`] from its frame loop.
pub struct RecognitionJob {
    rx: Receiver<Result<RecognitionResult, RecognitionError>>,
}

impl RecognitionJob {
    /// Empty drawings are rejected here, before any worker is started.
    pub fn spawn(
        recognizer: Arc<dyn Recognizer>,
        snapshot: DrawingSnapshot,
        latency: Duration,
    ) -> Result<Self, RecognitionError> {
        if !snapshot.has_content() {
            return Err(RecognitionError::EmptyInput);
        }
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if !latency.is_zero() {
                thread::sleep(latency);
            }
            let result = recognizer.recognize(&snapshot);
            if let Err(err) = &result {
                tracing::warn!(recognizer = recognizer.name(), %err, "recognition failed");
            }
            let _ = tx.send(result);
        });
        Ok(Self { rx })
    }

    /// `None` while the worker is still busy.
    pub fn try_result(&mut self) -> Option<Result<RecognitionResult, RecognitionError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(RecognitionError::Disconnected)),
        }
    }

    /// Block until the worker answers or `timeout` passes.
    pub fn wait(self, timeout: Duration) -> Option<Result<RecognitionResult, RecognitionError>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(RecognitionError::Disconnected)),
        }
    }
}
