use crate::catalog::PrescriptionStatus;
use crate::notify::{NoticeKind, Notifications, MSG_DISPENSED, MSG_DISPENSE_FAILED};
use anyhow::Context;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispenseRequest {
    pub patient_id: String,
    pub prescription_index: usize,
    pub quantity: u32,
}

impl DispenseRequest {
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("patient_id", self.patient_id.clone()),
            ("prescription_index", self.prescription_index.to_string()),
            ("quantity", self.quantity.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    Network(String),
    Rejected { status: u16 },
}

impl std::fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionError::Network(msg) => write!(f, "dispense request failed: {msg}"),
            SubmissionError::Rejected { status } => {
                write!(f, "dispense request rejected with status {status}")
            }
        }
    }
}

impl std::error::Error for SubmissionError {}

/// Sends a dispense request to whatever sits behind the form action.
pub trait DispenseClient: Send + Sync {
    fn submit(&self, request: &DispenseRequest) -> Result<(), SubmissionError>;
}

/// Form POST against the dispense endpoint.
pub struct HttpDispenseClient {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpDispenseClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("build dispense http client")?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl DispenseClient for HttpDispenseClient {
    fn submit(&self, request: &DispenseRequest) -> Result<(), SubmissionError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&request.form_fields())
            .send()
            .map_err(|e| SubmissionError::Network(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SubmissionError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Ready,
    Submitting,
    Dispensed,
}

/// Dispense control for one prescription.
///
/// `Submitting` only lasts until the worker answers: success parks the
/// button in `Dispensed`, any failure re-enables it.
pub struct DispenseButton {
    request: DispenseRequest,
    state: ButtonState,
    pending: Option<Receiver<Result<(), SubmissionError>>>,
}

impl DispenseButton {
    pub fn new(request: DispenseRequest, status: PrescriptionStatus) -> Self {
        let state = match status {
            PrescriptionStatus::Active => ButtonState::Ready,
            PrescriptionStatus::Dispensed => ButtonState::Dispensed,
        };
        Self {
            request,
            state,
            pending: None,
        }
    }

    pub fn request(&self) -> &DispenseRequest {
        &self.request
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.state == ButtonState::Ready
    }

    pub fn label(&self) -> &'static str {
        match self.state {
            ButtonState::Ready => "Dispense",
            ButtonState::Submitting => "Dispensing...",
            ButtonState::Dispensed => "Dispensed",
        }
    }

    pub fn status(&self) -> PrescriptionStatus {
        match self.state {
            ButtonState::Dispensed => PrescriptionStatus::Dispensed,
            ButtonState::Ready | ButtonState::Submitting => PrescriptionStatus::Active,
        }
    }

    /// Start a submission on a worker thread. Ignored unless `Ready`.
    pub fn submit(&mut self, client: Arc<dyn DispenseClient>) -> bool {
        if self.state != ButtonState::Ready {
            return false;
        }
        let (tx, rx) = mpsc::channel();
        let request = self.request.clone();
        thread::spawn(move || {
            let _ = tx.send(client.submit(&request));
        });
        self.pending = Some(rx);
        self.state = ButtonState::Submitting;
        tracing::debug!(
            patient = %self.request.patient_id,
            index = self.request.prescription_index,
            "dispense submitted"
        );
        true
    }

    /// Collect the worker's answer, if any, and report it.
    pub fn poll(
        &mut self,
        notifications: &mut Notifications,
        now: Instant,
    ) -> Option<Result<(), SubmissionError>> {
        let rx = self.pending.as_ref()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                Err(SubmissionError::Network("dispense worker exited".into()))
            }
        };
        self.pending = None;
        self.finish(&result, notifications, now);
        Some(result)
    }

    /// Block for the answer; for callers without a frame loop.
    pub fn wait(
        &mut self,
        notifications: &mut Notifications,
        timeout: Duration,
    ) -> Option<Result<(), SubmissionError>> {
        let rx = self.pending.as_ref()?;
        let result = match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => return None,
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(SubmissionError::Network("dispense worker exited".into()))
            }
        };
        self.pending = None;
        self.finish(&result, notifications, Instant::now());
        Some(result)
    }

    fn finish(
        &mut self,
        result: &Result<(), SubmissionError>,
        notifications: &mut Notifications,
        now: Instant,
    ) {
        match result {
            Ok(()) => {
                self.state = ButtonState::Dispensed;
                notifications.push(NoticeKind::Success, MSG_DISPENSED, now);
            }
            Err(err) => {
                tracing::error!(%err, patient = %self.request.patient_id, "dispense failed");
                self.state = ButtonState::Ready;
                notifications.push(NoticeKind::Error, MSG_DISPENSE_FAILED, now);
            }
        }
    }
}
