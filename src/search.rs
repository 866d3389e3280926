use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;

/// Flat record shown in the search dropdown. Extra display fields such as
/// `dosage` and `frequency` live in `fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl SearchRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn field(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    /// Secondary line for a medicine row, e.g. `500mg - Twice daily`.
    pub fn detail_line(&self) -> String {
        format!("{} - {}", self.field("dosage"), self.field("frequency"))
    }
}

/// Load records from a JSON array. A missing file is an empty catalogue.
pub fn load_records(path: impl AsRef<Path>) -> anyhow::Result<Vec<SearchRecord>> {
    let path = path.as_ref();
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "record file missing; starting empty");
            return Ok(Vec::new());
        }
        Err(err) => return Err(err.into()),
    };
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&content)?)
}

/// Indices of records whose `name` contains `query`, ignoring case, in
/// catalogue order.
pub fn match_indices(records: &[SearchRecord], query: &str) -> Vec<usize> {
    let needle = query.to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.name.to_lowercase().contains(&needle))
        .map(|(i, _)| i)
        .collect()
}

/// Case-insensitive substring match on `name`, keeping catalogue order.
pub fn filter_records<'a>(records: &'a [SearchRecord], query: &str) -> Vec<&'a SearchRecord> {
    match_indices(records, query)
        .into_iter()
        .map(|i| &records[i])
        .collect()
}

/// Trailing-edge debounce driven by caller-supplied timestamps.
///
/// Scheduling replaces any pending value, so only the latest one can ever
/// fire, and at most once per quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.quiet)
    }

    /// Hand out the pending value once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultList {
    Hidden,
    NoResults,
    /// Indices into the catalogue, in catalogue order.
    Matches(Vec<usize>),
}

impl ResultList {
    pub fn is_visible(&self) -> bool {
        !matches!(self, ResultList::Hidden)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub id: String,
    pub name: String,
}

/// Debounced search box over a fixed catalogue.
#[derive(Debug, Clone)]
pub struct SearchBox {
    records: Vec<SearchRecord>,
    min_query_len: usize,
    debouncer: Debouncer<String>,
    results: ResultList,
    input: String,
    selection: Option<Selection>,
    passes: usize,
}

impl SearchBox {
    pub fn new(records: Vec<SearchRecord>, quiet: Duration, min_query_len: usize) -> Self {
        Self {
            records,
            min_query_len,
            debouncer: Debouncer::new(quiet),
            results: ResultList::Hidden,
            input: String::new(),
            selection: None,
            passes: 0,
        }
    }

    pub fn records(&self) -> &[SearchRecord] {
        &self.records
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn results(&self) -> &ResultList {
        &self.results
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Number of filter passes executed so far.
    pub fn filter_passes(&self) -> usize {
        self.passes
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn matched_records(&self) -> Vec<&SearchRecord> {
        match &self.results {
            ResultList::Matches(indices) => {
                indices.iter().filter_map(|&i| self.records.get(i)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Record a keystroke. Short queries hide the list at once and cancel
    /// any pending pass.
    pub fn on_input(&mut self, query: &str, now: Instant) {
        self.input = query.to_string();
        let trimmed = query.trim();
        if trimmed.chars().count() < self.min_query_len {
            self.debouncer.cancel();
            self.results = ResultList::Hidden;
            return;
        }
        self.debouncer.schedule(trimmed.to_string(), now);
    }

    /// Run the pending filter pass if its quiet period is over. Returns
    /// `true` when a pass ran.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(query) = self.debouncer.poll(now) else {
            return false;
        };
        self.run_filter(&query);
        true
    }

    fn run_filter(&mut self, query: &str) {
        let indices = match_indices(&self.records, query);
        self.passes += 1;
        tracing::debug!(query, matches = indices.len(), "search filter pass");
        self.results = if indices.is_empty() {
            ResultList::NoResults
        } else {
            ResultList::Matches(indices)
        };
    }

    /// Pick the `position`-th visible match. Fills the target field and the
    /// input, then closes the list.
    pub fn select(&mut self, position: usize) -> Option<Selection> {
        let record = match &self.results {
            ResultList::Matches(indices) => {
                indices.get(position).and_then(|&i| self.records.get(i))?
            }
            _ => return None,
        };
        let selection = Selection {
            id: record.id.clone(),
            name: record.name.clone(),
        };
        self.input = selection.name.clone();
        self.selection = Some(selection.clone());
        self.dismiss();
        Some(selection)
    }

    /// Hide the list, e.g. on a click outside the box.
    pub fn dismiss(&mut self) {
        self.debouncer.cancel();
        self.results = ResultList::Hidden;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientCard {
    pub name: String,
    pub age: String,
}

/// Immediate filter for the patient list: lowercase query against the
/// name, raw query against the age text.
pub fn patient_visible(card: &PatientCard, query: &str) -> bool {
    card.name.to_lowercase().contains(&query.to_lowercase()) || card.age.contains(query)
}

pub fn visible_patients<'a>(cards: &'a [PatientCard], query: &str) -> Vec<&'a PatientCard> {
    cards.iter().filter(|c| patient_visible(c, query)).collect()
}
