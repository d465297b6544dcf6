//! Price histories of markets, keyed by odd id.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::domain::OddId;

/// A decimal price quoted at a point in time. Serialized as a `[timestamp, price]` pair;
/// the `{"timestamp", "price"}` record form is also accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ObservationForm", into = "(i64, f64)")]
pub struct PriceObservation {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub price: f64,
}
impl PriceObservation {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ObservationForm {
    Pair(i64, f64),
    Record { timestamp: i64, price: f64 },
}

impl From<ObservationForm> for PriceObservation {
    fn from(form: ObservationForm) -> Self {
        match form {
            ObservationForm::Pair(timestamp, price) => Self::new(timestamp, price),
            ObservationForm::Record { timestamp, price } => Self::new(timestamp, price),
        }
    }
}

impl From<PriceObservation> for (i64, f64) {
    fn from(observation: PriceObservation) -> Self {
        (observation.timestamp, observation.price)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceHistory {
    series: FxHashMap<OddId, Vec<PriceObservation>>,
}
impl PriceHistory {
    pub fn insert(&mut self, odd_id: OddId, observation: PriceObservation) {
        self.series.entry(odd_id).or_default().push(observation);
    }

    pub fn observations(&self, odd_id: &OddId) -> &[PriceObservation] {
        self.series.get(odd_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// The observation with the greatest timestamp. Of several sharing that timestamp, the last
    /// one supplied wins.
    pub fn latest(&self, odd_id: &OddId) -> Option<&PriceObservation> {
        self.observations(odd_id)
            .iter()
            .max_by_key(|observation| observation.timestamp)
    }

    /// The observation with the least timestamp. Of several sharing that timestamp, the first
    /// one supplied wins.
    pub fn opening(&self, odd_id: &OddId) -> Option<&PriceObservation> {
        self.observations(odd_id)
            .iter()
            .min_by_key(|observation| observation.timestamp)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl FromIterator<(OddId, PriceObservation)> for PriceHistory {
    fn from_iter<I: IntoIterator<Item = (OddId, PriceObservation)>>(iter: I) -> Self {
        let mut history = PriceHistory::default();
        for (odd_id, observation) in iter {
            history.insert(odd_id, observation);
        }
        history
    }
}
