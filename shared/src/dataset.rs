//! Turns seed entries (name + postal address) into resolved [`Place`]s.
//!
//! Lookups run strictly one at a time and in seed order: the geocoding
//! service gives no concurrency guarantee and seed order is the initial list
//! order. The builder is a cursor the host drives (request, answer, request
//! the next), so partial progress is observable and a run can be restarted
//! or aborted between steps.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::SeedEntry;
use crate::geo::LatLon;
use crate::geocoder::Resolution;

/// Place identity. Names double as ids and are unique within a dataset.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceId(pub String);

impl PlaceId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named place with a resolved coordinate. Immutable once built.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Place {
    pub id: PlaceId,
    pub address: String,
    pub position: LatLon,
}

impl Place {
    pub fn name(&self) -> &str {
        self.id.as_str()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub index: usize,
    pub name: String,
    pub resolution: Resolution,
}

/// The lookup the host should perform next. `run` ties the answer to the
/// run that asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLookup {
    pub run: u64,
    pub index: usize,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Lookup(PendingLookup),
    Complete(Vec<Place>),
    /// The answer belonged to a superseded or aborted run, or arrived out of
    /// order; nothing changed.
    Stale,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildState {
    #[default]
    Idle,
    Resolving,
    Complete,
    Aborted,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total: usize,
    pub resolved: usize,
    pub dropped: usize,
}

impl Progress {
    pub fn done(&self) -> usize {
        self.resolved + self.dropped
    }
}

#[derive(Debug, Clone, Default)]
pub struct DatasetBuilder {
    seed: Vec<SeedEntry>,
    run: u64,
    cursor: usize,
    outcomes: Vec<Outcome>,
    places: Vec<Place>,
    state: BuildState,
}

impl DatasetBuilder {
    pub fn new(seed: Vec<SeedEntry>) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Starts a fresh run from the first seed entry. Answers for any earlier
    /// run become stale.
    pub fn start(&mut self) -> Step {
        self.run += 1;
        self.cursor = 0;
        self.outcomes.clear();
        self.places.clear();
        self.state = BuildState::Resolving;
        info!(run = self.run, total = self.seed.len(), "dataset build started");
        self.advance()
    }

    /// Whether an answer for `index` of `run` would be recorded.
    pub fn expects(&self, run: u64, index: usize) -> bool {
        self.state == BuildState::Resolving && run == self.run && index == self.cursor
    }

    /// The `(run, index)` of the lookup currently awaiting an answer.
    pub fn pending(&self) -> Option<(u64, usize)> {
        (self.state == BuildState::Resolving).then_some((self.run, self.cursor))
    }

    /// Feeds the answer for `index` of `run` and returns the next step.
    pub fn record(&mut self, run: u64, index: usize, resolution: Resolution) -> Step {
        if !self.expects(run, index) {
            debug!(
                run,
                index,
                current_run = self.run,
                cursor = self.cursor,
                "ignoring stale geocoding answer"
            );
            return Step::Stale;
        }

        let Some(entry) = self.seed.get(index) else {
            return Step::Stale;
        };

        match resolution {
            Resolution::Found(position) => {
                debug!(place = %entry.name, %position, "place resolved");
                self.places.push(Place {
                    id: PlaceId::new(&entry.name),
                    address: entry.address.clone(),
                    position,
                });
            }
            Resolution::NotFound => {
                warn!(
                    place = %entry.name,
                    address = %entry.address,
                    "dropping place: address could not be resolved"
                );
            }
        }

        self.outcomes.push(Outcome {
            index,
            name: entry.name.clone(),
            resolution,
        });
        self.cursor += 1;
        self.advance()
    }

    /// Abandons the current run. Returns `true` if a run was in flight.
    pub fn abort(&mut self) -> bool {
        if self.state == BuildState::Resolving {
            self.state = BuildState::Aborted;
            info!(run = self.run, done = self.cursor, "dataset build aborted");
            true
        } else {
            false
        }
    }

    /// Replaces the seed for the next run. A run in flight is abandoned; the
    /// run counter keeps going so its answers stay stale.
    pub fn reseed(&mut self, seed: Vec<SeedEntry>) {
        self.abort();
        self.seed = seed;
        self.cursor = 0;
        self.outcomes.clear();
        self.places.clear();
        self.state = BuildState::Idle;
    }

    pub fn address(&self, index: usize) -> Option<&str> {
        self.seed.get(index).map(|entry| entry.address.as_str())
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn progress(&self) -> Progress {
        let resolved = self.places.len();
        Progress {
            total: self.seed.len(),
            resolved,
            dropped: self.outcomes.len() - resolved,
        }
    }

    fn advance(&mut self) -> Step {
        match self.seed.get(self.cursor) {
            Some(entry) => Step::Lookup(PendingLookup {
                run: self.run,
                index: self.cursor,
                address: entry.address.clone(),
            }),
            None => {
                self.state = BuildState::Complete;
                let progress = self.progress();
                info!(
                    run = self.run,
                    resolved = progress.resolved,
                    dropped = progress.dropped,
                    "dataset build complete"
                );
                Step::Complete(self.places.clone())
            }
        }
    }
}

/// Resolves every seed entry in order with `resolve`, dropping the ones that
/// come back [`Resolution::NotFound`].
pub fn build<F>(seed: &[SeedEntry], mut resolve: F) -> Vec<Place>
where
    F: FnMut(&str) -> Resolution,
{
    let mut builder = DatasetBuilder::new(seed.to_vec());
    let mut step = builder.start();
    loop {
        match step {
            Step::Lookup(lookup) => {
                let resolution = resolve(&lookup.address);
                step = builder.record(lookup.run, lookup.index, resolution);
            }
            Step::Complete(places) => return places,
            Step::Stale => return Vec::new(),
        }
    }
}
