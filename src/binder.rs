//! Reactive binding between the filter controls and the two charts.
//!
//! Every filter change opens a new generation. Results are tagged with the
//! generation they were computed for and only the newest one is published; a
//! result for a superseded generation is dropped on arrival.

use std::fmt;
use std::sync::Arc;

use crate::chart::{render_price_chart, render_volume_chart, ChartSpec};
use crate::data::filter::{FilterEvent, FilterState};
use crate::data::model::Dataset;
use crate::data::query::filter_and_aggregate;

/// Monotonic identifier of one recomputation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinderState {
    /// Published charts match the last submitted filter.
    Idle,
    /// A request for this generation is outstanding.
    Recomputing(Generation),
}

/// Both charts for one filter state, as published to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSet {
    pub generation: Generation,
    pub filter: FilterState,
    pub price_chart: ChartSpec,
    pub volume_chart: ChartSpec,
    /// Rows matched by the filter, including rows without a price.
    pub selected_rows: usize,
}

/// A pending recomputation. Running it does not touch the binder, so it can be
/// executed wherever the caller likes and handed back via [`ReactiveBinder::complete`].
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub generation: Generation,
    pub filter: FilterState,
}

impl Request {
    /// Query + render.
    pub fn run(&self, dataset: &Dataset) -> ChartSet {
        let result = filter_and_aggregate(dataset, &self.filter);
        ChartSet {
            generation: self.generation,
            filter: self.filter.clone(),
            price_chart: render_price_chart(&result.price_series),
            volume_chart: render_volume_chart(&result.scatter),
            selected_rows: result.scatter.indices.len(),
        }
    }
}

type Subscriber = Box<dyn FnMut(&ChartSet)>;

pub struct ReactiveBinder {
    dataset: Arc<Dataset>,
    filter: FilterState,
    state: BinderState,
    last_generation: Generation,
    current: ChartSet,
    subscribers: Vec<Subscriber>,
}

impl ReactiveBinder {
    /// Start Idle with the default filter and its charts already computed.
    pub fn new(dataset: Arc<Dataset>, preferred_organic: &str) -> Self {
        let filter = FilterState::initial(&dataset, preferred_organic);
        let generation = Generation(0);
        let current = Request {
            generation,
            filter: filter.clone(),
        }
        .run(&dataset);

        log::debug!(
            "Initial charts for {} / {}: {} rows",
            filter.city,
            filter.organic,
            current.selected_rows
        );

        ReactiveBinder {
            dataset,
            filter,
            state: BinderState::Idle,
            last_generation: generation,
            current,
            subscribers: Vec::new(),
        }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// The most recently submitted filter (may still be recomputing).
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn state(&self) -> BinderState {
        self.state
    }

    /// The last published charts.
    pub fn charts(&self) -> &ChartSet {
        &self.current
    }

    /// Register a listener called on every publish.
    pub fn subscribe(&mut self, listener: impl FnMut(&ChartSet) + 'static) {
        self.subscribers.push(Box::new(listener));
    }

    /// Record a new filter and open a generation for it, superseding any
    /// request still in flight. The filter is clamped to the dataset range.
    ///
    /// Returns `None` only when Idle and the filter equals the published one.
    /// While Recomputing, even a repeated filter opens a fresh generation, so a
    /// request that was dropped never leaves the binder stuck.
    pub fn submit(&mut self, filter: FilterState) -> Option<Request> {
        let filter = filter.clamped(&self.dataset);
        if self.state == BinderState::Idle && filter == self.current.filter {
            return None;
        }

        let generation = Generation(self.last_generation.0 + 1);
        if let BinderState::Recomputing(stale) = self.state {
            log::debug!("Generation {generation} supersedes {stale}");
        }
        self.last_generation = generation;
        self.filter = filter.clone();
        self.state = BinderState::Recomputing(generation);
        Some(Request { generation, filter })
    }

    /// Publish `charts` if they belong to the outstanding generation.
    ///
    /// Returns `false` (and publishes nothing) for a superseded or unexpected result.
    pub fn complete(&mut self, charts: ChartSet) -> bool {
        match self.state {
            BinderState::Recomputing(expected) if expected == charts.generation => {
                log::debug!(
                    "Publishing generation {}: {} rows, {} line points, {} scatter points",
                    charts.generation,
                    charts.selected_rows,
                    charts.price_chart.point_count(),
                    charts.volume_chart.point_count()
                );
                self.current = charts;
                self.state = BinderState::Idle;
                for listener in &mut self.subscribers {
                    listener(&self.current);
                }
                true
            }
            _ => {
                log::debug!("Discarding result of superseded generation {}", charts.generation);
                false
            }
        }
    }

    /// Replace the filter and recompute synchronously. Returns whether new
    /// charts were published.
    pub fn set_filter(&mut self, filter: FilterState) -> bool {
        match self.submit(filter) {
            Some(request) => {
                let charts = request.run(&self.dataset);
                self.complete(charts)
            }
            None => false,
        }
    }

    /// Apply one control interaction to the current filter and recompute.
    pub fn handle(&mut self, event: FilterEvent) -> bool {
        let next = self.filter.apply(&event, &self.dataset);
        self.set_filter(next)
    }
}
