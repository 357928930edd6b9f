//! Change detection and single-flight recomputation.
//!
//! A host notifies the orchestrator on every scene mutation by calling
//! `begin` with the live scene. At most one pass is in flight: `begin`
//! returns the fog update to apply and the host reports back with `finish`.
//! Triggers arriving in between are dropped, not queued; the next trigger
//! reads the live scene again.

use crate::algorithms::boolean::{BoolOp, GeoOps, PathOps, VisibilityMask};
use crate::algorithms::visibility::{build_visibility_mask, clip_to_range};
use crate::cache::{CacheEntry, ObserverCache};
use crate::config::{MergePolicy, VisionConfig};
use crate::error::VisionError;
use crate::fog::{FogItem, FogUpdate};
use crate::model::{Observer, ObserverId, Point};
use crate::scene::{SceneState, SceneView};
use crate::snapshot::{Change, SceneSnapshot};
use crate::store::SceneStore;
use crate::timer::{Clock, SystemClock, Timer};
use serde::Serialize;

pub type PassTicket = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A pass is in flight.
    Busy,
    NotReady,
    StoreUnavailable,
    /// No background image designated, so there is no map rectangle.
    NoBackground,
    Unchanged,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObserverFailure {
    pub observer: ObserverId,
    pub message: String,
    /// The observer's previous mask was emitted instead.
    pub fell_back: bool,
}

/// Diagnostics of one pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassReport {
    pub ticket: PassTicket,
    pub change: Option<Change>,
    pub observers: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    pub shadows: usize,
    /// Cache entries evicted by a structural change.
    pub invalidated: usize,
    pub failures: Vec<ObserverFailure>,
    pub fog_items: usize,
    pub compute_ms: f64,
    pub communication_ms: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pass {
    pub ticket: PassTicket,
    pub update: FogUpdate,
    pub report: PassReport,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Trigger {
    Skipped(SkipReason),
    Pass(Pass),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Skipped(SkipReason),
    Completed(PassReport),
}

struct InFlight {
    ticket: PassTicket,
    snapshot: SceneSnapshot,
    issued_at: f64,
    report: PassReport,
}

fn release_mask(id: &ObserverId, mask: VisibilityMask) {
    log::trace!("released cached mask of {}", id);
    drop(mask);
}

pub struct Orchestrator<O: PathOps = GeoOps> {
    config: VisionConfig,
    ops: O,
    cache: ObserverCache,
    last: Option<SceneSnapshot>,
    in_flight: Option<InFlight>,
    was_ready: bool,
    next_ticket: PassTicket,
    clock: Box<dyn Clock>,
    last_report: Option<PassReport>,
}

impl Orchestrator<GeoOps> {
    pub fn new(config: VisionConfig) -> Self {
        Self::with_ops(config, GeoOps)
    }
}

impl Default for Orchestrator<GeoOps> {
    fn default() -> Self {
        Self::new(VisionConfig::default())
    }
}

impl<O: PathOps> Orchestrator<O> {
    pub fn with_ops(config: VisionConfig, ops: O) -> Self {
        Orchestrator {
            config,
            ops,
            cache: ObserverCache::new(),
            last: None,
            in_flight: None,
            was_ready: false,
            next_ticket: 1,
            clock: Box::new(SystemClock::default()),
            last_report: None,
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    pub fn ops(&self) -> &O {
        &self.ops
    }

    pub fn cache(&self) -> &ObserverCache {
        &self.cache
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn last_report(&self) -> Option<&PassReport> {
        self.last_report.as_ref()
    }

    /// Drops every cached mask and forgets the last snapshot, so the next
    /// trigger recomputes from scratch.
    pub fn invalidate(&mut self) {
        let n = self.cache.invalidate_all(release_mask);
        self.last = None;
        log::debug!("engine invalidated; {} cached masks released", n);
    }

    /// Reacts to a scene mutation. Returns the pass to apply, or why none
    /// is needed.
    pub fn begin(&mut self, scene: &SceneState) -> Trigger {
        if self.in_flight.is_some() {
            log::debug!("pass in flight; trigger coalesced");
            return Trigger::Skipped(SkipReason::Busy);
        }
        if !scene.ready {
            if self.was_ready {
                let n = self.cache.invalidate_all(release_mask);
                self.last = None;
                log::info!("scene no longer ready; {} cached masks released", n);
            }
            self.was_ready = false;
            return Trigger::Skipped(SkipReason::NotReady);
        }
        self.was_ready = true;

        let Some(view) = scene.view(&self.config) else {
            log::debug!("no background image; pass skipped");
            return Trigger::Skipped(SkipReason::NoBackground);
        };
        let snapshot = SceneSnapshot::capture(scene, &view.bounds, &self.config);
        let change = snapshot.classify(self.last.as_ref());
        if change == Change::Unchanged {
            self.last = Some(snapshot);
            return Trigger::Skipped(SkipReason::Unchanged);
        }

        let mut timer = Timer::start(self.clock.as_ref());
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let mut report = PassReport {
            ticket,
            change: Some(change),
            observers: view.observers.len(),
            ..PassReport::default()
        };
        if change == Change::Structural {
            report.invalidated = self.cache.invalidate_all(release_mask);
            if report.invalidated > 0 {
                log::info!("map or obstructions changed; {} cached masks released", report.invalidated);
            }
        }

        let update = if !view.vision_enabled || view.observers.is_empty() {
            FogUpdate::clear(view.fog_items.clone())
        } else {
            self.compute(&view, &mut report)
        };
        report.fog_items = update.add.len();
        report.compute_ms = timer.stop(self.clock.as_ref());

        self.in_flight = Some(InFlight {
            ticket,
            snapshot,
            issued_at: self.clock.now_ms(),
            report: report.clone(),
        });
        Trigger::Pass(Pass { ticket, update, report })
    }

    /// Ends the pass `ticket`. The pass's snapshot becomes the last seen one
    /// only when the host applied the update.
    pub fn finish(&mut self, ticket: PassTicket, applied: bool) -> Result<PassReport, VisionError> {
        match self.in_flight.take() {
            Some(flight) if flight.ticket == ticket => {
                let mut report = flight.report;
                report.communication_ms = self.clock.now_ms() - flight.issued_at;
                if applied {
                    self.last = Some(flight.snapshot);
                } else {
                    log::warn!("pass {} was not applied; the next trigger recomputes", ticket);
                }
                self.last_report = Some(report.clone());
                Ok(report)
            }
            other => {
                let expected = other.as_ref().map(|f| f.ticket);
                self.in_flight = other;
                Err(VisionError::StalePass { got: ticket, expected })
            }
        }
    }

    /// Read, compute and apply in one go against a synchronous store.
    pub fn run<S: SceneStore>(&mut self, store: &mut S) -> Result<Outcome, VisionError> {
        if self.is_busy() {
            return Ok(Outcome::Skipped(SkipReason::Busy));
        }
        let scene = match store.read() {
            Ok(scene) => scene,
            Err(e) => {
                log::debug!("{}; pass skipped", e);
                return Ok(Outcome::Skipped(SkipReason::StoreUnavailable));
            }
        };
        let pass = match self.begin(&scene) {
            Trigger::Skipped(reason) => return Ok(Outcome::Skipped(reason)),
            Trigger::Pass(pass) => pass,
        };
        match store.apply(&pass.update) {
            Ok(()) => self.finish(pass.ticket, true).map(Outcome::Completed),
            Err(e) => {
                self.finish(pass.ticket, false)?;
                Err(e.into())
            }
        }
    }

    fn compute(&mut self, view: &SceneView, report: &mut PassReport) -> FogUpdate {
        self.cache.retain_observers(&view.observers, release_mask);

        let mut masks: Vec<(ObserverId, VisibilityMask)> = Vec::with_capacity(view.observers.len());
        for observer in &view.observers {
            let Some((mask, center)) = self.resolve(observer, view, report) else { continue };
            match clip_to_range(&self.ops, mask, center, observer.vision_radius, self.config.circle_tolerance) {
                Ok(mask) => masks.push((observer.id.clone(), mask)),
                Err(e) => {
                    log::warn!("vision range clip for {} failed: {}", observer.id, e);
                    report.failures.push(ObserverFailure {
                        observer: observer.id.clone(),
                        message: e.to_string(),
                        fell_back: false,
                    });
                }
            }
        }

        let complete = masks.len() == view.observers.len();
        FogUpdate {
            add: self.merge(masks, complete, report),
            delete: view.fog_items.clone(),
            fill_fog: self.config.fill_fog && !view.fog_filled,
        }
    }

    /// Unclipped mask of `observer` and the position it was computed for:
    /// from the cache when the observer has not moved, freshly built
    /// otherwise, or the stale cached one when building fails.
    fn resolve(
        &mut self,
        observer: &Observer,
        view: &SceneView,
        report: &mut PassReport,
    ) -> Option<(VisibilityMask, Point)> {
        if let Some(mask) = self.cache.hit(observer) {
            report.cache_hits += 1;
            return Some((mask.clone(), observer.position));
        }
        report.cache_misses += 1;

        match build_visibility_mask(
            &self.ops,
            &view.obstructions,
            observer.position,
            &view.bounds,
            self.config.edge_tolerance,
        ) {
            Ok((mask, stats)) => {
                report.shadows += stats.shadows;
                let entry = CacheEntry { position: observer.position, mask: mask.clone() };
                if let Some(old) = self.cache.put(observer.id.clone(), entry) {
                    release_mask(&observer.id, old.mask);
                }
                Some((mask, observer.position))
            }
            Err(e) => {
                let fallback = self.cache.get(&observer.id).map(|entry| (entry.mask.clone(), entry.position));
                log::warn!(
                    "visibility of {} could not be computed: {}{}",
                    observer.id,
                    e,
                    if fallback.is_some() { "; keeping its previous mask" } else { "" }
                );
                report.failures.push(ObserverFailure {
                    observer: observer.id.clone(),
                    message: e.to_string(),
                    fell_back: fallback.is_some(),
                });
                fallback
            }
        }
    }

    /// `complete` is false when some observer produced no mask this pass.
    fn merge(
        &self,
        masks: Vec<(ObserverId, VisibilityMask)>,
        complete: bool,
        report: &mut PassReport,
    ) -> Vec<FogItem> {
        match self.config.merge_policy {
            MergePolicy::PerObserver => masks
                .iter()
                .filter(|(_, m)| !m.is_empty())
                .map(|(id, m)| FogItem::new(m, vec![id.clone()], &self.config))
                .collect(),
            MergePolicy::Shared => {
                // The intersection over a subset of the party would reveal
                // what a missing member cannot see.
                if !complete {
                    log::warn!("shared vision withheld: not every observer has a mask");
                    return Vec::new();
                }
                let Some(((_, first), rest)) = masks.split_first() else { return Vec::new() };
                let shared = rest
                    .iter()
                    .try_fold(first.clone(), |acc, (_, m)| self.ops.apply(&acc, m, BoolOp::Intersect));
                let ids: Vec<ObserverId> = masks.iter().map(|(id, _)| id.clone()).collect();
                match shared {
                    Ok(shared) if shared.is_empty() => Vec::new(),
                    Ok(shared) => vec![FogItem::new(&shared, ids, &self.config)],
                    Err(e) => {
                        log::warn!("shared vision could not be intersected: {}; withheld", e);
                        report.failures.push(ObserverFailure {
                            observer: ids.join(","),
                            message: e.to_string(),
                            fell_back: false,
                        });
                        Vec::new()
                    }
                }
            }
        }
    }
}
