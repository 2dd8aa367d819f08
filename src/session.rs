//! Plot session: ties the prepared input, the viewport, the debounce
//! scheduler and the chart together.
//!
//! The session lives on the UI thread. Sampling passes run on the
//! scheduler's worker and come back through [`PlotSession::poll`], which is
//! the only place the chart is updated with new data.

use std::iter;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::display::{DisplayEvent, DisplayHub, EventId};
use crate::error::PlotError;
use crate::expr::{Expression, Variable};
use crate::processing::bounds::{initial_viewport, DataBounds};
use crate::processing::scheduler::{Completed, DebounceScheduler, SchedulerState, Token};
use crate::processing::series_builder::{self, SampledSeries};
use crate::render::ChartSink;
use crate::state::data_series::Series;
use crate::state::prepared_input::{PlotInput, PreparedInput};
use crate::state::settings::PlotSettings;
use crate::state::viewport::Viewport;

/// Parameters of one sampling pass.
#[derive(Debug, Clone)]
pub struct SamplingJob {
    pub expression: Arc<Expression>,
    pub variable: Variable,
    pub x_min: f64,
    pub x_max: f64,
    pub steps: usize,
    pub want_imaginary: bool,
}

pub type PassOutcome = Result<SampledSeries, PlotError>;

impl SamplingJob {
    pub fn run(self) -> PassOutcome {
        series_builder::build(
            self.x_min,
            self.x_max,
            self.steps,
            self.expression.as_ref(),
            &self.variable,
            self.want_imaginary,
        )
    }
}

/// A single user-facing message; replaces whatever was shown before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ParseFailed(String),
    PlotNotPossible,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::ParseFailed(reason) => format!("Plot is not possible: {reason}"),
            Notice::PlotNotPossible => "Plot is not possible!".to_string(),
        }
    }
}

/// What survives a save/restore cycle of the hosting UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Only present for plots opened with an explicit input.
    pub input: Option<PlotInput>,
    pub viewport: Option<Viewport>,
}

pub struct PlotSession<C: ChartSink> {
    settings: PlotSettings,
    input: PreparedInput,
    viewport: Option<Viewport>,
    saved_viewport: Option<Viewport>,
    bootstrap_pending: bool,
    has_imaginary_ever_shown: bool,
    notice: Option<Notice>,
    last_event: EventId,
    display_rx: Option<Receiver<DisplayEvent>>,
    scheduler: DebounceScheduler<SamplingJob>,
    results: Receiver<Completed<PassOutcome>>,
    chart: C,
}

impl<C: ChartSink> PlotSession<C> {
    pub fn new(chart: C, settings: PlotSettings) -> Result<Self, PlotError> {
        Self::with_waker(chart, settings, || {})
    }

    /// `waker` is called from the worker whenever a result is ready, so the
    /// owning event loop knows to call [`poll`](Self::poll).
    pub fn with_waker<W>(chart: C, settings: PlotSettings, waker: W) -> Result<Self, PlotError>
    where
        W: Fn() + Send + Sync + 'static,
    {
        let (scheduler, results) = DebounceScheduler::spawn_with_waker(SamplingJob::run, waker)?;
        Ok(Self {
            settings: settings.validated(),
            input: PreparedInput::error(false),
            viewport: None,
            saved_viewport: None,
            bootstrap_pending: false,
            has_imaginary_ever_shown: false,
            notice: None,
            last_event: EventId::FIRST,
            display_rx: None,
            scheduler,
            results,
            chart,
        })
    }

    /// Plot an explicitly given expression. The session stops following
    /// the display feed. A rejected input leaves the session in the error
    /// state with a notice, and the parse error is returned.
    pub fn set_input(&mut self, input: PlotInput) -> Result<(), PlotError> {
        let prepared = self.prepare_explicit(input);
        self.show(None);
        prepared
    }

    fn prepare_explicit(&mut self, input: PlotInput) -> Result<(), PlotError> {
        let result = match PreparedInput::prepare(input, true) {
            Ok(prepared) => {
                tracing::info!(
                    "Plotting '{}' over {}",
                    prepared.expression().map(|e| e.source()).unwrap_or_default(),
                    prepared.variable().map(Variable::name).unwrap_or_default()
                );
                self.input = prepared;
                self.notice = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Cannot plot input: {e}");
                self.input = PreparedInput::error(true);
                self.notice = Some(Notice::ParseFailed(e.to_string()));
                Err(e.into())
            }
        };
        self.reset_dataset();
        result
    }

    /// Follow the calculator display: subscribe to `hub` and plot whatever
    /// it currently shows. Drops an explicit input if one was set.
    pub fn follow_display(&mut self, hub: &DisplayHub) {
        self.display_rx = Some(hub.subscribe());
        if self.input.is_from_explicit_args() {
            tracing::info!("Switching from explicit input to the display");
            self.input = PreparedInput::error(false);
            self.notice = None;
            self.reset_dataset();
        }
        self.last_event = EventId::FIRST;
        match hub.latest() {
            Some(event) => {
                self.handle_display_event(event);
            }
            None => {
                let saved = self.saved_viewport.take();
                self.show(saved);
            }
        }
    }

    /// Restore a previously saved snapshot.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        self.saved_viewport = snapshot.viewport.filter(Viewport::is_valid);
        if let Some(input) = snapshot.input {
            if self.prepare_explicit(input).is_err() {
                tracing::debug!("Restored input is not plottable");
            }
            let saved = self.saved_viewport.take();
            self.show(saved);
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            input: if self.input.is_from_explicit_args() {
                self.input.input().cloned()
            } else {
                None
            },
            viewport: self.viewport,
        }
    }

    /// Apply a display change. Events not strictly newer than the last one
    /// seen are dropped, as is everything while an explicit input is shown.
    pub fn handle_display_event(&mut self, event: DisplayEvent) -> bool {
        if self.input.is_from_explicit_args() {
            tracing::trace!("Ignoring display event, plotting explicit input");
            return false;
        }
        if !event.id.is_after(&self.last_event) {
            tracing::debug!("Ignoring out-of-order display event {:?}", event.id);
            return false;
        }
        self.last_event = event.id;
        self.input = PreparedInput::from_display(&event.state);
        self.notice = None;
        self.reset_dataset();
        let saved = self.saved_viewport.take();
        self.show(saved);
        true
    }

    /// Set up the first draw for the current input: a saved viewport is
    /// used as is, otherwise the bounds come from a pass over the default
    /// range.
    fn show(&mut self, saved: Option<Viewport>) {
        if self.input.is_error() {
            self.scheduler.cancel();
            if self.notice.is_none() {
                self.notice = Some(Notice::PlotNotPossible);
            }
            self.chart.redraw();
            return;
        }
        let delay = self.settings.initial_delay();
        match saved {
            Some(viewport) => {
                self.viewport = Some(viewport);
                self.bootstrap_pending = false;
                self.chart.update_axis_bounds(&viewport);
                self.schedule(viewport.x_min, viewport.x_max, delay);
            }
            None => {
                self.viewport = None;
                self.bootstrap_pending = true;
                self.schedule(self.settings.default_min, self.settings.default_max, delay);
            }
        }
    }

    /// Request a pass for `viewport` after `delay`. Does nothing while the
    /// input is in error; an invalid viewport is rejected and the previous
    /// one kept.
    pub fn recompute(
        &mut self,
        viewport: Viewport,
        delay: Duration,
    ) -> Result<Option<Token>, PlotError> {
        if self.input.is_error() {
            return Ok(None);
        }
        viewport.validate()?;
        self.viewport = Some(viewport);
        self.bootstrap_pending = false;
        Ok(self.schedule(viewport.x_min, viewport.x_max, delay))
    }

    /// Pan/zoom driven recompute, debounced by the configured delay.
    pub fn on_viewport_changed(&mut self, viewport: Viewport) -> Result<Option<Token>, PlotError> {
        let delay = self.settings.viewport_delay();
        self.recompute(viewport, delay)
    }

    /// Return to the default range.
    pub fn reset_zoom(&mut self) -> Result<Option<Token>, PlotError> {
        let viewport = Viewport::square(self.settings.default_min, self.settings.default_max);
        self.chart.update_axis_bounds(&viewport);
        self.on_viewport_changed(viewport)
    }

    fn schedule(&mut self, x_min: f64, x_max: f64, delay: Duration) -> Option<Token> {
        let (expression, variable) = match self.input.plottable() {
            Ok((expression, variable)) => (Arc::clone(expression), variable.clone()),
            Err(e) => {
                tracing::debug!("Nothing to sample: {e}");
                return None;
            }
        };
        let job = SamplingJob {
            expression,
            variable,
            x_min,
            x_max,
            steps: self.settings.steps,
            want_imaginary: self.has_imaginary_ever_shown,
        };
        Some(self.scheduler.request(job, delay))
    }

    /// Drain display events and finished passes. Returns true if anything
    /// visible changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;

        let events: Vec<DisplayEvent> = self
            .display_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();
        for event in events {
            changed |= self.handle_display_event(event);
        }

        while let Ok(done) = self.results.try_recv() {
            if !self.scheduler.is_current(done.token) {
                tracing::debug!("Dropping superseded result {}", done.token.generation());
                continue;
            }
            match done.output {
                Ok(sampled) => self.on_series_ready(sampled),
                Err(e) => self.on_pass_failed(e),
            }
            changed = true;
        }

        changed
    }

    fn on_series_ready(&mut self, sampled: SampledSeries) {
        if self.bootstrap_pending {
            let imaginary = sampled.has_imaginary.then_some(&sampled.imaginary);
            let bounds = DataBounds::of(iter::once(&sampled.real).chain(imaginary));
            let viewport =
                initial_viewport(bounds, self.settings.default_min, self.settings.default_max);
            tracing::debug!("Initial viewport {:?}", viewport);
            self.viewport = Some(viewport);
            self.bootstrap_pending = false;
            self.chart.update_axis_bounds(&viewport);
        }

        if sampled.has_imaginary && !self.has_imaginary_ever_shown {
            tracing::info!("Result has an imaginary part, showing it");
            self.has_imaginary_ever_shown = true;
        }
        let imaginary = self.has_imaginary_ever_shown.then_some(sampled.imaginary);
        self.chart.replace_series(sampled.real, imaginary);

        if self.notice == Some(Notice::PlotNotPossible) {
            self.notice = None;
        }
        self.chart.redraw();
    }

    fn on_pass_failed(&mut self, error: PlotError) {
        tracing::warn!("Sampling pass failed: {error}");
        if self.bootstrap_pending {
            let viewport = Viewport::square(self.settings.default_min, self.settings.default_max);
            self.viewport = Some(viewport);
            self.bootstrap_pending = false;
            self.chart.update_axis_bounds(&viewport);
        }
        let imaginary = self.has_imaginary_ever_shown.then(Series::default);
        self.chart.replace_series(Series::default(), imaginary);
        self.notice = Some(Notice::PlotNotPossible);
        self.chart.redraw();
    }

    fn reset_dataset(&mut self) {
        self.has_imaginary_ever_shown = false;
        self.chart.replace_series(Series::default(), None);
    }

    /// Apply new preferences. A changed step count triggers an immediate
    /// recompute of the current viewport.
    pub fn update_settings(&mut self, settings: PlotSettings) {
        let settings = settings.validated();
        let resample = settings.steps != self.settings.steps;
        self.settings = settings;
        if resample {
            if let Some(viewport) = self.viewport {
                if let Err(e) = self.recompute(viewport, Duration::ZERO) {
                    tracing::warn!("Cannot resample after settings change: {e}");
                }
            }
        }
        self.chart.redraw();
    }

    pub fn settings(&self) -> &PlotSettings {
        &self.settings
    }

    pub fn input(&self) -> &PreparedInput {
        &self.input
    }

    pub fn is_error(&self) -> bool {
        self.input.is_error()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn has_imaginary_ever_shown(&self) -> bool {
        self.has_imaginary_ever_shown
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn current_token(&self) -> Option<Token> {
        self.scheduler.current()
    }

    pub fn chart(&self) -> &C {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut C {
        &mut self.chart
    }
}
