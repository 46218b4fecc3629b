//! Playback session controller
//!
//! Owns the sample stream, reconciliation state, drawing surface and the
//! frame-request schedule for one video. Host events are processed one at a
//! time on the caller's task.

use std::time::Duration;

use contracts::{
    ContractError, DrawingSurface, FrameRequestId, HostEvent, LocalSampleFetcher, OverlayConfig,
    PlaybackStart, ResolvedSample, VideoHost,
};
use renderer::{OverlayRenderer, RasterSurface, RenderSummary, StatusSinks};
use sync_engine::{FrameOutcome, PresentedFrame, ReconciliationState, Reconciler, SampleStream};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

use crate::error::{Result, SessionError};
use crate::state::SessionState;

/// Text callback (`on_log`, `on_msg`)
pub type TextCallback = Box<dyn FnMut(&str)>;

pub const CLICK_TO_PLAY: &str = "click to play";

/// What to load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadRequest {
    /// Opaque video source handed to the host
    pub video_source: String,
    /// Sample stream reference handed to the fetcher
    pub sample_source: Option<String>,
    /// Label used in logs
    pub display_name: Option<String>,
}

impl LoadRequest {
    pub fn new(video_source: impl Into<String>) -> Self {
        Self {
            video_source: video_source.into(),
            ..Default::default()
        }
    }

    pub fn with_samples(mut self, sample_source: impl Into<String>) -> Self {
        self.sample_source = Some(sample_source.into());
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }
}

/// Outcome of a successful `load`
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    pub samples: usize,
    pub normalized: bool,
    pub nominal_interval_ms: f64,
    /// Surface size, `None` when the host reported no dimensions
    pub surface_size: Option<(u32, u32)>,
    /// Autoplay result, `None` when autoplay is disabled
    pub playback: Option<PlaybackStart>,
}

/// Playback session controller
pub struct PlaybackSession<H: VideoHost, F: LocalSampleFetcher> {
    host: H,
    events: mpsc::UnboundedReceiver<HostEvent>,
    fetcher: F,
    config: OverlayConfig,
    reconciler: Reconciler,
    renderer: OverlayRenderer,
    stream: SampleStream,
    reconciliation: ReconciliationState,
    surface: Option<RasterSurface>,
    status: StatusSinks,
    on_log: Option<TextCallback>,
    on_msg: Option<TextCallback>,
    state: SessionState,
    /// State to return to once a seek completes
    resume_after_seek: SessionState,
    /// At most one outstanding frame request
    pending_request: Option<FrameRequestId>,
    /// Next presented frame follows a discontinuity
    pending_discontinuity: bool,
    last_resolved: Option<ResolvedSample>,
    last_render: Option<RenderSummary>,
    display_name: String,
}

impl<H: VideoHost, F: LocalSampleFetcher> PlaybackSession<H, F> {
    pub fn new(
        host: H,
        events: mpsc::UnboundedReceiver<HostEvent>,
        fetcher: F,
        config: OverlayConfig,
    ) -> Self {
        let reconciler = Reconciler::new(&config.reconciler);
        let renderer = OverlayRenderer::new(config.topology.clone(), config.style.clone());
        let stream = SampleStream::empty(&config.timing);
        let reconciliation = ReconciliationState::new(config.reconciler.base_shift_ms);
        Self {
            host,
            events,
            fetcher,
            config,
            reconciler,
            renderer,
            stream,
            reconciliation,
            surface: None,
            status: StatusSinks::default(),
            on_log: None,
            on_msg: None,
            state: SessionState::Idle,
            resume_after_seek: SessionState::Paused,
            pending_request: None,
            pending_discontinuity: false,
            last_resolved: None,
            last_render: None,
            display_name: String::new(),
        }
    }

    pub fn with_status(mut self, status: StatusSinks) -> Self {
        self.status = status;
        self
    }

    pub fn with_on_log(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_log = Some(Box::new(callback));
        self
    }

    pub fn with_on_msg(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_msg = Some(Box::new(callback));
        self
    }

    // ===== Accessors =====

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn stream(&self) -> &SampleStream {
        &self.stream
    }

    pub fn reconciliation(&self) -> &ReconciliationState {
        &self.reconciliation
    }

    pub fn surface(&self) -> Option<&RasterSurface> {
        self.surface.as_ref()
    }

    pub fn pending_request(&self) -> Option<FrameRequestId> {
        self.pending_request
    }

    pub fn last_resolved(&self) -> Option<&ResolvedSample> {
        self.last_resolved.as_ref()
    }

    pub fn last_render(&self) -> Option<RenderSummary> {
        self.last_render
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    // ===== Public operations =====

    /// Load a video and its sample stream
    ///
    /// Sample stream problems never fail the load; they leave an empty stream
    /// and an advisory message.
    ///
    /// # Errors
    /// - `MissingSource` for a blank video source
    /// - `ReadinessTimeout` when metadata or the first frame never arrive
    /// - `Host` when the host refuses the source or playback
    /// - `Destroyed` after `destroy`
    #[instrument(
        name = "session_load",
        skip(self, request),
        fields(video = %request.video_source, samples = ?request.sample_source)
    )]
    pub async fn load(&mut self, request: LoadRequest) -> Result<LoadSummary> {
        self.ensure_alive()?;
        let video_source = request.video_source.trim();
        if video_source.is_empty() {
            return Err(SessionError::MissingSource);
        }
        self.display_name = request
            .display_name
            .clone()
            .unwrap_or_else(|| video_source.to_string());

        self.reset_for_load();

        // 1. Sample stream, to completion, before the host is touched
        self.stream = match request.sample_source.as_deref() {
            Some(source) => self.ingest_samples(source).await,
            None => {
                debug!("no sample source supplied");
                SampleStream::empty(&self.config.timing)
            }
        };
        observability::record_samples_loaded(self.stream.len());

        // 2. Attach and wait for intrinsic dimensions
        self.host.attach(video_source).map_err(SessionError::Host)?;
        let metadata_timeout = self.config.readiness.metadata_timeout_ms;
        let (width, height) = self
            .wait_for("metadata", metadata_timeout, |event| match event {
                HostEvent::MetadataLoaded { width, height } => Some((*width, *height)),
                _ => None,
            })
            .await?;
        if width == 0 || height == 0 {
            self.advise("video dimensions unavailable; overlay disabled");
        } else {
            self.surface = Some(RasterSurface::new(width, height));
        }

        // 3. First decodable frame
        let first_frame_timeout = self.config.readiness.first_frame_timeout_ms;
        self.wait_for("first_frame", first_frame_timeout, |event| {
            matches!(event, HostEvent::FirstFrameReady).then_some(())
        })
        .await?;

        self.transition(SessionState::Loaded);
        self.render(PresentedFrame::new(0.0, true, None));

        // 4. Autoplay
        let playback = if self.config.readiness.autoplay {
            Some(self.start()?)
        } else {
            None
        };

        let summary = LoadSummary {
            samples: self.stream.len(),
            normalized: self.stream.is_normalized(),
            nominal_interval_ms: self.stream.index().nominal_interval_ms(),
            surface_size: self.surface.as_ref().map(|surface| surface.size()),
            playback,
        };
        info!(
            name = %self.display_name,
            samples = summary.samples,
            normalized = summary.normalized,
            nominal_interval_ms = summary.nominal_interval_ms,
            "Session loaded"
        );
        let note = format!("loaded '{}' with {} samples", self.display_name, summary.samples);
        self.log(&note);
        Ok(summary)
    }

    /// Start or resume playback
    pub fn play(&mut self) -> Result<PlaybackStart> {
        self.ensure_alive()?;
        self.start()
    }

    /// Pause playback and draw the paused frame
    pub fn pause(&mut self) -> Result<()> {
        self.ensure_alive()?;
        self.host.pause_playback();
        self.enter_paused();
        Ok(())
    }

    /// Replace the base shift; the learned correction is discarded
    pub fn set_base_shift(&mut self, base_shift_ms: f64) -> Result<()> {
        self.ensure_alive()?;
        self.reconciliation.re_anchor(base_shift_ms);
        debug!(base_shift_ms, "base shift re-anchored");
        Ok(())
    }

    /// Tear down; idempotent
    pub fn destroy(&mut self) {
        if self.state == SessionState::Destroyed {
            return;
        }
        self.cancel_pending();
        self.host.detach();
        self.stream = SampleStream::empty(&self.config.timing);
        self.surface = None;
        self.last_resolved = None;
        self.events.close();
        self.transition(SessionState::Destroyed);
        info!(name = %self.display_name, "Session destroyed");
    }

    // ===== Host wiring =====

    /// Handle one host event
    pub fn dispatch(&mut self, event: HostEvent) -> Result<()> {
        self.ensure_alive()?;
        trace!(?event, state = %self.state, "host event");
        match event {
            HostEvent::FramePresented {
                request,
                media_time_ms,
                presented_frames,
            } => self.on_frame_presented(request, media_time_ms, presented_frames),
            HostEvent::Playing => self.enter_tracking(),
            HostEvent::Paused => self.enter_paused(),
            HostEvent::Seeking => self.begin_seek(),
            HostEvent::Seeked { media_time_ms } => self.finish_seek(media_time_ms),
            HostEvent::Ended => self.on_ended(),
            HostEvent::MetadataLoaded { width, height } => {
                if self.surface.is_none() && width > 0 && height > 0 && self.state.is_ready() {
                    self.surface = Some(RasterSurface::new(width, height));
                }
            }
            HostEvent::FirstFrameReady => {}
        }
        Ok(())
    }

    /// Process every queued event without waiting
    pub fn pump(&mut self) -> Result<usize> {
        self.ensure_alive()?;
        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            self.dispatch(event)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Event loop: runs until the host closes its event channel
    pub async fn drive(&mut self) -> Result<()> {
        while let Some(event) = self.events.recv().await {
            self.dispatch(event)?;
        }
        debug!("host event channel closed");
        Ok(())
    }

    // ===== Internals =====

    fn ensure_alive(&self) -> Result<()> {
        if self.state == SessionState::Destroyed {
            Err(SessionError::Destroyed)
        } else {
            Ok(())
        }
    }

    fn reset_for_load(&mut self) {
        self.cancel_pending();
        if self.state.is_ready() {
            self.host.detach();
        }
        // events from a previous source must not satisfy the new readiness waits
        while self.events.try_recv().is_ok() {}
        self.reconciliation.reset();
        self.pending_discontinuity = false;
        self.surface = None;
        self.last_resolved = None;
        self.last_render = None;
        self.stream = SampleStream::empty(&self.config.timing);
        self.transition(SessionState::Idle);
    }

    async fn ingest_samples(&mut self, source: &str) -> SampleStream {
        let result = match self.fetcher.fetch(source).await {
            Ok(text) => {
                ingestion::ingest(&text, &self.config.ingestion).map_err(ContractError::from)
            }
            Err(e) => Err(e),
        };
        match result {
            Ok(ingested) => SampleStream::new(
                ingested.samples,
                ingested.coordinate_space,
                &self.config.timing,
            ),
            Err(e) => {
                warn!(source, error = %e, "sample stream unavailable, continuing without overlay");
                self.advise(&format!("keypoint data unavailable: {e}"));
                SampleStream::empty(&self.config.timing)
            }
        }
    }

    async fn wait_for<T>(
        &mut self,
        signal: &'static str,
        timeout_ms: u64,
        mut select: impl FnMut(&HostEvent) -> Option<T>,
    ) -> Result<T> {
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            match tokio::time::timeout_at(deadline, self.events.recv()).await {
                Ok(Some(event)) => {
                    if let Some(value) = select(&event) {
                        return Ok(value);
                    }
                    trace!(?event, signal, "event ignored while waiting");
                }
                Ok(None) => {
                    return Err(SessionError::Host(ContractError::host(
                        "host event channel closed",
                    )))
                }
                Err(_) => {
                    warn!(signal, timeout_ms, "readiness signal not received");
                    return Err(SessionError::readiness_timeout(signal, timeout_ms));
                }
            }
        }
    }

    fn start(&mut self) -> Result<PlaybackStart> {
        if self.state == SessionState::Ended {
            self.reconciliation.seek_reset();
            self.pending_discontinuity = true;
        }
        let outcome = self.host.start_playback().map_err(SessionError::Host)?;
        match outcome {
            PlaybackStart::Started => self.enter_tracking(),
            PlaybackStart::Blocked => self.advise(CLICK_TO_PLAY),
        }
        Ok(outcome)
    }

    fn enter_tracking(&mut self) {
        match self.state {
            SessionState::Loaded | SessionState::Paused | SessionState::Ended => {
                self.transition(SessionState::Tracking);
                self.schedule_next();
            }
            SessionState::Seeking => self.resume_after_seek = SessionState::Tracking,
            SessionState::Tracking | SessionState::Idle | SessionState::Destroyed => {}
        }
    }

    fn enter_paused(&mut self) {
        match self.state {
            SessionState::Tracking | SessionState::Loaded => {
                self.cancel_pending();
                self.transition(SessionState::Paused);
                let media_time_ms = self.host.media_time_ms();
                self.render(PresentedFrame::new(media_time_ms, true, None));
            }
            SessionState::Seeking => self.resume_after_seek = SessionState::Paused,
            _ => {}
        }
    }

    fn begin_seek(&mut self) {
        if !self.state.is_ready() || self.state == SessionState::Seeking {
            return;
        }
        self.cancel_pending();
        self.resume_after_seek = self.state.after_seek();
        self.reconciliation.seek_reset();
        self.transition(SessionState::Seeking);
    }

    fn finish_seek(&mut self, media_time_ms: f64) {
        if !self.state.is_ready() {
            return;
        }
        if self.state != SessionState::Seeking {
            // seek completed without a Seeking notification
            self.begin_seek();
        }
        self.reconciliation.seek_reset();
        self.pending_discontinuity = false;
        self.render(PresentedFrame::new(media_time_ms, true, None));
        let next = self.resume_after_seek;
        self.transition(next);
        if next == SessionState::Tracking {
            self.schedule_next();
        }
    }

    fn on_ended(&mut self) {
        if !self.state.is_ready() {
            return;
        }
        self.cancel_pending();
        self.transition(SessionState::Ended);
    }

    fn on_frame_presented(
        &mut self,
        request: FrameRequestId,
        media_time_ms: f64,
        presented_frames: Option<u64>,
    ) {
        if self.pending_request != Some(request) {
            trace!(request, pending = ?self.pending_request, "stale frame callback ignored");
            return;
        }
        self.pending_request = None;
        if self.state != SessionState::Tracking {
            return;
        }
        let discontinuous = std::mem::take(&mut self.pending_discontinuity);
        self.render(PresentedFrame::new(media_time_ms, discontinuous, presented_frames));
        self.schedule_next();
    }

    fn schedule_next(&mut self) {
        if self.state == SessionState::Tracking && self.pending_request.is_none() {
            self.pending_request = Some(self.host.request_frame());
        }
    }

    fn cancel_pending(&mut self) {
        if let Some(request) = self.pending_request.take() {
            self.host.cancel_frame(request);
        }
    }

    fn render(&mut self, frame: PresentedFrame) {
        let outcome = self
            .reconciler
            .on_presented_frame(&mut self.reconciliation, &self.stream, frame);
        let resolved = match outcome {
            FrameOutcome::Duplicate => return,
            FrameOutcome::NoOverlay => None,
            FrameOutcome::Resolved(resolved) => {
                observability::record_reconcile_metrics(&resolved.meta);
                Some(resolved)
            }
        };

        if let Some(surface) = self.surface.as_mut() {
            let summary = self.renderer.render(
                surface,
                self.host.current_frame(),
                resolved.as_ref(),
                self.stream.is_normalized(),
                &mut self.status,
            );
            self.last_render = Some(summary);
        }
        self.last_resolved = resolved;
    }

    fn transition(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        debug!(from = %self.state, to = %next, "session state");
        let note = format!("{} -> {}", self.state, next);
        self.state = next;
        self.log(&note);
    }

    fn log(&mut self, text: &str) {
        if let Some(callback) = self.on_log.as_mut() {
            callback(text);
        }
    }

    fn advise(&mut self, text: &str) {
        info!(advisory = text, "Advisory message");
        if let Some(callback) = self.on_msg.as_mut() {
            callback(text);
        }
    }
}
