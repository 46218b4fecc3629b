//! Replay driver - runs one playback session against `MockVideoHost`.
//!
//! The simulated video clock advances by `1000 / fps` ms per presented
//! frame, scaled by the configured drift, so the reconciler has a real
//! clock offset to converge on.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{OverlayConfig, PlaybackStart};
use ingestion::FileSampleFetcher;
use session::{LoadRequest, MockHostConfig, MockVideoHost, PlaybackSession};
use tracing::{debug, info, instrument};

use super::ReplayStats;

/// What to replay
#[derive(Debug, Clone)]
pub struct ReplayPlan {
    /// Keypoint CSV
    pub samples: PathBuf,
    /// Video frames to present
    pub frames: u64,
    /// Simulated intrinsic size
    pub width: u32,
    pub height: u32,
    /// Simulated frame rate
    pub fps: f64,
    /// Video clock drift (ppm)
    pub drift_ppm: f64,
    /// PNG output directory
    pub output: Option<PathBuf>,
}

impl ReplayPlan {
    /// Media time advanced per presented frame (ms)
    pub fn frame_step_ms(&self) -> f64 {
        1000.0 / self.fps * (1.0 + self.drift_ppm / 1_000_000.0)
    }

    fn check(&self) -> Result<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            anyhow::bail!("--fps must be a positive number, got {}", self.fps);
        }
        if self.width == 0 || self.height == 0 {
            anyhow::bail!(
                "--width and --height must be non-zero, got {}x{}",
                self.width,
                self.height
            );
        }
        if !self.drift_ppm.is_finite() || self.drift_ppm <= -1_000_000.0 {
            anyhow::bail!("--drift-ppm must be greater than -1000000");
        }
        Ok(())
    }
}

/// Replay driver
pub struct ReplayDriver {
    plan: ReplayPlan,
    config: OverlayConfig,
}

impl ReplayDriver {
    pub fn new(plan: ReplayPlan, config: OverlayConfig) -> Self {
        Self { plan, config }
    }

    /// Run the replay to completion
    #[instrument(name = "replay_run", skip(self), fields(frames = self.plan.frames, fps = self.plan.fps))]
    pub async fn run(self) -> Result<ReplayStats> {
        self.plan.check()?;
        let start_time = Instant::now();
        let plan = &self.plan;

        if let Some(dir) = plan.output.as_deref() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        }

        let (host, events) = MockVideoHost::new(MockHostConfig {
            width: plan.width,
            height: plan.height,
            ..Default::default()
        });

        let advisories = Rc::new(RefCell::new(Vec::new()));
        let sink = advisories.clone();
        let mut session = PlaybackSession::new(host, events, FileSampleFetcher, self.config)
            .with_on_msg(move |text| sink.borrow_mut().push(text.to_string()))
            .with_on_log(|text| debug!(session = text, "session log"));

        let video_source = format!("replay://{}x{}@{}", plan.width, plan.height, plan.fps);
        let request = LoadRequest::new(video_source)
            .with_samples(plan.samples.display().to_string())
            .with_display_name(plan.samples.display().to_string());
        let loaded = session.load(request).await.context("Failed to load replay session")?;

        if loaded.playback != Some(PlaybackStart::Started) {
            session.play().context("Failed to start playback")?;
        }
        session.pump()?;

        let mut stats = ReplayStats {
            samples: loaded.samples,
            normalized: loaded.normalized,
            nominal_interval_ms: loaded.nominal_interval_ms,
            frame_step_ms: plan.frame_step_ms(),
            ..Default::default()
        };

        info!(
            samples = loaded.samples,
            frame_step_ms = stats.frame_step_ms,
            "Replay started"
        );

        for frame in 0..plan.frames {
            let answered = session.host_mut().present(stats.frame_step_ms);
            session.pump()?;
            stats.frames_presented += 1;
            if answered == 0 {
                continue;
            }

            match session.last_resolved() {
                Some(resolved) => {
                    stats.frames_resolved += 1;
                    stats.reconcile.update(&resolved.meta);
                }
                None => stats.frames_without_overlay += 1,
            }

            if let (Some(dir), Some(surface)) = (plan.output.as_deref(), session.surface()) {
                surface.save_png(frame_path(dir, frame))?;
                stats.frames_written += 1;
            }
        }

        stats.final_dynamic_shift_ms = session.reconciliation().dynamic_shift_ms;
        session.host_mut().end();
        session.pump()?;
        session.destroy();

        stats.advisories = advisories.borrow().clone();
        stats.duration = start_time.elapsed();
        info!(
            frames = stats.frames_presented,
            resolved = stats.frames_resolved,
            "Replay finished"
        );
        Ok(stats)
    }
}

fn frame_path(dir: &Path, frame: u64) -> PathBuf {
    dir.join(format!("frame_{frame:05}.png"))
}
