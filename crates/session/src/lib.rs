//! # Session
//!
//! Playback session controller: ties one video host, one sample stream and one
//! drawing surface together.
//!
//! Responsibilities:
//! - `load` / `play` / `pause` / `destroy` / `set_base_shift`
//! - Bounded readiness waits on host signals
//! - Single-outstanding frame request scheduling
//! - Reconcile and render on every presented frame
//!
//! ## Usage Example
//!
//! ```ignore
//! use session::{LoadRequest, MockVideoHost, PlaybackSession};
//! use ingestion::FileSampleFetcher;
//!
//! let (host, events) = MockVideoHost::with_defaults();
//! let mut session = PlaybackSession::new(host, events, FileSampleFetcher, config)
//!     .with_on_msg(|text| eprintln!("{text}"));
//! session.load(LoadRequest::new("rowing.mp4").with_samples("rowing.csv")).await?;
//! session.drive().await?;
//! ```

mod controller;
mod error;
mod mock_host;
mod state;

pub use controller::{LoadRequest, LoadSummary, PlaybackSession, TextCallback, CLICK_TO_PLAY};
pub use error::{Result, SessionError};
pub use mock_host::{MockCall, MockHostConfig, MockVideoHost};
pub use state::SessionState;
