//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约与配置测试
//! - 样本摄取与时间模型性质
//! - Reconciler 有界性质
//! - 模拟 e2e 测试（MockVideoHost + 内存样本）

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ContractError, OverlayConfig};

    #[test]
    fn test_default_config_validates() {
        assert!(ConfigLoader::validate(&OverlayConfig::default()).is_ok());
    }

    #[test]
    fn test_config_defaults_match_reconciler_constants() {
        let config = ConfigLoader::load_from_str("", ConfigFormat::Toml).unwrap();
        assert_eq!(config.reconciler.big_jump_gain, 0.95);
        assert_eq!(config.reconciler.tracking_gain, 0.20);
        assert_eq!(config.reconciler.jump_threshold_floor_ms, 45.0);
        assert_eq!(config.reconciler.jump_threshold_factor, 1.4);
        assert_eq!(config.reconciler.max_dynamic_shift_ms, 500.0);
        assert_eq!(config.timing.default_interval_ms, 33.3);
    }

    #[test]
    fn test_ingestion_error_maps_to_contract_error() {
        let err = ingestion::ingest("a,b\n1,2\n", &Default::default()).unwrap_err();
        let err = ContractError::from(err);
        assert!(matches!(err, ContractError::MalformedInput { .. }));
    }
}

#[cfg(test)]
mod ingestion_tests {
    use contracts::{CoordinateSpace, IngestionConfig, TimingConfig};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use sync_engine::{SampleStream, TimingIndex};

    fn stream_csv(samples: usize) -> String {
        let mut text = String::from("Frame,Keypoint,X,Y,Timestamp\n");
        for i in 0..samples {
            let t = i * 40 + (i % 3);
            for (name, x, y) in [("hip", 0.40, 0.50), ("knee", 0.45, 0.70), ("ankle", 0.50, 0.90)] {
                text.push_str(&format!("{i},{name},{x},{y},{t}\n"));
            }
        }
        text
    }

    #[test]
    fn test_ingestion_sorted_and_shuffle_invariant() {
        let text = stream_csv(50);
        let config = IngestionConfig::default();
        let baseline = ingestion::ingest(&text, &config).unwrap();

        let mut lines: Vec<&str> = text.lines().collect();
        let header = lines.remove(0);
        let mut rng = StdRng::seed_from_u64(42);
        lines.shuffle(&mut rng);
        let shuffled = format!("{header}\n{}\n", lines.join("\n"));
        let reordered = ingestion::ingest(&shuffled, &config).unwrap();

        assert_eq!(baseline.samples, reordered.samples);
        assert_eq!(baseline.coordinate_space, reordered.coordinate_space);
        assert!(baseline
            .samples
            .windows(2)
            .all(|pair| pair[0].timestamp_ms <= pair[1].timestamp_ms));

        // re-ingesting the same text is idempotent
        assert_eq!(ingestion::ingest(&text, &config).unwrap(), baseline);
    }

    #[test]
    fn test_stream_without_timestamps() {
        let text = "frame,keypoint,x,y\n0,hip,0.5,0.5\n0,knee,0.5,0.7\n1,hip,0.5,0.5\n1,knee,0.5,0.7\n";
        let ingested = ingestion::ingest(text, &IngestionConfig::default()).unwrap();
        assert_eq!(ingested.coordinate_space, CoordinateSpace::Normalized);
        assert_eq!(ingested.samples.len(), 2);
        assert_eq!(ingested.samples[0].timestamp_ms, 0.0);
        assert_eq!(ingested.samples[1].timestamp_ms, 33.0);
        assert!(ingested.samples.iter().all(|s| s.keypoints.len() == 2));
    }

    #[test]
    fn test_coordinate_vote() {
        let config = IngestionConfig::default();
        let tie = "frame,keypoint,x,y\n0,hip,0.5,0.5\n0,knee,640,360\n";
        assert_eq!(
            ingestion::ingest(tie, &config).unwrap().coordinate_space,
            CoordinateSpace::Pixel
        );
        let majority = "frame,keypoint,x,y\n0,hip,0.5,0.5\n0,knee,640,360\n0,ankle,700,420\n";
        assert_eq!(
            ingestion::ingest(majority, &config).unwrap().coordinate_space,
            CoordinateSpace::Pixel
        );
        let all_unit = "frame,keypoint,x,y\n0,hip,0,1\n0,knee,1,0\n";
        assert_eq!(
            ingestion::ingest(all_unit, &config).unwrap().coordinate_space,
            CoordinateSpace::Normalized
        );
    }

    #[test]
    fn test_nominal_interval_from_ingested_stream() {
        let mut text = String::from("frame,keypoint,x,y,ms\n");
        for (i, t) in [0, 33, 66, 100, 200].iter().enumerate() {
            text.push_str(&format!("{i},hip,10,20,{t}\n"));
        }
        let ingested = ingestion::ingest(&text, &IngestionConfig::default()).unwrap();
        let index = TimingIndex::build(&ingested.samples, &TimingConfig::default());
        assert_eq!(index.nominal_interval_ms(), 34.0);
    }

    #[test]
    fn test_nearest_clamps_and_tie_prefers_earlier() {
        let text = "frame,keypoint,x,y,ms\n0,hip,1,1,100\n1,hip,1,1,200\n2,hip,1,1,300\n";
        let ingested = ingestion::ingest(text, &IngestionConfig::default()).unwrap();
        let stream = SampleStream::new(
            ingested.samples,
            ingested.coordinate_space,
            &TimingConfig::default(),
        );
        assert_eq!(stream.index().nearest(-1000.0), Some(0));
        assert_eq!(stream.index().nearest(10_000.0), Some(2));
        assert_eq!(stream.index().nearest(150.0), Some(0));
        assert_eq!(stream.index().nearest(251.0), Some(2));
    }
}

#[cfg(test)]
mod reconcile_tests {
    use contracts::{CoordinateSpace, FrameSample, Point, ReconcilerConfig, TimingConfig};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use sync_engine::{PresentedFrame, ReconciliationState, Reconciler, SampleStream};

    fn jittered_stream(rng: &mut StdRng, count: usize) -> SampleStream {
        let mut t = 0.0;
        let samples = (0..count as i64)
            .map(|i| {
                t += rng.random_range(20.0..60.0);
                let mut sample = FrameSample::new(i, t);
                sample.keypoints.insert("hip".to_string(), Point::new(0.5, 0.5));
                sample
            })
            .collect();
        SampleStream::new(samples, CoordinateSpace::Normalized, &TimingConfig::default())
    }

    #[test]
    fn test_dynamic_shift_bounded_under_random_playback() {
        let mut rng = StdRng::seed_from_u64(7);
        let stream = jittered_stream(&mut rng, 400);
        let reconciler = Reconciler::new(&ReconcilerConfig::default());
        let mut state = ReconciliationState::new(rng.random_range(-300.0..300.0));

        let mut media_time = 0.0;
        for frame_id in 0..2000u64 {
            // mostly steady playback, occasional wild jumps
            if rng.random_bool(0.02) {
                media_time = rng.random_range(-5_000.0..30_000.0);
            } else {
                media_time += rng.random_range(10.0..50.0);
            }
            let discontinuous = rng.random_bool(0.01);
            let frame = PresentedFrame::new(media_time, discontinuous, Some(frame_id));
            reconciler.on_presented_frame(&mut state, &stream, frame);
            assert!(
                state.dynamic_shift_ms.abs() <= 500.0,
                "dynamic shift {} escaped the bound",
                state.dynamic_shift_ms
            );
        }
    }

    #[test]
    fn test_seek_reset_forces_big_jump() {
        let mut rng = StdRng::seed_from_u64(11);
        let stream = jittered_stream(&mut rng, 100);
        let reconciler = Reconciler::new(&ReconcilerConfig::default());
        let mut state = ReconciliationState::new(0.0);

        for (id, t) in (0..20).map(|i| (i as u64, i as f64 * 33.3)) {
            reconciler.on_presented_frame(&mut state, &stream, PresentedFrame::new(t, id == 0, Some(id)));
        }

        state.seek_reset();
        assert_eq!(state.dynamic_shift_ms, 0.0);
        let outcome =
            reconciler.on_presented_frame(&mut state, &stream, PresentedFrame::new(1500.0, true, None));
        let meta = outcome.resolved().unwrap().meta;
        assert!(meta.big_jump);
        assert_eq!(meta.gain, 0.95);
        assert!((state.dynamic_shift_ms - 0.95 * meta.error_ms).abs() < 1e-9);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{SharedText, HostEvent};
    use image::Rgba;
    use ingestion::{FileSampleFetcher, MemorySampleFetcher};
    use renderer::{StatusSinks, NO_DATA};
    use session::{
        LoadRequest, MockCall, MockHostConfig, MockVideoHost, PlaybackSession, SessionError,
        SessionState,
    };

    const CONFIG: &str = r#"
[reconciler]
base_shift_ms = 15.0

[readiness]
metadata_timeout_ms = 100
first_frame_timeout_ms = 100

[style]
reference_keypoints = []
"#;

    /// 3 s of normalized side-view samples at 30 Hz
    fn samples_csv() -> String {
        let mut text = String::from("frame_index,keypoint,x,y,timestamp_ms\n");
        for i in 0..90 {
            let t = (i as f64 * 1000.0 / 30.0).round();
            for (name, x, y) in [("shoulder", 0.5, 0.2), ("hip", 0.5, 0.5), ("knee", 0.6, 0.7)] {
                text.push_str(&format!("{i},{name},{x},{y},{t}\n"));
            }
        }
        text
    }

    type Session = PlaybackSession<MockVideoHost, MemorySampleFetcher>;

    fn build_session(fetcher: MemorySampleFetcher) -> (Session, Rc<RefCell<Vec<String>>>, SharedText) {
        let config = ConfigLoader::load_from_str(CONFIG, ConfigFormat::Toml).unwrap();
        let (host, events) = MockVideoHost::new(MockHostConfig {
            width: 160,
            height: 120,
            ..Default::default()
        });
        let messages = Rc::new(RefCell::new(Vec::new()));
        let sink = messages.clone();
        let frame_info = SharedText::new();
        let session = PlaybackSession::new(host, events, fetcher, config)
            .with_status(StatusSinks::new(Some(Box::new(frame_info.clone())), None))
            .with_on_msg(move |text| sink.borrow_mut().push(text.to_string()));
        (session, messages, frame_info)
    }

    #[tokio::test]
    async fn test_e2e_playback_lifecycle() {
        let fetcher = MemorySampleFetcher::new().with("mem://rower.csv", samples_csv());
        let (mut session, messages, frame_info) = build_session(fetcher);

        let summary = session
            .load(LoadRequest::new("rower.mp4").with_samples("mem://rower.csv"))
            .await
            .unwrap();
        assert_eq!(summary.samples, 90);
        assert!(summary.normalized);
        assert_eq!(summary.surface_size, Some((160, 120)));
        assert_eq!(session.state(), SessionState::Tracking);
        assert!(messages.borrow().is_empty());

        // steady playback
        for _ in 0..45 {
            session.host_mut().present(1000.0 / 30.0);
            session.pump().unwrap();
            assert!(session.reconciliation().dynamic_shift_ms.abs() <= 500.0);
            assert!(session.host().pending_requests().len() <= 1);
        }
        let resolved = session.last_resolved().unwrap();
        assert_eq!(resolved.meta.base_shift_ms, 15.0);
        assert!(frame_info.get().starts_with("sample "));

        // the bone between hip (80, 60) and knee (96, 84) is on the surface
        let surface = session.surface().unwrap();
        assert_eq!(surface.pixel(80, 60), Some(Rgba([0, 255, 0, 255])));

        // pause cancels the outstanding request and renders once
        session.pause().unwrap();
        session.pump().unwrap();
        assert_eq!(session.state(), SessionState::Paused);
        assert!(session.pending_request().is_none());

        // seek while paused: big jump, stays paused
        session.host_mut().seek(2000.0);
        session.pump().unwrap();
        assert_eq!(session.state(), SessionState::Paused);
        let meta = session.last_resolved().unwrap().meta;
        assert!(meta.big_jump);
        assert_eq!(meta.media_time_ms, 2000.0);
        assert_eq!(meta.gain, 0.95);

        // resume and run to the end
        session.play().unwrap();
        session.pump().unwrap();
        assert_eq!(session.state(), SessionState::Tracking);
        session.host_mut().present(1000.0 / 30.0);
        session.pump().unwrap();
        assert!(!session.last_resolved().unwrap().meta.big_jump);

        session.host_mut().end();
        session.pump().unwrap();
        assert_eq!(session.state(), SessionState::Ended);
        assert!(session.pending_request().is_none());

        // destroy is terminal and idempotent
        session.destroy();
        session.destroy();
        assert_eq!(session.state(), SessionState::Destroyed);
        assert!(session.host().calls().contains(&MockCall::Detach));
        assert!(matches!(session.play(), Err(SessionError::Destroyed)));
        assert!(matches!(
            session.dispatch(HostEvent::Playing),
            Err(SessionError::Destroyed)
        ));
    }

    #[tokio::test]
    async fn test_e2e_failed_fetch_still_loads() {
        let (mut session, messages, frame_info) = build_session(MemorySampleFetcher::new());
        let summary = session
            .load(LoadRequest::new("rower.mp4").with_samples("https://example.invalid/kp.csv"))
            .await
            .unwrap();
        assert_eq!(summary.samples, 0);
        assert_eq!(messages.borrow().len(), 1);
        assert!(messages.borrow()[0].contains("keypoint data unavailable"));

        session.host_mut().present(33.0);
        session.pump().unwrap();
        assert!(session.last_resolved().is_none());
        assert_eq!(frame_info.get(), NO_DATA);
    }

    #[tokio::test]
    async fn test_e2e_base_shift_change_rebases() {
        let fetcher = MemorySampleFetcher::new().with("mem://rower.csv", samples_csv());
        let (mut session, _, _) = build_session(fetcher);
        session
            .load(LoadRequest::new("rower.mp4").with_samples("mem://rower.csv"))
            .await
            .unwrap();
        for _ in 0..10 {
            session.host_mut().present(35.0);
            session.pump().unwrap();
        }

        session.set_base_shift(-200.0).unwrap();
        assert_eq!(session.reconciliation().dynamic_shift_ms, 0.0);
        assert_eq!(session.reconciliation().base_shift_ms, -200.0);

        session.host_mut().present(35.0);
        session.pump().unwrap();
        let meta = session.last_resolved().unwrap().meta;
        assert_eq!(meta.base_shift_ms, -200.0);
        assert!((meta.target_ms - (meta.media_time_ms - 200.0)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_e2e_file_backed_config_and_samples() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("overlay.toml");
        let samples_path = dir.path().join("rower.csv");
        std::fs::write(&config_path, CONFIG).unwrap();
        std::fs::write(&samples_path, samples_csv()).unwrap();

        let config = ConfigLoader::load_from_path(&config_path).unwrap();
        let (host, events) = MockVideoHost::new(MockHostConfig {
            width: 160,
            height: 120,
            ..Default::default()
        });
        let mut session = PlaybackSession::new(host, events, FileSampleFetcher, config);
        let source = format!("file://{}", samples_path.display());
        let summary = session
            .load(LoadRequest::new("rower.mp4").with_samples(source))
            .await
            .unwrap();
        assert_eq!(summary.samples, 90);
        assert!((summary.nominal_interval_ms - 33.0).abs() <= 1.0);

        session.host_mut().present(1000.0 / 30.0);
        session.pump().unwrap();
        let meta = session.last_resolved().unwrap().meta;
        assert_eq!(meta.base_shift_ms, 15.0);

        // a missing file degrades to an empty stream
        std::fs::remove_file(&samples_path).unwrap();
        let (host, events) = MockVideoHost::with_defaults();
        let config = ConfigLoader::load_from_path(&config_path).unwrap();
        let mut session = PlaybackSession::new(host, events, FileSampleFetcher, config);
        let summary = session
            .load(LoadRequest::new("rower.mp4").with_samples(samples_path.display().to_string()))
            .await
            .unwrap();
        assert_eq!(summary.samples, 0);
    }
}
