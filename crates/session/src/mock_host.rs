//! Mock 视频宿主
//!
//! 无真实视频元素时使用（单元测试、CLI replay），支持注入失败场景。
//! 所有调用都会被记录；事件通过 mpsc 通道异步投递给会话。

use contracts::{ContractError, FrameRequestId, HostEvent, PlaybackStart, VideoHost};
use image::{Rgba, RgbaImage};
use tokio::sync::mpsc;
use tracing::{instrument, trace};

/// Mock 宿主配置
#[derive(Debug, Clone)]
pub struct MockHostConfig {
    /// 视频固有宽度（0 表示未知）
    pub width: u32,
    /// 视频固有高度（0 表示未知）
    pub height: u32,
    /// attach 后是否上报 MetadataLoaded
    pub emit_metadata: bool,
    /// attach 后是否上报 FirstFrameReady
    pub emit_first_frame: bool,
    /// 自动播放策略拒绝（start_playback 返回 Blocked）
    pub block_autoplay: bool,
    /// attach 直接失败
    pub fail_attach: bool,
    /// 是否提供 presented-frames 计数
    pub report_presented_frames: bool,
    /// 视频帧填充色
    pub frame_colour: [u8; 3],
}

impl Default for MockHostConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 48,
            emit_metadata: true,
            emit_first_frame: true,
            block_autoplay: false,
            fail_attach: false,
            report_presented_frames: true,
            frame_colour: [16, 16, 16],
        }
    }
}

/// 记录的宿主调用
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Attach(String),
    Detach,
    StartPlayback,
    PausePlayback,
    RequestFrame(FrameRequestId),
    CancelFrame(FrameRequestId),
}

/// Mock 视频宿主
pub struct MockVideoHost {
    /// 配置（可注入失败场景）
    config: MockHostConfig,
    /// 事件发送端
    events: mpsc::UnboundedSender<HostEvent>,
    /// 调用记录
    calls: Vec<MockCall>,
    /// 当前挂载的源
    source: Option<String>,
    /// 当前帧
    frame: Option<RgbaImage>,
    /// 媒体时间 (ms)
    media_time_ms: f64,
    /// 是否正在播放
    playing: bool,
    /// 已呈现帧计数
    presented_frames: u64,
    /// 请求 ID 计数器
    next_request: FrameRequestId,
    /// 未完成的帧请求
    pending: Vec<FrameRequestId>,
}

impl MockVideoHost {
    /// 创建 mock 宿主及其事件接收端
    pub fn new(config: MockHostConfig) -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let host = Self {
            config,
            events,
            calls: Vec::new(),
            source: None,
            frame: None,
            media_time_ms: 0.0,
            playing: false,
            presented_frames: 0,
            next_request: 1,
            pending: Vec::new(),
        };
        (host, receiver)
    }

    /// 使用默认配置创建
    pub fn with_defaults() -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        Self::new(MockHostConfig::default())
    }

    /// 事件发送端（测试中注入任意事件）
    pub fn sender(&self) -> mpsc::UnboundedSender<HostEvent> {
        self.events.clone()
    }

    pub fn calls(&self) -> &[MockCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn pending_requests(&self) -> &[FrameRequestId] {
        &self.pending
    }

    pub fn config_mut(&mut self) -> &mut MockHostConfig {
        &mut self.config
    }

    /// 替换当前帧
    pub fn set_frame(&mut self, frame: Option<RgbaImage>) {
        self.frame = frame;
    }

    /// 推进媒体时间并应答所有未完成的帧请求
    ///
    /// 返回应答的请求数。
    pub fn present(&mut self, advance_ms: f64) -> usize {
        self.media_time_ms += advance_ms;
        self.presented_frames += 1;
        let presented_frames = self
            .config
            .report_presented_frames
            .then_some(self.presented_frames);
        let answered = std::mem::take(&mut self.pending);
        for request in &answered {
            self.emit(HostEvent::FramePresented {
                request: *request,
                media_time_ms: self.media_time_ms,
                presented_frames,
            });
        }
        answered.len()
    }

    /// 跳转到指定媒体时间（Seeking + Seeked）
    pub fn seek(&mut self, media_time_ms: f64) {
        self.emit(HostEvent::Seeking);
        self.media_time_ms = media_time_ms.max(0.0);
        self.emit(HostEvent::Seeked {
            media_time_ms: self.media_time_ms,
        });
    }

    /// 播放到结尾
    pub fn end(&mut self) {
        self.playing = false;
        self.emit(HostEvent::Ended);
    }

    /// 宿主侧暂停（例如用户点击原生控件）
    pub fn user_pause(&mut self) {
        self.playing = false;
        self.emit(HostEvent::Paused);
    }

    fn emit(&self, event: HostEvent) {
        trace!(?event, "mock host event");
        // receiver dropped once the session is destroyed
        let _ = self.events.send(event);
    }
}

impl VideoHost for MockVideoHost {
    #[instrument(name = "mock_host_attach", skip(self))]
    fn attach(&mut self, source: &str) -> Result<(), ContractError> {
        self.calls.push(MockCall::Attach(source.to_string()));
        if self.config.fail_attach {
            return Err(ContractError::host(format!("cannot open '{source}'")));
        }

        self.source = Some(source.to_string());
        self.media_time_ms = 0.0;
        self.playing = false;
        self.presented_frames = 0;
        self.pending.clear();

        let (width, height) = (self.config.width, self.config.height);
        let [r, g, b] = self.config.frame_colour;
        self.frame = (width > 0 && height > 0)
            .then(|| RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])));

        if self.config.emit_metadata {
            self.emit(HostEvent::MetadataLoaded { width, height });
        }
        if self.config.emit_first_frame {
            self.emit(HostEvent::FirstFrameReady);
        }
        Ok(())
    }

    fn detach(&mut self) {
        self.calls.push(MockCall::Detach);
        self.source = None;
        self.frame = None;
        self.playing = false;
        self.pending.clear();
    }

    fn start_playback(&mut self) -> Result<PlaybackStart, ContractError> {
        self.calls.push(MockCall::StartPlayback);
        if self.source.is_none() {
            return Err(ContractError::host("no source attached"));
        }
        if self.config.block_autoplay {
            return Ok(PlaybackStart::Blocked);
        }
        self.playing = true;
        self.emit(HostEvent::Playing);
        Ok(PlaybackStart::Started)
    }

    fn pause_playback(&mut self) {
        self.calls.push(MockCall::PausePlayback);
        if self.playing {
            self.playing = false;
            self.emit(HostEvent::Paused);
        }
    }

    fn media_time_ms(&self) -> f64 {
        self.media_time_ms
    }

    fn request_frame(&mut self) -> FrameRequestId {
        let request = self.next_request;
        self.next_request += 1;
        self.pending.push(request);
        self.calls.push(MockCall::RequestFrame(request));
        request
    }

    fn cancel_frame(&mut self, request: FrameRequestId) {
        self.calls.push(MockCall::CancelFrame(request));
        self.pending.retain(|pending| *pending != request);
    }

    fn current_frame(&self) -> Result<&RgbaImage, ContractError> {
        self.frame
            .as_ref()
            .ok_or_else(|| ContractError::frame_unavailable("no decoded frame"))
    }
}
