/*
 *  session.rs
 *
 *  stripdeck - mixer strips at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Per-context renderers and the background render worker
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */
//! Each key or dial on the controller is a *context*. A context keeps its
//! own level meter so peak hold survives between frames, while the fader,
//! status and icon renderers are stateless and shared.

use std::collections::HashMap;
use std::time::Instant;

use log::{debug, error, info, warn};
use thiserror::Error;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::feedback::{png_data_uri, svg_data_uri, FeedbackPayload};
use crate::gain::format_gain;
use crate::graphics::icon::compose_svg;
use crate::graphics::{GainFader, GainFaderConfig, IconStyle, LevelMeter, LevelMeterConfig, RenderError};
use crate::stripbus::{MixerKind, StripBusError, StripOrBus, StripOrBusKind};

/// Meters in a session are stereo.
pub const SESSION_CHANNELS: usize = 2;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    StripBus(#[from] StripBusError),
    #[error("{element} render failed: {source}")]
    Render {
        element: &'static str,
        #[source]
        source: RenderError,
    },
}

/// Everything to show on one context this cycle. `None` leaves that
/// element untouched on the device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderRequest {
    pub context: String,
    pub title: Option<String>,
    pub levels: Option<Vec<f64>>,
    pub gain: Option<f64>,
    pub status: Option<StripOrBus>,
    /// glyph outline as SVG path data
    pub icon: Option<String>,
}

impl RenderRequest {
    pub fn new(context: impl Into<String>) -> Self {
        Self { context: context.into(), ..Default::default() }
    }

    /// Request for channel `index` with its default title and a blank status.
    pub fn channel(
        context: impl Into<String>,
        mixer: MixerKind,
        which: StripOrBusKind,
        index: usize,
    ) -> Result<Self, SessionError> {
        let status = StripOrBus::for_index(mixer, which, index)?;
        Ok(Self {
            context: context.into(),
            title: Some(which.default_title(index)),
            status: Some(status),
            ..Default::default()
        })
    }
}

pub struct RenderSession {
    meter_template: LevelMeterConfig,
    fader: GainFader,
    icon_style: IconStyle,
    vertical_meter: bool,
    meters: HashMap<String, LevelMeter>,
}

impl RenderSession {
    pub fn new(meter: LevelMeterConfig, fader: GainFaderConfig, icon_style: IconStyle) -> Self {
        let meter_template = LevelMeterConfig { channel_count: SESSION_CHANNELS, ..meter };
        Self {
            meter_template,
            fader: GainFader::with_config(fader),
            icon_style,
            vertical_meter: false,
            meters: HashMap::new(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        let mut s = Self::new(cfg.meter(), cfg.fader(), cfg.icon());
        s.vertical_meter = cfg.vertical_meter();
        s
    }

    pub fn set_vertical_meter(&mut self, vertical: bool) {
        self.vertical_meter = vertical;
    }

    pub fn contexts(&self) -> usize {
        self.meters.len()
    }

    /// Tracked peaks for a context, if it has a meter yet.
    pub fn peaks(&self, context: &str) -> Option<&[f64]> {
        self.meters.get(context).map(|m| m.peaks())
    }

    /// Drop a context's meter, e.g. when its key disappears.
    pub fn forget(&mut self, context: &str) -> bool {
        self.meters.remove(context).is_some()
    }

    pub fn render(&mut self, req: &RenderRequest) -> FeedbackPayload {
        self.render_at(req, Instant::now())
    }

    /// Render every element the request carries. A failing element is
    /// logged and left out of the payload.
    pub fn render_at(&mut self, req: &RenderRequest, now: Instant) -> FeedbackPayload {
        let mut out = FeedbackPayload { title: req.title.clone(), ..Default::default() };

        if let Some(levels) = &req.levels {
            out.level_meter = keep(&req.context, self.meter_uri(&req.context, levels, now));
        }
        if let Some(gain) = req.gain {
            out.gain_value = Some(format_gain(gain));
            out.gain_slider = keep(&req.context, self.fader_uri(gain));
        }
        if let Some(status) = &req.status {
            out.status = keep(&req.context, status_uri(status));
        }
        if let Some(path) = &req.icon {
            out.icon = Some(svg_data_uri(&compose_svg(path, &self.icon_style)));
        }
        out
    }

    fn meter_uri(&mut self, context: &str, levels: &[f64], now: Instant) -> Result<String, SessionError> {
        let template = &self.meter_template;
        let meter = self.meters.entry(context.to_string()).or_insert_with(|| {
            debug!("session {}: new level meter", context);
            LevelMeter::with_config(template.clone())
        });
        let pixmap = if self.vertical_meter {
            meter.render_vertical_at(levels, now)
        } else {
            meter.render_horizontal_at(levels, now)
        };
        pixmap
            .and_then(|p| png_data_uri(&p))
            .map_err(|source| SessionError::Render { element: "level meter", source })
    }

    fn fader_uri(&self, gain: f64) -> Result<String, SessionError> {
        self.fader
            .render_horizontal(gain)
            .and_then(|p| png_data_uri(&p))
            .map_err(|source| SessionError::Render { element: "gain fader", source })
    }
}

fn keep(context: &str, r: Result<String, SessionError>) -> Option<String> {
    r.map_err(|e| error!("session {}: {}", context, e)).ok()
}

fn status_uri(status: &StripOrBus) -> Result<String, SessionError> {
    status
        .render_indicator()
        .and_then(|p| png_data_uri(&p))
        .map_err(|source| SessionError::Render { element: "status", source })
}

/// Commands sent to the background worker.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    Render(RenderRequest),
    Forget(String),
    Shutdown,
}

/// A rendered update, ready to send to the device.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeedback {
    pub context: String,
    pub payload: FeedbackPayload,
}

/// Handle to a session running on its own task.
pub struct RenderWorker {
    cmd_tx: Sender<SessionCommand>,
    join: Option<JoinHandle<()>>,
    /// The device link consumes updates from here.
    pub rx: Receiver<RenderedFeedback>,
}

impl RenderWorker {
    /// Spawn onto the current tokio runtime. Both queues are bounded by
    /// `capacity`; a full queue drops the newest item.
    pub fn spawn(session: RenderSession, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<SessionCommand>(capacity);
        let (out_tx, out_rx) = mpsc::channel::<RenderedFeedback>(capacity);

        let join = tokio::spawn(async move { render_worker(session, cmd_rx, out_tx).await });

        Self { cmd_tx, join: Some(join), rx: out_rx }
    }

    /// Queue a request; false if the worker is busy or gone.
    pub fn submit(&self, req: RenderRequest) -> bool {
        match self.cmd_tx.try_send(SessionCommand::Render(req)) {
            Ok(()) => true,
            Err(e) => {
                warn!("render worker: request dropped ({})", e);
                false
            }
        }
    }

    pub fn forget(&self, context: &str) {
        let _ = self.cmd_tx.try_send(SessionCommand::Forget(context.to_string()));
    }

    /// Ask the worker to stop.
    pub fn shutdown(mut self) {
        let _ = self.cmd_tx.try_send(SessionCommand::Shutdown);
        if let Some(handle) = self.join.take() {
            handle.abort();
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(SessionCommand::Shutdown);
        if let Some(handle) = self.join.take() {
            handle.abort();
        }
    }
}

async fn render_worker(
    mut session: RenderSession,
    mut cmd_rx: Receiver<SessionCommand>,
    out_tx: Sender<RenderedFeedback>,
) {
    info!("render worker started");
    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            SessionCommand::Render(req) => {
                let payload = session.render(&req);
                if payload.is_empty() {
                    debug!("render worker: nothing to send for {}", req.context);
                    continue;
                }
                if let Err(e) = out_tx.try_send(RenderedFeedback { context: req.context, payload }) {
                    warn!("render worker: update dropped ({})", e);
                }
            }
            SessionCommand::Forget(context) => {
                session.forget(&context);
            }
            SessionCommand::Shutdown => break,
        }
    }
    info!("render worker stopped");
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::feedback::{PNG_URI_PREFIX, SVG_URI_PREFIX};
    use crate::stripbus::StripStatus;

    fn session() -> RenderSession {
        RenderSession::new(LevelMeterConfig::default(), GainFaderConfig::default(), IconStyle::default())
    }

    fn full_request(context: &str) -> RenderRequest {
        RenderRequest {
            context: context.into(),
            title: Some("Strip 0".into()),
            levels: Some(vec![-6.0, -12.0]),
            gain: Some(-3.0),
            status: Some(StripOrBus::Strip(StripStatus::new(MixerKind::Banana, true))),
            icon: Some("M12 12 H36 V36 H12 Z".into()),
        }
    }

    #[test]
    fn test_renders_every_element() {
        let mut s = session();
        let p = s.render(&full_request("key-1"));
        assert_eq!(p.title.as_deref(), Some("Strip 0"));
        assert_eq!(p.gain_value.as_deref(), Some("-3.0 dB"));
        assert!(p.level_meter.unwrap().starts_with(PNG_URI_PREFIX));
        assert!(p.gain_slider.unwrap().starts_with(PNG_URI_PREFIX));
        assert!(p.status.unwrap().starts_with(PNG_URI_PREFIX));
        assert!(p.icon.unwrap().starts_with(SVG_URI_PREFIX));
    }

    #[test]
    fn test_failed_element_is_omitted() {
        let mut s = session();
        let mut req = full_request("key-1");
        req.levels = Some(vec![-6.0]);
        let p = s.render(&req);
        assert!(p.level_meter.is_none());
        assert!(p.gain_slider.is_some());
        assert!(p.status.is_some());
    }

    #[test]
    fn test_contexts_keep_separate_peaks() {
        let mut s = session();
        let t0 = Instant::now();
        let mut a = RenderRequest::new("a");
        a.levels = Some(vec![0.0, 0.0]);
        let mut b = RenderRequest::new("b");
        b.levels = Some(vec![-40.0, -40.0]);

        s.render_at(&a, t0);
        s.render_at(&b, t0);
        a.levels = Some(vec![-200.0, -200.0]);
        s.render_at(&a, t0 + Duration::from_secs(1));

        assert_eq!(s.contexts(), 2);
        let pa = s.peaks("a").unwrap();
        assert!((pa[0] + 12.0).abs() < 1e-9);
        assert_eq!(s.peaks("b").unwrap(), &[-40.0, -40.0]);

        assert!(s.forget("a"));
        assert!(!s.forget("a"));
        assert!(s.peaks("a").is_none());
    }

    #[test]
    fn test_channel_request() {
        let req = RenderRequest::channel("k", MixerKind::Potato, StripOrBusKind::Bus, 7).unwrap();
        assert_eq!(req.title.as_deref(), Some("Bus 7"));
        assert!(matches!(req.status, Some(StripOrBus::Bus(_))));
        assert!(matches!(
            RenderRequest::channel("k", MixerKind::Basic, StripOrBusKind::Strip, 9),
            Err(SessionError::StripBus(_))
        ));
    }

    #[tokio::test]
    async fn test_worker_publishes_updates() {
        let mut worker = RenderWorker::spawn(session(), 8);
        assert!(worker.submit(full_request("dial-2")));
        let mut empty = RenderRequest::new("dial-3");
        empty.title = None;
        assert!(worker.submit(empty));
        let mut titled = RenderRequest::new("dial-4");
        titled.title = Some("Bus 1".into());
        assert!(worker.submit(titled));

        let first = worker.rx.recv().await.unwrap();
        assert_eq!(first.context, "dial-2");
        assert!(first.payload.level_meter.is_some());
        // empty payloads are not published
        let second = worker.rx.recv().await.unwrap();
        assert_eq!(second.context, "dial-4");
        worker.shutdown();
    }

    #[tokio::test]
    async fn test_worker_stops_when_handle_dropped() {
        let worker = RenderWorker::spawn(session(), 1);
        let tx = worker.cmd_tx.clone();
        drop(worker);
        tokio::task::yield_now().await;
        // the abort closes the receiving side
        tokio::time::timeout(Duration::from_secs(5), tx.closed()).await.unwrap();
    }
}
