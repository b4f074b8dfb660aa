//! One analysis run: link validation, the simulated phases, the external call and
//! the resulting clips.

use std::{sync::Arc, time::Duration};

use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    analyzer::ClipAnalyzer,
    delay::{Delay, SIMULATED_DWELL, TokioDelay},
    error::{KesitError, Result},
    link::embed_url,
    report::format_report,
    response,
    types::{AnalysisResult, Clip, SessionPhase, VideoReference},
};

const PHASE_CHANNEL_CAPACITY: usize = 16;

pub struct Session {
    id: Uuid,
    analyzer: Arc<dyn ClipAnalyzer>,
    delay: Arc<dyn Delay>,
    dwell: Duration,
    link: String,
    video: Option<VideoReference>,
    phase: SessionPhase,
    result: Option<AnalysisResult>,
    active_clip: Option<usize>,
    error: Option<String>,
    phases: broadcast::Sender<SessionPhase>,
}

impl Session {
    pub fn new(analyzer: Arc<dyn ClipAnalyzer>) -> Self {
        let (phases, _) = broadcast::channel(PHASE_CHANNEL_CAPACITY);
        Self {
            id: Uuid::new_v4(),
            analyzer,
            delay: Arc::new(TokioDelay),
            dwell: SIMULATED_DWELL,
            link: String::new(),
            video: None,
            phase: SessionPhase::Idle,
            result: None,
            active_clip: None,
            error: None,
            phases,
        }
    }

    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_dwell(mut self, dwell: Duration) -> Self {
        self.dwell = dwell;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Every phase entered from now on, in order.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionPhase> {
        self.phases.subscribe()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn video(&self) -> Option<&VideoReference> {
        self.video.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// Message of the last failure, ready for display.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn active_clip_index(&self) -> Option<usize> {
        self.active_clip
    }

    pub fn active_clip(&self) -> Option<&Clip> {
        self.result.as_ref()?.clips.get(self.active_clip?)
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    /// Whether the start control should be enabled.
    pub fn can_start(&self) -> bool {
        !self.link.is_empty() && !self.is_busy()
    }

    /// Replace the link text. Outside of a running analysis this drops the previous
    /// video, result and active clip and returns the session to `Idle`; during a run only
    /// the text changes.
    pub fn edit_link(&mut self, link: impl Into<String>) {
        self.link = link.into();

        if self.is_busy() {
            return;
        }

        self.video = None;
        self.result = None;
        self.active_clip = None;
        if self.phase != SessionPhase::Idle {
            self.enter(SessionPhase::Idle);
        }
    }

    /// Make the clip at `index` the active one.
    pub fn select_clip(&mut self, index: usize) -> Option<&Clip> {
        let clip = self.result.as_ref()?.clips.get(index)?;
        self.active_clip = Some(index);
        Some(clip)
    }

    /// Player URL for the analysed video, looping the active clip if there is one.
    pub fn embed_url(&self) -> Option<String> {
        let video = self.video.as_ref()?;
        Some(embed_url(&video.id, self.active_clip()))
    }

    pub fn report(&self) -> Option<String> {
        self.result.as_ref().map(format_report)
    }

    /// Run a full analysis for `link`.
    ///
    /// An unrecognised link fails with [`KesitError::InvalidLink`] without leaving `Idle`.
    /// Otherwise the session walks through every phase and ends in `Completed` or `Error`.
    pub async fn start_analysis(&mut self, link: &str) -> Result<&AnalysisResult> {
        let video = self.begin(link)?;
        self.delay.wait(self.dwell).await;
        self.advance()?;
        self.delay.wait(self.dwell).await;
        self.advance()?;
        let raw = self.analyzer.analyze(&video).await;
        self.finish(raw)
    }

    /// Validate `link` and enter `Downloading`.
    ///
    /// The active clip is dropped but the previous result stays visible until the new
    /// run finishes successfully.
    pub fn begin(&mut self, link: &str) -> Result<VideoReference> {
        if self.is_busy() {
            return Err(KesitError::OutOfSequence { phase: self.phase });
        }
        if link != self.link {
            self.edit_link(link);
        }

        let Some(video) = VideoReference::parse(link) else {
            let err = KesitError::InvalidLink {
                input: link.to_string(),
            };
            warn!(session_id = %self.id, "{err}");
            self.error = Some(err.to_string());
            return Err(err);
        };

        self.video = Some(video.clone());
        self.error = None;
        self.active_clip = None;
        self.enter(SessionPhase::Downloading);
        Ok(video)
    }

    /// Leave a simulated phase once its dwell time has passed.
    pub fn advance(&mut self) -> Result<SessionPhase> {
        let next = match self.phase {
            SessionPhase::Downloading => SessionPhase::FetchingComments,
            SessionPhase::FetchingComments => SessionPhase::Analyzing,
            phase => return Err(KesitError::OutOfSequence { phase }),
        };
        self.enter(next);
        Ok(next)
    }

    /// Settle the `Analyzing` phase with the raw reply of the external call.
    pub fn finish(&mut self, raw: Result<String>) -> Result<&AnalysisResult> {
        if self.phase != SessionPhase::Analyzing {
            return Err(KesitError::OutOfSequence { phase: self.phase });
        }

        let video_id = self.video.as_ref().map(|v| v.id.clone()).unwrap_or_default();
        match raw.and_then(|text| response::parse(&text).map_err(KesitError::from)) {
            Ok(result) => {
                info!(
                    session_id = %self.id,
                    video_id = %video_id,
                    clips = result.clips.len(),
                    "analysis completed"
                );
                self.active_clip = (!result.clips.is_empty()).then_some(0);
                self.enter(SessionPhase::Completed);
                Ok(&*self.result.insert(result))
            }
            Err(err) => {
                warn!(session_id = %self.id, video_id = %video_id, error = %err, "analysis failed");
                self.error = Some(err.to_string());
                self.enter(SessionPhase::Error);
                Err(err)
            }
        }
    }

    fn enter(&mut self, phase: SessionPhase) {
        let video_id = self.video.as_ref().map(|v| v.id.as_str()).unwrap_or_default();
        info!(session_id = %self.id, video_id, from = ?self.phase, to = ?phase, "phase changed");
        self.phase = phase;
        // No subscribers is fine.
        let _ = self.phases.send(phase);
    }
}
