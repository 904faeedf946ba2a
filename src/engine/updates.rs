use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::UpdateConfig;

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("malformed push frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("push frame `{kind}` carries an invalid payload: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ProgressReport {
    #[serde(default, rename = "notebook_id")]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub progress: f32,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SourceUpdate {
    pub source_id: String,
    #[serde(default, rename = "notebook_id")]
    pub collection_id: Option<String>,
    pub status: SourceStatus,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PushEvent {
    Connected,
    Heartbeat,
    ConceptAdded { collection_id: Option<String> },
    LinkAdded,
    ClusterUpdated,
    BuildProgress(ProgressReport),
    BuildComplete { collection_id: Option<String> },
    ClusterProgress(ProgressReport),
    ClusterComplete,
    EnhancementProgress(ProgressReport),
    SourceUpdated(SourceUpdate),
    Unknown(String),
}

impl PushEvent {
    pub fn parse(text: &str) -> Result<Self, UpdateError> {
        if text.trim() == "pong" {
            return Ok(Self::Heartbeat);
        }

        let envelope: Envelope = serde_json::from_str(text)?;
        let event = match envelope.kind.as_str() {
            "connected" => Self::Connected,
            "heartbeat" => Self::Heartbeat,
            "concept_added" => Self::ConceptAdded {
                collection_id: collection_of(&envelope.data),
            },
            "link_added" => Self::LinkAdded,
            "cluster_updated" => Self::ClusterUpdated,
            "build_progress" => Self::BuildProgress(payload(&envelope)?),
            "build_complete" => Self::BuildComplete {
                collection_id: collection_of(&envelope.data),
            },
            "cluster_progress" => Self::ClusterProgress(payload(&envelope)?),
            "cluster_complete" => Self::ClusterComplete,
            "enhancement_progress" => Self::EnhancementProgress(payload(&envelope)?),
            "source_updated" => Self::SourceUpdated(payload(&envelope)?),
            _ => Self::Unknown(envelope.kind),
        };
        Ok(event)
    }
}

fn payload<T: DeserializeOwned>(envelope: &Envelope) -> Result<T, UpdateError> {
    T::deserialize(&envelope.data).map_err(|source| UpdateError::Payload {
        kind: envelope.kind.clone(),
        source,
    })
}

fn collection_of(data: &Value) -> Option<String> {
    data.get("notebook_id")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressKind {
    Build,
    Clustering,
    Enhancement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshReason {
    ConceptAdded,
    BuildComplete,
    ClusterComplete,
    SourceCompleted,
    BuildTimedOut,
}

#[derive(Clone, Debug, PartialEq)]
pub enum UpdateAction {
    Refresh {
        collection_id: Option<String>,
        reason: RefreshReason,
    },
    Progress {
        kind: ProgressKind,
        percent: f32,
    },
    Finished {
        kind: ProgressKind,
    },
    ProcessingChanged {
        count: usize,
    },
}

/// Percent indicator that never moves backwards while a run is active.
#[derive(Clone, Debug, Default)]
pub struct ProgressTracker {
    active: bool,
    percent: f32,
    status: Option<String>,
}

impl ProgressTracker {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn percent(&self) -> f32 {
        self.percent
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn start(&mut self) {
        self.active = true;
        self.percent = 0.0;
        self.status = None;
    }

    /// Returns the new displayed value when the report moved the indicator forward.
    pub fn report(&mut self, percent: f32, status: Option<String>) -> Option<f32> {
        if !self.active {
            self.start();
        }
        if status.is_some() {
            self.status = status;
        }

        let percent = if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        if percent > self.percent {
            self.percent = percent;
            Some(percent)
        } else {
            None
        }
    }

    fn finish(&mut self, actions: &mut Vec<UpdateAction>, kind: ProgressKind) {
        if !self.active {
            return;
        }
        if self.percent < 100.0 {
            self.percent = 100.0;
            actions.push(UpdateAction::Progress {
                kind,
                percent: 100.0,
            });
        }
        self.active = false;
        actions.push(UpdateAction::Finished { kind });
    }

    fn abort(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }
}

/// Exponential backoff over a bounded number of consecutive failed connections.
#[derive(Clone, Debug)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    base_delay: Duration,
    failures: u32,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            failures: 0,
        }
    }

    pub fn from_config(config: &UpdateConfig) -> Self {
        Self::new(
            config.max_reconnect_attempts,
            Duration::from_millis(config.reconnect_base_delay_ms),
        )
    }

    pub fn on_open(&mut self) {
        self.failures = 0;
    }

    /// Delay before the next attempt, or `None` once the attempt budget is spent.
    pub fn on_close(&mut self) -> Option<Duration> {
        self.failures = self.failures.saturating_add(1);
        if self.failures > self.max_attempts {
            return None;
        }
        let exponent = (self.failures - 1).min(16);
        Some(self.base_delay.saturating_mul(1 << exponent))
    }

    pub fn attempts_made(&self) -> u32 {
        self.failures.min(self.max_attempts)
    }
}

/// What the push transport reports to the loop.
#[derive(Clone, Debug, PartialEq)]
pub enum ChannelSignal {
    Opened,
    Frame(String),
    Retrying { attempt: u32, delay: Duration },
    GaveUp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    Retrying { attempt: u32 },
    Offline,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Open => "live",
            Self::Retrying { .. } => "reconnecting",
            Self::Offline => "offline",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ProcessingSet {
    sources: HashSet<String>,
}

impl ProcessingSet {
    pub fn insert(&mut self, source_id: &str) -> bool {
        self.sources.insert(source_id.to_owned())
    }

    pub fn remove(&mut self, source_id: &str) -> bool {
        self.sources.remove(source_id)
    }

    pub fn contains(&self, source_id: &str) -> bool {
        self.sources.contains(source_id)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn clear(&mut self) {
        self.sources.clear();
    }
}

pub struct UpdateChannel {
    config: UpdateConfig,
    active_collection: Option<String>,
    processing: ProcessingSet,
    build: ProgressTracker,
    clustering: ProgressTracker,
    enhancement: ProgressTracker,
    build_deadline: Option<f64>,
    connection: ConnectionState,
}

impl UpdateChannel {
    pub fn new(config: UpdateConfig) -> Self {
        Self {
            config,
            active_collection: None,
            processing: ProcessingSet::default(),
            build: ProgressTracker::default(),
            clustering: ProgressTracker::default(),
            enhancement: ProgressTracker::default(),
            build_deadline: None,
            connection: ConnectionState::Connecting,
        }
    }

    pub fn active_collection(&self) -> Option<&str> {
        self.active_collection.as_deref()
    }

    /// Switches the collection events are matched against. Session state tied to the
    /// previous collection is dropped.
    pub fn set_active_collection(&mut self, collection_id: Option<String>) -> bool {
        if self.active_collection == collection_id {
            return false;
        }
        self.active_collection = collection_id;
        self.processing.clear();
        self.build = ProgressTracker::default();
        self.clustering = ProgressTracker::default();
        self.enhancement = ProgressTracker::default();
        self.build_deadline = None;
        true
    }

    pub fn processing(&self) -> &ProcessingSet {
        &self.processing
    }

    pub fn build(&self) -> &ProgressTracker {
        &self.build
    }

    pub fn clustering(&self) -> &ProgressTracker {
        &self.clustering
    }

    pub fn enhancement(&self) -> &ProgressTracker {
        &self.enhancement
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Marks a build as started by this client and arms the fallback timer.
    pub fn begin_build(&mut self, now: f64) {
        self.build.start();
        self.build_deadline = Some(now + self.config.build_fallback_secs);
    }

    pub fn begin_clustering(&mut self) {
        self.clustering.start();
    }

    pub fn on_signal(&mut self, signal: ChannelSignal, now: f64) -> Vec<UpdateAction> {
        match signal {
            ChannelSignal::Opened => {
                info!("push channel open");
                self.connection = ConnectionState::Open;
                Vec::new()
            }
            ChannelSignal::Retrying { attempt, delay } => {
                debug!(attempt, ?delay, "push channel closed, retrying");
                self.connection = ConnectionState::Retrying { attempt };
                Vec::new()
            }
            ChannelSignal::GaveUp => {
                info!("push channel gave up; relying on manual refresh");
                self.connection = ConnectionState::Offline;
                Vec::new()
            }
            ChannelSignal::Frame(text) => match PushEvent::parse(&text) {
                Ok(event) => self.handle(event, now),
                Err(error) => {
                    warn!(%error, "dropping push frame");
                    Vec::new()
                }
            },
        }
    }

    pub fn handle(&mut self, event: PushEvent, now: f64) -> Vec<UpdateAction> {
        let mut actions = Vec::new();
        match event {
            PushEvent::Connected | PushEvent::Heartbeat => {}
            PushEvent::LinkAdded | PushEvent::ClusterUpdated => {
                debug!("ignoring incremental graph event");
            }
            PushEvent::ConceptAdded { collection_id } => {
                if self.concerns(collection_id.as_deref()) {
                    actions.push(self.refresh(collection_id, RefreshReason::ConceptAdded));
                }
            }
            PushEvent::BuildProgress(report) => {
                if self.concerns(report.collection_id.as_deref()) {
                    if !self.build.is_active() {
                        self.begin_build(now);
                    }
                    if let Some(percent) = self.build.report(report.progress, report.status) {
                        actions.push(UpdateAction::Progress {
                            kind: ProgressKind::Build,
                            percent,
                        });
                    }
                }
            }
            PushEvent::BuildComplete { collection_id } => {
                if self.concerns(collection_id.as_deref()) {
                    self.build.finish(&mut actions, ProgressKind::Build);
                    self.build_deadline = None;
                    actions.push(self.refresh(collection_id, RefreshReason::BuildComplete));
                }
            }
            PushEvent::ClusterProgress(report) => {
                if self.concerns(report.collection_id.as_deref())
                    && let Some(percent) = self.clustering.report(report.progress, report.status)
                {
                    actions.push(UpdateAction::Progress {
                        kind: ProgressKind::Clustering,
                        percent,
                    });
                }
            }
            PushEvent::ClusterComplete => {
                self.clustering
                    .finish(&mut actions, ProgressKind::Clustering);
                actions.push(self.refresh(None, RefreshReason::ClusterComplete));
            }
            PushEvent::EnhancementProgress(report) => {
                if self.concerns(report.collection_id.as_deref()) {
                    if let Some(percent) = self.enhancement.report(report.progress, report.status)
                    {
                        actions.push(UpdateAction::Progress {
                            kind: ProgressKind::Enhancement,
                            percent,
                        });
                    }
                    if self.enhancement.percent() >= 100.0 {
                        self.enhancement
                            .finish(&mut actions, ProgressKind::Enhancement);
                    }
                }
            }
            PushEvent::SourceUpdated(update) => {
                if self.concerns(update.collection_id.as_deref()) {
                    self.apply_source_update(update, &mut actions);
                }
            }
            PushEvent::Unknown(kind) => {
                debug!(kind, "ignoring unknown push event");
            }
        }
        actions
    }

    /// Clears a build that never reported completion.
    pub fn poll(&mut self, now: f64) -> Vec<UpdateAction> {
        let Some(deadline) = self.build_deadline else {
            return Vec::new();
        };
        if now < deadline {
            return Vec::new();
        }

        self.build_deadline = None;
        let mut actions = Vec::new();
        if self.build.abort() {
            warn!("no build_complete received before the fallback timeout");
            actions.push(UpdateAction::Finished {
                kind: ProgressKind::Build,
            });
        }
        actions.push(self.refresh(None, RefreshReason::BuildTimedOut));
        actions
    }

    fn apply_source_update(&mut self, update: SourceUpdate, actions: &mut Vec<UpdateAction>) {
        let changed = match update.status {
            SourceStatus::Processing => self.processing.insert(&update.source_id),
            SourceStatus::Completed => {
                let removed = self.processing.remove(&update.source_id);
                actions.push(self.refresh(
                    update.collection_id.clone(),
                    RefreshReason::SourceCompleted,
                ));
                removed
            }
            SourceStatus::Failed => {
                if let Some(error) = &update.error {
                    warn!(source_id = %update.source_id, %error, "source ingestion failed");
                }
                self.processing.remove(&update.source_id)
            }
            SourceStatus::Other => false,
        };

        if changed {
            actions.push(UpdateAction::ProcessingChanged {
                count: self.processing.len(),
            });
        }
    }

    fn concerns(&self, collection_id: Option<&str>) -> bool {
        match (collection_id, self.active_collection.as_deref()) {
            (Some(event), Some(active)) => event == active,
            _ => true,
        }
    }

    fn refresh(&self, collection_id: Option<String>, reason: RefreshReason) -> UpdateAction {
        UpdateAction::Refresh {
            collection_id: collection_id.or_else(|| self.active_collection.clone()),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn channel() -> UpdateChannel {
        let mut channel = UpdateChannel::new(UpdateConfig::default());
        channel.set_active_collection(Some("nb1".to_owned()));
        channel
    }

    fn frame(channel: &mut UpdateChannel, text: &str, now: f64) -> Vec<UpdateAction> {
        channel.on_signal(ChannelSignal::Frame(text.to_owned()), now)
    }

    #[test]
    fn parses_envelopes() {
        assert_eq!(
            PushEvent::parse(r#"{"type":"heartbeat"}"#).expect("parses"),
            PushEvent::Heartbeat
        );
        assert_eq!(PushEvent::parse("pong").expect("parses"), PushEvent::Heartbeat);
        assert_eq!(
            PushEvent::parse(
                r#"{"type":"build_progress","data":{"notebook_id":"nb1","progress":5,"status":"Collecting"}}"#
            )
            .expect("parses"),
            PushEvent::BuildProgress(ProgressReport {
                collection_id: Some("nb1".to_owned()),
                progress: 5.0,
                status: Some("Collecting".to_owned()),
            })
        );
        assert_eq!(
            PushEvent::parse(r#"{"type":"build_complete","data":{}}"#).expect("parses"),
            PushEvent::BuildComplete {
                collection_id: None
            }
        );
        assert_eq!(
            PushEvent::parse(r#"{"type":"mystery","data":{}}"#).expect("parses"),
            PushEvent::Unknown("mystery".to_owned())
        );
    }

    #[test]
    fn malformed_frames_are_errors() {
        assert!(matches!(
            PushEvent::parse("not json"),
            Err(UpdateError::Malformed(_))
        ));
        assert!(matches!(
            PushEvent::parse(r#"{"type":"source_updated","data":{"status":"processing"}}"#),
            Err(UpdateError::Payload { .. })
        ));
    }

    #[test]
    fn build_progress_is_monotonic_and_completes_once() {
        let mut channel = channel();
        let mut actions = Vec::new();
        actions.extend(frame(
            &mut channel,
            r#"{"type":"build_progress","data":{"notebook_id":"nb1","progress":40}}"#,
            0.0,
        ));
        assert!(channel.build().is_active());
        actions.extend(frame(
            &mut channel,
            r#"{"type":"build_progress","data":{"notebook_id":"nb1","progress":70}}"#,
            1.0,
        ));
        actions.extend(frame(&mut channel, r#"{"type":"build_complete","data":{}}"#, 2.0));

        let shown = actions
            .iter()
            .filter_map(|action| match action {
                UpdateAction::Progress {
                    kind: ProgressKind::Build,
                    percent,
                } => Some(*percent),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(shown, vec![40.0, 70.0, 100.0]);
        assert!(shown.windows(2).all(|pair| pair[0] <= pair[1]));

        let finished = actions
            .iter()
            .filter(|action| {
                **action
                    == UpdateAction::Finished {
                        kind: ProgressKind::Build,
                    }
            })
            .count();
        assert_eq!(finished, 1);
        assert!(!channel.build().is_active());
        assert_eq!(channel.build().percent(), 100.0);

        let repeat = frame(&mut channel, r#"{"type":"build_complete","data":{}}"#, 3.0);
        assert_eq!(
            repeat,
            vec![UpdateAction::Refresh {
                collection_id: Some("nb1".to_owned()),
                reason: RefreshReason::BuildComplete,
            }]
        );
    }

    #[test]
    fn late_lower_progress_is_ignored() {
        let mut channel = channel();
        frame(
            &mut channel,
            r#"{"type":"build_progress","data":{"progress":70}}"#,
            0.0,
        );
        let actions = frame(
            &mut channel,
            r#"{"type":"build_progress","data":{"progress":40}}"#,
            0.5,
        );
        assert!(actions.is_empty());
        assert_eq!(channel.build().percent(), 70.0);
    }

    #[test]
    fn source_updates_maintain_processing_set() {
        let mut channel = channel();
        let actions = frame(
            &mut channel,
            r#"{"type":"source_updated","data":{"source_id":"s1","notebook_id":"nb1","status":"processing"}}"#,
            0.0,
        );
        assert_eq!(actions, vec![UpdateAction::ProcessingChanged { count: 1 }]);
        frame(
            &mut channel,
            r#"{"type":"source_updated","data":{"source_id":"s2","notebook_id":"nb1","status":"processing"}}"#,
            0.0,
        );
        assert_eq!(channel.processing().len(), 2);

        let completed = frame(
            &mut channel,
            r#"{"type":"source_updated","data":{"source_id":"s1","notebook_id":"nb1","status":"completed"}}"#,
            0.0,
        );
        assert_eq!(
            completed,
            vec![
                UpdateAction::Refresh {
                    collection_id: Some("nb1".to_owned()),
                    reason: RefreshReason::SourceCompleted,
                },
                UpdateAction::ProcessingChanged { count: 1 },
            ]
        );

        let failed = frame(
            &mut channel,
            r#"{"type":"source_updated","data":{"source_id":"s2","notebook_id":"nb1","status":"failed","error":"timeout"}}"#,
            0.0,
        );
        assert_eq!(failed, vec![UpdateAction::ProcessingChanged { count: 0 }]);
        assert!(channel.processing().is_empty());
    }

    #[test]
    fn events_for_other_collections_are_ignored() {
        let mut channel = channel();
        let actions = frame(
            &mut channel,
            r#"{"type":"concept_added","data":{"notebook_id":"other"}}"#,
            0.0,
        );
        assert!(actions.is_empty());
        let actions = frame(
            &mut channel,
            r#"{"type":"source_updated","data":{"source_id":"s9","notebook_id":"other","status":"processing"}}"#,
            0.0,
        );
        assert!(actions.is_empty());
        assert!(!channel.processing().contains("s9"));
    }

    #[test]
    fn refresh_carries_payload_collection() {
        let mut channel = UpdateChannel::new(UpdateConfig::default());
        let actions = frame(
            &mut channel,
            r#"{"type":"concept_added","data":{"notebook_id":"nb7","name":"x"}}"#,
            0.0,
        );
        assert_eq!(
            actions,
            vec![UpdateAction::Refresh {
                collection_id: Some("nb7".to_owned()),
                reason: RefreshReason::ConceptAdded,
            }]
        );
    }

    #[test]
    fn cluster_complete_refreshes() {
        let mut channel = channel();
        channel.begin_clustering();
        let actions = frame(&mut channel, r#"{"type":"cluster_complete","data":{}}"#, 0.0);
        assert!(actions.contains(&UpdateAction::Finished {
            kind: ProgressKind::Clustering
        }));
        assert!(actions.iter().any(|action| matches!(
            action,
            UpdateAction::Refresh {
                reason: RefreshReason::ClusterComplete,
                ..
            }
        )));
    }

    #[test]
    fn fallback_timer_clears_building_once() {
        let mut channel = channel();
        channel.begin_build(10.0);
        assert!(channel.poll(150.0).is_empty());

        let actions = channel.poll(191.0);
        assert_eq!(
            actions,
            vec![
                UpdateAction::Finished {
                    kind: ProgressKind::Build
                },
                UpdateAction::Refresh {
                    collection_id: Some("nb1".to_owned()),
                    reason: RefreshReason::BuildTimedOut,
                },
            ]
        );
        assert!(!channel.build().is_active());
        assert!(channel.poll(400.0).is_empty());
    }

    #[test]
    fn completion_disarms_fallback_timer() {
        let mut channel = channel();
        channel.begin_build(0.0);
        frame(&mut channel, r#"{"type":"build_complete","data":{}}"#, 5.0);
        assert!(channel.poll(500.0).is_empty());
    }

    #[test]
    fn three_disconnects_exhaust_reconnects() {
        let mut policy = ReconnectPolicy::new(3, Duration::from_millis(100));
        assert_eq!(policy.on_close(), Some(Duration::from_millis(100)));
        assert_eq!(policy.on_close(), Some(Duration::from_millis(200)));
        assert_eq!(policy.on_close(), Some(Duration::from_millis(400)));
        assert_eq!(policy.attempts_made(), 3);
        assert_eq!(policy.on_close(), None);
        assert_eq!(policy.on_close(), None);
    }

    #[test]
    fn successful_open_resets_backoff() {
        let mut policy = ReconnectPolicy::new(3, Duration::from_millis(100));
        policy.on_close();
        policy.on_close();
        policy.on_open();
        assert_eq!(policy.on_close(), Some(Duration::from_millis(100)));
    }

    #[test]
    fn connection_state_follows_signals() {
        let mut channel = channel();
        assert_eq!(channel.connection(), ConnectionState::Connecting);
        channel.on_signal(ChannelSignal::Opened, 0.0);
        assert_eq!(channel.connection(), ConnectionState::Open);
        channel.on_signal(
            ChannelSignal::Retrying {
                attempt: 1,
                delay: Duration::from_secs(1),
            },
            0.0,
        );
        assert_eq!(channel.connection(), ConnectionState::Retrying { attempt: 1 });
        channel.on_signal(ChannelSignal::GaveUp, 0.0);
        assert_eq!(channel.connection(), ConnectionState::Offline);
    }

    #[test]
    fn switching_collection_drops_session_state() {
        let mut channel = channel();
        frame(
            &mut channel,
            r#"{"type":"source_updated","data":{"source_id":"s1","status":"processing"}}"#,
            0.0,
        );
        channel.begin_build(0.0);
        assert!(channel.set_active_collection(Some("nb2".to_owned())));
        assert!(channel.processing().is_empty());
        assert!(!channel.build().is_active());
        assert!(!channel.set_active_collection(Some("nb2".to_owned())));
    }
}
