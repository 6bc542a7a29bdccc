//! Host-facing context: events, asset registry and classifier view.
//!
//! Actions and conditions never touch a global engine. Everything they read
//! or write is injected through an [`ActionContext`]:
//!
//! - [`EventSink`] receives the [`EngineEvent`]s an action emits
//! - [`AssetRegistry`] tracks which media assets are active
//! - [`Classifier`] exposes the feedback and parameter nodes of the running graph
//! - an [`RngCore`] drives randomized parameter updates

use std::collections::HashMap;

use neuro_core::Color;
use rand::RngCore;

use crate::NodeId;

/// Side effect requested by an action or a node.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// Start audio playback. `num_loops` is `-1` for endless looping.
    PlayAudio {
        /// Media location.
        url: String,
        /// Loop count, `-1` loops forever.
        num_loops: i32,
        /// Volume in `[0, 1]`.
        volume: f64,
        /// Play while downloading.
        allow_streaming: bool,
    },
    /// Stop audio playback.
    StopAudio {
        /// Media location.
        url: String,
    },
    /// Pause or resume audio playback.
    PauseAudio {
        /// Media location.
        url: String,
        /// Resume instead of pausing.
        unpause: bool,
    },
    /// Jump to a position in an audio file.
    SeekAudio {
        /// Media location.
        url: String,
        /// Target position in milliseconds.
        millis: u32,
    },
    /// Show an image.
    ShowImage {
        /// Media location.
        url: String,
    },
    /// Hide the current image.
    HideImage,
    /// Show a text overlay.
    ShowText {
        /// Text after placeholder substitution.
        text: String,
        /// Text color.
        color: Color,
    },
    /// Hide the text overlay.
    HideText,
    /// Change the background color.
    SetBackgroundColor {
        /// New background color.
        color: Color,
    },
    /// Switch the session to another stage.
    SwitchStage(i32),
    /// Switch to another application.
    SwitchApplication(String),
    /// Free-form command for the host.
    Command(String),
    /// Start video playback. `num_loops` is `-1` for endless looping.
    PlayVideo {
        /// Media location.
        url: String,
        /// Loop count, `-1` loops forever.
        num_loops: i32,
        /// Volume in `[0, 1]`.
        volume: f64,
        /// Play while downloading.
        allow_streaming: bool,
    },
    /// Stop video playback.
    StopVideo,
    /// Pause or resume video playback.
    PauseVideo {
        /// Media location.
        url: String,
        /// Resume instead of pausing.
        unpause: bool,
    },
    /// Jump to a position in a video.
    SeekVideo {
        /// Media location.
        url: String,
        /// Target position in milliseconds.
        millis: u32,
    },
    /// Remove every interactive button.
    ClearButtons,
    /// Open a web page.
    OpenUrl(String),
    /// Start the embedded browser player.
    BrowserStartPlayer {
        /// Playback progress in `[0, 1]`.
        progress: f64,
        /// Fullscreen playback.
        fullscreen: bool,
    },
    /// Stop the embedded browser player.
    BrowserStopPlayer,
    /// Pause the embedded browser player.
    BrowserPausePlayer,
    /// An attribute's visibility changed. `node` is `None` for actions and conditions.
    AttributeUpdated {
        /// Owning node.
        node: Option<NodeId>,
        /// Attribute id.
        attribute: &'static str,
    },
}

/// Receives emitted events.
pub trait EventSink {
    /// Delivers one event.
    fn emit(&mut self, event: EngineEvent);
}

impl EventSink for Vec<EngineEvent> {
    fn emit(&mut self, event: EngineEvent) {
        self.push(event);
    }
}

/// Kind of media asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetGroup {
    /// Sounds and music.
    Audio,
    /// Still images.
    Image,
    /// Videos.
    Video,
    /// Everything else.
    Other,
}

/// Whether an asset is currently in use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AssetState {
    /// In use by a running action.
    Active,
    /// Not in use.
    #[default]
    Inactive,
}

/// Activity of every media asset referenced by actions.
#[derive(Clone, Debug, Default)]
pub struct AssetRegistry {
    assets: HashMap<String, (AssetGroup, AssetState)>,
}

impl AssetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the state of one asset.
    pub fn set_asset_activity(&mut self, name: &str, group: AssetGroup, state: AssetState) {
        self.assets.insert(name.to_string(), (group, state));
    }

    /// Sets the state of every known asset in `group`.
    pub fn set_asset_group_activity(&mut self, group: AssetGroup, state: AssetState) {
        for entry in self.assets.values_mut().filter(|(g, _)| *g == group) {
            entry.1 = state;
        }
    }

    /// State of one asset. Unknown assets are inactive.
    pub fn state(&self, name: &str) -> AssetState {
        self.assets.get(name).map(|(_, s)| *s).unwrap_or_default()
    }

    /// Whether an asset is active.
    pub fn is_active(&self, name: &str) -> bool {
        self.state(name) == AssetState::Active
    }

    /// Names of every active asset in `group`.
    pub fn active_assets(&self, group: AssetGroup) -> impl Iterator<Item = &str> {
        self.assets
            .iter()
            .filter(move |(_, (g, s))| *g == group && *s == AssetState::Active)
            .map(|(name, _)| name.as_str())
    }
}

/// Newest values of a feedback node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeedbackReading<'a> {
    /// One value per channel.
    pub values: &'a [f64],
    /// No sample has arrived yet.
    pub is_empty: bool,
}

impl FeedbackReading<'_> {
    /// Value of the first channel.
    pub fn current_value(&self) -> f64 {
        self.values.first().copied().unwrap_or(0.0)
    }
}

/// Read/write view of the feedback and parameter nodes of a running graph.
pub trait Classifier {
    /// Names of every feedback node, in creation order.
    fn feedback_names(&self) -> Vec<String>;

    /// Feedback node called `name`.
    fn feedback(&self, name: &str) -> Option<FeedbackReading<'_>>;

    /// Channel values of the parameter node called `name`.
    fn parameter_values(&self, name: &str) -> Option<&[f64]>;

    /// Sets one channel of the parameter node called `name`.
    ///
    /// Returns `false` if the node or the channel does not exist.
    fn set_parameter_value(&mut self, name: &str, channel: usize, value: f64) -> bool;
}

/// Everything an action needs from its environment.
pub struct ActionContext<'a> {
    /// Media asset activity.
    pub assets: &'a mut AssetRegistry,
    /// Destination of emitted events.
    pub events: &'a mut dyn EventSink,
    /// Running graph, if any.
    pub classifier: Option<&'a mut dyn Classifier>,
    /// Randomness for randomized updates.
    pub rng: &'a mut dyn RngCore,
}
