//! One-shot side effects fired by the state machine.
//!
//! An [`Action`] is a closed [`ActionKind`] plus the attributes that kind
//! declares. [`Action::execute`] reads the attributes, emits one
//! [`EngineEvent`] into the context's sink and records which media assets
//! are now in use. Actions that need the running graph (placeholder
//! substitution, parameter updates) reach it through the context's
//! [`Classifier`] view.
//!
//! ```rust
//! use neuro_engine::{Action, ActionContext, ActionKind, AssetRegistry, EngineEvent};
//! use rand::SeedableRng;
//!
//! let mut action = Action::new(ActionKind::PlayAudio);
//! action.set_attribute("url", "rain.ogg".into()).unwrap();
//!
//! let mut assets = AssetRegistry::new();
//! let mut events: Vec<EngineEvent> = Vec::new();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(0);
//! let mut ctx = ActionContext {
//!     assets: &mut assets,
//!     events: &mut events,
//!     classifier: None,
//!     rng: &mut rng,
//! };
//! action.execute(&mut ctx).unwrap();
//!
//! assert!(assets.is_active("rain.ogg"));
//! assert!(matches!(&events[0], EngineEvent::PlayAudio { num_loops: 1, .. }));
//! ```

use std::fmt;

use neuro_core::{Attribute, AttributeError, AttributeSet, AttributeValue, Color, rgba};

use crate::context::{
    ActionContext, AssetGroup, AssetState, Classifier, EngineEvent,
};
use crate::error::ActionError;
use crate::parameter_action;

/// Every action the state machine can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Start an audio file.
    PlayAudio,
    /// Stop an audio file.
    StopAudio,
    /// Pause or resume an audio file.
    PauseAudio,
    /// Jump within an audio file.
    SeekAudio,
    /// Show an image.
    ShowImage,
    /// Hide the current image.
    HideImage,
    /// Show a text overlay with feedback placeholders.
    ShowText,
    /// Hide the text overlay.
    HideText,
    /// Change the background color.
    SetBackgroundColor,
    /// Free-form host command.
    Command,
    /// Start a video.
    PlayVideo,
    /// Stop the current video.
    StopVideo,
    /// Pause or resume a video.
    PauseVideo,
    /// Jump within a video.
    SeekVideo,
    /// Update a parameter node.
    Parameter,
    /// Remove every interactive button.
    ClearButtons,
    /// Open a web page.
    OpenUrl,
    /// Start the embedded browser player.
    BrowserStartPlayer,
    /// Stop the embedded browser player.
    BrowserStopPlayer,
    /// Pause the embedded browser player.
    BrowserPausePlayer,
}

impl ActionKind {
    /// Every kind, in registration order.
    pub const ALL: [Self; 20] = [
        Self::PlayAudio,
        Self::StopAudio,
        Self::PauseAudio,
        Self::SeekAudio,
        Self::ShowImage,
        Self::HideImage,
        Self::ShowText,
        Self::HideText,
        Self::SetBackgroundColor,
        Self::Command,
        Self::PlayVideo,
        Self::StopVideo,
        Self::PauseVideo,
        Self::SeekVideo,
        Self::Parameter,
        Self::ClearButtons,
        Self::OpenUrl,
        Self::BrowserStartPlayer,
        Self::BrowserStopPlayer,
        Self::BrowserPausePlayer,
    ];

    /// Stable snake_case name used in graph files.
    pub fn name(self) -> &'static str {
        match self {
            Self::PlayAudio => "play_audio",
            Self::StopAudio => "stop_audio",
            Self::PauseAudio => "pause_audio",
            Self::SeekAudio => "seek_audio",
            Self::ShowImage => "show_image",
            Self::HideImage => "hide_image",
            Self::ShowText => "show_text",
            Self::HideText => "hide_text",
            Self::SetBackgroundColor => "set_background_color",
            Self::Command => "command",
            Self::PlayVideo => "play_video",
            Self::StopVideo => "stop_video",
            Self::PauseVideo => "pause_video",
            Self::SeekVideo => "seek_video",
            Self::Parameter => "parameter",
            Self::ClearButtons => "clear_buttons",
            Self::OpenUrl => "open_url",
            Self::BrowserStartPlayer => "browser_start_player",
            Self::BrowserStopPlayer => "browser_stop_player",
            Self::BrowserPausePlayer => "browser_pause_player",
        }
    }

    /// Looks up a kind by its [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_text_color() -> Color {
    Color::from_u32(rgba(0, 159, 227, 255))
}

fn register(kind: ActionKind, attributes: &mut AttributeSet) {
    use ActionKind as K;
    match kind {
        K::PlayAudio | K::PlayVideo => {
            attributes.add(Attribute::text("url", "URL", ""));
            attributes.add(Attribute::float("volume", "Volume", 1.0, 0.0, 1.0));
            attributes.add(Attribute::boolean("is_looping", "Loop Forever", false));
            attributes.add(Attribute::int("num_loops", "Num Loops", 1, 0, i32::MAX));
            attributes.add(Attribute::boolean("streaming", "Allow Streaming", false));
        }
        K::StopAudio | K::ShowImage | K::OpenUrl => {
            attributes.add(Attribute::text("url", "URL", ""));
        }
        K::PauseAudio | K::PauseVideo => {
            attributes.add(Attribute::text("url", "URL", ""));
            attributes.add(Attribute::boolean("unpause", "Unpause", false));
        }
        K::SeekAudio | K::SeekVideo => {
            attributes.add(Attribute::text("url", "URL", ""));
            attributes.add(Attribute::float("position", "Position (s)", 1.0, 0.0, f64::MAX));
        }
        K::ShowText => {
            attributes.add(Attribute::text("text", "Text", "Example text"));
            attributes.add(Attribute::color("color", "Color", default_text_color()));
        }
        K::SetBackgroundColor => {
            attributes.add(Attribute::color("color", "Color", default_text_color()));
        }
        K::Command => {
            attributes.add(Attribute::text("command", "Command", ""));
        }
        K::Parameter => parameter_action::register(attributes),
        K::BrowserStartPlayer => {
            attributes.add(Attribute::float("progress", "Progress", 1.0, 0.0, 1.0));
            attributes.add(Attribute::boolean("fullscreen", "Fullscreen", false));
        }
        K::HideImage
        | K::HideText
        | K::StopVideo
        | K::ClearButtons
        | K::BrowserStopPlayer
        | K::BrowserPausePlayer => {}
    }
}

/// A configured action.
#[derive(Debug, Clone)]
pub struct Action {
    kind: ActionKind,
    attributes: AttributeSet,
    events: Vec<EngineEvent>,
}

impl Action {
    /// Creates an action with default attributes.
    pub fn new(kind: ActionKind) -> Self {
        let mut attributes = AttributeSet::new();
        register(kind, &mut attributes);
        Self {
            kind,
            attributes,
            events: Vec::new(),
        }
    }

    /// The action's kind.
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Current attributes.
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Writes one attribute and refreshes dependent visibility.
    ///
    /// Returns whether the stored value changed.
    pub fn set_attribute(&mut self, id: &str, value: AttributeValue) -> Result<bool, AttributeError> {
        let changed = self.attributes.set(id, value)?;
        if changed {
            self.update_visibility();
        }
        Ok(changed)
    }

    /// Takes every `AttributeUpdated` event raised since the last call.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn update_visibility(&mut self) {
        let toggles: Vec<(&'static str, bool)> = match self.kind {
            ActionKind::PlayAudio | ActionKind::PlayVideo => {
                vec![("num_loops", !self.attributes.boolean("is_looping"))]
            }
            ActionKind::Parameter => {
                parameter_action::visibility(parameter_action::function(&self.attributes)).to_vec()
            }
            _ => Vec::new(),
        };
        for (id, visible) in toggles {
            if self.attributes.set_visible(id, visible) {
                self.events.push(EngineEvent::AttributeUpdated {
                    node: None,
                    attribute: id,
                });
            }
        }
    }

    /// Fires the action.
    ///
    /// A failed action emits nothing and is logged at warn level.
    pub fn execute(&mut self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        tracing::debug!("action_execute: {}", self.kind);
        let result = self.run(ctx);
        if let Err(e) = &result {
            tracing::warn!("{} action skipped: {e}", self.kind);
        }
        result
    }

    fn run(&self, ctx: &mut ActionContext<'_>) -> Result<(), ActionError> {
        let a = &self.attributes;
        let url = || a.text("url").to_string();
        let event = match self.kind {
            ActionKind::PlayAudio | ActionKind::PlayVideo => {
                let num_loops = if a.boolean("is_looping") {
                    -1
                } else {
                    a.int("num_loops")
                };
                if self.kind == ActionKind::PlayAudio {
                    ctx.assets
                        .set_asset_activity(a.text("url"), AssetGroup::Audio, AssetState::Active);
                    EngineEvent::PlayAudio {
                        url: url(),
                        num_loops,
                        volume: a.float("volume"),
                        allow_streaming: a.boolean("streaming"),
                    }
                } else {
                    ctx.assets
                        .set_asset_group_activity(AssetGroup::Video, AssetState::Inactive);
                    ctx.assets
                        .set_asset_activity(a.text("url"), AssetGroup::Video, AssetState::Active);
                    EngineEvent::PlayVideo {
                        url: url(),
                        num_loops,
                        volume: a.float("volume"),
                        allow_streaming: a.boolean("streaming"),
                    }
                }
            }
            ActionKind::StopAudio => {
                ctx.assets
                    .set_asset_activity(a.text("url"), AssetGroup::Audio, AssetState::Inactive);
                EngineEvent::StopAudio { url: url() }
            }
            ActionKind::PauseAudio | ActionKind::PauseVideo => {
                let unpause = a.boolean("unpause");
                let state = if unpause {
                    AssetState::Active
                } else {
                    AssetState::Inactive
                };
                if self.kind == ActionKind::PauseAudio {
                    ctx.assets
                        .set_asset_activity(a.text("url"), AssetGroup::Audio, state);
                    EngineEvent::PauseAudio { url: url(), unpause }
                } else {
                    ctx.assets
                        .set_asset_activity(a.text("url"), AssetGroup::Video, state);
                    EngineEvent::PauseVideo { url: url(), unpause }
                }
            }
            ActionKind::SeekAudio => EngineEvent::SeekAudio {
                url: url(),
                millis: seconds_to_millis(a.float("position")),
            },
            ActionKind::SeekVideo => EngineEvent::SeekVideo {
                url: url(),
                millis: seconds_to_millis(a.float("position")),
            },
            ActionKind::ShowImage => {
                ctx.assets
                    .set_asset_group_activity(AssetGroup::Image, AssetState::Inactive);
                ctx.assets
                    .set_asset_activity(a.text("url"), AssetGroup::Image, AssetState::Active);
                EngineEvent::ShowImage { url: url() }
            }
            ActionKind::HideImage => {
                ctx.assets
                    .set_asset_group_activity(AssetGroup::Image, AssetState::Inactive);
                EngineEvent::HideImage
            }
            ActionKind::ShowText => EngineEvent::ShowText {
                text: substitute_placeholders(a.text("text"), ctx.classifier.as_deref()),
                color: a.color("color"),
            },
            ActionKind::HideText => EngineEvent::HideText,
            ActionKind::SetBackgroundColor => EngineEvent::SetBackgroundColor {
                color: a.color("color"),
            },
            ActionKind::Command => {
                let command = a.text("command").trim();
                if command.is_empty() {
                    return Ok(());
                }
                if let Some(event) = legacy_switch(command) {
                    ctx.events.emit(event);
                }
                EngineEvent::Command(command.to_string())
            }
            ActionKind::StopVideo => {
                ctx.assets
                    .set_asset_group_activity(AssetGroup::Video, AssetState::Inactive);
                EngineEvent::StopVideo
            }
            ActionKind::Parameter => {
                return parameter_action::execute(a, ctx.classifier.as_deref_mut(), ctx.rng);
            }
            ActionKind::ClearButtons => EngineEvent::ClearButtons,
            ActionKind::OpenUrl => EngineEvent::OpenUrl(url()),
            ActionKind::BrowserStartPlayer => EngineEvent::BrowserStartPlayer {
                progress: a.float("progress"),
                fullscreen: a.boolean("fullscreen"),
            },
            ActionKind::BrowserStopPlayer => EngineEvent::BrowserStopPlayer,
            ActionKind::BrowserPausePlayer => EngineEvent::BrowserPausePlayer,
        };
        ctx.events.emit(event);
        Ok(())
    }
}

fn seconds_to_millis(seconds: f64) -> u32 {
    (seconds * 1000.0) as u32
}

/// Replaces every `${Name}` with the current value of feedback node `Name`.
///
/// Without a classifier the text is returned unchanged.
fn substitute_placeholders(text: &str, classifier: Option<&dyn Classifier>) -> String {
    if !text.contains("${") {
        return text.to_string();
    }
    let Some(classifier) = classifier else {
        tracing::warn!("cannot replace placeholders in text '{text}': no active classifier");
        return text.to_string();
    };
    let mut out = text.to_string();
    for name in classifier.feedback_names() {
        if let Some(reading) = classifier.feedback(&name) {
            out = out.replace(
                &format!("${{{name}}}"),
                &format!("{:.2}", reading.current_value()),
            );
        }
    }
    out
}

/// `doSwitchStage <n>` and `doSwitchApplication <name>` map to dedicated events.
fn legacy_switch(command: &str) -> Option<EngineEvent> {
    let mut words = command.split_whitespace();
    let verb = words.next()?;
    let arg = words.next()?;
    if verb.eq_ignore_ascii_case("doSwitchStage") {
        Some(EngineEvent::SwitchStage(arg.parse().unwrap_or(0)))
    } else if verb.eq_ignore_ascii_case("doSwitchApplication") {
        Some(EngineEvent::SwitchApplication(arg.to_string()))
    } else {
        None
    }
}
