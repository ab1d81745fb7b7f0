//! Shared resources wrapping the core session and configuration

use bevy::prelude::*;
use pinpoint_core::{SessionSettings, ViewerConfig, ViewerSession};
use std::ops::{Deref, DerefMut};

/// The viewer session as a Bevy resource. All annotation state lives here.
#[derive(Resource, Debug, Default)]
pub struct Session(pub ViewerSession);

impl Session {
    pub fn from_config(config: &ViewerConfig) -> Self {
        Self(ViewerSession::new(SessionSettings::from(config)))
    }
}

impl Deref for Session {
    type Target = ViewerSession;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Loaded configuration, read by setup systems
#[derive(Resource, Debug, Clone, Default)]
pub struct ViewerSettings(pub ViewerConfig);

impl Deref for ViewerSettings {
    type Target = ViewerConfig;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Text buffer of the hotspot name prompt
#[derive(Resource, Debug, Default)]
pub struct NamePrompt {
    pub text: String,
    /// Set when the prompt opens so the text field grabs keyboard focus once
    pub request_focus: bool,
}

impl NamePrompt {
    pub fn open(&mut self) {
        self.text.clear();
        self.request_focus = true;
    }

    pub fn take(&mut self) -> String {
        self.request_focus = false;
        std::mem::take(&mut self.text)
    }
}

pub fn color_from_rgb(rgb: [f32; 3]) -> Color {
    Color::srgb(rgb[0], rgb[1], rgb[2])
}
