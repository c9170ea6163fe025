//! Status notices the core emits for the UI layer to render.
//!
//! The core only produces these; presentation (HUD slots, fonts, fading)
//! is the host's concern. Two lanes mirror the two reusable HUD slots so
//! a new notice replaces the previous one in the same lane.

use serde::{Deserialize, Serialize};

use aegisfield_logic::constants::notify::{NEARBY_RADIUS, STATUS_DURATION_MS};

use crate::context::DeviceId;

/// Display urgency hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Routine status - rendered in the calm style.
    Info,
    /// Something was refused or forced - rendered in the warning style.
    Alert,
}

/// Which HUD slot the notice replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLane {
    /// Field power and modifier feedback.
    FieldPower,
    /// Siege countdown and lifecycle messages.
    Countdown,
}

/// Who should see the notice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Audience {
    /// Only the client controlling the device.
    Controller,
    /// Everyone within `radius` units of the device.
    Nearby { radius: f32 },
}

/// A short status message with display hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub device: DeviceId,
    pub lane: NoticeLane,
    pub text: String,
    pub severity: Severity,
    pub duration_ms: u32,
    pub audience: Audience,
}

impl Notice {
    /// Status notice addressed to the controlling client.
    pub fn status(
        device: DeviceId,
        lane: NoticeLane,
        text: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            device,
            lane,
            text: text.into(),
            severity,
            duration_ms: STATUS_DURATION_MS,
            audience: Audience::Controller,
        }
    }

    /// Status notice broadcast to observers near the device.
    pub fn broadcast(
        device: DeviceId,
        lane: NoticeLane,
        text: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            device,
            lane,
            text: text.into(),
            severity,
            duration_ms: STATUS_DURATION_MS,
            audience: Audience::Nearby {
                radius: NEARBY_RADIUS,
            },
        }
    }
}
