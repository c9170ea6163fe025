//! Tuning constants shared by the control loop and headless tooling.
//!
//! Values that are not meant to be operator-configurable live here;
//! everything an operator may tune is in [`crate::config`].

/// Power draw curve constants.
pub mod power {
    /// Idle draw of the generator in units, independent of field power.
    pub const BASELINE_DRAW: f32 = 50.0;

    /// Fraction of total generation capacity claimed during siege.
    pub const SIEGE_DRAW_FRACTION: f32 = 0.9;

    /// Fraction of total generation capacity the field can draw at full power.
    pub const FIELD_DRAW_FRACTION: f32 = 0.3;
}

/// Siege mode constants.
pub mod siege {
    /// Damage modifier written directly while the siege override is engaged.
    pub const OVERRIDE_MODIFIER: f32 = 0.1;

    /// Generation capacity above which the steep override engages on entry.
    pub const OVERRIDE_POWER_FLOOR: f32 = 150.0;

    /// Simulation ticks per displayed countdown second.
    pub const DISPLAY_TICKS_PER_SECOND: i32 = 60;
}

/// Grid damage modifier constants.
pub mod modifier {
    /// Modifier published when the generator is non-functional. Neutral:
    /// the structure takes unscaled damage.
    pub const DISABLED: f32 = 1.0;
}

/// Control loop cadence constants.
pub mod cadence {
    /// Simulation ticks per control cycle.
    pub const CONTROL_CYCLE_STEP: i32 = 10;

    /// Control cycles between a settings edit and its flush (~1 second).
    /// Coalesces held increase/decrease actions into one write.
    pub const SETTINGS_FLUSH_CYCLES: i32 = 60 / CONTROL_CYCLE_STEP;
}

/// Notification constants.
pub mod notify {
    /// Radius in units within which observers receive broadcast notices.
    pub const NEARBY_RADIUS: f32 = 50.0;

    /// Display duration for status notices, in milliseconds.
    pub const STATUS_DURATION_MS: u32 = 1500;
}
