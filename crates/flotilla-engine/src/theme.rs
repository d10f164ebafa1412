//! Ship visual themes.
//!
//! Gameplay code passes themes around as opaque ids; the ship shader
//! switches on the same numeric value.

/// Closed set of ship palettes/patterns.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum ShipTheme {
    #[default]
    Default = 0,
    /// Warm orange hull with flickering exhaust.
    Ember = 1,
    /// Pale cyan hull, banded stripes.
    Frost = 2,
    /// Dark violet hull, pulsing rim.
    Void = 3,
    /// Hue shift along the hull over time.
    Aurora = 4,
}

impl ShipTheme {
    pub const ALL: [ShipTheme; 5] = [
        ShipTheme::Default,
        ShipTheme::Ember,
        ShipTheme::Frost,
        ShipTheme::Void,
        ShipTheme::Aurora,
    ];

    /// Resolves an id; unknown ids map to [`ShipTheme::Default`].
    #[inline]
    pub fn from_id(id: u32) -> Self {
        Self::ALL.get(id as usize).copied().unwrap_or_default()
    }

    /// Resolves a name (case-insensitive); unknown names map to the default.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }

    #[inline]
    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            ShipTheme::Default => "default",
            ShipTheme::Ember => "ember",
            ShipTheme::Frost => "frost",
            ShipTheme::Void => "void",
            ShipTheme::Aurora => "aurora",
        }
    }
}

impl From<u32> for ShipTheme {
    #[inline]
    fn from(id: u32) -> Self {
        Self::from_id(id)
    }
}
