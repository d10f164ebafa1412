use crate::paint::Color;
use crate::paint::gradient::LinearGradient;

/// Paint source for filling regions on the 2D surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    LinearGradient(LinearGradient),
}

impl Paint {
    #[inline]
    pub fn solid(color: Color) -> Self {
        Paint::Solid(color)
    }

    #[inline]
    pub fn is_opaque(&self) -> bool {
        match self {
            Paint::Solid(c) => c.a >= 1.0,
            Paint::LinearGradient(g) => g.stops.iter().all(|s| s.color.a >= 1.0),
        }
    }
}

impl From<Color> for Paint {
    #[inline]
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

impl From<LinearGradient> for Paint {
    #[inline]
    fn from(gradient: LinearGradient) -> Self {
        Paint::LinearGradient(gradient)
    }
}
