pub use kurbo::{Point, Rect, Vec2};

/// Fixed simulation step: one tick per rendered frame at 60 fps.
pub const TICK_SECS: f64 = 1.0 / 60.0;

/// Replacement duration for transitions declared with `duration == 0`, so
/// span arithmetic never divides by zero.
pub const MIN_DURATION_SECS: f64 = 1.0 / 59.0;

/// The closed set of per-particle animated properties.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Property {
    X,
    Y,
    R,
    G,
    B,
    Dir,
    Radius,
    Alpha,
}

impl Property {
    pub const COUNT: usize = 8;

    pub const ALL: [Property; Property::COUNT] = [
        Property::X,
        Property::Y,
        Property::R,
        Property::G,
        Property::B,
        Property::Dir,
        Property::Radius,
        Property::Alpha,
    ];

    /// Engine-wide default used when a property is never set at transition 0.
    pub fn default_value(self) -> f64 {
        match self {
            Property::X | Property::Y | Property::Radius => 50.0,
            Property::R | Property::G | Property::B | Property::Dir => 0.0,
            Property::Alpha => 1.0,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Property::X => 0,
            Property::Y => 1,
            Property::R => 2,
            Property::G => 3,
            Property::B => 4,
            Property::Dir => 5,
            Property::Radius => 6,
            Property::Alpha => 7,
        }
    }

    pub fn is_color(self) -> bool {
        matches!(self, Property::R | Property::G | Property::B)
    }

    pub fn name(self) -> &'static str {
        match self {
            Property::X => "x",
            Property::Y => "y",
            Property::R => "r",
            Property::G => "g",
            Property::B => "b",
            Property::Dir => "dir",
            Property::Radius => "radius",
            Property::Alpha => "alpha",
        }
    }
}

/// Live property values for one particle. A fixed struct, not a dynamic bag;
/// values are unclamped during interpolation and clamped only at draw time.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PropertyState {
    pub x: f64,
    pub y: f64,
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub dir: f64,
    pub radius: f64,
    pub alpha: f64,
}

impl Default for PropertyState {
    fn default() -> Self {
        Self {
            x: Property::X.default_value(),
            y: Property::Y.default_value(),
            r: Property::R.default_value(),
            g: Property::G.default_value(),
            b: Property::B.default_value(),
            dir: Property::Dir.default_value(),
            radius: Property::Radius.default_value(),
            alpha: Property::Alpha.default_value(),
        }
    }
}

impl PropertyState {
    pub fn get(&self, prop: Property) -> f64 {
        match prop {
            Property::X => self.x,
            Property::Y => self.y,
            Property::R => self.r,
            Property::G => self.g,
            Property::B => self.b,
            Property::Dir => self.dir,
            Property::Radius => self.radius,
            Property::Alpha => self.alpha,
        }
    }

    pub fn set(&mut self, prop: Property, value: f64) {
        match prop {
            Property::X => self.x = value,
            Property::Y => self.y = value,
            Property::R => self.r = value,
            Property::G => self.g = value,
            Property::B => self.b = value,
            Property::Dir => self.dir = value,
            Property::Radius => self.radius = value,
            Property::Alpha => self.alpha = value,
        }
    }

    /// Axis-aligned footprint: a square of side `2 * radius` centered on (x, y).
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.x - self.radius,
            self.y - self.radius,
            self.x + self.radius,
            self.y + self.radius,
        )
    }

    /// Quantized 8-bit color key (floored, clamped), used to group particles
    /// in the sheet renderer.
    pub fn color8(&self) -> Rgb8 {
        fn chan(v: f64) -> u8 {
            v.floor().clamp(0.0, 255.0) as u8
        }

        Rgb8 {
            r: chan(self.r),
            g: chan(self.g),
            b: chan(self.b),
        }
    }
}

/// Opaque 8-bit RGB color, the grouping key for batched rendering.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}
