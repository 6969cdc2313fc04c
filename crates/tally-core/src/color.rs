#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0, 255);
    pub const WHITE: Color = Color(255, 255, 255, 255);

    /// `#RRGGBB` or `#RRGGBBAA`. Anything else parses as opaque black.
    pub fn from_hex(hex: &str) -> Self {
        let s = hex.trim_start_matches('#');
        let byte = |i: usize, default: u8| {
            s.get(i..i + 2)
                .and_then(|p| u8::from_str_radix(p, 16).ok())
                .unwrap_or(default)
        };
        match s.len() {
            6 => Color(byte(0, 0), byte(2, 0), byte(4, 0), 255),
            8 => Color(byte(0, 0), byte(2, 0), byte(4, 0), byte(6, 255)),
            _ => Color::BLACK,
        }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Color(self.0, self.1, self.2, a)
    }

    /// Scales alpha by `f` (0..=1).
    pub fn fade(self, f: f32) -> Self {
        let a = (self.3 as f32 * f.clamp(0.0, 1.0)).round() as u8;
        self.with_alpha(a)
    }

    pub fn to_linear(self) -> [f32; 4] {
        fn srgb_to_linear(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [
            srgb_to_linear(self.0 as f32 / 255.0),
            srgb_to_linear(self.1 as f32 / 255.0),
            srgb_to_linear(self.2 as f32 / 255.0),
            self.3 as f32 / 255.0,
        ]
    }
}
