//! Single-line text shaping and glyph rasterization.
//!
//! One process-wide font system and swash cache back both calls; they are
//! guarded by a mutex because the renderer asks for glyphs from wherever it
//! runs.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use ahash::AHasher;
use cosmic_text::{
    Attrs, Buffer, CacheKey, FontSystem, Metrics, Shaping, SwashCache, SwashContent, SwashImage,
};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

/// Compact atlas key for one rasterized glyph (font, size, subpixel offset).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphKey(pub u64);

/// A glyph placed on a line. `x`/`y` are the pen position relative to the
/// line's top-left, `y` being the baseline.
#[derive(Clone, Debug)]
pub struct ShapedGlyph {
    pub key: GlyphKey,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub bearing_x: f32,
    pub bearing_y: f32,
    pub advance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphFormat {
    /// One coverage byte per pixel.
    Mask,
    /// RGBA8 (color emoji, subpixel masks).
    Rgba,
}

pub struct GlyphBitmap {
    pub key: GlyphKey,
    pub w: u32,
    pub h: u32,
    pub format: GlyphFormat,
    pub data: Vec<u8>,
}

struct Engine {
    fs: FontSystem,
    cache: SwashCache,
    key_map: HashMap<GlyphKey, CacheKey>,
}

impl Engine {
    fn image(&mut self, key: CacheKey) -> Option<SwashImage> {
        self.cache.get_image(&mut self.fs, key).clone()
    }

    fn buffer(&mut self, text: &str, px: f32) -> Buffer {
        let mut buf = Buffer::new(&mut self.fs, Metrics::new(px, px * 1.3));
        {
            let mut b = buf.borrow_with(&mut self.fs);
            b.set_size(None, None);
            b.set_text(text, &Attrs::new(), Shaping::Advanced, None);
            b.shape_until_scroll(true);
        }
        buf
    }
}

static ENGINE: OnceCell<Mutex<Engine>> = OnceCell::new();

fn engine() -> &'static Mutex<Engine> {
    ENGINE.get_or_init(|| {
        let fs = FontSystem::new();
        log::debug!("font system ready, {} faces", fs.db().len());
        Mutex::new(Engine {
            fs,
            cache: SwashCache::new(),
            key_map: HashMap::new(),
        })
    })
}

fn key_from_cachekey(k: &CacheKey) -> GlyphKey {
    let mut h = AHasher::default();
    k.hash(&mut h);
    GlyphKey(h.finish())
}

/// Shapes `text` as one line at `px` pixels.
pub fn shape_line(text: &str, px: f32) -> Vec<ShapedGlyph> {
    if text.is_empty() || px <= 0.0 {
        return Vec::new();
    }
    let mut eng = engine().lock();
    let buf = eng.buffer(text, px);

    let mut out = Vec::new();
    for run in buf.layout_runs() {
        for g in run.glyphs {
            let phys = g.physical((0.0, run.line_y), 1.0);
            let key = key_from_cachekey(&phys.cache_key);
            eng.key_map.insert(key, phys.cache_key);

            let (w, h, left, top) = match eng.image(phys.cache_key) {
                Some(img) => (
                    img.placement.width as f32,
                    img.placement.height as f32,
                    img.placement.left as f32,
                    img.placement.top as f32,
                ),
                None => (0.0, 0.0, 0.0, 0.0),
            };

            out.push(ShapedGlyph {
                key,
                x: phys.x as f32,
                y: phys.y as f32,
                w,
                h,
                bearing_x: left,
                bearing_y: top,
                advance: g.w,
            });
        }
    }
    out
}

/// Advance width of `text` as one line.
pub fn line_width(text: &str, px: f32) -> f32 {
    shape_line(text, px)
        .last()
        .map(|g| g.x + g.advance)
        .unwrap_or(0.0)
}

/// Pixels for a glyph previously returned by `shape_line`.
pub fn rasterize(key: GlyphKey) -> Option<GlyphBitmap> {
    let mut eng = engine().lock();
    let ck = *eng.key_map.get(&key)?;
    let img = eng.image(ck)?;
    let format = match img.content {
        SwashContent::Mask => GlyphFormat::Mask,
        SwashContent::Color | SwashContent::SubpixelMask => GlyphFormat::Rgba,
    };
    Some(GlyphBitmap {
        key,
        w: img.placement.width,
        h: img.placement.height,
        format,
        data: img.data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_no_glyphs() {
        assert!(shape_line("", 16.0).is_empty());
        assert_eq!(line_width("", 16.0), 0.0);
    }

    #[test]
    fn test_unknown_key_does_not_rasterize() {
        assert!(rasterize(GlyphKey(0xDEAD_BEEF)).is_none());
    }

    #[test]
    fn test_glyphs_advance_left_to_right() {
        // Glyph count depends on installed fonts; ordering must hold regardless.
        let glyphs = shape_line("Incremented", 16.0);
        assert!(glyphs.windows(2).all(|w| w[0].x <= w[1].x));
    }
}
