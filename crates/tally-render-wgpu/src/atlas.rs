use ahash::AHashMap;
use tally_text::GlyphKey;

/// Row-based ("shelf") allocator for glyph rectangles with a 1px gutter.
#[derive(Debug)]
pub struct ShelfPacker {
    size: u32,
    next_x: u32,
    next_y: u32,
    row_h: u32,
}

impl ShelfPacker {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            next_x: 1,
            next_y: 1,
            row_h: 0,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// Top-left of a free `w`x`h` slot, or `None` when the atlas is full.
    pub fn alloc(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if w + 2 > self.size || h + 2 > self.size {
            return None;
        }
        if self.next_x + w + 1 > self.size {
            self.next_x = 1;
            self.next_y += self.row_h + 1;
            self.row_h = 0;
        }
        if self.next_y + h + 1 > self.size {
            return None;
        }
        let pos = (self.next_x, self.next_y);
        self.next_x += w + 1;
        self.row_h = self.row_h.max(h);
        Some(pos)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphInfo {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
    pub w: f32,
    pub h: f32,
}

/// Single-channel glyph atlas texture.
pub struct GlyphAtlas {
    pub tex: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    packer: ShelfPacker,
    map: AHashMap<GlyphKey, GlyphInfo>,
    warned_full: bool,
}

impl GlyphAtlas {
    pub fn new(device: &wgpu::Device, size: u32) -> Self {
        let tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glyph atlas A8"),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = tex.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("glyph sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            tex,
            view,
            sampler,
            packer: ShelfPacker::new(size),
            map: AHashMap::new(),
            warned_full: false,
        }
    }

    /// Cached atlas slot for `key`, rasterizing and uploading on first use.
    /// `None` for empty glyphs (spaces), color glyphs and a full atlas.
    pub fn glyph(&mut self, queue: &wgpu::Queue, key: GlyphKey) -> Option<GlyphInfo> {
        if let Some(info) = self.map.get(&key) {
            return Some(*info);
        }

        let gb = tally_text::rasterize(key)?;
        if gb.w == 0 || gb.h == 0 || gb.data.is_empty() {
            return None;
        }
        if gb.format != tally_text::GlyphFormat::Mask {
            log::debug!("skipping non-mask glyph {:?}", key);
            return None;
        }

        let Some((x, y)) = self.packer.alloc(gb.w, gb.h) else {
            if !self.warned_full {
                log::warn!(
                    "glyph atlas {}px is full; further glyphs are dropped",
                    self.packer.size()
                );
                self.warned_full = true;
            }
            return None;
        };

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.tex,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            &gb.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(gb.w),
                rows_per_image: Some(gb.h),
            },
            wgpu::Extent3d {
                width: gb.w,
                height: gb.h,
                depth_or_array_layers: 1,
            },
        );

        let s = self.packer.size() as f32;
        let info = GlyphInfo {
            u0: x as f32 / s,
            v0: y as f32 / s,
            u1: (x + gb.w) as f32 / s,
            v1: (y + gb.h) as f32 / s,
            w: gb.w as f32,
            h: gb.h as f32,
        };
        self.map.insert(key, info);
        Some(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packer_fills_rows_then_wraps() {
        let mut p = ShelfPacker::new(32);
        assert_eq!(p.alloc(10, 5), Some((1, 1)));
        assert_eq!(p.alloc(10, 8), Some((12, 1)));
        // 23 + 10 + 1 > 32: next row starts below the tallest glyph
        assert_eq!(p.alloc(10, 4), Some((1, 10)));
    }

    #[test]
    fn test_packer_reports_full() {
        let mut p = ShelfPacker::new(16);
        assert_eq!(p.alloc(14, 14), Some((1, 1)));
        assert_eq!(p.alloc(1, 1), None);
    }

    #[test]
    fn test_packer_rejects_oversized() {
        let mut p = ShelfPacker::new(16);
        assert_eq!(p.alloc(15, 2), None);
    }
}
