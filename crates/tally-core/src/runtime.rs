use std::rc::Rc;

use crate::{Locals, Rect, Scene, Vec2, View, semantics::Role};

/// Output of one compose + layout pass.
#[derive(Default)]
pub struct Frame {
    pub scene: Scene,
    /// Sorted by z-index, lowest first. The top-most region is the last match.
    pub hit_regions: Vec<HitRegion>,
    pub semantics_nodes: Vec<SemNode>,
    /// Some scroll container is still flinging and wants another frame.
    pub animating: bool,
}

impl Frame {
    pub fn semantics_by_label(&self, label: &str) -> Option<&SemNode> {
        self.semantics_nodes
            .iter()
            .find(|n| n.label.as_deref() == Some(label))
    }

    pub fn hit_region(&self, id: u64) -> Option<&HitRegion> {
        self.hit_regions.iter().find(|h| h.id == id)
    }
}

#[derive(Clone)]
pub struct HitRegion {
    pub id: u64,
    pub rect: Rect,
    pub on_click: Option<Rc<dyn Fn()>>,
    pub on_scroll: Option<Rc<dyn Fn(Vec2) -> Vec2>>,
    pub z_index: f32,
}

impl std::fmt::Debug for HitRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HitRegion")
            .field("id", &self.id)
            .field("rect", &self.rect)
            .field("on_click", &self.on_click.is_some())
            .field("on_scroll", &self.on_scroll.is_some())
            .field("z_index", &self.z_index)
            .finish()
    }
}

/// Flattened semantics node produced by layout.
#[derive(Clone, Debug, PartialEq)]
pub struct SemNode {
    /// Shared with the associated `HitRegion`.
    pub id: u64,
    /// From `Modifier::key` on the view or its nearest keyed ancestor.
    pub key: Option<u64>,
    pub role: Role,
    pub label: Option<String>,
    pub rect: Rect,
    pub enabled: bool,
}

/// Holds what the runner knows about the surface and rebuilds frames.
pub struct Scheduler {
    pub size: (u32, u32),
    pub locals: Locals,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            size: (1280, 800),
            locals: Locals::default(),
        }
    }

    pub fn compose<F>(
        &mut self,
        mut build_root: F,
        layout_paint: impl Fn(&View, (u32, u32), &Locals) -> Frame,
    ) -> Frame
    where
        F: FnMut(&Scheduler) -> View,
    {
        let root = build_root(self);
        let frame = layout_paint(&root, self.size, &self.locals);
        log::trace!(
            "composed {} views into {} scene nodes, {} hit regions",
            root.count(),
            frame.scene.nodes.len(),
            frame.hit_regions.len()
        );
        frame
    }
}
