#![allow(non_snake_case)]
//! Widgets and layout.
//!
//! Widget functions return plain `View` values; `layout_and_paint` lays the
//! tree out with taffy and flattens it into a `Frame`.
//!
//! ```rust
//! use tally_core::*;
//! use tally_ui::*;
//!
//! let root = Column(Modifier::new().padding(24.0)).child((
//!     Text("Count: 0").size(32.0),
//!     Button("Increment", true, || {}),
//! ));
//! let frame = layout_and_paint(&root, (400, 300), &Locals::default(), &Interactions::default());
//! assert_eq!(frame.hit_regions.len(), 1);
//! ```

pub mod lazy;

pub use lazy::{LazyColumn, LazyColumnState};

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use taffy::prelude::{
    AlignItems, AvailableSpace, Display, FlexDirection, JustifyContent, NodeId, Style, TaffyTree,
    length, percent,
};
use taffy::{Overflow, Point, TaffyError};
use tally_core::*;

/// Pointer state the runner feeds back into paint (hover/pressed styling).
#[derive(Default, Debug, Clone)]
pub struct Interactions {
    pub hover: Option<u64>,
    pub pressed: HashSet<u64>,
}

pub fn Surface(modifier: Modifier, child: View) -> View {
    let mut v = View::new(0, ViewKind::Surface).modifier(modifier);
    v.children = vec![child];
    v
}

pub fn Box(modifier: Modifier) -> View {
    View::new(0, ViewKind::Box).modifier(modifier)
}

pub fn Row(modifier: Modifier) -> View {
    View::new(0, ViewKind::Row).modifier(modifier)
}

pub fn Column(modifier: Modifier) -> View {
    View::new(0, ViewKind::Column).modifier(modifier)
}

pub fn Text(text: impl Into<String>) -> View {
    View::new(
        0,
        ViewKind::Text {
            text: text.into(),
            color: Color::WHITE,
            font_size: 16.0, // dp (converted to px in layout/paint)
        },
    )
}

/// A labelled push button. When `enabled` is false the button is drawn with
/// the theme's disabled colors and registers no click region.
pub fn Button(text: impl Into<String>, enabled: bool, on_click: impl Fn() + 'static) -> View {
    let text = text.into();
    View::new(
        0,
        ViewKind::Button {
            text,
            on_click: Some(Rc::new(on_click)),
            enabled,
        },
    )
    .semantics(Semantics {
        role: Role::Button,
        label: None,
        enabled,
    })
}

/// Extension trait for child building
pub trait ViewExt: Sized {
    fn child(self, children: impl IntoChildren) -> Self;
}

impl ViewExt for View {
    fn child(self, children: impl IntoChildren) -> Self {
        self.with_children(children.into_children())
    }
}

pub trait IntoChildren {
    fn into_children(self) -> Vec<View>;
}

impl IntoChildren for View {
    fn into_children(self) -> Vec<View> {
        vec![self]
    }
}

impl IntoChildren for Vec<View> {
    fn into_children(self) -> Vec<View> {
        self
    }
}

impl IntoChildren for Option<View> {
    fn into_children(self) -> Vec<View> {
        self.into_iter().collect()
    }
}

impl<const N: usize> IntoChildren for [View; N] {
    fn into_children(self) -> Vec<View> {
        self.into()
    }
}

macro_rules! impl_into_children_tuple {
    ($($idx:tt $t:ident),+) => {
        impl<$($t: IntoChildren),+> IntoChildren for ($($t,)+) {
            fn into_children(self) -> Vec<View> {
                let mut v = Vec::new();
                $(v.extend(self.$idx.into_children());)+
                v
            }
        }
    };
}

impl_into_children_tuple!(0 A, 1 B);
impl_into_children_tuple!(0 A, 1 B, 2 C);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D, 4 E);
impl_into_children_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);

/// Method styling
pub trait TextStyle {
    fn color(self, c: Color) -> View;
    fn size(self, dp: f32) -> View;
}

impl TextStyle for View {
    fn color(mut self, c: Color) -> View {
        if let ViewKind::Text {
            color: text_color, ..
        } = &mut self.kind
        {
            *text_color = c;
        }
        self
    }
    fn size(mut self, dp_font: f32) -> View {
        if let ViewKind::Text {
            font_size: text_size_dp,
            ..
        } = &mut self.kind
        {
            *text_size_dp = dp_font;
        }
        self
    }
}

/// Font size used for button labels, dp.
pub const BUTTON_FONT_DP: f32 = 16.0;
const BUTTON_HEIGHT_DP: f32 = 36.0;
const BUTTON_PAD_X_DP: f32 = 12.0;
const BUTTON_RADIUS_DP: f32 = 6.0;

/// Width estimate used for layout before glyphs are shaped.
pub fn approx_text_width(text: &str, size_px: f32) -> f32 {
    text.chars().count() as f32 * size_px * 0.6
}

#[derive(Clone)]
enum NodeCtx {
    Text { text: String, font_dp: f32 },
    Button { label: String },
    Container,
}

/// Lays out `root` for a surface of `size_px` and paints it into a frame.
///
/// A layout failure is logged and yields an empty frame.
pub fn layout_and_paint(
    root: &View,
    size_px: (u32, u32),
    locals: &Locals,
    interactions: &Interactions,
) -> Frame {
    match try_layout_and_paint(root, size_px, locals, interactions) {
        Ok(frame) => frame,
        Err(e) => {
            log::error!("layout failed: {e}");
            Frame {
                scene: Scene {
                    clear_color: locals.theme.background,
                    nodes: vec![],
                },
                ..Frame::default()
            }
        }
    }
}

fn try_layout_and_paint(
    root: &View,
    size_px: (u32, u32),
    locals: &Locals,
    interactions: &Interactions,
) -> Result<Frame, TaffyError> {
    // Assign ids
    let mut id = 1u64;
    fn stamp(mut v: View, id: &mut u64) -> View {
        v.id = *id;
        *id += 1;
        v.children = v.children.into_iter().map(|c| stamp(c, id)).collect();
        v
    }
    let root = stamp(root.clone(), &mut id);

    let mut taffy: TaffyTree<NodeCtx> = TaffyTree::new();
    let mut nodes_map: HashMap<ViewId, NodeId> = HashMap::new();

    fn build_node(
        v: &View,
        parent_is_row: bool,
        t: &mut TaffyTree<NodeCtx>,
        nodes_map: &mut HashMap<ViewId, NodeId>,
        locals: &Locals,
    ) -> Result<NodeId, TaffyError> {
        let style = style_from_modifier(&v.modifier, &v.kind, parent_is_row, locals);
        let is_row = matches!(v.kind, ViewKind::Row);
        let node = match &v.kind {
            ViewKind::Text {
                text, font_size, ..
            } => t.new_leaf_with_context(
                style,
                NodeCtx::Text {
                    text: text.clone(),
                    font_dp: *font_size,
                },
            )?,
            ViewKind::Button { text, .. } => t.new_leaf_with_context(
                style,
                NodeCtx::Button {
                    label: text.clone(),
                },
            )?,
            _ => {
                let children = v
                    .children
                    .iter()
                    .map(|c| build_node(c, is_row, t, nodes_map, locals))
                    .collect::<Result<Vec<_>, _>>()?;
                let n = t.new_with_children(style, &children)?;
                t.set_node_context(n, Some(NodeCtx::Container))?;
                n
            }
        };
        nodes_map.insert(v.id, node);
        Ok(node)
    }

    let root_node = build_node(&root, false, &mut taffy, &mut nodes_map, locals)?;

    {
        let mut rs = taffy.style(root_node)?.clone();
        rs.size.width = length(size_px.0 as f32);
        rs.size.height = length(size_px.1 as f32);
        taffy.set_style(root_node, rs)?;
    }

    let available = taffy::geometry::Size {
        width: AvailableSpace::Definite(size_px.0 as f32),
        height: AvailableSpace::Definite(size_px.1 as f32),
    };

    taffy.compute_layout_with_measure(root_node, available, |known, _avail, _node, ctx, _style| {
        match ctx {
            Some(NodeCtx::Text { text, font_dp }) => {
                let size_px = locals.font_px(*font_dp);
                taffy::geometry::Size {
                    width: known.width.unwrap_or(approx_text_width(text, size_px)),
                    height: known.height.unwrap_or(size_px * 1.3),
                }
            }
            Some(NodeCtx::Button { label }) => taffy::geometry::Size {
                width: known.width.unwrap_or(
                    approx_text_width(label, locals.font_px(BUTTON_FONT_DP))
                        + 2.0 * locals.dp_to_px(BUTTON_PAD_X_DP),
                ),
                height: known
                    .height
                    .unwrap_or(locals.dp_to_px(BUTTON_HEIGHT_DP)),
            },
            Some(NodeCtx::Container) | None => taffy::geometry::Size::ZERO,
        }
    })?;

    let mut cx = PaintCx {
        taffy: &taffy,
        nodes: &nodes_map,
        locals,
        interactions,
        frame: Frame {
            scene: Scene {
                clear_color: locals.theme.background,
                nodes: vec![],
            },
            ..Frame::default()
        },
    };
    cx.walk(&root, (0.0, 0.0), None)?;

    let mut frame = cx.frame;
    // Low z_index first; the top-most region is found with iter().rev().
    frame
        .hit_regions
        .sort_by(|a, b| a.z_index.partial_cmp(&b.z_index).unwrap_or(Ordering::Equal));
    Ok(frame)
}

fn style_from_modifier(
    m: &Modifier,
    kind: &ViewKind,
    parent_is_row: bool,
    locals: &Locals,
) -> Style {
    let px = |dp: f32| locals.dp_to_px(dp);
    let mut s = Style {
        display: Display::Flex,
        ..Style::default()
    };

    let is_row = matches!(kind, ViewKind::Row);
    let is_container = matches!(
        kind,
        ViewKind::Row
            | ViewKind::Column
            | ViewKind::Box
            | ViewKind::Surface
            | ViewKind::ScrollV { .. }
    );

    s.flex_direction = if is_row {
        FlexDirection::Row
    } else {
        FlexDirection::Column
    };
    s.align_items = Some(if is_container {
        AlignItems::Stretch
    } else {
        AlignItems::FlexStart
    });
    s.justify_content = Some(JustifyContent::FlexStart);

    if let Some(a) = m.align_items_container {
        s.align_items = Some(a);
    }
    if let Some(j) = m.justify_content {
        s.justify_content = Some(j);
    }
    if let Some(a) = m.align_self {
        s.align_self = Some(a);
    }
    if let Some(g) = m.flex_grow {
        s.flex_grow = g;
    }
    if let Some(sh) = m.flex_shrink {
        s.flex_shrink = sh;
    }
    if let Some(g) = m.gap {
        s.gap = taffy::geometry::Size {
            width: length(px(g)),
            height: length(px(g)),
        };
    }

    // Scrollables clip; their children keep their natural height
    if matches!(kind, ViewKind::ScrollV { .. }) {
        s.overflow = Point {
            x: Overflow::Hidden,
            y: Overflow::Hidden,
        };
    }

    if let Some(pv) = m.padding_values {
        s.padding = taffy::geometry::Rect {
            left: length(px(pv.left)),
            right: length(px(pv.right)),
            top: length(px(pv.top)),
            bottom: length(px(pv.bottom)),
        };
    } else if let Some(p) = m.padding {
        let v = length(px(p));
        s.padding = taffy::geometry::Rect {
            left: v,
            right: v,
            top: v,
            bottom: v,
        };
    }

    // Explicit size wins over fill
    let mut width_set = false;
    let mut height_set = false;
    if let Some(sz) = m.size {
        s.size.width = length(px(sz.width.max(0.0)));
        s.size.height = length(px(sz.height.max(0.0)));
        width_set = true;
        height_set = true;
    }
    if let Some(w) = m.width {
        s.size.width = length(px(w.max(0.0)));
        width_set = true;
    }
    if let Some(h) = m.height {
        s.size.height = length(px(h.max(0.0)));
        height_set = true;
    }

    let want_fill_w = m.fill_max || m.fill_max_w;
    let want_fill_h = m.fill_max || m.fill_max_h;

    // Fill along the parent's main axis -> weight (flex: 1 1 0%),
    // across it -> tight 100%
    let (grow_axis, tight_axis) = if parent_is_row {
        (want_fill_w && !width_set, want_fill_h && !height_set)
    } else {
        (want_fill_h && !height_set, want_fill_w && !width_set)
    };
    if grow_axis {
        s.flex_grow = s.flex_grow.max(1.0);
        s.flex_shrink = s.flex_shrink.max(1.0);
        s.flex_basis = length(0.0);
        if parent_is_row {
            s.min_size.width = length(0.0);
        } else {
            s.min_size.height = length(0.0);
        }
    }
    if tight_axis {
        if parent_is_row {
            s.min_size.height = percent(1.0);
            s.max_size.height = percent(1.0);
        } else {
            s.min_size.width = percent(1.0);
            s.max_size.width = percent(1.0);
        }
    }

    if let Some(v) = m.min_width {
        s.min_size.width = length(px(v.max(0.0)));
    }
    if let Some(v) = m.min_height {
        s.min_size.height = length(px(v.max(0.0)));
    }
    if let Some(v) = m.max_width {
        s.max_size.width = length(px(v.max(0.0)));
    }
    if let Some(v) = m.max_height {
        s.max_size.height = length(px(v.max(0.0)));
    }

    s
}

struct PaintCx<'a> {
    taffy: &'a TaffyTree<NodeCtx>,
    nodes: &'a HashMap<ViewId, NodeId>,
    locals: &'a Locals,
    interactions: &'a Interactions,
    frame: Frame,
}

impl PaintCx<'_> {
    fn node_of(&self, v: &View) -> Result<NodeId, TaffyError> {
        self.nodes
            .get(&v.id)
            .copied()
            .ok_or(TaffyError::InvalidInputNode(NodeId::from(v.id)))
    }

    fn layout_of(&self, v: &View) -> Result<Rect, TaffyError> {
        let l = self.taffy.layout(self.node_of(v)?)?;
        Ok(Rect::new(
            l.location.x,
            l.location.y,
            l.size.width,
            l.size.height,
        ))
    }

    /// Bottom edge of the deepest descendant, relative to `node`'s parent origin.
    fn subtree_bottom(&self, node: NodeId) -> Result<f32, TaffyError> {
        let l = self.taffy.layout(node)?;
        let mut h = l.size.height;
        for ch in self.taffy.children(node)? {
            let cl = self.taffy.layout(ch)?;
            h = h.max(cl.location.y + self.subtree_bottom(ch)?);
        }
        Ok(h)
    }

    fn walk(
        &mut self,
        v: &View,
        parent_offset: (f32, f32),
        parent_key: Option<u64>,
    ) -> Result<(), TaffyError> {
        let locals = self.locals;
        let theme = locals.theme;
        let px = |dp: f32| locals.dp_to_px(dp);

        let local = self.layout_of(v)?;
        let rect = local.translate(parent_offset.0, parent_offset.1);
        let key = v.modifier.key.or(parent_key);

        let content_rect = if let Some(pv) = v.modifier.padding_values {
            rect.inset(px(pv.left), px(pv.top), px(pv.right), px(pv.bottom))
        } else if let Some(p) = v.modifier.padding {
            rect.inset(px(p), px(p), px(p), px(p))
        } else {
            rect
        };
        let child_origin = (rect.x, rect.y);
        let radius = v.modifier.clip_rounded.map(px).unwrap_or(0.0);

        if let Some(bg) = v.modifier.background {
            self.frame.scene.nodes.push(SceneNode::Rect {
                rect,
                color: bg,
                radius,
            });
        }
        if let Some(b) = &v.modifier.border {
            self.frame.scene.nodes.push(SceneNode::Border {
                rect,
                color: b.color,
                width: px(b.width),
                radius: px(b.radius).max(radius),
            });
        }

        match &v.kind {
            ViewKind::Text {
                text,
                color,
                font_size,
            } => {
                let size_px = locals.font_px(*font_size);
                let line_h = size_px * 1.3;
                let mut draw = content_rect;
                // Single line, vertically centered in the content box
                let dy = (draw.h - line_h) * 0.5;
                if dy.is_finite() && dy > 0.0 {
                    draw.y += dy;
                    draw.h = line_h;
                }
                self.frame.scene.nodes.push(SceneNode::Text {
                    rect: draw,
                    text: text.clone(),
                    color: *color,
                    size: size_px,
                });
                let label = v
                    .semantics
                    .as_ref()
                    .and_then(|s| s.label.clone())
                    .unwrap_or_else(|| text.clone());
                self.frame.semantics_nodes.push(SemNode {
                    id: v.id,
                    key,
                    role: Role::Text,
                    label: Some(label),
                    rect,
                    enabled: true,
                });
            }

            ViewKind::Button {
                text,
                on_click,
                enabled,
            } => {
                let is_hovered = self.interactions.hover == Some(v.id);
                let is_pressed = self.interactions.pressed.contains(&v.id);

                if v.modifier.background.is_none() {
                    let base = if !enabled {
                        theme.button_bg_disabled
                    } else if is_pressed {
                        theme.button_bg_pressed
                    } else if is_hovered {
                        theme.button_bg_hover
                    } else {
                        theme.button_bg
                    };
                    self.frame.scene.nodes.push(SceneNode::Rect {
                        rect,
                        color: base,
                        radius: v
                            .modifier
                            .clip_rounded
                            .map(px)
                            .unwrap_or(px(BUTTON_RADIUS_DP)),
                    });
                }

                let label_px = locals.font_px(BUTTON_FONT_DP);
                let label_w = approx_text_width(text, label_px);
                let line_h = label_px * 1.3;
                self.frame.scene.nodes.push(SceneNode::Text {
                    rect: Rect::new(
                        rect.x + (rect.w - label_w).max(0.0) * 0.5,
                        rect.y + (rect.h - line_h).max(0.0) * 0.5,
                        label_w,
                        line_h,
                    ),
                    text: text.clone(),
                    color: if *enabled {
                        theme.on_primary
                    } else {
                        theme.on_button_disabled
                    },
                    size: label_px,
                });

                if *enabled && on_click.is_some() {
                    self.frame.hit_regions.push(HitRegion {
                        id: v.id,
                        rect,
                        on_click: on_click.clone(),
                        on_scroll: None,
                        z_index: v.modifier.z_index,
                    });
                }
                let label = v
                    .semantics
                    .as_ref()
                    .and_then(|s| s.label.clone())
                    .unwrap_or_else(|| text.clone());
                self.frame.semantics_nodes.push(SemNode {
                    id: v.id,
                    key,
                    role: Role::Button,
                    label: Some(label),
                    rect,
                    enabled: *enabled,
                });
            }

            ViewKind::ScrollV {
                on_scroll,
                set_viewport_height,
                set_content_height,
                get_scroll_offset,
                is_animating,
            } => {
                // Outer rect so scrolling works over padding too
                let scale = locals.density.scale.max(f32::EPSILON);
                let on_scroll_px = on_scroll.clone().map(|cb| {
                    Rc::new(move |d: Vec2| -> Vec2 {
                        let left = cb(Vec2::new(d.x / scale, d.y / scale));
                        Vec2::new(left.x * scale, left.y * scale)
                    }) as Rc<dyn Fn(Vec2) -> Vec2>
                });
                self.frame.hit_regions.push(HitRegion {
                    id: v.id,
                    rect,
                    on_click: None,
                    on_scroll: on_scroll_px,
                    z_index: v.modifier.z_index,
                });

                let vp = content_rect;
                if let Some(set_vh) = set_viewport_height {
                    set_vh(locals.px_to_dp(vp.h.max(0.0)));
                }

                let mut content_h = 0.0f32;
                for c in &v.children {
                    let nid = self.node_of(c)?;
                    let l = self.taffy.layout(nid)?;
                    // Children are positioned from the border box; measure from the content top
                    let top = l.location.y - (content_rect.y - rect.y);
                    content_h = content_h.max(top + self.subtree_bottom(nid)?);
                }
                if let Some(set_ch) = set_content_height {
                    set_ch(locals.px_to_dp(content_h));
                }
                if let Some(anim) = is_animating {
                    self.frame.animating |= anim();
                }

                self.frame.scene.nodes.push(SceneNode::PushClip { rect: vp });

                let hit_start = self.frame.hit_regions.len();
                let offset_px = get_scroll_offset.as_ref().map(|g| px(g())).unwrap_or(0.0);
                for c in &v.children {
                    self.walk(c, (child_origin.0, child_origin.1 - offset_px), key)?;
                }

                // Clip descendant hit regions to the viewport
                let hits = &mut self.frame.hit_regions;
                let mut i = hit_start;
                while i < hits.len() {
                    if let Some(r) = hits[i].rect.intersect(&vp) {
                        hits[i].rect = r;
                        i += 1;
                    } else {
                        hits.remove(i);
                    }
                }

                self.push_scrollbar(vp, content_h, offset_px);
                self.frame.scene.nodes.push(SceneNode::PopClip);

                self.frame.semantics_nodes.push(SemNode {
                    id: v.id,
                    key,
                    role: Role::List,
                    label: v.semantics.as_ref().and_then(|s| s.label.clone()),
                    rect,
                    enabled: true,
                });
                return Ok(());
            }

            ViewKind::Surface | ViewKind::Box | ViewKind::Row | ViewKind::Column => {
                if let Some(s) = &v.semantics {
                    self.frame.semantics_nodes.push(SemNode {
                        id: v.id,
                        key,
                        role: s.role,
                        label: s.label.clone(),
                        rect,
                        enabled: s.enabled,
                    });
                }
            }
        }

        for c in &v.children {
            self.walk(c, child_origin, key)?;
        }
        Ok(())
    }

    fn push_scrollbar(&mut self, vp: Rect, content_h: f32, offset: f32) {
        if content_h <= vp.h + 0.5 {
            return;
        }
        let locals = self.locals;
        let thickness = locals.dp_to_px(4.0);
        let margin = locals.dp_to_px(2.0);
        let min_thumb = locals.dp_to_px(24.0);

        let track = Rect::new(
            vp.x + vp.w - margin - thickness,
            vp.y + margin,
            thickness,
            (vp.h - 2.0 * margin).max(0.0),
        );
        let thumb_h =
            (track.h * (vp.h / content_h).clamp(0.0, 1.0)).clamp(min_thumb.min(track.h), track.h);
        let t = (offset / (content_h - vp.h).max(1.0)).clamp(0.0, 1.0);
        let thumb_y = track.y + t * (track.h - thumb_h).max(0.0);

        self.frame.scene.nodes.push(SceneNode::Rect {
            rect: track,
            color: locals.theme.scrollbar_track,
            radius: thickness * 0.5,
        });
        self.frame.scene.nodes.push(SceneNode::Rect {
            rect: Rect::new(track.x, thumb_y, thickness, thumb_h),
            color: locals.theme.scrollbar_thumb,
            radius: thickness * 0.5,
        });
    }
}
