//! Scene rendering.
//!
//! The engine is a read-only projection of room state onto a [`Surface`];
//! it owns no game data and is invoked once per tick whether or not state
//! changed. The surface trait keeps the crate free of any graphics
//! backend: an embedder supplies a real canvas, the binary runs headless
//! on [`NullSurface`], and tests observe draw calls on
//! [`RecordingSurface`].
//!
//! Draw order is fixed, back to front: background, grid, doors, players,
//! then the local-player ring so it is never occluded.

use std::collections::HashMap;

use doorwave_shared::math::Vec2;
use doorwave_shared::room::{Door, DoorKind, Player, RoomState};

/// Grid cell size in scene units.
pub const GRID_CELL: f32 = 40.0;
/// Door body size.
pub const DOOR_WIDTH: f32 = 60.0;
pub const DOOR_HEIGHT: f32 = 80.0;
/// Door corner radius.
pub const DOOR_CORNER: f32 = 8.0;
/// Door label offset below the door center.
pub const DOOR_LABEL_OFFSET: f32 = 50.0;
/// Player disc radius.
pub const PLAYER_RADIUS: f32 = 12.0;
/// Name label offset below the player center.
pub const NAME_OFFSET: f32 = 24.0;
/// Local-player ring radius.
pub const RING_RADIUS: f32 = 16.0;

/// An RGBA color; alpha in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Scene palette.
pub mod palette {
    use super::Color;

    pub const BACKGROUND: Color = Color::rgb(0x08, 0x10, 0x22);
    pub const GRID_LINE: Color = Color::rgb(0x0f, 0x23, 0x46);
    pub const DOOR_CLOSED_FILL: Color = Color::rgb(0x39, 0x4b, 0x7a);
    pub const DOOR_CLOSED_STROKE: Color = Color::rgb(0x9a, 0xb3, 0xff);
    pub const DOOR_CLOSED_TEXT: Color = Color::rgb(0xea, 0xf0, 0xff);
    pub const DOOR_OPENED_FILL: Color = Color::rgb(0x26, 0x3a, 0x66);
    pub const DOOR_OPENED_STROKE: Color = Color::rgb(0x6a, 0x7f, 0xb6);
    pub const DOOR_OPENED_TEXT: Color = Color::rgb(0x9a, 0xb3, 0xff);
    pub const PLAYER_ALIVE: Color = Color::rgb(0x9a, 0xb3, 0xff);
    pub const PLAYER_KING: Color = Color::rgb(0xff, 0xd5, 0x4a);
    pub const PLAYER_DEAD: Color = Color::rgba(0xff, 0x00, 0x00, 0.4);
    pub const CROWN: Color = Color::rgb(0xff, 0xea, 0x7a);
    pub const NAME_TEXT: Color = Color::rgb(0xea, 0xf0, 0xff);
    pub const LOCAL_RING: Color = Color::rgb(0x3b, 0x82, 0xf6);
}

/// A minimal 2D drawing API the engine renders through.
pub trait Surface {
    /// Displayed size in scene units.
    fn display_size(&self) -> (f32, f32);

    /// Backing-buffer pixels per scene unit.
    fn device_pixel_ratio(&self) -> f32 {
        1.0
    }

    /// Reallocates the backing buffer and applies a uniform scale. Called
    /// only when the displayed size changes; reallocation discards drawing
    /// state, so the engine avoids it per frame.
    fn resize_backing(&mut self, width: u32, height: u32, scale: f32);

    fn clear(&mut self, width: f32, height: f32);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);
    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color);
    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Color);
    fn stroke_circle(&mut self, cx: f32, cy: f32, r: f32, color: Color);
    fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, r: f32, fill: Color, stroke: Color);
    fn fill_polygon(&mut self, points: &[Vec2], color: Color);
    /// Text centered horizontally on `x`.
    fn text(&mut self, text: &str, x: f32, y: f32, color: Color);
}

/// Maps revealed door kinds to display glyphs, with a defined fallback
/// for unknown or undisclosed kinds. Embedders may override entries.
#[derive(Debug, Clone)]
pub struct DoorGlyphs {
    overrides: HashMap<DoorKind, String>,
    fallback: String,
}

impl DoorGlyphs {
    pub fn set(&mut self, kind: DoorKind, glyph: impl Into<String>) {
        self.overrides.insert(kind, glyph.into());
    }

    pub fn glyph(&self, kind: Option<DoorKind>) -> &str {
        match kind {
            Some(k) => self
                .overrides
                .get(&k)
                .map(String::as_str)
                .unwrap_or_else(|| builtin_glyph(k)),
            None => &self.fallback,
        }
    }
}

impl Default for DoorGlyphs {
    fn default() -> Self {
        Self {
            overrides: HashMap::new(),
            fallback: "✅".to_string(),
        }
    }
}

fn builtin_glyph(kind: DoorKind) -> &'static str {
    match kind {
        DoorKind::Death => "💀",
        DoorKind::TreasureBig => "💰",
        DoorKind::ExtraLife => "❤️",
        DoorKind::KingOutfit => "👑",
        DoorKind::Treasure => "🪙",
        DoorKind::Speed => "⚡",
        DoorKind::Clue => "❓",
        DoorKind::Swap => "🔄",
        DoorKind::Dance => "💃",
        DoorKind::Portal => "🌀",
        DoorKind::Safe => "✅",
    }
}

/// Redraws the whole scene from state every call.
#[derive(Debug, Default)]
pub struct RenderEngine {
    glyphs: DoorGlyphs,
    /// Last applied backing-buffer size; resize only on change.
    backing: Option<(u32, u32)>,
}

impl RenderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_glyphs(glyphs: DoorGlyphs) -> Self {
        Self {
            glyphs,
            backing: None,
        }
    }

    /// Renders one frame. `local` is the resolved local player (possibly
    /// the stale fallback); when present its position gets the highlight
    /// ring on top of everything else.
    pub fn render(&mut self, state: &RoomState, local: Option<&Player>, surface: &mut dyn Surface) {
        let (w, h) = surface.display_size();
        let dpr = surface.device_pixel_ratio();
        let backing = ((w * dpr).floor() as u32, (h * dpr).floor() as u32);
        if self.backing != Some(backing) {
            surface.resize_backing(backing.0, backing.1, dpr);
            self.backing = Some(backing);
        }

        surface.clear(w, h);
        surface.fill_rect(0.0, 0.0, w, h, palette::BACKGROUND);
        self.draw_grid(surface, w, h);

        for door in &state.doors {
            self.draw_door(surface, door);
        }
        for player in &state.players {
            self.draw_player(surface, player);
        }

        if let Some(me) = local {
            surface.stroke_circle(me.x, me.y, RING_RADIUS, palette::LOCAL_RING);
        }
    }

    fn draw_grid(&self, surface: &mut dyn Surface, w: f32, h: f32) {
        let mut x = 0.0;
        while x < w {
            surface.line(x, 0.0, x, h, palette::GRID_LINE);
            x += GRID_CELL;
        }
        let mut y = 0.0;
        while y < h {
            surface.line(0.0, y, w, y, palette::GRID_LINE);
            y += GRID_CELL;
        }
    }

    fn draw_door(&self, surface: &mut dyn Surface, door: &Door) {
        let opened = door.is_opened();
        let (fill, stroke, text) = if opened {
            (
                palette::DOOR_OPENED_FILL,
                palette::DOOR_OPENED_STROKE,
                palette::DOOR_OPENED_TEXT,
            )
        } else {
            (
                palette::DOOR_CLOSED_FILL,
                palette::DOOR_CLOSED_STROKE,
                palette::DOOR_CLOSED_TEXT,
            )
        };

        surface.rounded_rect(
            door.x - DOOR_WIDTH / 2.0,
            door.y - DOOR_HEIGHT / 2.0,
            DOOR_WIDTH,
            DOOR_HEIGHT,
            DOOR_CORNER,
            fill,
            stroke,
        );
        surface.text(
            &format!("DOOR {}", door.id),
            door.x,
            door.y + DOOR_LABEL_OFFSET,
            text,
        );
        if opened {
            surface.text(self.glyphs.glyph(door.kind), door.x, door.y, text);
        }
    }

    fn draw_player(&self, surface: &mut dyn Surface, player: &Player) {
        if !player.alive {
            surface.fill_circle(player.x, player.y, PLAYER_RADIUS, palette::PLAYER_DEAD);
        } else {
            let body = if player.is_king() {
                palette::PLAYER_KING
            } else {
                palette::PLAYER_ALIVE
            };
            surface.fill_circle(player.x, player.y, PLAYER_RADIUS, body);
            if player.is_king() {
                surface.fill_polygon(&crown_points(player.x, player.y), palette::CROWN);
            }
        }
        surface.text(
            &player.name,
            player.x,
            player.y + NAME_OFFSET,
            palette::NAME_TEXT,
        );
    }
}

fn crown_points(x: f32, y: f32) -> [Vec2; 5] {
    [
        Vec2::new(x - 10.0, y - 14.0),
        Vec2::new(x - 4.0, y - 22.0),
        Vec2::new(x, y - 14.0),
        Vec2::new(x + 6.0, y - 22.0),
        Vec2::new(x + 10.0, y - 14.0),
    ]
}

/// A surface that draws nothing. Useful for headless runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct NullSurface {
    pub width: f32,
    pub height: f32,
}

impl NullSurface {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for NullSurface {
    fn default() -> Self {
        Self::new(1200.0, 700.0)
    }
}

impl Surface for NullSurface {
    fn display_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn resize_backing(&mut self, _width: u32, _height: u32, _scale: f32) {}
    fn clear(&mut self, _width: f32, _height: f32) {}
    fn fill_rect(&mut self, _x: f32, _y: f32, _w: f32, _h: f32, _color: Color) {}
    fn line(&mut self, _x0: f32, _y0: f32, _x1: f32, _y1: f32, _color: Color) {}
    fn fill_circle(&mut self, _cx: f32, _cy: f32, _r: f32, _color: Color) {}
    fn stroke_circle(&mut self, _cx: f32, _cy: f32, _r: f32, _color: Color) {}
    fn rounded_rect(
        &mut self,
        _x: f32,
        _y: f32,
        _w: f32,
        _h: f32,
        _r: f32,
        _fill: Color,
        _stroke: Color,
    ) {
    }
    fn fill_polygon(&mut self, _points: &[Vec2], _color: Color) {}
    fn text(&mut self, _text: &str, _x: f32, _y: f32, _color: Color) {}
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Resize { width: u32, height: u32, scale: f32 },
    Clear,
    FillRect { x: f32, y: f32, w: f32, h: f32, color: Color },
    Line { x0: f32, y0: f32, x1: f32, y1: f32, color: Color },
    FillCircle { cx: f32, cy: f32, r: f32, color: Color },
    StrokeCircle { cx: f32, cy: f32, r: f32, color: Color },
    RoundedRect { x: f32, y: f32, w: f32, h: f32, r: f32, fill: Color, stroke: Color },
    Polygon { points: Vec<Vec2>, color: Color },
    Text { text: String, x: f32, y: f32, color: Color },
}

/// A surface that records every call; lets tests assert on draw order.
#[derive(Debug)]
pub struct RecordingSurface {
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f32, height: f32, dpr: f32) -> Self {
        Self {
            width,
            height,
            dpr,
            ops: Vec::new(),
        }
    }
}

impl Surface for RecordingSurface {
    fn display_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.dpr
    }

    fn resize_backing(&mut self, width: u32, height: u32, scale: f32) {
        self.ops.push(DrawOp::Resize {
            width,
            height,
            scale,
        });
    }

    fn clear(&mut self, _width: f32, _height: f32) {
        self.ops.push(DrawOp::Clear);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.ops.push(DrawOp::FillRect { x, y, w, h, color });
    }

    fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color) {
        self.ops.push(DrawOp::Line {
            x0,
            y0,
            x1,
            y1,
            color,
        });
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, r: f32, color: Color) {
        self.ops.push(DrawOp::FillCircle { cx, cy, r, color });
    }

    fn stroke_circle(&mut self, cx: f32, cy: f32, r: f32, color: Color) {
        self.ops.push(DrawOp::StrokeCircle { cx, cy, r, color });
    }

    fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, r: f32, fill: Color, stroke: Color) {
        self.ops.push(DrawOp::RoundedRect {
            x,
            y,
            w,
            h,
            r,
            fill,
            stroke,
        });
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: Color) {
        self.ops.push(DrawOp::Polygon {
            points: points.to_vec(),
            color,
        });
    }

    fn text(&mut self, text: &str, x: f32, y: f32, color: Color) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }
}
