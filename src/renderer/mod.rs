//! Rendering module
//!
//! The scene is drawn through [`RenderSurface`], a small set of polygon and
//! line primitives with a camera translation. [`VertexBatch`] implements it by
//! tessellating into a CPU triangle list ready for upload.

pub mod shapes;
pub mod vertex;

use glam::Vec2;

use crate::sim::{GameSession, PhysicsWorld};
pub use vertex::{Vertex, colors};

const CONSTRAINT_WIDTH: f32 = 1.0;
const ROPE_WIDTH: f32 = 2.0;
const ROPE_BALL_RADIUS: f32 = 10.0;

/// Drawing capability consumed by the scene renderer
pub trait RenderSurface {
    /// Offset added to every world-space point until changed
    fn set_translation(&mut self, offset: Vec2);
    fn fill_polygon(&mut self, points: &[Vec2], color: [f32; 4]);
    fn stroke_polygon(&mut self, points: &[Vec2], width: f32, color: [f32; 4]);
    fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: [f32; 4]);
    fn circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]);
    /// Fill the whole viewport, ignoring the translation
    fn overlay(&mut self, color: [f32; 4]);
}

/// CPU triangle list
#[derive(Debug, Clone, Default)]
pub struct VertexBatch {
    pub vertices: Vec<Vertex>,
    pub viewport: Vec2,
    pub circle_segments: u32,
    translation: Vec2,
}

impl VertexBatch {
    pub fn new(viewport: Vec2, circle_segments: u32) -> Self {
        Self {
            vertices: Vec::new(),
            viewport,
            circle_segments,
            translation: Vec2::ZERO,
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.translation = Vec2::ZERO;
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Raw bytes for a vertex buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    fn push_translated(&mut self, vertices: Vec<Vertex>) {
        let t = self.translation;
        self.vertices.extend(vertices.into_iter().map(|mut v| {
            v.position[0] += t.x;
            v.position[1] += t.y;
            v
        }));
    }
}

impl RenderSurface for VertexBatch {
    fn set_translation(&mut self, offset: Vec2) {
        self.translation = offset;
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: [f32; 4]) {
        self.push_translated(shapes::polygon_fan(points, color));
    }

    fn stroke_polygon(&mut self, points: &[Vec2], width: f32, color: [f32; 4]) {
        self.push_translated(shapes::polygon_outline(points, width, color));
    }

    fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: [f32; 4]) {
        self.push_translated(shapes::line(a, b, width, color));
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        self.push_translated(shapes::circle(center, radius, color, self.circle_segments));
    }

    fn overlay(&mut self, color: [f32; 4]) {
        self.vertices
            .extend(shapes::rect(Vec2::ZERO, self.viewport, color));
    }
}

/// Translation that centres `focus` in a viewport
pub fn camera_offset(focus: Vec2, viewport: Vec2) -> Vec2 {
    viewport / 2.0 - focus
}

/// Draw one frame of the session
pub fn draw_scene<W: PhysicsWorld + ?Sized, S: RenderSurface + ?Sized>(
    session: &GameSession,
    world: &W,
    surface: &mut S,
    translation: Vec2,
    now_ms: f64,
) {
    surface.overlay(colors::BACKGROUND);
    surface.set_translation(translation);

    for body in world.bodies() {
        surface.fill_polygon(&body.vertices(), colors::for_tag(body.tag));
    }

    if session.settings.show_constraints {
        for constraint in world.constraints() {
            if let Some((a, b)) = world.constraint_endpoints(constraint.handle) {
                surface.line(a, b, CONSTRAINT_WIDTH, colors::CONSTRAINT);
            }
        }
    }

    if let Some(rope) = &session.rope {
        surface.line(rope.legs(), rope.ball.pos, ROPE_WIDTH, colors::ROPE);
        surface.circle(rope.ball.pos, ROPE_BALL_RADIUS, colors::ANCHOR);
    }

    for bubble in &session.bubbles.bubbles {
        surface.circle(bubble.pos, bubble.radius, colors::BUBBLE);
    }

    let darkness = session.darkness(now_ms);
    if darkness > 0.0 {
        surface.overlay(colors::shade(darkness));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::testing::FakeWorld;
    use crate::sim::DeathCause;
    use crate::tuning::Tuning;

    /// Counts calls instead of drawing
    #[derive(Default)]
    struct CallLog {
        translation: Vec2,
        polygons: usize,
        lines: usize,
        circles: usize,
        overlays: Vec<[f32; 4]>,
    }

    impl RenderSurface for CallLog {
        fn set_translation(&mut self, offset: Vec2) {
            self.translation = offset;
        }
        fn fill_polygon(&mut self, _points: &[Vec2], _color: [f32; 4]) {
            self.polygons += 1;
        }
        fn stroke_polygon(&mut self, _points: &[Vec2], _width: f32, _color: [f32; 4]) {
            self.polygons += 1;
        }
        fn line(&mut self, _a: Vec2, _b: Vec2, _width: f32, _color: [f32; 4]) {
            self.lines += 1;
        }
        fn circle(&mut self, _center: Vec2, _radius: f32, _color: [f32; 4]) {
            self.circles += 1;
        }
        fn overlay(&mut self, color: [f32; 4]) {
            self.overlays.push(color);
        }
    }

    fn session(world: &mut FakeWorld, settings: Settings) -> GameSession {
        let tuning = Tuning {
            intro_duration_ms: 0.0,
            jelly_count: 1,
            seabed_enabled: false,
            initial_bubbles: 5,
            ..Default::default()
        };
        GameSession::new(world, 1, tuning, settings, Vec2::new(100.0, 100.0)).unwrap()
    }

    #[test]
    fn test_scene_draws_every_body_and_bubble() {
        let mut world = FakeWorld::new();
        let session = session(&mut world, Settings::default());
        let mut log = CallLog::default();
        draw_scene(&session, &world, &mut log, Vec2::new(5.0, 6.0), 0.0);

        assert_eq!(log.translation, Vec2::new(5.0, 6.0));
        assert_eq!(log.polygons, world.body_count());
        assert_eq!(log.lines, world.constraints.len());
        assert_eq!(log.circles, 5);
        // Background only; full air means no darkness
        assert_eq!(log.overlays, vec![colors::BACKGROUND]);
    }

    #[test]
    fn test_constraints_hidden_when_disabled() {
        let mut world = FakeWorld::new();
        let settings = Settings {
            show_constraints: false,
            ..Default::default()
        };
        let session = session(&mut world, settings);
        let mut log = CallLog::default();
        draw_scene(&session, &world, &mut log, Vec2::ZERO, 0.0);
        assert_eq!(log.lines, 0);
    }

    #[test]
    fn test_overlay_when_dead() {
        let mut world = FakeWorld::new();
        let mut session = session(&mut world, Settings::default());
        session.begin_death(DeathCause::Oxygen, 0.0);
        let mut log = CallLog::default();
        draw_scene(&session, &world, &mut log, Vec2::ZERO, 10_000.0);
        assert_eq!(log.overlays.len(), 2);
        assert_eq!(log.overlays[0], colors::BACKGROUND);
        assert!((log.overlays[1][3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_batch_translates_and_packs() {
        let mut batch = VertexBatch::new(Vec2::new(200.0, 100.0), 8);
        batch.set_translation(Vec2::new(10.0, 0.0));
        batch.line(Vec2::ZERO, Vec2::new(5.0, 0.0), 2.0, colors::ROPE);
        assert_eq!(batch.vertices[0].position, [10.0, 1.0]);

        batch.overlay(colors::shade(0.5));
        assert_eq!(batch.len(), 12);
        // Overlay ignores the camera
        assert_eq!(batch.vertices[6].position, [0.0, 0.0]);
        assert_eq!(batch.as_bytes().len(), 12 * Vertex::STRIDE);

        batch.clear();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_batch_circle_uses_quality_segments() {
        let mut batch = VertexBatch::new(Vec2::ONE, 16);
        batch.circle(Vec2::ZERO, 1.0, colors::BUBBLE);
        assert_eq!(batch.len(), 16 * 3);
    }

    #[test]
    fn test_camera_offset_centres_focus() {
        let offset = camera_offset(Vec2::new(300.0, 50.0), Vec2::new(200.0, 100.0));
        assert_eq!(Vec2::new(300.0, 50.0) + offset, Vec2::new(100.0, 50.0));
    }
}
