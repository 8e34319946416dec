//! Procedural seabed
//!
//! A strip of static quads along the bottom of the play area. The top edge
//! follows the noise field so neighbouring quads share their seam height.

use glam::Vec2;

use super::noise::SmoothNoise;
use super::world::{BodyDesc, BodyHandle, BodyTag, PhysicsWorld};
use crate::error::SimError;

/// Seabed layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeabedSpec {
    /// Left edge of the strip
    pub start_x: f32,
    pub width: f32,
    /// y of the flat underside
    pub floor_y: f32,
    pub segment_width: f32,
    /// Maximum rise of the surface above `floor_y - depth`
    pub amplitude: f32,
    /// Thickness below the lowest surface point
    pub depth: f32,
}

/// Surface height (y) at `x`
pub fn surface_y(noise: &SmoothNoise, spec: &SeabedSpec, x: f32) -> f32 {
    spec.floor_y - spec.depth - noise.sample(x * 0.01, 0.0) * spec.amplitude
}

/// Add the seabed quads to the world
pub fn generate_seabed<W: PhysicsWorld + ?Sized>(
    world: &mut W,
    noise: &SmoothNoise,
    spec: &SeabedSpec,
) -> Result<Vec<BodyHandle>, SimError> {
    if spec.segment_width <= 0.0 {
        return Err(SimError::invalid("segment_width", spec.segment_width, "greater than 0"));
    }
    if spec.depth <= 0.0 {
        return Err(SimError::invalid("depth", spec.depth, "greater than 0"));
    }
    let segments = (spec.width / spec.segment_width).ceil().max(1.0) as usize;
    let handles: Vec<BodyHandle> = (0..segments)
        .map(|i| {
            let x0 = spec.start_x + i as f32 * spec.segment_width;
            let x1 = x0 + spec.segment_width;
            let outline = [
                Vec2::new(x0, spec.floor_y),
                Vec2::new(x1, spec.floor_y),
                Vec2::new(x1, surface_y(noise, spec, x1)),
                Vec2::new(x0, surface_y(noise, spec, x0)),
            ];
            world.add_body(BodyDesc::from_vertices(&outline, BodyTag::Terrain).into_static())
        })
        .collect();
    log::info!("Generated seabed: {} segments", handles.len());
    Ok(handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::testing::FakeWorld;

    fn spec() -> SeabedSpec {
        SeabedSpec {
            start_x: 0.0,
            width: 640.0,
            floor_y: 720.0,
            segment_width: 64.0,
            amplitude: 40.0,
            depth: 60.0,
        }
    }

    #[test]
    fn test_segments_cover_width_and_are_static() {
        let mut world = FakeWorld::new();
        let noise = SmoothNoise::new(1);
        let handles = generate_seabed(&mut world, &noise, &spec()).unwrap();
        assert_eq!(handles.len(), 10);
        for h in &handles {
            let body = world.body(*h).unwrap();
            assert!(body.is_static);
            assert_eq!(body.tag, BodyTag::Terrain);
            assert!(body.shape.is_valid());
        }
    }

    #[test]
    fn test_neighbours_share_seam() {
        let mut world = FakeWorld::new();
        let noise = SmoothNoise::new(2);
        let handles = generate_seabed(&mut world, &noise, &spec()).unwrap();
        let left = world.body(handles[0]).unwrap().vertices();
        let right = world.body(handles[1]).unwrap().vertices();
        assert!((left[2] - right[3]).length() < 1e-3);
    }

    #[test]
    fn test_surface_stays_in_band() {
        let noise = SmoothNoise::new(3);
        let s = spec();
        for i in 0..100 {
            let y = surface_y(&noise, &s, i as f32 * 7.0);
            assert!(y <= s.floor_y - s.depth && y >= s.floor_y - s.depth - s.amplitude);
        }
    }

    #[test]
    fn test_zero_segment_width_rejected() {
        let mut world = FakeWorld::new();
        let noise = SmoothNoise::new(4);
        let bad = SeabedSpec {
            segment_width: 0.0,
            ..spec()
        };
        assert!(generate_seabed(&mut world, &noise, &bad).is_err());
    }
}
