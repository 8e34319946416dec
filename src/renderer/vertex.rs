//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn at(p: Vec2, color: [f32; 4]) -> Self {
        Self::new(p.x, p.y, color)
    }

    /// Byte stride of one vertex in a buffer
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}

/// Colors for scene elements
pub mod colors {
    use crate::sim::BodyTag;

    pub const DIVER: [f32; 4] = [0.95, 0.75, 0.35, 1.0];
    pub const CHAIN_LINK: [f32; 4] = [0.45, 0.45, 0.5, 1.0];
    pub const ANCHOR: [f32; 4] = [0.3, 0.3, 0.35, 1.0];
    pub const JELLY_HEAD: [f32; 4] = [0.85, 0.45, 0.9, 0.9];
    pub const TENTACLE: [f32; 4] = [0.95, 0.6, 1.0, 0.7];
    pub const TERRAIN: [f32; 4] = [0.25, 0.2, 0.12, 1.0];
    pub const CONSTRAINT: [f32; 4] = [1.0, 1.0, 1.0, 0.35];
    pub const BUBBLE: [f32; 4] = [0.8, 0.95, 1.0, 0.45];
    pub const ROPE: [f32; 4] = [0.6, 0.5, 0.35, 1.0];
    pub const BACKGROUND: [f32; 4] = [0.02, 0.12, 0.25, 1.0];

    /// Fill color for a body
    pub fn for_tag(tag: BodyTag) -> [f32; 4] {
        match tag {
            BodyTag::Diver => DIVER,
            BodyTag::ChainLink => CHAIN_LINK,
            BodyTag::AnchorWeight => ANCHOR,
            BodyTag::JellyHead => JELLY_HEAD,
            BodyTag::TentacleSegment => TENTACLE,
            BodyTag::Terrain => TERRAIN,
        }
    }

    /// Black with the given alpha
    pub fn shade(alpha: f32) -> [f32; 4] {
        [0.0, 0.0, 0.0, alpha.clamp(0.0, 1.0)]
    }
}
