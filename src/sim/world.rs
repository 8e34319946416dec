//! Physics world capability
//!
//! The core never owns a physics engine directly. Everything it needs from
//! one (bodies, distance constraints, forces, stepping, collision-begin
//! events) goes through [`PhysicsWorld`], so chain and vitals logic can run
//! against the reference [`super::engine::SimpleWorld`] or a test double.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::rotate;

/// Gameplay role of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyTag {
    Diver,
    ChainLink,
    AnchorWeight,
    JellyHead,
    TentacleSegment,
    Terrain,
}

/// Opaque body reference handed out by a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Opaque constraint reference handed out by a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConstraintHandle(pub u32);

/// Collision filter group
///
/// Bodies sharing the same negative group never collide with each other.
/// Group 0 means "no group".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CollisionGroup(pub i32);

impl CollisionGroup {
    pub const NONE: CollisionGroup = CollisionGroup(0);

    /// Whether two bodies with these groups may collide
    pub fn can_collide(self, other: CollisionGroup) -> bool {
        !(self.0 != 0 && self.0 == other.0 && self.0 < 0)
    }
}

/// Body geometry in local space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rectangle { width: f32, height: f32 },
    Circle { radius: f32 },
    /// Regular polygon with `sides` vertices on a circle of `radius`
    Polygon { sides: u32, radius: f32 },
    /// Trapezoid whose top edge is narrowed by `slope * width` on each side
    Trapezoid { width: f32, height: f32, slope: f32 },
    /// Arbitrary convex outline, already centred on its centroid
    Vertices(Vec<Vec2>),
}

/// Segments used to outline a circle body
const CIRCLE_OUTLINE_SEGMENTS: u32 = 16;

impl Shape {
    /// Outline vertices relative to the body centre, counter-clockwise
    pub fn local_vertices(&self) -> Vec<Vec2> {
        match self {
            Shape::Rectangle { width, height } => {
                let (hw, hh) = (width / 2.0, height / 2.0);
                vec![
                    Vec2::new(-hw, -hh),
                    Vec2::new(hw, -hh),
                    Vec2::new(hw, hh),
                    Vec2::new(-hw, hh),
                ]
            }
            Shape::Circle { radius } => ring_points(CIRCLE_OUTLINE_SEGMENTS, *radius),
            Shape::Polygon { sides, radius } => ring_points(*sides, *radius),
            Shape::Trapezoid {
                width,
                height,
                slope,
            } => {
                let (hw, hh) = (width / 2.0, height / 2.0);
                let inset = slope * width;
                vec![
                    Vec2::new(-hw, hh),
                    Vec2::new(-hw + inset, -hh),
                    Vec2::new(hw - inset, -hh),
                    Vec2::new(hw, hh),
                ]
            }
            Shape::Vertices(points) => points.clone(),
        }
    }

    /// Area in square pixels
    pub fn area(&self) -> f32 {
        match self {
            Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
            _ => polygon_area(&self.local_vertices()),
        }
    }

    /// Moment of inertia for unit mass about the centre
    pub fn unit_inertia(&self) -> f32 {
        match self {
            Shape::Rectangle { width, height } => (width * width + height * height) / 12.0,
            Shape::Circle { radius } => radius * radius / 2.0,
            _ => {
                let verts = self.local_vertices();
                let n = verts.len().max(1) as f32;
                verts.iter().map(|v| v.length_squared()).sum::<f32>() / n / 2.0
            }
        }
    }

    /// Radius of the smallest centred circle containing the outline
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Shape::Circle { radius } => *radius,
            _ => self
                .local_vertices()
                .iter()
                .map(|v| v.length())
                .fold(0.0, f32::max),
        }
    }

    /// Whether the geometry is usable (positive extents, enough vertices)
    pub fn is_valid(&self) -> bool {
        match self {
            Shape::Rectangle { width, height } => *width > 0.0 && *height > 0.0,
            Shape::Circle { radius } => *radius > 0.0,
            Shape::Polygon { sides, radius } => *sides >= 3 && *radius > 0.0,
            Shape::Trapezoid { width, height, slope } => {
                *width > 0.0 && *height > 0.0 && (0.0..0.5).contains(slope)
            }
            Shape::Vertices(points) => points.len() >= 3 && polygon_area(points) > 0.0,
        }
    }
}

fn ring_points(sides: u32, radius: f32) -> Vec<Vec2> {
    (0..sides)
        .map(|i| {
            let theta = i as f32 / sides as f32 * std::f32::consts::TAU;
            Vec2::new(theta.cos(), theta.sin()) * radius
        })
        .collect()
}

/// Absolute polygon area (shoelace)
pub fn polygon_area(points: &[Vec2]) -> f32 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f32 = (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum();
    twice.abs() / 2.0
}

/// Centroid of a simple polygon (falls back to the vertex mean when degenerate)
pub fn polygon_centroid(points: &[Vec2]) -> Vec2 {
    let n = points.len();
    let mut signed_area = 0.0;
    let mut centroid = Vec2::ZERO;
    for i in 0..n {
        let (a, b) = (points[i], points[(i + 1) % n]);
        let cross = a.perp_dot(b);
        signed_area += cross;
        centroid += (a + b) * cross;
    }
    if signed_area.abs() < f32::EPSILON {
        return points.iter().copied().sum::<Vec2>() / n.max(1) as f32;
    }
    centroid / (3.0 * signed_area)
}

/// Description of a body to create
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub position: Vec2,
    pub angle: f32,
    pub shape: Shape,
    pub tag: BodyTag,
    pub group: CollisionGroup,
    pub air_friction: f32,
    pub is_static: bool,
    /// Lock rotation (infinite inertia)
    pub fixed_rotation: bool,
}

/// Default air friction for dynamic bodies
pub const DEFAULT_AIR_FRICTION: f32 = 0.01;

impl BodyDesc {
    pub fn new(position: Vec2, shape: Shape, tag: BodyTag) -> Self {
        Self {
            position,
            angle: 0.0,
            shape,
            tag,
            group: CollisionGroup::NONE,
            air_friction: DEFAULT_AIR_FRICTION,
            is_static: false,
            fixed_rotation: false,
        }
    }

    pub fn rectangle(position: Vec2, width: f32, height: f32, tag: BodyTag) -> Self {
        Self::new(position, Shape::Rectangle { width, height }, tag)
    }

    pub fn circle(position: Vec2, radius: f32, tag: BodyTag) -> Self {
        Self::new(position, Shape::Circle { radius }, tag)
    }

    pub fn polygon(position: Vec2, sides: u32, radius: f32, tag: BodyTag) -> Self {
        Self::new(position, Shape::Polygon { sides, radius }, tag)
    }

    pub fn trapezoid(position: Vec2, width: f32, height: f32, slope: f32, tag: BodyTag) -> Self {
        Self::new(
            position,
            Shape::Trapezoid {
                width,
                height,
                slope,
            },
            tag,
        )
    }

    /// Body from a world-space outline; the body sits at the outline's centroid
    pub fn from_vertices(world_points: &[Vec2], tag: BodyTag) -> Self {
        let centroid = polygon_centroid(world_points);
        let local = world_points.iter().map(|p| *p - centroid).collect();
        Self::new(centroid, Shape::Vertices(local), tag)
    }

    pub fn with_angle(mut self, angle: f32) -> Self {
        self.angle = angle;
        self
    }

    pub fn with_group(mut self, group: CollisionGroup) -> Self {
        self.group = group;
        self
    }

    pub fn with_air_friction(mut self, air_friction: f32) -> Self {
        self.air_friction = air_friction;
        self
    }

    pub fn with_fixed_rotation(mut self) -> Self {
        self.fixed_rotation = true;
        self
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }
}

/// Snapshot of a body as the world currently sees it
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub handle: BodyHandle,
    pub tag: BodyTag,
    pub shape: Shape,
    pub group: CollisionGroup,
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,
    pub mass: f32,
    pub inverse_mass: f32,
    pub inverse_inertia: f32,
    pub air_friction: f32,
    pub is_static: bool,
}

impl Body {
    /// Build a body from its description using `density` for mass
    pub fn from_desc(handle: BodyHandle, desc: BodyDesc, density: f32) -> Self {
        let mass = desc.shape.area() * density;
        let (inverse_mass, inverse_inertia) = if desc.is_static || mass <= 0.0 {
            (0.0, 0.0)
        } else if desc.fixed_rotation {
            (1.0 / mass, 0.0)
        } else {
            (1.0 / mass, 1.0 / (mass * desc.shape.unit_inertia()))
        };
        Self {
            handle,
            tag: desc.tag,
            shape: desc.shape,
            group: desc.group,
            position: desc.position,
            velocity: Vec2::ZERO,
            angle: desc.angle,
            angular_velocity: 0.0,
            mass,
            inverse_mass,
            inverse_inertia,
            air_friction: desc.air_friction,
            is_static: desc.is_static,
        }
    }

    /// Convert a body-local offset to world space
    #[inline]
    pub fn world_point(&self, local: Vec2) -> Vec2 {
        self.position + rotate(local, self.angle)
    }

    /// Outline in world space
    pub fn vertices(&self) -> Vec<Vec2> {
        self.shape
            .local_vertices()
            .into_iter()
            .map(|v| self.world_point(v))
            .collect()
    }
}

/// One end of a constraint: a body-local offset, or a fixed world point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attachment {
    pub body: Option<BodyHandle>,
    /// Local offset on the body, or the world point when `body` is `None`
    pub point: Vec2,
}

impl Attachment {
    pub fn body(body: BodyHandle, point: Vec2) -> Self {
        Self {
            body: Some(body),
            point,
        }
    }

    pub fn world(point: Vec2) -> Self {
        Self { body: None, point }
    }
}

/// Description of a distance constraint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintDesc {
    pub a: Attachment,
    pub b: Attachment,
    /// Fraction of the length error corrected per solver pass, in (0, 1]
    pub stiffness: f32,
    /// Rest length; `None` uses the distance at creation time
    pub length: Option<f32>,
}

impl ConstraintDesc {
    pub fn new(a: Attachment, b: Attachment, stiffness: f32) -> Self {
        Self {
            a,
            b,
            stiffness,
            length: None,
        }
    }

    pub fn with_length(mut self, length: f32) -> Self {
        self.length = Some(length);
        self
    }
}

/// A resolved constraint as stored by a world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraint {
    pub handle: ConstraintHandle,
    pub a: Attachment,
    pub b: Attachment,
    pub stiffness: f32,
    pub length: f32,
}

/// Pair reported when two bodies start touching (order is unspecified)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub a: BodyHandle,
    pub a_tag: BodyTag,
    pub b: BodyHandle,
    pub b_tag: BodyTag,
}

impl CollisionPair {
    /// If `body` is in the pair, the other side's handle and tag
    pub fn other(&self, body: BodyHandle) -> Option<(BodyHandle, BodyTag)> {
        if self.a == body {
            Some((self.b, self.b_tag))
        } else if self.b == body {
            Some((self.a, self.a_tag))
        } else {
            None
        }
    }
}

/// Rigid-body physics capability consumed by the simulation core
pub trait PhysicsWorld {
    /// Create a body and return its handle
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle;

    /// Create a distance constraint between two attachments
    fn add_constraint(&mut self, desc: ConstraintDesc) -> ConstraintHandle;

    /// Look up a body
    fn body(&self, handle: BodyHandle) -> Option<&Body>;

    /// Look up a constraint
    fn constraint(&self, handle: ConstraintHandle) -> Option<&Constraint>;

    /// Allocate a fresh collision group. Non-colliding groups are negative.
    fn next_group(&mut self, non_colliding: bool) -> CollisionGroup;

    /// Set a body's inverse rotational inertia (0 locks rotation)
    fn set_inverse_inertia(&mut self, handle: BodyHandle, inverse_inertia: f32);

    /// Apply a force at a world point for the next step
    fn apply_force(&mut self, handle: BodyHandle, world_point: Vec2, force: Vec2);

    /// Gravity acceleration applied every step
    fn set_gravity(&mut self, gravity: Vec2);

    /// Advance by `dt` ms, reporting each collision pair that begins this step
    fn step(&mut self, dt: f32, on_collision_start: &mut dyn FnMut(CollisionPair));

    /// Number of bodies in the world
    fn body_count(&self) -> usize;

    /// Every body, in handle order
    fn bodies(&self) -> Vec<&Body>;

    /// Every constraint, in handle order
    fn constraints(&self) -> Vec<&Constraint>;

    /// World positions of both ends of a constraint
    fn constraint_endpoints(&self, handle: ConstraintHandle) -> Option<(Vec2, Vec2)> {
        let constraint = self.constraint(handle)?;
        let a = self.attachment_point(&constraint.a)?;
        let b = self.attachment_point(&constraint.b)?;
        Some((a, b))
    }

    /// World position of one constraint end
    fn attachment_point(&self, attachment: &Attachment) -> Option<Vec2> {
        match attachment.body {
            Some(handle) => self.body(handle).map(|b| b.world_point(attachment.point)),
            None => Some(attachment.point),
        }
    }
}
