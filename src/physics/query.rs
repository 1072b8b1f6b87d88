// src/physics/query.rs
//! Ray casts and overlap queries over the ground + sphere colliders.

use bevy::prelude::*;

use super::ground::{Ground, HeightSampler, SlopeSampler};

/// Collision layers (one bit each).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Ground,
    Player,
    Enemy,
    Projectile,
    Trigger,
}

/// Bitmask of layers (fast filter).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(u32::MAX);

    pub const fn of(layer: Layer) -> Self {
        Self(1 << layer as u32)
    }

    pub const fn with(self, layer: Layer) -> Self {
        Self(self.0 | Self::of(layer).0)
    }

    pub const fn without(self, layer: Layer) -> Self {
        Self(self.0 & !Self::of(layer).0)
    }

    pub fn contains(self, layer: Layer) -> bool {
        (self.0 & Self::of(layer).0) != 0
    }
}

#[derive(Component, Clone, Copy, Debug)]
pub struct SphereCollider {
    pub radius: f32,
    pub layer: Layer,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    /// `None` for the ground.
    pub entity: Option<Entity>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlapHit {
    pub entity: Entity,
    pub center: Vec3,
    pub layer: Layer,
}

/// Shape queries the simulation consumes.
pub trait CollisionWorld {
    /// First hit along `dir` (need not be normalized) within `max_distance`.
    fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit>;
    /// Every hit along `dir` within `max_distance`, nearest first. Nothing
    /// past the ground is reported.
    fn raycast_all(&self, origin: Vec3, dir: Vec3, max_distance: f32, mask: LayerMask) -> Vec<RayHit>;
    /// Every collider whose sphere intersects the query sphere.
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<OverlapHit>;
}

#[derive(Clone, Copy, Debug)]
struct SphereProxy {
    entity: Entity,
    center: Vec3,
    radius: f32,
    layer: Layer,
}

/// Snapshot of everything queryable this step.
#[derive(Resource, Default)]
pub struct CollisionScene {
    ground: Ground,
    spheres: Vec<SphereProxy>,
}

const GROUND_MARCH_STEP: f32 = 0.25;
const GROUND_BISECT_ITERS: usize = 10;

impl CollisionScene {
    pub fn new(ground: Ground) -> Self {
        Self { ground, spheres: Vec::new() }
    }

    pub fn ground(&self) -> &Ground {
        &self.ground
    }

    pub fn set_ground(&mut self, ground: Ground) {
        self.ground = ground;
    }

    pub fn insert_sphere(&mut self, entity: Entity, center: Vec3, collider: SphereCollider) {
        self.spheres.push(SphereProxy { entity, center, radius: collider.radius, layer: collider.layer });
    }

    pub fn clear_spheres(&mut self) {
        self.spheres.clear();
    }

    fn raycast_ground(&self, origin: Vec3, dir: Vec3, max_distance: f32) -> Option<RayHit> {
        let g = &self.ground;
        let below = |p: Vec3| p.y <= g.sample_height(p.x, p.z);

        if below(origin) {
            return None;
        }

        // 1) Straight down: exact
        if dir.x.abs() < 1e-6 && dir.z.abs() < 1e-6 && dir.y < 0.0 {
            let h = g.sample_height(origin.x, origin.z);
            let distance = origin.y - h;
            if distance > max_distance {
                return None;
            }
            return Some(RayHit {
                point: Vec3::new(origin.x, h, origin.z),
                normal: g.sample_normal(origin.x, origin.z),
                distance,
                entity: None,
            });
        }

        // 2) March until we cross the surface, then bisect
        let mut t_low = 0.0;
        let mut t_high = None;
        let mut t = 0.0;
        while t < max_distance {
            t = (t + GROUND_MARCH_STEP).min(max_distance);
            if below(origin + dir * t) {
                t_high = Some(t);
                break;
            }
            t_low = t;
        }
        let mut t_high = t_high?;
        for _ in 0..GROUND_BISECT_ITERS {
            let t_mid = (t_low + t_high) * 0.5;
            if below(origin + dir * t_mid) {
                t_high = t_mid;
            } else {
                t_low = t_mid;
            }
        }

        let point = origin + dir * t_high;
        Some(RayHit {
            point,
            normal: g.sample_normal(point.x, point.z),
            distance: t_high,
            entity: None,
        })
    }
}

/// Ray / sphere intersection; `dir` normalized. Returns the entry distance.
fn ray_sphere(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    if c > 0.0 && b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    Some((-b - disc.sqrt()).max(0.0))
}

impl CollisionWorld for CollisionScene {
    fn raycast(&self, origin: Vec3, dir: Vec3, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        self.raycast_all(origin, dir, max_distance, mask).into_iter().next()
    }

    fn raycast_all(&self, origin: Vec3, dir: Vec3, max_distance: f32, mask: LayerMask) -> Vec<RayHit> {
        let dir = dir.normalize_or_zero();
        if dir == Vec3::ZERO || max_distance <= 0.0 {
            return Vec::new();
        }

        let mut hits: Vec<RayHit> = self
            .spheres
            .iter()
            .filter(|s| mask.contains(s.layer))
            .filter_map(|s| {
                let t = ray_sphere(origin, dir, s.center, s.radius)?;
                if t > max_distance {
                    return None;
                }
                let point = origin + dir * t;
                Some(RayHit {
                    point,
                    normal: (point - s.center).normalize_or(Vec3::Y),
                    distance: t,
                    entity: Some(s.entity),
                })
            })
            .collect();

        if mask.contains(Layer::Ground) {
            if let Some(ground) = self.raycast_ground(origin, dir, max_distance) {
                hits.retain(|h| h.distance < ground.distance);
                hits.push(ground);
            }
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<OverlapHit> {
        self.spheres
            .iter()
            .filter(|s| mask.contains(s.layer))
            .filter(|s| s.center.distance_squared(center) <= (s.radius + radius).powi(2))
            .map(|s| OverlapHit { entity: s.entity, center: s.center, layer: s.layer })
            .collect()
    }
}

/// Rebuild the sphere list from the live colliders.
pub fn sync_collision_scene(
    ground: Res<Ground>,
    mut scene: ResMut<CollisionScene>,
    colliders: Query<(Entity, &Transform, &SphereCollider)>,
) {
    if ground.is_changed() {
        scene.set_ground(ground.clone());
    }
    scene.clear_spheres();
    for (entity, tf, collider) in &colliders {
        scene.insert_sphere(entity, tf.translation, *collider);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::ground::{Ramp, RampAxis, RampGround};

    fn scene_with_enemy() -> (CollisionScene, Entity) {
        let mut world = World::new();
        let enemy = world.spawn_empty().id();
        let mut scene = CollisionScene::default();
        scene.insert_sphere(enemy, Vec3::new(0.0, 1.0, -10.0), SphereCollider { radius: 1.0, layer: Layer::Enemy });
        (scene, enemy)
    }

    #[test]
    fn layer_mask_bits() {
        let m = LayerMask::of(Layer::Ground).with(Layer::Enemy);
        assert!(m.contains(Layer::Ground));
        assert!(m.contains(Layer::Enemy));
        assert!(!m.contains(Layer::Player));
        assert!(!m.without(Layer::Enemy).contains(Layer::Enemy));
        assert!(LayerMask::ALL.contains(Layer::Trigger));
    }

    #[test]
    fn downward_probe_respects_length() {
        let scene = CollisionScene::default();
        let hit = scene.raycast(Vec3::new(0.0, 1.1, 0.0), Vec3::NEG_Y, 1.2, LayerMask::ALL).unwrap();
        assert!((hit.distance - 1.1).abs() < 1e-5);
        assert_eq!(hit.normal, Vec3::Y);
        assert!(scene.raycast(Vec3::new(0.0, 3.0, 0.0), Vec3::NEG_Y, 1.2, LayerMask::ALL).is_none());
    }

    #[test]
    fn ground_is_skipped_when_masked_out() {
        let scene = CollisionScene::default();
        let mask = LayerMask::ALL.without(Layer::Ground);
        assert!(scene.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Y, 5.0, mask).is_none());
    }

    #[test]
    fn ray_hits_sphere_before_ground() {
        let (scene, enemy) = scene_with_enemy();
        let hit = scene.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z, 100.0, LayerMask::ALL).unwrap();
        assert_eq!(hit.entity, Some(enemy));
        assert!((hit.distance - 9.0).abs() < 1e-4);
    }

    #[test]
    fn raycast_all_orders_hits_and_stops_at_ground() {
        let mut world = World::new();
        let near = world.spawn_empty().id();
        let far = world.spawn_empty().id();
        let buried = world.spawn_empty().id();
        let enemy = |radius| SphereCollider { radius, layer: Layer::Enemy };
        let mut scene = CollisionScene::default();
        scene.insert_sphere(far, Vec3::new(0.0, 3.0, -6.0), enemy(0.5));
        scene.insert_sphere(near, Vec3::new(0.0, 5.0, -2.0), enemy(0.5));
        // on the ray line but under the floor
        scene.insert_sphere(buried, Vec3::new(0.0, -0.5, -13.0), enemy(0.5));

        // drops 1 per 2 forward, reaching the floor at z = -12
        let dir = Vec3::new(0.0, -0.5, -1.0);
        let origin = Vec3::new(0.0, 6.0, 0.0);
        let hits = scene.raycast_all(origin, dir, 40.0, LayerMask::ALL);
        let targets: Vec<_> = hits.iter().map(|h| h.entity).collect();
        assert_eq!(targets, vec![Some(near), Some(far), None]);
        assert!((hits[2].point.z + 12.0).abs() < 0.01, "ground at {:?}", hits[2].point);

        let first = scene.raycast(origin, dir, 40.0, LayerMask::ALL).unwrap();
        assert_eq!(first.entity, Some(near));
    }

    #[test]
    fn slanted_ray_finds_ramp_surface() {
        let ground = RampGround {
            floor_y: 0.0,
            ramps: vec![Ramp {
                min_xz: Vec2::new(0.0, -10.0),
                max_xz: Vec2::new(20.0, 10.0),
                axis: RampAxis::PosX,
                angle_deg: 45.0,
            }],
        };
        let scene = CollisionScene::new(Ground::new(ground));
        // horizontal ray at y=2 must stop where the 45° ramp reaches y=2
        let hit = scene.raycast(Vec3::new(-5.0, 2.0, 0.0), Vec3::X, 50.0, LayerMask::of(Layer::Ground)).unwrap();
        assert!((hit.point.x - 2.0).abs() < 0.01, "hit at {:?}", hit.point);
        assert!(hit.entity.is_none());
    }

    #[test]
    fn overlap_filters_by_layer_and_distance() {
        let (scene, enemy) = scene_with_enemy();
        let hits = scene.overlap_sphere(Vec3::new(0.0, 1.0, -7.5), 2.0, LayerMask::of(Layer::Enemy));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entity, enemy);

        assert!(scene.overlap_sphere(Vec3::new(0.0, 1.0, -7.5), 2.0, LayerMask::of(Layer::Player)).is_empty());
        assert!(scene.overlap_sphere(Vec3::new(0.0, 1.0, -5.0), 2.0, LayerMask::ALL).is_empty());
    }
}
