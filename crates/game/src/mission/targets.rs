use engine::{SurfaceSize, Vec2};
use rand::Rng;

const AREA_MARGIN_X: f32 = 120.0;
const AREA_MARGIN_TOP: f32 = 140.0;
const AREA_MARGIN_BOTTOM: f32 = 120.0;
const FALLBACK_SURFACE: SurfaceSize = SurfaceSize::new(1280, 720);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub id: TargetId,
    pub position: Vec2,
    pub hit_radius: f32,
    /// Drawn core; purely visual.
    pub inner_radius: f32,
    pub alive: bool,
    pub age: f32,
    pub ttl: Option<f32>,
}

/// Screen-space rectangle targets spawn inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub min: Vec2,
    pub max: Vec2,
}

impl PlayArea {
    pub fn for_surface(surface: SurfaceSize) -> Self {
        Self::from_margins(surface).unwrap_or_else(|| {
            Self::from_margins(FALLBACK_SURFACE).unwrap_or(PlayArea {
                min: Vec2::ZERO,
                max: Vec2::ZERO,
            })
        })
    }

    fn from_margins(surface: SurfaceSize) -> Option<Self> {
        let min = Vec2::new(AREA_MARGIN_X, AREA_MARGIN_TOP);
        let max = Vec2::new(
            surface.width as f32 - AREA_MARGIN_X,
            surface.height as f32 - AREA_MARGIN_BOTTOM,
        );
        (max.x > min.x && max.y > min.y).then_some(PlayArea { min, max })
    }

    pub fn sample(&self, rng: &mut impl Rng) -> Vec2 {
        Vec2::new(
            rng.gen_range(self.min.x..=self.max.x),
            rng.gen_range(self.min.y..=self.max.y),
        )
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn clamp(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
        )
    }
}

/// Live targets of one run, capped by alive count.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPool {
    targets: Vec<Target>,
    cap: usize,
    next_id: u32,
}

impl TargetPool {
    pub fn new(cap: usize) -> Self {
        Self {
            targets: Vec::with_capacity(cap),
            cap,
            next_id: 0,
        }
    }

    pub fn alive_count(&self) -> usize {
        self.targets.iter().filter(|target| target.alive).count()
    }

    pub fn alive(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|target| target.alive)
    }

    pub fn get(&self, id: TargetId) -> Option<&Target> {
        self.alive().find(|target| target.id == id)
    }

    /// Adds a target unless the pool is full.
    pub fn spawn(
        &mut self,
        position: Vec2,
        hit_radius: f32,
        inner_radius: f32,
        ttl: Option<f32>,
    ) -> Option<TargetId> {
        if self.alive_count() >= self.cap {
            return None;
        }
        let id = TargetId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.targets.push(Target {
            id,
            position,
            hit_radius,
            inner_radius,
            alive: true,
            age: 0.0,
            ttl,
        });
        Some(id)
    }

    /// Nearest alive target whose hit radius contains `point`.
    pub fn hit_test(&self, point: Vec2) -> Option<TargetId> {
        if !point.is_finite() {
            return None;
        }
        self.alive()
            .map(|target| (target.id, target.position.distance(point), target.hit_radius))
            .filter(|(_, distance, radius)| distance <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _, _)| id)
    }

    pub fn consume(&mut self, id: TargetId) -> bool {
        match self
            .targets
            .iter_mut()
            .find(|target| target.alive && target.id == id)
        {
            Some(target) => {
                target.alive = false;
                true
            }
            None => false,
        }
    }

    /// Ages alive targets and expires those past their ttl. Returns the number expired.
    pub fn age(&mut self, dt_seconds: f32) -> usize {
        let mut expired = 0;
        for target in self.targets.iter_mut().filter(|target| target.alive) {
            target.age += dt_seconds;
            if target.ttl.is_some_and(|ttl| target.age >= ttl) {
                target.alive = false;
                expired += 1;
            }
        }
        expired
    }

    /// Pulls alive targets back inside `area`; returns how many moved.
    pub fn clamp_into(&mut self, area: &PlayArea) -> usize {
        let mut moved = 0;
        for target in self.targets.iter_mut().filter(|target| target.alive) {
            if !area.contains(target.position) {
                target.position = area.clamp(target.position);
                moved += 1;
            }
        }
        moved
    }

    pub fn compact(&mut self) {
        self.targets.retain(|target| target.alive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn hit_test_picks_nearest_alive_within_radius() {
        let mut pool = TargetPool::new(4);
        let far = pool.spawn(Vec2::new(20.0, 0.0), 30.0, 10.0, None);
        let near = pool.spawn(Vec2::new(5.0, 0.0), 30.0, 10.0, None);
        assert!(far.is_some());
        assert_eq!(pool.hit_test(Vec2::ZERO), near);

        pool.consume(near.expect("near target"));
        assert_eq!(pool.hit_test(Vec2::ZERO), far);
        assert_eq!(pool.hit_test(Vec2::new(200.0, 0.0)), None);
    }

    #[test]
    fn hit_radius_boundary_is_inclusive() {
        let mut pool = TargetPool::new(1);
        let id = pool.spawn(Vec2::ZERO, 10.0, 4.0, None);
        assert_eq!(pool.hit_test(Vec2::new(10.0, 0.0)), id);
        assert_eq!(pool.hit_test(Vec2::new(10.5, 0.0)), None);
    }

    #[test]
    fn cap_counts_alive_targets_only() {
        let mut pool = TargetPool::new(2);
        let first = pool.spawn(Vec2::ZERO, 5.0, 2.0, None).expect("first");
        pool.spawn(Vec2::ZERO, 5.0, 2.0, None).expect("second");
        assert_eq!(pool.spawn(Vec2::ZERO, 5.0, 2.0, None), None);

        assert!(pool.consume(first));
        assert!(!pool.consume(first));
        assert!(pool.spawn(Vec2::ZERO, 5.0, 2.0, None).is_some());
        assert_eq!(pool.alive_count(), 2);
    }

    #[test]
    fn ttl_expires_targets_and_compact_drops_them() {
        let mut pool = TargetPool::new(3);
        pool.spawn(Vec2::ZERO, 5.0, 2.0, Some(1.0));
        pool.spawn(Vec2::ZERO, 5.0, 2.0, None);
        assert_eq!(pool.age(0.6), 0);
        assert_eq!(pool.age(0.6), 1);
        pool.compact();
        assert_eq!(pool.alive_count(), 1);
        assert_eq!(pool.alive().count(), 1);
    }

    #[test]
    fn play_area_respects_margins_and_falls_back() {
        let area = PlayArea::for_surface(SurfaceSize::new(800, 600));
        assert_eq!(area.min, Vec2::new(120.0, 140.0));
        assert_eq!(area.max, Vec2::new(680.0, 480.0));

        let fallback = PlayArea::for_surface(SurfaceSize::new(0, 0));
        assert_eq!(fallback.max, Vec2::new(1160.0, 600.0));

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..64 {
            assert!(area.contains(area.sample(&mut rng)));
        }
    }

    #[test]
    fn clamp_into_moves_only_targets_outside_the_area() {
        let area = PlayArea::for_surface(SurfaceSize::new(800, 600));
        let mut pool = TargetPool::new(3);
        pool.spawn(Vec2::new(1100.0, 590.0), 30.0, 10.0, None);
        pool.spawn(Vec2::new(300.0, 300.0), 30.0, 10.0, None);

        assert_eq!(pool.clamp_into(&area), 1);
        let positions: Vec<Vec2> = pool.alive().map(|target| target.position).collect();
        assert_eq!(positions, vec![Vec2::new(680.0, 480.0), Vec2::new(300.0, 300.0)]);
        assert_eq!(pool.clamp_into(&area), 0);
    }
}
