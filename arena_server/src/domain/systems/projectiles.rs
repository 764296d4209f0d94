use crate::domain::store::EntityStore;

/// Ages every projectile by `dt` and moves the ones still alive.
///
/// Projectiles are cosmetic: they never collide, they only fly until their
/// lifetime runs out. Returns how many were removed this tick.
pub fn tick_projectiles(store: &mut EntityStore, dt: f32) -> usize {
    for p in store.projectiles_mut() {
        p.lifetime -= dt;
        if p.lifetime > 0.0 {
            p.position = p.position + p.direction.scale(p.speed * dt);
        }
    }

    let before = store.projectiles().count();
    store.retain_projectiles(|p| p.lifetime > 0.0);
    before - store.projectiles().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::math::Vec3;
    use crate::domain::state::{Projectile, ProjectileKind};

    fn projectile(lifetime: f32) -> Projectile {
        Projectile {
            id: "shot-1".to_string(),
            position: Vec3::ZERO,
            direction: Vec3::new(1.0, 0.0, 0.0),
            speed: 20.0,
            damage: 25,
            owner_id: "p1".to_string(),
            kind: ProjectileKind::Bullet,
            lifetime,
        }
    }

    #[test]
    fn when_projectile_is_alive_then_it_moves_along_direction() {
        let mut store = EntityStore::new();
        store.insert_projectile(projectile(1.0));

        tick_projectiles(&mut store, 0.25);

        let p = store.projectile("shot-1").expect("projectile should survive");
        assert_eq!(p.position, Vec3::new(5.0, 0.0, 0.0));
        assert_eq!(p.lifetime, 0.75);
    }

    #[test]
    fn when_lifetime_elapses_then_projectile_is_removed_not_before() {
        let mut store = EntityStore::new();
        store.insert_projectile(projectile(1.0));

        for _ in 0..3 {
            assert_eq!(tick_projectiles(&mut store, 0.25), 0);
            assert!(store.projectile("shot-1").is_some());
        }

        assert_eq!(tick_projectiles(&mut store, 0.25), 1);
        assert!(store.projectile("shot-1").is_none());
    }
}
