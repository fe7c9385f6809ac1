use glam::DVec2;
use kinegrid::*;
use std::time::Instant;

fn lcg(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    *seed
}

fn unit(seed: &mut u32) -> f64 {
    lcg(seed) as f64 / u32::MAX as f64
}

fn main() {
    env_logger::init();

    let partition = match std::env::args().nth(1).as_deref() {
        Some("zone") => PartitionConfig::Zone(ZoneConfig::default()),
        _ => PartitionConfig::Grid(GridConfig::default()),
    };
    let mut world = PhysicsWorld::new(WorldConfig {
        partition,
        enable_timing: true,
        ..WorldConfig::default()
    });
    let mut store = EntityTable::new();

    let n = 20_000usize; // number of bodies
    let mut seed = 1u32;
    for i in 0..n {
        let pos = DVec2::new(unit(&mut seed) * 8000.0 - 4000.0, unit(&mut seed) * 8000.0 - 4000.0);
        let size = DVec2::splat(8.0 + unit(&mut seed) * 16.0);
        let id = store.spawn(pos, size);
        world.toggle_collision(&store, id, Some(DVec2::ZERO), Some(size));
        world.insert(&store, id);
        // Every other body moves; the rest are static obstacles
        if i % 2 == 0 {
            world.toggle_transform(&store, id);
            let vel = DVec2::new(unit(&mut seed) * 400.0 - 200.0, unit(&mut seed) * 400.0 - 200.0);
            world.set_velocity(&store, id, Some(vel.x), Some(vel.y));
        }
    }

    let frames = 120;
    let t0 = Instant::now();
    for _ in 0..frames {
        world.update(&mut store, 1.0 / 60.0);
    }
    let total = t0.elapsed();

    let stats = world.debug_stats();
    println!(
        "N={} frames={} total={:?} cells={} buckets={} memberships={}",
        n, frames, total, stats.partition.cells, stats.partition.buckets, stats.partition.memberships
    );
    if let Some(t) = world.timing() {
        println!(
            "last step={:.3}ms (steer={:.3}ms collide={:.3}ms reindex={:.3}ms) stepped={} reindexed={}",
            t.step_ms, t.steer_ms, t.collide_ms, t.reindex_ms, t.entities_stepped, t.entities_reindexed
        );
    }
}
