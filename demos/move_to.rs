use glam::DVec2;
use kinegrid::*;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let cfg = WorldConfig::from_toml_str(
        r#"
        damp_value = 4.0
        damp_threshold = 0.8

        [partition]
        kind = "zone"
        cell_size = [32.0, 32.0]
        zone_cells = [16, 16]
        "#,
    )
    .unwrap_or_else(|e| {
        eprintln!("{e}");
        std::process::exit(1);
    });
    let mut world = PhysicsWorld::new(cfg);
    let mut store = EntityTable::new();

    let walker = store.spawn(DVec2::ZERO, DVec2::splat(16.0));
    world.toggle_transform(&store, walker);
    world.toggle_collision(&store, walker, Some(DVec2::ZERO), Some(DVec2::splat(16.0)));
    world.insert(&store, walker);

    let pillar = store.spawn(DVec2::new(120.0, 60.0), DVec2::new(16.0, 64.0));
    world.toggle_collision(&store, pillar, Some(DVec2::ZERO), Some(DVec2::new(16.0, 64.0)));
    world.insert(&store, pillar);

    // A short path of waypoints; the second leg runs into the pillar
    let legs = [DVec2::new(100.0, 0.0), DVec2::new(100.0, 90.0), DVec2::new(200.0, 90.0)];
    for (i, target) in legs.into_iter().enumerate() {
        let mut cmd = MoveCommand::new(target, 120.0);
        if i > 0 {
            cmd = cmd.append();
        }
        if let Err(e) = world.move_to(&store, walker, cmd) {
            eprintln!("rejected: {e}");
        }
    }

    for frame in 0..300 {
        world.update(&mut store, 1.0 / 60.0);
        if frame % 30 == 0 {
            println!(
                "frame={} pos={:?} vel={:?} pending={:?}",
                frame,
                store.position(walker),
                world.get_velocity(&store, walker),
                world.pending_commands(walker)
            );
        }
    }
}
