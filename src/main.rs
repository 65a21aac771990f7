//! Ball Adventure entry point
//!
//! The browser build is driven from JavaScript through `ball_adventure::web`.
//! Natively this runs a headless session with a scripted player and logs what
//! happened, which is handy for tuning spawn rates.
//!
//! Usage: `ball-adventure [seed] [frames] [low|medium|high]`

#[cfg(not(target_arch = "wasm32"))]
use ball_adventure::sim::{TickInput, World, tick};
#[cfg(not(target_arch = "wasm32"))]
use ball_adventure::{PerformanceMode, Settings};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let frames: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3600);
    let mode = args
        .next()
        .and_then(|s| PerformanceMode::from_str(&s))
        .unwrap_or_default();

    log::info!(
        "Ball Adventure (native) running {} frames, seed {}, {} mode",
        frames,
        seed,
        mode.as_str()
    );

    let settings = Settings {
        seed: Some(seed),
        ..Settings::from_mode(mode)
    };
    let mut world = World::new(&settings);
    world.events.subscribe(|event| log::debug!("event: {}", event.name()));

    for _ in 0..frames {
        let input = scripted_input(&world);
        tick(&mut world, &input);
        for event in world.events.drain() {
            log::trace!("{:?}", event);
        }
        if world.frame % 600 == 0 {
            log::info!(
                "frame {}: x {:.0}, level {}, area level {}, {} enemies, score {}",
                world.frame,
                world.player.pos.x,
                world.player.level,
                world.area_level(),
                world.enemies.len(),
                world.score
            );
        }
        if world.game_over {
            log::info!("Player died on frame {}", world.frame);
            break;
        }
    }

    let stats = &world.stats;
    println!("frames:        {}", world.frame);
    println!("score:         {}", world.score);
    println!("player level:  {}", world.player.level);
    println!("spawned:       {}", stats.total_spawned);
    println!("killed:        {}", stats.total_killed);
    println!("safe zones:    {}", world.zones.zones().len());
    println!(
        "elite rolls:   {} ({:.1}% success)",
        stats.elite_attempts,
        stats.elite_success_rate() * 100.0
    );
}

/// Run right, hop now and then and keep shooting
#[cfg(not(target_arch = "wasm32"))]
fn scripted_input(world: &World) -> TickInput {
    let frame = world.frame;
    TickInput {
        right: true,
        jump: frame % 90 < 20,
        fire: true,
        aoe: world.enemies.len() > 8 && frame % 120 == 0,
        ..Default::default()
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm entry point is `web::start`
}
