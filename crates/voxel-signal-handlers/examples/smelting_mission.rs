//! Example: an agent walking through an ore field and smelting iron

use rand::SeedableRng;
use tracing_subscriber::EnvFilter;
use voxel_signal_handlers::prelude::*;
use voxel_signal_handlers::{MissionEvent, Position, VoxelWorld};

const MISSION: &str = r#"
agent_name = "agent"

[[reward_for_nearby_block_type]]
dimension = 0
max = false

[[reward_for_nearby_block_type.block]]
type = ["gold_ore"]
reward = 1.0
cooldown_in_ticks = 2

[[reward_for_nearby_block_type.block]]
type = ["diamond_ore"]
reward = 5.0
single_block = true

[[agent_quit_from_smelting_item]]

[[agent_quit_from_smelting_item.item]]
type = ["iron_ingot"]
amount = 8
description = "smelted-iron"
"#;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let registry = CategoryRegistry::vanilla();
    let config = MissionConfig::from_toml_str(MISSION)?;
    let mut handlers = MissionHandlers::from_config(&config, registry)?;

    // Build a seeded ore field around the origin
    let stone = BlockObservation::new(registry.resolve("stone")?);
    let gold = BlockObservation::new(registry.resolve("gold_ore")?);
    let mut world = VoxelWorld::centred(30);
    world.scatter(&mut rand::rngs::StdRng::seed_from_u64(7), stone, gold, 400);

    let bus = EventBus::new();
    handlers.start(&bus)?;

    let iron = ItemStack::new(registry.resolve("iron_ingot")?, 1);
    let mut total_reward = 0.0;
    for step in 0..40 {
        world.set_agent_position(Position::new(f64::from(step) * 0.5 - 10.0, 0.5, 0.5));
        bus.publish(MissionEvent::DiscreteMove);

        // The furnace reports every smelted stack several times over
        if step % 3 == 0 {
            for _ in 0..4 {
                bus.publish(MissionEvent::ItemSmelted(iron));
            }
        }

        let outcome = handlers.tick(&world);
        total_reward += outcome.reward.total();
        println!("Step {:>2}: reward = {:.3}", step + 1, outcome.reward.total());

        if let Some(code) = outcome.quit {
            println!("\nMission ended after {} steps with outcome '{}'", step + 1, code);
            break;
        }
    }

    println!("Total reward: {total_reward:.3}");
    handlers.stop();

    Ok(())
}
