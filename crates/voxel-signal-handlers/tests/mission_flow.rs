use std::path::PathBuf;

use approx::assert_relative_eq;
use voxel_signal_handlers::prelude::*;
use voxel_signal_handlers::{CellPos, MissionEvent, Position, SignalError, VoxelWorld};

fn mission_json() -> serde_json::Value {
    serde_json::json!({
        "agent_name": "alice",
        "reward_for_nearby_block_type": [{
            "dimension": 1,
            "block": [{ "type": ["gold_ore"], "reward": 10.0, "distribution": "alice:3 bob:1" }]
        }],
        "agent_quit_from_smelting_item": [
            {
                "sampling_stride": 1,
                "item": [{ "type": ["iron_ingot"], "amount": 4, "description": "smelted-iron" }]
            },
            {
                "sampling_stride": 1,
                "item": [{ "type": ["iron_ingot"], "amount": 1, "description": "any-iron" }]
            }
        ]
    })
}

fn world() -> VoxelWorld {
    let mut world = VoxelWorld::centred(12);
    world.set_agent_position(Position::new(0.5, 0.5, 0.5));
    let gold = CategoryRegistry::vanilla().resolve("gold_ore").unwrap();
    world.set_block(CellPos::new(5, 0, 0), BlockObservation::new(gold));
    world
}

fn handlers_for(config: &MissionConfig) -> MissionHandlers {
    MissionHandlers::from_config(config, CategoryRegistry::vanilla()).unwrap()
}

fn mission_path(extension: &str) -> PathBuf {
    let name = format!("voxel-signal-mission-{}.{extension}", std::process::id());
    std::env::temp_dir().join(name)
}

fn iron(count: u32) -> ItemStack {
    ItemStack::new(CategoryRegistry::vanilla().resolve("iron_ingot").unwrap(), count)
}

#[test]
fn test_mission_lifecycle() {
    let config = MissionConfig::from_json_str(&mission_json().to_string()).unwrap();
    let mut handlers = handlers_for(&config);
    let bus = EventBus::new();
    let world = world();

    handlers.start(&bus).unwrap();
    assert!(handlers.is_running());
    assert_eq!(bus.subscriber_count(), 3);

    bus.publish(MissionEvent::DiscreteMove);
    let outcome = handlers.tick(&world);
    assert_relative_eq!(outcome.reward.get(1), 3.75);
    assert_eq!(outcome.quit, None);

    let outcome = handlers.tick(&world);
    assert!(outcome.reward.is_empty());

    bus.publish(MissionEvent::ItemSmelted(iron(4)));
    let outcome = handlers.tick(&world);
    assert_eq!(outcome.quit.as_deref(), Some("smelted-iron"));

    handlers.stop();
    assert!(!handlers.is_running());
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn test_restart_does_not_leak_subscriptions() {
    let config = MissionConfig::from_json_str(&mission_json().to_string()).unwrap();
    let mut handlers = handlers_for(&config);
    let bus = EventBus::new();

    handlers.start(&bus).unwrap();
    handlers.start(&bus).unwrap();
    assert_eq!(bus.subscriber_count(), 3);
}

#[test]
fn test_drop_releases_subscriptions() {
    let config = MissionConfig::from_json_str(&mission_json().to_string()).unwrap();
    let bus = EventBus::new();
    {
        let mut handlers = handlers_for(&config);
        handlers.start(&bus).unwrap();
        assert_eq!(bus.subscriber_count(), 3);
    }
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn test_unknown_item_fails_mission_setup() {
    let mut document = mission_json();
    document["agent_quit_from_smelting_item"][0]["item"][0]["type"] =
        serde_json::json!(["iron_nugget"]);
    let config = MissionConfig::from_json_str(&document.to_string()).unwrap();

    let result = MissionHandlers::from_config(&config, CategoryRegistry::vanilla());
    assert!(matches!(result, Err(SignalError::UnknownCategory(name)) if name == "iron_nugget"));
}

#[test]
fn test_custom_registry() {
    let mut registry = CategoryRegistry::new();
    let ore = registry.register("modded:crystal_ore");
    let mut world = VoxelWorld::centred(3);
    world.set_agent_position(Position::new(0.5, 0.5, 0.5));
    world.set_block(CellPos::new(0, 0, 0), BlockObservation::new(ore));

    let document = serde_json::json!({
        "reward_for_nearby_block_type": [{
            "block": [{ "type": ["modded:crystal_ore"], "reward": 2.0, "single_block": true }]
        }]
    });
    let config = MissionConfig::from_json_str(&document.to_string()).unwrap();
    let mut handlers = MissionHandlers::from_config(&config, &registry).unwrap();
    let bus = EventBus::new();
    handlers.start(&bus).unwrap();

    bus.publish(MissionEvent::DiscreteMove);
    let outcome = handlers.tick(&world);
    let expected = 2.0 * (10.0 - 0.0) / 10.0;
    assert_relative_eq!(outcome.reward.total(), expected);
}

#[test]
fn test_toml_file_round_trip() {
    let path = mission_path("toml");
    std::fs::write(
        &path,
        r#"
[[agent_quit_from_smelting_item]]
sampling_stride = 1

[[agent_quit_from_smelting_item.item]]
type = ["iron_ingot"]
amount = 2
description = "two-ingots"
"#,
    )
    .unwrap();

    let config = MissionConfig::from_path(&path);
    let _ = std::fs::remove_file(&path);
    let config = config.unwrap();

    let mut handlers = handlers_for(&config);
    let bus = EventBus::new();
    handlers.start(&bus).unwrap();
    bus.publish(MissionEvent::ItemSmelted(iron(2)));
    assert_eq!(handlers.tick(&world()).quit.as_deref(), Some("two-ingots"));
}

#[test]
fn test_unsupported_extension() {
    let path = mission_path("yaml");
    std::fs::write(&path, "agent_name: alice").unwrap();

    let result = MissionConfig::from_path(&path);
    let _ = std::fs::remove_file(&path);
    assert!(matches!(result, Err(SignalError::Config(_))));
}
