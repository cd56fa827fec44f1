use voxel_signal_handlers::prelude::*;
use voxel_signal_handlers::{Colour, MissionEvent, VoxelWorld};

fn item(name: &str, count: u32) -> ItemStack {
    ItemStack::new(CategoryRegistry::vanilla().resolve(name).unwrap(), count)
}

fn engine_with_stride(item: Vec<ItemSpecWithDescription>, stride: u32) -> CountingQuitEngine {
    let mut params = SmeltingQuitParams::new(item);
    params.sampling_stride = stride;
    CountingQuitEngine::new(&params, CategoryRegistry::vanilla()).unwrap()
}

fn engine(item: Vec<ItemSpecWithDescription>) -> CountingQuitEngine {
    engine_with_stride(item, 1)
}

fn iron(amount: u64, description: &str) -> ItemSpecWithDescription {
    ItemSpecWithDescription::new(MatchSpec::of_types(["iron_ingot"]), amount, description)
}

#[test]
fn test_quit_after_cumulative_threshold() {
    let mut engine = engine(vec![iron(4, "smelted-iron")]);

    assert!(engine.on_item_smelted(&item("iron_ingot", 2)));
    assert_eq!(engine.count_for(&item("iron_ingot", 1)), 2);
    assert!(!engine.wants_to_quit());

    assert!(engine.on_item_smelted(&item("iron_ingot", 3)));
    assert_eq!(engine.count_for(&item("iron_ingot", 1)), 5);
    assert!(engine.wants_to_quit());
    assert_eq!(engine.outcome(), "smelted-iron");
    assert_eq!(engine.quit_decision().map(|d| d.outcome.as_str()), Some("smelted-iron"));
}

#[test]
fn test_single_event_reaching_threshold() {
    let mut engine = engine(vec![iron(4, "smelted-iron")]);

    engine.on_item_smelted(&item("iron_ingot", 4));
    assert!(engine.wants_to_quit());
}

#[test]
fn test_sampling_stride() {
    let mut engine = engine_with_stride(vec![iron(1, "smelted-iron")], 4);
    let stack = item("iron_ingot", 64);

    for _ in 0..3 {
        assert!(!engine.on_item_smelted(&stack));
    }
    assert_eq!(engine.calls(), 3);
    assert_eq!(engine.count_for(&stack), 0);
    assert!(!engine.wants_to_quit());

    assert!(engine.on_item_smelted(&stack));
    assert_eq!(engine.count_for(&stack), 64);
    assert!(engine.wants_to_quit());

    let processed: Vec<bool> = (0..4).map(|_| engine.on_item_smelted(&stack)).collect();
    assert_eq!(processed, vec![false, false, false, true]);
    assert_eq!(engine.calls(), 8);
    assert_eq!(engine.count_for(&stack), 128);
}

#[test]
fn test_last_crossing_matcher_supplies_outcome() {
    let mut engine = engine(vec![
        iron(1, "first"),
        ItemSpecWithDescription::new(MatchSpec::of_types(["gold_ingot"]), 1, "gold"),
        iron(2, "second"),
        iron(50, "too-many"),
    ]);

    engine.on_item_smelted(&item("iron_ingot", 5));
    assert_eq!(engine.outcome(), "second");
}

#[test]
fn test_outcome_is_terminal_across_events() {
    let mut engine = engine(vec![
        iron(2, "iron"),
        ItemSpecWithDescription::new(MatchSpec::of_types(["gold_ingot"]), 2, "gold"),
    ]);

    engine.on_item_smelted(&item("iron_ingot", 3));
    engine.on_item_smelted(&item("gold_ingot", 3));

    assert_eq!(engine.outcome(), "iron");
    assert_eq!(engine.count_for(&item("gold_ingot", 1)), 3);
}

#[test]
fn test_unmatched_items_are_still_counted() {
    let mut engine = engine(vec![iron(4, "smelted-iron")]);

    engine.on_item_smelted(&item("gold_ingot", 3));
    engine.on_item_smelted(&item("gold_ingot", 4));

    assert_eq!(engine.count_for(&item("gold_ingot", 1)), 7);
    assert!(!engine.wants_to_quit());
}

#[test]
fn test_colour_filter_counts_per_colour() {
    let mut engine = engine(vec![ItemSpecWithDescription::new(
        MatchSpec::of_types(["dye"]).with_colours([Colour::Green]),
        3,
        "green-dye",
    )]);
    let green = item("dye", 2).with_colour(Colour::Green);
    let red = item("dye", 5).with_colour(Colour::Red);

    engine.on_item_smelted(&green);
    engine.on_item_smelted(&red);
    assert!(!engine.wants_to_quit());
    assert_eq!(engine.count_for(&green), 2);
    assert_eq!(engine.count_for(&red), 5);

    engine.on_item_smelted(&item("dye", 1).with_colour(Colour::Green));
    assert!(engine.wants_to_quit());
    assert_eq!(engine.outcome(), "green-dye");
    assert_eq!(engine.count_for(&green), 3);
}

#[test]
fn test_without_filters_colours_share_a_count() {
    let mut engine = engine(vec![ItemSpecWithDescription::new(
        MatchSpec::of_types(["dye"]),
        6,
        "any-dye",
    )]);

    engine.on_item_smelted(&item("dye", 3).with_colour(Colour::Green));
    engine.on_item_smelted(&item("dye", 3).with_colour(Colour::Red));

    assert_eq!(engine.count_for(&item("dye", 1)), 6);
    assert_eq!(engine.outcome(), "any-dye");
}

#[test]
fn test_bus_delivery_and_prepare_reset() {
    let world = VoxelWorld::centred(1);
    let bus = EventBus::new();
    let mut engine = engine(vec![iron(4, "smelted-iron")]);
    engine.prepare(&bus).unwrap();

    bus.publish(MissionEvent::ItemSmelted(item("iron_ingot", 2)));
    bus.publish(MissionEvent::DiscreteMove);
    bus.publish(MissionEvent::ItemSmelted(item("iron_ingot", 2)));
    engine.pump(&world);

    assert!(engine.wants_to_quit());
    assert_eq!(engine.calls(), 2);

    engine.prepare(&bus).unwrap();
    assert_eq!(bus.subscriber_count(), 1);
    assert!(!engine.wants_to_quit());
    assert_eq!(engine.outcome(), "");
    assert_eq!(engine.count_for(&item("iron_ingot", 1)), 0);

    engine.cleanup();
    engine.cleanup();
    assert_eq!(bus.subscriber_count(), 0);
}
