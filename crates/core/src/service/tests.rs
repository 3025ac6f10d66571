use super::*;
use crate::*;
use std::sync::Arc;
use std::thread;

const WORLD: &str = "minecraft:overworld";

fn worlds() -> Arc<dyn WorldResolver> {
    Arc::new(StaticWorlds::new().with_world(WORLD, ItemRegistry::open()))
}

fn service_with(persistence: Arc<MemoryPersistence>) -> RewardService<Arc<MemoryPersistence>> {
    let store = RewardStore::open(persistence, Some(worlds()));
    let permissions = OperatorPermissions::new([ActorId::new("admin")]);
    RewardService::new(store, Box::new(permissions), ServiceConfig::default())
}

fn service() -> RewardService<Arc<MemoryPersistence>> {
    service_with(Arc::new(MemoryPersistence::new()))
}

fn admin() -> Actor {
    Actor::new("admin", "Admin")
}

fn player(id: &str) -> Actor {
    Actor::new(id, format!("{id}-name"))
}

fn at(x: i32, y: i32, z: i32) -> Location {
    Location::new(WORLD, x, y, z)
}

fn diamond() -> Payload {
    Payload::new("minecraft:diamond", 1)
}

fn place(service: &RewardService<Arc<MemoryPersistence>>, location: &Location, category: Option<&str>) {
    let mut events = EventBus::default();
    service
        .enter_setup_mode(&admin().id, category, &mut events)
        .expect("setup mode");
    let result = service.handle_interaction(&admin(), location, Some(&diamond()), &mut events);
    assert!(matches!(result.outcome, Outcome::Created(_)), "{result:?}");
}

fn claim(
    service: &RewardService<Arc<MemoryPersistence>>,
    actor: &Actor,
    location: &Location,
) -> Interaction {
    service.handle_interaction(actor, location, None, &mut EventBus::default())
}

#[test]
fn setup_creates_record_and_exits_mode() {
    let service = service();
    let mut events = EventBus::default();
    service
        .enter_setup_mode(&admin().id, None, &mut events)
        .expect("setup");
    let result = service.handle_interaction(&admin(), &at(1, 2, 3), Some(&diamond()), &mut events);
    assert_eq!(result.path, InteractionPath::Setup);
    let Outcome::Created(record) = &result.outcome else {
        panic!("expected creation, got {result:?}");
    };
    assert!(record.claimants().is_empty());
    assert_eq!(record.category(), DEFAULT_CATEGORY);
    assert_eq!(service.store().count(), 1);
    assert_eq!(service.store().get(&at(1, 2, 3)).as_ref(), Some(record));
    assert!(!service.modes().is_setup(&admin().id));
    let drained: Vec<_> = events.drain().collect();
    assert!(drained
        .iter()
        .any(|event| matches!(event, Event::RewardCreated { .. })));
}

#[test]
fn setup_without_payload_keeps_mode() {
    let service = service();
    let mut events = EventBus::default();
    service
        .enter_setup_mode(&admin().id, None, &mut events)
        .expect("setup");
    let empty = service.handle_interaction(&admin(), &at(0, 0, 0), None, &mut events);
    assert_eq!(empty.outcome, Outcome::Rejected(Rejection::EmptyPayload));
    let air = service.handle_interaction(
        &admin(),
        &at(0, 0, 0),
        Some(&Payload::new(AIR_ITEM, 1)),
        &mut events,
    );
    assert_eq!(air.outcome, Outcome::Rejected(Rejection::EmptyPayload));
    assert_eq!(service.store().count(), 0);
    assert!(service.modes().is_setup(&admin().id));
}

#[test]
fn setup_in_unknown_world_is_invalid_location() {
    let service = service();
    let mut events = EventBus::default();
    service
        .enter_setup_mode(&admin().id, None, &mut events)
        .expect("setup");
    let result = service.handle_interaction(
        &admin(),
        &Location::new("minecraft:the_end", 0, 64, 0),
        Some(&diamond()),
        &mut events,
    );
    assert_eq!(result.outcome, Outcome::Rejected(Rejection::InvalidLocation));
    assert_eq!(service.store().count(), 0);
}

#[test]
fn setup_requires_known_category() {
    let service = service();
    let mut events = EventBus::default();
    assert_eq!(
        service.enter_setup_mode(&admin().id, Some("easter"), &mut events),
        Err(Rejection::UnknownCategory("easter".to_string()))
    );
    assert!(!service.modes().is_setup(&admin().id));
    assert_eq!(service.create_category("easter"), Ok(true));
    place(&service, &at(5, 5, 5), Some("easter"));
    let record = service.store().get(&at(5, 5, 5)).expect("record");
    assert_eq!(record.category(), "easter");
}

#[test]
fn setup_never_replaces_a_live_reward() {
    let persistence = Arc::new(MemoryPersistence::new());
    let service = service_with(Arc::clone(&persistence));
    place(&service, &at(0, 0, 0), None);
    let p1 = player("p1");
    assert!(matches!(
        claim(&service, &p1, &at(0, 0, 0)).outcome,
        Outcome::Claimed(_)
    ));
    let saves_before = persistence.saves();

    let mut events = EventBus::default();
    service
        .enter_setup_mode(&admin().id, None, &mut events)
        .expect("setup");
    let dirt = Payload::new("minecraft:dirt", 1);
    let result = service.handle_interaction(&admin(), &at(0, 0, 0), Some(&dirt), &mut events);
    assert_eq!(result.outcome, Outcome::Rejected(Rejection::RewardExists));
    assert_eq!(result.feedback(), Feedback::RewardAlreadyHere);
    assert!(service.modes().is_setup(&admin().id));
    assert_eq!(persistence.saves(), saves_before);

    let record = service.store().get(&at(0, 0, 0)).expect("record");
    assert_eq!(record.payload(), &diamond());
    assert!(record.has_claimed(&ActorId::new("p1")));
    assert_eq!(
        claim(&service, &p1, &at(0, 0, 0)).outcome,
        Outcome::Rejected(Rejection::AlreadyClaimed)
    );
}

#[test]
fn setup_needs_permission() {
    let service = service();
    let mut events = EventBus::default();
    let guest = player("guest");
    service
        .enter_setup_mode(&guest.id, None, &mut events)
        .expect("mode is tracked regardless of rights");
    let result = service.handle_interaction(&guest, &at(0, 0, 0), Some(&diamond()), &mut events);
    assert_eq!(
        result.outcome,
        Outcome::Rejected(Rejection::NoPermission(nodes::COMMAND_SET.to_string()))
    );
    assert_eq!(service.store().count(), 0);
}

#[test]
fn remove_miss_keeps_mode_then_hit_exits() {
    let service = service();
    place(&service, &at(1, 1, 1), None);
    let mut events = EventBus::default();
    service.enter_remove_mode(&admin().id, &mut events);

    let miss = service.handle_interaction(&admin(), &at(9, 9, 9), None, &mut events);
    assert_eq!(miss.path, InteractionPath::Remove);
    assert_eq!(miss.outcome, Outcome::Rejected(Rejection::NoRewardHere));
    assert!(!miss.passes_through());
    assert!(service.modes().is_remove(&admin().id));

    let hit = service.handle_interaction(&admin(), &at(1, 1, 1), None, &mut events);
    assert!(matches!(hit.outcome, Outcome::Removed(_)));
    assert!(!service.modes().is_remove(&admin().id));
    assert_eq!(service.store().count(), 0);
}

#[test]
fn claim_twice_is_idempotent() {
    let service = service();
    place(&service, &at(0, 0, 0), None);
    let p1 = player("p1");

    let first = claim(&service, &p1, &at(0, 0, 0));
    let Outcome::Claimed(claimed) = &first.outcome else {
        panic!("expected claim, got {first:?}");
    };
    assert_eq!(claimed.payload, diamond());
    assert_eq!(
        claimed.record.claimants().iter().collect::<Vec<_>>(),
        vec![&ActorId::new("p1")]
    );

    let second = claim(&service, &p1, &at(0, 0, 0));
    assert_eq!(second.outcome, Outcome::Rejected(Rejection::AlreadyClaimed));
    let record = service.store().get(&at(0, 0, 0)).expect("record");
    assert_eq!(record.claimants().len(), 1);
}

#[test]
fn claim_is_persisted_immediately() {
    let persistence = Arc::new(MemoryPersistence::new());
    let service = service_with(Arc::clone(&persistence));
    place(&service, &at(0, 0, 0), None);
    claim(&service, &player("p1"), &at(0, 0, 0));
    let saved = persistence.last_saved().expect("saved");
    assert!(saved
        .get(&at(0, 0, 0))
        .expect("record")
        .has_claimed(&ActorId::new("p1")));
}

#[test]
fn claim_on_empty_location_passes_through() {
    let service = service();
    let result = claim(&service, &player("p1"), &at(3, 3, 3));
    assert!(result.passes_through());
    assert_eq!(result.feedback(), Feedback::PassThrough);
}

#[test]
fn claim_respects_category_permissions() {
    let store = RewardStore::open(Arc::new(MemoryPersistence::new()), Some(worlds()));
    let mut grants = GrantPermissions::new();
    grants.grant(ActorId::new("admin"), nodes::ADMIN);
    grants.grant(ActorId::new("p1"), nodes::claim_category("vip"));
    let service = RewardService::new(store, Box::new(grants), ServiceConfig::default());
    service.create_category("vip").expect("category");
    place(&service, &at(0, 0, 0), Some("vip"));
    place(&service, &at(1, 0, 0), None);

    assert!(matches!(
        claim(&service, &player("p1"), &at(0, 0, 0)).outcome,
        Outcome::Claimed(_)
    ));
    assert_eq!(
        claim(&service, &player("p1"), &at(1, 0, 0)).outcome,
        Outcome::Rejected(Rejection::NoPermission(nodes::claim_category(
            DEFAULT_CATEGORY
        )))
    );
}

#[test]
fn reset_claims_counts_changed_records() {
    let persistence = Arc::new(MemoryPersistence::new());
    let service = service_with(Arc::clone(&persistence));
    for x in 0..3 {
        place(&service, &at(x, 0, 0), None);
    }
    claim(&service, &player("p1"), &at(0, 0, 0));
    claim(&service, &player("p1"), &at(2, 0, 0));
    claim(&service, &player("p2"), &at(1, 0, 0));

    let saves_before = persistence.saves();
    assert_eq!(service.reset_claims(&ActorId::new("p1"), &mut EventBus::default()), 2);
    assert_eq!(persistence.saves(), saves_before + 1);
    for record in service.store().list_all().values() {
        assert!(!record.has_claimed(&ActorId::new("p1")));
    }
    let untouched = service.store().get(&at(1, 0, 0)).expect("record");
    assert!(untouched.has_claimed(&ActorId::new("p2")));

    assert_eq!(service.reset_claims(&ActorId::new("p1"), &mut EventBus::default()), 0);
    assert_eq!(persistence.saves(), saves_before + 1);
}

#[test]
fn clear_all_returns_count() {
    let service = service();
    for x in 0..4 {
        place(&service, &at(x, 0, 0), None);
    }
    assert_eq!(service.clear_all(&mut EventBus::default()), 4);
    assert_eq!(service.store().count(), 0);
}

#[test]
fn disconnect_clears_mode() {
    let service = service();
    let mut events = EventBus::default();
    service
        .enter_setup_mode(&admin().id, None, &mut events)
        .expect("setup");
    service.enter_remove_mode(&admin().id, &mut events);
    service.on_disconnect(&admin().id);
    service.on_disconnect(&ActorId::new("never-seen"));
    assert!(!service.modes().is_setup(&admin().id));
    assert!(!service.modes().is_remove(&admin().id));
}

#[test]
fn exit_mode_reports_previous() {
    let service = service();
    let mut events = EventBus::default();
    service.enter_remove_mode(&admin().id, &mut events);
    assert_eq!(service.exit_mode(&admin().id, &mut events), ActorMode::Remove);
    assert_eq!(service.exit_mode(&admin().id, &mut events), ActorMode::None);
}

#[test]
fn list_entries_filters_by_category() {
    let service = service();
    service.create_category("hunt").expect("category");
    place(&service, &at(0, 0, 0), None);
    place(&service, &at(1, 0, 0), Some("hunt"));
    place(&service, &at(2, 0, 0), Some("hunt"));

    assert_eq!(service.list_entries(None).expect("all").len(), 3);
    let hunt = service.list_entries(Some("hunt")).expect("hunt");
    assert_eq!(hunt.len(), 2);
    assert!(hunt.iter().all(|record| record.category() == "hunt"));
    assert_eq!(
        service.list_entries(Some("nope")),
        Err(Rejection::UnknownCategory("nope".to_string()))
    );
}

#[test]
fn categories_always_include_default() {
    let service = service();
    assert!(service.list_categories().contains(DEFAULT_CATEGORY));
    assert_eq!(
        service.create_category("bad name"),
        Err(Rejection::InvalidCategoryName("bad name".to_string()))
    );
}

#[test]
fn completing_a_category_renders_commands() {
    let service = service();
    service.create_category("eggs").expect("category");
    place(&service, &at(0, 0, 0), Some("eggs"));
    place(&service, &at(1, 0, 0), Some("eggs"));
    place(&service, &at(2, 0, 0), None);
    assert_eq!(
        service.add_completion_command("eggs", "give {player} minecraft:cake"),
        Ok(0)
    );

    let p1 = player("p1");
    let first = claim(&service, &p1, &at(0, 0, 0));
    let Outcome::Claimed(first) = first.outcome else {
        panic!("expected claim");
    };
    assert!(first.completion.is_none());

    let mut events = EventBus::default();
    let second = service.handle_interaction(&p1, &at(1, 0, 0), None, &mut events);
    assert_eq!(second.feedback(), Feedback::CategoryCompleted);
    let Outcome::Claimed(second) = second.outcome else {
        panic!("expected claim");
    };
    let completion = second.completion.expect("completion");
    assert_eq!(completion.category, "eggs");
    assert_eq!(completion.commands, vec!["give p1-name minecraft:cake".to_string()]);
    assert!(events
        .drain()
        .any(|event| matches!(event, Event::CategoryCompleted { .. })));
}

#[test]
fn completion_commands_management() {
    let service = service();
    assert_eq!(
        service.add_completion_command("missing", "say hi"),
        Err(Rejection::UnknownCategory("missing".to_string()))
    );
    service.add_completion_command(DEFAULT_CATEGORY, "say one").expect("add");
    service.add_completion_command(DEFAULT_CATEGORY, "say two").expect("add");
    assert_eq!(
        service.remove_completion_command(DEFAULT_CATEGORY, 7),
        Err(Rejection::NoSuchCompletionCommand {
            category: DEFAULT_CATEGORY.to_string(),
            index: 7
        })
    );
    assert_eq!(
        service.remove_completion_command(DEFAULT_CATEGORY, 0),
        Ok("say one".to_string())
    );
    let listed = service.completion_commands(None).expect("list");
    assert_eq!(listed.get(DEFAULT_CATEGORY), Some(&vec!["say two".to_string()]));
}

#[test]
fn protection_and_proximity() {
    let service = service();
    place(&service, &at(0, 64, 0), None);
    place(&service, &at(10, 64, 0), None);
    place(&service, &at(40, 64, 0), None);
    assert!(service.is_protected(&at(0, 64, 0)));
    assert!(!service.is_protected(&at(0, 65, 0)));

    let p1 = ActorId::new("p1");
    let near = service.unclaimed_in_range(&p1, &at(2, 64, 0));
    assert_eq!(near.len(), 2);
    claim(&service, &player("p1"), &at(0, 64, 0));
    let near = service.unclaimed_in_range(&p1, &at(2, 64, 0));
    assert_eq!(near.len(), 1);
    assert_eq!(near[0].location(), &at(10, 64, 0));
    let other_world = Location::new("minecraft:the_nether", 0, 64, 0);
    assert!(service.unclaimed_in_range(&p1, &other_world).is_empty());
}

#[test]
fn concurrent_claims_and_remove_resolve_cleanly() {
    let service = Arc::new(service());
    place(&service, &at(0, 0, 0), None);
    let claimers: Vec<_> = (0..12)
        .map(|i| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                let actor = player(&format!("p{i}"));
                claim(&service, &actor, &at(0, 0, 0)).outcome
            })
        })
        .collect();
    let remover = {
        let service = Arc::clone(&service);
        thread::spawn(move || {
            let mut events = EventBus::default();
            service.enter_remove_mode(&admin().id, &mut events);
            service
                .handle_interaction(&admin(), &at(0, 0, 0), None, &mut events)
                .outcome
        })
    };
    let removed = remover.join().expect("remover");
    let Outcome::Removed(removed) = removed else {
        panic!("remove should always find the record");
    };
    let mut claimed = 0;
    for handle in claimers {
        match handle.join().expect("claimer") {
            Outcome::Claimed(_) => claimed += 1,
            Outcome::Rejected(Rejection::NoRewardHere) => {}
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    // Every successful claim happened before the removal and is in the
    // removed record.
    assert_eq!(removed.claimants().len(), claimed);
    assert_eq!(service.store().count(), 0);
}
