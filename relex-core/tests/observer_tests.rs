use ctor::ctor;
use relex_core::not;
use relex_core::on_add;
use relex_core::on_remove;
use relex_core::Component;
use relex_core::EntityId;
use relex_core::Unsubscribe;
use relex_core::World;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

#[ctor]
fn init_logging() {
    log4rs::init_file("tests/log4rs.test.yaml", Default::default()).unwrap();
}

type Log = Rc<RefCell<Vec<(&'static str, EntityId)>>>;

fn record(log: &Log, name: &'static str) -> impl Fn(EntityId) + 'static {
    let log = log.clone();
    move |entity| log.borrow_mut().push((name, entity))
}

#[test]
fn add_and_remove_observed() {
    let mut world = World::new();
    let a = Component::new("A");
    let b = Component::new("B");
    let log = Log::default();
    world.observe(on_add([&a, &b]), record(&log, "add"));
    world.observe(on_remove([&a, &b]), record(&log, "remove"));

    let e = world.add_entity();
    world.add_component(e, &a).unwrap();
    assert!(log.borrow().is_empty());
    world.add_component(e, &b).unwrap();
    world.remove_component(e, &a).unwrap();

    assert_eq!(*log.borrow(), vec![("add", e), ("remove", e)]);
}

#[test]
fn entity_removal_observed() {
    let mut world = World::new();
    let a = Component::new("A");
    let log = Log::default();
    world.observe(on_remove([&a]), record(&log, "remove"));
    let e = world.add_entity();
    world.add_component(e, &a).unwrap();

    world.remove_entity(e).unwrap();

    assert_eq!(*log.borrow(), vec![("remove", e)]);
}

#[test]
fn not_term_observed() {
    let mut world = World::new();
    let a = Component::new("A");
    let log = Log::default();
    world.observe(on_add([not([&a])]), record(&log, "add"));
    world.observe(on_remove([not([&a])]), record(&log, "remove"));

    let e = world.add_entity();
    world.add_component(e, &a).unwrap();

    assert_eq!(*log.borrow(), vec![("add", e), ("remove", e)]);
}

#[test]
fn repeated_add_not_observed_twice() {
    let mut world = World::new();
    let a = Component::new("A");
    let b = Component::new("B");
    let log = Log::default();
    world.observe(on_add([&a]), record(&log, "add"));
    let e = world.add_entity();
    world.add_component(e, &a).unwrap();
    world.add_component(e, &a).unwrap();
    world.add_component(e, &b).unwrap();

    assert_eq!(*log.borrow(), vec![("add", e)]);
}

#[test]
fn set_observer_runs_after_add_observer() {
    let mut world = World::new();
    let health = Component::new("Health");
    let values: Rc<RefCell<Vec<u32>>> = Default::default();
    let log = Log::default();
    {
        let values = values.clone();
        let log = log.clone();
        world.observe(on_add([&health]), move |entity| {
            log.borrow_mut().push(("add", entity));
            values.borrow_mut().push(100);
        });
    }
    {
        let values = values.clone();
        let log = log.clone();
        world.observe_set(&health, move |entity, data: &dyn Any| {
            log.borrow_mut().push(("set", entity));
            if let Some(value) = data.downcast_ref::<u32>() {
                values.borrow_mut().push(*value);
            }
        });
    }

    let e = world.add_entity();
    world.add_component_with(e, &health, 42u32).unwrap();

    assert_eq!(*log.borrow(), vec![("add", e), ("set", e)]);
    assert_eq!(values.borrow().last(), Some(&42));
}

#[test]
fn last_get_observer_wins() {
    let mut world = World::new();
    let a = Component::new("A");
    world.observe_get(&a, |_| Some(Box::new(1u32) as Box<dyn Any>));
    world.observe_get(&a, |_| Some(Box::new(2u32) as Box<dyn Any>));
    world.observe_get(&a, |_| None);
    let e = world.add_entity();
    assert!(world.get_component_data(e, &a).is_none());

    world.add_component(e, &a).unwrap();
    let value = world
        .get_component_data(e, &a)
        .and_then(|it| it.downcast_ref::<u32>().copied());
    assert_eq!(value, Some(2));
}

#[test]
fn unsubscribed_observer_silent() {
    let mut world = World::new();
    let a = Component::new("A");
    let log = Log::default();
    let unsubscribe = world.observe(on_add([&a]), record(&log, "add"));
    let e1 = world.add_entity();
    world.add_component(e1, &a).unwrap();
    unsubscribe.unsubscribe();
    let e2 = world.add_entity();
    world.add_component(e2, &a).unwrap();

    assert_eq!(*log.borrow(), vec![("add", e1)]);
}

#[test]
fn dropped_handle_keeps_subscription() {
    let mut world = World::new();
    let a = Component::new("A");
    let log = Log::default();
    drop(world.observe(on_add([&a]), record(&log, "add")));
    let e = world.add_entity();
    world.add_component(e, &a).unwrap();

    assert_eq!(*log.borrow(), vec![("add", e)]);
}

#[test]
fn observer_unsubscribes_itself() {
    let mut world = World::new();
    let a = Component::new("A");
    let log = Log::default();
    let handle: Rc<RefCell<Option<Unsubscribe>>> = Default::default();
    {
        let handle_in_closure = handle.clone();
        let log = log.clone();
        let unsubscribe = world.observe(on_add([&a]), move |entity| {
            log.borrow_mut().push(("add", entity));
            if let Some(it) = handle_in_closure.borrow_mut().take() {
                it.unsubscribe();
            }
        });
        *handle.borrow_mut() = Some(unsubscribe);
    }
    let e1 = world.add_entity();
    world.add_component(e1, &a).unwrap();
    let e2 = world.add_entity();
    world.add_component(e2, &a).unwrap();

    assert_eq!(*log.borrow(), vec![("add", e1)]);
}

#[test]
fn unsubscribe_after_query_removed_is_noop() {
    let mut world = World::new();
    let a = Component::new("A");
    let log = Log::default();
    let unsubscribe = world.observe(on_add([&a]), record(&log, "add"));
    world.remove_query([&a]);
    unsubscribe.unsubscribe();
    let e = world.add_entity();
    world.add_component(e, &a).unwrap();
    assert!(log.borrow().is_empty());
}
