use log::info;
use relex_core::on_remove;
use relex_core::Component;
use relex_core::EntityId;
use relex_core::Relation;
use relex_core::RelationOptions;
use relex_core::Target;
use relex_core::World;
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::rc::Rc;

#[derive(Default)]
struct Vec2Store {
    x: RefCell<HashMap<EntityId, f32>>,
    y: RefCell<HashMap<EntityId, f32>>,
}

impl Vec2Store {
    fn set(&self, entity: EntityId, x: f32, y: f32) {
        self.x.borrow_mut().insert(entity, x);
        self.y.borrow_mut().insert(entity, y);
    }

    fn get(&self, entity: EntityId) -> (f32, f32) {
        let x = self.x.borrow().get(&entity).copied().unwrap_or_default();
        let y = self.y.borrow().get(&entity).copied().unwrap_or_default();
        (x, y)
    }
}

fn movement(world: &mut World, position: &Component, velocity: &Component) {
    let (Some(positions), Some(velocities)) = (
        position.store::<Vec2Store>(),
        velocity.store::<Vec2Store>(),
    ) else {
        return;
    };
    for entity in &world.query([position, velocity]) {
        let (x, y) = positions.get(*entity);
        let (dx, dy) = velocities.get(*entity);
        positions.set(*entity, x + dx, y + dy);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    log4rs::init_file("log4rs.yaml", Default::default())?;

    let mut world = World::new();
    let position = Component::with_store("Position", Vec2Store::default());
    let velocity = Component::with_store("Velocity", Vec2Store::default());
    let positions = position
        .store::<Vec2Store>()
        .ok_or("Position carries no store")?;

    let e = world.add_entity();
    world.add_component(e, &position)?;
    world.add_component(e, &velocity)?;
    positions.set(e, 0.0, 0.0);
    if let Some(velocities) = velocity.store::<Vec2Store>() {
        velocities.set(e, 1.0, 0.5);
    }

    let before = world.query([&position, &velocity]);
    for _ in 0..3 {
        movement(&mut world, &position, &velocity);
    }
    info!("{} moved to {:?}", e, positions.get(e));

    world.remove_component(e, &velocity)?;
    info!(
        "moving after velocity removal: {:?}, earlier snapshot: {:?}",
        world.query([&position, &velocity]),
        before
    );

    let child_of = Relation::with_options(
        "ChildOf",
        RelationOptions::new().exclusive().auto_remove_subject(),
    );
    let removed = Rc::new(RefCell::new(vec![]));
    {
        let removed = removed.clone();
        world.observe(on_remove([child_of.pair(Target::Wildcard)]), move |it| {
            removed.borrow_mut().push(it)
        });
    }
    let ship = world.add_entity();
    let turret = world.add_entity();
    let barrel = world.add_entity();
    world.add_component(turret, &child_of.pair(ship))?;
    world.add_component(barrel, &child_of.pair(turret))?;

    world.remove_entity(ship)?;
    info!(
        "removing {} took down {:?}, {} entities left",
        ship,
        removed.borrow(),
        world.get_all_entities().len()
    );

    world.delete();
    Ok(())
}
