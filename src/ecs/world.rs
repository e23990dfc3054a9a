//! Entity pool wrapper around hecs

use hecs::Entity;

/// Entity pool: every sandbox entity and its components
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn an entity with the given components
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Despawn an entity
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Attach a component to an existing entity
    pub fn insert_one(
        &mut self,
        entity: Entity,
        component: impl hecs::Component,
    ) -> Result<(), hecs::NoSuchEntity> {
        self.inner.insert_one(entity, component)
    }

    /// Get a reference to a component; `T` is the component type itself
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Check if an entity has a component of type `T`
    pub fn has<T: hecs::Component>(&self, entity: Entity) -> bool {
        self.inner.get::<&T>(entity).is_ok()
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Get the number of entities
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    /// Check if the world is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Query for entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }

    /// Collect every entity carrying component `T`
    pub fn entities_with<T: hecs::Component>(&self) -> Vec<Entity> {
        self.inner
            .query::<&T>()
            .iter()
            .map(|(entity, _)| entity)
            .collect()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    struct Health(u32);

    #[test]
    fn test_spawn_despawn_counts() {
        let mut world = World::new();
        let a = world.spawn((Marker,));
        let b = world.spawn(());
        assert_eq!(world.len(), 2);

        assert!(world.has::<Marker>(a));
        assert!(!world.has::<Marker>(b));
        assert_eq!(world.entities_with::<Marker>(), vec![a]);

        world.despawn(a).unwrap();
        assert!(!world.contains(a));
        assert!(world.despawn(a).is_err());
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_insert_one_attaches_component() {
        let mut world = World::new();
        let entity = world.spawn(());
        world.insert_one(entity, Marker).unwrap();
        assert!(world.has::<Marker>(entity));
    }

    #[test]
    fn test_get_takes_component_type() {
        let mut world = World::new();
        let entity = world.spawn((Health(7),));
        assert_eq!(world.get::<Health>(entity).unwrap().0, 7);
        assert!(world.get::<Marker>(entity).is_err());
    }
}
