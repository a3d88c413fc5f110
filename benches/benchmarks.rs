use criterion::*;
use strata_ecs::prelude::*;

const COUNT: usize = 10000;

#[derive(Clone, Default)]
struct Transform {
    x: f32,
    y: f32,
    z: f32,
}

impl Component for Transform {}

#[derive(Clone, Default)]
struct Translation {
    x: f32,
    y: f32,
    z: f32,
}

impl Component for Translation {}

#[derive(Clone, Default)]
struct Velocity {
    x: f32,
    y: f32,
    z: f32,
}

impl Component for Velocity {}

fn registry() -> std::sync::Arc<TypeRegistry> {
    let mut builder = SchemaBuilder::new();
    builder
        .register_component::<Transform>()
        .register_component::<Translation>()
        .register_component::<Velocity>();
    builder.build()
}

fn populated_store() -> EntityStore {
    let mut store = EntityStore::new(registry());
    for _ in 0..COUNT {
        let entity = store.create_entity();
        store.add_component(entity, Transform::default()).unwrap();
        store.add_component(entity, Translation::default()).unwrap();
        store.add_component(entity, Velocity { x: 1.0, y: 2.0, z: 3.0 }).unwrap();
    }
    store
}

fn create_entities(c: &mut Criterion) {
    c.bench_function("Create entities", |b| {
        b.iter_batched(
            || EntityStore::new(registry()),
            |mut store| {
                for _ in 0..COUNT {
                    let entity = store.create_entity();
                    store.add_component(entity, Transform::default()).unwrap();
                    store.add_component(entity, Translation::default()).unwrap();
                    store.add_component(entity, Velocity::default()).unwrap();
                }
                store
            },
            BatchSize::PerIteration,
        );
    });
}

fn delete_entities(c: &mut Criterion) {
    c.bench_function("Delete entities", |b| {
        b.iter_batched(
            || {
                let mut store = populated_store();
                let entities = store.query::<(Transform,)>().unwrap().entities();
                (store, entities)
            },
            |(mut store, entities)| {
                for id in entities {
                    let entity = store.entity_by_id(id).unwrap();
                    store.delete_entity(entity).unwrap();
                }
                store
            },
            BatchSize::PerIteration,
        );
    });
}

fn component_churn(c: &mut Criterion) {
    c.bench_function("Add and remove a component", |b| {
        let mut store = EntityStore::new(registry());
        let entity = store.create_entity();
        store.add_component(entity, Transform::default()).unwrap();

        b.iter(|| {
            store.add_component(entity, Velocity::default()).unwrap();
            store.remove_component::<Velocity>(entity).unwrap();
        });
    });
}

fn iterate_entities(c: &mut Criterion) {
    let mut group = c.benchmark_group("Iterate entities");

    group.bench_function("Single-threaded", |b| {
        let mut store = populated_store();
        b.iter(|| {
            store
                .query::<(Transform, Translation, Velocity)>()
                .unwrap()
                .run(|(m, t, v): (&mut Transform, &mut Translation, &mut Velocity)| {
                    t.x += v.x;
                    t.y += v.y;
                    t.z += v.z;
                    m.x = t.x;
                    m.y = t.y;
                    m.z = t.z;
                });
        });
    });

    group.bench_function("Multi-threaded", |b| {
        let mut store = populated_store();
        let runner = JobRunner::new(std::thread::available_parallelism().unwrap().get() - 1);
        b.iter(|| {
            store
                .query::<(Transform, Translation, Velocity)>()
                .unwrap()
                .run_parallel(&runner, |(m, t, v): (&mut Transform, &mut Translation, &mut Velocity)| {
                    t.x += v.x;
                    t.y += v.y;
                    t.z += v.z;
                    m.x = t.x;
                    m.y = t.y;
                    m.z = t.z;
                });
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    create_entities,
    delete_entities,
    component_churn,
    iterate_entities
);
criterion_main!(benches);
