use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dynafinder::entity::{MappingContext, PersistentEntity};
use dynafinder::finder::{DynamicFinder, Finders};
use dynafinder::family::FIND_ALL_BY;
use dynafinder::recording::RecordingSession;
use dynafinder::value::{Value, ValueType};

fn context() -> MappingContext {
    let mut context = MappingContext::new();
    context.keep(
        PersistentEntity::new("Person")
            .property("firstName", ValueType::String)
            .property("lastName", ValueType::String)
            .property("age", ValueType::Long)
            .property("enabled", ValueType::Boolean),
    );
    context
}

fn create_invocation(c: &mut Criterion) {
    let context = context();
    let finder = DynamicFinder::built_in(FIND_ALL_BY, &["And", "Or"]).expect("finder");
    c.bench_function("create invocation", |b| {
        b.iter(|| {
            finder
                .create_finder_invocation(
                    &context,
                    "Person",
                    black_box("findAllByLastNameAndAgeGreaterThan"),
                    None,
                    vec![Value::from("Smith"), Value::from("30")],
                )
                .expect("invocation")
        })
    });
}

fn dispatch_and_execute(c: &mut Criterion) {
    let session = RecordingSession::new(context());
    let finders = Finders::new().expect("finders");
    c.bench_function("dispatch and execute", |b| {
        b.iter(|| {
            finders
                .invoke(
                    &session,
                    "Person",
                    black_box("findAllEnabledByFirstNameLikeOrAgeBetween"),
                    vec![
                        Value::from("A%"),
                        Value::from(20),
                        Value::from(40),
                        Value::map([("max", 10)]),
                    ],
                )
                .expect("results")
        })
    });
}

criterion_group!(benches, create_invocation, dispatch_and_execute);
criterion_main!(benches);
