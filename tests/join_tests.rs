use lazylinq::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct Person {
    id: u32,
    name: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
struct Pet {
    owner: u32,
    name: &'static str,
}

fn people() -> Query<Person> {
    from_vec(vec![
        Person { id: 1, name: "ann" },
        Person { id: 2, name: "bob" },
        Person { id: 3, name: "cid" },
    ])
}

fn pets() -> Query<Pet> {
    from_vec(vec![
        Pet { owner: 3, name: "rex" },
        Pet { owner: 1, name: "tom" },
        Pet { owner: 3, name: "kit" },
    ])
}

fn counting_pets(pulls: Arc<AtomicUsize>) -> Query<Pet> {
    pets().select(move |pet| {
        pulls.fetch_add(1, Ordering::SeqCst);
        pet
    })
}

fn counting_people(pulls: Arc<AtomicUsize>) -> Query<Person> {
    people().select(move |p| {
        pulls.fetch_add(1, Ordering::SeqCst);
        p
    })
}

#[test]
fn test_join_preserves_outer_then_inner_order() {
    let rows = people()
        .join(pets(), |p| p.id, |pet| pet.owner, |p, pet| (p.name, pet.name))
        .to_vec()
        .unwrap();
    assert_eq!(rows, vec![("ann", "tom"), ("cid", "rex"), ("cid", "kit")]);
}

#[test]
fn test_join_with_empty_inner() {
    let rows = people()
        .join(empty::<Pet>(), |p| p.id, |pet| pet.owner, |p, pet| (p.id, pet.owner))
        .to_vec()
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_left_join_keeps_unmatched_outer() {
    let rows = people()
        .left_join(
            pets(),
            |p| p.id,
            |pet| pet.owner,
            |p, pet| format!("{}:{}", p.name, pet.name),
            |p| format!("{}:-", p.name),
        )
        .to_vec()
        .unwrap();
    assert_eq!(rows, vec!["ann:tom", "bob:-", "cid:rex", "cid:kit"]);
}

#[test]
fn test_group_join_one_row_per_outer() {
    let rows = people()
        .group_join(pets(), |p| p.id, |pet| pet.owner, |p, pets| {
            (p.name, pets.into_iter().map(|pet| pet.name).collect::<Vec<_>>())
        })
        .to_vec()
        .unwrap();
    assert_eq!(
        rows,
        vec![
            ("ann", vec!["tom"]),
            ("bob", vec![]),
            ("cid", vec!["rex", "kit"]),
        ]
    );
}

#[test]
fn test_join_on_predicate() {
    let rows = from_vec(vec![1, 5, 10])
        .join_on(from_vec(vec![3, 6, 9]), |o, i| o < i, |o, i| (*o, *i))
        .to_vec()
        .unwrap();
    assert_eq!(rows, vec![(1, 3), (1, 6), (1, 9), (5, 6), (5, 9)]);
}

#[test]
fn test_group_join_on_predicate() {
    let rows = from_vec(vec![1, 5, 10])
        .group_join_on(from_vec(vec![3, 6, 9]), |o, i| o < i, |o, matches| (o, matches.len()))
        .to_vec()
        .unwrap();
    assert_eq!(rows, vec![(1, 3), (5, 2), (10, 0)]);
}

#[test]
fn test_inner_table_built_once_per_enumeration() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let joined = people().join(
        counting_pets(pulls.clone()),
        |p| p.id,
        |pet| pet.owner,
        |p, pet| (p.id, pet.name),
    );
    assert_eq!(pulls.load(Ordering::SeqCst), 0);

    assert_eq!(joined.count().unwrap(), 3);
    assert_eq!(pulls.load(Ordering::SeqCst), 3);

    assert_eq!(joined.count().unwrap(), 3);
    assert_eq!(pulls.load(Ordering::SeqCst), 6);
}

#[test]
fn test_join_stops_pulling_outer_on_early_termination() {
    let outer_pulls = Arc::new(AtomicUsize::new(0));
    let counter = outer_pulls.clone();
    let outer = people().select(move |p| {
        counter.fetch_add(1, Ordering::SeqCst);
        p
    });
    let first = outer
        .join(pets(), |p| p.id, |pet| pet.owner, |p, pet| (p.name, pet.name))
        .first()
        .unwrap();
    assert_eq!(first, Some(("ann", "tom")));
    assert_eq!(outer_pulls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_predicate_joins_materialize_inner_once() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let rows = people()
        .join_on(counting_pets(pulls.clone()), |p, pet| p.id == pet.owner, |p, pet| {
            (p.id, pet.name)
        })
        .to_vec()
        .unwrap();
    assert_eq!(rows, vec![(1, "tom"), (3, "rex"), (3, "kit")]);
    assert_eq!(pulls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_left_join_stops_pulling_outer_on_early_termination() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let rows = counting_people(pulls.clone())
        .left_join(
            pets(),
            |p| p.id,
            |pet| pet.owner,
            |p, pet| format!("{}:{}", p.name, pet.name),
            |p| format!("{}:-", p.name),
        )
        .take(2)
        .to_vec()
        .unwrap();
    assert_eq!(rows, vec!["ann:tom", "bob:-"]);
    assert_eq!(pulls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_group_join_stops_pulling_outer_on_early_termination() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let rows = counting_people(pulls.clone())
        .group_join(pets(), |p| p.id, |pet| pet.owner, |p, pets| (p.id, pets.len()))
        .take(1)
        .to_vec()
        .unwrap();
    assert_eq!(rows, vec![(1, 1)]);
    assert_eq!(pulls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_join_on_stops_pulling_outer_on_early_termination() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let first = counting_people(pulls.clone())
        .join_on(pets(), |p, pet| p.id == pet.owner, |p, pet| (p.name, pet.name))
        .first()
        .unwrap();
    assert_eq!(first, Some(("ann", "tom")));
    assert_eq!(pulls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_group_join_on_stops_pulling_outer_on_early_termination() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let rows = counting_people(pulls.clone())
        .group_join_on(pets(), |p, pet| p.id == pet.owner, |p, pets| (p.id, pets.len()))
        .take(2)
        .to_vec()
        .unwrap();
    assert_eq!(rows, vec![(1, 1), (2, 0)]);
    assert_eq!(pulls.load(Ordering::SeqCst), 2);
}
