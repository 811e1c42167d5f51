use lazylinq::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_group_by_parity_scenario() {
    let groups = range(1, 9).group_by_key(|n| n % 2).to_vec().unwrap();
    assert_eq!(
        groups,
        vec![
            Group {
                key: 1,
                elements: vec![1, 3, 5, 7, 9]
            },
            Group {
                key: 0,
                elements: vec![2, 4, 6, 8]
            },
        ]
    );
}

#[test]
fn test_group_by_projects_elements() {
    let groups = from_vec(vec!["apple", "avocado", "banana", "blueberry", "cherry"])
        .group_by(|s| s.chars().next().unwrap_or(' '), |s| s.len())
        .to_vec()
        .unwrap();

    let keys: Vec<char> = groups.iter().map(|g| g.key).collect();
    assert_eq!(keys, vec!['a', 'b', 'c']);
    assert_eq!(groups[0].elements, vec![5, 7]);
    assert_eq!(groups[1].elements, vec![6, 9]);
    assert_eq!(groups[2].len(), 1);
}

#[test]
fn test_group_query_reenumerates_elements() {
    let groups = from_vec(vec![1, 2, 3, 4]).group_by_key(|n| n % 2).to_vec().unwrap();
    let odd = &groups[0];
    assert_eq!(odd.query().sum().unwrap(), 4);
    assert_eq!(odd.query().count().unwrap(), 2);
    assert!(!odd.is_empty());
}

#[test]
fn test_group_by_empty_input() {
    let groups = empty::<i32>().group_by_key(|n| *n).to_vec().unwrap();
    assert!(groups.is_empty());
}

#[test]
fn test_group_by_is_deferred() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let counter = pulls.clone();
    let grouped = from_vec(vec![1, 2, 3])
        .select(move |x| {
            counter.fetch_add(1, Ordering::SeqCst);
            x
        })
        .group_by_key(|n| n % 2);
    assert_eq!(pulls.load(Ordering::SeqCst), 0);

    let first = grouped.first().unwrap().unwrap();
    assert_eq!(first.key, 1);
    assert_eq!(pulls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_groups_then_aggregate() {
    let totals = from_vec(vec![("north", 10), ("south", 5), ("north", 7)])
        .group_by(|sale| sale.0, |sale| sale.1)
        .select(|g| (g.key, g.elements.iter().sum::<i32>()))
        .to_vec()
        .unwrap();
    assert_eq!(totals, vec![("north", 17), ("south", 5)]);
}

#[test]
fn test_group_serializes_to_json() {
    let group = Group {
        key: "even".to_string(),
        elements: vec![2, 4],
    };
    let json = serde_json::to_string(&group).unwrap();
    assert_eq!(json, r#"{"key":"even","elements":[2,4]}"#);

    let back: Group<String, i32> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, group);
}
