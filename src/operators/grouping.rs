//! GroupBy
//!
//! Grouping cannot emit anything until its input is exhausted: the first pull
//! scans the whole input into insertion-ordered buckets, then groups are
//! yielded in the order their keys were first seen.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use crate::operators::deferred;
use crate::sequence::Query;
use crate::sources::from_vec;

/// A key and the elements that mapped to it, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group<K, V> {
    pub key: K,
    pub elements: Vec<V>,
}

impl<K, V> Group<K, V> {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Query over this group's elements
    pub fn query(&self) -> Query<V>
    where
        V: Clone + Send + Sync + 'static,
    {
        from_vec(self.elements.clone())
    }
}

/// Group elements by `key`, projecting each element with `element`
pub fn group_by<T, K, V, FK, FV>(q: Query<T>, key: FK, element: FV) -> Query<Group<K, V>>
where
    T: Send + 'static,
    K: Hash + Eq + Clone + Send + 'static,
    V: Send + 'static,
    FK: Fn(&T) -> K + Send + Sync + 'static,
    FV: Fn(T) -> V + Send + Sync + 'static,
{
    let key = Arc::new(key);
    let element = Arc::new(element);
    q.chain(move |input| {
        let key = Arc::clone(&key);
        let element = Arc::clone(&element);
        let cursor = input.iter();
        let buffer = input.config().buffer.clone();
        let label = input.label().to_string();
        deferred(move || {
            let mut index: HashMap<K, usize> = HashMap::new();
            let mut groups: Vec<Group<K, V>> = Vec::new();
            let mut buffered = 0;
            for item in cursor {
                let item = item?;
                let k = key(&item);
                let value = element(item);
                match index.get(&k) {
                    Some(&position) => groups[position].elements.push(value),
                    None => {
                        index.insert(k.clone(), groups.len());
                        groups.push(Group {
                            key: k,
                            elements: vec![value],
                        });
                    }
                }
                buffered += 1;
                buffer.check("group_by", buffered)?;
            }
            log::trace!(
                "{}: grouped {} elements into {} groups",
                label,
                buffered,
                groups.len()
            );
            Ok(groups)
        })
    })
}

/// Group whole elements by `key`
pub fn group_by_key<T, K, F>(q: Query<T>, key: F) -> Query<Group<K, T>>
where
    T: Send + 'static,
    K: Hash + Eq + Clone + Send + 'static,
    F: Fn(&T) -> K + Send + Sync + 'static,
{
    group_by(q, key, |item| item)
}
