use lazylinq::*;

/// A source that fails after its first element
fn faulty() -> Query<i32> {
    Query::new(|| {
        Box::new(
            vec![Ok(1), Err(QueryError::custom("source failed")), Ok(3)].into_iter(),
        )
    })
}

fn limited(max: usize) -> QueryConfig {
    QueryConfig::new().initial_capacity(1).max_capacity(max)
}

#[test]
fn test_fault_is_yielded_once_then_fused() {
    let items: Vec<_> = faulty().iter().collect();
    assert_eq!(items, vec![Ok(1), Err(QueryError::custom("source failed"))]);
}

#[test]
fn test_fault_propagates_through_streaming_operators() {
    let items: Vec<_> = faulty()
        .select(|x| x * 10)
        .filter(|_| true)
        .distinct()
        .iter()
        .collect();
    assert_eq!(items, vec![Ok(10), Err(QueryError::custom("source failed"))]);
}

#[test]
fn test_fault_aborts_buffering_operators() {
    let expected = Err(QueryError::custom("source failed"));
    assert_eq!(faulty().order_by(|x| *x).to_vec(), expected);
    assert_eq!(faulty().reverse().to_vec(), expected);
    assert_eq!(
        faulty().group_by_key(|x| *x).count(),
        Err(QueryError::custom("source failed"))
    );
    assert_eq!(from_vec(vec![1]).except(faulty()).to_vec(), expected);
    assert_eq!(
        from_vec(vec![1])
            .join(faulty(), |x| *x, |x| *x, |a, b| a + b)
            .to_vec(),
        expected
    );
}

#[test]
fn test_partial_results_are_not_retracted() {
    let mut seen = Vec::new();
    let result = faulty().for_each(|x| seen.push(x));
    assert!(result.is_err());
    assert_eq!(seen, vec![1]);
}

#[test]
fn test_terminal_returns_first_error() {
    assert_eq!(faulty().count(), Err(QueryError::custom("source failed")));
    assert_eq!(faulty().first(), Ok(Some(1)));
    assert_eq!(faulty().last(), Err(QueryError::custom("source failed")));
}

#[test]
fn test_config_validation() {
    assert!(QueryConfig::default().validate().is_ok());
    assert!(limited(5).validate().is_ok());

    let zero = QueryConfig::new().max_capacity(0);
    assert!(matches!(
        zero.validate(),
        Err(QueryError::InvalidConfiguration(_))
    ));

    let inverted = QueryConfig::new().initial_capacity(64).max_capacity(8);
    assert!(matches!(
        from_vec(vec![1]).with_config(inverted),
        Err(QueryError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_config_from_json() {
    let config: QueryConfig =
        serde_json::from_str(r#"{"label":"orders","buffer":{"max_capacity":100}}"#).unwrap();
    assert_eq!(config.label.as_deref(), Some("orders"));
    assert_eq!(config.buffer.initial_capacity, 16);
    assert_eq!(config.buffer.max_capacity, Some(100));

    let defaults: QueryConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(defaults, QueryConfig::default());
}

#[test]
fn test_derived_queries_inherit_config() {
    let config = limited(10).label("numbers");
    let query = from_vec(vec![1, 2, 3])
        .with_config(config.clone())
        .unwrap()
        .filter(|x| *x > 1)
        .select(|x| x * 2);
    assert_eq!(query.config(), &config);
}

#[test]
fn test_capacity_limit_on_ordering() {
    let result = range(0, 10)
        .with_config(limited(5))
        .unwrap()
        .order_by(|x| -x)
        .to_vec();
    assert_eq!(
        result,
        Err(QueryError::CapacityExceeded {
            operator: "order_by",
            limit: 5
        })
    );

    let fits = range(0, 5)
        .with_config(limited(5))
        .unwrap()
        .order_by(|x| -x)
        .to_vec()
        .unwrap();
    assert_eq!(fits, vec![4, 3, 2, 1, 0]);
}

#[test]
fn test_capacity_limit_on_grouping_and_to_vec() {
    let grouped = range(0, 10)
        .with_config(limited(3))
        .unwrap()
        .group_by_key(|x| x % 2)
        .to_vec();
    assert!(matches!(
        grouped,
        Err(QueryError::CapacityExceeded {
            operator: "group_by",
            ..
        })
    ));

    let collected = range(0, 4).with_config(limited(3)).unwrap().to_vec();
    assert_eq!(
        collected,
        Err(QueryError::CapacityExceeded {
            operator: "to_vec",
            limit: 3
        })
    );
}

#[test]
fn test_capacity_limit_on_distinct_yields_prefix() {
    let items: Vec<_> = range(0, 10)
        .with_config(limited(5))
        .unwrap()
        .distinct()
        .iter()
        .collect();
    assert_eq!(items.len(), 6);
    assert!(items[..5].iter().all(|item| item.is_ok()));
    assert!(matches!(
        items[5],
        Err(QueryError::CapacityExceeded {
            operator: "distinct",
            limit: 5
        })
    ));
}

#[test]
fn test_error_messages() {
    assert_eq!(
        QueryError::CapacityExceeded {
            operator: "reverse",
            limit: 3
        }
        .to_string(),
        "reverse exceeded the buffer limit of 3 elements"
    );
    assert_eq!(
        QueryError::MoreThanOneElement.to_string(),
        "Sequence contains more than one matching element"
    );
    assert_eq!(
        QueryError::incomparable::<f32>().to_string(),
        "Cannot compare values of type `f32`: no ordering defined between them"
    );
}
