use futures_util::stream::StreamExt;
use lazylinq::*;

#[tokio::test]
async fn test_into_stream_yields_results() {
    let items: Vec<_> = from_vec(vec![1, 2, 3])
        .select(|x| x * 2)
        .into_stream()
        .collect()
        .await;
    assert_eq!(items, vec![Ok(2), Ok(4), Ok(6)]);
}

#[tokio::test]
async fn test_into_stream_ends_after_error() {
    let query = from_vec(vec![1, 2, 3]).try_select(|x| {
        if x == 2 {
            Err(QueryError::custom("no twos"))
        } else {
            Ok(x)
        }
    });
    let items: Vec<_> = into_stream(query).collect().await;
    assert_eq!(items, vec![Ok(1), Err(QueryError::custom("no twos"))]);
}

#[tokio::test]
async fn test_into_value_stream_drops_wrapper() {
    let values: Vec<i32> = into_value_stream(range(1, 5).filter(|x| x % 2 == 1))
        .collect()
        .await;
    assert_eq!(values, vec![1, 3, 5]);
}

#[tokio::test]
async fn test_into_stream_is_lazy_and_takeable() {
    let first_two: Vec<_> = range(1, 1_000_000).into_stream().take(2).collect().await;
    assert_eq!(first_two, vec![Ok(1), Ok(2)]);
}

#[tokio::test]
async fn test_stream_can_be_sent_to_task() {
    let stream = into_value_stream(from_vec(vec![10, 20]));
    let handle = tokio::spawn(async move { stream.collect::<Vec<_>>().await });
    assert_eq!(handle.await.unwrap(), vec![10, 20]);
}

#[test]
fn test_round_trip_through_stream() {
    let stream = into_value_stream(from_chars("abc"));
    let upper = from_stream(stream)
        .select(|c| c.to_ascii_uppercase())
        .to_vec()
        .unwrap();
    assert_eq!(upper, vec!['A', 'B', 'C']);
}

#[test]
fn test_into_stream_outside_async_context() {
    let items: Vec<_> = tokio_test::block_on(range(1, 3).into_stream().collect());
    assert_eq!(items, vec![Ok(1), Ok(2), Ok(3)]);
}
