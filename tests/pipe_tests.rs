use lazylinq::pipe;
use lazylinq::pipe::*;
use lazylinq::*;

#[test]
fn test_pipe_select() {
    let query = from_vec(vec![1, 2, 3, 4, 5]);
    let pipe = pipe::select(|x: i32| x * 2);

    let result = pipe.apply(query).to_vec().unwrap();
    assert_eq!(result, vec![2, 4, 6, 8, 10]);
}

#[test]
fn test_pipe_filter() {
    let query = from_vec(vec![1, 2, 3, 4, 5]);
    let pipe = pipe::filter(|x: &i32| x % 2 == 0);

    let result = pipe.apply(query).to_vec().unwrap();
    assert_eq!(result, vec![2, 4]);
}

#[test]
fn test_pipe_compose() {
    let add_one = pipe::select(|x: i32| x + 1);
    let even_only = pipe::filter(|x: &i32| x % 2 == 0);

    // Increment first, then keep the even results
    let pipe = pipe::compose(add_one, even_only);

    let result = pipe.apply(from_vec(vec![1, 2, 3, 4, 5])).to_vec().unwrap();
    assert_eq!(result, vec![2, 4, 6]);
}

#[test]
fn test_pipe_identity() {
    let pipe = pipe::identity();
    let result = pipe.apply(from_vec(vec![1, 2, 3])).to_vec().unwrap();
    assert_eq!(result, vec![1, 2, 3]);
}

#[test]
fn test_pipe_ext_compose_changes_type() {
    let lengths = pipe::select(|s: &'static str| s.len());
    let long_only = pipe::filter(|n: &usize| *n > 3);
    let pipe = lengths.compose(long_only);

    let result = from_vec(vec!["ant", "beetle", "moth", "fly"])
        .pipe(&pipe)
        .to_vec()
        .unwrap();
    assert_eq!(result, vec![6, 4]);
}

#[test]
fn test_pipe_is_reusable() {
    let pipe = Pipe::new(|q: Query<i32>| q.order_by_descending(|x| *x).take(2));

    let a = pipe.apply(from_vec(vec![5, 1, 9, 3])).to_vec().unwrap();
    let b = pipe.apply(range(1, 4)).to_vec().unwrap();
    assert_eq!(a, vec![9, 5]);
    assert_eq!(b, vec![4, 3]);
}
