mod common;

use std::collections::HashSet;

use common::{average, buggy_max, factorial, UNIT};
use dax_common::types::{Location, StepKind, Value};
use dax_engine::{ExecutionIndexer, Recorder, TargetError};
use tracing::info;

fn factorial_trace(n: i64) -> dax_common::types::Trace {
    let mut recorder = Recorder::new();
    recorder.run(&factorial, &[Value::Int(n)]).unwrap();
    recorder.into_trace()
}

#[test]
fn test_instances_count_per_context() {
    dax_common::logging::ensure_test_logging(None);
    info!("Running test");
    let mut indexer = ExecutionIndexer::new();
    let loc = Location::new(UNIT, 5);

    for expected in 1..=3 {
        assert_eq!(indexer.record_point(loc.clone()).instance, expected);
    }

    indexer.enter_function("inner");
    let nested = indexer.record_point(loc.clone());
    assert_eq!(nested.instance, 1);
    assert_eq!(nested.context, vec!["inner".to_string()]);
    indexer.exit_function();

    assert_eq!(indexer.record_point(loc.clone()).instance, 4);

    indexer.reset();
    assert_eq!(indexer.record_point(loc).instance, 1);
}

#[test]
fn test_round_trip() {
    dax_common::logging::ensure_test_logging(None);
    info!("Running test");
    let trace = factorial_trace(4);
    let mut indexer = ExecutionIndexer::new();
    let indexed = indexer.index_trace(&trace);

    assert_eq!(indexed.len(), trace.len());
    let distinct = indexed.points().collect::<HashSet<_>>();
    assert_eq!(distinct.len(), trace.len());
    assert_eq!(indexed.into_events(), trace);
}

#[test]
fn test_recursive_contexts() {
    dax_common::logging::ensure_test_logging(None);
    info!("Running test");
    let trace = factorial_trace(3);
    let mut indexer = ExecutionIndexer::new();
    let indexed = indexer.index_trace(&trace);

    // the base case runs three frames deep
    let base = indexed
        .iter()
        .find(|(event, _)| event.location == Location::new(UNIT, 3))
        .map(|(_, point)| point.clone())
        .unwrap();
    assert_eq!(base.context.len(), 3);
    assert_eq!(base.instance, 1);

    let stats = indexer.statistics();
    assert_eq!(stats.total_points, trace.len());
    assert_eq!(stats.context_depth, 0);
    // [], [f], [f, f], [f, f, f]
    assert_eq!(stats.unique_contexts, 4);

    let first = indexed.points().next().unwrap().clone();
    assert_eq!(indexer.find_matching(&first), vec![0]);
    assert_eq!(indexer.point_at(0), Some(&first));
    assert_eq!(indexed.position(&first), Some(0));
}

#[test]
fn test_reindexing_starts_fresh() {
    dax_common::logging::ensure_test_logging(None);
    info!("Running test");
    let mut recorder = Recorder::new();
    recorder.run(&buggy_max, &[Value::Int(1), Value::Int(2), Value::Int(3)]).unwrap();

    let mut indexer = ExecutionIndexer::new();
    let first = indexer.index_trace(recorder.trace());
    let second = indexer.index_trace(recorder.trace());
    assert_eq!(first.points().collect::<Vec<_>>(), second.points().collect::<Vec<_>>());
    assert!(first.render(3).contains("INDEXED EXECUTION TRACE"));
}

#[test]
fn test_propagated_error_leaves_no_stale_context() {
    dax_common::logging::ensure_test_logging(None);
    info!("Running test");
    let mut recorder = Recorder::new();
    let err = recorder.run(&average, &[Value::Int(6), Value::Int(0)]).unwrap_err();
    assert_eq!(err, TargetError::raised("ZeroDivisionError", "division by zero"));

    let calls = recorder.trace().iter().filter(|e| e.kind == StepKind::Call).count();
    let returns = recorder.trace().iter().filter(|e| e.kind == StepKind::Return).count();
    assert_eq!(calls, 2);
    assert_eq!(calls, returns);

    // average unwinds from its last reported line after divide raised
    let last = recorder.trace().last().unwrap();
    assert_eq!((last.kind, last.function.as_str()), (StepKind::Return, "average"));
    assert_eq!(last.location, Location::new(UNIT, 1));

    let mut indexer = ExecutionIndexer::new();
    let indexed = indexer.index_trace(recorder.trace());
    assert_eq!(indexed.len(), recorder.trace().len());
    assert_eq!(indexer.statistics().context_depth, 0);
    assert!(indexer.current_context().is_empty());

    let return_contexts: Vec<_> = indexed
        .iter()
        .filter(|(e, _)| e.kind == StepKind::Return)
        .map(|(e, p)| (e.function.as_str(), p.context.clone()))
        .collect();
    assert_eq!(
        return_contexts,
        vec![("divide", vec!["average".to_string()]), ("average", Vec::<String>::new())]
    );
}
