use pretty_assertions::assert_eq;
use udbg_coordinator::{CoordinatorConfig, DebugCommand};
use udbg_store::{BreakpointState, StoreMode};
use udbg_test_utils::{
    console_batch, created_line, paused_line, setup_coordinator_with_config, UDF_OPERATOR,
};

fn replicated(name: &str) -> CoordinatorConfig {
    CoordinatorConfig::new().with_store_mode(StoreMode::Replicated {
        replica_id: Some(name.to_string()),
    })
}

#[test]
fn test_observers_converge_on_confirmed_breakpoint() {
    let (relay, _) = setup_coordinator_with_config(replicated("relay"), &["w1"]);
    let (viewer, viewer_transport) = setup_coordinator_with_config(replicated("viewer"), &["w1"]);

    relay
        .handle_console_update(&console_batch("w1", &created_line(3, 21)))
        .unwrap();

    let snapshot = relay.store().replica(UDF_OPERATOR).unwrap().snapshot();
    viewer.store().replica(UDF_OPERATOR).unwrap().merge(&snapshot);

    let state = viewer.get_debug_state(UDF_OPERATOR).unwrap();
    assert_eq!(state.get("21"), Some(BreakpointState::confirmed(3)));

    // The viewer now sees an entry, so its toggle clears
    viewer.do_modify_breakpoint(UDF_OPERATOR, 21).unwrap();
    assert_eq!(
        viewer_transport.commands(),
        vec![("w1".to_string(), DebugCommand::Clear(21))]
    );
}

#[test]
fn test_reset_propagates_as_tombstones() {
    let (relay, _) = setup_coordinator_with_config(replicated("relay"), &["w1"]);
    let (viewer, _) = setup_coordinator_with_config(replicated("viewer"), &["w1"]);

    relay
        .handle_console_update(&console_batch("w1", &paused_line(8)))
        .unwrap();
    let relay_replica = relay.store().replica(UDF_OPERATOR).unwrap();
    let viewer_replica = viewer.store().replica(UDF_OPERATOR).unwrap();
    viewer_replica.merge(&relay_replica.snapshot());
    assert!(viewer.get_debug_state(UDF_OPERATOR).unwrap().any_hit());

    relay.store().clear(UDF_OPERATOR).unwrap();
    viewer_replica.merge(&relay_replica.snapshot());

    assert!(viewer.get_debug_state(UDF_OPERATOR).unwrap().is_empty());
}

#[test]
fn test_local_store_has_no_replica() {
    let (coordinator, _) = setup_coordinator_with_config(CoordinatorConfig::new(), &[]);
    assert!(coordinator.store().replica(UDF_OPERATOR).is_err());
    assert!(coordinator.store().replica_id().is_none());
}
