use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};

use metawatch::{
    BusConfig, ChangeEvent, CompletionReporter, CompletionStatus, ElementGuid, EventKind,
    FieldMap, InProcessEventBus, NullAuditLog, OrchestrationError, ProcessOrchestrator,
    PropertyValue, ReportingError, StaticConfiguration, TypeGuid, TypeIdentifier,
    WatchdogDispatcher, MONITORING_COMPLETE, MONITORING_FAILED,
};

struct ChannelOrchestrator {
    tx: Sender<(String, HashMap<String, String>, Vec<ElementGuid>)>,
    fail: bool,
}

impl ProcessOrchestrator for ChannelOrchestrator {
    fn initiate_process(
        &self,
        name: &str,
        request_parameters: &HashMap<String, String>,
        action_targets: &[ElementGuid],
    ) -> Result<(), OrchestrationError> {
        if self.fail {
            return Err(OrchestrationError::InitiationFailed {
                process_name: name.to_string(),
                message: "engine offline".to_string(),
            });
        }
        let _ = self.tx.send((
            name.to_string(),
            request_parameters.clone(),
            action_targets.to_vec(),
        ));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingReporter {
    reports: Mutex<Vec<(CompletionStatus, Vec<String>)>>,
}

impl CompletionReporter for RecordingReporter {
    fn record_completion_status(
        &self,
        status: CompletionStatus,
        guards: &[String],
        _output_properties: Option<&FieldMap>,
    ) -> Result<(), ReportingError> {
        self.reports.lock().unwrap().push((status, guards.to_vec()));
        Ok(())
    }
}

fn orchestrator(
    fail: bool,
) -> (
    Arc<ChannelOrchestrator>,
    Receiver<(String, HashMap<String, String>, Vec<ElementGuid>)>,
) {
    let (tx, rx) = bounded(16);
    (Arc::new(ChannelOrchestrator { tx, fail }), rx)
}

fn asset_properties(pairs: &[(&str, &str)]) -> PropertyValue {
    let struct_type = TypeIdentifier::new(
        TypeGuid::from_uuid(uuid::Uuid::from_u128(100)),
        "AssetProperties",
    );
    let string_type =
        TypeIdentifier::new(TypeGuid::from_uuid(uuid::Uuid::from_u128(101)), "string");
    let fields: FieldMap = pairs
        .iter()
        .map(|(name, value)| {
            (
                (*name).to_string(),
                PropertyValue::primitive(string_type.clone(), *value),
            )
        })
        .collect();
    PropertyValue::structure(struct_type, fields)
}

#[test]
fn watchdog_triggers_process_for_updated_element() {
    let bus = Arc::new(InProcessEventBus::new(BusConfig::default()));
    let (orchestrator, initiated) = orchestrator(false);
    let reporter = Arc::new(RecordingReporter::default());

    let configuration = Arc::new(
        StaticConfiguration::new()
            .with_property("interestingTypeName", "DataFile")
            .with_property("updatedElementProcessName", "revalidate-asset"),
    );

    let dispatcher = Arc::new(WatchdogDispatcher::new(
        bus.clone(),
        orchestrator,
        reporter.clone(),
        configuration,
        Arc::new(NullAuditLog),
    ));
    dispatcher.clone().start("Asset", &[]).unwrap();

    let subject = ElementGuid::new();
    bus.publish(
        ChangeEvent::new(EventKind::UpdatedElementProperties, "DataFile", subject)
            .with_old_properties(asset_properties(&[("path", "/data/a.csv"), ("owner", "amy")]))
            .with_new_properties(asset_properties(&[
                ("path", "/data/a.csv"),
                ("owner", "zara"),
                ("zone", "quarantine"),
            ])),
    );

    let (name, parameters, targets) = initiated.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(name, "revalidate-asset");
    assert_eq!(
        parameters.get("changedProperties").map(String::as_str),
        Some("owner, zone")
    );
    assert_eq!(targets, vec![subject]);

    // Still listening: no completion reported for a healthy multi-event run.
    assert!(reporter.reports.lock().unwrap().is_empty());
    assert!(!dispatcher.is_completed());
}

#[test]
fn watchdog_ignores_events_outside_interest_set() {
    let bus = Arc::new(InProcessEventBus::new(BusConfig::default()));
    let (orchestrator, initiated) = orchestrator(false);
    let reporter = Arc::new(RecordingReporter::default());

    let configuration = Arc::new(
        StaticConfiguration::new()
            .with_property("interestingTypeName", "DataFile")
            .with_property("deletedElementProcessName", "archive-asset"),
    );

    let dispatcher = Arc::new(WatchdogDispatcher::new(
        bus.clone(),
        orchestrator,
        reporter,
        configuration,
        Arc::new(NullAuditLog),
    ));
    dispatcher.clone().start("Asset", &[]).unwrap();

    // Subscribed to deletions only; an update must not trigger anything.
    bus.publish(ChangeEvent::new(
        EventKind::UpdatedElementProperties,
        "DataFile",
        ElementGuid::new(),
    ));
    // Wrong type name never reaches the listener.
    bus.publish(ChangeEvent::new(
        EventKind::DeletedElement,
        "GlossaryTerm",
        ElementGuid::new(),
    ));

    assert!(initiated.recv_timeout(Duration::from_millis(200)).is_err());

    bus.publish(
        ChangeEvent::new(EventKind::DeletedElement, "DataFile", ElementGuid::new())
            .with_old_properties(asset_properties(&[("path", "/data/a.csv")])),
    );

    let (name, parameters, _) = initiated.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(name, "archive-asset");
    // Deletion carries only the old tree: every old field reads as changed.
    assert_eq!(
        parameters.get("changedProperties").map(String::as_str),
        Some("path")
    );
}

#[test]
fn watchdog_filters_multiple_targets_listener_side() {
    let bus = Arc::new(InProcessEventBus::new(BusConfig::default()));
    let (orchestrator, initiated) = orchestrator(false);
    let reporter = Arc::new(RecordingReporter::default());

    let configuration = Arc::new(
        StaticConfiguration::new()
            .with_property("interestingTypeName", "DataFile")
            .with_property("updatedElementProcessName", "revalidate-asset"),
    );

    let watched_a = ElementGuid::new();
    let watched_b = ElementGuid::new();

    let dispatcher = Arc::new(WatchdogDispatcher::new(
        bus.clone(),
        orchestrator,
        reporter,
        configuration,
        Arc::new(NullAuditLog),
    ));
    dispatcher.clone().start("Asset", &[watched_a, watched_b]).unwrap();

    // Type-wide subscription (no push-down possible), so the bus delivers
    // the foreign subject too; the dispatcher must drop it silently.
    bus.publish(ChangeEvent::new(
        EventKind::UpdatedElementProperties,
        "DataFile",
        ElementGuid::new(),
    ));
    bus.publish(ChangeEvent::new(
        EventKind::UpdatedElementProperties,
        "DataFile",
        watched_b,
    ));

    let (_, _, targets) = initiated.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(targets, vec![watched_b]);
    assert!(initiated.recv_timeout(Duration::from_millis(200)).is_err());
}

#[test]
fn watchdog_single_event_mode_completes_after_first_trigger() {
    let bus = Arc::new(InProcessEventBus::new(BusConfig::default()));
    let (orchestrator, initiated) = orchestrator(false);
    let reporter = Arc::new(RecordingReporter::default());

    let configuration = Arc::new(
        StaticConfiguration::new()
            .with_property("interestingTypeName", "DataFile")
            .with_property("newElementProcessName", "onboard-asset")
            .with_property("monitoringMode", "single-event"),
    );

    let dispatcher = Arc::new(WatchdogDispatcher::new(
        bus.clone(),
        orchestrator,
        reporter.clone(),
        configuration,
        Arc::new(NullAuditLog),
    ));
    dispatcher.clone().start("Asset", &[]).unwrap();

    bus.publish(ChangeEvent::new(
        EventKind::NewElement,
        "DataFile",
        ElementGuid::new(),
    ));

    let (name, _, _) = initiated.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(name, "onboard-asset");

    // Second event arrives after the latch: no further initiations.
    bus.publish(ChangeEvent::new(
        EventKind::NewElement,
        "DataFile",
        ElementGuid::new(),
    ));
    assert!(initiated.recv_timeout(Duration::from_millis(200)).is_err());

    let reports = reporter.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, CompletionStatus::Succeeded);
    assert_eq!(reports[0].1, vec![MONITORING_COMPLETE.to_string()]);
}

#[test]
fn watchdog_orchestration_failure_latches_failed_once() {
    let bus = Arc::new(InProcessEventBus::new(BusConfig::default()));
    let (orchestrator, _initiated) = orchestrator(true);
    let reporter = Arc::new(RecordingReporter::default());

    let configuration = Arc::new(
        StaticConfiguration::new()
            .with_property("interestingTypeName", "DataFile")
            .with_property("updatedElementProcessName", "revalidate-asset"),
    );

    let dispatcher = Arc::new(WatchdogDispatcher::new(
        bus.clone(),
        orchestrator,
        reporter.clone(),
        configuration,
        Arc::new(NullAuditLog),
    ));
    dispatcher.clone().start("Asset", &[]).unwrap();

    bus.publish(ChangeEvent::new(
        EventKind::UpdatedElementProperties,
        "DataFile",
        ElementGuid::new(),
    ));
    bus.publish(ChangeEvent::new(
        EventKind::UpdatedElementProperties,
        "DataFile",
        ElementGuid::new(),
    ));

    // The failed initiation latches a Failed report exactly once; the bus
    // logs the surfaced error and keeps the listener registered.
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    loop {
        if dispatcher.is_completed() {
            break;
        }
        assert!(std::time::Instant::now() < deadline, "dispatcher never latched");
        std::thread::sleep(Duration::from_millis(10));
    }

    let reports = reporter.reports.lock().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].0, CompletionStatus::Failed);
    assert_eq!(reports[0].1, vec![MONITORING_FAILED.to_string()]);
}
