// caseflow-broker/tests/broker.rs
// Integration coverage for composing sources and sinks the way a worker
// process would: drain a multi-source trigger queue and notify through a
// log sink.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions."
)]

use caseflow_broker::InlineSource;
use caseflow_broker::LogSink;
use caseflow_broker::MultiSource;
use caseflow_core::CaseId;
use caseflow_core::CaseTrigger;
use caseflow_core::NotificationSink;
use caseflow_core::TenantId;
use caseflow_core::TriggerSource;
use serde_json::json;

#[test]
fn worker_drains_composite_source_and_logs_notifications() {
    let reuploads = InlineSource::new();
    let approvals = InlineSource::new();
    reuploads.push(CaseTrigger {
        tenant_id: TenantId::new("acme"),
        case_id: Some(CaseId::new("case-1")),
        payload: json!({"type": "file_reuploaded"}),
    });
    approvals.push(CaseTrigger {
        tenant_id: TenantId::new("acme"),
        case_id: Some(CaseId::new("case-2")),
        payload: json!({"type": "approval_received", "approved": true}),
    });

    let mut source = MultiSource::new().with_source(reuploads).with_source(approvals);
    let sink = LogSink::new(Vec::new());

    let mut delivered = Vec::new();
    while let Some(trigger) = source.next_trigger() {
        let case_id = trigger.case_id.clone().expect("trigger has a case id");
        sink.notify(&case_id, "trigger received").expect("notify");
        delivered.push(case_id);
    }

    assert_eq!(delivered, vec![CaseId::new("case-1"), CaseId::new("case-2")]);
}
