//! Integration property tests for call-audit.
//!
//! These tests validate cross-module invariants and end-to-end flows
//! using property-based testing.

use std::sync::Arc;

use call_audit::sink::{format_line, parse_line, AuditLevel, AuditSink, MemoryDestination};
use call_audit::{audit_class, AuditPolicy, AuditSwitch, CallArgs, ClassDef, Value};
use chrono::Local;
use proptest::prelude::*;

// Strategy: operation names the class runtime accepts
fn arb_operation_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z_][a-z0-9_]{0,15}").unwrap()
}

// Strategy: printable argument strings (no control characters)
fn arb_argument() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9 .,:-]{0,20}").unwrap()
}

proptest! {
    /// Property: wrapping then calling never panics, and every enabled
    /// call lands exactly one parseable INFO line naming the operation.
    #[test]
    fn proptest_every_enabled_call_is_recorded_once(
        operation in arb_operation_name(),
        argument in arb_argument(),
        number in -1000i64..1000
    ) {
        let memory = MemoryDestination::new();
        let sink = Arc::new(AuditSink::new().with_destination(memory.clone()));
        let switch = AuditSwitch::default();

        let class = ClassDef::new("Subject")
            .operation(operation.clone(), |_fields, _args| Ok(Value::Unit));
        let audited = audit_class(class, &AuditPolicy::All, switch, sink)
            .expect("wrapping a well-formed definition should succeed");

        let mut instance = audited.instantiate(&CallArgs::new()).expect("init");
        // A generated name may collide with "init" and run during
        // instantiation; only the explicit call below is under test.
        memory.clear();
        let args = CallArgs::new().arg(argument.as_str()).named_arg("n", number);
        instance.call(&operation, &args).expect("operation should run");

        let lines = memory.lines();
        prop_assert_eq!(lines.len(), 1);

        let parsed = parse_line(&lines[0])
            .ok_or_else(|| TestCaseError::fail(format!("unparseable line: '{}'", lines[0])))?;
        prop_assert_eq!(parsed.level, "INFO");
        let expected_prefix = format!("call: {},", operation);
        prop_assert!(parsed.message.starts_with(&expected_prefix));
        prop_assert!(parsed.message.contains(&argument));
        let expected_number = format!("n: {}", number);
        prop_assert!(parsed.message.contains(&expected_number));
    }

    /// Property: with the switch disabled, an audited class is
    /// observationally equivalent to the plain definition — same return
    /// value, same instance state, zero audit lines.
    #[test]
    fn proptest_disabled_auditing_never_alters_semantics(
        operation in arb_operation_name(),
        argument in arb_argument()
    ) {
        let build = |op: &str| {
            ClassDef::new("Subject")
                .constructor(|fields, args| {
                    fields.set("seed", args.value(0).cloned().unwrap_or(Value::Unit));
                    Ok(Value::Unit)
                })
                .operation(op, |fields, _args| {
                    let seed = fields.get("seed").cloned().unwrap_or(Value::Unit);
                    fields.set("touched", true);
                    Ok(Value::Str(format!("handled {}", seed)))
                })
        };

        let memory = MemoryDestination::new();
        let sink = Arc::new(AuditSink::new().with_destination(memory.clone()));
        let switch = AuditSwitch::new(false);

        let audited = audit_class(build(&operation), &AuditPolicy::All, switch, sink)
            .expect("wrap should succeed");
        let plain = build(&operation);

        let ctor_args = CallArgs::new().arg(argument.as_str());
        let mut audited_instance = audited.instantiate(&ctor_args).expect("init");
        let mut plain_instance = plain.instantiate(&ctor_args).expect("init");

        let audited_out = audited_instance.call(&operation, &CallArgs::new()).expect("call");
        let plain_out = plain_instance.call(&operation, &CallArgs::new()).expect("call");

        prop_assert_eq!(audited_out, plain_out);
        prop_assert_eq!(audited_instance.fields(), plain_instance.fields());
        prop_assert!(memory.is_empty());
    }

    /// Property: every line the sink can produce parses back into
    /// (timestamp, level, message) via the fixed format.
    #[test]
    fn proptest_line_format_round_trips(
        message in prop::string::string_regex("[ -~]{0,60}").unwrap()
    ) {
        let now = Local::now();
        let line = format_line(now, AuditLevel::Info, &message);

        let parsed = parse_line(&line)
            .ok_or_else(|| TestCaseError::fail(format!("unparseable line: '{}'", line)))?;
        prop_assert_eq!(parsed.level, "INFO");
        prop_assert_eq!(parsed.message, message);
        prop_assert_eq!(
            parsed.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            now.format("%Y-%m-%d %H:%M:%S").to_string()
        );
    }

    /// Property: toggling in any sequence leaves the mechanism coherent —
    /// the record count equals the number of calls made while enabled.
    #[test]
    fn proptest_record_count_tracks_the_switch(
        toggles in prop::collection::vec(prop::bool::ANY, 1..20)
    ) {
        let memory = MemoryDestination::new();
        let sink = Arc::new(AuditSink::new().with_destination(memory.clone()));
        let switch = AuditSwitch::default();

        let class = ClassDef::new("Subject")
            .operation("tick", |_fields, _args| Ok(Value::Unit));
        let audited = audit_class(class, &AuditPolicy::All, switch.clone(), sink)
            .expect("wrap should succeed");
        let mut instance = audited.instantiate(&CallArgs::new()).expect("init");

        let mut expected = 0usize;
        for enabled in toggles {
            if enabled {
                switch.enable();
                expected += 1;
            } else {
                switch.disable();
            }
            instance.call("tick", &CallArgs::new()).expect("call");
        }

        prop_assert_eq!(memory.len(), expected);
    }
}
