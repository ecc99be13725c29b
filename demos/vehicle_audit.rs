//! Vehicle auditing demonstration.
//!
//! This example shows the full interception flow:
//! 1. Open a file destination under `log/` and build an `Auditor`
//! 2. Mirror console output into the same file
//! 3. Audit two independent classes and drive their operations
//! 4. Toggle auditing off and on between calls
//!
//! Run with: `cargo run --example vehicle_audit`

use std::io::Write;
use std::sync::Arc;

use call_audit::sink::{AuditLevel, AuditSink, FileDestination};
use call_audit::{Auditor, CallArgs, ClassDef, ConsoleMirror, Value, DISPLAY};

fn car_class() -> ClassDef {
    ClassDef::new("Car")
        .constructor(|fields, args| {
            fields.set("model", args.value(0).cloned().unwrap_or(Value::Unit));
            Ok(Value::Unit)
        })
        .operation("start", |fields, _args| {
            let model = fields.get("model").cloned().unwrap_or(Value::Unit);
            Ok(Value::Str(format!("{} started!", model)))
        })
        .operation("stop", |fields, _args| {
            let model = fields.get("model").cloned().unwrap_or(Value::Unit);
            Ok(Value::Str(format!("{} stopped!", model)))
        })
        .operation(DISPLAY, |fields, _args| {
            let model = fields.get("model").cloned().unwrap_or(Value::Unit);
            Ok(Value::Str(format!("Car({})", model)))
        })
}

fn plane_class() -> ClassDef {
    ClassDef::new("Plane")
        .constructor(|fields, args| {
            fields.set("name", args.value(0).cloned().unwrap_or(Value::Unit));
            Ok(Value::Unit)
        })
        .operation("take_off", |fields, _args| {
            let name = fields.get("name").cloned().unwrap_or(Value::Unit);
            Ok(Value::Str(format!("{} took off!", name)))
        })
        .operation("land", |fields, _args| {
            let name = fields.get("name").cloned().unwrap_or(Value::Unit);
            Ok(Value::Str(format!("{} landed!", name)))
        })
}

fn main() {
    tracing_subscriber::fmt::init();

    let file = Arc::new(FileDestination::in_log_dir("vehicle_audit").expect("open log file"));
    let auditor = Auditor::new(AuditSink::new().with_destination(file.clone()));

    // Everything printed through the mirror lands on stdout and, while
    // auditing is enabled, in the log file as a CONSOLE line.
    let mut console = ConsoleMirror::new(std::io::stdout(), file, auditor.switch());

    auditor
        .sink()
        .record_message(AuditLevel::Info, "=== vehicle audit demo started ===")
        .expect("record start banner");
    writeln!(console, "Demo started, auditing to {}.", "log/vehicle_audit.log")
        .expect("console write");

    let car = auditor.audit_class(car_class()).expect("audit Car");
    let plane = auditor.audit_class(plane_class()).expect("audit Plane");

    let mut tesla = car
        .instantiate(&CallArgs::new().arg("Tesla"))
        .expect("construct Car");
    for operation in ["start", "stop"] {
        let said = tesla.call(operation, &CallArgs::new()).expect("call");
        writeln!(console, "{}", said).expect("console write");
    }

    let mut boeing = plane
        .instantiate(&CallArgs::new().arg("Boeing 747"))
        .expect("construct Plane");
    for operation in ["take_off", "land"] {
        let said = boeing.call(operation, &CallArgs::new()).expect("call");
        writeln!(console, "{}", said).expect("console write");
    }

    // The display hook stays quiet in the log under the default policy.
    writeln!(console, "Driving {}", tesla).expect("console write");

    auditor.disable_auditing().expect("record toggle");
    let said = tesla.call("start", &CallArgs::new()).expect("still runs");
    writeln!(console, "{} (this call was not logged)", said).expect("console write");

    auditor.enable_auditing().expect("record toggle");
    auditor
        .sink()
        .record_message(AuditLevel::Info, "=== vehicle audit demo finished ===")
        .expect("record end banner");
    writeln!(console, "Demo finished.").expect("console write");
    console.flush().expect("flush console");
}
