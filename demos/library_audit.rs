//! Auditing an external collaborator.
//!
//! A small book-library class is defined entirely on the collaborator's
//! side — a name and an operation table, nothing else — and handed to the
//! auditor. The collaborator never touches the interceptor's internals.
//!
//! Run with: `cargo run --example library_audit`

use call_audit::sink::{AuditSink, MemoryDestination};
use call_audit::{AuditPolicy, Auditor, CallArgs, ClassDef, Value};

fn library_class() -> ClassDef {
    ClassDef::new("Library")
        .constructor(|fields, args| {
            fields.set("name", args.value(0).cloned().unwrap_or(Value::Unit));
            fields.set("catalog", "");
            Ok(Value::Unit)
        })
        .operation("add_book", |fields, args| {
            let title = args.value(0).cloned().unwrap_or(Value::Unit);
            let catalog = fields
                .get("catalog")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let next = if catalog.is_empty() {
                title.to_string()
            } else {
                format!("{}; {}", catalog, title)
            };
            fields.set("catalog", next);
            Ok(Value::Unit)
        })
        .operation("remove_book", |fields, args| {
            let title = args
                .value(0)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let catalog = fields
                .get("catalog")
                .and_then(Value::as_str)
                .unwrap_or_default();
            let mut kept = Vec::new();
            let mut removed = false;
            for entry in catalog.split("; ") {
                if entry.is_empty() {
                    continue;
                }
                if entry == title {
                    removed = true;
                } else {
                    kept.push(entry);
                }
            }
            let next = kept.join("; ");
            fields.set("catalog", next);
            Ok(Value::Bool(removed))
        })
        .operation("list_books", |fields, _args| {
            Ok(fields.get("catalog").cloned().unwrap_or(Value::Unit))
        })
}

fn main() {
    println!("=== Library Audit Example ===\n");

    let memory = MemoryDestination::new();
    let auditor = Auditor::new(AuditSink::new().with_destination(memory.clone()));

    // Scenario 1: every mutation shows up in the trail
    println!("--- Scenario 1: Audited catalog changes ---");

    let library = auditor
        .audit_class(library_class())
        .expect("audit Library");
    let mut branch = library
        .instantiate(&CallArgs::new().arg("City Branch"))
        .expect("construct Library");

    branch
        .call("add_book", &CallArgs::new().arg("Dune"))
        .expect("add");
    branch
        .call("add_book", &CallArgs::new().arg("Solaris"))
        .expect("add");
    let removed = branch
        .call("remove_book", &CallArgs::new().arg("Dune"))
        .expect("remove");
    println!("✓ Removed Dune: {}", removed);

    let catalog = branch
        .call("list_books", &CallArgs::new())
        .expect("list");
    println!("✓ Remaining catalog: {}", catalog);

    // Scenario 2: a narrower policy audits only the mutations
    println!("\n--- Scenario 2: Only-listed operations ---");

    let quiet_reads = auditor
        .audit_class_with(
            library_class(),
            &AuditPolicy::only(["add_book", "remove_book"]),
        )
        .expect("audit with Only policy");
    let mut archive = quiet_reads
        .instantiate(&CallArgs::new().arg("Archive"))
        .expect("construct");

    archive
        .call("add_book", &CallArgs::new().arg("Foundation"))
        .expect("add");
    archive
        .call("list_books", &CallArgs::new())
        .expect("unaudited read");
    println!("✓ Reads stay out of the trail under the Only policy");

    // The collected trail
    println!("\n--- Audit Trail ---");
    memory.with_lines(|lines| {
        for line in lines {
            println!("{}", line);
        }
    });

    println!("\n=== Key Takeaways ===");
    println!("1. Collaborators supply (name, bases, operations) and nothing more");
    println!("2. Constructors are audited with their arguments");
    println!("3. A policy narrows the trail without touching the class");
}
