//! Reconciliation passes against the in-memory management binding.

use std::io::Write;

use pagefile_core::{CaseRule, Ensure, ErrorCategory, PageFilePath, PageFileResource};
use pagefile_provider::{
    Action, Notice, PageFileProvider, ProviderOptions, ReconcileOptions, reconcile,
};
use pagefile_wmi::{FaultMode, InMemoryManagement, Mutation, Operation, PageFileSetting, codes};

fn options() -> ProviderOptions {
    ProviderOptions {
        case_rule: CaseRule::Capitalize,
        benign_codes: vec![codes::WBEM_E_FAILED],
    }
}

fn declare(raw: &str) -> PageFileResource {
    PageFileResource::new(PageFilePath::parse(raw, CaseRule::Capitalize).unwrap())
}

fn apply(machine: &InMemoryManagement, declared: Vec<PageFileResource>) -> pagefile_provider::ReconcileReport {
    let provider = PageFileProvider::new(machine, options());
    reconcile(&provider, machine, declared, ReconcileOptions::default()).unwrap()
}

#[test]
fn test_fixed_size_on_automatic_machine() {
    let machine = InMemoryManagement::new().with_automatic_managed(true);
    let report = apply(
        &machine,
        vec![declare("/C:/pagefile.sys").with_initial_size(512).with_maximum_size(1024)],
    );

    assert_eq!(report.failed(), 0);
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.action, Action::Create);
    assert_eq!(
        outcome.notices,
        vec![
            Notice::AutomaticManagementDisabled,
            Notice::RebootRequired {
                path: PageFilePath::parse("C:/pagefile.sys", CaseRule::Capitalize).unwrap()
            },
        ]
    );
    assert_eq!(
        machine.journal(),
        vec![
            Mutation::SetAutomaticManaged(false),
            Mutation::Spawn {
                name: "C:/pagefile.sys".into()
            },
            Mutation::Put(PageFileSetting::new("C:/pagefile.sys", 512, 1024)),
        ]
    );
}

#[test]
fn test_system_managed_with_size_fails_without_calls() {
    let machine = InMemoryManagement::new();
    let provider = PageFileProvider::new(&machine, options());
    let declared = vec![
        declare("C:\\pagefile.sys")
            .with_system_managed(true)
            .with_initial_size(100),
    ];
    machine.clear_journal();
    let report = reconcile(&provider, &machine, declared, ReconcileOptions::default()).unwrap();

    let outcome = &report.outcomes[0];
    assert!(outcome.is_failed());
    assert_eq!(outcome.category, Some(ErrorCategory::Validation));
    assert_eq!(machine.mutating_calls(), 0);
}

#[test]
fn test_created_page_file_enumerates_as_declared() {
    let machine = InMemoryManagement::new();
    apply(
        &machine,
        vec![
            declare("C:\\pagefile.sys").with_system_managed(true),
            declare("D:\\pagefile.sys").with_system_managed(false).with_initial_size(2048),
        ],
    );

    let provider = PageFileProvider::new(&machine, options());
    let observed: Vec<_> = provider.instances().unwrap().collect();
    assert_eq!(observed.len(), 2);
    assert!(observed[0].system_managed());
    assert!(!observed[1].system_managed());
    assert_eq!(observed[1].initial_size_mb, 2048);
    assert_eq!(observed[1].maximum_size_mb, 2048);
}

#[test]
fn test_second_pass_is_idempotent() {
    let machine = InMemoryManagement::new().with_automatic_managed(true);
    let declared = vec![
        declare("C:\\pagefile.sys").with_initial_size(512),
        declare("D:\\pagefile.sys").with_maximum_size(4096),
    ];
    apply(&machine, declared.clone());
    machine.clear_journal();

    let report = apply(&machine, declared);
    assert!(report.outcomes.iter().all(|o| o.action == Action::InSync));
    assert_eq!(machine.mutating_calls(), 0);
    assert!(machine.journal().is_empty());
}

#[test]
fn test_update_stages_once_and_flushes_once() {
    let machine = InMemoryManagement::new().with_page_file(PageFileSetting::new("c:\\pagefile.sys", 0, 0));
    let report = apply(
        &machine,
        vec![declare("C:\\pagefile.sys").with_initial_size(256).with_maximum_size(512)],
    );

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.action, Action::Update);
    assert_eq!(outcome.changes.len(), 2);
    let puts = machine.calls().into_iter().filter(|op| *op == Operation::PutPageFile).count();
    assert_eq!(puts, 1);
    assert_eq!(machine.page_files(), vec![PageFileSetting::new("c:\\pagefile.sys", 256, 512)]);
}

#[test]
fn test_destroying_last_page_file_reenables_automatic_management() {
    let machine = InMemoryManagement::new().with_page_file(PageFileSetting::new("C:\\pagefile.sys", 64, 64));
    let report = apply(
        &machine,
        vec![declare("C:\\pagefile.sys").with_ensure(Ensure::Absent)],
    );

    assert_eq!(report.outcomes[0].action, Action::Destroy);
    assert_eq!(report.outcomes[0].notices, vec![Notice::AutomaticManagementEnabled]);
    assert!(machine.automatic_managed());
    assert!(machine.page_files().is_empty());
}

#[test]
fn test_destroying_with_others_remaining_keeps_flag() {
    let machine = InMemoryManagement::new()
        .with_page_file(PageFileSetting::new("C:\\pagefile.sys", 64, 64))
        .with_page_file(PageFileSetting::new("D:\\pagefile.sys", 64, 64));
    let report = apply(
        &machine,
        vec![declare("D:\\pagefile.sys").with_ensure(Ensure::Absent)],
    );

    assert!(report.outcomes[0].notices.is_empty());
    assert!(!machine.automatic_managed());
    assert_eq!(machine.page_files().len(), 1);
}

#[test]
fn test_absent_and_missing_is_in_sync() {
    let machine = InMemoryManagement::new();
    let report = apply(
        &machine,
        vec![declare("C:\\pagefile.sys").with_ensure(Ensure::Absent)],
    );
    assert_eq!(report.outcomes[0].action, Action::InSync);
    assert_eq!(machine.mutating_calls(), 0);
}

#[test]
fn test_benign_code_is_swallowed() {
    let machine = InMemoryManagement::new().with_page_file(PageFileSetting::new("C:\\pagefile.sys", 0, 0));
    machine.inject_fault(Operation::PutPageFile, codes::WBEM_E_FAILED, FaultMode::AfterWrite);
    let report = apply(&machine, vec![declare("C:\\pagefile.sys").with_initial_size(128)]);

    assert_eq!(report.failed(), 0);
    assert_eq!(machine.page_files(), vec![PageFileSetting::new("C:\\pagefile.sys", 128, 128)]);
}

#[test]
fn test_failure_is_scoped_to_one_resource() {
    let machine = InMemoryManagement::new()
        .with_page_file(PageFileSetting::new("C:\\pagefile.sys", 0, 0))
        .with_page_file(PageFileSetting::new("D:\\pagefile.sys", 0, 0));
    machine.inject_fault(Operation::PutPageFile, codes::WBEM_E_ACCESS_DENIED, FaultMode::BeforeWrite);
    let report = apply(
        &machine,
        vec![
            declare("C:\\pagefile.sys").with_initial_size(128),
            declare("D:\\pagefile.sys").with_initial_size(256),
        ],
    );

    assert_eq!(report.failed(), 1);
    let failed = &report.outcomes[0];
    assert_eq!(failed.category, Some(ErrorCategory::Automation));
    assert!(failed.error.as_deref().unwrap().contains("0x80041003"));
    assert!(!report.outcomes[1].is_failed());
    assert_eq!(
        machine.page_files(),
        vec![
            PageFileSetting::new("C:\\pagefile.sys", 0, 0),
            PageFileSetting::new("D:\\pagefile.sys", 256, 256),
        ]
    );
}

#[test]
fn test_failed_enumeration_aborts_pass() {
    let machine = InMemoryManagement::new();
    machine.inject_fault(Operation::QueryPageFiles, codes::WBEM_E_ACCESS_DENIED, FaultMode::BeforeWrite);
    let provider = PageFileProvider::new(&machine, options());
    let result = reconcile(
        &provider,
        &machine,
        vec![declare("C:\\pagefile.sys")],
        ReconcileOptions::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_noop_reports_without_mutating() {
    let machine = InMemoryManagement::new()
        .with_automatic_managed(true)
        .with_page_file(PageFileSetting::new("D:\\pagefile.sys", 64, 64))
        .with_page_file(PageFileSetting::new("E:\\pagefile.sys", 64, 64));
    let provider = PageFileProvider::new(&machine, options());
    let declared = vec![
        declare("C:\\pagefile.sys").with_initial_size(512),
        declare("D:\\pagefile.sys").with_maximum_size(128),
        declare("E:\\pagefile.sys").with_ensure(Ensure::Absent),
    ];
    let report = reconcile(&provider, &machine, declared, ReconcileOptions { noop: true }).unwrap();

    let actions: Vec<_> = report.outcomes.iter().map(|o| o.action).collect();
    assert_eq!(actions, vec![Action::Create, Action::Update, Action::Destroy]);
    assert!(report.noop);
    assert_eq!(machine.mutating_calls(), 0);
}

#[test]
fn test_pass_from_fixture_file() {
    let mut fixture = tempfile::NamedTempFile::new().unwrap();
    write!(
        fixture,
        r#"{{
            "automatic_managed_page_file": false,
            "platform_release": "10.0.19045",
            "page_files": [{{ "Name": "C:\\pagefile.sys", "InitialSize": 0, "MaximumSize": 0 }}]
        }}"#
    )
    .unwrap();

    let machine = InMemoryManagement::from_fixture_file(fixture.path()).unwrap();
    let report = apply(&machine, vec![declare("C:\\pagefile.sys").with_system_managed(true)]);
    assert_eq!(report.outcomes[0].action, Action::InSync);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcomes"][0]["action"], "in_sync");
    assert!(json["started_at"].as_str().unwrap().contains('T'));
}

#[test]
fn test_lowercase_rule_matches_mixed_case_live_names() {
    let rule = CaseRule::Lowercase;
    let machine = InMemoryManagement::new()
        .with_automatic_managed(true)
        .with_page_file(PageFileSetting::new("D:\\PageFile.sys", 64, 64));
    let provider = PageFileProvider::new(
        &machine,
        ProviderOptions {
            case_rule: rule,
            benign_codes: vec![codes::WBEM_E_FAILED],
        },
    );
    let declared = vec![
        PageFileResource::new(PageFilePath::parse("/C:/PageFile.sys", rule).unwrap())
            .with_initial_size(512)
            .with_maximum_size(1024),
        PageFileResource::new(PageFilePath::parse("d:\\pagefile.sys", rule).unwrap()).with_initial_size(64),
    ];

    let report = reconcile(&provider, &machine, declared.clone(), ReconcileOptions::default()).unwrap();
    let actions: Vec<_> = report.outcomes.iter().map(|o| o.action).collect();
    assert_eq!(actions, vec![Action::Create, Action::InSync]);
    assert_eq!(
        machine.journal(),
        vec![
            Mutation::SetAutomaticManaged(false),
            Mutation::Spawn {
                name: "c:/pagefile.sys".into()
            },
            Mutation::Put(PageFileSetting::new("c:/pagefile.sys", 512, 1024)),
        ]
    );

    machine.clear_journal();
    let second = reconcile(&provider, &machine, declared, ReconcileOptions::default()).unwrap();
    assert!(second.outcomes.iter().all(|o| o.action == Action::InSync));
    assert_eq!(machine.mutating_calls(), 0);
}
