mod common;

use common::{fake_executable, path_str, FakePlatform, CURRENT_USER};
use startup_helper_core::capability::SchedulerVersion;
use startup_helper_core::task::{LogonType, PrincipalBinding, RunLevel};
use startup_helper_core::{ProviderKind, RegistrationScope, StartupConfiguration, StartupRegistrar};
use uuid::Uuid;

fn unique_name() -> String {
    format!("StartupHelperTest-{}", Uuid::new_v4())
}

fn config(
    exe: &std::path::Path,
    name: &str,
    scope: RegistrationScope,
    provider: ProviderKind,
    requires_elevation: bool,
) -> StartupConfiguration {
    StartupConfiguration::new(exe, name, scope, provider, requires_elevation, "--startup")
        .expect("valid configuration")
}

#[test]
fn register_then_query_reports_registered_for_every_provider_and_scope() {
    let (exe, _cleanup) = fake_executable();
    for provider in [ProviderKind::SchedulerTask, ProviderKind::LoginRunKey] {
        for scope in [RegistrationScope::Local, RegistrationScope::Global] {
            let name = unique_name();
            let registrar = StartupRegistrar::new(
                config(&exe, &name, scope, provider, false),
                FakePlatform::new().elevated(true),
            );
            assert!(
                registrar.register(None).expect("register"),
                "{provider} / {scope:?} should be registered"
            );
            assert!(registrar.is_registered().expect("query"));
        }
    }
}

#[test]
fn unregister_then_query_reports_absent_and_repeats_are_successful() {
    let (exe, _cleanup) = fake_executable();
    let name = unique_name();
    let registrar = StartupRegistrar::new(
        config(&exe, &name, RegistrationScope::Local, ProviderKind::SchedulerTask, false),
        FakePlatform::new(),
    );
    assert!(registrar.register(Some("--nice")).expect("register"));

    assert!(registrar.unregister().expect("unregister"));
    assert!(!registrar.is_registered().expect("query"));
    assert!(registrar.unregister().expect("unregister again"));
    assert_eq!(registrar.platform().rule_count(&name), 0);
}

#[test]
fn registering_twice_leaves_a_single_rule() {
    let (exe, _cleanup) = fake_executable();
    for provider in [ProviderKind::SchedulerTask, ProviderKind::LoginRunKey] {
        let name = unique_name();
        let registrar = StartupRegistrar::new(
            config(&exe, &name, RegistrationScope::Local, provider, false),
            FakePlatform::new(),
        );
        assert!(registrar.register(Some("--first")).expect("first register"));
        assert!(registrar.register(Some("--second")).expect("second register"));
        assert_eq!(registrar.platform().rule_count(&name), 1);
    }
}

#[test]
fn demo_scenario_registers_and_detects_startup_invocation() {
    let (exe, _cleanup) = fake_executable();
    let cfg = StartupConfiguration::builder("Demo", RegistrationScope::Local)
        .executable(&exe)
        .sentinel("--startup")
        .build(&FakePlatform::new())
        .expect("build");
    let registrar = StartupRegistrar::new(cfg, FakePlatform::new());

    assert!(registrar.register(Some("--nice")).expect("register"));
    assert!(registrar.is_registered().expect("query"));

    let argv = ["app.exe", "--startup", "--nice"];
    assert!(registrar.config().is_started_via_auto_start_from(&argv));
    assert_eq!(registrar.config().application_arguments_from(&argv), vec!["--nice"]);

    let manual = ["app.exe", "--nice"];
    assert!(!registrar.config().is_started_via_auto_start_from(&manual));
}

#[test]
fn switching_from_run_key_to_task_removes_the_stale_value() {
    let (exe, _cleanup) = fake_executable();
    let name = unique_name();
    let platform = FakePlatform::new();

    let run_key = StartupRegistrar::new(
        config(&exe, &name, RegistrationScope::Local, ProviderKind::LoginRunKey, false),
        platform.clone(),
    );
    assert!(run_key.register(Some("--nice")).expect("register run key"));
    assert!(platform.state().user_run.contains_key(&name));

    let task = StartupRegistrar::new(
        config(&exe, &name, RegistrationScope::Local, ProviderKind::SchedulerTask, false),
        platform.clone(),
    );
    assert!(task.register(Some("--nice")).expect("register task"));
    assert!(!platform.state().user_run.contains_key(&name));
    assert!(platform.state().tasks.contains_key(&name));
    assert_eq!(platform.rule_count(&name), 1);
}

#[test]
fn query_cleans_stale_current_user_value_under_task_provider() {
    let (exe, _cleanup) = fake_executable();
    let name = unique_name();
    let platform = FakePlatform::new();
    platform
        .state_mut()
        .user_run
        .insert(name.clone(), "\"old.exe\" --startup".to_string());

    let registrar = StartupRegistrar::new(
        config(&exe, &name, RegistrationScope::Global, ProviderKind::SchedulerTask, false),
        platform.clone(),
    );
    assert!(!registrar.is_registered().expect("query"));
    assert!(!platform.state().user_run.contains_key(&name));
}

#[test]
fn stale_machine_value_is_only_cleaned_when_elevated() {
    let (exe, _cleanup) = fake_executable();
    let name = unique_name();
    let platform = FakePlatform::new();
    platform
        .state_mut()
        .machine_run
        .insert(name.clone(), "\"old.exe\" --startup".to_string());

    let registrar = StartupRegistrar::new(
        config(&exe, &name, RegistrationScope::Local, ProviderKind::SchedulerTask, false),
        platform.clone(),
    );
    assert!(!registrar.is_registered().expect("query unelevated"));
    assert!(platform.state().machine_run.contains_key(&name));

    platform.state_mut().elevated = true;
    assert!(!registrar.is_registered().expect("query elevated"));
    assert!(!platform.state().machine_run.contains_key(&name));
}

#[test]
fn unreadable_machine_store_is_treated_as_not_found() {
    let (exe, _cleanup) = fake_executable();
    let name = unique_name();
    let platform = FakePlatform::new();
    platform.state_mut().machine_readable = false;

    let registrar = StartupRegistrar::new(
        config(&exe, &name, RegistrationScope::Local, ProviderKind::LoginRunKey, false),
        platform,
    );
    assert!(!registrar.is_registered().expect("query must not fail"));
    assert!(registrar.register(None).expect("register"));
}

#[test]
fn global_run_key_without_elevation_reports_failure_instead_of_error() {
    let (exe, _cleanup) = fake_executable();
    let name = unique_name();
    let registrar = StartupRegistrar::new(
        config(&exe, &name, RegistrationScope::Global, ProviderKind::LoginRunKey, false),
        FakePlatform::new(),
    );
    assert!(!registrar.register(None).expect("register must not fail"));
    assert_eq!(registrar.platform().rule_count(&name), 0);
}

#[test]
fn task_owned_by_another_user_is_ignored_for_local_scope() {
    let (exe, _cleanup) = fake_executable();
    let name = unique_name();
    let platform = FakePlatform::new();
    platform
        .state_mut()
        .foreign_tasks
        .insert(name.clone(), "DESKTOP-01\\bob".to_string());

    let local = StartupRegistrar::new(
        config(&exe, &name, RegistrationScope::Local, ProviderKind::SchedulerTask, false),
        platform.clone(),
    );
    assert!(!local.is_registered().expect("query"));

    let global = StartupRegistrar::new(
        config(&exe, &name, RegistrationScope::Global, ProviderKind::SchedulerTask, false),
        platform,
    );
    assert!(!global.is_registered().expect("query"));
}

#[test]
fn local_task_is_bound_to_current_user_with_least_privilege() {
    let (exe, _cleanup) = fake_executable();
    let name = unique_name();
    let registrar = StartupRegistrar::new(
        config(&exe, &name, RegistrationScope::Local, ProviderKind::SchedulerTask, false),
        FakePlatform::new(),
    );
    assert!(registrar.register(Some("--nice /argument")).expect("register"));

    let state = registrar.platform().state();
    let def = state.tasks.get(&name).expect("task registered");
    assert_eq!(def.action.path, exe);
    assert_eq!(def.action.arguments, "--startup --nice /argument");
    assert_eq!(def.action.working_directory, exe.parent().unwrap());
    assert_eq!(def.trigger.user_id.as_deref(), Some(CURRENT_USER));
    assert_eq!(def.principal.run_level, Some(RunLevel::LeastPrivilege));
    assert_eq!(
        def.principal.binding,
        Some(PrincipalBinding::User(CURRENT_USER.to_string()))
    );
    assert!(!def.settings.disallow_start_if_on_batteries);
    assert!(def.settings.execution_time_limit.is_none());
    assert!(def.settings.compatibility_v2);
    assert!(def.settings.start_when_available);
    assert!(!def.settings.run_only_if_logged_on);
    assert_eq!(def.logon_type(), LogonType::InteractiveToken);
}

#[test]
fn global_elevated_task_is_bound_to_administrators() {
    let (exe, _cleanup) = fake_executable();
    let name = unique_name();
    let registrar = StartupRegistrar::new(
        config(&exe, &name, RegistrationScope::Global, ProviderKind::SchedulerTask, true),
        FakePlatform::new().elevated(true),
    );
    assert!(registrar.register(None).expect("register"));

    let state = registrar.platform().state();
    let def = state.tasks.get(&name).expect("task registered");
    assert_eq!(def.action.arguments, "--startup");
    assert!(def.trigger.user_id.is_none());
    assert_eq!(def.principal.run_level, Some(RunLevel::Highest));
    assert_eq!(
        def.principal.binding,
        Some(PrincipalBinding::Group("BUILTIN\\Administrators".to_string()))
    );
    assert_eq!(def.logon_type(), LogonType::Group);
}

#[test]
fn legacy_scheduler_runs_only_when_logged_on_without_binding() {
    let (exe, _cleanup) = fake_executable();
    let name = unique_name();
    let platform = FakePlatform::new();
    platform.state_mut().scheduler_version = SchedulerVersion::new(1, 1);

    let registrar = StartupRegistrar::new(
        config(&exe, &name, RegistrationScope::Global, ProviderKind::SchedulerTask, false),
        platform,
    );
    assert!(registrar.register(None).expect("register"));

    let state = registrar.platform().state();
    let def = state.tasks.get(&name).expect("task registered");
    assert!(def.settings.run_only_if_logged_on);
    assert!(!def.settings.compatibility_v2);
    assert!(def.principal.run_level.is_none());
    assert!(def.principal.binding.is_none());
    assert_eq!(def.logon_type(), LogonType::InteractiveToken);

    // 未绑定主体且不要求登录时运行：不指定登录方式。
    let mut unbound = def.clone();
    unbound.settings.run_only_if_logged_on = false;
    assert_eq!(unbound.logon_type(), LogonType::Unspecified);
}

#[test]
fn run_key_value_quotes_the_executable() {
    let (exe, _cleanup) = fake_executable();
    let name = unique_name();
    let registrar = StartupRegistrar::new(
        config(&exe, &name, RegistrationScope::Local, ProviderKind::LoginRunKey, false),
        FakePlatform::new(),
    );
    assert!(registrar.register(Some("--nice /argument")).expect("register"));

    let state = registrar.platform().state();
    assert_eq!(
        state.user_run.get(&name).map(String::as_str),
        Some(format!("\"{}\" --startup --nice /argument", path_str(&exe)).as_str())
    );
}
