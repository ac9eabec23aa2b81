#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use startup_helper_core::capability::{OsVersion, SchedulerVersion};
use startup_helper_core::platform::{RunKeyStore, SessionInfo, TaskScheduler};
use startup_helper_core::task::{PrincipalBinding, RegisteredTask, TaskDefinition};
use startup_helper_core::{RunKeyHive, StoreError, StoreResult, WellKnownGroup};
use uuid::Uuid;

pub const CURRENT_USER: &str = "DESKTOP-01\\alice";

/// 内存中的平台状态；克隆出的 [`FakePlatform`] 共享同一份状态。
#[derive(Debug)]
pub struct FakeState {
    pub tasks: HashMap<String, TaskDefinition>,
    pub foreign_tasks: HashMap<String, String>,
    pub user_run: HashMap<String, String>,
    pub machine_run: HashMap<String, String>,
    pub elevated: bool,
    pub machine_readable: bool,
    pub scheduler_version: SchedulerVersion,
    pub os_version: OsVersion,
}

#[derive(Debug, Clone)]
pub struct FakePlatform(pub Rc<RefCell<FakeState>>);

impl FakePlatform {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(FakeState {
            tasks: HashMap::new(),
            foreign_tasks: HashMap::new(),
            user_run: HashMap::new(),
            machine_run: HashMap::new(),
            elevated: false,
            machine_readable: true,
            scheduler_version: SchedulerVersion::new(1, 6),
            os_version: OsVersion::new(10, 0),
        })))
    }

    pub fn elevated(self, value: bool) -> Self {
        self.0.borrow_mut().elevated = value;
        self
    }

    pub fn state(&self) -> std::cell::Ref<'_, FakeState> {
        self.0.borrow()
    }

    pub fn state_mut(&self) -> std::cell::RefMut<'_, FakeState> {
        self.0.borrow_mut()
    }

    /// 规则总数（任务 + 两个 Run 键中的同名值）。
    pub fn rule_count(&self, name: &str) -> usize {
        let s = self.0.borrow();
        usize::from(s.tasks.contains_key(name))
            + usize::from(s.foreign_tasks.contains_key(name))
            + usize::from(s.user_run.contains_key(name))
            + usize::from(s.machine_run.contains_key(name))
    }
}

impl TaskScheduler for FakePlatform {
    fn find_task(&self, name: &str) -> StoreResult<Option<RegisteredTask>> {
        let s = self.0.borrow();
        if let Some(owner) = s.foreign_tasks.get(name) {
            return Ok(Some(RegisteredTask {
                name: name.to_string(),
                user_id: Some(owner.clone()),
            }));
        }
        Ok(s.tasks.get(name).map(|def| RegisteredTask {
            name: name.to_string(),
            user_id: match &def.principal.binding {
                Some(PrincipalBinding::User(u)) => Some(u.clone()),
                _ => None,
            },
        }))
    }

    fn delete_task(&self, name: &str) -> StoreResult<()> {
        let mut s = self.0.borrow_mut();
        s.tasks.remove(name);
        s.foreign_tasks.remove(name);
        Ok(())
    }

    fn register_task(&self, name: &str, definition: &TaskDefinition) -> StoreResult<()> {
        self.0
            .borrow_mut()
            .tasks
            .insert(name.to_string(), definition.clone());
        Ok(())
    }

    fn highest_supported_version(&self) -> StoreResult<SchedulerVersion> {
        Ok(self.0.borrow().scheduler_version)
    }
}

impl RunKeyStore for FakePlatform {
    fn get_value(&self, hive: RunKeyHive, name: &str) -> StoreResult<Option<String>> {
        let s = self.0.borrow();
        match hive {
            RunKeyHive::CurrentUser => Ok(s.user_run.get(name).cloned()),
            RunKeyHive::LocalMachine if !s.machine_readable => {
                Err(StoreError::AccessDenied("HKLM".to_string()))
            }
            RunKeyHive::LocalMachine => Ok(s.machine_run.get(name).cloned()),
        }
    }

    fn set_value(&self, hive: RunKeyHive, name: &str, value: &str) -> StoreResult<()> {
        let mut s = self.0.borrow_mut();
        match hive {
            RunKeyHive::CurrentUser => {
                s.user_run.insert(name.to_string(), value.to_string());
            }
            RunKeyHive::LocalMachine if !s.elevated => {
                return Err(StoreError::AccessDenied("HKLM".to_string()));
            }
            RunKeyHive::LocalMachine => {
                s.machine_run.insert(name.to_string(), value.to_string());
            }
        }
        Ok(())
    }

    fn delete_value(&self, hive: RunKeyHive, name: &str) -> StoreResult<()> {
        let mut s = self.0.borrow_mut();
        match hive {
            RunKeyHive::CurrentUser => {
                s.user_run.remove(name);
            }
            RunKeyHive::LocalMachine if !s.elevated => {
                return Err(StoreError::AccessDenied("HKLM".to_string()));
            }
            RunKeyHive::LocalMachine => {
                s.machine_run.remove(name);
            }
        }
        Ok(())
    }
}

impl SessionInfo for FakePlatform {
    fn is_elevated(&self) -> bool {
        self.0.borrow().elevated
    }

    fn current_user(&self) -> StoreResult<String> {
        Ok(CURRENT_USER.to_string())
    }

    fn is_current_user(&self, account: &str) -> bool {
        account.eq_ignore_ascii_case(CURRENT_USER)
    }

    fn group_account_name(&self, group: WellKnownGroup) -> StoreResult<String> {
        Ok(match group {
            WellKnownGroup::Administrators => "BUILTIN\\Administrators".to_string(),
            WellKnownGroup::Users => "BUILTIN\\Users".to_string(),
        })
    }

    fn os_version(&self) -> OsVersion {
        self.0.borrow().os_version
    }
}

/// 在临时目录中创建一个假的可执行文件，离开作用域时删除整个目录。
pub fn fake_executable() -> (PathBuf, CleanupDir) {
    let dir = std::env::temp_dir().join(format!("startup-helper-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let exe = dir.join("app.exe");
    std::fs::write(&exe, b"MZ").expect("write fake exe");
    (exe, CleanupDir(dir))
}

pub fn path_str(p: &Path) -> String {
    p.display().to_string()
}

pub struct CleanupDir(pub PathBuf);

impl Drop for CleanupDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}
