use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use dashmap::DashSet;
use once_cell::sync::OnceCell;

use crate::config::PickerConfig;
use crate::error::{InterceptError, Result};

use super::classifier::RequestClassifier;
use super::config::{TargetDefinition, default_application_targets, default_system_targets};
use super::dispatch::HookDispatcher;
use super::rewriter::RequestRewriter;
use super::types::{
    BindOutcome, HookContextKind, HookTarget, Interceptor, LoadScope, MethodHook,
};

/// 一次注册的结果汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReport {
    pub context: HookContextKind,
    pub scope: String,
    /// 该命名空间此前已经注册过，本次未做任何绑定
    pub already_registered: bool,
    pub targets: Vec<HookTarget>,
}

impl RegistrationReport {
    pub fn bound(&self) -> impl Iterator<Item = &HookTarget> {
        self.targets.iter().filter(|t| t.outcome.is_bound())
    }

    pub fn bound_count(&self) -> usize {
        self.bound().count()
    }

    pub fn absent_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| t.outcome == BindOutcome::Absent)
            .count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &HookTarget> {
        self.targets
            .iter()
            .filter(|t| matches!(t.outcome, BindOutcome::BindError(_)))
    }
}

/// 目标注册中心
///
/// 按优先级逐个探测候选类并绑定回调。单个候选缺失或绑定失败只记录，
/// 不影响其余候选；平台服务层会绑定全部存在的候选，而不是第一个命中的。
pub struct TargetRegistry {
    system: Vec<TargetDefinition>,
    application: Vec<TargetDefinition>,
    dispatcher: HookDispatcher,
    bound_scopes: DashSet<(HookContextKind, String)>,
}

impl Default for TargetRegistry {
    fn default() -> Self {
        Self::new(
            default_system_targets(),
            default_application_targets(),
            HookDispatcher::default(),
        )
    }
}

impl TargetRegistry {
    pub fn new(
        system: Vec<TargetDefinition>,
        application: Vec<TargetDefinition>,
        dispatcher: HookDispatcher,
    ) -> Self {
        Self {
            system,
            application,
            dispatcher,
            bound_scopes: DashSet::new(),
        }
    }

    pub fn from_config(config: &PickerConfig) -> Self {
        let dispatcher = HookDispatcher::new(
            RequestClassifier::from_config(&config.classifier),
            RequestRewriter::new(config.platform()),
        );
        Self::new(config.system.clone(), config.application.clone(), dispatcher)
    }

    pub fn dispatcher(&self) -> &HookDispatcher {
        &self.dispatcher
    }

    pub fn candidates(&self, context: HookContextKind) -> &[TargetDefinition] {
        match context {
            HookContextKind::System => &self.system,
            HookContextKind::Application => &self.application,
        }
    }

    /// 加载事件入口：按命名空间判断上下文后注册
    pub fn handle_load(&self, scope: &LoadScope, interceptor: &dyn Interceptor) -> RegistrationReport {
        self.register(scope.context(), scope, interceptor)
    }

    pub fn register(
        &self,
        context: HookContextKind,
        scope: &LoadScope,
        interceptor: &dyn Interceptor,
    ) -> RegistrationReport {
        if !self.bound_scopes.insert((context, scope.package.clone())) {
            tracing::debug!(scope = %scope.package, %context, "scope already registered, skip");
            return RegistrationReport {
                context,
                scope: scope.package.clone(),
                already_registered: true,
                targets: Vec::new(),
            };
        }

        let targets: Vec<HookTarget> = self
            .candidates(context)
            .iter()
            .map(|def| self.bind_candidate(context, def, scope, interceptor))
            .collect();

        let report = RegistrationReport {
            context,
            scope: scope.package.clone(),
            already_registered: false,
            targets,
        };
        tracing::info!(
            scope = %report.scope,
            %context,
            bound = report.bound_count(),
            absent = report.absent_count(),
            "hook registration finished"
        );
        report
    }

    fn bind_candidate(
        &self,
        context: HookContextKind,
        def: &TargetDefinition,
        scope: &LoadScope,
        interceptor: &dyn Interceptor,
    ) -> HookTarget {
        let label = def.label(context);
        let outcome = if !def.enabled {
            tracing::info!(hook = %label, "hook target disabled, skip");
            BindOutcome::Disabled
        } else {
            let attempt = catch_unwind(AssertUnwindSafe(|| {
                self.try_bind(def, &label, scope, interceptor)
            }));
            match attempt {
                Ok(Ok(0)) => {
                    tracing::debug!(hook = %label, "no matching method, skip");
                    BindOutcome::Absent
                }
                Ok(Ok(methods)) => {
                    tracing::info!(hook = %label, methods, "hooked");
                    BindOutcome::Bound { methods }
                }
                Ok(Err(err)) if err.is_absent() => {
                    tracing::debug!(hook = %label, "class not present, skip");
                    BindOutcome::Absent
                }
                Ok(Err(err)) => {
                    tracing::warn!(hook = %label, error = %err, "failed to hook");
                    BindOutcome::BindError(err.to_string())
                }
                Err(_) => {
                    tracing::error!(hook = %label, "interceptor panicked while binding");
                    BindOutcome::BindError("interceptor panicked while binding".to_string())
                }
            }
        };

        HookTarget {
            context,
            class: def.class.clone(),
            method: def.selector(),
            label,
            outcome,
        }
    }

    fn try_bind(
        &self,
        def: &TargetDefinition,
        label: &str,
        scope: &LoadScope,
        interceptor: &dyn Interceptor,
    ) -> Result<usize> {
        let class = interceptor
            .find_class_if_exists(&def.class, scope)
            .ok_or_else(|| InterceptError::TargetAbsent {
                class: def.class.clone(),
            })?;
        let selector = def.selector();
        let hook: Arc<dyn MethodHook> = Arc::new(self.dispatcher.hook_for(label, def.role.clone()));

        if def.is_result_hook() {
            interceptor.bind_after(&class, &selector, hook)
        } else {
            interceptor.bind_before(&class, &selector, hook)
        }
    }
}

static GLOBAL_REGISTRY: OnceCell<Arc<TargetRegistry>> = OnceCell::new();

/// 进程级注册中心
pub struct GlobalTargetRegistry;

impl GlobalTargetRegistry {
    pub fn init(registry: Arc<TargetRegistry>) -> Arc<TargetRegistry> {
        GLOBAL_REGISTRY.get_or_init(|| registry).clone()
    }

    pub fn get() -> Arc<TargetRegistry> {
        GLOBAL_REGISTRY
            .get_or_init(|| Arc::new(TargetRegistry::default()))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use super::*;
    use crate::hooks::types::{ClassHandle, MethodSelector};

    /// 只认识部分类的拦截机制
    struct PartialRuntime {
        classes: HashSet<&'static str>,
        rejected: HashSet<&'static str>,
        binds: Mutex<Vec<(String, String, bool)>>,
    }

    impl PartialRuntime {
        fn new(classes: &[&'static str]) -> Self {
            Self {
                classes: classes.iter().copied().collect(),
                rejected: HashSet::new(),
                binds: Mutex::new(Vec::new()),
            }
        }

        fn record(&self, class: &ClassHandle, method: &MethodSelector, after: bool) -> Result<usize> {
            if self.rejected.contains(class.name()) {
                return Err(InterceptError::BindFailed {
                    class: class.name().to_string(),
                    method: method.name().to_string(),
                    reason: "access restricted".to_string(),
                });
            }
            self.binds.lock().unwrap().push((
                class.name().to_string(),
                method.name().to_string(),
                after,
            ));
            Ok(1)
        }
    }

    impl Interceptor for PartialRuntime {
        fn find_class_if_exists(&self, class_name: &str, _scope: &LoadScope) -> Option<ClassHandle> {
            self.classes
                .contains(class_name)
                .then(|| ClassHandle::new(class_name, 0))
        }

        fn bind_before(
            &self,
            class: &ClassHandle,
            method: &MethodSelector,
            _hook: Arc<dyn MethodHook>,
        ) -> Result<usize> {
            self.record(class, method, false)
        }

        fn bind_after(
            &self,
            class: &ClassHandle,
            method: &MethodSelector,
            _hook: Arc<dyn MethodHook>,
        ) -> Result<usize> {
            self.record(class, method, true)
        }
    }

    fn four_candidates() -> Vec<TargetDefinition> {
        vec![
            TargetDefinition::new("svc.A", "startActivity"),
            TargetDefinition::new("svc.B", "startActivity"),
            TargetDefinition::new("svc.C", "startActivity"),
            TargetDefinition::new("svc.D", "startActivity"),
        ]
    }

    #[test]
    fn test_binds_every_present_candidate() {
        let registry = TargetRegistry::new(four_candidates(), vec![], HookDispatcher::default());
        let runtime = PartialRuntime::new(&["svc.B", "svc.D"]);

        let report = registry.register(HookContextKind::System, &LoadScope::system(), &runtime);

        assert_eq!(report.bound_count(), 2);
        assert_eq!(report.absent_count(), 2);
        let bound: Vec<_> = report.bound().map(|t| t.class.as_str()).collect();
        assert_eq!(bound, vec!["svc.B", "svc.D"]);
        assert_eq!(runtime.binds.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_bind_failure_does_not_stop_remaining_candidates() {
        let registry = TargetRegistry::new(four_candidates(), vec![], HookDispatcher::default());
        let mut runtime = PartialRuntime::new(&["svc.A", "svc.B", "svc.C"]);
        runtime.rejected.insert("svc.A");

        let report = registry.register(HookContextKind::System, &LoadScope::system(), &runtime);

        assert_eq!(report.errors().count(), 1);
        assert_eq!(report.bound_count(), 2);
        assert_eq!(report.targets[3].outcome, BindOutcome::Absent);
    }

    #[test]
    fn test_scope_registered_once() {
        let registry = TargetRegistry::default();
        let runtime = PartialRuntime::new(&["android.app.Activity"]);
        let scope = LoadScope::application("com.example.gallery");

        let first = registry.handle_load(&scope, &runtime);
        assert!(!first.already_registered);
        assert_eq!(first.bound_count(), 3);

        let second = registry.handle_load(&scope, &runtime);
        assert!(second.already_registered);
        assert!(second.targets.is_empty());
        assert_eq!(runtime.binds.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_result_hook_bound_after_invocation() {
        let registry = TargetRegistry::default();
        let runtime = PartialRuntime::new(&["android.app.Activity"]);

        registry.handle_load(&LoadScope::application("com.example.notes"), &runtime);

        let binds = runtime.binds.lock().unwrap();
        let after: Vec<_> = binds
            .iter()
            .filter(|(_, _, after)| *after)
            .map(|(_, method, _)| method.as_str())
            .collect();
        assert_eq!(after, vec!["onActivityResult"]);
    }

    #[test]
    fn test_disabled_candidate_not_probed() {
        let registry = TargetRegistry::default();
        let runtime = PartialRuntime::new(&["com.android.server.pm.PackageManagerService"]);

        let report = registry.handle_load(&LoadScope::system(), &runtime);

        let pm = report
            .targets
            .iter()
            .find(|t| t.class == "com.android.server.pm.PackageManagerService")
            .unwrap();
        assert_eq!(pm.outcome, BindOutcome::Disabled);
        assert_eq!(report.bound_count(), 0);
    }

    #[test]
    fn test_global_registry_keeps_first_instance() {
        let first = Arc::new(TargetRegistry::new(four_candidates(), vec![], HookDispatcher::default()));
        let installed = GlobalTargetRegistry::init(Arc::clone(&first));
        assert!(Arc::ptr_eq(&installed, &first));

        let second = Arc::new(TargetRegistry::default());
        let kept = GlobalTargetRegistry::init(second);
        assert!(Arc::ptr_eq(&kept, &first));
        assert!(Arc::ptr_eq(&GlobalTargetRegistry::get(), &first));
        assert_eq!(GlobalTargetRegistry::get().candidates(HookContextKind::System).len(), 4);

        let runtime = PartialRuntime::new(&["svc.C"]);
        let report = GlobalTargetRegistry::get().handle_load(&LoadScope::system(), &runtime);
        assert_eq!(report.bound_count(), 1);
    }
}
