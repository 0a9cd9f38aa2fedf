use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::error::{InterceptError, Result};
use crate::intent::{Request, keys};

use super::classifier::RequestClassifier;
use super::config::TargetRole;
use super::rewriter::RequestRewriter;
use super::sanitizer::{Sanitized, sanitize};
use super::types::{ArgList, CallArg, FieldAccessor, InterceptedCall, MethodHook};

/// 单次分发的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Untouched,
    RewroteArgument { slot: usize },
    RewroteField { field: String },
    CanceledResult,
}

/// 分发器：持有识别器与改写器，为每个目标生成 Hook 回调
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    classifier: Arc<RequestClassifier>,
    rewriter: Arc<RequestRewriter>,
}

impl Default for HookDispatcher {
    fn default() -> Self {
        Self::new(RequestClassifier::default(), RequestRewriter::default())
    }
}

impl HookDispatcher {
    pub fn new(classifier: RequestClassifier, rewriter: RequestRewriter) -> Self {
        Self {
            classifier: Arc::new(classifier),
            rewriter: Arc::new(rewriter),
        }
    }

    pub fn classifier(&self) -> &RequestClassifier {
        &self.classifier
    }

    pub fn rewriter(&self) -> &RequestRewriter {
        &self.rewriter
    }

    pub fn hook_for<T: Into<String>>(&self, label: T, role: TargetRole) -> DispatchHook {
        DispatchHook {
            label: label.into(),
            role,
            dispatcher: self.clone(),
        }
    }

    /// 识别命中时返回改写后的新请求
    fn intercept(&self, label: &str, request: &Request) -> Option<Request> {
        let rule = self.classifier.matching_rule(request)?;
        tracing::info!(
            hook = %label,
            action = ?request.action(),
            component = ?request.component_class(),
            rule = ?rule,
            "photo picker detected"
        );
        Some(self.rewriter.rewrite(request))
    }

    /// 按顺序扫描参数，只改写第一个命中的请求
    pub fn rewrite_arguments(&self, label: &str, args: &mut ArgList) -> Result<DispatchOutcome> {
        let hit = args.iter().enumerate().find_map(|(slot, arg)| {
            arg.as_request()
                .and_then(|request| self.intercept(label, request))
                .map(|rewritten| (slot, rewritten))
        });

        match hit {
            Some((slot, rewritten)) => {
                args.replace(slot, CallArg::Request(rewritten))?;
                Ok(DispatchOutcome::RewroteArgument { slot })
            }
            None => Ok(DispatchOutcome::Untouched),
        }
    }

    pub fn rewrite_field(
        &self,
        label: &str,
        receiver: &mut dyn FieldAccessor,
        field: &str,
    ) -> Result<DispatchOutcome> {
        let rewritten = match receiver.read_field(field)? {
            CallArg::Request(request) => self.intercept(label, &request),
            CallArg::Null => None,
            other => {
                return Err(InterceptError::shape(format!(
                    "field `{field}` holds {}, expected {}",
                    other.type_name(),
                    keys::REQUEST_CLASS
                )));
            }
        };

        match rewritten {
            Some(request) => {
                receiver.write_field(field, CallArg::Request(request))?;
                Ok(DispatchOutcome::RewroteField {
                    field: field.to_string(),
                })
            }
            None => Ok(DispatchOutcome::Untouched),
        }
    }

    pub fn sanitize_result(
        &self,
        label: &str,
        args: &mut ArgList,
        code_slot: usize,
        payload_slot: usize,
    ) -> Result<DispatchOutcome> {
        let mut code = args
            .get(code_slot)
            .and_then(CallArg::as_int)
            .ok_or_else(|| InterceptError::shape(format!("no int result code at slot {code_slot}")))?;
        if code != keys::RESULT_OK {
            return Ok(DispatchOutcome::Untouched);
        }

        let mut payload = match args.get(payload_slot) {
            Some(CallArg::Request(request)) => Some(request.clone()),
            Some(CallArg::Null) => None,
            Some(other) => {
                return Err(InterceptError::shape(format!(
                    "payload slot {payload_slot} holds {}",
                    other.type_name()
                )));
            }
            None => {
                return Err(InterceptError::shape(format!(
                    "payload slot {payload_slot} missing"
                )));
            }
        };

        match sanitize(&mut code, &mut payload) {
            Sanitized::Unchanged => Ok(DispatchOutcome::Untouched),
            Sanitized::Canceled => {
                args.replace(code_slot, CallArg::Int(code))?;
                args.replace(payload_slot, CallArg::Null)?;
                tracing::info!(hook = %label, "empty result detected, reported as canceled");
                Ok(DispatchOutcome::CanceledResult)
            }
        }
    }
}

/// 挂在单个目标上的回调
///
/// 任何失败都只记录日志，调用保持原样继续。
#[derive(Debug, Clone)]
pub struct DispatchHook {
    label: String,
    role: TargetRole,
    dispatcher: HookDispatcher,
}

impl DispatchHook {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn role(&self) -> &TargetRole {
        &self.role
    }

    fn guarded<F>(&self, method: &str, f: F) -> Option<DispatchOutcome>
    where
        F: FnOnce() -> Result<DispatchOutcome>,
    {
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(outcome)) => Some(outcome),
            Ok(Err(err)) => {
                tracing::warn!(
                    hook = %self.label,
                    method = %method,
                    error = %err,
                    "interception skipped, call left unmodified"
                );
                None
            }
            Err(_) => {
                tracing::error!(
                    hook = %self.label,
                    method = %method,
                    "interception panicked, call left unmodified"
                );
                None
            }
        }
    }

    pub fn run_before(&self, call: &mut InterceptedCall<'_>) -> Option<DispatchOutcome> {
        let label = self.label.as_str();
        let dispatcher = &self.dispatcher;
        let method = call.method;
        match &self.role {
            TargetRole::Request => {
                let args = &mut *call.args;
                self.guarded(method, || dispatcher.rewrite_arguments(label, args))
            }
            TargetRole::RequestField { field } => {
                let receiver = call.receiver.as_deref_mut();
                self.guarded(method, || match receiver {
                    Some(receiver) => dispatcher.rewrite_field(label, receiver, field),
                    None => Err(InterceptError::field(field.as_str(), "call has no receiver")),
                })
            }
            TargetRole::Result { .. } => None,
        }
    }

    pub fn run_after(&self, call: &mut InterceptedCall<'_>) -> Option<DispatchOutcome> {
        let TargetRole::Result {
            code_slot,
            payload_slot,
        } = self.role
        else {
            return None;
        };
        let label = self.label.as_str();
        let dispatcher = &self.dispatcher;
        let args = &mut *call.args;
        self.guarded(call.method, || {
            dispatcher.sanitize_result(label, args, code_slot, payload_slot)
        })
    }
}

impl MethodHook for DispatchHook {
    fn before(&self, call: &mut InterceptedCall<'_>) {
        self.run_before(call);
    }

    fn after(&self, call: &mut InterceptedCall<'_>) {
        self.run_after(call);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::ComponentName;

    struct PanickingReceiver;

    impl FieldAccessor for PanickingReceiver {
        fn read_field(&self, _path: &str) -> Result<CallArg> {
            panic!("reflection blew up");
        }

        fn write_field(&mut self, _path: &str, _value: CallArg) -> Result<()> {
            Ok(())
        }
    }

    struct FixedReceiver(CallArg);

    impl FieldAccessor for FixedReceiver {
        fn read_field(&self, _path: &str) -> Result<CallArg> {
            Ok(self.0.clone())
        }

        fn write_field(&mut self, _path: &str, value: CallArg) -> Result<()> {
            self.0 = value;
            Ok(())
        }
    }

    fn picker() -> Request {
        Request::new(keys::ACTION_PICK_IMAGES)
    }

    #[test]
    fn test_only_first_matching_request_rewritten() {
        let dispatcher = HookDispatcher::default();
        let view = Request::new("android.intent.action.VIEW");
        let mut args = ArgList::new(vec![
            CallArg::Request(view.clone()),
            CallArg::Request(picker()),
            CallArg::Request(picker()),
        ]);

        let outcome = dispatcher.rewrite_arguments("test", &mut args).unwrap();

        assert_eq!(outcome, DispatchOutcome::RewroteArgument { slot: 1 });
        assert_eq!(args.get(0), Some(&CallArg::Request(view)));
        assert_eq!(
            args.get(1).and_then(CallArg::as_request).and_then(Request::action),
            Some(keys::ACTION_GET_CONTENT)
        );
        assert_eq!(args.get(2), Some(&CallArg::Request(picker())));
    }

    #[test]
    fn test_null_and_foreign_arguments_skipped() {
        let dispatcher = HookDispatcher::default();
        let mut args = ArgList::new(vec![
            CallArg::Null,
            CallArg::Object("android.os.Bundle".to_string()),
            CallArg::Long(9),
        ]);
        let before = args.clone();

        let outcome = dispatcher.rewrite_arguments("test", &mut args).unwrap();
        assert_eq!(outcome, DispatchOutcome::Untouched);
        assert_eq!(args, before);
    }

    #[test]
    fn test_field_rewrite_and_shape_mismatch() {
        let dispatcher = HookDispatcher::default();

        let component = ComponentName::new("com.example", "com.example.MediaPickerActivity");
        let request = Request::default().with_component(component);
        let mut receiver = FixedReceiver(CallArg::Request(request));
        let outcome = dispatcher
            .rewrite_field("test", &mut receiver, "mRequest.intent")
            .unwrap();
        assert!(matches!(outcome, DispatchOutcome::RewroteField { .. }));
        assert_eq!(
            receiver.0.as_request().and_then(Request::action),
            Some(keys::ACTION_GET_CONTENT)
        );

        let mut wrong = FixedReceiver(CallArg::Int(3));
        let err = dispatcher
            .rewrite_field("test", &mut wrong, "mRequest.intent")
            .unwrap_err();
        assert!(matches!(err, InterceptError::ShapeMismatch(_)));
        assert_eq!(wrong.0, CallArg::Int(3));
    }

    #[test]
    fn test_hook_contains_panics() {
        let hook = HookDispatcher::default().hook_for(
            "System:test",
            TargetRole::RequestField {
                field: "mRequest.intent".to_string(),
            },
        );
        let mut args = ArgList::default();
        let mut receiver = PanickingReceiver;
        let mut call =
            InterceptedCall::new("svc", "execute", &mut args).with_receiver(&mut receiver);

        assert_eq!(hook.run_before(&mut call), None);
    }

    #[test]
    fn test_field_hook_without_receiver_is_skipped() {
        let hook = HookDispatcher::default().hook_for(
            "System:test",
            TargetRole::RequestField {
                field: "mRequest.intent".to_string(),
            },
        );
        let mut args = ArgList::new(vec![CallArg::Request(picker())]);
        let mut call = InterceptedCall::new("svc", "execute", &mut args);

        assert_eq!(hook.run_before(&mut call), None);
        assert_eq!(args.get(0), Some(&CallArg::Request(picker())));
    }

    #[test]
    fn test_result_hook_ignores_before_phase() {
        let hook = HookDispatcher::default().hook_for(
            "App:test",
            TargetRole::Result {
                code_slot: 1,
                payload_slot: 2,
            },
        );
        let mut args = ArgList::new(vec![
            CallArg::Int(1),
            CallArg::Int(keys::RESULT_OK),
            CallArg::Request(Request::default()),
        ]);

        let mut call = InterceptedCall::new("android.app.Activity", "onActivityResult", &mut args);
        assert_eq!(hook.run_before(&mut call), None);
        assert_eq!(hook.run_after(&mut call), Some(DispatchOutcome::CanceledResult));
        assert_eq!(args.get(2), Some(&CallArg::Null));
    }
}
