//! Tool runtime trait and default registry-backed executor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_timer::Delay;
use futures_util::future::{Either, select};
use pprovider::{ToolCall, ToolDefinition};

use crate::{
    NoopToolRuntimeHooks, ToolError, ToolErrorKind, ToolExecutionContext, ToolExecutionResult,
    ToolFuture, ToolRegistry, ToolRuntimeHooks,
};

/// Executes tool calls requested by a model. Execution never fails: errors are
/// folded into the result output so the model can see them.
pub trait ToolRuntime: Send + Sync {
    fn definitions(&self) -> Vec<ToolDefinition>;

    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, ToolExecutionResult>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
    timeout: Option<Duration>,
}

impl Default for DefaultToolRuntime {
    fn default() -> Self {
        Self::new(Arc::new(ToolRegistry::new()))
    }
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
            timeout: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Bounds each invocation. A call that runs longer yields a timeout error
    /// result.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        Arc::clone(&self.registry)
    }

    async fn run(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
    ) -> Result<serde_json::Value, ToolError> {
        let invocation =
            self.registry
                .try_invoke(&tool_call.name, &tool_call.arguments, context);

        let Some(timeout) = self.timeout else {
            return invocation.await;
        };

        match select(Box::pin(invocation), Delay::new(timeout)).await {
            Either::Left((output, _)) => output,
            Either::Right(_) => Err(ToolError::timeout(format!(
                "tool '{}' timed out after {}ms",
                tool_call.name,
                timeout.as_millis()
            ))),
        }
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.registry.definitions()
    }

    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, ToolExecutionResult> {
        Box::pin(async move {
            self.hooks.on_execution_start(&tool_call, &context);
            let started = Instant::now();

            match self.run(&tool_call, &context).await {
                Ok(output) => {
                    let result = ToolExecutionResult::from_call(&tool_call, output, false);
                    self.hooks
                        .on_execution_success(&tool_call, &context, &result, started.elapsed());
                    result
                }
                Err(error) => {
                    if error.kind == ToolErrorKind::NotFound {
                        self.hooks.on_unknown_tool(&tool_call, &context);
                    }
                    self.hooks
                        .on_execution_failure(&tool_call, &context, &error, started.elapsed());
                    ToolExecutionResult::from_call(&tool_call, error.to_result_value(), true)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use pprovider::{ToolCall, ToolDefinition};
    use serde_json::json;

    use super::*;
    use crate::{ToolErrorKind, ToolRegistry};

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ToolRuntimeHooks for RecordingHooks {
        fn on_unknown_tool(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("unknown:{}", tool_call.name));
        }

        fn on_execution_start(&self, tool_call: &ToolCall, _context: &ToolExecutionContext) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{}", tool_call.name));
        }

        fn on_execution_success(
            &self,
            tool_call: &ToolCall,
            _context: &ToolExecutionContext,
            _result: &ToolExecutionResult,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("success:{}", tool_call.name));
        }

        fn on_execution_failure(
            &self,
            tool_call: &ToolCall,
            _context: &ToolExecutionContext,
            error: &ToolError,
            _elapsed: Duration,
        ) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("failure:{}:{:?}", tool_call.name, error.kind));
        }
    }

    fn runtime_with(hooks: Arc<RecordingHooks>) -> DefaultToolRuntime {
        let mut registry = ToolRegistry::new();
        registry.register_sync_fn(
            ToolDefinition::new("echo", "Echoes arguments", json!({"type": "object"})),
            |args, context| Ok(json!({"args": args, "exchange": context.exchange_id.as_str()})),
        );
        registry.register_fn(
            ToolDefinition::new("slow", "Never finishes in time", json!({"type": "object"})),
            |_args, _context| async move {
                Delay::new(Duration::from_secs(5)).await;
                Ok(json!("late"))
            },
        );

        DefaultToolRuntime::new(Arc::new(registry)).with_hooks(hooks)
    }

    #[tokio::test]
    async fn runtime_executes_registered_tool() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = runtime_with(Arc::clone(&hooks));

        let result = runtime
            .execute(
                ToolCall::new("call_1", "echo", "{\"text\":\"hello\"}"),
                ToolExecutionContext::new("exchange-1"),
            )
            .await;

        assert_eq!(result.tool_call_id, "call_1");
        assert!(!result.is_error);
        assert_eq!(
            result.output,
            json!({"args": {"text": "hello"}, "exchange": "exchange-1"})
        );
        assert_eq!(
            *hooks.events.lock().expect("events lock"),
            vec!["start:echo", "success:echo"]
        );
    }

    #[tokio::test]
    async fn unknown_tool_becomes_an_error_result() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = runtime_with(Arc::clone(&hooks));

        let result = runtime
            .execute(
                ToolCall::new("call_2", "missing", "{}"),
                ToolExecutionContext::new("exchange-2"),
            )
            .await;

        assert!(result.is_error);
        assert_eq!(result.output, json!({"error": "tool not implemented"}));
        assert_eq!(
            *hooks.events.lock().expect("events lock"),
            vec![
                "start:missing".to_string(),
                "unknown:missing".to_string(),
                format!("failure:missing:{:?}", ToolErrorKind::NotFound),
            ]
        );
    }

    #[tokio::test]
    async fn slow_tools_time_out() {
        let runtime = runtime_with(Arc::new(RecordingHooks::default()))
            .with_timeout(Duration::from_millis(20));

        let result = runtime
            .execute(
                ToolCall::new("call_3", "slow", "{}"),
                ToolExecutionContext::new("exchange-3"),
            )
            .await;

        assert!(result.is_error);
        assert_eq!(
            result.output,
            json!({"error": "tool 'slow' timed out after 20ms"})
        );
    }

    #[test]
    fn definitions_come_from_the_registry() {
        let runtime = runtime_with(Arc::new(RecordingHooks::default()));
        let names = runtime
            .definitions()
            .into_iter()
            .map(|definition| definition.name)
            .collect::<Vec<_>>();

        assert_eq!(names, vec!["echo", "slow"]);
    }
}
