//! Tool runtime trait and default registry-backed executor.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_timer::Delay;
use futures_util::future::{Either, select};
use pprovider::ToolCall;

use crate::{
    NoopToolRuntimeHooks, ToolError, ToolExecutionContext, ToolExecutionResult, ToolFuture,
    ToolRegistry, ToolRuntimeHooks,
};

/// Upper bound on one tool invocation; the collaborator clients carry tighter limits.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(15);

pub trait ToolRuntime: Send + Sync {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>>;

    fn definitions(&self) -> Vec<pprovider::ToolDefinition>;
}

#[derive(Clone)]
pub struct DefaultToolRuntime {
    registry: Arc<ToolRegistry>,
    hooks: Arc<dyn ToolRuntimeHooks>,
    timeout: Duration,
}

impl DefaultToolRuntime {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            hooks: Arc::new(NoopToolRuntimeHooks),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ToolRuntimeHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn invoke(
        &self,
        tool_call: &ToolCall,
        context: &ToolExecutionContext,
    ) -> Result<ToolExecutionResult, ToolError> {
        let tool = self.registry.get(&tool_call.name).ok_or_else(|| {
            ToolError::not_found(format!("tool '{}' is not registered", tool_call.name))
        })?;

        let invocation = tool.invoke(&tool_call.arguments, context);
        let output = match select(invocation, Delay::new(self.timeout)).await {
            Either::Left((result, _)) => result?,
            Either::Right(_) => {
                return Err(ToolError::timeout(format!(
                    "tool did not finish within {}ms",
                    self.timeout.as_millis()
                )));
            }
        };

        Ok(ToolExecutionResult::from_call(tool_call, output))
    }
}

impl ToolRuntime for DefaultToolRuntime {
    fn execute<'a>(
        &'a self,
        tool_call: ToolCall,
        context: ToolExecutionContext,
    ) -> ToolFuture<'a, Result<ToolExecutionResult, ToolError>> {
        Box::pin(async move {
            self.hooks.on_tool_start(&tool_call, &context);
            let started = Instant::now();

            let result = self
                .invoke(&tool_call, &context)
                .await
                .map_err(|error| error.for_call(&tool_call));

            let elapsed = started.elapsed();
            match &result {
                Ok(_) => tracing::debug!(
                    tool = %tool_call.name,
                    call_id = %tool_call.id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "tool executed"
                ),
                Err(error) => tracing::warn!(
                    tool = %tool_call.name,
                    call_id = %tool_call.id,
                    error = %error,
                    "tool execution failed"
                ),
            }
            self.hooks
                .on_tool_finish(&tool_call, &context, result.as_ref(), elapsed);

            result
        })
    }

    fn definitions(&self) -> Vec<pprovider::ToolDefinition> {
        self.registry.definitions()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pprovider::{ToolCall, ToolDefinition};

    use super::*;
    use crate::{Tool, ToolErrorKind, ToolOutcome};

    fn definition(name: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            description: format!("{name} for tests"),
            input_schema: r#"{"type":"object"}"#.to_string(),
        }
    }

    struct Echo;

    impl Tool for Echo {
        fn definition(&self) -> ToolDefinition {
            definition("echo")
        }

        fn invoke<'a>(
            &'a self,
            args_json: &'a str,
            context: &'a ToolExecutionContext,
        ) -> ToolFuture<'a, Result<String, ToolError>> {
            Box::pin(async move {
                Ok(format!(
                    "session={} iteration={} args={args_json}",
                    context.session_id, context.iteration
                ))
            })
        }
    }

    struct Broken;

    impl Tool for Broken {
        fn definition(&self) -> ToolDefinition {
            definition("broken")
        }

        fn invoke<'a>(
            &'a self,
            _args_json: &'a str,
            _context: &'a ToolExecutionContext,
        ) -> ToolFuture<'a, Result<String, ToolError>> {
            Box::pin(async { Err(ToolError::execution("tool exploded")) })
        }
    }

    struct Stalled;

    impl Tool for Stalled {
        fn definition(&self) -> ToolDefinition {
            definition("stalled")
        }

        fn invoke<'a>(
            &'a self,
            _args_json: &'a str,
            _context: &'a ToolExecutionContext,
        ) -> ToolFuture<'a, Result<String, ToolError>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok("late".to_string())
            })
        }
    }

    fn runtime() -> DefaultToolRuntime {
        let registry = ToolRegistry::new()
            .with_tool(Echo)
            .with_tool(Broken)
            .with_tool(Stalled);
        DefaultToolRuntime::new(Arc::new(registry))
    }

    #[derive(Default)]
    struct RecordingHooks {
        events: Mutex<Vec<String>>,
    }

    impl ToolRuntimeHooks for RecordingHooks {
        fn on_tool_start(&self, call: &ToolCall, _context: &ToolExecutionContext) {
            self.events
                .lock()
                .expect("events lock")
                .push(format!("start:{}", call.name));
        }

        fn on_tool_finish(
            &self,
            call: &ToolCall,
            _context: &ToolExecutionContext,
            outcome: ToolOutcome<'_>,
            _elapsed: Duration,
        ) {
            let event = match outcome {
                Ok(result) => format!("ok:{}:{}", call.name, result.tool_call_id),
                Err(error) => format!("err:{}:{:?}", call.name, error.kind),
            };
            self.events.lock().expect("events lock").push(event);
        }
    }

    fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[tokio::test]
    async fn output_is_keyed_by_call_id() {
        let result = runtime()
            .execute(
                call("call_1", "echo", "hello"),
                ToolExecutionContext::new("session-1").with_iteration(2),
            )
            .await
            .expect("echo succeeds");

        assert_eq!(result.tool_call_id, "call_1");
        assert_eq!(result.output, "session=session-1 iteration=2 args=hello");
    }

    #[tokio::test]
    async fn unknown_tools_fail_with_call_context() {
        let runtime = DefaultToolRuntime::new(Arc::new(ToolRegistry::new()));

        let error = runtime
            .execute(call("call_2", "missing", "{}"), ToolExecutionContext::new("s"))
            .await
            .expect_err("nothing registered");

        assert_eq!(error.kind, ToolErrorKind::NotFound);
        assert_eq!(error.call, Some(("missing".to_string(), "call_2".to_string())));
        assert_eq!(error.model_feedback(), "Error: tool 'missing' is not registered");
    }

    #[tokio::test]
    async fn hooks_see_each_outcome() {
        let hooks = Arc::new(RecordingHooks::default());
        let runtime = runtime().with_hooks(hooks.clone());

        runtime
            .execute(call("call_1", "echo", "{}"), ToolExecutionContext::new("s"))
            .await
            .expect("echo succeeds");
        let error = runtime
            .execute(call("call_2", "broken", "{}"), ToolExecutionContext::new("s"))
            .await
            .expect_err("broken fails");
        runtime
            .execute(call("call_3", "missing", "{}"), ToolExecutionContext::new("s"))
            .await
            .expect_err("missing fails");

        assert_eq!(error.message, "tool exploded");
        assert_eq!(
            *hooks.events.lock().expect("events lock"),
            vec![
                "start:echo",
                "ok:echo:call_1",
                "start:broken",
                "err:broken:Execution",
                "start:missing",
                "err:missing:NotFound",
            ]
        );
    }

    #[tokio::test]
    async fn slow_tools_time_out() {
        let runtime = runtime().with_timeout(Duration::from_millis(20));

        let error = runtime
            .execute(call("call_3", "stalled", "{}"), ToolExecutionContext::new("s"))
            .await
            .expect_err("times out");

        assert_eq!(error.kind, ToolErrorKind::Timeout);
        assert_eq!(error.message, "tool did not finish within 20ms");
    }

    #[test]
    fn definitions_come_from_the_registry() {
        let names = runtime()
            .definitions()
            .into_iter()
            .map(|definition| definition.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["broken", "echo", "stalled"]);
    }
}
