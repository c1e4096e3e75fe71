//! Scripted host for unit and integration tests
//!
//! Responses are registered per [`Matcher`]. The first matching rule wins;
//! a rule with several queued responses hands them out in order and keeps
//! returning the last one. Unmatched calls get the default response
//! (empty successful output).

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::trace;

use sonic_mgmt_common::{Host, MgmtResult, ModuleInvocation, ModuleResult};

/// Selects which invocations a scripted response applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Any call of this module
    Module(String),
    /// `command`/`shell` calls whose command line contains the text
    CommandContains(String),
    /// Calls of `module` whose serialized arguments contain the text
    ArgsContain {
        /// Module name
        module: String,
        /// Text searched in the JSON-encoded arguments
        needle: String,
    },
}

impl Matcher {
    fn matches(&self, invocation: &ModuleInvocation) -> bool {
        match self {
            Matcher::Module(module) => invocation.module == *module,
            Matcher::CommandContains(needle) => {
                matches!(invocation.module.as_str(), "command" | "shell")
                    && invocation
                        .free_form()
                        .is_some_and(|cmd| cmd.contains(needle.as_str()))
            }
            Matcher::ArgsContain { module, needle } => {
                invocation.module == *module && args_text(&invocation.args).contains(needle.as_str())
            }
        }
    }
}

fn args_text(args: &Value) -> String {
    match args {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

struct Rule {
    matcher: Matcher,
    responses: VecDeque<ModuleResult>,
}

/// Host that answers from a script and records every call
pub struct MockHost {
    hostname: String,
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<ModuleInvocation>>,
    default_response: ModuleResult,
}

impl MockHost {
    /// Create a mock host with the given inventory name
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            rules: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            default_response: ModuleResult::from_stdout(""),
        }
    }

    /// Replace the response for unmatched calls
    pub fn with_default(mut self, response: ModuleResult) -> Self {
        self.default_response = response;
        self
    }

    /// Queue a response for a matcher
    pub fn respond(&self, matcher: Matcher, response: ModuleResult) -> &Self {
        let mut rules = self.rules.lock();
        match rules.iter_mut().find(|r| r.matcher == matcher) {
            Some(rule) => rule.responses.push_back(response),
            None => rules.push(Rule {
                matcher,
                responses: VecDeque::from([response]),
            }),
        }
        self
    }

    /// Queue a response for any call of `module`
    pub fn on_module(&self, module: &str, response: ModuleResult) -> &Self {
        self.respond(Matcher::Module(module.to_string()), response)
    }

    /// Queue a response for `command`/`shell` calls containing `needle`
    pub fn on_command(&self, needle: &str, response: ModuleResult) -> &Self {
        self.respond(Matcher::CommandContains(needle.to_string()), response)
    }

    /// Queue a response for `module` calls whose arguments contain `needle`
    pub fn on_args(&self, module: &str, needle: &str, response: ModuleResult) -> &Self {
        self.respond(
            Matcher::ArgsContain {
                module: module.to_string(),
                needle: needle.to_string(),
            },
            response,
        )
    }

    /// All recorded invocations, in call order
    pub fn calls(&self) -> Vec<ModuleInvocation> {
        self.calls.lock().clone()
    }

    /// Recorded invocations of one module
    pub fn calls_of(&self, module: &str) -> Vec<ModuleInvocation> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.module == module)
            .cloned()
            .collect()
    }

    /// Free-form command lines of recorded `command`/`shell` calls
    pub fn commands(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c.module.as_str(), "command" | "shell"))
            .filter_map(|c| c.free_form().map(str::to_string))
            .collect()
    }

    /// Forget recorded calls, keeping the script
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl Host for MockHost {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    async fn run(&self, invocation: ModuleInvocation) -> MgmtResult<ModuleResult> {
        trace!(host = %self.hostname, module = %invocation.module, "Mock module call");
        let response = {
            let mut rules = self.rules.lock();
            rules
                .iter_mut()
                .find(|r| r.matcher.matches(&invocation))
                .and_then(|rule| {
                    if rule.responses.len() > 1 {
                        rule.responses.pop_front()
                    } else {
                        rule.responses.front().cloned()
                    }
                })
                .unwrap_or_else(|| self.default_response.clone())
        };
        self.calls.lock().push(invocation);
        Ok(response)
    }
}
