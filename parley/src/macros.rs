/// Creates a single chat [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use parley::{Role, parley_msg};
///
/// let message = parley_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.content, "Done.");
///
/// let result = parley_msg!(tool("call_1", "get_weather") => "{\"temp_c\":21}");
/// assert_eq!(result.tool_call_id.as_deref(), Some("call_1"));
/// ```
#[macro_export]
macro_rules! parley_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::System, $content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::User, $content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::Assistant, $content)
    };
    (tool($call_id:expr, $name:expr) => $content:expr $(,)?) => {
        $crate::Message::tool_result($call_id, $name, $content)
    };
    (tool => $content:expr $(,)?) => {
        compile_error!("tool messages need a call id and name: tool(\"id\", \"name\") => ...");
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, assistant, or tool");
    };
}

/// Creates a `Vec<Message>` from role/content pairs, usable as exchange history.
///
/// ```rust
/// use parley::{Role, parley_messages};
///
/// let history = parley_messages![
///     user => "Is it raining in Warsaw?",
///     assistant => "No, it is sunny.",
/// ];
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history[0].role, Role::User);
/// assert_eq!(history[1].role, Role::Assistant);
/// ```
#[macro_export]
macro_rules! parley_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::parley_msg!($role => $content)),+]
    };
}

/// Creates an [`ExchangeRequest`](crate::ExchangeRequest) with selector shorthand support.
///
/// ```rust
/// use parley::parley_request;
///
/// let request = parley_request!(ollama, "weather in Warsaw?", "Answer briefly.");
/// assert_eq!(request.selector.as_deref(), Some("ollama"));
/// assert_eq!(request.system_prompt.as_deref(), Some("Answer briefly."));
/// ```
#[macro_export]
macro_rules! parley_request {
    (openai, $input:expr $(,)?) => {
        $crate::ExchangeRequest::new($input).with_selector("openai")
    };
    (cloud, $input:expr $(,)?) => {
        $crate::ExchangeRequest::new($input).with_selector("openai")
    };
    (ollama, $input:expr $(,)?) => {
        $crate::ExchangeRequest::new($input).with_selector("ollama")
    };
    (self_hosted, $input:expr $(,)?) => {
        $crate::ExchangeRequest::new($input).with_selector("ollama")
    };
    (local, $input:expr $(,)?) => {
        $crate::ExchangeRequest::new($input).with_selector("local")
    };
    ($selector:expr, $input:expr $(,)?) => {
        $crate::ExchangeRequest::new($input).with_selector($selector)
    };
    (openai, $input:expr, $system_prompt:expr $(,)?) => {
        $crate::ExchangeRequest::new($input)
            .with_selector("openai")
            .with_system_prompt($system_prompt)
    };
    (ollama, $input:expr, $system_prompt:expr $(,)?) => {
        $crate::ExchangeRequest::new($input)
            .with_selector("ollama")
            .with_system_prompt($system_prompt)
    };
    (local, $input:expr, $system_prompt:expr $(,)?) => {
        $crate::ExchangeRequest::new($input)
            .with_selector("local")
            .with_system_prompt($system_prompt)
    };
    ($selector:expr, $input:expr, $system_prompt:expr $(,)?) => {
        $crate::ExchangeRequest::new($input)
            .with_selector($selector)
            .with_system_prompt($system_prompt)
    };
}
