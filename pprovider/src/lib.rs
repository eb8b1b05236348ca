//! Backend selection, response decoding, and transport for chat-completion
//! backends.
//!
//! ```rust
//! use pprovider::{BackendKind, BackendRequest, Message, ProviderSelector};
//!
//! let selector = ProviderSelector::new();
//! let config = selector.resolve(Some("openai")).expect("openai is supported");
//! let request = BackendRequest::new(config, vec![Message::user("Hello")]).streaming(true);
//!
//! assert_eq!(request.config.kind, BackendKind::OpenAi);
//! assert_eq!(request.model(), "gpt-3.5-turbo");
//! assert!(request.validate().is_ok());
//! ```

pub mod adapters;
mod credentials;
mod error;
pub mod frame;
mod hooks;
mod model;
pub mod prelude;
mod selector;
mod stream;
mod transport;

pub use adapters::ReplyNormalizer;
pub use adapters::broadcast::{
    BroadcastReport, Device, DeviceBroadcaster, DeviceOutcome, HttpDeviceBroadcaster,
};
pub use credentials::SecretString;
pub use error::{ProviderError, ProviderErrorKind};
pub use frame::{Frame, FrameDecoder, FrameStream, FramingMode, decode_document, decode_frames};
pub use hooks::{NoopTransportHooks, TransportHooks};
pub use model::{
    BackendRequest, Message, Reply, ReplyDelta, Role, ToolCall, ToolCallFragment, ToolDefinition,
};
pub use selector::{
    BackendConfig, BackendKind, OLLAMA_BASE_URL, OLLAMA_DEFAULT_MODEL, OPENAI_BASE_URL,
    OPENAI_DEFAULT_MODEL, ProviderSelector,
};
pub use stream::{ReplyAccumulator, ReplyEventStream, ReplyStream, VecReplyStream, collect_reply};
pub use transport::{BackendTransport, HttpTransport, ProviderFuture};

pub use pcommon::GenerationOptions;
pub use tokio_util::sync::CancellationToken;
