//! Common `pprovider` imports for downstream crates.

pub use crate::{
    BackendConfig, BackendKind, BackendRequest, BackendTransport, BroadcastReport,
    CancellationToken, Device, DeviceBroadcaster, Frame, FramingMode, HttpDeviceBroadcaster,
    HttpTransport, Message, NoopTransportHooks, ProviderError, ProviderErrorKind, ProviderFuture,
    ProviderSelector, Reply, ReplyAccumulator, ReplyDelta, ReplyStream, Role, SecretString,
    ToolCall, ToolCallFragment, ToolDefinition, TransportHooks, VecReplyStream,
};
pub use pcommon::{BoxFuture, GenerationOptions};
