pub mod actions;
pub mod client;
pub mod envelope;
pub mod invalidation;
pub mod logs;
pub mod protocol;
pub mod provider;

pub use actions::{ActionDispatcher, ActionOutcome, AlwaysConfirm, Confirm, ConfirmPrompt};
pub use client::ConsoleClient;
pub use envelope::{
    normalize, normalize_custom, normalize_list, normalize_single, ListResponse, Normalized,
    OperationKind, SingleResponse,
};
pub use invalidation::{CacheKey, Invalidation, InvalidationBus, QueryCache};
pub use logs::{LogPanelState, LogService, LogViewer};
pub use protocol::{protocol_for, ResourceProtocol, SideAction, UpdateVerb};
pub use provider::{CustomRequest, DataProvider, DataProviderExt, RequestTarget, RestDataProvider};
