//! Event bridge: native handles, message translation, sources, dispatch.

pub mod dispatch;
pub mod message;
pub mod native;
pub mod sources;

pub use dispatch::{dispatch, run, run_nested};
pub use message::{CommandCode, NativeMessage, NotifyCode};
pub use native::{HandleId, HandleKind, HandleTable, TerminalSession};
pub use sources::{Continue, IoCondition, SourceId, SourceRegistry};
