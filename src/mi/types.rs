//! GDB Machine Interface (MI) type definitions.
//!
//! The parse tree (`MiValue`, `MiResult`, `MiRecord`) and the
//! backend-agnostic domain structures handed to presentation code.

use indexmap::IndexMap;
use serde::Serialize;

/// Ordered dictionary backing an MI tuple value.
///
/// MI tuples carry named fields; insertion order follows wire order so
/// parsed output is deterministic.
pub type MiDict = IndexMap<String, MiValue>;

/// One MI value: a quoted string, a `{...}` tuple, or a `[...]` list.
///
/// String payloads are always stored as decoded text, even when they look
/// numeric. Interpreting `"42"` as a number is a conversion concern, not a
/// parsing one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MiValue {
    String(String),
    Dictionary(MiDict),
    List(Vec<MiValue>),
}

impl MiValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MiValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&MiDict> {
        match self {
            MiValue::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[MiValue]> {
        match self {
            MiValue::List(l) => Some(l),
            _ => None,
        }
    }
}

/// A named field (`variable=value`) attached to a record or nested in a
/// tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MiResult {
    pub variable: String,
    pub value: MiValue,
}

/// Classification of a record without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Result,
    ExecAsync,
    StatusAsync,
    NotifyAsync,
    ConsoleStream,
    TargetStream,
    LogStream,
}

/// One fully parsed MI output line.
///
/// Result and async records carry a class name and `variable=value` fields;
/// stream records carry decoded output text. The `token` is the numeric
/// prefix echoing the command that produced the record, when present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MiRecord {
    Result {
        token: Option<u64>,
        class: String,
        results: Vec<MiResult>,
    },
    ExecAsync {
        token: Option<u64>,
        class: String,
        results: Vec<MiResult>,
    },
    StatusAsync {
        token: Option<u64>,
        class: String,
        results: Vec<MiResult>,
    },
    NotifyAsync {
        token: Option<u64>,
        class: String,
        results: Vec<MiResult>,
    },
    Console(String),
    Target(String),
    Log(String),
}

impl MiRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            MiRecord::Result { .. } => RecordKind::Result,
            MiRecord::ExecAsync { .. } => RecordKind::ExecAsync,
            MiRecord::StatusAsync { .. } => RecordKind::StatusAsync,
            MiRecord::NotifyAsync { .. } => RecordKind::NotifyAsync,
            MiRecord::Console(_) => RecordKind::ConsoleStream,
            MiRecord::Target(_) => RecordKind::TargetStream,
            MiRecord::Log(_) => RecordKind::LogStream,
        }
    }

    /// Class name for result/async records, `None` for stream records.
    pub fn class(&self) -> Option<&str> {
        match self {
            MiRecord::Result { class, .. }
            | MiRecord::ExecAsync { class, .. }
            | MiRecord::StatusAsync { class, .. }
            | MiRecord::NotifyAsync { class, .. } => Some(class),
            _ => None,
        }
    }

    /// Decoded output text for stream records, `None` otherwise.
    pub fn output(&self) -> Option<&str> {
        match self {
            MiRecord::Console(s) | MiRecord::Target(s) | MiRecord::Log(s) => Some(s),
            _ => None,
        }
    }

    /// The record's fields; empty for stream records.
    pub fn results(&self) -> &[MiResult] {
        match self {
            MiRecord::Result { results, .. }
            | MiRecord::ExecAsync { results, .. }
            | MiRecord::StatusAsync { results, .. }
            | MiRecord::NotifyAsync { results, .. } => results,
            _ => &[],
        }
    }

    pub fn token(&self) -> Option<u64> {
        match self {
            MiRecord::Result { token, .. }
            | MiRecord::ExecAsync { token, .. }
            | MiRecord::StatusAsync { token, .. }
            | MiRecord::NotifyAsync { token, .. } => *token,
            _ => None,
        }
    }
}

/// Why the target stopped, from the `reason` field of a `*stopped` record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    BreakpointHit,
    WatchpointTrigger,
    ReadWatchpointTrigger,
    AccessWatchpointTrigger,
    FunctionFinished,
    LocationReached,
    WatchpointScope,
    EndSteppingRange,
    ExitedSignalled,
    Exited,
    ExitedNormally,
    SignalReceived,
    SolibEvent,
    Fork,
    Vfork,
    SyscallEntry,
    SyscallReturn,
    Unknown(String),
}

impl From<&str> for StopReason {
    fn from(s: &str) -> Self {
        match s {
            "breakpoint-hit" => StopReason::BreakpointHit,
            "watchpoint-trigger" => StopReason::WatchpointTrigger,
            "read-watchpoint-trigger" => StopReason::ReadWatchpointTrigger,
            "access-watchpoint-trigger" => StopReason::AccessWatchpointTrigger,
            "function-finished" => StopReason::FunctionFinished,
            "location-reached" => StopReason::LocationReached,
            "watchpoint-scope" => StopReason::WatchpointScope,
            "end-stepping-range" => StopReason::EndSteppingRange,
            "exited-signalled" => StopReason::ExitedSignalled,
            "exited" => StopReason::Exited,
            "exited-normally" => StopReason::ExitedNormally,
            "signal-received" => StopReason::SignalReceived,
            "solib-event" => StopReason::SolibEvent,
            "fork" => StopReason::Fork,
            "vfork" => StopReason::Vfork,
            "syscall-entry" => StopReason::SyscallEntry,
            "syscall-return" => StopReason::SyscallReturn,
            _ => StopReason::Unknown(s.to_string()),
        }
    }
}

/// A stack-frame argument.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

/// A local variable: type, name, and rendered value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeNameValue {
    pub variable_type: String,
    pub name: String,
    pub value: String,
}

/// One stack frame. Frame 0 is the innermost frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameData {
    pub level: u64,
    pub address: String,
    pub function: String,
    pub filename: String,
    pub line_number: u64,
    /// Empty until filled in by merging a `stack-args` list.
    pub arguments: Vec<NameValue>,
}

/// Target stopped at a breakpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoppedAtBreakpointData {
    pub breakpoint_number: String,
    pub thread_id: String,
    pub frame: FrameData,
}

/// Target stopped after a step or next.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoppedAfterSteppingData {
    pub thread_id: String,
    pub frame: FrameData,
}

/// A full call stack, innermost frame first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievedStackData {
    pub frames: Vec<FrameData>,
}

/// Locals in the current frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievedLocalsData {
    pub locals: Vec<TypeNameValue>,
}

/// A shared library was loaded into the target.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LibraryLoadedData {
    pub library_id: String,
    pub host_path: String,
    pub target_path: String,
    pub symbols_loaded: bool,
}

/// Response to creating a watch variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WatchCreatedData {
    pub variable_id: String,
    pub has_children: bool,
    pub value: String,
    pub variable_type: String,
    pub has_more: bool,
}

/// One entry of a watch-update change list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WatchUpdate {
    pub name: String,
    pub value: String,
    pub in_scope: bool,
    pub type_changed: bool,
}

/// Watches whose values changed since the last update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WatchesUpdatedData {
    pub watches: Vec<WatchUpdate>,
}

/// One child of an expanded watch variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WatchChild {
    pub variable_id: String,
    pub expression: String,
    pub child_count: u64,
    pub value: String,
    pub variable_type: String,
}

/// Children of an expanded watch variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WatchesChildListData {
    pub children: Vec<WatchChild>,
    pub has_more: bool,
}
