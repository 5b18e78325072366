//! Parser for the GDB Machine Interface (MI) text protocol.
//!
//! Turns the line-oriented output of a `gdb --interpreter=mi2` backend into
//! structured records, and projects specific records onto backend-agnostic
//! data for presentation code (stacks, locals, breakpoint stops, watches,
//! library loads).
//!
//! The crate is a pure parsing core: it neither spawns processes nor reads
//! pipes. A collaborator feeds it text it has already read from the backend
//! and consumes the typed structures it produces.
//!
//! ```
//! use gdb_mi_core::{MiReader, RecordKind};
//!
//! let reader = MiReader::new();
//! let output = reader.parse_output(
//!     "=thread-group-added,id=\"i1\"\n~\"GNU gdb (GDB) 7.5\\n\"\n(gdb)\n",
//! );
//! assert_eq!(output.records.len(), 2);
//! assert_eq!(output.records[0].kind(), RecordKind::NotifyAsync);
//! assert_eq!(output.records[1].output(), Some("GNU gdb (GDB) 7.5\n"));
//! ```

pub mod mi;

pub use mi::*;
