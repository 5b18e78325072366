//! Conversion from parsed MI records to backend-agnostic structures.
//!
//! The boring but somewhat verbose code that projects a record's results
//! onto the typed data handed to presentation code. All lookups are total:
//! a missing field yields a default, never a failure. The only failing
//! operation is the stack/argument merge, where the two inputs must
//! correspond frame for frame.

use crate::mi::error::MiError;
use crate::mi::types::{
    FrameData, LibraryLoadedData, MiDict, MiResult, MiValue, NameValue, RetrievedLocalsData,
    RetrievedStackData, StopReason, StoppedAfterSteppingData, StoppedAtBreakpointData,
    TypeNameValue, WatchChild, WatchCreatedData, WatchUpdate, WatchesChildListData,
    WatchesUpdatedData,
};

/// String field lookup; empty string when absent or not a string.
pub fn find_string(key: &str, results: &[MiResult]) -> String {
    results
        .iter()
        .find(|r| r.variable == key)
        .and_then(|r| r.value.as_str())
        .unwrap_or_default()
        .to_string()
}

/// Dictionary field lookup.
pub fn find_dictionary<'a>(key: &str, results: &'a [MiResult]) -> Option<&'a MiDict> {
    results
        .iter()
        .find(|r| r.variable == key)
        .and_then(|r| r.value.as_dictionary())
}

/// List field lookup.
pub fn find_list<'a>(key: &str, results: &'a [MiResult]) -> Option<&'a [MiValue]> {
    results
        .iter()
        .find(|r| r.variable == key)
        .and_then(|r| r.value.as_list())
}

/// String entry of a dictionary; empty string when absent or not a string.
pub fn dict_string(dict: &MiDict, key: &str) -> String {
    dict.get(key)
        .and_then(MiValue::as_str)
        .unwrap_or_default()
        .to_string()
}

/// MI encodes booleans variously as "1", "true", or "y".
fn truthy(s: &str) -> bool {
    matches!(s, "1" | "true" | "y")
}

fn parse_u64(s: &str) -> u64 {
    s.parse().unwrap_or(0)
}

/// The `reason` field of a `*stopped` record.
pub fn stop_reason_from_results(results: &[MiResult]) -> StopReason {
    StopReason::from(find_string("reason", results).as_str())
}

fn frame_from_dict(dict: &MiDict) -> FrameData {
    let fullname = dict_string(dict, "fullname");
    FrameData {
        level: parse_u64(&dict_string(dict, "level")),
        address: dict_string(dict, "addr"),
        function: dict_string(dict, "func"),
        filename: if fullname.is_empty() {
            dict_string(dict, "file")
        } else {
            fullname
        },
        line_number: parse_u64(&dict_string(dict, "line")),
        arguments: Vec::new(),
    }
}

/// From a `*stopped,reason="breakpoint-hit",...` record's results.
pub fn stopped_at_breakpoint_from_results(results: &[MiResult]) -> StoppedAtBreakpointData {
    StoppedAtBreakpointData {
        breakpoint_number: find_string("bkptno", results),
        thread_id: find_string("thread-id", results),
        frame: find_dictionary("frame", results)
            .map(frame_from_dict)
            .unwrap_or_default(),
    }
}

/// From a `*stopped,reason="end-stepping-range",...` record's results.
pub fn stopped_after_stepping_from_results(results: &[MiResult]) -> StoppedAfterSteppingData {
    StoppedAfterSteppingData {
        thread_id: find_string("thread-id", results),
        frame: find_dictionary("frame", results)
            .map(frame_from_dict)
            .unwrap_or_default(),
    }
}

/// Unwrap a list element that arrives as a one-entry `key={...}` dictionary,
/// accepting a bare dictionary too.
fn unwrap_keyed_dict<'a>(item: &'a MiValue, key: &str) -> Option<&'a MiDict> {
    let dict = item.as_dictionary()?;
    match dict.get(key).and_then(MiValue::as_dictionary) {
        Some(inner) => Some(inner),
        None => Some(dict),
    }
}

/// From the `stack=[frame={...},...]` list of a `-stack-list-frames`
/// response. List order is frame depth order, innermost first.
pub fn stack_from_list(value: &MiValue) -> RetrievedStackData {
    let mut frames = Vec::new();
    if let Some(items) = value.as_list() {
        for item in items {
            if let Some(dict) = unwrap_keyed_dict(item, "frame") {
                frames.push(frame_from_dict(dict));
            }
        }
    }
    RetrievedStackData { frames }
}

/// Fill per-frame argument lists into an already-converted stack from the
/// `stack-args=[frame={level=...,args=[...]},...]` list of a
/// `-stack-list-arguments` response. Frames are matched by position; a
/// count mismatch means the two responses do not describe the same stack.
pub fn merge_arguments_into_stack_frames(
    stack: &RetrievedStackData,
    value: &MiValue,
) -> Result<RetrievedStackData, MiError> {
    let items = value.as_list().unwrap_or(&[]);
    if items.len() != stack.frames.len() {
        return Err(MiError::MalformedRecord {
            reason: format!(
                "stack has {} frames but argument list has {}",
                stack.frames.len(),
                items.len()
            ),
            line: String::new(),
        });
    }
    let mut merged = stack.clone();
    for (frame, item) in merged.frames.iter_mut().zip(items) {
        if let Some(dict) = unwrap_keyed_dict(item, "frame") {
            if let Some(args) = dict.get("args").and_then(MiValue::as_list) {
                frame.arguments = args
                    .iter()
                    .filter_map(MiValue::as_dictionary)
                    .map(|arg| NameValue {
                        name: dict_string(arg, "name"),
                        value: dict_string(arg, "value"),
                    })
                    .collect();
            }
        }
    }
    Ok(merged)
}

/// From the `variables=[{name=...,type=...,value=...},...]` list of a
/// `-stack-list-variables` response.
pub fn locals_from_list(value: &MiValue) -> RetrievedLocalsData {
    let mut locals = Vec::new();
    if let Some(items) = value.as_list() {
        for item in items {
            if let Some(dict) = item.as_dictionary() {
                locals.push(TypeNameValue {
                    variable_type: dict_string(dict, "type"),
                    name: dict_string(dict, "name"),
                    value: dict_string(dict, "value"),
                });
            }
        }
    }
    RetrievedLocalsData { locals }
}

/// From an `=library-loaded,...` record's results.
pub fn library_loaded_from_results(results: &[MiResult]) -> LibraryLoadedData {
    LibraryLoadedData {
        library_id: find_string("id", results),
        host_path: find_string("host-name", results),
        target_path: find_string("target-name", results),
        symbols_loaded: truthy(&find_string("symbols-loaded", results)),
    }
}

/// From a `-var-create` response's results.
pub fn watch_created_from_results(results: &[MiResult]) -> WatchCreatedData {
    WatchCreatedData {
        variable_id: find_string("name", results),
        has_children: parse_u64(&find_string("numchild", results)) > 0,
        value: find_string("value", results),
        variable_type: find_string("type", results),
        has_more: truthy(&find_string("has_more", results)),
    }
}

/// From the `changelist=[...]` list of a `-var-update` response.
pub fn watches_updated_from_changes_list(value: &MiValue) -> WatchesUpdatedData {
    let mut watches = Vec::new();
    if let Some(items) = value.as_list() {
        for item in items {
            if let Some(dict) = item.as_dictionary() {
                watches.push(WatchUpdate {
                    name: dict_string(dict, "name"),
                    value: dict_string(dict, "value"),
                    in_scope: truthy(&dict_string(dict, "in_scope")),
                    type_changed: truthy(&dict_string(dict, "type_changed")),
                });
            }
        }
    }
    WatchesUpdatedData { watches }
}

/// From a `-var-list-children` response's results.
pub fn watches_child_list_from_results(results: &[MiResult]) -> WatchesChildListData {
    let mut children = Vec::new();
    if let Some(items) = find_list("children", results) {
        for item in items {
            if let Some(dict) = unwrap_keyed_dict(item, "child") {
                children.push(WatchChild {
                    variable_id: dict_string(dict, "name"),
                    expression: dict_string(dict, "exp"),
                    child_count: parse_u64(&dict_string(dict, "numchild")),
                    value: dict_string(dict, "value"),
                    variable_type: dict_string(dict, "type"),
                });
            }
        }
    }
    WatchesChildListData {
        children,
        has_more: truthy(&find_string("has_more", results)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mi::parser::MiParser;
    use pretty_assertions::assert_eq;

    fn results_of(line: &str) -> Vec<MiResult> {
        MiParser::new()
            .parse_record(line)
            .unwrap()
            .results()
            .to_vec()
    }

    fn value_of(line: &str, key: &str) -> MiValue {
        let record = MiParser::new().parse_record(line).unwrap();
        record
            .results()
            .iter()
            .find(|r| r.variable == key)
            .map(|r| r.value.clone())
            .unwrap()
    }

    #[test]
    fn find_primitives_default_on_absence() {
        let results = results_of("^done,a=\"1\",d={x=\"y\"},l=[\"z\"]");
        assert_eq!(find_string("a", &results), "1");
        assert_eq!(find_string("missing", &results), "");
        assert_eq!(find_string("d", &results), "");
        assert!(find_dictionary("d", &results).is_some());
        assert!(find_dictionary("a", &results).is_none());
        assert!(find_dictionary("missing", &results).is_none());
        assert_eq!(find_list("l", &results).map(<[MiValue]>::len), Some(1));
        assert!(find_list("missing", &results).is_none());
    }

    #[test]
    fn stopped_at_breakpoint() {
        let results = results_of(
            "*stopped,reason=\"breakpoint-hit\",disp=\"keep\",bkptno=\"1\",\
             frame={addr=\"0x004013cb\",func=\"main\",args=[],file=\"test.cc\",\
             fullname=\"/src/test.cc\",line=\"12\"},thread-id=\"1\",\
             stopped-threads=\"all\"",
        );
        assert_eq!(stop_reason_from_results(&results), StopReason::BreakpointHit);
        let data = stopped_at_breakpoint_from_results(&results);
        assert_eq!(data.breakpoint_number, "1");
        assert_eq!(data.thread_id, "1");
        assert_eq!(data.frame.function, "main");
        assert_eq!(data.frame.filename, "/src/test.cc");
        assert_eq!(data.frame.line_number, 12);
        assert_eq!(data.frame.address, "0x004013cb");
    }

    #[test]
    fn stopped_after_stepping() {
        let results = results_of(
            "*stopped,reason=\"end-stepping-range\",\
             frame={addr=\"0x004013d3\",func=\"main\",args=[],file=\"test.cc\",line=\"13\"},\
             thread-id=\"1\"",
        );
        assert_eq!(
            stop_reason_from_results(&results),
            StopReason::EndSteppingRange
        );
        let data = stopped_after_stepping_from_results(&results);
        assert_eq!(data.thread_id, "1");
        assert_eq!(data.frame.line_number, 13);
        // No fullname in this record; plain file is used.
        assert_eq!(data.frame.filename, "test.cc");
    }

    #[test]
    fn stopped_with_missing_fields_defaults() {
        let results = results_of("*stopped,reason=\"breakpoint-hit\"");
        let data = stopped_at_breakpoint_from_results(&results);
        assert_eq!(data.breakpoint_number, "");
        assert_eq!(data.frame, FrameData::default());
    }

    #[test]
    fn stack_conversion_preserves_depth_order() {
        let stack = value_of(
            "^done,stack=[\
             frame={level=\"0\",addr=\"0x00000001\",func=\"inner\",file=\"a.cc\",line=\"4\"},\
             frame={level=\"1\",addr=\"0x00000002\",func=\"outer\",file=\"a.cc\",line=\"9\"}]",
            "stack",
        );
        let data = stack_from_list(&stack);
        assert_eq!(data.frames.len(), 2);
        assert_eq!(data.frames[0].level, 0);
        assert_eq!(data.frames[0].function, "inner");
        assert_eq!(data.frames[1].level, 1);
        assert_eq!(data.frames[1].function, "outer");
    }

    #[test]
    fn merge_arguments_fills_frames_by_position() {
        let stack = stack_from_list(&value_of(
            "^done,stack=[\
             frame={level=\"0\",func=\"inner\"},\
             frame={level=\"1\",func=\"outer\"}]",
            "stack",
        ));
        let args = value_of(
            "^done,stack-args=[\
             frame={level=\"0\",args=[{name=\"x\",value=\"1\"},{name=\"y\",value=\"2\"}]},\
             frame={level=\"1\",args=[]}]",
            "stack-args",
        );
        let merged = merge_arguments_into_stack_frames(&stack, &args).unwrap();
        assert_eq!(merged.frames.len(), 2);
        assert_eq!(
            merged.frames[0].arguments,
            [
                NameValue {
                    name: "x".to_string(),
                    value: "1".to_string()
                },
                NameValue {
                    name: "y".to_string(),
                    value: "2".to_string()
                }
            ]
        );
        assert!(merged.frames[1].arguments.is_empty());
        // The input stack is untouched.
        assert!(stack.frames[0].arguments.is_empty());
    }

    #[test]
    fn merge_with_mismatched_frame_count_fails() {
        let stack = stack_from_list(&value_of(
            "^done,stack=[frame={level=\"0\"},frame={level=\"1\"}]",
            "stack",
        ));
        let args = value_of(
            "^done,stack-args=[frame={level=\"0\",args=[]}]",
            "stack-args",
        );
        let err = merge_arguments_into_stack_frames(&stack, &args).unwrap_err();
        assert!(matches!(err, MiError::MalformedRecord { .. }));
    }

    #[test]
    fn locals_conversion() {
        let variables = value_of(
            "^done,variables=[\
             {name=\"argc\",type=\"int\",value=\"1\"},\
             {name=\"argv\",type=\"char **\",value=\"0x7fff5fbff8c0\"}]",
            "variables",
        );
        let data = locals_from_list(&variables);
        assert_eq!(data.locals.len(), 2);
        assert_eq!(
            data.locals[0],
            TypeNameValue {
                variable_type: "int".to_string(),
                name: "argc".to_string(),
                value: "1".to_string()
            }
        );
        assert_eq!(data.locals[1].variable_type, "char **");
    }

    #[test]
    fn library_loaded_conversion() {
        let results = results_of(
            "=library-loaded,id=\"/lib/x86_64/libc.so.6\",\
             target-name=\"/lib/x86_64/libc.so.6\",\
             host-name=\"/lib/x86_64/libc.so.6\",symbols-loaded=\"0\",\
             thread-group=\"i1\"",
        );
        let data = library_loaded_from_results(&results);
        assert_eq!(data.library_id, "/lib/x86_64/libc.so.6");
        assert_eq!(data.host_path, "/lib/x86_64/libc.so.6");
        assert_eq!(data.target_path, "/lib/x86_64/libc.so.6");
        assert!(!data.symbols_loaded);
    }

    #[test]
    fn watch_created_conversion() {
        let results = results_of(
            "^done,name=\"var1\",numchild=\"2\",value=\"{...}\",type=\"Point\",\
             thread-id=\"1\",has_more=\"0\"",
        );
        let data = watch_created_from_results(&results);
        assert_eq!(data.variable_id, "var1");
        assert!(data.has_children);
        assert_eq!(data.value, "{...}");
        assert_eq!(data.variable_type, "Point");
        assert!(!data.has_more);
    }

    #[test]
    fn watches_updated_conversion() {
        let changelist = value_of(
            "^done,changelist=[\
             {name=\"var1\",value=\"4\",in_scope=\"true\",type_changed=\"false\"},\
             {name=\"var2\",in_scope=\"false\",type_changed=\"false\"}]",
            "changelist",
        );
        let data = watches_updated_from_changes_list(&changelist);
        assert_eq!(data.watches.len(), 2);
        assert_eq!(data.watches[0].name, "var1");
        assert_eq!(data.watches[0].value, "4");
        assert!(data.watches[0].in_scope);
        assert!(!data.watches[0].type_changed);
        assert!(!data.watches[1].in_scope);
        assert_eq!(data.watches[1].value, "");
    }

    #[test]
    fn watches_child_list_conversion() {
        let results = results_of(
            "^done,numchild=\"2\",children=[\
             child={name=\"var1.x\",exp=\"x\",numchild=\"0\",value=\"1\",type=\"int\"},\
             child={name=\"var1.y\",exp=\"y\",numchild=\"0\",value=\"2\",type=\"int\"}],\
             has_more=\"0\"",
        );
        let data = watches_child_list_from_results(&results);
        assert_eq!(data.children.len(), 2);
        assert_eq!(data.children[0].variable_id, "var1.x");
        assert_eq!(data.children[0].expression, "x");
        assert_eq!(data.children[0].child_count, 0);
        assert_eq!(data.children[1].value, "2");
        assert!(!data.has_more);
    }

    #[test]
    fn converters_ignore_unexpected_fields() {
        let results = results_of(
            "=library-loaded,id=\"a\",host-name=\"b\",target-name=\"c\",\
             symbols-loaded=\"1\",ranges=[{from=\"0x1\",to=\"0x2\"}],\
             still-unknown-in-2030=\"x\"",
        );
        let data = library_loaded_from_results(&results);
        assert_eq!(data.library_id, "a");
        assert!(data.symbols_loaded);
    }

    #[test]
    fn conversion_does_not_mutate_record() {
        let record = MiParser::new()
            .parse_record("*stopped,reason=\"breakpoint-hit\",frame={func=\"main\"}")
            .unwrap();
        let before = record.clone();
        let _ = stopped_at_breakpoint_from_results(record.results());
        let _ = stop_reason_from_results(record.results());
        assert_eq!(record, before);
    }
}
