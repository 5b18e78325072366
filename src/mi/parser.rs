//! GDB Machine Interface (MI) output parser.
//!
//! Recursive-descent parsing of single MI lines into [`MiRecord`]s, and
//! batching of multi-line backend output into an [`MiOutput`] terminated by
//! the `(gdb)` prompt sentinel.

use crate::mi::error::MiError;
use crate::mi::types::{MiDict, MiRecord, MiResult, MiValue};
use tracing::{debug, warn};

/// The prompt line marking the end of one output batch. Never surfaced as a
/// record.
pub const PROMPT_SENTINEL: &str = "(gdb)";

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Byte-offset cursor over one line of input.
struct Cursor<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str) -> Self {
        Cursor { line, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    fn offset(&self) -> usize {
        self.pos
    }

    fn at_end(&self) -> bool {
        self.pos == self.line.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    /// Maximal run of MI field-name characters; may be empty.
    fn take_identifier(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .find(|c: char| !is_identifier_char(c))
            .unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }
}

/// Parser for single MI output lines.
///
/// Stateless; one instance can parse any number of lines.
#[derive(Debug, Default)]
pub struct MiParser;

impl MiParser {
    pub fn new() -> Self {
        MiParser
    }

    /// Classify and parse one complete line (without its line terminator)
    /// into a record.
    ///
    /// The prompt sentinel and blank lines are not records; they fail with
    /// [`MiError::MalformedRecord`]. Batch-level code is expected to filter
    /// them out before calling this.
    pub fn parse_record(&self, line: &str) -> Result<MiRecord, MiError> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let mut cur = Cursor::new(line);

        // Result and async records may carry a numeric command token.
        let token = self.parse_token(&mut cur);

        let record = match cur.peek() {
            Some('^') => {
                cur.bump();
                let (class, results) = self
                    .parse_class_and_results(&mut cur)
                    .map_err(|e| e.into_record_error(line))?;
                MiRecord::Result {
                    token,
                    class,
                    results,
                }
            }
            Some('*') => {
                cur.bump();
                let (class, results) = self
                    .parse_class_and_results(&mut cur)
                    .map_err(|e| e.into_record_error(line))?;
                MiRecord::ExecAsync {
                    token,
                    class,
                    results,
                }
            }
            Some('+') => {
                cur.bump();
                let (class, results) = self
                    .parse_class_and_results(&mut cur)
                    .map_err(|e| e.into_record_error(line))?;
                MiRecord::StatusAsync {
                    token,
                    class,
                    results,
                }
            }
            Some('=') => {
                cur.bump();
                let (class, results) = self
                    .parse_class_and_results(&mut cur)
                    .map_err(|e| e.into_record_error(line))?;
                MiRecord::NotifyAsync {
                    token,
                    class,
                    results,
                }
            }
            Some(c @ ('~' | '@' | '&')) if token.is_none() => {
                cur.bump();
                let text = self
                    .parse_stream_text(&mut cur)
                    .map_err(|e| e.into_record_error(line))?;
                match c {
                    '~' => MiRecord::Console(text),
                    '@' => MiRecord::Target(text),
                    _ => MiRecord::Log(text),
                }
            }
            _ => {
                return Err(MiError::MalformedRecord {
                    reason: "unrecognized leading sentinel".to_string(),
                    line: line.to_string(),
                });
            }
        };

        Ok(record)
    }

    /// Leading digit run, if any. Only meaningful when a record sentinel
    /// follows; otherwise the line fails classification anyway.
    fn parse_token(&self, cur: &mut Cursor) -> Option<u64> {
        let rest = cur.rest();
        let len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        let token = rest[..len].parse().ok()?;
        cur.pos += len;
        Some(token)
    }

    /// `class ("," result)*` for result and async records. The class is an
    /// opaque identifier; new classes from future backends pass through.
    fn parse_class_and_results(
        &self,
        cur: &mut Cursor,
    ) -> Result<(String, Vec<MiResult>), MiError> {
        let class = cur.take_identifier();
        if class.is_empty() {
            return Err(MiError::MalformedValue {
                offset: cur.offset(),
                reason: "expected class name",
            });
        }
        let mut results = Vec::new();
        while cur.eat(',') {
            results.push(self.parse_result(cur)?);
        }
        if !cur.at_end() {
            return Err(MiError::MalformedValue {
                offset: cur.offset(),
                reason: "trailing data after record",
            });
        }
        Ok((class.to_string(), results))
    }

    /// The quoted-string remainder of a stream record.
    fn parse_stream_text(&self, cur: &mut Cursor) -> Result<String, MiError> {
        let text = self.parse_string(cur)?;
        if !cur.at_end() {
            return Err(MiError::MalformedValue {
                offset: cur.offset(),
                reason: "trailing data after stream output",
            });
        }
        Ok(text)
    }

    /// `identifier "=" value`.
    fn parse_result(&self, cur: &mut Cursor) -> Result<MiResult, MiError> {
        let variable = cur.take_identifier();
        if variable.is_empty() || !cur.eat('=') {
            return Err(MiError::MalformedResult {
                offset: cur.offset(),
            });
        }
        let value = self.parse_value(cur)?;
        Ok(MiResult {
            variable: variable.to_string(),
            value,
        })
    }

    /// One value: string, tuple, or list.
    fn parse_value(&self, cur: &mut Cursor) -> Result<MiValue, MiError> {
        match cur.peek() {
            Some('"') => Ok(MiValue::String(self.parse_string(cur)?)),
            Some('{') => self.parse_tuple(cur),
            Some('[') => self.parse_list(cur),
            _ => Err(MiError::MalformedValue {
                offset: cur.offset(),
                reason: "expected string, tuple, or list",
            }),
        }
    }

    /// Quoted string with escape decoding. `\"`, `\\`, `\n`, `\t`, `\r` are
    /// decoded to their characters; any other `\<char>` decodes to the
    /// literal `<char>`.
    fn parse_string(&self, cur: &mut Cursor) -> Result<String, MiError> {
        let start = cur.offset();
        if !cur.eat('"') {
            return Err(MiError::MalformedValue {
                offset: start,
                reason: "expected opening quote",
            });
        }
        let mut out = String::new();
        loop {
            match cur.bump() {
                None => {
                    return Err(MiError::MalformedValue {
                        offset: start,
                        reason: "unterminated string",
                    });
                }
                Some('"') => return Ok(out),
                Some('\\') => match cur.bump() {
                    None => {
                        return Err(MiError::InvalidEscapeSequence {
                            offset: cur.offset() - 1,
                        });
                    }
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(c) => out.push(c),
                },
                Some(c) => out.push(c),
            }
        }
    }

    /// `{}` or `{result ("," result)*}`, yielding a dictionary in wire
    /// order.
    fn parse_tuple(&self, cur: &mut Cursor) -> Result<MiValue, MiError> {
        let start = cur.offset();
        cur.eat('{');
        let mut dict = MiDict::new();
        if cur.eat('}') {
            return Ok(MiValue::Dictionary(dict));
        }
        loop {
            let result = self.parse_result(cur)?;
            dict.insert(result.variable, result.value);
            if cur.eat(',') {
                continue;
            }
            if cur.eat('}') {
                return Ok(MiValue::Dictionary(dict));
            }
            if cur.at_end() {
                return Err(MiError::MalformedValue {
                    offset: start,
                    reason: "unterminated tuple",
                });
            }
            return Err(MiError::MalformedValue {
                offset: cur.offset(),
                reason: "expected ',' or '}' in tuple",
            });
        }
    }

    /// `[]`, a list of bare values, or a list of `name=value` results.
    ///
    /// The first element decides the shape of the whole list. Result-shaped
    /// elements are kept as one-entry dictionaries so each element's field
    /// name survives.
    fn parse_list(&self, cur: &mut Cursor) -> Result<MiValue, MiError> {
        let start = cur.offset();
        cur.eat('[');
        let mut items = Vec::new();
        if cur.eat(']') {
            return Ok(MiValue::List(items));
        }
        let results_shaped = self.looks_like_result(cur);
        loop {
            if results_shaped {
                let result = self.parse_result(cur)?;
                let mut entry = MiDict::new();
                entry.insert(result.variable, result.value);
                items.push(MiValue::Dictionary(entry));
            } else {
                items.push(self.parse_value(cur)?);
            }
            if cur.eat(',') {
                continue;
            }
            if cur.eat(']') {
                return Ok(MiValue::List(items));
            }
            if cur.at_end() {
                return Err(MiError::MalformedValue {
                    offset: start,
                    reason: "unterminated list",
                });
            }
            return Err(MiError::MalformedValue {
                offset: cur.offset(),
                reason: "expected ',' or ']' in list",
            });
        }
    }

    fn looks_like_result(&self, cur: &Cursor) -> bool {
        let rest = cur.rest();
        let len = rest
            .find(|c: char| !is_identifier_char(c))
            .unwrap_or(rest.len());
        len > 0 && rest[len..].starts_with('=')
    }
}

/// A line the batcher skipped, with the failure that caused it.
#[derive(Debug)]
pub struct ParseDiagnostic {
    pub line: String,
    pub error: MiError,
}

/// One batch of records: everything the backend emitted up to (and
/// excluding) the prompt sentinel, in arrival order.
#[derive(Debug, Default)]
pub struct MiOutput {
    pub records: Vec<MiRecord>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Batches multi-line backend output into [`MiOutput`]s.
///
/// Holds no state across calls; each invocation parses one already-read
/// block of text.
#[derive(Debug, Default)]
pub struct MiReader {
    parser: MiParser,
}

impl MiReader {
    pub fn new() -> Self {
        MiReader {
            parser: MiParser::new(),
        }
    }

    /// Parse a block of backend output up to the prompt sentinel.
    ///
    /// Lines after the sentinel are ignored. A line that fails to parse is
    /// skipped and recorded as a diagnostic; it never aborts the batch.
    pub fn parse_output(&self, text: &str) -> MiOutput {
        let mut output = MiOutput::default();
        for raw in text.split(['\n', '\r']) {
            if raw.is_empty() {
                continue;
            }
            if raw.trim_end() == PROMPT_SENTINEL {
                break;
            }
            match self.parser.parse_record(raw) {
                Ok(record) => output.records.push(record),
                Err(e) => {
                    warn!("Failed to parse MI line: {} - {}", raw, e);
                    output.diagnostics.push(ParseDiagnostic {
                        line: raw.to_string(),
                        error: e,
                    });
                }
            }
        }
        debug!(
            "Parsed batch: {} records, {} skipped",
            output.records.len(),
            output.diagnostics.len()
        );
        output
    }
}
