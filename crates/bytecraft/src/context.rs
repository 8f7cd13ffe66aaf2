//! Parsing and building contexts.
//!
//! A context lives for exactly one top-level [crate::schema::Schema::parse] or
//! [crate::schema::Schema::build] call. It carries the cursor (parse) or the
//! emitted chunks (build), plus a stack of scope layers through which length and
//! discriminator expressions see the fields that are already known.

use std::fmt;

use bytes::Bytes;
use tracing::debug;

use crate::{
    errors::Error,
    value::{Record, Value},
};

/// Name of the scope entry that holds the current item index inside an array.
pub const INDEX_FIELD: &str = "_index";

const PREVIEW_CHARS: usize = 64;
const PREVIEW_BYTES: usize = 16;

/// Read-only view of the scope stack handed to expressions.
///
/// Lookups walk from the innermost layer outwards, so a field of the current
/// struct shadows a same-named field of an enclosing one.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    layers: &'a [Record],
}

impl<'a> Scope<'a> {
    /// Returns the innermost visible value named `name`.
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.layers.iter().rev().find_map(|layer| layer.get(name))
    }

    /// Returns `name` as an integer, if it is visible and integral.
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_i64()
    }

    /// Index of the innermost array item being parsed or built.
    pub fn index(&self) -> Option<usize> {
        self.get(INDEX_FIELD)?.as_u64()?.try_into().ok()
    }

    /// Number of layers, the root layer included.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }
}

/// Strict LIFO stack of scope layers, shared by both directions.
#[derive(Debug, Clone)]
struct ScopeStack {
    layers: Vec<Record>,
}

impl ScopeStack {
    fn new() -> Self {
        Self {
            layers: vec![Record::new()],
        }
    }

    fn view(&self) -> Scope<'_> {
        Scope {
            layers: &self.layers,
        }
    }

    fn top_mut(&mut self) -> &mut Record {
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }

    fn push(&mut self, layer: Record) {
        self.layers.push(layer);
    }

    fn pop(&mut self) -> Record {
        debug_assert!(self.layers.len() > 1, "popped the root scope layer");
        self.layers.pop().unwrap_or_default()
    }

    fn depth(&self) -> usize {
        self.layers.len()
    }

    fn truncate(&mut self, depth: usize) {
        debug_assert!(depth >= 1, "truncated below the root scope layer");
        self.layers.truncate(depth);
    }
}

/// Indented debug trace; silent unless the call was started in debug mode.
#[derive(Debug, Clone, Copy, Default)]
struct Trace {
    enabled: bool,
    depth: usize,
}

fn truncate_preview(mut text: String, max: usize) -> String {
    if text.chars().count() > max {
        text = text.chars().take(max).collect();
        text.push_str("...");
    }
    text
}

fn preview_bytes(bytes: &[u8]) -> String {
    let hex: Vec<String> = bytes
        .iter()
        .take(PREVIEW_BYTES)
        .map(|byte| format!("{byte:02x}"))
        .collect();
    let ellipsis = if bytes.len() > PREVIEW_BYTES { "..." } else { "" };
    format!("bytes(len={}) [{}{}]", bytes.len(), hex.join(" "), ellipsis)
}

/// Saved cursor and scope depth, used to roll back a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub offset: usize,
    pub depth: usize,
}

/// Cursor over the input of one parse call.
#[derive(Debug)]
pub struct ParsingContext<'a> {
    data: &'a [u8],
    offset: usize,
    scopes: ScopeStack,
    trace: Trace,
}

impl<'a> ParsingContext<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            scopes: ScopeStack::new(),
            trace: Trace::default(),
        }
    }

    /// Enables the enter/leave trace for this call.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.trace.enabled = debug;
        self
    }

    /// Bytes consumed so far in the current window.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the current window.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Fails with [Error::InsufficientData] if fewer than `n` bytes remain.
    pub fn check_bounds(&self, n: usize) -> Result<(), Error> {
        let available = self.remaining();
        if n > available {
            return Err(Error::InsufficientData {
                needed: n,
                available,
            });
        }
        Ok(())
    }

    /// Returns the next `n` bytes without moving the cursor.
    pub fn peek(&self, n: usize) -> Result<&'a [u8], Error> {
        self.check_bounds(n)?;
        let data = self.data;
        Ok(&data[self.offset..self.offset + n])
    }

    /// Returns the next `n` bytes and advances past them.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8], Error> {
        let bytes = self.peek(n)?;
        self.offset += n;
        Ok(bytes)
    }

    /// Advances past `n` bytes without looking at them.
    pub fn skip(&mut self, n: usize) -> Result<(), Error> {
        self.check_bounds(n)?;
        self.offset += n;
        Ok(())
    }

    /// Fields visible at the current point of the parse.
    pub fn scope(&self) -> Scope<'_> {
        self.scopes.view()
    }

    pub(crate) fn scope_mut(&mut self) -> &mut Record {
        self.scopes.top_mut()
    }

    /// Runs `f` with `layer` pushed on the scope stack and pops it on every exit path.
    pub(crate) fn scoped<T>(
        &mut self,
        layer: Record,
        f: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> (Result<T, Error>, Record) {
        let depth = self.scopes.depth();
        self.scopes.push(layer);
        let result = f(self);
        self.scopes.truncate(depth + 1);
        let layer = self.scopes.pop();
        (result, layer)
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            offset: self.offset,
            depth: self.scopes.depth(),
        }
    }

    /// Restores the cursor and scope stack to a previous [Checkpoint].
    pub(crate) fn rewind(&mut self, checkpoint: Checkpoint) {
        self.offset = checkpoint.offset;
        self.scopes.truncate(checkpoint.depth);
    }

    /// Runs `f` over a window of the next `len` bytes with its own cursor starting at 0,
    /// then advances this cursor by the whole window whatever `f` consumed.
    pub(crate) fn window<T>(
        &mut self,
        len: usize,
        f: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let window = self.peek(len)?;
        let outer = std::mem::replace(&mut self.data, window);
        let offset = std::mem::replace(&mut self.offset, 0);
        let result = f(self);
        self.data = outer;
        self.offset = offset;
        let value = result?;
        self.offset += len;
        Ok(value)
    }

    pub(crate) fn debugging(&self) -> bool {
        self.trace.enabled
    }

    pub(crate) fn log(&self, message: impl fmt::Display) {
        if self.trace.enabled {
            debug!(depth = self.trace.depth, "{}{}", indent(self.trace.depth), message);
        }
    }

    pub(crate) fn enter(&mut self, name: &str) {
        if !self.trace.enabled {
            return;
        }
        self.log(format_args!(
            "=> {name} at offset {} (0x{:x})",
            self.offset, self.offset
        ));
        self.trace.depth += 1;
    }

    pub(crate) fn leave<T: fmt::Debug>(&mut self, name: &str, result: &Result<T, Error>) {
        if !self.trace.enabled {
            return;
        }
        self.trace.depth = self.trace.depth.saturating_sub(1);
        match result {
            Ok(value) => self.log(format_args!(
                "<= {name} at new offset {} (0x{:x}) parsed: {}",
                self.offset,
                self.offset,
                truncate_preview(format!("{value:?}"), PREVIEW_CHARS)
            )),
            Err(err) => self.log(format_args!(
                "<= {name} failed at offset {}: {err}",
                self.offset
            )),
        }
    }

    pub(crate) fn log_bytes(&self, name: &str, bytes: &[u8]) {
        if !self.trace.enabled {
            return;
        }
        self.log(format_args!("   {name} read {}", preview_bytes(bytes)));
    }
}

/// Ordered chunk accumulator for one build call.
#[derive(Debug)]
pub struct BuildingContext {
    chunks: Vec<Bytes>,
    written: usize,
    scopes: ScopeStack,
    trace: Trace,
}

impl Default for BuildingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildingContext {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            written: 0,
            scopes: ScopeStack::new(),
            trace: Trace::default(),
        }
    }

    /// Enables the enter/leave trace for this call.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.trace.enabled = debug;
        self
    }

    /// Appends a chunk after everything emitted so far.
    pub fn push(&mut self, chunk: impl Into<Bytes>) {
        let chunk = chunk.into();
        self.written += chunk.len();
        self.chunks.push(chunk);
    }

    /// Total bytes emitted into the current accumulator.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Fields visible at the current point of the build.
    pub fn scope(&self) -> Scope<'_> {
        self.scopes.view()
    }

    /// Runs `f` with `layer` pushed on the scope stack and pops it on every exit path.
    pub(crate) fn scoped<T>(
        &mut self,
        layer: Record,
        f: impl FnOnce(&mut Self) -> Result<T, Error>,
    ) -> (Result<T, Error>, Record) {
        let depth = self.scopes.depth();
        self.scopes.push(layer);
        let result = f(self);
        self.scopes.truncate(depth + 1);
        let layer = self.scopes.pop();
        (result, layer)
    }

    /// Runs `f` against an empty accumulator that shares this scope stack and
    /// returns what it emitted, concatenated, without appending it here.
    pub(crate) fn isolated(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<(), Error>,
    ) -> Result<Bytes, Error> {
        let chunks = std::mem::take(&mut self.chunks);
        let written = std::mem::replace(&mut self.written, 0);
        let result = f(self);
        let inner = std::mem::replace(&mut self.chunks, chunks);
        self.written = written;
        result?;
        Ok(concat(inner))
    }

    /// Concatenates every emitted chunk in order.
    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.written);
        for chunk in &self.chunks {
            out.extend_from_slice(chunk);
        }
        out
    }

    pub(crate) fn debugging(&self) -> bool {
        self.trace.enabled
    }

    pub(crate) fn log(&self, message: impl fmt::Display) {
        if self.trace.enabled {
            debug!(depth = self.trace.depth, "{}{}", indent(self.trace.depth), message);
        }
    }

    pub(crate) fn enter<T: fmt::Debug>(&mut self, name: &str, value: &T) {
        if !self.trace.enabled {
            return;
        }
        self.log(format_args!(
            "=> Building {name} with value: {}",
            truncate_preview(format!("{value:?}"), 2 * PREVIEW_CHARS)
        ));
        self.trace.depth += 1;
    }

    pub(crate) fn leave(&mut self, name: &str, result: &Result<(), Error>, written: usize) {
        if !self.trace.enabled {
            return;
        }
        self.trace.depth = self.trace.depth.saturating_sub(1);
        match result {
            Ok(()) => self.log(format_args!(
                "<= Finished Building {name} (wrote {written} bytes)"
            )),
            Err(err) => self.log(format_args!("<= Failed Building {name}: {err}")),
        }
    }
}

fn concat(chunks: Vec<Bytes>) -> Bytes {
    match chunks.len() {
        0 => Bytes::new(),
        1 => chunks.into_iter().next().unwrap_or_default(),
        _ => {
            let total = chunks.iter().map(Bytes::len).sum();
            let mut out = Vec::with_capacity(total);
            for chunk in &chunks {
                out.extend_from_slice(chunk);
            }
            Bytes::from(out)
        }
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}
