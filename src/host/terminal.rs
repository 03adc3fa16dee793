//! Terminal head target.
//!
//! A terminal has exactly one head slot worth projecting into: the window
//! title. This target mirrors the sink's list and writes the first rendered
//! title through crossterm whenever it changes. Meta and script winners are
//! tracked for ordering but have nothing to render.

use std::io::{self, IsTerminal, Stdout, Write};
use std::rc::Rc;

use crossterm::execute;
use crossterm::terminal::SetTitle;
use tracing::{debug, warn};

use super::{HeadTarget, HostSource};
use crate::types::HeadNode;

/// Head target that drives the terminal window title.
pub struct TerminalHead<W: Write> {
    writer: W,
    nodes: Vec<HeadNode>,
    title: Option<String>,
}

impl TerminalHead<Stdout> {
    /// Target writing to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalHead<W> {
    /// Target writing escape sequences to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            nodes: Vec::new(),
            title: None,
        }
    }

    /// Title currently written to the terminal.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Underlying writer.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Recompute the title and write it if it changed.
    fn sync_title(&mut self) {
        let next = self
            .nodes
            .iter()
            .find_map(|node| node.element().as_title().map(str::to_string));
        if next == self.title {
            return;
        }

        let text = next.as_deref().unwrap_or("");
        match execute!(self.writer, SetTitle(text)) {
            Ok(()) => debug!(title = text, "terminal title updated"),
            Err(err) => warn!(%err, "failed to write terminal title"),
        }
        self.title = next;
    }
}

impl<W: Write> HeadTarget for TerminalHead<W> {
    fn insert(&mut self, index: usize, node: &HeadNode) {
        let index = index.min(self.nodes.len());
        self.nodes.insert(index, node.clone());
        self.sync_title();
    }

    fn replace(&mut self, index: usize, node: &HeadNode) {
        if let Some(slot) = self.nodes.get_mut(index) {
            *slot = node.clone();
            self.sync_title();
        }
    }

    fn remove(&mut self, index: usize) {
        if index < self.nodes.len() {
            self.nodes.remove(index);
            self.sync_title();
        }
    }
}

/// Host source backed by stdout, available only when stdout is a terminal.
pub fn terminal_host() -> HostSource {
    Rc::new(|| {
        if io::stdout().is_terminal() {
            Some(Box::new(TerminalHead::stdout()) as Box<dyn super::HeadTarget>)
        } else {
            None
        }
    })
}
