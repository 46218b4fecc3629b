//! Status sinks - advisory text outputs (frame info / draw info)

use std::cell::RefCell;
use std::rc::Rc;

/// Advisory text output
///
/// Written every rendered frame; never read back by the engine.
pub trait StatusSink {
    fn set_text(&mut self, text: &str);
}

/// Shared text cell, cloneable handle onto the same buffer
#[derive(Debug, Clone, Default)]
pub struct SharedText(Rc<RefCell<String>>);

impl SharedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current text
    pub fn get(&self) -> String {
        self.0.borrow().clone()
    }
}

impl StatusSink for SharedText {
    fn set_text(&mut self, text: &str) {
        let mut buffer = self.0.borrow_mut();
        buffer.clear();
        buffer.push_str(text);
    }
}

impl StatusSink for String {
    fn set_text(&mut self, text: &str) {
        self.clear();
        self.push_str(text);
    }
}
