//! Jump signal latch
//!
//! Browser events arrive between frames. The latch folds them into the
//! held/just-pressed pair the simulation consumes once per frame.

use std::collections::HashSet;

use crate::sim::TickInput;

/// `KeyboardEvent.code` values that act as the jump button
pub const JUMP_KEYS: [&str; 3] = ["Space", "ArrowUp", "KeyW"];

/// Source of a press, tracked separately so releasing one does not cancel another
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Source {
    Key(String),
    Pointer,
    Touch,
}

#[derive(Debug, Default)]
pub struct JumpInput {
    down: HashSet<Source>,
    just_pressed: bool,
}

impl JumpInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_jump_key(code: &str) -> bool {
        JUMP_KEYS.contains(&code)
    }

    /// Key went down. Returns true if the key is a jump key (caller should prevent default).
    pub fn key_down(&mut self, code: &str) -> bool {
        if !Self::is_jump_key(code) {
            return false;
        }
        self.press(Source::Key(code.to_string()));
        true
    }

    pub fn key_up(&mut self, code: &str) -> bool {
        if !Self::is_jump_key(code) {
            return false;
        }
        self.down.remove(&Source::Key(code.to_string()));
        true
    }

    pub fn pointer_down(&mut self) {
        self.press(Source::Pointer);
    }

    pub fn pointer_up(&mut self) {
        self.down.remove(&Source::Pointer);
    }

    pub fn touch_start(&mut self) {
        self.press(Source::Touch);
    }

    pub fn touch_end(&mut self) {
        self.down.remove(&Source::Touch);
    }

    /// Drop every held source (window blur, leaving the runtime)
    pub fn release_all(&mut self) {
        self.down.clear();
        self.just_pressed = false;
    }

    pub fn is_held(&self) -> bool {
        !self.down.is_empty()
    }

    /// Input for the frame about to be simulated
    pub fn tick_input(&self) -> TickInput {
        TickInput {
            // A tap shorter than a frame still counts as held for that frame
            held: self.is_held() || self.just_pressed,
            just_pressed: self.just_pressed,
        }
    }

    /// Consume the edge after a simulated frame
    pub fn end_frame(&mut self) {
        self.just_pressed = false;
    }

    fn press(&mut self, source: Source) {
        // Key repeat and a second finger do not re-trigger while already held
        if !self.is_held() {
            self.just_pressed = true;
        }
        self.down.insert(source);
    }
}
