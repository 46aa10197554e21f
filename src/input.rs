//! Per-frame input snapshot handed to the scene on every update.

use std::collections::HashSet;

use winit::{event::MouseButton, keyboard::KeyCode};

#[derive(Debug, Clone)]
pub struct Input {
    held: HashSet<KeyCode>,
    pressed: HashSet<KeyCode>,
    buttons: HashSet<MouseButton>,
    /// Sum of every raw mouse motion since start. Unbounded.
    pointer: (f32, f32),
    focused: bool,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            held: HashSet::new(),
            pressed: HashSet::new(),
            buttons: HashSet::new(),
            pointer: (0.0, 0.0),
            focused: true,
        }
    }
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    /// Went down since the last [`end_frame`](Self::end_frame). Key repeat
    /// does not count.
    pub fn was_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn is_button_held(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    pub fn pointer(&self) -> (f32, f32) {
        self.pointer
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn press_key(&mut self, key: KeyCode) {
        if self.held.insert(key) {
            self.pressed.insert(key);
        }
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.held.remove(&key);
    }

    pub fn press_button(&mut self, button: MouseButton) {
        self.buttons.insert(button);
    }

    pub fn release_button(&mut self, button: MouseButton) {
        self.buttons.remove(&button);
    }

    pub fn move_pointer(&mut self, dx: f32, dy: f32) {
        self.pointer.0 += dx;
        self.pointer.1 += dy;
    }

    /// Losing focus releases everything, since release events go elsewhere.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.held.clear();
            self.pressed.clear();
            self.buttons.clear();
        }
    }

    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }
}
