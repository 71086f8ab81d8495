use crate::command::InputCommand;
use std::collections::HashSet;
use std::fmt;

/// Logical keys the viewer listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Q,
    R,
    W,
    S,
    A,
    D,
    X,
    Y,
    H,
    G,
    J,
    N,
    K,
    L,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Key::ArrowLeft => "Left",
            Key::ArrowRight => "Right",
            Key::ArrowUp => "Up",
            Key::ArrowDown => "Down",
            other => return write!(f, "{other:?}"),
        };
        f.write_str(name)
    }
}

/// When a binding fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Every frame the key is down.
    Held,
    /// Only on the frame the key goes down.
    Pressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub key: Key,
    pub trigger: Trigger,
    pub command: InputCommand,
}

impl Binding {
    pub const fn held(key: Key, command: InputCommand) -> Self {
        Self {
            key,
            trigger: Trigger::Held,
            command,
        }
    }

    pub const fn pressed(key: Key, command: InputCommand) -> Self {
        Self {
            key,
            trigger: Trigger::Pressed,
            command,
        }
    }

    fn fires(&self, snapshot: &KeySnapshot) -> bool {
        match self.trigger {
            Trigger::Held => snapshot.is_held(self.key),
            Trigger::Pressed => snapshot.was_pressed(self.key),
        }
    }
}

/// Keyboard state for one frame.
#[derive(Debug, Clone, Default)]
pub struct KeySnapshot {
    held: HashSet<Key>,
    pressed: HashSet<Key>,
}

impl KeySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key going down. Repeats of an already-held key are not new
    /// presses.
    pub fn press(&mut self, key: Key) {
        if self.held.insert(key) {
            self.pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// Forget this frame's press edges; held keys carry over.
    pub fn end_frame(&mut self) {
        self.pressed.clear();
    }

    /// Drop everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
        self.pressed.clear();
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn was_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }
}

/// Ordered list of bindings; earlier bindings take priority.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<Binding>,
}

impl Default for Keymap {
    fn default() -> Self {
        use InputCommand as C;
        Self::new(vec![
            Binding::pressed(Key::Q, C::Quit),
            Binding::pressed(Key::R, C::Reset),
            // Edge-triggered bindings first: a press lives for one frame.
            Binding::pressed(Key::L, C::ToggleLight),
            Binding::held(Key::ArrowLeft, C::PanLeft),
            Binding::held(Key::ArrowRight, C::PanRight),
            Binding::held(Key::ArrowUp, C::MoveForward),
            Binding::held(Key::ArrowDown, C::MoveBackward),
            Binding::held(Key::W, C::Ascend),
            Binding::held(Key::S, C::Descend),
            Binding::held(Key::A, C::StrafeLeft),
            Binding::held(Key::D, C::StrafeRight),
            Binding::held(Key::X, C::PitchUp),
            Binding::held(Key::Y, C::PitchDown),
            Binding::held(Key::H, C::LightUp),
            Binding::held(Key::G, C::LightDown),
            Binding::held(Key::J, C::LightLeft),
            Binding::held(Key::N, C::LightRight),
            Binding::held(Key::K, C::LightRoll),
        ])
    }
}

impl Keymap {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// The single command for this frame, if any key matches.
    pub fn resolve(&self, snapshot: &KeySnapshot) -> Option<InputCommand> {
        let command = self
            .bindings
            .iter()
            .find(|binding| binding.fires(snapshot))
            .map(|binding| binding.command);
        if let Some(command) = command {
            tracing::trace!(?command, "resolved input");
        }
        command
    }
}
