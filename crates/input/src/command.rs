use serde::{Deserialize, Serialize};

/// A discrete viewer command.
///
/// The viewer state machine consumes commands, never raw key events, so the
/// same transitions can be driven from a window, a script or a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputCommand {
    /// Leave the frame loop.
    Quit,
    /// Put the camera and light back where they started.
    Reset,
    PanLeft,
    PanRight,
    MoveForward,
    MoveBackward,
    Ascend,
    Descend,
    StrafeLeft,
    StrafeRight,
    PitchUp,
    PitchDown,
    LightUp,
    LightDown,
    LightLeft,
    LightRight,
    /// Spin the light's orbit frame about its line of sight.
    LightRoll,
    /// Switch the light off or back on.
    ToggleLight,
}

impl InputCommand {
    /// Short label for HUD and log output.
    pub fn label(self) -> &'static str {
        match self {
            InputCommand::Quit => "quit",
            InputCommand::Reset => "reset",
            InputCommand::PanLeft => "pan left",
            InputCommand::PanRight => "pan right",
            InputCommand::MoveForward => "move forward",
            InputCommand::MoveBackward => "move backward",
            InputCommand::Ascend => "ascend",
            InputCommand::Descend => "descend",
            InputCommand::StrafeLeft => "strafe left",
            InputCommand::StrafeRight => "strafe right",
            InputCommand::PitchUp => "pitch up",
            InputCommand::PitchDown => "pitch down",
            InputCommand::LightUp => "light up",
            InputCommand::LightDown => "light down",
            InputCommand::LightLeft => "light left",
            InputCommand::LightRight => "light right",
            InputCommand::LightRoll => "light roll",
            InputCommand::ToggleLight => "toggle light",
        }
    }

    /// Whether the command moves the camera.
    pub fn is_camera(self) -> bool {
        matches!(
            self,
            InputCommand::PanLeft
                | InputCommand::PanRight
                | InputCommand::MoveForward
                | InputCommand::MoveBackward
                | InputCommand::Ascend
                | InputCommand::Descend
                | InputCommand::StrafeLeft
                | InputCommand::StrafeRight
                | InputCommand::PitchUp
                | InputCommand::PitchDown
        )
    }

    /// Whether the command changes the light.
    pub fn is_light(self) -> bool {
        matches!(
            self,
            InputCommand::LightUp
                | InputCommand::LightDown
                | InputCommand::LightLeft
                | InputCommand::LightRight
                | InputCommand::LightRoll
                | InputCommand::ToggleLight
        )
    }
}
