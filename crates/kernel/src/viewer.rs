use crate::basis::Sign;
use crate::camera::Camera;
use crate::light::SpinningLight;
use skyline_input::InputCommand;

/// Everything the viewer can change at runtime.
///
/// The starting camera and light are kept so `Reset` can restore them
/// exactly instead of rebuilding them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerState {
    pub camera: Camera,
    pub light: SpinningLight,
    initial_camera: Camera,
    initial_light: SpinningLight,
}

/// Outcome of applying one command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Continue(ViewerState),
    Quit,
}

impl ViewerState {
    pub fn new(camera: Camera, light: SpinningLight) -> Self {
        Self {
            camera,
            light,
            initial_camera: camera,
            initial_light: light,
        }
    }

    /// Apply in place. Returns `false` when the command asks to quit.
    pub fn step(&mut self, command: InputCommand) -> bool {
        match apply(*self, command) {
            Transition::Continue(next) => {
                *self = next;
                true
            }
            Transition::Quit => false,
        }
    }
}

/// Pure state transition for one command.
pub fn apply(mut state: ViewerState, command: InputCommand) -> Transition {
    use InputCommand as C;
    let ViewerState {
        camera,
        light,
        initial_camera,
        initial_light,
    } = &mut state;
    match command {
        C::Quit => return Transition::Quit,
        C::Reset => {
            *camera = *initial_camera;
            *light = *initial_light;
        }
        C::PanLeft => camera.pan_left(),
        C::PanRight => camera.pan_right(),
        C::MoveForward => camera.move_forward(),
        C::MoveBackward => camera.move_backward(),
        C::Ascend => camera.ascend(),
        C::Descend => camera.descend(),
        C::StrafeLeft => camera.strafe_left(),
        C::StrafeRight => camera.strafe_right(),
        C::PitchUp => camera.rotate_up(),
        C::PitchDown => camera.rotate_down(),
        C::LightUp => light.rotate_up(),
        C::LightDown => light.rotate_down(),
        C::LightLeft => light.rotate_left(),
        C::LightRight => light.rotate_right(),
        C::LightRoll => light.roll(Sign::Negative),
        C::ToggleLight => light.toggle(),
    }
    Transition::Continue(state)
}
