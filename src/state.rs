use crate::controller::ControllerHandle;

#[derive(Clone)]
pub struct AppState {
    pub view: ControllerHandle,
}

impl AppState {
    pub fn new(view: ControllerHandle) -> Self {
        Self { view }
    }
}
