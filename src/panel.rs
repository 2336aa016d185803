//! Editor panel: the actions a user can trigger and their key bindings.

use log::info;

use crate::editor::{EditorSession, SCALE_RANGE};
use crate::scene::SceneError;
use crate::window::Key;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelAction {
    AddPlane,
    HidePlanes,
    Clipping,
    Negated,
    JoinMesh,
    Caps,
    /// Moves the scale slider to the given value.
    Scale(f32),
}

/// Key bindings, shown at startup.
pub const BINDINGS: &[(Key, &str)] = &[
    (Key::P, "add plane"),
    (Key::H, "hide/show planes"),
    (Key::C, "toggle clipping"),
    (Key::N, "negate clipping"),
    (Key::J, "toggle join mesh"),
    (Key::K, "toggle caps"),
    (Key::Plus, "scale selected object up"),
    (Key::Minus, "scale selected object down"),
];

/// Panel state: the scale slider.
#[derive(Debug, Clone)]
pub struct Panel {
    scale: f32,
    scale_step: f32,
}

impl Panel {
    pub fn new(scale_step: f32) -> Self {
        Self {
            scale: 1.0,
            scale_step,
        }
    }

    /// Current slider value.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn action_for_key(&self, key: Key) -> PanelAction {
        match key {
            Key::P => PanelAction::AddPlane,
            Key::H => PanelAction::HidePlanes,
            Key::C => PanelAction::Clipping,
            Key::N => PanelAction::Negated,
            Key::J => PanelAction::JoinMesh,
            Key::K => PanelAction::Caps,
            Key::Plus => PanelAction::Scale(self.scale + self.scale_step),
            Key::Minus => PanelAction::Scale(self.scale - self.scale_step),
        }
    }

    /// Runs an action against the session.
    pub fn apply(&mut self, session: &mut EditorSession, action: PanelAction) -> Result<(), SceneError> {
        match action {
            PanelAction::AddPlane => {
                session.add_plane()?;
            }
            PanelAction::HidePlanes => session.hide_planes(),
            PanelAction::Clipping => {
                session.toggle_clipping()?;
            }
            PanelAction::Negated => session.negate_clipping()?,
            PanelAction::JoinMesh => {
                session.toggle_join_mesh();
            }
            PanelAction::Caps => {
                session.toggle_capping()?;
            }
            PanelAction::Scale(value) => {
                self.scale = value.clamp(SCALE_RANGE.0, SCALE_RANGE.1);
                if session.set_scale(self.scale)? {
                    info!("scale {:.2}", self.scale);
                }
            }
        }
        Ok(())
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::new(0.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::SessionSettings;
    use approx::assert_relative_eq;

    #[test]
    fn every_bound_key_maps_to_an_action() {
        let panel = Panel::default();
        for (key, _) in BINDINGS {
            let _ = panel.action_for_key(*key);
        }
        assert_eq!(panel.action_for_key(Key::C), PanelAction::Clipping);
    }

    #[test]
    fn slider_steps_and_clamps() {
        let mut panel = Panel::new(2.0);
        let mut session = EditorSession::new(SessionSettings::default()).unwrap();
        for _ in 0..4 {
            let action = panel.action_for_key(Key::Plus);
            panel.apply(&mut session, action).unwrap();
        }
        assert_relative_eq!(panel.scale(), 5.0);

        for _ in 0..8 {
            let action = panel.action_for_key(Key::Minus);
            panel.apply(&mut session, action).unwrap();
        }
        assert_relative_eq!(panel.scale(), -5.0);
    }

    #[test]
    fn actions_reach_the_session() {
        let mut panel = Panel::default();
        let mut session = EditorSession::new(SessionSettings::default()).unwrap();

        panel.apply(&mut session, PanelAction::AddPlane).unwrap();
        assert_eq!(session.planes().len(), 1);

        panel.apply(&mut session, PanelAction::Clipping).unwrap();
        assert!(session.is_clipping());

        panel.apply(&mut session, PanelAction::JoinMesh).unwrap();
        assert!(session.is_join_mesh());

        panel.apply(&mut session, PanelAction::Caps).unwrap();
        assert!(!session.is_capping());
    }
}
