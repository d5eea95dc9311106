/// Key bindings and per-frame input batching
use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use meshview_core::{Axis, Event};

/// Step sizes applied per key press
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    /// Translation per press, model units
    pub move_step: f32,
    /// Rotation per press, degrees
    pub rotate_step: f32,
    /// Scale factor per press; the opposite key divides by it
    pub scale_step: f32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            move_step: 0.1,
            rotate_step: 5.0,
            scale_step: 1.1,
        }
    }
}

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Quit,
    Reload,
    Move(f32, Axis),
    Rotate(f32, Axis),
    Scale(f32),
}

impl Controls {
    pub fn action_for(&self, key: KeyEvent) -> Option<Action> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        let m = self.move_step;
        let r = self.rotate_step;
        let action = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('r') => Action::Reload,

            KeyCode::Char('a') | KeyCode::Left => Action::Move(-m, Axis::X),
            KeyCode::Char('d') | KeyCode::Right => Action::Move(m, Axis::X),
            KeyCode::Char('w') | KeyCode::Up => Action::Move(m, Axis::Y),
            KeyCode::Char('s') | KeyCode::Down => Action::Move(-m, Axis::Y),
            KeyCode::PageUp => Action::Move(m, Axis::Z),
            KeyCode::PageDown => Action::Move(-m, Axis::Z),

            KeyCode::Char('i') => Action::Rotate(r, Axis::X),
            KeyCode::Char('k') => Action::Rotate(-r, Axis::X),
            KeyCode::Char('l') => Action::Rotate(r, Axis::Y),
            KeyCode::Char('j') => Action::Rotate(-r, Axis::Y),
            KeyCode::Char('u') => Action::Rotate(r, Axis::Z),
            KeyCode::Char('o') => Action::Rotate(-r, Axis::Z),

            KeyCode::Char('+') | KeyCode::Char('=') => Action::Scale(self.scale_step),
            KeyCode::Char('-') | KeyCode::Char('_') => Action::Scale(1.0 / self.scale_step),
            _ => return None,
        };
        Some(action)
    }
}

/// Actions gathered during one frame, turned into a single engine batch.
///
/// The engine treats scale as absolute within a batch, so scale presses are
/// multiplied together here and sent as one factor.
#[derive(Debug, Default)]
pub struct FrameInput {
    events: Vec<Event>,
    scale: Option<f32>,
    quit: bool,
}

impl FrameInput {
    pub fn push(&mut self, action: Action, model_path: Option<&Path>) {
        match action {
            Action::Quit => self.quit = true,
            Action::Reload => {
                if let Some(path) = model_path {
                    self.flush_scale();
                    self.events.push(Event::Load(path.to_path_buf()));
                }
            }
            Action::Move(value, axis) => self.events.push(Event::Move { value, axis }),
            Action::Rotate(value, axis) => self.events.push(Event::Rotate { value, axis }),
            Action::Scale(factor) => *self.scale.get_or_insert(1.0) *= factor,
        }
    }

    /// Events to dispatch, and whether quit was requested
    pub fn finish(mut self) -> (Vec<Event>, bool) {
        self.flush_scale();
        (self.events, self.quit)
    }

    fn flush_scale(&mut self) {
        if let Some(factor) = self.scale.take() {
            self.events.push(Event::Scale(factor));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use std::path::PathBuf;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_bindings() {
        let controls = Controls::default();
        assert_eq!(controls.action_for(press(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(
            controls.action_for(press(KeyCode::Left)),
            Some(Action::Move(-0.1, Axis::X))
        );
        assert_eq!(
            controls.action_for(press(KeyCode::Char('u'))),
            Some(Action::Rotate(5.0, Axis::Z))
        );
        assert_eq!(controls.action_for(press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_release_ignored() {
        let mut key = press(KeyCode::Char('d'));
        key.kind = KeyEventKind::Release;
        assert_eq!(Controls::default().action_for(key), None);
    }

    #[test]
    fn test_scale_presses_multiply() {
        let mut input = FrameInput::default();
        input.push(Action::Scale(2.0), None);
        input.push(Action::Move(1.0, Axis::Y), None);
        input.push(Action::Scale(2.0), None);

        let (events, quit) = input.finish();
        assert!(!quit);
        assert_eq!(
            events,
            vec![Event::Move { value: 1.0, axis: Axis::Y }, Event::Scale(4.0)]
        );
    }

    #[test]
    fn test_reload_flushes_scale_first() {
        let path = PathBuf::from("model.obj");
        let mut input = FrameInput::default();
        input.push(Action::Scale(0.5), Some(&path));
        input.push(Action::Reload, Some(&path));
        input.push(Action::Quit, Some(&path));

        let (events, quit) = input.finish();
        assert!(quit);
        assert_eq!(events, vec![Event::Scale(0.5), Event::Load(path)]);
    }

    #[test]
    fn test_reload_without_path_is_ignored() {
        let mut input = FrameInput::default();
        input.push(Action::Reload, None);
        assert!(input.finish().0.is_empty());
    }
}
