use crate::tui::action::Action;
use color_eyre::Result;
use ratatui::{layout::Rect, Frame};

/// A piece of the screen that reacts to actions and draws itself.
///
/// The app routes each [`Action`] to whichever component currently owns input;
/// a component that does not consume an action returns `Ok(false)` so the
/// caller can try the next one.
pub trait Component {
    /// Returns `Ok(true)` when the action was consumed.
    fn handle_action(&mut self, action: Action) -> Result<bool>;

    /// Draw into `area`
    fn render(&mut self, frame: &mut Frame, area: Rect);

    /// Actions this component reacts to
    fn supported_actions(&self) -> &[Action];

    /// Name used in log lines
    fn name(&self) -> &str;

    /// Called on every tick
    fn update(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Component that can hold keyboard focus
pub trait Focusable: Component {
    fn is_focused(&self) -> bool;

    fn set_focused(&mut self, focused: bool);
}
