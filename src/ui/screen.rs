use ratatui::Frame;

use crate::{
    ui::{render_live, render_results},
    App, AppState,
};

/// A UI Screen boundary: responsible for rendering one application state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Live counting screen
pub struct LiveScreen;

impl Screen for LiveScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        let area = f.area();
        render_live(app, area, f.buffer_mut());
    }
}

/// Results screen with charts
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        match &app.summary {
            Some(_) => {
                let area = f.area();
                render_results(app, area, f.buffer_mut());
            }
            // results without a summary only happen mid-reset
            None => LiveScreen.render(app, f),
        }
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Live => Box::new(LiveScreen),
        AppState::Results => Box::new(ResultsScreen),
    }
}
