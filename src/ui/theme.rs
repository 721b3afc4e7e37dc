//! Theme for cliclack prompts

use cliclack::ThemeState;
use console::Style;

/// Camara's theme: magenta while active, green once submitted
#[derive(Debug, Clone, Default)]
pub struct CamaraTheme;

impl cliclack::Theme for CamaraTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().magenta(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().magenta().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().magenta(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green(),
        }
    }
}

/// Install the theme globally
pub fn init_theme() {
    cliclack::set_theme(CamaraTheme);
}

#[cfg(test)]
mod tests {
    use super::*;
    use cliclack::Theme;

    #[test]
    fn error_state_is_red() {
        let theme = CamaraTheme;
        let error = ThemeState::Error("bad".to_string());
        assert_eq!(
            theme.bar_color(&error).apply_to("x").to_string(),
            Style::new().red().apply_to("x").to_string()
        );
        let _ = theme.state_symbol_color(&ThemeState::Submit);
    }
}
