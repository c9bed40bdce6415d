//! Tree configuration - scroll, input and animation defaults

use std::time::Duration;

/// Tunables shared by every node of a [`Tree`](crate::Tree)
#[derive(Debug, Clone, PartialEq)]
pub struct TreeConfig {
    /// Pixels a scrollable viewport moves per wheel notch
    pub scroll_step: f64,
    /// Extra room allowed below the last child of a scrollable viewport
    pub scroll_slack: f64,
    /// Number of mouse buttons sampled for click/release/drag edges
    pub mouse_buttons: usize,
    /// Duration used by [`Tree::set_animation_default`](crate::Tree::set_animation_default)
    pub default_animation: Duration,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            scroll_step: 12.0,
            scroll_slack: 5.0,
            mouse_buttons: 3,
            default_animation: Duration::from_millis(500),
        }
    }
}

impl TreeConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set pixels scrolled per wheel notch
    pub fn with_scroll_step(mut self, step: f64) -> Self {
        self.scroll_step = step;
        self
    }

    /// Set extra scroll room below the last child
    pub fn with_scroll_slack(mut self, slack: f64) -> Self {
        self.scroll_slack = slack;
        self
    }

    /// Set how many mouse buttons are sampled each frame
    pub fn with_mouse_buttons(mut self, count: usize) -> Self {
        self.mouse_buttons = count;
        self
    }

    /// Set the default animation duration
    pub fn with_default_animation(mut self, duration: Duration) -> Self {
        self.default_animation = duration;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let config = TreeConfig::new()
            .with_scroll_step(24.0)
            .with_mouse_buttons(5);

        assert_eq!(config.scroll_step, 24.0);
        assert_eq!(config.mouse_buttons, 5);
        assert_eq!(config.scroll_slack, 5.0);
        assert_eq!(config.default_animation, Duration::from_millis(500));
    }
}
