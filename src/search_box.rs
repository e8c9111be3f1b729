use anyhow::Result;

use crate::render;

pub type OnChange = Box<dyn FnMut(&str) + Send>;

/// Free-text input. Keeps its own display value, seeded once from `initial`,
/// and reports every edit upward.
pub struct SearchBox {
    placeholder: String,
    value: String,
    on_change: OnChange,
}

impl SearchBox {
    pub fn new(
        placeholder: impl Into<String>,
        initial: impl Into<String>,
        on_change: OnChange,
    ) -> Self {
        Self {
            placeholder: placeholder.into(),
            value: initial.into(),
            on_change,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// A keystroke: `new_value` is the full contents of the field.
    pub fn input(&mut self, new_value: impl Into<String>) {
        self.value = new_value.into();
        (self.on_change)(&self.value);
    }

    pub fn render(&self, searching: bool) -> Result<String> {
        render::render_search_box(&self.placeholder, &self.value, searching)
    }
}
