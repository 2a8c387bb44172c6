use crate::color::{ColorError, Rgb};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub font_weight: u16,
    pub text_color: String,
    pub text_outline_color: String,
    pub edge_color: String,
    pub background: String,
    /// Base colors handed out to group roots; descendants derive their
    /// shades from the root's pick.
    pub root_palette: Vec<String>,
}

impl Theme {
    /// The webfont look of the original bubble editor: Poppins semibold
    /// labels with a dark outline so text stays readable on any fill.
    pub fn poppins() -> Self {
        Self {
            font_family: "Poppins, ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial".to_string(),
            font_size: 14.0,
            font_weight: 600,
            text_color: "#ffffff".to_string(),
            text_outline_color: "#000000".to_string(),
            edge_color: "#94a3b8".to_string(),
            background: "#ffffff".to_string(),
            root_palette: vec![
                "#ef4444".to_string(),
                "#3b82f6".to_string(),
                "#16a34a".to_string(),
                "#eab308".to_string(),
                "#f97316".to_string(),
                "#7c3aed".to_string(),
            ],
        }
    }

    /// System-font variant for environments without the webfont.
    pub fn plain() -> Self {
        Self {
            font_family: "Segoe UI, system-ui, sans-serif".to_string(),
            font_size: 14.0,
            font_weight: 400,
            ..Self::poppins()
        }
    }

    /// Label line height in pixels.
    pub fn line_height(&self) -> f32 {
        (self.font_size * 1.2).round()
    }

    pub(crate) fn parsed_palette(&self) -> Result<Vec<Rgb>, ColorError> {
        self.root_palette
            .iter()
            .map(|value| Rgb::parse(value))
            .collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::poppins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_height_rounds() {
        let theme = Theme::poppins();
        assert_eq!(theme.line_height(), 17.0);
    }

    #[test]
    fn default_palette_parses() {
        let theme = Theme::default();
        let palette = theme.parsed_palette().unwrap();
        assert_eq!(palette.len(), 6);
    }

    #[test]
    fn bad_palette_entry_is_reported() {
        let mut theme = Theme::poppins();
        theme.root_palette.push("chartreuse".to_string());
        assert!(theme.parsed_palette().is_err());
    }
}
