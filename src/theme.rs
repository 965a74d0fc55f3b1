use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub node_fill: String,
    pub node_border: String,
    pub photo_fill: String,
    pub initials_color: String,
    pub name_color: String,
    pub years_color: String,
    pub connector_color: String,
    pub connector_width: f32,
    pub spouse_dasharray: String,
}

impl Theme {
    /// Light sepia page with burgundy connectors.
    pub fn parchment() -> Self {
        Self {
            font_family: "Georgia, \"Times New Roman\", serif".to_string(),
            font_size: 15.0,
            background: "#F5EFE6".to_string(),
            node_fill: "#FFFDF8".to_string(),
            node_border: "#C9B79C".to_string(),
            photo_fill: "#D9C7A7".to_string(),
            initials_color: "#5A4632".to_string(),
            name_color: "#3B2A1F".to_string(),
            years_color: "#8A7560".to_string(),
            connector_color: "#6b2c3e".to_string(),
            connector_width: 2.0,
            spouse_dasharray: "5,5".to_string(),
        }
    }

    /// Dark canvas with round zinc badges and faint connectors.
    pub fn midnight() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 14.0,
            background: "#09090B".to_string(),
            node_fill: "#27272A".to_string(),
            node_border: "#52525B".to_string(),
            photo_fill: "#3F3F46".to_string(),
            initials_color: "#D4D4D8".to_string(),
            name_color: "#FFFFFF".to_string(),
            years_color: "#A1A1AA".to_string(),
            connector_color: "rgba(255,255,255,0.2)".to_string(),
            connector_width: 2.0,
            spouse_dasharray: "5,5".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "parchment" | "default" | "light" => Some(Self::parchment()),
            "midnight" | "dark" => Some(Self::midnight()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::parchment()
    }
}
