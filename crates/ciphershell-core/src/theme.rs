/// A named palette. Colours are `#rrggbb` hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub accent: &'static str,
    pub accent2: &'static str,
}

pub const DEFAULT_THEME: &str = "retro";

pub const THEMES: &[Theme] = &[
    Theme { id: "retro", name: "Retro Green", accent: "#22c55e", accent2: "#16a34a" },
    Theme { id: "catppuccin", name: "Catppuccin", accent: "#cba6f7", accent2: "#89b4fa" },
    Theme { id: "dracula", name: "Dracula", accent: "#ff79c6", accent2: "#bd93f9" },
    Theme { id: "nord", name: "Nord", accent: "#88c0d0", accent2: "#81a1c1" },
    Theme { id: "gruvbox", name: "Gruvbox", accent: "#d79921", accent2: "#fe8019" },
    Theme { id: "tokyo", name: "Tokyo Night", accent: "#7aa2f7", accent2: "#bb9af7" },
    Theme { id: "onedark", name: "One Dark", accent: "#61afef", accent2: "#c678dd" },
    Theme { id: "solarized", name: "Solarized", accent: "#268bd2", accent2: "#b58900" },
    Theme { id: "monokai", name: "Monokai", accent: "#a6e22e", accent2: "#f92672" },
    Theme { id: "cyberpunk", name: "Cyberpunk", accent: "#fcee0a", accent2: "#00ff9f" },
    Theme { id: "matrix", name: "Matrix", accent: "#00ff41", accent2: "#008f11" },
    Theme { id: "oled", name: "OLED Midnight", accent: "#bb9af7", accent2: "#0db9d7" },
];

/// Exact, case-sensitive lookup by id.
pub fn find_theme(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.id == id)
}

/// The theme for `id`, or the default one.
pub fn theme_or_default(id: &str) -> &'static Theme {
    find_theme(id).unwrap_or(&THEMES[0])
}

/// The active theme and the background fetched for it.
#[derive(Debug, Clone)]
pub struct ThemeState {
    active: &'static Theme,
    background: Option<String>,
}

impl ThemeState {
    pub fn new(id: &str) -> Self {
        Self {
            active: theme_or_default(id),
            background: None,
        }
    }

    pub fn active(&self) -> &'static Theme {
        self.active
    }

    /// Switch themes. The previous background no longer applies.
    pub fn apply(&mut self, theme: &'static Theme) {
        self.active = theme;
        self.background = None;
    }

    /// Record a fetched background if it belongs to the active theme.
    /// Returns false for a stale answer.
    pub fn set_background(&mut self, theme_id: &str, url: String) -> bool {
        if self.active.id != theme_id {
            return false;
        }
        self.background = Some(url);
        true
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }
}

impl Default for ThemeState {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

/// Parse `#rrggbb` into an RGB triple.
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}
