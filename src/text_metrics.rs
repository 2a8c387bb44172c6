//! Real font measurement for label fitting.
//!
//! Widths come from the matched system font's glyph advances; when no font
//! can be resolved the fitter falls back to approximate per-character
//! factors (see [`approx_char_width`]). Matched font bytes are cached under
//! the XDG cache dir so repeated runs skip the system font scan.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use ttf_parser::Face;

static MEASURER: Lazy<Mutex<Measurer>> = Lazy::new(|| Mutex::new(Measurer::new()));

/// Width of `text` in pixels at `font_size`, or `None` when no matching
/// face is available.
pub fn measure_text_width(
    text: &str,
    font_size: f32,
    font_family: &str,
    font_weight: u16,
) -> Option<f32> {
    if font_size <= 0.0 {
        return None;
    }
    if text.is_empty() {
        return Some(0.0);
    }
    let mut guard = MEASURER.lock().ok()?;
    guard.measure(text, font_size, font_family, font_weight)
}

/// Approximate advance factor (multiples of the font size) used when no
/// real face is available. Loosely calibrated against a semibold
/// geometric sans.
pub fn approx_char_width(ch: char) -> f32 {
    match ch {
        'i' | 'j' | 'l' | '\'' | '.' | ',' | ':' | ';' | '!' | '|' => 0.28,
        'f' | 't' | 'r' | 'I' | '(' | ')' | '[' | ']' | '{' | '}' => 0.36,
        ' ' => 0.31,
        'm' | 'w' | 'M' | 'W' | '@' | '%' | '&' => 0.92,
        'A'..='Z' | '0'..='9' => 0.66,
        _ => 0.56,
    }
}

struct Measurer {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FaceMetrics>>,
}

impl Measurer {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(
        &mut self,
        text: &str,
        font_size: f32,
        font_family: &str,
        font_weight: u16,
    ) -> Option<f32> {
        let key = face_key(font_family, font_weight);
        if !self.faces.contains_key(&key) {
            let loaded = self.load_face(font_family, font_weight, &key);
            self.faces.insert(key.clone(), loaded);
        }
        let metrics = self.faces.get_mut(&key)?.as_mut()?;
        let normalized = text.replace('\t', "    ");
        Some(metrics.width_of(&normalized, font_size))
    }

    fn load_face(&mut self, font_family: &str, font_weight: u16, key: &str) -> Option<FaceMetrics> {
        if let Some(metrics) = load_cached_face(key) {
            return Some(metrics);
        }

        let mut names: Vec<String> = Vec::new();
        let mut generics: Vec<Option<Family<'static>>> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => generics.push(Some(Family::Serif)),
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    generics.push(Some(Family::SansSerif))
                }
                "monospace" | "ui-monospace" => generics.push(Some(Family::Monospace)),
                "cursive" => generics.push(Some(Family::Cursive)),
                "fantasy" => generics.push(Some(Family::Fantasy)),
                _ => {
                    names.push(raw.to_string());
                    generics.push(None);
                }
            }
        }

        let mut families: Vec<Family<'_>> = Vec::with_capacity(generics.len().max(1));
        let mut name_iter = names.iter();
        for generic in &generics {
            match generic {
                Some(family) => families.push(*family),
                None => {
                    if let Some(name) = name_iter.next() {
                        families.push(Family::Name(name.as_str()));
                    }
                }
            }
        }
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight(font_weight),
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded: Option<FaceMetrics> = None;
        self.db.with_face_data(id, |data, index| {
            let bytes = data.to_vec();
            if Face::parse(&bytes, index).is_ok() {
                if let Some((font_path, meta_path)) = cache_paths(key)
                    && !font_path.exists()
                {
                    if let Some(parent) = font_path.parent() {
                        let _ = fs::create_dir_all(parent);
                    }
                    let _ = fs::write(&font_path, &bytes);
                    let _ = fs::write(&meta_path, index.to_string());
                }
                loaded = FaceMetrics::new(bytes, index);
            }
        });
        loaded
    }
}

/// Glyph advances for one matched face. The face is re-parsed only when a
/// character is seen for the first time; everything else is served from
/// the advance cache.
struct FaceMetrics {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    advances: HashMap<char, Option<u16>>,
}

impl FaceMetrics {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut advances = HashMap::new();
        for byte in 0x20u8..0x7f {
            let ch = byte as char;
            let advance = face
                .glyph_index(ch)
                .and_then(|glyph| face.glyph_hor_advance(glyph));
            advances.insert(ch, advance);
        }
        Some(Self {
            data,
            index,
            units_per_em,
            advances,
        })
    }

    fn width_of(&mut self, text: &str, font_size: f32) -> f32 {
        self.fill_missing(text);
        let scale = font_size / self.units_per_em as f32;
        let mut width = 0.0f32;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            match self.advances.get(&ch).copied().flatten() {
                Some(advance) => width += advance as f32 * scale,
                None => width += approx_char_width(ch) * font_size,
            }
        }
        width.max(0.0)
    }

    fn fill_missing(&mut self, text: &str) {
        let missing: Vec<char> = text
            .chars()
            .filter(|ch| *ch != '\n' && !self.advances.contains_key(ch))
            .collect();
        if missing.is_empty() {
            return;
        }
        let Ok(face) = Face::parse(&self.data, self.index) else {
            for ch in missing {
                self.advances.insert(ch, None);
            }
            return;
        };
        for ch in missing {
            let advance = face
                .glyph_index(ch)
                .and_then(|glyph| face.glyph_hor_advance(glyph));
            self.advances.insert(ch, advance);
        }
    }
}

fn face_key(font_family: &str, font_weight: u16) -> String {
    let family = font_family.trim();
    let family = if family.is_empty() { "sans-serif" } else { family };
    format!("{family}|{font_weight}")
}

fn cache_paths(key: &str) -> Option<(PathBuf, PathBuf)> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    key.hash(&mut hasher);
    let hash = hasher.finish();
    let dir = base.join("bubblemap").join("font-cache");
    Some((dir.join(format!("{hash:x}.font")), dir.join(format!("{hash:x}.meta"))))
}

fn load_cached_face(key: &str) -> Option<FaceMetrics> {
    let (font_path, meta_path) = cache_paths(key)?;
    if !font_path.exists() || !meta_path.exists() {
        return None;
    }
    let bytes = fs::read(font_path).ok()?;
    let index: u32 = fs::read_to_string(meta_path).ok()?.trim().parse().ok()?;
    FaceMetrics::new(bytes, index)
}
