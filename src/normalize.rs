//! Normalization Pipeline - Raw SVG to Canonical Icon
//!
//! Steps run in a fixed order. A step whose precondition is not met is a
//! no-op; normalization never fails and is idempotent per mode.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::markup::{scan, render, Attribute, Segment, StartTag};

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Replacement for literal black in registration mode.
pub const THEME_COLOR_TOKEN: &str = "currentColor";

pub const DEFAULT_VIEW_BOX: &str = "0 0 24 24";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Form registered with the host icon system
    #[default]
    Registration,
    /// Settings-grid thumbnail; keeps authored colors and hidden layers
    Preview,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Registration => f.write_str("registration"),
            Mode::Preview => f.write_str("preview"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "registration" | "register" => Ok(Mode::Registration),
            "preview" => Ok(Mode::Preview),
            other => Err(format!("unknown mode '{}' (expected registration or preview)", other)),
        }
    }
}

/// Where a tag sits in the document being normalized
#[derive(Debug, Clone, Copy, Default)]
pub struct TagContext {
    /// First start tag named `svg`
    pub is_root: bool,
    /// Some element already declares the SVG default namespace
    pub namespace_declared: bool,
}

/// One tag-level rewrite rule.
pub trait NormalizeStep: Send + Sync {
    fn name(&self) -> &'static str;

    fn applies_in(&self, _mode: Mode) -> bool {
        true
    }

    /// Rewrite `tag` in place. Returns true if anything changed.
    fn apply(&self, tag: &mut StartTag<'_>, ctx: TagContext) -> bool;
}

// --- Concrete Steps ---

pub struct NamespaceStep;

impl NormalizeStep for NamespaceStep {
    fn name(&self) -> &'static str { "namespace" }

    fn apply(&self, tag: &mut StartTag<'_>, ctx: TagContext) -> bool {
        if !ctx.is_root || ctx.namespace_declared {
            return false;
        }
        tag.remove_attr("xmlns");
        tag.insert_attr(0, Attribute::new("xmlns", SVG_NAMESPACE));
        true
    }
}

pub struct StyleColorStep;

impl NormalizeStep for StyleColorStep {
    fn name(&self) -> &'static str { "style_colors" }

    fn apply(&self, tag: &mut StartTag<'_>, _ctx: TagContext) -> bool {
        let Some(index) = tag.attributes.iter().position(|a| a.name == "style") else {
            return false;
        };
        let style = tag.attributes[index].value.clone();

        let split = split_style(&style);
        if split.promoted.is_empty() {
            return false;
        }

        match split.remainder {
            Some(rest) => tag.attributes[index].value = rest,
            None => {
                tag.attributes.remove(index);
            }
        }
        for (property, color) in split.promoted {
            tag.set_attr(property, &color);
        }
        true
    }
}

pub struct ThemeColorStep;

impl NormalizeStep for ThemeColorStep {
    fn name(&self) -> &'static str { "theme_color" }

    fn applies_in(&self, mode: Mode) -> bool {
        mode == Mode::Registration
    }

    fn apply(&self, tag: &mut StartTag<'_>, _ctx: TagContext) -> bool {
        let mut changed = false;
        for attribute in &mut tag.attributes {
            if attribute.name != "fill" && attribute.name != "stroke" {
                continue;
            }
            if is_literal_black(&attribute.value) {
                attribute.value = THEME_COLOR_TOKEN.to_string();
                changed = true;
            }
        }
        changed
    }
}

pub struct ViewBoxStep;

impl NormalizeStep for ViewBoxStep {
    fn name(&self) -> &'static str { "view_box" }

    fn apply(&self, tag: &mut StartTag<'_>, ctx: TagContext) -> bool {
        if !ctx.is_root {
            return false;
        }

        if let Some(view_box) = tag.attr("viewBox") {
            return match rebase_view_box(view_box) {
                Some(rebased) => {
                    tag.set_attr("viewBox", &rebased);
                    true
                }
                None => false,
            };
        }

        let synthesized = match (tag.attr("width"), tag.attr("height")) {
            (Some(w), Some(h)) => match (parse_length(w), parse_length(h)) {
                (Some(w), Some(h)) => format!("0 0 {} {}", w, h),
                _ => DEFAULT_VIEW_BOX.to_string(),
            },
            _ => DEFAULT_VIEW_BOX.to_string(),
        };
        let index = tag
            .attributes
            .iter()
            .position(|a| a.name == "xmlns")
            .map_or(0, |i| i + 1);
        tag.insert_attr(index, Attribute::new("viewBox", &synthesized));
        true
    }
}

pub struct DimensionStep;

impl NormalizeStep for DimensionStep {
    fn name(&self) -> &'static str { "dimensions" }

    fn apply(&self, tag: &mut StartTag<'_>, ctx: TagContext) -> bool {
        if !ctx.is_root {
            return false;
        }
        let width = tag.remove_attr("width");
        let height = tag.remove_attr("height");
        width || height
    }
}

pub struct VisibilityStep;

impl NormalizeStep for VisibilityStep {
    fn name(&self) -> &'static str { "visibility" }

    fn applies_in(&self, mode: Mode) -> bool {
        mode == Mode::Registration
    }

    fn apply(&self, tag: &mut StartTag<'_>, _ctx: TagContext) -> bool {
        let before = tag.attributes.len();
        tag.attributes
            .retain(|a| !(a.name == "display" && a.value == "none"));
        tag.attributes.len() != before
    }
}

/// Canonical output plus the steps that changed something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub svg: String,
    pub applied: Vec<&'static str>,
}

/// Normalizer orchestrates the steps
pub struct Normalizer {
    steps: Vec<Box<dyn NormalizeStep>>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            steps: vec![
                Box::new(NamespaceStep),
                Box::new(StyleColorStep),
                Box::new(ThemeColorStep),
                Box::new(ViewBoxStep),
                Box::new(DimensionStep),
                Box::new(VisibilityStep),
            ],
        }
    }

    pub fn normalize(&self, raw: &str, mode: Mode) -> String {
        self.normalize_traced(raw, mode).svg
    }

    pub fn normalize_traced(&self, raw: &str, mode: Mode) -> Normalized {
        let mut applied = vec![];
        let mut stripped = false;
        let segments: Vec<_> = scan(raw)
            .into_iter()
            .filter(|s| {
                let structural = !matches!(s, Segment::NonStructural(_));
                stripped |= !structural;
                structural
            })
            .collect();

        let namespace_declared = segments.iter().any(|s| match s {
            Segment::Tag(tag) => tag.attr("xmlns") == Some(SVG_NAMESPACE),
            _ => false,
        });
        let steps: Vec<_> = self.steps.iter().filter(|s| s.applies_in(mode)).collect();
        let mut seen_root = false;

        let mut rendered = vec![];
        for segment in segments {
            let mut tag = match segment {
                Segment::Tag(tag) => tag,
                other => {
                    rendered.push((other, false));
                    continue;
                }
            };

            let is_root = !seen_root && tag.name == "svg";
            seen_root |= is_root;
            let ctx = TagContext { is_root, namespace_declared };

            let mut dirty = false;
            for step in &steps {
                if step.apply(&mut tag, ctx) {
                    dirty = true;
                    if !applied.contains(&step.name()) {
                        applied.push(step.name());
                    }
                }
            }
            rendered.push((Segment::Tag(tag), dirty));
        }

        let full = render(&rendered);
        let svg = full.trim().to_string();
        if stripped || svg.len() != full.len() {
            applied.insert(0, "strip");
        }
        tracing::trace!(%mode, ?applied, "normalized svg");
        Normalized { svg, applied }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize with the default step set.
pub fn normalize(raw: &str, mode: Mode) -> String {
    Normalizer::new().normalize(raw, mode)
}

/// Remove XML prolog, comments and DOCTYPE declarations, then trim.
///
/// An unterminated construct is left in place.
pub fn strip_non_structural(raw: &str) -> String {
    let kept: Vec<_> = scan(raw)
        .into_iter()
        .filter(|s| !matches!(s, Segment::NonStructural(_)))
        .map(|s| (s, false))
        .collect();
    render(&kept).trim().to_string()
}

pub(crate) struct StyleSplit {
    pub promoted: Vec<(&'static str, String)>,
    /// `None` when nothing but promoted declarations was present
    pub remainder: Option<String>,
}

/// Pull every hex `fill` and `stroke` declaration out of a style string.
///
/// The last declaration of each property is the one promoted, as in CSS.
pub(crate) fn split_style(style: &str) -> StyleSplit {
    let mut promoted: Vec<(&'static str, String)> = vec![];
    let mut kept = vec![];

    for declaration in style.split(';') {
        let trimmed = declaration.trim();
        if trimmed.is_empty() {
            continue;
        }
        let promotable = trimmed.split_once(':').and_then(|(property, value)| {
            let property = match property.trim() {
                "fill" => "fill",
                "stroke" => "stroke",
                _ => return None,
            };
            let value = value.trim();
            value.starts_with('#').then(|| (property, value.to_string()))
        });
        match promotable {
            Some((property, value)) => match promoted.iter_mut().find(|(p, _)| *p == property) {
                Some(existing) => existing.1 = value,
                None => promoted.push((property, value)),
            },
            None => kept.push(trimmed),
        }
    }

    if promoted.is_empty() {
        return StyleSplit { promoted, remainder: Some(style.to_string()) };
    }
    let remainder = (!kept.is_empty()).then(|| kept.join(";"));
    StyleSplit { promoted, remainder }
}

fn is_literal_black(value: &str) -> bool {
    matches!(value, "black" | "#000" | "#000000")
}

/// `x y w h` with a non-zero origin becomes `0 0 w h`. Anything else is left alone.
pub(crate) fn rebase_view_box(view_box: &str) -> Option<String> {
    let parts: Vec<&str> = view_box
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .collect();
    let [x, y, width, height] = parts.as_slice() else {
        return None;
    };
    if *x == "0" && *y == "0" {
        return None;
    }
    Some(format!("0 0 {} {}", width, height))
}

/// Root `width`/`height` usable as a viewBox size: `px` stripped, positive number.
fn parse_length(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    match number.parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => Some(number),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_prolog_comments_doctype() {
        let raw = "<?xml version=\"1.0\"?>\n<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"x\">\n<!-- multi\nline <svg> -->\n<svg></svg>\n";
        assert_eq!(strip_non_structural(raw), "<svg></svg>");
    }

    #[test]
    fn test_strip_doctype_internal_subset() {
        let raw = "<!DOCTYPE svg [ <!ENTITY a \"b\"> ]><svg/>";
        assert_eq!(strip_non_structural(raw), "<svg/>");
    }

    #[test]
    fn test_strip_unterminated_comment_is_kept() {
        assert_eq!(strip_non_structural("<svg/><!-- open"), "<svg/><!-- open");
    }

    #[test]
    fn test_split_style_partial() {
        let split = split_style("fill:#ff0000;opacity:0.5");
        assert_eq!(split.promoted, vec![("fill", "#ff0000".to_string())]);
        assert_eq!(split.remainder.as_deref(), Some("opacity:0.5"));
    }

    #[test]
    fn test_split_style_named_color_untouched() {
        let split = split_style("fill: red; stroke: #123");
        assert_eq!(split.promoted, vec![("stroke", "#123".to_string())]);
        assert_eq!(split.remainder.as_deref(), Some("fill: red"));
    }

    #[test]
    fn test_split_style_ignores_lookalike_properties() {
        let split = split_style("fill-opacity:#1;stroke-width:2");
        assert!(split.promoted.is_empty());
        assert_eq!(split.remainder.as_deref(), Some("fill-opacity:#1;stroke-width:2"));
    }

    #[test]
    fn test_split_style_repeated_property_last_wins() {
        let split = split_style("fill:#111111;opacity:1;fill:#222222");
        assert_eq!(split.promoted, vec![("fill", "#222222".to_string())]);
        assert_eq!(split.remainder.as_deref(), Some("opacity:1"));
    }

    #[test]
    fn test_repeated_style_fill_is_idempotent() {
        let raw = r##"<svg viewBox="0 0 8 8"><rect style="fill:#111111;fill:#222222"/></svg>"##;
        let once = normalize(raw, Mode::Preview);
        assert!(once.contains(r##"<rect fill="#222222"/>"##), "{}", once);
        assert_eq!(normalize(&once, Mode::Preview), once);
    }

    #[test]
    fn test_namespace_on_descendant_not_duplicated() {
        let out = normalize(
            r#"<svg viewBox="0 0 8 8"><g xmlns="http://www.w3.org/2000/svg"/></svg>"#,
            Mode::Registration,
        );
        assert_eq!(out.matches(SVG_NAMESPACE).count(), 1);
        assert!(out.starts_with(r#"<svg viewBox="0 0 8 8">"#));
    }

    #[test]
    fn test_split_style_everything_promoted() {
        let split = split_style("fill:#fff;stroke:#000;");
        assert_eq!(split.promoted.len(), 2);
        assert_eq!(split.remainder, None);
    }

    #[test]
    fn test_rebase_view_box() {
        assert_eq!(rebase_view_box("0 0 24 24"), None);
        assert_eq!(rebase_view_box("-2 4 20 20").as_deref(), Some("0 0 20 20"));
        assert_eq!(rebase_view_box("1,1,16,16").as_deref(), Some("0 0 16 16"));
        assert_eq!(rebase_view_box("1 2 3"), None);
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("32px"), Some("32"));
        assert_eq!(parse_length("16"), Some("16"));
        assert_eq!(parse_length("100%"), None);
        assert_eq!(parse_length("0"), None);
    }

    #[test]
    fn test_synthesized_view_box_from_size() {
        let out = normalize(r#"<svg width="48px" height="32px"><g/></svg>"#, Mode::Registration);
        assert_eq!(
            out,
            format!(r#"<svg xmlns="{}" viewBox="0 0 48 32"><g/></svg>"#, SVG_NAMESPACE)
        );
    }

    #[test]
    fn test_percentage_size_falls_back_to_default() {
        let out = normalize(r#"<svg width="100%" height="100%"/>"#, Mode::Preview);
        assert!(out.contains(r#"viewBox="0 0 24 24""#));
        assert!(!out.contains("100%"));
    }

    #[test]
    fn test_wrong_default_namespace_replaced() {
        let out = normalize(r#"<svg xmlns="urn:other" viewBox="0 0 1 1"/>"#, Mode::Preview);
        assert_eq!(out, format!(r#"<svg xmlns="{}" viewBox="0 0 1 1"/>"#, SVG_NAMESPACE));
    }

    #[test]
    fn test_style_fill_overrides_existing_attribute() {
        let out = normalize(
            r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 1 1"><path fill="red" style="fill:#00ff00"/></svg>"##,
            Mode::Preview,
        );
        assert!(out.contains(r##"<path fill="#00ff00"/>"##));
    }

    #[test]
    fn test_style_black_then_coerced() {
        let out = normalize(
            r##"<svg viewBox="0 0 1 1"><path style="stroke:#000000;stroke-width:2"/></svg>"##,
            Mode::Registration,
        );
        assert!(out.contains(r#"<path style="stroke-width:2" stroke="currentColor"/>"#));
    }

    #[test]
    fn test_nested_dimensions_kept() {
        let out = normalize(
            r#"<svg width="10" height="10"><rect width="4" height="4" stroke-width="1"/></svg>"#,
            Mode::Registration,
        );
        assert!(out.contains(r#"<rect width="4" height="4" stroke-width="1"/>"#));
        assert!(out.starts_with(&format!(r#"<svg xmlns="{}" viewBox="0 0 10 10">"#, SVG_NAMESPACE)));
    }

    #[test]
    fn test_traced_reports_applied_steps() {
        let normalized = Normalizer::new().normalize_traced(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path fill="black"/></svg>"#,
            Mode::Registration,
        );
        assert_eq!(normalized.applied, vec!["theme_color"]);
    }

    #[test]
    fn test_no_svg_root_passes_through() {
        let raw = "<html><body>not an icon</body></html>";
        assert_eq!(normalize(raw, Mode::Registration), raw);
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Preview".parse::<Mode>(), Ok(Mode::Preview));
        assert_eq!("registration".parse::<Mode>(), Ok(Mode::Registration));
        assert!("other".parse::<Mode>().is_err());
    }
}
