//! Tree rendering of cow input.
//!
//! Keys consumed by a model mapping are coloured, one colour per parameter,
//! and a legend naming each parameter and its path follows the tree.

use std::fmt::Write;

use crossterm::style::{Color, Stylize};
use moo_core::{FxHashMap, Record, Value};
use moo_registry::Mapping;

const PALETTE: [Color; 7] = [
    Color::Red,
    Color::Green,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::White,
    Color::Blue,
];

/// Rendering switches.
#[derive(Debug, Clone, Copy)]
pub struct TreeStyle {
    /// Emit ANSI colours for mapped keys.
    pub color: bool,
    /// Show leaf type names instead of leaf values.
    pub show_types: bool,
}

/// Renders `record` as a box-drawing tree.
pub fn render_tree(record: &Record, mapping: Option<&Mapping>, style: TreeStyle) -> String {
    let colors: FxHashMap<&str, Color> = mapping
        .into_iter()
        .flat_map(Mapping::iter)
        .zip(PALETTE.iter().cycle())
        .map(|((_, path), &color)| (path.as_str(), color))
        .collect();

    let mut out = String::new();
    write_level(&mut out, record, "", "", &colors, style);

    if let Some(mapping) = mapping {
        out.push_str("\nLegend:\n");
        for ((param, path), &color) in mapping.iter().zip(PALETTE.iter().cycle()) {
            let entry = format!("{param} ({path})");
            let _ = writeln!(out, "{}", paint(&entry, Some(color), style.color));
        }
    }
    out
}

fn write_level(
    out: &mut String,
    record: &Record,
    prefix: &str,
    parent: &str,
    colors: &FxHashMap<&str, Color>,
    style: TreeStyle,
) {
    let last = record.len().saturating_sub(1);
    for (index, (key, value)) in record.iter().enumerate() {
        let (branch, indent) = if index < last {
            ("├── ", "│   ")
        } else {
            ("└── ", "    ")
        };
        let path = if parent.is_empty() {
            key.to_owned()
        } else {
            format!("{parent}.{key}")
        };
        let label = paint(key, colors.get(path.as_str()).copied(), style.color);

        match value {
            Value::Map(child) => {
                let _ = writeln!(out, "{prefix}{branch}{label}:");
                write_level(out, child, &format!("{prefix}{indent}"), &path, colors, style);
            }
            leaf if style.show_types => {
                let _ = writeln!(out, "{prefix}{branch}{label}: {}", leaf.type_name());
            }
            leaf => {
                let _ = writeln!(out, "{prefix}{branch}{label}: {leaf}");
            }
        }
    }
}

fn paint(text: &str, color: Option<Color>, enabled: bool) -> String {
    match color {
        Some(color) if enabled => text.with(color).to_string(),
        _ => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAIN: TreeStyle = TreeStyle {
        color: false,
        show_types: true,
    };

    fn input() -> Record {
        moo_herd::loader::parse_cows(
            r#"[{"cow_id": 1, "input_data": {
                "milk": {"morning": 10, "evening": 8.5},
                "weight": 500,
                "health": {"vitals": {"heart_rate": 60}, "notes": "calm"}
            }}]"#,
        )
        .unwrap()
        .remove(0)
        .input()
        .clone()
    }

    #[test]
    fn test_render_types() {
        insta::assert_snapshot!(render_tree(&input(), None, PLAIN), @r"
        ├── milk:
        │   ├── morning: int
        │   └── evening: float
        ├── weight: int
        └── health:
            ├── vitals:
            │   └── heart_rate: int
            └── notes: str
        ");
    }

    #[test]
    fn test_render_values() {
        let style = TreeStyle {
            show_types: false,
            ..PLAIN
        };
        insta::assert_snapshot!(render_tree(&input(), None, style), @r#"
        ├── milk:
        │   ├── morning: 10
        │   └── evening: 8.5
        ├── weight: 500
        └── health:
            ├── vitals:
            │   └── heart_rate: 60
            └── notes: "calm"
        "#);
    }

    #[test]
    fn test_render_with_legend() {
        let mapping: Mapping = [("heart_rate", "health.vitals.heart_rate"), ("weight", "weight")]
            .into_iter()
            .collect();
        let rendered = render_tree(&input(), Some(&mapping), PLAIN);
        assert!(!rendered.contains('\u{1b}'));
        assert!(rendered.ends_with("Legend:\nheart_rate (health.vitals.heart_rate)\nweight (weight)\n"));
    }

    #[test]
    fn test_empty_record() {
        assert_eq!(render_tree(&Record::new(), None, PLAIN), "");
    }
}
