use std::fmt;

use colored::Colorize;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ColumnConstraint, Table};
use terminal_size::{Height, Width, terminal_size};

use crate::plugin::PluginDescriptor;

/// Print the console banner
pub fn print_banner() {
    let raw_banner = format!(
        "
 _               _         _
| |__   ___  ___| |_ _ __ | |_   _  __ _
| '_ \\ / _ \\/ __| __| '_ \\| | | | |/ _` |
| | | | (_) \\__ \\ |_| |_) | | |_| | (_| |
|_| |_|\\___/|___/\\__| .__/|_|\\__,_|\\__, |
                    |_|            |___/
    {}
",
        "host test plugins".green().bold()
    );
    println!("{}", raw_banner.blue());
}

/// Built-in plugins rendered as a table
pub struct PluginTable<'a>(pub &'a [(&'static str, &'static PluginDescriptor)]);

impl fmt::Display for PluginTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "No plugins available");
        }

        let mut width = 100;
        if let Some((Width(terminal_width), Height(_))) = terminal_size() {
            width = terminal_width;
        }

        let headers: Vec<Cell> = ["ALIAS", "NAME", "TYPE", "CAPABILITIES", "REQUIRED", "STABLE"]
            .iter()
            .map(|h| {
                Cell::new(h)
                    .set_alignment(CellAlignment::Center)
                    .fg(Color::Green)
            })
            .collect();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.apply_modifier(UTF8_ROUND_CORNERS);
        table.set_header(headers.clone());

        let column_width = (width as usize / headers.len().max(1)).min(u16::MAX as usize) as u16;
        for idx in 0..headers.len() {
            if let Some(column) = table.column_mut(idx) {
                column.set_constraint(ColumnConstraint::UpperBoundary(
                    comfy_table::Width::Fixed(column_width),
                ));
            }
        }
        table.set_width(width);

        for (alias, descriptor) in self.0 {
            let stable = if descriptor.stable { "yes" } else { "no" };
            table.add_row(vec![
                Cell::new(alias).fg(Color::Cyan),
                Cell::new(descriptor.name),
                Cell::new(descriptor.kind).fg(Color::Blue),
                Cell::new(descriptor.capabilities.join(", ")),
                Cell::new(descriptor.required_parameters.join(", ")),
                Cell::new(stable),
            ]);
        }

        write!(f, "{}", table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins;

    #[test]
    fn test_plugin_table_lists_every_plugin() {
        let rows: Vec<_> = plugins::BUILTINS
            .iter()
            .map(|b| (b.alias, b.descriptor))
            .collect();
        let rendered = PluginTable(&rows).to_string();
        assert!(rendered.contains("copy_shell"));
        assert!(rendered.contains("ResetMethod"));
        assert_eq!(PluginTable(&[]).to_string(), "No plugins available");
    }
}
