use super::ui;
use crate::core::{CurrencyCatalog, RateTableProvider};
use anyhow::Result;
use std::io::Write;

const CODES_PER_ROW: usize = 10;

impl CurrencyCatalog {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        for row in self.codes().chunks(CODES_PER_ROW) {
            table.add_row(row.iter().map(|c| ui::code_cell(c.as_str())));
        }

        format!(
            "Currencies ({})\n\n{}",
            ui::style_text(&self.len().to_string(), ui::StyleType::Label),
            table
        )
    }
}

pub async fn run<W: Write>(provider: &dyn RateTableProvider, out: &mut W) -> Result<()> {
    let pb = ui::new_spinner("Loading currencies...");
    let catalog = CurrencyCatalog::load(provider).await;
    pb.finish_and_clear();

    writeln!(out, "{}", catalog.display_as_table())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_catalog() {
        console::set_colors_enabled(false);
        let output = CurrencyCatalog::fallback().display_as_table();
        assert!(output.starts_with("Currencies (5)"));
        for code in ["USD", "INR", "EUR", "GBP", "JPY"] {
            assert!(output.contains(code));
        }
    }

    #[test]
    fn test_display_wraps_long_catalog() {
        let codes = (0..25).map(|i| format!("C{i:02}").into()).collect();
        let output = CurrencyCatalog::new(codes).display_as_table();
        assert!(output.contains("C00"));
        assert!(output.contains("C24"));
        // Three rows of codes, separated by two row separators
        assert_eq!(output.matches("├").count(), 2);
    }
}
