use super::ui::{self, StyleType};
use crate::core::Session;

/// Renders the converter: input row, output row and, while a rate is
/// known, the status line.
pub fn render(session: &Session) -> String {
    let amount = session.amount().to_string();
    let mut output = format!(
        "{}  {} {}\n{} {} {}",
        ui::style_text("Input:", StyleType::Label),
        amount,
        session.from_currency(),
        ui::style_text("Output:", StyleType::Label),
        ui::style_text(session.converted_amount(), StyleType::Value),
        session.to_currency(),
    );

    if let Some(status) = session.status_line() {
        output.push('\n');
        output.push_str(&ui::style_text(&status, StyleType::Status));
        if let Some(date) = session.quote().and_then(|q| q.as_of) {
            output.push_str(&ui::style_text(
                &format!("  (rates as of {date})"),
                StyleType::Subtle,
            ));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Quote, SessionDefaults};
    use chrono::NaiveDate;

    #[test]
    fn test_render_without_rate() {
        console::set_colors_enabled(false);
        let session = Session::new(SessionDefaults::default());
        let text = render(&session);
        assert_eq!(text, "Input:  1 USD\nOutput:  INR");
        assert!(!text.contains("💱"));
    }

    #[test]
    fn test_render_with_rate() {
        console::set_colors_enabled(false);
        let mut session = Session::new(SessionDefaults::default());
        session.set_amount("10".parse().unwrap());
        let request = session.begin_conversion();
        session.conversion_settled(
            &request,
            Ok(Quote {
                from: "USD".into(),
                to: "INR".into(),
                rate: 83.123,
                converted_amount: "831.23".to_string(),
                as_of: NaiveDate::from_ymd_opt(2025, 6, 30),
            }),
        );

        let text = render(&session);
        assert_eq!(
            text,
            "Input:  10 USD\nOutput: 831.23 INR\n💱 1 USD = 83.123 INR  (rates as of 2025-06-30)"
        );
    }
}
