use std::io::{self, Write};

use colored::{Color, Colorize};
use qabot_core::error::{ParameterListing, QaBotError};
use qabot_core::record::AnswerRecord;

/// How record labels are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    Plain,
    /// Background-highlighted labels for interactive terminals.
    Highlighted,
}

impl LabelStyle {
    pub fn from_color(enabled: bool) -> Self {
        if enabled {
            Self::Highlighted
        } else {
            Self::Plain
        }
    }

    fn paint(self, label: &str, background: Color) -> String {
        match self {
            Self::Plain => label.to_string(),
            Self::Highlighted => label.on_color(background).to_string(),
        }
    }
}

pub fn write_record(
    out: &mut dyn Write,
    record: &AnswerRecord,
    style: LabelStyle,
) -> io::Result<()> {
    let fields = [
        ("Context:", Color::Green, &record.context),
        ("Question:", Color::Blue, &record.question),
        ("Answer:", Color::Magenta, &record.answer),
        ("Score:", Color::Yellow, &record.score),
    ];
    for (label, background, value) in fields {
        writeln!(out, "{} {value}", style.paint(label, background))?;
    }
    Ok(())
}

pub fn write_listing(
    out: &mut dyn Write,
    records: &[AnswerRecord],
    json: bool,
    style: LabelStyle,
) -> io::Result<()> {
    for (index, record) in records.iter().enumerate() {
        if json {
            let line = serde_json::to_string(record).map_err(io::Error::other)?;
            writeln!(out, "{line}")?;
        } else {
            writeln!(out, "{index}")?;
            write_record(out, record, style)?;
        }
    }
    Ok(())
}

/// Explains a missing parameter with whatever the store holds under the prefix.
pub fn write_configuration_error(out: &mut dyn Write, error: &QaBotError) -> io::Result<()> {
    let QaBotError::ConfigurationNotFound { name, diagnostic } = error else {
        return writeln!(out, "Error: {error}");
    };

    writeln!(
        out,
        "Error: Parameter {name} not found in SSM Parameter Store"
    )?;
    writeln!(out)?;
    writeln!(out, "Available parameters:")?;
    match diagnostic {
        ParameterListing::Available(names) => {
            for name in names {
                writeln!(out, "- {name}")?;
            }
            Ok(())
        }
        ParameterListing::Unavailable(message) => {
            writeln!(out, "Could not list parameters: {message}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AnswerRecord {
        AnswerRecord {
            item_id: "id-1".to_string(),
            context: "Paris is the capital of France.".to_string(),
            question: "What is the capital of France?".to_string(),
            answer: "Paris".to_string(),
            score: "0.98".to_string(),
        }
    }

    fn rendered(write: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        let mut buffer = Vec::new();
        write(&mut buffer).expect("write to buffer");
        String::from_utf8(buffer).expect("utf-8 output")
    }

    #[test]
    fn record_is_rendered_with_labels() {
        let text = rendered(|out| write_record(out, &record(), LabelStyle::Plain));
        assert_eq!(
            text,
            "Context: Paris is the capital of France.\n\
             Question: What is the capital of France?\n\
             Answer: Paris\n\
             Score: 0.98\n"
        );
    }

    #[test]
    fn highlighted_labels_carry_background_colours() {
        colored::control::set_override(true);
        let text = rendered(|out| write_record(out, &record(), LabelStyle::Highlighted));

        assert!(text.starts_with("\u{1b}[42mContext:\u{1b}[0m Paris"));
        assert!(text.contains("\u{1b}[44mQuestion:\u{1b}[0m What"));
        assert!(text.contains("\u{1b}[45mAnswer:\u{1b}[0m Paris"));
        assert!(text.ends_with("\u{1b}[43mScore:\u{1b}[0m 0.98\n"));
    }

    #[test]
    fn json_listing_ignores_label_style() {
        let records = [record(), record()];
        let text = rendered(|out| write_listing(out, &records, true, LabelStyle::Highlighted));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: AnswerRecord = serde_json::from_str(lines[0]).expect("valid json");
        assert_eq!(parsed, record());
    }

    #[test]
    fn missing_parameter_lists_available_names() {
        let error = QaBotError::ConfigurationNotFound {
            name: "/qabot/223/TABLE_NAME".to_string(),
            diagnostic: ParameterListing::Available(vec![
                "/qabot/223/CONTAINER_NAME".to_string(),
                "/qabot/223/ECS_CLUSTER_NAME".to_string(),
            ]),
        };

        let text = rendered(|out| write_configuration_error(out, &error));
        assert!(text.starts_with("Error: Parameter /qabot/223/TABLE_NAME not found"));
        assert!(text.contains("- /qabot/223/CONTAINER_NAME\n- /qabot/223/ECS_CLUSTER_NAME\n"));
    }

    #[test]
    fn listing_failure_is_reported_separately() {
        let error = QaBotError::ConfigurationNotFound {
            name: "/qabot/223/TABLE_NAME".to_string(),
            diagnostic: ParameterListing::Unavailable("AccessDeniedException".to_string()),
        };

        let text = rendered(|out| write_configuration_error(out, &error));
        assert!(text.ends_with("Could not list parameters: AccessDeniedException\n"));
    }
}
