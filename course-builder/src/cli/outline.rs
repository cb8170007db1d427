//! Plain-text rendering of a course snapshot

use colored::*;

use crate::builder::{CourseSnapshot, Notice, NoticeLevel};

/// Render the outline as lines, one per section and material
pub fn render(snapshot: &CourseSnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("{}", snapshot.course_id).bold().to_string());

    if snapshot.sections.is_empty() {
        lines.push("  (no sections)".dimmed().to_string());
        return lines;
    }

    for view in &snapshot.sections {
        let section = &view.section;
        lines.push(format!(
            "  {} {} {}",
            format!("{}.", section.order).cyan(),
            section.title.bold(),
            format!("[section {}]", section.id.0).dimmed()
        ));

        if view.materials.is_empty() {
            lines.push("      (empty)".dimmed().to_string());
        }

        for material in &view.materials {
            let required = if material.is_required { " *" } else { "" };
            let duration = match material.duration {
                Some(secs) if material.material_type.has_duration() => {
                    format!(" {}:{:02}", secs / 60, secs % 60)
                }
                _ => String::new(),
            };
            lines.push(format!(
                "      {} {}{}{} {} {}",
                format!("{}.{}", section.order, material.order).cyan(),
                material.title,
                required.yellow(),
                duration.dimmed(),
                format!("({})", material.material_type.label()).green(),
                format!("[material {}]", material.id.0).dimmed()
            ));
        }
    }

    lines
}

pub fn print(snapshot: &CourseSnapshot) {
    for line in render(snapshot) {
        println!("{}", line);
    }
}

pub fn print_notice(notice: &Notice) {
    let label = match notice.level {
        NoticeLevel::Info => "info".blue(),
        NoticeLevel::Warning => "warning".yellow(),
        NoticeLevel::Error => "error".red(),
    };
    eprintln!("{}: {}", label.bold(), notice.message);
}
