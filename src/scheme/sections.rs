use super::*;

enum LineKind {
    /// Line mentions the subject at this index; first configured match wins.
    Heading(usize),
    Body,
}

fn classify_line(line: &str, subjects_lower: &[String]) -> LineKind {
    let line_lower = line.trim().to_lowercase();
    subjects_lower
        .iter()
        .position(|subject| !subject.is_empty() && line_lower.contains(subject.as_str()))
        .map_or(LineKind::Body, LineKind::Heading)
}

/// Splits a document into per-subject sections. A line naming a subject opens
/// that subject's section (heading line included) until another subject's
/// heading appears. Lines before the first heading belong to no section.
/// Every subject gets an entry, possibly empty.
pub fn split_subject_sections(text: &str, subjects: &[String]) -> HashMap<String, String> {
    let subjects_lower = subjects
        .iter()
        .map(|subject| subject.trim().to_lowercase())
        .collect::<Vec<_>>();
    let mut sections = vec![Vec::<&str>::new(); subjects.len()];
    let mut active: Option<usize> = None;

    for line in text.lines() {
        if let LineKind::Heading(index) = classify_line(line, &subjects_lower) {
            active = Some(index);
        }

        match active {
            Some(index) => sections[index].push(line),
            None => continue,
        }
    }

    subjects
        .iter()
        .zip(sections)
        .map(|(subject, lines)| (subject.clone(), lines.join("\n").trim().to_string()))
        .collect()
}

/// The subject's own section, or the whole document when the section is empty.
pub fn section_or_document<'a>(
    sections: &'a HashMap<String, String>,
    subject: &str,
    document: &'a str,
) -> &'a str {
    sections
        .get(subject)
        .map(String::as_str)
        .filter(|section| !section.is_empty())
        .unwrap_or(document)
}
