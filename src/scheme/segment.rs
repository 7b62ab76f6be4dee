/// Splits `text` into line-aligned chunks of at most `max_chars` characters
/// (newlines included). A line longer than the budget becomes its own chunk.
/// Chunks are trimmed but never dropped, so a slice made only of blank lines
/// comes back as `""` and re-joining the chunks with `\n` keeps every line
/// boundary that fell between chunks.
pub fn segment_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::<String>::new();
    let mut current = String::new();
    let mut size = 0usize;

    for line in text.lines() {
        let line_chars = line.chars().count() + 1;

        if size + line_chars > max_chars && !current.is_empty() {
            push_trimmed(&mut chunks, &current);
            current.clear();
            size = 0;
        }

        current.push_str(line);
        current.push('\n');
        size += line_chars;
    }

    if !current.is_empty() {
        push_trimmed(&mut chunks, &current);
    }

    chunks
}

fn push_trimmed(chunks: &mut Vec<String>, chunk: &str) {
    chunks.push(chunk.trim().to_string());
}
