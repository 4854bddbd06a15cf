use super::walker::Candidate;

/// Render a candidate as inserted text: trigger, relative path, and a trailing
/// `/` for directories.
pub fn format_candidate(trigger: char, candidate: &Candidate) -> String {
    let mut out = String::with_capacity(candidate.path.len() + trigger.len_utf8() + 1);
    out.push(trigger);
    out.push_str(&candidate.path);
    if candidate.is_dir() {
        out.push('/');
    }
    out
}
