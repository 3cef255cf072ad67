// Prompt template handling for persona classification.
// The template lives on disk and is re-read on every call so edits apply without a restart.

use std::path::Path;

use crate::persona::catalog::Persona;

pub const DEFAULT_TEMPLATE_PATH: &str = "data/gpt_prompt.txt";

/// Reads the classification template from disk.
pub fn load_prompt_template(path: impl AsRef<Path>) -> std::io::Result<String> {
    std::fs::read_to_string(path)
}

/// Fills the template placeholders.
/// Replace: {persona_list}, {persona_descriptions}, {bio}, {posts}
///
/// User text is substituted last so braces inside a bio or post are never
/// mistaken for placeholders.
pub fn render_classification_prompt(
    template: &str,
    shortlist: &[&Persona],
    bio: &str,
    posts: &str,
) -> String {
    let persona_list = shortlist
        .iter()
        .map(|p| p.persona_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let persona_descriptions = shortlist
        .iter()
        .map(|p| format!("{}: {}", p.persona_name, p.description))
        .collect::<Vec<_>>()
        .join("\n");

    let mut rendered = String::with_capacity(template.len() + bio.len() + posts.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        rendered.push_str(&rest[..start]);
        let tail = &rest[start..];
        let replacement = [
            ("{persona_list}", persona_list.as_str()),
            ("{persona_descriptions}", persona_descriptions.as_str()),
            ("{bio}", bio),
            ("{posts}", posts),
        ]
        .into_iter()
        .find(|(placeholder, _)| tail.starts_with(placeholder));

        match replacement {
            Some((placeholder, value)) => {
                rendered.push_str(value);
                rest = &tail[placeholder.len()..];
            }
            None => {
                rendered.push('{');
                rest = &tail[1..];
            }
        }
    }
    rendered.push_str(rest);
    rendered
}
