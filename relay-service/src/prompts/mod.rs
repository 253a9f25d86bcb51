//! System prompt construction.
//!
//! Each endpoint profile turns its request fields into the system
//! instruction sent to the model. Field values are interpolated as-is.

use crate::config::{CreateProfile, MediaProcessProfile, SubGenProfile, TranslateProfile};
use crate::models::{CreateKind, MediaTask};

/// Replace `{name}` placeholders with the matching value.
///
/// Substitution is a single pass over the template, so placeholders that
/// appear inside substituted values are left untouched. Unknown
/// placeholders are kept verbatim.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 1..];

        let Some(end) = tail.find('}') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let key = &tail[..end];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push('{');
                out.push_str(key);
                out.push('}');
            }
        }
        rest = &tail[end + 1..];
    }

    out.push_str(rest);
    out
}

impl MediaProcessProfile {
    pub fn system_prompt(&self, task: MediaTask) -> String {
        match task {
            MediaTask::Transcribe => self.transcribe.clone(),
            MediaTask::Recap => self.recap.clone(),
        }
    }
}

impl TranslateProfile {
    pub fn system_prompt(&self, kind: &str, target_lang: &str) -> String {
        render(&self.template, &[("type", kind), ("target_lang", target_lang)])
    }
}

impl CreateProfile {
    pub fn system_prompt(&self, kind: &CreateKind, topic: &str, lang: &str) -> String {
        match kind {
            CreateKind::Novel => render(&self.novel, &[("topic", topic), ("lang", lang)]),
            CreateKind::SocialContent => {
                render(&self.social_content, &[("topic", topic), ("lang", lang)])
            }
            CreateKind::Other(kind) => render(
                &self.generic,
                &[("type", kind.as_str()), ("topic", topic), ("lang", lang)],
            ),
        }
    }
}

impl SubGenProfile {
    pub fn system_prompt(&self) -> String {
        self.instruction.clone()
    }
}
