//! Prompt text sent to the completion providers

use anyhow::Result;

use crate::profile::{Profile, Project};

/// Build the system context for the chat assistant.
///
/// The whole profile is embedded as JSON so the model can answer from it; the
/// same string is re-sent with every turn.
pub fn system_context(profile: &Profile) -> Result<String> {
    let name = &profile.personal.name;
    let mut context = String::new();

    context.push_str(&format!(
        "You are an AI assistant that answers on behalf of \"{}\", based on their resume data.\n",
        name
    ));
    context.push_str("Answer the user's questions about skills, projects and experience using the following JSON data:\n");
    context.push_str(&profile.to_json()?);
    context.push_str("\n\nRules:\n");
    context.push_str("1. Keep answers concise and professional, as an engineer would.\n");
    context.push_str(&format!(
        "2. If the question is not covered by the data, say so politely and suggest contacting {} by email ({}).\n",
        name, profile.personal.email
    ));
    context.push_str("3. Be confident and friendly.\n");
    context.push_str("4. Answer in the language the user writes in.");

    Ok(context)
}

/// Ask for a one-sentence reviewer's take on a single project.
pub fn project_insight_prompt(project: &Project) -> String {
    format!(
        "Acting as a senior technical interviewer, give a one-sentence, concise and professional \
         assessment of this project: \"{}: {}\". Emphasize its technical difficulty or commercial value.",
        project.title, project.desc
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_embeds_profile_json() {
        let profile = Profile::builtin();
        let context = system_context(profile).unwrap();

        assert!(context.contains(&profile.personal.name));
        assert!(context.contains(&profile.to_json().unwrap()));
        assert!(context.contains(&profile.personal.email));
    }

    #[test]
    fn test_context_is_stable() {
        let profile = Profile::builtin();
        assert_eq!(system_context(profile).unwrap(), system_context(profile).unwrap());
    }

    #[test]
    fn test_insight_prompt_quotes_project() {
        let project = &Profile::builtin().projects[1];
        let prompt = project_insight_prompt(project);

        assert!(prompt.contains(&format!("\"{}: {}\"", project.title, project.desc)));
    }
}
