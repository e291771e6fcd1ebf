use super::protocol::{Prompt, PromptGetResult, PromptMessage, TextContent};

pub const HELP_PROMPT: &str = "help_prompt";

const HELP_TEXT: &str = "# Terraform Assistant Help

This assistant helps you manage your Terraform infrastructure using natural language commands.

## Available Commands

- **Plan Visualization**: \"What will change if I apply?\" or \"Show me the execution plan\"
- **State Inspection**: \"What resources currently exist?\" or \"Show me the current state\"
- **Cost Estimation**: \"How much will this cost?\" or \"Estimate monthly expenses\"
- **Security Analysis**: \"Are there any security issues?\" or \"Is my configuration secure?\"
- **Drift Detection**: \"Has anything changed since last apply?\" or \"Check for drift\"
- **Module Documentation**: \"Explain this module\" or \"What does this configuration do?\"
- **Initialization**: \"Initialize my Terraform project\" or \"Run terraform init\"
- **Apply**: \"Apply the configuration\" or \"Deploy the infrastructure\"
- **Destroy**: \"Destroy the infrastructure\" or \"Tear down my resources\"

## Available Resources

- **Modules**: `terraform://modules`
- **Variables**: `terraform://variables`
- **Outputs**: `terraform://outputs`
- **Providers**: `terraform://providers`
- **State tree**: `terraform://state`
";

pub fn get_prompts() -> Vec<Prompt> {
    vec![Prompt {
        name: HELP_PROMPT.into(),
        description: "Explains the capabilities of the Terraform Assistant and how to use it.".into(),
        arguments: Vec::new(),
    }]
}

pub fn get_prompt(name: &str) -> Option<PromptGetResult> {
    if name != HELP_PROMPT {
        return None;
    }
    Some(PromptGetResult {
        description: "Terraform Assistant help".into(),
        messages: vec![PromptMessage {
            role: "user".into(),
            content: TextContent::new(HELP_TEXT),
        }],
    })
}
