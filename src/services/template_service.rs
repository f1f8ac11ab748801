//! Outreach message templates
//!
//! Pure formatting over the sender identity and one row's field mapping.
//! Missing prospect fields fall back to generic placeholders; generation never fails.

use crate::core::{FieldAliases, FieldMapping, SenderContext};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Message variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Channel {
    Email,
    Phone,
}

impl Channel {
    pub fn title(&self) -> &'static str {
        match self {
            Channel::Email => "Email Template",
            Channel::Phone => "Phone Script",
        }
    }

    /// Placeholders for (prospect name, company name) when the row has neither alias
    fn placeholders(&self) -> (&'static str, &'static str) {
        match self {
            Channel::Email => ("valued prospect", "your company"),
            Channel::Phone => ("prospect", "the company"),
        }
    }
}

const INDUSTRY_PLACEHOLDER: &str = "your industry";

/// Renders email and phone templates from a fixed sender identity
#[derive(Debug, Clone, Default)]
pub struct TemplateGenerator {
    sender: SenderContext,
    aliases: FieldAliases,
}

impl TemplateGenerator {
    pub fn new(sender: SenderContext, aliases: FieldAliases) -> Self {
        Self { sender, aliases }
    }

    pub fn sender(&self) -> &SenderContext {
        &self.sender
    }

    pub fn generate(&self, channel: Channel, mapping: &FieldMapping) -> String {
        let (name_placeholder, company_placeholder) = channel.placeholders();
        let prospect = mapping.resolve_or(&self.aliases.contact_name, name_placeholder);
        let company = mapping.resolve_or(&self.aliases.company_name, company_placeholder);
        let industry = mapping.resolve_or(&self.aliases.industry, INDUSTRY_PLACEHOLDER);

        match channel {
            Channel::Email => self.email(prospect, company, industry),
            Channel::Phone => self.phone_script(prospect, company, industry),
        }
    }

    fn email(&self, prospect: &str, company: &str, industry: &str) -> String {
        let sender = &self.sender;
        format!(
            "Subject: Enhancing {company}'s Operations with AI-Driven Solutions

Dear {prospect},

I hope this email finds you well. I came across {company}'s impressive work in {industry} and was particularly intrigued by your approach to [specific point from analysis].

At {sender_company}, we specialize in {value}, and I believe we could bring significant value to {company} by:

1. [Benefit aligned with prospect's needs]
2. [Benefit aligned with prospect's industry]
3. [Benefit aligned with prospect's potential pain points]

Would you be open to a brief conversation to explore how we might help {company} achieve [specific goal]?

Best regards,
[Your name]
{role}
{sender_company}",
            sender_company = sender.company_name,
            value = lowercase_first(&sender.value_proposition),
            role = sender.role,
        )
    }

    fn phone_script(&self, prospect: &str, company: &str, industry: &str) -> String {
        let sender_company = &self.sender.company_name;
        format!(
            "Call Script for {prospect} at {company}

Introduction:
\"Hi, this is [Your Name] from {sender_company}. Am I speaking with {prospect}?\"

Purpose Statement:
\"I'm reaching out because we've been helping companies in {industry} to [specific value proposition based on analysis]. Based on what I've learned about {company}, I thought you might be interested in hearing about how we could help with [specific challenge or opportunity].\"

Key Talking Points:
1. Acknowledge their current approach: [Point from analysis]
2. Present relevant case study
3. Discuss specific value proposition for their situation

Questions to Ask:
1. \"What's your current approach to [relevant challenge]?\"
2. \"What would be the impact if you could [solve specific problem]?\"
3. \"How are you currently handling [specific process]?\"

Next Steps:
- If interested: Schedule a detailed discovery call
- If not ready: Ask about timing and stay in touch
- If not interested: Thank them and ask if you can share some resources

Closing:
\"Thank you for your time, [Name]. [Appropriate next step based on conversation]\""
        )
    }
}

/// "Help businesses ..." reads as "help businesses ..." mid-sentence
fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
