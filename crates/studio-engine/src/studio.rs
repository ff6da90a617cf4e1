//! Catalogue of the four studios.

use studio_store::StudioKind;

/// Display data for one studio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudioDescriptor {
    pub kind: StudioKind,
    pub name: &'static str,
    pub description: &'static str,
    /// Instructions a front-end may show to describe the studio's role
    pub system_prompt: &'static str,
    pub placeholder: &'static str,
    pub examples: &'static [&'static str],
}

const TEXT: StudioDescriptor = StudioDescriptor {
    kind: StudioKind::Text,
    name: "Text Generation",
    description: "Generate high-quality text content with AI assistance",
    system_prompt: "You are a professional content writer. Create compelling, well-structured content based on the user's request.",
    placeholder: "Describe the article, post or copy you want to write...",
    examples: &[
        "Write a blog post about the benefits of remote work",
        "Create a product description for a smart water bottle",
        "Summarize the key ideas of stoic philosophy in three paragraphs",
        "Draft a friendly newsletter intro announcing a new feature",
    ],
};

const CODE: StudioDescriptor = StudioDescriptor {
    kind: StudioKind::Code,
    name: "Code Generation",
    description: "Write, debug, and optimize code with AI",
    system_prompt: "You are an expert programmer. Write clean, efficient, and well-documented code based on the user's requirements.",
    placeholder: "Describe the code you need, or paste code to review...",
    examples: &[
        "Write a Python function that checks whether a string is a palindrome",
        "Implement a debounce helper in TypeScript",
        "Explain what this SQL query does and suggest an index",
        "Create a REST endpoint in Express that returns a paginated list",
    ],
};

const DOCUMENT: StudioDescriptor = StudioDescriptor {
    kind: StudioKind::Document,
    name: "Document AI",
    description: "Analyze and process documents intelligently",
    system_prompt: "You are a document analysis expert. Analyze and process documents intelligently, providing insights and summaries.",
    placeholder: "Attach a document and describe what you want to know about it...",
    examples: &[
        "Summarize the attached document in five bullet points",
        "Extract every date and deadline mentioned in this file",
        "List the main arguments and any weaknesses in them",
        "Compare the two attached files and describe the differences",
    ],
};

const CREATIVE: StudioDescriptor = StudioDescriptor {
    kind: StudioKind::Creative,
    name: "Creative Writing",
    description: "Unleash your creativity with AI-powered writing tools",
    system_prompt: "You are a creative writing assistant. Help users create engaging stories, poetry, scripts, and other creative content.",
    placeholder: "Describe the story, poem or script you want to create...",
    examples: &[
        "Write a haiku about autumn rain",
        "Write a short story about a lighthouse keeper who finds a message in a bottle",
        "Create a dialogue between a detective and a reluctant witness",
        "Write song lyrics about leaving home for the first time",
    ],
};

/// Every studio, in display order
pub static STUDIOS: [StudioDescriptor; 4] = [TEXT, CODE, DOCUMENT, CREATIVE];

/// Descriptor for `kind`
pub fn descriptor(kind: StudioKind) -> &'static StudioDescriptor {
    match kind {
        StudioKind::Text => &STUDIOS[0],
        StudioKind::Code => &STUDIOS[1],
        StudioKind::Document => &STUDIOS[2],
        StudioKind::Creative => &STUDIOS[3],
    }
}
