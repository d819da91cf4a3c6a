/// Instruction prompt sent after the image in every analysis request.
pub const ANALYSIS_PROMPT: &str = include_str!("../data/prompts/medical_analysis.txt");

/// Bumped whenever the prompt wording changes, so logged reports can be traced to it.
pub const ANALYSIS_PROMPT_VERSION: &str = "1";

/// Bold section headings the prompt asks the model to produce, in order.
pub const REPORT_HEADINGS: [&str; 4] = [
    "Detailed Analysis",
    "Findings Report",
    "Recommendations and Next Steps",
    "Treatment Suggestions",
];
