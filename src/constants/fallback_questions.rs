/// Templated question used when course content is too thin to send to the
/// generative service. `{title}` is replaced with the course title.
pub struct FallbackTemplate {
    pub question: &'static str,
    pub options: [&'static str; 4],
    pub correct_index: u8,
    pub explanation: &'static str,
}

pub const FALLBACK_QUESTION_BANK: [FallbackTemplate; 8] = [
    FallbackTemplate {
        question: "What is the main purpose of the course \"{title}\"?",
        options: [
            "To build knowledge and skills related to {title}",
            "To replace all other company training",
            "To evaluate employees for promotion only",
            "It has no defined purpose",
        ],
        correct_index: 0,
        explanation: "Every course in the portal exists to build knowledge and skills on its subject.",
    },
    FallbackTemplate {
        question: "What is the best way to get the most out of \"{title}\"?",
        options: [
            "Skip the material and go straight to the assessment",
            "Work through all the material and apply it in daily work",
            "Read only the title",
            "Wait for a colleague to summarise it",
        ],
        correct_index: 1,
        explanation: "Completing the material and applying it is what makes training effective.",
    },
    FallbackTemplate {
        question: "Who benefits when employees apply what they learn in \"{title}\"?",
        options: [
            "Nobody",
            "Only the course author",
            "The employee, their team and the organisation",
            "Only external customers",
        ],
        correct_index: 2,
        explanation: "Applied training improves individual performance, team results and the organisation as a whole.",
    },
    FallbackTemplate {
        question: "If something in \"{title}\" is unclear, what should you do?",
        options: [
            "Ignore it",
            "Guess and move on",
            "Stop the training permanently",
            "Review the material again or ask your supervisor or trainer",
        ],
        correct_index: 3,
        explanation: "Clarifying doubts with the material or a trainer prevents mistakes on the job.",
    },
    FallbackTemplate {
        question: "When should the knowledge from \"{title}\" be applied?",
        options: [
            "In the relevant situations of everyday work",
            "Never, it is only theoretical",
            "Only during the assessment",
            "Only once a year",
        ],
        correct_index: 0,
        explanation: "Training content is meant to be used whenever the relevant work situation arises.",
    },
    FallbackTemplate {
        question: "Which attitude best supports learning in \"{title}\"?",
        options: [
            "Memorising answers without understanding",
            "Active participation and reflection on the content",
            "Completing it as fast as possible",
            "Relying only on previous experience",
        ],
        correct_index: 1,
        explanation: "Active engagement and reflection lead to lasting understanding.",
    },
    FallbackTemplate {
        question: "How can you check that you understood \"{title}\"?",
        options: [
            "By counting the pages you read",
            "By finishing before everyone else",
            "By explaining the key ideas in your own words",
            "By skipping the assessment",
        ],
        correct_index: 2,
        explanation: "Being able to explain the ideas in your own words shows real understanding.",
    },
    FallbackTemplate {
        question: "What should happen after completing \"{title}\"?",
        options: [
            "Forget the content",
            "Delete the course material",
            "Avoid discussing it with colleagues",
            "Put the content into practice and keep it up to date",
        ],
        correct_index: 3,
        explanation: "Learning continues after the course through practice and staying current.",
    },
];
