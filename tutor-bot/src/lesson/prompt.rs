//! Prompt construction for lesson generation

use super::LessonRequest;

/// Writing style for the learner's age band
pub fn style_guide(age: i64) -> &'static str {
    match age {
        a if a <= 8 => {
            "Use very simple words, short sentences, and examples with toys, animals, or games"
        }
        a if a <= 12 => {
            "Use simple language, clear examples, and everyday situations like school or home"
        }
        a if a <= 16 => "Use clear explanations with relatable examples and real-world situations",
        _ => "Use detailed explanations with comprehensive examples and professional contexts",
    }
}

/// System and user messages for a lesson request
pub fn build_lesson_prompt(request: &LessonRequest) -> (String, String) {
    let continuation = if request.stage > 1 {
        format!(
            "\n- Part: this is part {} of the topic (Advanced Concepts). The learner has \
             already covered parts 1 to {}. Go deeper than those parts without repeating the basics.",
            request.stage,
            request.stage - 1
        )
    } else {
        String::new()
    };

    let system_prompt = format!(
        "You are an expert educator and tutor.\n\
         Your goal is to teach a topic clearly and concisely so that the learner fully understands it.\n\
         \n\
         Instructions:\n\
         - Topic: {topic}\n\
         - Age group: {age} years old\n\
         - Length: Keep it short and focused (150-200 words max).\n\
         - Style: {style}.{continuation}\n\
         - Structure:\n   \
           1. Brief introduction\n   \
           2. Key explanation (step by step, or definition + example)\n   \
           3. Real-life analogy or story that makes it easy to remember\n   \
           4. One simple practice question at the end\n\
         \n\
         Make sure the explanation is **accurate**, **easy to follow**, and **age-appropriate**.",
        topic = request.topic,
        age = request.age,
        style = style_guide(request.age),
        continuation = continuation,
    );

    let greeting = if request.name.trim().is_empty() {
        String::new()
    } else {
        format!("Hey {}! ", request.name.trim())
    };

    // Same request every stage; the system prompt carries the part number
    let user_prompt = format!("{}Please teach me about {}.", greeting, request.topic);

    (system_prompt, user_prompt)
}
